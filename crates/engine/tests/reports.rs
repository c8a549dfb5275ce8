//! End-to-end report generation against in-memory candle sources.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use market_report_core::format::BANNER;
use market_report_core::{
    AppConfig, CandleSeries, CandleSource, EngineError, ErrorKind, Interval, OrderBookSnapshot,
    ProfileOverride,
};
use market_report_data::{synthetic_book, synthetic_candles, MemorySource};
use market_report_engine::{ProfileKind, ReportEngine, ReportPayload};

const SYMBOL: &str = "BTCUSDT";

const INTERVALS: [Interval; 6] = [
    Interval::OneMinute,
    Interval::FifteenMinutes,
    Interval::ThirtyMinutes,
    Interval::OneHour,
    Interval::FourHours,
    Interval::OneDay,
];

fn full_source() -> MemorySource {
    INTERVALS
        .iter()
        .fold(MemorySource::new(), |source, &interval| {
            source.with_candles(SYMBOL, interval, synthetic_candles(interval, 300, 42_000.0))
        })
        .with_book(SYMBOL, synthetic_book(42_000.0, 120))
}

fn engine(source: impl CandleSource + 'static) -> ReportEngine {
    ReportEngine::new(Arc::new(source), &AppConfig::default()).unwrap()
}

fn header_value<'a>(text: &'a str, label: &str) -> &'a str {
    text.lines()
        .find(|line| line.starts_with(label))
        .map(|line| line[label.len()..].trim())
        .unwrap()
}

// ============================================================
// Every profile
// ============================================================

#[tokio::test]
async fn test_every_profile_renders() {
    let engine = engine(full_source());

    for kind in ProfileKind::ALL {
        let report = engine.generate_report(kind, SYMBOL).await.unwrap();
        assert_eq!(report.profile, kind);
        assert_eq!(report.symbol, SYMBOL);

        let text = &report.text;
        assert!(text.starts_with(BANNER), "{kind}: missing banner");
        assert!(text.contains(kind.title()), "{kind}: missing title");
        assert_eq!(header_value(text, "Profile:"), kind.name());
        assert!(!text.contains("NaN"), "{kind}: NaN in report");
        assert!(!text.contains("inf"), "{kind}: infinity in report");
        assert!(text.trim_end().ends_with(BANNER));
    }
}

#[tokio::test]
async fn test_candle_window_is_trimmed_to_profile() {
    let engine = engine(full_source());

    let text = engine.fifteen_minute(SYMBOL).await.unwrap().text;
    assert_eq!(header_value(&text, "Candles:"), "96");
    assert_eq!(header_value(&text, "Interval:"), "15m");

    let text = engine.long_term(SYMBOL).await.unwrap().text;
    assert_eq!(header_value(&text, "Candles:"), "220");
}

#[tokio::test]
async fn test_blocks_follow_profile() {
    let engine = engine(full_source());

    let hour = engine.hour(SYMBOL).await.unwrap().text;
    assert!(hour.contains("Indicators"));
    assert!(hour.contains("Pivot points"));
    assert!(hour.contains("Recent Candles"));
    assert!(!hour.contains("Order Book"));
    assert!(!hour.contains("Slope\n"));

    let volume = engine.volume(SYMBOL).await.unwrap().text;
    assert!(volume.contains("VMA(20):"));
    assert!(!volume.contains("Indicators"));

    let slope = engine.slope(SYMBOL).await.unwrap().text;
    assert!(slope.contains("VWAP:"));
    assert!(slope.contains("Volume MA:"));
}

#[tokio::test]
async fn test_book_profile() {
    let engine = engine(full_source());

    let text = engine.book(SYMBOL).await.unwrap().text;
    assert!(text.contains("Order Book"));
    assert!(text.contains("Top bids"));
    assert!(text.contains("Top asks"));
    assert_eq!(header_value(&text, "Book levels:"), "100 bids / 100 asks");
    assert!(!text.contains("Candles:"));
    assert!(!text.contains("Recent Candles"));
}

#[tokio::test]
async fn test_book_profile_lines() {
    let source = MemorySource::new().with_book(
        SYMBOL,
        OrderBookSnapshot::from_pairs(&[(100.0, 5.0), (99.0, 3.0)], &[(101.0, 2.0), (102.0, 1.0)]),
    );
    let text = engine(source).book(SYMBOL).await.unwrap().text;
    let lines: Vec<&str> = text.lines().collect();

    for expected in [
        "Book levels:            2 bids / 2 asks",
        "Mid:                    100.5000",
        "Spread:                 1.0000  (0.9950%)",
        "Imbalance:              0.4545  (bids dominate)",
    ] {
        assert!(lines.contains(&expected), "missing line {expected:?} in\n{text}");
    }
}

#[tokio::test]
async fn test_blocks_render_in_fixed_order() {
    let text = engine(full_source()).swing_term(SYMBOL).await.unwrap().text;

    let position = |title: &str| {
        let heading = format!("\n{title}\n");
        text.find(&heading)
            .unwrap_or_else(|| panic!("missing block {title:?}"))
    };
    let order = ["Indicators", "Levels", "Volume", "Recent Candles"].map(position);
    assert!(order.windows(2).all(|pair| pair[0] < pair[1]), "{order:?}");
}

// ============================================================
// Determinism and concurrency
// ============================================================

#[tokio::test]
async fn test_same_input_renders_identical_text() {
    for kind in ProfileKind::ALL {
        let first = engine(full_source()).generate_report(kind, SYMBOL).await.unwrap();
        let second = engine(full_source()).generate_report(kind, SYMBOL).await.unwrap();
        assert_eq!(first, second, "{kind} is not deterministic");
    }
}

#[tokio::test]
async fn test_concurrent_requests_match_sequential() {
    let engine = engine(full_source());

    let handles: Vec<_> = ProfileKind::ALL
        .into_iter()
        .map(|kind| {
            let engine = engine.clone();
            tokio::spawn(async move { engine.generate_report(kind, SYMBOL).await })
        })
        .collect();

    for (kind, handle) in ProfileKind::ALL.into_iter().zip(handles) {
        let concurrent = handle.await.unwrap().unwrap();
        let sequential = engine.generate_report(kind, SYMBOL).await.unwrap();
        assert_eq!(concurrent, sequential);
    }
}

// ============================================================
// Errors
// ============================================================

#[tokio::test]
async fn test_short_history_is_insufficient_data() {
    let source = MemorySource::new().with_candles(
        SYMBOL,
        Interval::FifteenMinutes,
        synthetic_candles(Interval::FifteenMinutes, 50, 100.0),
    );

    let err = engine(source).fifteen_minute(SYMBOL).await.unwrap_err();
    assert_eq!(
        err,
        EngineError::insufficient("fifteen-minute report", 96, 50)
    );
}

#[tokio::test]
async fn test_unknown_symbol_propagates() {
    let err = engine(full_source()).hour("ETHUSDT").await.unwrap_err();
    assert_eq!(err, EngineError::InvalidSymbol("ETHUSDT".to_string()));
}

#[tokio::test]
async fn test_malformed_symbol_is_rejected_before_fetch() {
    let err = engine(full_source()).hour("BTC-USDT").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidSymbol);
}

#[tokio::test]
async fn test_symbol_is_normalized() {
    let report = engine(full_source()).hour(" btcusdt ").await.unwrap();
    assert_eq!(report.symbol, SYMBOL);
}

#[tokio::test]
async fn test_upstream_failure_propagates_unchanged() {
    let failure = EngineError::upstream("connection reset by peer");
    let engine = engine(MemorySource::failing(failure.clone()));

    for kind in ProfileKind::ALL {
        let err = engine.generate_report(kind, SYMBOL).await.unwrap_err();
        assert_eq!(err, failure);
    }
}

#[tokio::test]
async fn test_one_sided_book_is_insufficient_data() {
    let source = MemorySource::new().with_book(
        SYMBOL,
        OrderBookSnapshot::from_pairs(&[(100.0, 5.0)], &[]),
    );
    let err = engine(source).book(SYMBOL).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InsufficientData);
}

#[tokio::test]
async fn test_payload_channels() {
    let engine = engine(full_source());

    let ok = ReportPayload::from(engine.volume(SYMBOL).await);
    assert!(ok.is_ok());

    let err = ReportPayload::from(engine.volume("NOPE").await);
    let value: serde_json::Value = serde_json::from_str(&err.to_json().unwrap()).unwrap();
    assert_eq!(value["status"], "error");
    assert_eq!(value["kind"], "invalid_symbol");
}

// ============================================================
// Fetch behaviour
// ============================================================

/// Counts calls and records the requested sizes.
#[derive(Default)]
struct CountingSource {
    inner: MemorySource,
    candle_calls: AtomicUsize,
    book_calls: AtomicUsize,
    last_count: AtomicUsize,
    last_depth: AtomicUsize,
}

#[async_trait]
impl CandleSource for CountingSource {
    async fn fetch_candles(
        &self,
        symbol: &str,
        interval: Interval,
        count: usize,
    ) -> Result<CandleSeries, EngineError> {
        self.candle_calls.fetch_add(1, Ordering::SeqCst);
        self.last_count.store(count, Ordering::SeqCst);
        self.inner.fetch_candles(symbol, interval, count).await
    }

    async fn fetch_order_book(
        &self,
        symbol: &str,
        depth: usize,
    ) -> Result<OrderBookSnapshot, EngineError> {
        self.book_calls.fetch_add(1, Ordering::SeqCst);
        self.last_depth.store(depth, Ordering::SeqCst);
        self.inner.fetch_order_book(symbol, depth).await
    }

    fn name(&self) -> &str {
        "counting"
    }
}

#[tokio::test]
async fn test_profiles_fetch_only_what_they_need() {
    let source = Arc::new(CountingSource {
        inner: full_source(),
        ..CountingSource::default()
    });
    let engine = ReportEngine::new(source.clone(), &AppConfig::default()).unwrap();

    engine.book(SYMBOL).await.unwrap();
    assert_eq!(source.candle_calls.load(Ordering::SeqCst), 0);
    assert_eq!(source.book_calls.load(Ordering::SeqCst), 1);
    assert_eq!(source.last_depth.load(Ordering::SeqCst), 100);

    engine.swing_term(SYMBOL).await.unwrap();
    assert_eq!(source.candle_calls.load(Ordering::SeqCst), 1);
    assert_eq!(source.book_calls.load(Ordering::SeqCst), 1);
    assert_eq!(source.last_count.load(Ordering::SeqCst), 120);
}

#[tokio::test]
async fn test_window_override_changes_request() {
    let source = Arc::new(CountingSource {
        inner: full_source(),
        ..CountingSource::default()
    });
    let mut config = AppConfig::default();
    config.profiles.insert(
        "hour".to_string(),
        ProfileOverride {
            window: Some(150),
            recent_candles: Some(3),
        },
    );
    let engine = ReportEngine::new(source.clone(), &config).unwrap();

    let text = engine.hour(SYMBOL).await.unwrap().text;
    assert_eq!(source.last_count.load(Ordering::SeqCst), 150);
    assert_eq!(header_value(&text, "Candles:"), "150");
}
