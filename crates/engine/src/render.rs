//! Deterministic text rendering of computed report blocks.
//!
//! Block order is fixed: header, indicators, levels, volume, slope, order
//! book, recent candles. Every number is checked finite before it is
//! written.

#![allow(clippy::format_push_string)]

use market_report_core::format::{
    format_price, format_signed_pct, format_thousands, format_time, price_decimals, BANNER, RULE,
};
use market_report_core::{ensure_finite, CandleSeries, EngineError};
use market_report_indicators::{IndicatorResult, IndicatorSpec};
use market_report_signals::{
    CandleAnalysis, FibonacciLevels, OrderBookAnalysis, PivotPoints, Side, SlopeAnalysis,
    SupportResistance, VolumeAnalysis,
};

use crate::profile::ProfileConfig;

const LABEL_WIDTH: usize = 24;
const MAX_LISTED_SPIKES: usize = 10;

/// Everything computed for one report, ready to render.
#[derive(Debug, Clone, Default)]
pub struct Analysis {
    pub series: Option<CandleSeries>,
    pub indicators: Vec<(IndicatorSpec, IndicatorResult)>,
    pub pivots: Option<PivotPoints>,
    pub fibonacci: Option<FibonacciLevels>,
    pub support_resistance: Option<SupportResistance>,
    pub volume: Option<VolumeAnalysis>,
    /// Period and value of the volume moving average
    pub vma: Option<(usize, f64)>,
    pub slope: Option<SlopeAnalysis>,
    pub book: Option<OrderBookAnalysis>,
    pub book_levels: Option<(usize, usize)>,
    pub candles: Option<CandleAnalysis>,
}

/// Renders a full report.
///
/// # Errors
/// `ComputationError` if any value about to be written is not finite.
pub fn render(
    profile: &ProfileConfig,
    symbol: &str,
    analysis: &Analysis,
) -> Result<String, EngineError> {
    let mut output = String::new();

    render_header(&mut output, profile, symbol, analysis)?;

    if let Some(series) = &analysis.series {
        if !analysis.indicators.is_empty() {
            render_indicators(&mut output, series, &analysis.indicators)?;
        }
        if analysis.pivots.is_some()
            || analysis.fibonacci.is_some()
            || analysis.support_resistance.is_some()
        {
            render_levels(&mut output, analysis)?;
        }
    }
    if let Some(volume) = &analysis.volume {
        render_volume(&mut output, volume, analysis.vma)?;
    }
    if let Some(slope) = &analysis.slope {
        render_slope(&mut output, slope)?;
    }
    if let Some(book) = &analysis.book {
        render_book(&mut output, book)?;
    }
    if let Some(candles) = &analysis.candles {
        render_candles(&mut output, candles, profile.recent_candles)?;
    }

    output.push_str(BANNER);
    output.push('\n');
    Ok(output)
}

// ============================================================
// Number helpers
// ============================================================

fn price(context: &str, value: f64) -> Result<String, EngineError> {
    Ok(format_price(ensure_finite(context, value)?))
}

fn fixed(context: &str, value: f64, decimals: usize) -> Result<String, EngineError> {
    Ok(format!("{:.*}", decimals, ensure_finite(context, value)?))
}

fn signed_pct(context: &str, value: f64) -> Result<String, EngineError> {
    Ok(format_signed_pct(ensure_finite(context, value)?))
}

fn quantity(context: &str, value: f64) -> Result<String, EngineError> {
    Ok(format_thousands(ensure_finite(context, value)?, 2))
}

fn row(output: &mut String, label: &str, value: &str) {
    output.push_str(&format!("{label:<LABEL_WIDTH$}{value}\n"));
}

fn section(output: &mut String, title: &str) {
    output.push('\n');
    output.push_str(title);
    output.push('\n');
    output.push_str(RULE);
    output.push('\n');
}

// ============================================================
// Header
// ============================================================

fn render_header(
    output: &mut String,
    profile: &ProfileConfig,
    symbol: &str,
    analysis: &Analysis,
) -> Result<(), EngineError> {
    output.push_str(BANNER);
    output.push('\n');
    output.push_str(&format!("  {} | {symbol}\n", profile.kind.title()));
    output.push_str(BANNER);
    output.push('\n');

    row(output, "Symbol:", symbol);
    row(output, "Profile:", profile.kind.name());

    if let Some(series) = &analysis.series {
        let candles = series.candles();
        let (first, last) = match (candles.first(), candles.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Err(EngineError::insufficient("report header", 1, 0)),
        };

        let high = candles.iter().map(|c| c.high).fold(f64::NEG_INFINITY, f64::max);
        let low = candles.iter().map(|c| c.low).fold(f64::INFINITY, f64::min);
        let total_volume: f64 = candles.iter().map(|c| c.volume).sum();
        let change_pct = if first.open == 0.0 {
            0.0
        } else {
            (last.close - first.open) / first.open * 100.0
        };

        row(output, "Interval:", series.interval().as_str());
        row(output, "Candles:", &candles.len().to_string());
        row(output, "As of:", &format_time(&last.open_time));
        row(output, "Last close:", &price("last close", last.close)?);
        row(output, "Window change:", &signed_pct("window change", change_pct)?);
        row(
            output,
            "Window high / low:",
            &format!("{} / {}", price("window high", high)?, price("window low", low)?),
        );
        row(output, "Window volume:", &quantity("window volume", total_volume)?);
    }

    if let Some((bids, asks)) = analysis.book_levels {
        row(output, "Book levels:", &format!("{bids} bids / {asks} asks"));
    }
    Ok(())
}

// ============================================================
// Indicators
// ============================================================

const RSI_OVERBOUGHT: f64 = 70.0;
const RSI_OVERSOLD: f64 = 30.0;
const STOCH_OVERBOUGHT: f64 = 80.0;
const STOCH_OVERSOLD: f64 = 20.0;
const CCI_BAND: f64 = 100.0;
const ADX_STRONG: f64 = 25.0;
const ADX_WEAK: f64 = 20.0;

fn zone(value: f64, overbought: f64, oversold: f64) -> &'static str {
    if value > overbought {
        "Overbought"
    } else if value < oversold {
        "Oversold"
    } else {
        "Neutral"
    }
}

fn sign_word(value: f64, positive: &'static str, negative: &'static str) -> &'static str {
    if value > 0.0 {
        positive
    } else if value < 0.0 {
        negative
    } else {
        "Flat"
    }
}

fn render_indicators(
    output: &mut String,
    series: &CandleSeries,
    indicators: &[(IndicatorSpec, IndicatorResult)],
) -> Result<(), EngineError> {
    section(output, "Indicators");

    let last_close = series.last().map_or(0.0, |c| c.close);

    for (spec, result) in indicators {
        let label = spec.label();
        if !result.is_finite() {
            return Err(EngineError::computation(format!(
                "{label} produced a non-finite value"
            )));
        }
        let line = describe(spec, result, last_close, &label)?;
        row(output, &format!("{label}:"), &line);
    }
    Ok(())
}

fn describe(
    spec: &IndicatorSpec,
    result: &IndicatorResult,
    last_close: f64,
    label: &str,
) -> Result<String, EngineError> {
    let text = match (spec, result) {
        (
            IndicatorSpec::Sma(_)
            | IndicatorSpec::Ema(_)
            | IndicatorSpec::Dema(_)
            | IndicatorSpec::Wma(_),
            IndicatorResult::Value(v),
        ) => {
            let position = if last_close > *v {
                "price above"
            } else if last_close < *v {
                "price below"
            } else {
                "price at"
            };
            format!("{}  ({position})", price(label, *v)?)
        }
        (IndicatorSpec::Rsi(_), IndicatorResult::Value(v)) => format!(
            "{}  ({})",
            fixed(label, *v, 2)?,
            zone(*v, RSI_OVERBOUGHT, RSI_OVERSOLD)
        ),
        (IndicatorSpec::Cci(_), IndicatorResult::Value(v)) => format!(
            "{}  ({})",
            fixed(label, *v, 2)?,
            zone(*v, CCI_BAND, -CCI_BAND)
        ),
        (IndicatorSpec::Momentum(_), IndicatorResult::Value(v)) => format!(
            "{:+.*}  ({})",
            price_decimals(last_close),
            v,
            sign_word(*v, "Positive", "Negative")
        ),
        (IndicatorSpec::Roc(_), IndicatorResult::Value(v)) => format!(
            "{}  ({})",
            signed_pct(label, *v)?,
            sign_word(*v, "Positive", "Negative")
        ),
        (IndicatorSpec::Atr(_), IndicatorResult::Value(v)) => {
            let pct = if last_close == 0.0 {
                0.0
            } else {
                v / last_close * 100.0
            };
            format!("{}  ({:.2}% of price)", price(label, *v)?, pct)
        }
        (_, IndicatorResult::Stochastic(s)) => format!(
            "%K {}  %D {}  ({})",
            fixed(label, s.k, 2)?,
            fixed(label, s.d, 2)?,
            zone(s.k, STOCH_OVERBOUGHT, STOCH_OVERSOLD)
        ),
        (_, IndicatorResult::Macd(m)) => format!(
            "MACD {}  Signal {}  Hist {}  ({})",
            fixed(label, m.macd, 4)?,
            fixed(label, m.signal, 4)?,
            fixed(label, m.histogram, 4)?,
            sign_word(m.histogram, "Bullish", "Bearish")
        ),
        (_, IndicatorResult::Bollinger(b)) => format!(
            "U {}  M {}  L {}  (%B {:.2}, width {:.2}%)",
            price(label, b.upper)?,
            price(label, b.middle)?,
            price(label, b.lower)?,
            b.percent_b(last_close),
            b.width_pct()
        ),
        (_, IndicatorResult::Adx(a)) => {
            let strength = if a.adx >= ADX_STRONG {
                "Strong trend"
            } else if a.adx < ADX_WEAK {
                "Weak trend"
            } else {
                "Developing trend"
            };
            let direction = if a.plus_di > a.minus_di {
                "up"
            } else if a.plus_di < a.minus_di {
                "down"
            } else {
                "none"
            };
            format!(
                "ADX {}  +DI {}  -DI {}  ({strength}, bias {direction})",
                fixed(label, a.adx, 2)?,
                fixed(label, a.plus_di, 2)?,
                fixed(label, a.minus_di, 2)?
            )
        }
        (_, IndicatorResult::Value(v)) => fixed(label, *v, 4)?,
    };
    Ok(text)
}

// ============================================================
// Levels
// ============================================================

fn render_levels(output: &mut String, analysis: &Analysis) -> Result<(), EngineError> {
    section(output, "Levels");

    if let Some(pivots) = &analysis.pivots {
        output.push_str("Pivot points (last closed candle)\n");
        for level in pivots.to_levels() {
            row(
                output,
                &format!("  {}", level.label),
                &price(&level.label, level.price)?,
            );
        }
    }

    if let Some(fib) = &analysis.fibonacci {
        output.push_str(&format!(
            "Fibonacci ({} swing {} -> {})\n",
            fib.direction.as_str(),
            price("swing low", fib.swing_low)?,
            price("swing high", fib.swing_high)?
        ));
        for level in fib.retracements.iter().chain(&fib.extensions) {
            row(
                output,
                &format!("  {}", level.label),
                &price(&level.label, level.price)?,
            );
        }
    }

    if let Some(sr) = &analysis.support_resistance {
        output.push_str("Support / resistance\n");
        if sr.resistances.is_empty() && sr.supports.is_empty() {
            output.push_str("  none detected\n");
        }
        let clusters = sr.resistances.iter().chain(&sr.supports);
        for (level, cluster) in sr.to_levels().iter().zip(clusters) {
            row(
                output,
                &format!("  {}", level.label),
                &format!(
                    "{}  ({} touches, {})",
                    price(&level.label, level.price)?,
                    cluster.touches,
                    signed_pct(&level.label, cluster.distance_pct)?
                ),
            );
        }
    }
    Ok(())
}

// ============================================================
// Volume / slope / order book
// ============================================================

fn render_volume(
    output: &mut String,
    volume: &VolumeAnalysis,
    vma: Option<(usize, f64)>,
) -> Result<(), EngineError> {
    section(output, "Volume");

    row(output, "Average volume:", &quantity("average volume", volume.average_volume)?);
    row(
        output,
        "Last volume:",
        &format!(
            "{}  ({}x average)",
            quantity("last volume", volume.last_volume)?,
            fixed("last volume ratio", volume.last_ratio, 2)?
        ),
    );
    row(
        output,
        "Max volume:",
        &format!(
            "{}  at {}",
            quantity("max volume", volume.max_volume)?,
            format_time(&volume.max_volume_time)
        ),
    );
    let change = match volume.trend_change_pct {
        Some(pct) => signed_pct("volume trend", pct)?,
        None => "n/a".to_string(),
    };
    row(
        output,
        "Trend:",
        &format!("{}  ({change})", volume.trend.as_str()),
    );
    if let Some((period, value)) = vma {
        row(output, &format!("VMA({period}):"), &quantity("VMA", value)?);
    }

    row(output, "Spikes:", &volume.spikes.len().to_string());
    let skip = volume.spikes.len().saturating_sub(MAX_LISTED_SPIKES);
    for spike in &volume.spikes[skip..] {
        output.push_str(&format!(
            "  {}  {}  ({}x)\n",
            format_time(&spike.open_time),
            quantity("spike volume", spike.volume)?,
            fixed("spike ratio", spike.ratio, 2)?
        ));
    }
    Ok(())
}

fn render_slope(output: &mut String, slope: &SlopeAnalysis) -> Result<(), EngineError> {
    section(output, "Slope");

    let direction = sign_word(slope.slope_per_candle, "Rising", "Falling");
    let strength = slope.price_volume_strength;
    let agreement = if strength >= 0.5 {
        "volume confirms price"
    } else if strength <= -0.5 {
        "volume opposes price"
    } else {
        "weak relationship"
    };

    row(output, "Candles:", &slope.candles.to_string());
    row(
        output,
        "Slope per candle:",
        &format!("{}  ({direction})", fixed("slope", slope.slope_per_candle, 6)?),
    );
    row(output, "Slope per minute:", &fixed("slope per minute", slope.slope_per_minute, 6)?);
    row(output, "Slope % of mean:", &signed_pct("slope %", slope.slope_pct)?);
    row(output, "R squared:", &fixed("r squared", slope.r_squared, 4)?);
    row(output, "Momentum:", &fixed("momentum", slope.momentum, 4)?);
    row(output, "VWAP:", &price("VWAP", slope.vwap)?);
    row(
        output,
        "Close vs VWAP:",
        &signed_pct("VWAP deviation", slope.vwap_deviation_pct)?,
    );
    row(output, "Volume MA:", &quantity("VMA", slope.vma)?);
    row(
        output,
        "Volume momentum:",
        &fixed("volume momentum", slope.volume_momentum, 2)?,
    );
    row(
        output,
        "Price-volume strength:",
        &format!("{}  ({agreement})", fixed("price-volume strength", strength, 4)?),
    );
    Ok(())
}

fn render_book(output: &mut String, book: &OrderBookAnalysis) -> Result<(), EngineError> {
    section(output, "Order Book");

    let dominant = match book.dominant_side() {
        Some(Side::Bid) => "bids dominate",
        Some(Side::Ask) => "asks dominate",
        None => "balanced",
    };

    row(output, "Best bid:", &price("best bid", book.best_bid)?);
    row(output, "Best ask:", &price("best ask", book.best_ask)?);
    row(output, "Mid:", &price("mid", book.mid)?);
    row(
        output,
        "Spread:",
        &format!(
            "{}  ({:.4}%)",
            price("spread", book.spread)?,
            ensure_finite("spread %", book.spread_pct)?
        ),
    );
    row(output, "Bid depth:", &quantity("bid depth", book.bid_depth)?);
    row(output, "Ask depth:", &quantity("ask depth", book.ask_depth)?);
    row(
        output,
        "Imbalance:",
        &format!("{}  ({dominant})", fixed("imbalance", book.imbalance, 4)?),
    );

    for (title, levels) in [("Top bids", &book.top_bids), ("Top asks", &book.top_asks)] {
        output.push_str(&format!("{title}\n"));
        for level in levels.iter() {
            output.push_str(&format!(
                "  {:>16}  {:>16}  {:>7}%\n",
                price(title, level.price)?,
                quantity(title, level.quantity)?,
                fixed(title, level.share_pct, 2)?
            ));
        }
    }
    Ok(())
}

// ============================================================
// Recent candles
// ============================================================

fn render_candles(
    output: &mut String,
    analysis: &CandleAnalysis,
    recent: usize,
) -> Result<(), EngineError> {
    section(output, "Recent Candles");

    output.push_str(&format!(
        "{:<21}{:>14}{:>14}{:>14}{:>14}{:>16}{:>8}{:>8}  {}\n",
        "Time", "Open", "High", "Low", "Close", "Volume", "Vol%", "Body%", "Type"
    ));

    let skip = analysis.candles.len().saturating_sub(recent);
    for c in &analysis.candles[skip..] {
        let marker = if c.high_volatility { " *" } else { "" };
        output.push_str(&format!(
            "{:<21}{:>14}{:>14}{:>14}{:>14}{:>16}{:>8}{:>8}  {}{marker}\n",
            format_time(&c.open_time),
            price("open", c.open)?,
            price("high", c.high)?,
            price("low", c.low)?,
            price("close", c.close)?,
            quantity("volume", c.volume)?,
            fixed("volatility %", c.volatility_pct, 2)?,
            fixed("body %", c.body_pct, 1)?,
            c.kind.as_str()
        ));
    }

    let s = &analysis.summary;
    output.push_str(&format!(
        "Window: {} bullish, {} bearish, {} doji; mean volatility {}%; {} high-volatility (*)\n",
        s.bullish,
        s.bearish,
        s.doji,
        fixed("mean volatility", s.mean_volatility_pct, 2)?,
        s.high_volatility
    ));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use market_report_core::{Candle, ErrorKind, Interval, OrderBookSnapshot};
    use market_report_signals::{
        CandleClassifier, LevelCluster, OrderBookAnalyzer, VolumeAnalyzer,
    };

    use crate::profile::ProfileKind;

    fn joined(lines: &[&str]) -> String {
        lines.iter().map(|line| format!("{line}\n")).collect()
    }

    fn flat_candles(count: usize) -> Vec<Candle> {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        (0..count)
            .map(|i| Candle {
                open_time: start + Duration::hours(i as i64),
                open: 100.0,
                high: 101.0,
                low: 99.0,
                close: 100.0,
                volume: 10.0,
            })
            .collect()
    }

    // ============================================================
    // Full reports
    // ============================================================

    #[test]
    fn book_report_text() {
        let book = OrderBookSnapshot::from_pairs(
            &[(100.0, 5.0), (99.0, 3.0)],
            &[(101.0, 2.0), (102.0, 1.0)],
        );
        let analysis = Analysis {
            book: Some(OrderBookAnalyzer::default().analyze(&book).unwrap()),
            book_levels: Some((2, 2)),
            ..Analysis::default()
        };

        let text = render(&ProfileConfig::builtin(ProfileKind::Book), "BTCUSDT", &analysis).unwrap();

        let expected = joined(&[
            BANNER,
            "  ORDER BOOK REPORT | BTCUSDT",
            BANNER,
            "Symbol:                 BTCUSDT",
            "Profile:                book",
            "Book levels:            2 bids / 2 asks",
            "",
            "Order Book",
            RULE,
            "Best bid:               100.0000",
            "Best ask:               101.0000",
            "Mid:                    100.5000",
            "Spread:                 1.0000  (0.9950%)",
            "Bid depth:              8.00",
            "Ask depth:              3.00",
            "Imbalance:              0.4545  (bids dominate)",
            "Top bids",
            "          100.0000              5.00    62.50%",
            "           99.0000              3.00    37.50%",
            "Top asks",
            "          101.0000              2.00    66.67%",
            "          102.0000              1.00    33.33%",
            BANNER,
        ]);
        assert_eq!(text, expected);
    }

    #[test]
    fn flat_volume_report_text() {
        let candles = flat_candles(3);
        let analysis = Analysis {
            series: Some(CandleSeries::new(Interval::OneHour, candles.clone()).unwrap()),
            volume: Some(VolumeAnalyzer::default().analyze(&candles).unwrap()),
            vma: Some((3, 10.0)),
            candles: Some(CandleClassifier::default().classify(&candles).unwrap()),
            ..Analysis::default()
        };

        let text =
            render(&ProfileConfig::builtin(ProfileKind::Volume), "BTCUSDT", &analysis).unwrap();

        let expected = joined(&[
            BANNER,
            "  VOLUME REPORT | BTCUSDT",
            BANNER,
            "Symbol:                 BTCUSDT",
            "Profile:                volume",
            "Interval:               1h",
            "Candles:                3",
            "As of:                  2024-01-01 02:00 UTC",
            "Last close:             100.0000",
            "Window change:          +0.00%",
            "Window high / low:      101.0000 / 99.0000",
            "Window volume:          30.00",
            "",
            "Volume",
            RULE,
            "Average volume:         10.00",
            "Last volume:            10.00  (1.00x average)",
            "Max volume:             10.00  at 2024-01-01 00:00 UTC",
            "Trend:                  Stable  (+0.00%)",
            "VMA(3):                 10.00",
            "Spikes:                 0",
            "",
            "Recent Candles",
            RULE,
            "Time                           Open          High           Low         Close          Volume    Vol%   Body%  Type",
            "2024-01-01 00:00 UTC       100.0000      101.0000       99.0000      100.0000           10.00    2.00     0.0  Doji",
            "2024-01-01 01:00 UTC       100.0000      101.0000       99.0000      100.0000           10.00    2.00     0.0  Doji",
            "2024-01-01 02:00 UTC       100.0000      101.0000       99.0000      100.0000           10.00    2.00     0.0  Doji",
            "Window: 0 bullish, 0 bearish, 3 doji; mean volatility 2.00%; 0 high-volatility (*)",
            BANNER,
        ]);
        assert_eq!(text, expected);
    }

    #[test]
    fn recent_candles_limit_rows() {
        let candles = flat_candles(5);
        let analysis = Analysis {
            candles: Some(CandleClassifier::default().classify(&candles).unwrap()),
            ..Analysis::default()
        };
        let mut profile = ProfileConfig::builtin(ProfileKind::Volume);
        profile.recent_candles = 2;

        let text = render(&profile, "BTCUSDT", &analysis).unwrap();
        assert_eq!(text.matches("  Doji\n").count(), 2);
        assert!(!text.contains("2024-01-01 02:00 UTC"));
        assert!(text.contains("2024-01-01 04:00 UTC"));
    }

    // ============================================================
    // Blocks
    // ============================================================

    #[test]
    fn support_resistance_rows() {
        let analysis = Analysis {
            support_resistance: Some(SupportResistance {
                resistances: vec![LevelCluster {
                    price: 105.0,
                    touches: 3,
                    distance_pct: 5.0,
                }],
                supports: vec![LevelCluster {
                    price: 95.0,
                    touches: 2,
                    distance_pct: -5.0,
                }],
            }),
            ..Analysis::default()
        };

        let mut output = String::new();
        render_levels(&mut output, &analysis).unwrap();

        let expected = format!(
            "\nLevels\n{RULE}\n{}",
            joined(&[
                "Support / resistance",
                "  Resistance 1          105.0000  (3 touches, +5.00%)",
                "  Support 1             95.0000  (2 touches, -5.00%)",
            ])
        );
        assert_eq!(output, expected);
    }

    #[test]
    fn empty_support_resistance_says_none() {
        let analysis = Analysis {
            support_resistance: Some(SupportResistance {
                resistances: Vec::new(),
                supports: Vec::new(),
            }),
            ..Analysis::default()
        };

        let mut output = String::new();
        render_levels(&mut output, &analysis).unwrap();
        assert!(output.ends_with("Support / resistance\n  none detected\n"));
    }

    #[test]
    fn non_finite_value_is_computation_error() {
        let candles = flat_candles(3);
        let mut volume = VolumeAnalyzer::default().analyze(&candles).unwrap();
        volume.average_volume = f64::NAN;
        let analysis = Analysis {
            volume: Some(volume),
            ..Analysis::default()
        };

        let err = render(&ProfileConfig::builtin(ProfileKind::Volume), "BTCUSDT", &analysis)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ComputationError);
    }
}
