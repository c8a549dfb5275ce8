//! Generic report pipeline: fetch, analyze, render.

use std::sync::Arc;

use market_report_core::{
    AppConfig, BookConfig, CandleSeries, CandleSource, ConfigError, EngineError,
    OrderBookSnapshot, Thresholds,
};
use market_report_signals::{
    CandleClassifier, LevelDetector, OrderBookAnalyzer, VolumeAnalyzer,
};

use crate::profile::{ProfileCatalog, ProfileConfig, ProfileKind};
use crate::render::{render, Analysis};
use crate::report::Report;

/// Produces reports for any profile in its catalogue.
///
/// Holds only the injected candle source and immutable configuration, so
/// clones can serve requests concurrently.
#[derive(Clone)]
pub struct ReportEngine {
    source: Arc<dyn CandleSource>,
    catalog: Arc<ProfileCatalog>,
    thresholds: Thresholds,
    book: BookConfig,
}

impl std::fmt::Debug for ReportEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportEngine")
            .field("source", &self.source.name())
            .field("profiles", &self.catalog.len())
            .field("thresholds", &self.thresholds)
            .field("book", &self.book)
            .finish()
    }
}

impl ReportEngine {
    /// Creates an engine with the catalogue built from `config`.
    ///
    /// # Errors
    /// Returns a [`ConfigError`] if configuration or any profile is invalid.
    pub fn new(source: Arc<dyn CandleSource>, config: &AppConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let catalog = ProfileCatalog::new(config)?;
        Ok(Self::with_catalog(
            source,
            catalog,
            config.thresholds.clone(),
            config.book.clone(),
        ))
    }

    /// Creates an engine over an already validated catalogue.
    #[must_use]
    pub fn with_catalog(
        source: Arc<dyn CandleSource>,
        catalog: ProfileCatalog,
        thresholds: Thresholds,
        book: BookConfig,
    ) -> Self {
        Self {
            source,
            catalog: Arc::new(catalog),
            thresholds,
            book,
        }
    }

    #[must_use]
    pub fn catalog(&self) -> &ProfileCatalog {
        &self.catalog
    }

    /// Generates one report.
    ///
    /// # Errors
    /// - `InvalidSymbol` for an empty symbol or one the source rejects
    /// - `UpstreamUnavailable` when the source fails
    /// - `InsufficientData` when the source returns fewer candles than the
    ///   profile window
    /// - `ComputationError` when a numeric guard trips
    pub async fn generate_report(
        &self,
        kind: ProfileKind,
        symbol: &str,
    ) -> Result<Report, EngineError> {
        let symbol = normalize_symbol(symbol)?;
        let profile = self.catalog.get(kind).ok_or_else(|| {
            EngineError::computation(format!("profile {kind} is not in the catalogue"))
        })?;

        tracing::debug!(profile = %kind, symbol = %symbol, source = self.source.name(), "generating report");

        let result = self.run(profile, &symbol).await;
        match &result {
            Ok(report) => tracing::info!(
                profile = %kind,
                symbol = %symbol,
                bytes = report.text.len(),
                "report generated"
            ),
            Err(e) => tracing::warn!(
                profile = %kind,
                symbol = %symbol,
                kind = %e.kind(),
                error = %e,
                "report failed"
            ),
        }
        result
    }

    async fn run(&self, profile: &ProfileConfig, symbol: &str) -> Result<Report, EngineError> {
        let (series, book) = self.fetch(profile, symbol).await?;
        let analysis = self.analyze(profile, series, book)?;
        let text = render(profile, symbol, &analysis)?;
        Ok(Report {
            profile: profile.kind,
            symbol: symbol.to_string(),
            text,
        })
    }

    async fn fetch(
        &self,
        profile: &ProfileConfig,
        symbol: &str,
    ) -> Result<(Option<CandleSeries>, Option<OrderBookSnapshot>), EngineError> {
        let (series, book) = tokio::try_join!(
            self.fetch_series(profile, symbol),
            self.fetch_book(profile, symbol)
        )?;

        let series = match series {
            Some(series) => Some(self.window_of(profile, series)?),
            None => None,
        };
        Ok((series, book))
    }

    async fn fetch_series(
        &self,
        profile: &ProfileConfig,
        symbol: &str,
    ) -> Result<Option<CandleSeries>, EngineError> {
        let Some(interval) = profile.interval else {
            return Ok(None);
        };
        let series = self
            .source
            .fetch_candles(symbol, interval, profile.window)
            .await?;
        tracing::debug!(candles = series.len(), interval = %interval, "fetched candles");
        Ok(Some(series))
    }

    async fn fetch_book(
        &self,
        profile: &ProfileConfig,
        symbol: &str,
    ) -> Result<Option<OrderBookSnapshot>, EngineError> {
        if !profile.blocks.order_book {
            return Ok(None);
        }
        let book = self.source.fetch_order_book(symbol, self.book.depth).await?;
        tracing::debug!(
            bids = book.bids.len(),
            asks = book.asks.len(),
            "fetched order book"
        );
        Ok(Some(book))
    }

    /// Trims to the profile window, failing when the source returned less.
    fn window_of(
        &self,
        profile: &ProfileConfig,
        series: CandleSeries,
    ) -> Result<CandleSeries, EngineError> {
        if series.len() < profile.window {
            return Err(EngineError::insufficient(
                format!("{} report", profile.kind),
                profile.window,
                series.len(),
            ));
        }
        if series.len() == profile.window {
            return Ok(series);
        }
        CandleSeries::new(series.interval(), series.tail(profile.window).to_vec())
    }

    fn analyze(
        &self,
        profile: &ProfileConfig,
        series: Option<CandleSeries>,
        book: Option<OrderBookSnapshot>,
    ) -> Result<Analysis, EngineError> {
        let mut analysis = Analysis::default();
        let blocks = profile.blocks;

        if let Some(series) = &series {
            let candles = series.candles();

            analysis.indicators = profile
                .indicators
                .iter()
                .map(|spec| spec.compute(series).map(|result| (*spec, result)))
                .collect::<Result<_, _>>()?;

            let detector = LevelDetector::from_thresholds(&self.thresholds);
            if blocks.pivots {
                analysis.pivots = Some(detector.pivots(candles)?);
            }
            if blocks.fibonacci {
                analysis.fibonacci = Some(detector.fibonacci(candles)?);
            }
            if blocks.support_resistance {
                analysis.support_resistance = Some(detector.support_resistance(candles)?);
            }
            if blocks.volume {
                analysis.volume =
                    Some(VolumeAnalyzer::from_thresholds(&self.thresholds).analyze(candles)?);
                if let Some(period) = blocks.vma_period {
                    let volumes = series.volumes();
                    analysis.vma = Some((
                        period,
                        market_report_indicators::sma(&volumes, period)?,
                    ));
                }
            }
            if let Some(slope) = blocks.slope {
                analysis.slope = Some(slope.analyze(series)?);
            }
            if blocks.candles {
                analysis.candles =
                    Some(CandleClassifier::from_thresholds(&self.thresholds).classify(candles)?);
            }
        }

        if let Some(book) = &book {
            analysis.book = Some(OrderBookAnalyzer::from_config(&self.book).analyze(book)?);
            analysis.book_levels = Some((book.bids.len(), book.asks.len()));
        }

        analysis.series = series;
        Ok(analysis)
    }

    // ============================================================
    // One entry point per profile
    // ============================================================

    /// # Errors
    /// See [`generate_report`](Self::generate_report).
    pub async fn one_minute(&self, symbol: &str) -> Result<Report, EngineError> {
        self.generate_report(ProfileKind::OneMinute, symbol).await
    }

    /// # Errors
    /// See [`generate_report`](Self::generate_report).
    pub async fn fifteen_minute(&self, symbol: &str) -> Result<Report, EngineError> {
        self.generate_report(ProfileKind::FifteenMinute, symbol).await
    }

    /// # Errors
    /// See [`generate_report`](Self::generate_report).
    pub async fn thirty_minute(&self, symbol: &str) -> Result<Report, EngineError> {
        self.generate_report(ProfileKind::ThirtyMinute, symbol).await
    }

    /// # Errors
    /// See [`generate_report`](Self::generate_report).
    pub async fn hour(&self, symbol: &str) -> Result<Report, EngineError> {
        self.generate_report(ProfileKind::Hour, symbol).await
    }

    /// # Errors
    /// See [`generate_report`](Self::generate_report).
    pub async fn short_term(&self, symbol: &str) -> Result<Report, EngineError> {
        self.generate_report(ProfileKind::ShortTerm, symbol).await
    }

    /// # Errors
    /// See [`generate_report`](Self::generate_report).
    pub async fn swing_term(&self, symbol: &str) -> Result<Report, EngineError> {
        self.generate_report(ProfileKind::SwingTerm, symbol).await
    }

    /// # Errors
    /// See [`generate_report`](Self::generate_report).
    pub async fn long_term(&self, symbol: &str) -> Result<Report, EngineError> {
        self.generate_report(ProfileKind::LongTerm, symbol).await
    }

    /// # Errors
    /// See [`generate_report`](Self::generate_report).
    pub async fn volume(&self, symbol: &str) -> Result<Report, EngineError> {
        self.generate_report(ProfileKind::Volume, symbol).await
    }

    /// # Errors
    /// See [`generate_report`](Self::generate_report).
    pub async fn book(&self, symbol: &str) -> Result<Report, EngineError> {
        self.generate_report(ProfileKind::Book, symbol).await
    }

    /// # Errors
    /// See [`generate_report`](Self::generate_report).
    pub async fn slope(&self, symbol: &str) -> Result<Report, EngineError> {
        self.generate_report(ProfileKind::Slope, symbol).await
    }
}

/// Upper-cases and trims a symbol, rejecting empty or non-alphanumeric input.
fn normalize_symbol(symbol: &str) -> Result<String, EngineError> {
    let trimmed = symbol.trim();
    if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(EngineError::InvalidSymbol(symbol.to_string()));
    }
    Ok(trimmed.to_ascii_uppercase())
}
