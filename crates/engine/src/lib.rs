//! Profile-driven report generation.
//!
//! A [`ReportEngine`] wraps a [`CandleSource`](market_report_core::CandleSource)
//! and a [`ProfileCatalog`]. Each request fetches candles and (optionally) an
//! order book, runs the analysers the profile enables, and renders a
//! plain-text report.

pub mod pipeline;
pub mod profile;
pub mod render;
pub mod report;

pub use pipeline::ReportEngine;
pub use profile::{
    Blocks, ProfileCatalog, ProfileConfig, ProfileKind, DEFAULT_RECENT_CANDLES, MAX_WINDOW,
};
pub use report::{Report, ReportPayload};
