//! Candle sources that do not touch the network.
//!
//! This crate provides:
//! - [`CsvCandleSource`] reading CSV/JSON fixture directories
//! - [`MemorySource`] serving preloaded data, used throughout the tests
//! - [`CsvStorage`] writing fixtures in the format the CSV source reads
//! - deterministic synthetic candles and order books

pub mod csv_source;
pub mod csv_storage;
pub mod memory;
pub mod synthetic;

// Re-export commonly used types
pub use csv_source::{book_path, candle_path, parse_candles, BookFile, CandleRow, CsvCandleSource};
pub use csv_storage::CsvStorage;
pub use memory::MemorySource;
pub use synthetic::{synthetic_book, synthetic_candles};
