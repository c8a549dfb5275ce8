//! Deterministic synthetic market data for fixtures and tests.

use chrono::{DateTime, Duration, Utc};

use market_report_core::{Candle, Interval, OrderBookSnapshot};

/// 2024-01-01T00:00:00Z
const START_SECS: i64 = 1_704_067_200;

/// Every n-th candle carries a volume burst.
const BURST_EVERY: usize = 17;

/// Generates `count` contiguous candles oscillating around `base_price`.
///
/// The same arguments always produce the same candles. Prices follow two
/// superimposed waves plus a slow drift; volume oscillates with a periodic
/// burst so spike detection has something to find.
#[must_use]
pub fn synthetic_candles(interval: Interval, count: usize, base_price: f64) -> Vec<Candle> {
    let start = DateTime::<Utc>::UNIX_EPOCH + Duration::seconds(START_SECS);
    let step = Duration::minutes(i64::from(interval.minutes()));

    let mut candles = Vec::with_capacity(count);
    let mut open = base_price;
    let mut open_time = start;
    for i in 0..count {
        let t = i as f64;
        let close = base_price
            * (1.0 + 0.02 * (t / 7.0).sin() + 0.01 * (t / 3.1).sin() + 0.0005 * t);
        let high = open.max(close) * (1.0 + 0.002 + 0.001 * (t / 2.0).sin().abs());
        let low = open.min(close) * (1.0 - 0.002 - 0.001 * (t / 2.0).cos().abs());

        let burst = if i % BURST_EVERY == BURST_EVERY - 1 {
            2_500.0
        } else {
            0.0
        };
        let volume = 1_000.0 * (1.0 + 0.3 * (t / 5.0).sin()) + burst;

        candles.push(Candle {
            open_time,
            open,
            high,
            low,
            close,
            volume,
        });
        open = close;
        open_time += step;
    }
    candles
}

/// Generates a book with `levels` levels per side around `mid`.
///
/// Bid quantities grow with distance from mid faster than asks, so the book
/// leans to the bid side.
#[must_use]
pub fn synthetic_book(mid: f64, levels: usize) -> OrderBookSnapshot {
    let tick = mid * 0.0001;
    let bids: Vec<(f64, f64)> = (0..levels)
        .map(|i| {
            let n = i as f64;
            (mid - tick * (n + 1.0), 1.0 + 0.15 * n)
        })
        .collect();
    let asks: Vec<(f64, f64)> = (0..levels)
        .map(|i| {
            let n = i as f64;
            (mid + tick * (n + 1.0), 1.0 + 0.1 * n)
        })
        .collect();
    OrderBookSnapshot::from_pairs(&bids, &asks)
}
