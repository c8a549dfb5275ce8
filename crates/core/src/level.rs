use serde::{Deserialize, Serialize};

/// What a derived price level represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LevelKind {
    Support,
    Resistance,
    Pivot,
    Fibonacci,
}

/// A derived price level; never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    pub price: f64,
    pub kind: LevelKind,
    /// Short display label, e.g. `R1` or `Fib 61.8%`
    pub label: String,
}

impl Level {
    pub fn new(price: f64, kind: LevelKind, label: impl Into<String>) -> Self {
        Self {
            price,
            kind,
            label: label.into(),
        }
    }
}
