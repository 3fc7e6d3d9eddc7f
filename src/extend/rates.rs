//! Index rates for the extend dimension

use std::collections::BTreeMap;

/// Values at or above this are pinned to it while indexing
pub const VALUE_CEILING: f64 = 9e99;

/// Index rates keyed by the domain position of the extend label.
///
/// The rate at position `k` moves a value from `k` to `k + 1`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndexRates {
    rates: BTreeMap<usize, f64>,
}

impl IndexRates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, position: usize, rate: f64) {
        self.rates.insert(position, rate);
    }

    pub fn rate(&self, position: usize) -> Option<f64> {
        self.rates.get(&position).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    /// Positions without a rate, among every domain position but the last
    pub fn missing(&self, domain_len: usize) -> Vec<usize> {
        (0..domain_len.saturating_sub(1))
            .filter(|p| !self.rates.contains_key(p))
            .collect()
    }

    /// Moves `value` from position `from` to position `to`, one step at a time.
    ///
    /// Forward steps multiply by `1 + rate`, backward steps divide by it.
    /// Every step is rounded by `round`.
    pub fn index(&self, value: f64, from: usize, to: usize, round: impl Fn(f64) -> f64) -> f64 {
        let step = |v: f64| if v >= VALUE_CEILING { VALUE_CEILING } else { round(v) };
        let mut v = value;
        if from < to {
            for k in from..to {
                v = step(v * (1.0 + self.rate(k).unwrap_or(0.0)));
            }
        } else {
            for j in (to..from).rev() {
                v = step(v / (1.0 + self.rate(j).unwrap_or(0.0)));
            }
        }
        v
    }
}

/// Rounds to cents
pub fn round_cents(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
