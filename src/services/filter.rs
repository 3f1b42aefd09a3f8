// src/services/filter.rs

//! Acceptance rule for feed events.

use crate::models::RawEvent;

/// Round a currency amount to whole cents.
pub fn to_cents(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}

/// Accepts sales where the buyer paid more than the listed price.
#[derive(Debug, Clone, Copy, Default)]
pub struct ItemFilter;

impl ItemFilter {
    pub fn new() -> Self {
        Self
    }

    /// Both amounts are compared in whole cents, never as raw floats.
    pub fn accept(&self, event: &RawEvent) -> bool {
        to_cents(event.amount_paid) > to_cents(event.item_price)
    }
}
