//! Price calculator.
//!
//! Pure functions computing line-item totals and cart grand totals. Amounts
//! are summed unrounded; rounding to currency precision happens once, at
//! presentation time, via [`round_cents`]. No state, no side effects.

use crate::booking::BookingItem;
use crate::error::BookingError;
use std::collections::HashMap;

/// Per-category price multipliers for concession rates.
///
/// Categories the table does not know about get a multiplier of `1.0`, so an
/// empty table prices every party member at the full unit price.
///
/// # Example
///
/// ```
/// use tourbook_core::pricing::RateTable;
///
/// let rates = RateTable::new().with_rate("children", 0.5).unwrap();
/// assert!((rates.multiplier("children") - 0.5).abs() < f64::EPSILON);
/// assert!((rates.multiplier("adults") - 1.0).abs() < f64::EPSILON);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RateTable {
    multipliers: HashMap<String, f64>,
}

impl RateTable {
    /// Creates an empty table (every category at full rate)
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a multiplier for a category.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::InvalidAmount`] for a negative multiplier.
    pub fn with_rate(mut self, category: impl Into<String>, rate: f64) -> Result<Self, BookingError> {
        if rate < 0.0 {
            return Err(BookingError::InvalidAmount { amount: rate });
        }
        self.multipliers.insert(category.into(), rate);
        Ok(self)
    }

    /// The multiplier for a category, `1.0` when unrecognized
    #[must_use]
    pub fn multiplier(&self, category: &str) -> f64 {
        self.multipliers.get(category).copied().unwrap_or(1.0)
    }
}

/// Computes a line total, `unit_price * party_size`.
///
/// # Errors
///
/// Returns [`BookingError::InvalidAmount`] for a negative unit price or a
/// zero party size.
pub fn line_total(unit_price: f64, party_size: u32) -> Result<f64, BookingError> {
    if unit_price < 0.0 {
        return Err(BookingError::InvalidAmount { amount: unit_price });
    }
    if party_size == 0 {
        return Err(BookingError::InvalidAmount { amount: 0.0 });
    }
    Ok(unit_price * f64::from(party_size))
}

/// Computes a total across party categories using a [`RateTable`].
///
/// Used by the booking form to preview a price before commit, e.g.
/// `[("adults", 2), ("children", 1)]` with a children concession.
///
/// # Errors
///
/// Returns [`BookingError::InvalidAmount`] for a negative unit price.
pub fn party_total(
    unit_price: f64,
    parties: &[(&str, u32)],
    rates: &RateTable,
) -> Result<f64, BookingError> {
    if unit_price < 0.0 {
        return Err(BookingError::InvalidAmount { amount: unit_price });
    }
    Ok(parties
        .iter()
        .map(|(category, count)| unit_price * rates.multiplier(category) * f64::from(*count))
        .sum())
}

/// Sums line totals across cart items, unrounded.
///
/// Summation happens on unrounded values so cumulative rounding error cannot
/// creep in; apply [`round_cents`] once to the result for display.
#[must_use]
pub fn cart_total<'a>(items: impl IntoIterator<Item = &'a BookingItem>) -> f64 {
    items.into_iter().map(BookingItem::line_total).sum()
}

/// Rounds an amount to currency precision (2 decimal places).
///
/// Presentation-time only; never feed the result back into a summation.
#[must_use]
pub fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}
