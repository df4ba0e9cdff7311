//! Error taxonomy for the booking coordinator.

use thiserror::Error;

/// Errors surfaced by the coordinator's validation and lookup paths.
///
/// Removal operations deliberately never error on a missing id: a stale UI or
/// a double-click makes "remove something already removed" a normal
/// occurrence, so those operations are no-ops instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BookingError {
    /// A negative price or a non-positive party size reached the calculator
    #[error("invalid amount: {amount}")]
    InvalidAmount {
        /// The offending value
        amount: f64,
    },

    /// A confirmation request is missing required fields
    ///
    /// The caller is responsible for user-visible messaging; the store never
    /// partially applies a rejected confirmation.
    #[error("invalid booking details: {reason}")]
    InvalidBookingDetails {
        /// What was wrong with the request
        reason: String,
    },

    /// Lookup of a confirmed booking id that is not in the store
    ///
    /// A normal result, not an exceptional condition: detail views render a
    /// "not found" state from it.
    #[error("booking not found")]
    NotFound,
}

impl BookingError {
    /// Shorthand for an [`InvalidBookingDetails`](Self::InvalidBookingDetails)
    /// with the given reason.
    #[must_use]
    pub fn invalid_details(reason: impl Into<String>) -> Self {
        Self::InvalidBookingDetails {
            reason: reason.into(),
        }
    }
}
