//! The `BookingState` root aggregate.
//!
//! Two ordered collections: cart lines in insertion order, confirmed bookings
//! newest-first. All derived values (counts, totals) are recomputed from the
//! collections on every read; nothing is cached that could drift.
//!
//! The mutator methods here are event-application primitives used by the
//! reducer. External code goes through the store's operation API and only
//! ever sees cloned snapshots of this type.

use crate::booking::{
    BookingId, BookingItem, BookingStatus, CartItemId, ConfirmedBooking, ReferenceCode,
};
use crate::pricing;
use serde::{Deserialize, Serialize};

/// The whole session state: cart lines plus confirmed bookings.
///
/// Created empty at session start, serialized in full to client-local
/// storage on every mutation. Fields missing from an older snapshot
/// deserialize to empty collections rather than failing the parse.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BookingState {
    /// Cart lines, insertion order preserved, ids unique
    #[serde(default)]
    cart_items: Vec<BookingItem>,
    /// Confirmed bookings, newest first, ids unique
    #[serde(default)]
    confirmed_bookings: Vec<ConfirmedBooking>,
}

impl BookingState {
    /// Creates an empty state
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The cart lines, in insertion order
    #[must_use]
    pub fn cart_items(&self) -> &[BookingItem] {
        &self.cart_items
    }

    /// The confirmed bookings, newest first
    #[must_use]
    pub fn confirmed_bookings(&self) -> &[ConfirmedBooking] {
        &self.confirmed_bookings
    }

    /// Number of people across all cart lines.
    ///
    /// This is the cart-badge convention: a line for a party of 3 counts as
    /// 3. See [`line_count`](Self::line_count) for the number of lines.
    #[must_use]
    pub fn traveler_count(&self) -> u32 {
        self.cart_items.iter().map(|item| item.party_size).sum()
    }

    /// Number of cart lines
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.cart_items.len()
    }

    /// The cart grand total, recomputed from current line totals, unrounded
    #[must_use]
    pub fn cart_total(&self) -> f64 {
        pricing::cart_total(&self.cart_items)
    }

    /// Looks up a cart line by id
    #[must_use]
    pub fn cart_item(&self, id: CartItemId) -> Option<&BookingItem> {
        self.cart_items.iter().find(|item| item.id == id)
    }

    /// Looks up a confirmed booking by id
    #[must_use]
    pub fn confirmed_booking(&self, id: BookingId) -> Option<&ConfirmedBooking> {
        self.confirmed_bookings.iter().find(|b| b.id == id)
    }

    /// The most recently confirmed booking, if any
    #[must_use]
    pub fn latest_booking(&self) -> Option<&ConfirmedBooking> {
        self.confirmed_bookings.first()
    }

    /// Whether a reference code is already taken within this session
    #[must_use]
    pub fn contains_reference(&self, code: &ReferenceCode) -> bool {
        self.confirmed_bookings
            .iter()
            .any(|b| &b.reference_code == code)
    }

    /// Whether both collections are empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cart_items.is_empty() && self.confirmed_bookings.is_empty()
    }

    /// Appends a cart line. Event-application primitive.
    pub fn push_item(&mut self, item: BookingItem) {
        self.cart_items.push(item);
    }

    /// Removes a cart line by id, reporting whether anything changed.
    pub fn remove_item(&mut self, id: CartItemId) -> bool {
        let before = self.cart_items.len();
        self.cart_items.retain(|item| item.id != id);
        self.cart_items.len() != before
    }

    /// Empties the cart, reporting whether anything changed. Confirmed
    /// bookings are untouched.
    pub fn clear_cart(&mut self) -> bool {
        let had_items = !self.cart_items.is_empty();
        self.cart_items.clear();
        had_items
    }

    /// Inserts a confirmed booking at the front (newest first).
    /// Event-application primitive.
    pub fn insert_booking_front(&mut self, booking: ConfirmedBooking) {
        self.confirmed_bookings.insert(0, booking);
    }

    /// Removes a confirmed booking by id, reporting whether anything changed.
    pub fn remove_booking(&mut self, id: BookingId) -> bool {
        let before = self.confirmed_bookings.len();
        self.confirmed_bookings.retain(|b| b.id != id);
        self.confirmed_bookings.len() != before
    }

    /// Updates the status of a confirmed booking, reporting whether the
    /// stored value changed.
    pub fn set_booking_status(&mut self, id: BookingId, status: BookingStatus) -> bool {
        match self.confirmed_bookings.iter_mut().find(|b| b.id == id) {
            Some(booking) if booking.status != status => {
                booking.status = status;
                true
            }
            _ => false,
        }
    }

    /// Clears both collections, reporting whether anything changed.
    pub fn reset(&mut self) -> bool {
        let had_data = !self.is_empty();
        self.cart_items.clear();
        self.confirmed_bookings.clear();
        had_data
    }
}
