//! Commands accepted and events published by the booking coordinator.
//!
//! Commands are requests to change state; events are facts about changes
//! that were applied. Only events reach subscribers, and each event carries
//! the applied data so observers never read a half-updated snapshot to find
//! out what happened.

use crate::booking::{
    BookingDetails, BookingId, BookingItem, BookingStatus, CartItemDraft, CartItemId,
    ConfirmedBooking,
};
use serde::{Deserialize, Serialize};

/// A mutation request against the booking state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum BookingCommand {
    /// Add a cart line from the booking form; never merges with an existing
    /// line, duplicate selections are legal
    AddItem(CartItemDraft),
    /// Remove a cart line; a no-op when the id is absent
    RemoveItem(CartItemId),
    /// Empty the cart, leaving confirmed bookings untouched
    ClearCart,
    /// Create a confirmed booking from validated details
    ConfirmBooking(Box<BookingDetails>),
    /// Remove a confirmed booking; a no-op when the id is absent
    RemoveConfirmedBooking(BookingId),
    /// Externally driven status transition on a confirmed booking
    UpdateBookingStatus {
        /// The booking to update
        id: BookingId,
        /// The new status
        status: BookingStatus,
    },
    /// Clear both collections, used at logout/session end
    Reset,
}

/// A fact about an applied mutation, broadcast to every subscriber.
///
/// One event corresponds to one fully applied mutation; commands that change
/// nothing (idempotent removals, clearing an empty cart) publish nothing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum BookingEvent {
    /// A cart line was added
    ItemAdded {
        /// The inserted line, id assigned
        item: BookingItem,
    },
    /// A cart line was removed
    ItemRemoved {
        /// Id of the removed line
        id: CartItemId,
    },
    /// The cart was emptied
    CartCleared,
    /// A booking was confirmed and inserted at the front
    BookingConfirmed {
        /// The full confirmed record
        booking: ConfirmedBooking,
    },
    /// A confirmed booking was removed
    BookingRemoved {
        /// Id of the removed booking
        id: BookingId,
    },
    /// A confirmed booking's status changed
    StatusChanged {
        /// The updated booking
        id: BookingId,
        /// The new status
        status: BookingStatus,
    },
    /// Both collections were cleared
    StateReset,
}
