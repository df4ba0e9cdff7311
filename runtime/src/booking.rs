//! The booking session API.
//!
//! [`BookingStore`] is the concrete store every UI surface talks to: the
//! navigation badge reads [`item_count`](BookingStore::item_count), the cart
//! panel reads the collections and calls the removal operations, the booking
//! form calls [`add_item`](BookingStore::add_item) and previews totals, the
//! confirmation modal calls
//! [`add_confirmed_booking`](BookingStore::add_confirmed_booking), and the
//! details page calls
//! [`confirmed_booking`](BookingStore::confirmed_booking). Consumers hold no
//! booking state of their own; they subscribe, and re-read on every event.

use crate::snapshot::{SnapshotError, SnapshotStore};
use crate::{Store, StoreConfig};
use rand::Rng;
use std::sync::Arc;
use tourbook_core::booking::{
    BookingDetails, BookingId, BookingItem, BookingStatus, CartItemDraft, CartItemId,
    ConfirmedBooking, ReferenceCode,
};
use tourbook_core::command::{BookingCommand, BookingEvent};
use tourbook_core::environment::{ReferenceCodes, SystemClock};
use tourbook_core::error::BookingError;
use tourbook_core::reducer::{BookingEnvironment, BookingReducer};
use tourbook_core::state::BookingState;

/// The concrete store behind all booking UI surfaces.
pub type BookingStore =
    Store<BookingState, BookingCommand, BookingEvent, BookingEnvironment, BookingReducer>;

/// Production source of booking reference codes.
///
/// Codes look like `TRB-7K2M9Q`: a fixed prefix plus six characters drawn
/// from an alphabet without easily confused glyphs (no `0`/`O`, no `1`/`I`).
/// Collisions within a session are resolved by the reducer re-drawing.
#[derive(Clone, Copy, Debug, Default)]
pub struct RandomReferenceCodes;

impl RandomReferenceCodes {
    const ALPHABET: &'static [u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
    const CODE_LEN: usize = 6;
}

impl ReferenceCodes for RandomReferenceCodes {
    fn generate(&self) -> ReferenceCode {
        let mut rng = rand::thread_rng();
        let code: String = (0..Self::CODE_LEN)
            .map(|_| {
                let idx = rng.gen_range(0..Self::ALPHABET.len());
                char::from(Self::ALPHABET[idx])
            })
            .collect();
        ReferenceCode::new(format!("TRB-{code}"))
    }
}

/// The environment a real session runs with: system clock, random codes.
#[must_use]
pub fn production_environment() -> BookingEnvironment {
    BookingEnvironment::new(Arc::new(SystemClock), Arc::new(RandomReferenceCodes))
}

impl BookingStore {
    /// Starts an empty session with no persistence.
    #[must_use]
    pub fn session(environment: BookingEnvironment) -> Self {
        Self::new(BookingState::new(), BookingReducer::new(), environment)
    }

    /// Starts an empty session with a custom configuration.
    #[must_use]
    pub fn session_with_config(environment: BookingEnvironment, config: StoreConfig) -> Self {
        Self::with_config(
            BookingState::new(),
            BookingReducer::new(),
            environment,
            config,
        )
    }

    /// Rehydrates a session from persisted state and keeps persisting to it.
    ///
    /// A missing snapshot starts the session empty.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError`] when a snapshot exists but does not parse.
    pub fn restore_session(
        environment: BookingEnvironment,
        snapshots: Arc<dyn SnapshotStore<BookingState>>,
    ) -> Result<Self, SnapshotError> {
        Self::restore(BookingReducer::new(), environment, snapshots)
    }

    /// Adds a cart line and returns its assigned id.
    ///
    /// Never merges with an existing line: selecting the same catalog entry
    /// twice creates two lines.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::InvalidAmount`] for a negative unit price or
    /// an empty party; nothing is inserted or published in that case.
    pub async fn add_item(&self, draft: CartItemDraft) -> Result<CartItemId, BookingError> {
        let events = self.send(BookingCommand::AddItem(draft)).await?;
        match events.into_iter().next() {
            Some(BookingEvent::ItemAdded { item }) => Ok(item.id),
            // The reducer publishes exactly one ItemAdded for an accepted add.
            _ => unreachable!("accepted add must publish ItemAdded"),
        }
    }

    /// Removes a cart line; removing an absent id is a silent no-op.
    ///
    /// # Errors
    ///
    /// Never fails today; the `Result` matches the other mutations so
    /// callers can `?` uniformly.
    pub async fn remove_item(&self, id: CartItemId) -> Result<(), BookingError> {
        self.send(BookingCommand::RemoveItem(id)).await.map(|_| ())
    }

    /// Empties the cart, leaving confirmed bookings untouched.
    ///
    /// # Errors
    ///
    /// Never fails today; see [`remove_item`](Self::remove_item).
    pub async fn clear_cart(&self) -> Result<(), BookingError> {
        self.send(BookingCommand::ClearCart).await.map(|_| ())
    }

    /// Number of people across all cart lines - the cart badge value.
    pub async fn item_count(&self) -> u32 {
        self.state(BookingState::traveler_count).await
    }

    /// Number of cart lines.
    pub async fn line_count(&self) -> usize {
        self.state(BookingState::line_count).await
    }

    /// The cart grand total, recomputed from current line totals.
    ///
    /// Unrounded; apply [`tourbook_core::pricing::round_cents`] for display.
    pub async fn cart_total(&self) -> f64 {
        self.state(BookingState::cart_total).await
    }

    /// Snapshot of the cart lines, in insertion order.
    pub async fn cart_items(&self) -> Vec<BookingItem> {
        self.state(|s| s.cart_items().to_vec()).await
    }

    /// Confirms a booking and returns its assigned id.
    ///
    /// The record is inserted at the front of the confirmed list, with a
    /// generated reference code and `pending` status unless the details
    /// supplied them.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::InvalidBookingDetails`] when required contact
    /// fields are blank, no adult is booked, or a supplied id or reference
    /// code collides, and [`BookingError::InvalidAmount`] for a negative
    /// total. The cart and existing bookings are untouched on failure.
    pub async fn add_confirmed_booking(
        &self,
        details: BookingDetails,
    ) -> Result<BookingId, BookingError> {
        let events = self
            .send(BookingCommand::ConfirmBooking(Box::new(details)))
            .await?;
        match events.into_iter().next() {
            Some(BookingEvent::BookingConfirmed { booking }) => Ok(booking.id),
            // The reducer publishes exactly one BookingConfirmed per accept.
            _ => unreachable!("accepted confirmation must publish BookingConfirmed"),
        }
    }

    /// Removes a confirmed booking; removing an absent id is a silent no-op.
    ///
    /// # Errors
    ///
    /// Never fails today; see [`remove_item`](Self::remove_item).
    pub async fn remove_confirmed_booking(&self, id: BookingId) -> Result<(), BookingError> {
        self.send(BookingCommand::RemoveConfirmedBooking(id))
            .await
            .map(|_| ())
    }

    /// Applies an externally driven status transition.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::NotFound`] when no booking has the id.
    pub async fn update_booking_status(
        &self,
        id: BookingId,
        status: BookingStatus,
    ) -> Result<(), BookingError> {
        self.send(BookingCommand::UpdateBookingStatus { id, status })
            .await
            .map(|_| ())
    }

    /// Looks up a confirmed booking by id.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::NotFound`] for an id never inserted or
    /// already removed - callers render a "not found" state from it.
    pub async fn confirmed_booking(&self, id: BookingId) -> Result<ConfirmedBooking, BookingError> {
        self.state(|s| s.confirmed_booking(id).cloned())
            .await
            .ok_or(BookingError::NotFound)
    }

    /// Snapshot of the confirmed bookings, newest first.
    pub async fn confirmed_bookings(&self) -> Vec<ConfirmedBooking> {
        self.state(|s| s.confirmed_bookings().to_vec()).await
    }

    /// The most recently confirmed booking, if any.
    pub async fn latest_booking(&self) -> Option<ConfirmedBooking> {
        self.state(|s| s.latest_booking().cloned()).await
    }

    /// Clears both collections - used at logout/session end.
    ///
    /// # Errors
    ///
    /// Never fails today; see [`remove_item`](Self::remove_item).
    pub async fn reset(&self) -> Result<(), BookingError> {
        self.send(BookingCommand::Reset).await.map(|_| ())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)] // Test code can use unwrap/expect
mod tests {
    use super::*;

    #[test]
    fn reference_codes_have_prefix_and_length() {
        let code = RandomReferenceCodes.generate();
        let code = code.as_str();
        assert!(code.starts_with("TRB-"));
        assert_eq!(code.len(), "TRB-".len() + 6);
        assert!(
            code["TRB-".len()..]
                .bytes()
                .all(|b| RandomReferenceCodes::ALPHABET.contains(&b))
        );
    }

    #[test]
    fn reference_codes_vary() {
        let codes: std::collections::HashSet<_> = (0..32)
            .map(|_| RandomReferenceCodes.generate().as_str().to_string())
            .collect();
        assert!(codes.len() > 1);
    }
}
