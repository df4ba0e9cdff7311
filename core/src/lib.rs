//! # Tourbook Core
//!
//! Domain model and decision logic for the Tourbook booking coordinator: the
//! single shared store behind a tourism site's cart badge, cart panel,
//! booking form, confirmation modal, and booking-details views.
//!
//! ## Core Concepts
//!
//! - **State**: [`BookingState`], cart lines plus confirmed bookings
//! - **Command**: [`BookingCommand`], a request to change state
//! - **Event**: [`BookingEvent`], a fact about an applied change
//! - **Reducer**: pure function `(State, Command, Environment) → Result<Events, Error>`
//! - **Environment**: injected dependencies ([`Clock`], [`ReferenceCodes`])
//!
//! ## Architecture Principles
//!
//! - Functional core, imperative shell: everything here is synchronous and
//!   deterministic; the runtime crate owns locking, persistence, and
//!   publication
//! - Derived values ([`BookingItem::line_total`], [`BookingState::cart_total`])
//!   are recomputed on read, never cached
//! - Validation failures are typed results to the caller, never logged and
//!   swallowed, and never partially applied
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use tourbook_core::booking::{CartItemDraft, ItemKind, ReferenceCode};
//! use tourbook_core::command::BookingCommand;
//! use tourbook_core::environment::SystemClock;
//! use tourbook_core::reducer::{BookingEnvironment, BookingReducer, Reducer};
//! use tourbook_core::state::BookingState;
//!
//! struct DemoCodes;
//! impl tourbook_core::environment::ReferenceCodes for DemoCodes {
//!     fn generate(&self) -> ReferenceCode {
//!         ReferenceCode::new("TRB-DEMO01")
//!     }
//! }
//!
//! let env = BookingEnvironment::new(Arc::new(SystemClock), Arc::new(DemoCodes));
//! let mut state = BookingState::new();
//! let events = BookingReducer::new()
//!     .reduce(
//!         &mut state,
//!         BookingCommand::AddItem(CartItemDraft {
//!             kind: ItemKind::Excursion,
//!             name: "Desert Safari".to_string(),
//!             date: chrono::NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
//!             party_size: 2,
//!             duration: "6 hours".to_string(),
//!             unit_price: 120.0,
//!         }),
//!         &env,
//!     )
//!     .unwrap();
//! assert_eq!(events.len(), 1);
//! assert_eq!(state.traveler_count(), 2);
//! ```

// Re-export commonly used types
pub use chrono::{DateTime, Utc};
pub use smallvec::{SmallVec, smallvec};

pub mod booking;
pub mod command;
pub mod environment;
pub mod error;
pub mod pricing;
pub mod reducer;
pub mod state;

pub use booking::{
    BookingDetails, BookingId, BookingItem, BookingStatus, CartItemDraft, CartItemId,
    ConfirmedBooking, ItemKind, ReferenceCode,
};
pub use command::{BookingCommand, BookingEvent};
pub use environment::{Clock, ReferenceCodes, SystemClock};
pub use error::BookingError;
pub use reducer::{BookingEnvironment, BookingReducer, Reducer};
pub use state::BookingState;
