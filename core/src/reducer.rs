//! The `Reducer` trait and the booking reducer.
//!
//! A reducer is the pure decision core: `(State, Command, Environment) →
//! Result<Events, Error>`. It validates the command first and mutates state
//! only on success, so a rejected command leaves no observable change. The
//! runtime store executes reducers under its write lock and publishes the
//! returned events, which makes every mutation atomic with respect to
//! observers.

use crate::booking::{BookingId, BookingItem, CartItemId, ConfirmedBooking, ReferenceCode};
use crate::command::{BookingCommand, BookingEvent};
use crate::environment::{Clock, ReferenceCodes};
use crate::error::BookingError;
use crate::pricing;
use crate::state::BookingState;
use smallvec::{SmallVec, smallvec};
use std::sync::Arc;

/// The Reducer trait - core abstraction for mutation logic
///
/// # Type Parameters
///
/// - `State`: The domain state this reducer operates on
/// - `Command`: The mutation requests this reducer processes
/// - `Event`: The facts it publishes for applied mutations
/// - `Environment`: The injected dependencies it needs
/// - `Error`: The typed validation failures it reports to callers
///
/// # Contract
///
/// `reduce` must validate before mutating: on `Err` the state is untouched,
/// on `Ok` the returned events describe exactly the mutations applied. An
/// empty event list means the command was a legal no-op (e.g. removing an id
/// that is already gone) and observers are not notified.
pub trait Reducer {
    /// The state type this reducer operates on
    type State;

    /// The command type this reducer processes
    type Command;

    /// The event type describing applied mutations
    type Event;

    /// The environment type with injected dependencies
    type Environment;

    /// The typed error reported for rejected commands
    type Error;

    /// Validate a command and, if it is legal, apply it to state.
    ///
    /// # Errors
    ///
    /// Returns the reducer's error type when the command is rejected; the
    /// state must be left untouched in that case.
    fn reduce(
        &self,
        state: &mut Self::State,
        command: Self::Command,
        env: &Self::Environment,
    ) -> Result<SmallVec<[Self::Event; 2]>, Self::Error>;
}

/// Environment dependencies for the booking reducer
#[derive(Clone)]
pub struct BookingEnvironment {
    /// Clock for confirmation timestamps
    pub clock: Arc<dyn Clock>,
    /// Source of booking reference codes
    pub reference_codes: Arc<dyn ReferenceCodes>,
}

impl BookingEnvironment {
    /// Creates a new `BookingEnvironment`
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>, reference_codes: Arc<dyn ReferenceCodes>) -> Self {
        Self {
            clock,
            reference_codes,
        }
    }
}

/// Reducer for the booking coordinator
#[derive(Clone, Copy, Debug, Default)]
pub struct BookingReducer;

impl BookingReducer {
    /// Creates a new `BookingReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Picks the reference code for a new confirmed booking.
    ///
    /// A caller-supplied code must be unused; generated codes are re-drawn
    /// until one is free, so uniqueness holds at the state level.
    fn reference_code(
        state: &BookingState,
        supplied: Option<ReferenceCode>,
        codes: &dyn ReferenceCodes,
    ) -> Result<ReferenceCode, BookingError> {
        match supplied {
            Some(code) => {
                if state.contains_reference(&code) {
                    return Err(BookingError::invalid_details(format!(
                        "reference code {code} is already in use"
                    )));
                }
                Ok(code)
            }
            None => {
                let mut code = codes.generate();
                while state.contains_reference(&code) {
                    code = codes.generate();
                }
                Ok(code)
            }
        }
    }

    fn confirm_booking(
        state: &mut BookingState,
        mut details: crate::booking::BookingDetails,
        env: &BookingEnvironment,
    ) -> Result<ConfirmedBooking, BookingError> {
        details.validate()?;

        let id = match details.id {
            Some(id) => {
                if state.confirmed_booking(id).is_some() {
                    return Err(BookingError::invalid_details(format!(
                        "booking id {id} already exists"
                    )));
                }
                id
            }
            None => BookingId::new(),
        };
        let supplied = details.reference_code.take();
        let code = Self::reference_code(state, supplied, env.reference_codes.as_ref())?;

        let booking = ConfirmedBooking::from_details(id, code, details, env.clock.now());
        state.insert_booking_front(booking.clone());
        Ok(booking)
    }
}

impl Reducer for BookingReducer {
    type State = BookingState;
    type Command = BookingCommand;
    type Event = BookingEvent;
    type Environment = BookingEnvironment;
    type Error = BookingError;

    fn reduce(
        &self,
        state: &mut Self::State,
        command: Self::Command,
        env: &Self::Environment,
    ) -> Result<SmallVec<[Self::Event; 2]>, Self::Error> {
        match command {
            BookingCommand::AddItem(draft) => {
                // Rejects negative prices and empty parties before anything
                // is inserted.
                pricing::line_total(draft.unit_price, draft.party_size)?;

                let item = BookingItem::from_draft(CartItemId::new(), draft);
                state.push_item(item.clone());
                Ok(smallvec![BookingEvent::ItemAdded { item }])
            }

            BookingCommand::RemoveItem(id) => {
                // Idempotent: removing an absent id is a legal no-op.
                if state.remove_item(id) {
                    Ok(smallvec![BookingEvent::ItemRemoved { id }])
                } else {
                    Ok(SmallVec::new())
                }
            }

            BookingCommand::ClearCart => {
                if state.clear_cart() {
                    Ok(smallvec![BookingEvent::CartCleared])
                } else {
                    Ok(SmallVec::new())
                }
            }

            BookingCommand::ConfirmBooking(details) => {
                let booking = Self::confirm_booking(state, *details, env)?;
                Ok(smallvec![BookingEvent::BookingConfirmed { booking }])
            }

            BookingCommand::RemoveConfirmedBooking(id) => {
                if state.remove_booking(id) {
                    Ok(smallvec![BookingEvent::BookingRemoved { id }])
                } else {
                    Ok(SmallVec::new())
                }
            }

            BookingCommand::UpdateBookingStatus { id, status } => {
                if state.set_booking_status(id, status) {
                    Ok(smallvec![BookingEvent::StatusChanged { id, status }])
                } else if state.confirmed_booking(id).is_some() {
                    // Setting the status it already has: a legal no-op.
                    Ok(SmallVec::new())
                } else {
                    Err(BookingError::NotFound)
                }
            }

            BookingCommand::Reset => {
                if state.reset() {
                    Ok(smallvec![BookingEvent::StateReset])
                } else {
                    Ok(SmallVec::new())
                }
            }
        }
    }
}
