//! Domain types for the booking coordinator.
//!
//! Two families of records live here: cart lines ([`BookingItem`]) that hold
//! not-yet-confirmed selections, and [`ConfirmedBooking`] records produced by
//! the confirmation step. The two use distinct id namespaces: a confirmed
//! booking is not a cart item.

use crate::error::BookingError;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a cart line.
///
/// Assigned at insertion and never reused within a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CartItemId(Uuid);

impl CartItemId {
    /// Creates a new random `CartItemId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a `CartItemId` from a UUID
    #[must_use]
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Returns the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for CartItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CartItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a confirmed booking.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BookingId(Uuid);

impl BookingId {
    /// Creates a new random `BookingId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a `BookingId` from a UUID
    #[must_use]
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Returns the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for BookingId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for BookingId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Human-facing booking code, unique within a session and immutable after
/// confirmation.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReferenceCode(String);

impl ReferenceCode {
    /// Wraps an already-generated code
    #[must_use]
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Returns the code as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ReferenceCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Catalog category of a cart line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    /// Multi-day trip from the trips catalog
    Trip,
    /// Single excursion from the excursions catalog
    Excursion,
}

impl std::fmt::Display for ItemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Trip => write!(f, "trip"),
            Self::Excursion => write!(f, "excursion"),
        }
    }
}

/// Approval status of a confirmed booking.
///
/// New bookings default to [`Pending`](Self::Pending). The transition to
/// [`Confirmed`](Self::Confirmed) is driven by an external administrator
/// surface; the coordinator only stores and exposes the field.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    /// Awaiting administrator approval
    #[default]
    Pending,
    /// Approved by an administrator
    Confirmed,
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Confirmed => write!(f, "confirmed"),
        }
    }
}

/// A not-yet-inserted cart selection, as produced by the booking form.
///
/// The store assigns the id; duplicate selections of the same catalog entry
/// and date are legal and always create a new line.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CartItemDraft {
    /// Catalog category
    pub kind: ItemKind,
    /// Display label of the catalog item
    pub name: String,
    /// Selected service date
    pub date: NaiveDate,
    /// Number of people, must be positive
    pub party_size: u32,
    /// Opaque display string, not used in calculations
    pub duration: String,
    /// Non-negative price per person
    pub unit_price: f64,
}

/// A single cart line.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BookingItem {
    /// Unique identifier, assigned at insertion
    pub id: CartItemId,
    /// Catalog category
    pub kind: ItemKind,
    /// Display label of the catalog item
    pub name: String,
    /// Selected service date
    pub date: NaiveDate,
    /// Number of people
    pub party_size: u32,
    /// Opaque display string
    pub duration: String,
    /// Price per person
    pub unit_price: f64,
}

impl BookingItem {
    /// Creates a cart line from a validated draft, assigning a fresh id.
    #[must_use]
    pub fn from_draft(id: CartItemId, draft: CartItemDraft) -> Self {
        Self {
            id,
            kind: draft.kind,
            name: draft.name,
            date: draft.date,
            party_size: draft.party_size,
            duration: draft.duration,
            unit_price: draft.unit_price,
        }
    }

    /// The line total, `unit_price * party_size`.
    ///
    /// Always computed on read; no code path stores it, so it can never go
    /// stale relative to the fields that produce it.
    #[must_use]
    pub fn line_total(&self) -> f64 {
        self.unit_price * f64::from(self.party_size)
    }
}

/// Input to the confirmation step.
///
/// `id`, `reference_code` and `status` may be supplied by the caller (for
/// example when replaying an externally created record); the store fills in
/// the rest at confirmation time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BookingDetails {
    /// Caller-supplied id; generated when absent
    #[serde(default)]
    pub id: Option<BookingId>,
    /// Caller-supplied reference code; generated when absent
    #[serde(default)]
    pub reference_code: Option<ReferenceCode>,
    /// Display label of the booked trip or excursion
    pub trip_name: String,
    /// Booked service date
    pub date: NaiveDate,
    /// Number of adults, at least one required
    pub adults_count: u32,
    /// Number of children
    pub children_count: u32,
    /// Total price as quoted to the customer
    pub total_price: f64,
    /// Customer contact name, required
    pub customer_name: String,
    /// Customer email, required
    pub email: String,
    /// Customer phone, required
    pub phone: String,
    /// Free-form notes
    #[serde(default)]
    pub notes: Option<String>,
    /// Caller-supplied status; defaults to pending when absent
    #[serde(default)]
    pub status: Option<BookingStatus>,
}

impl BookingDetails {
    /// Checks the required-field rules for a confirmation request.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::InvalidBookingDetails`] when a required
    /// contact field is blank, the email has no `@`, or no adult is booked,
    /// and [`BookingError::InvalidAmount`] for a negative total price.
    pub fn validate(&self) -> Result<(), BookingError> {
        if self.customer_name.trim().is_empty() {
            return Err(BookingError::invalid_details("customer name is required"));
        }
        if self.email.trim().is_empty() {
            return Err(BookingError::invalid_details("email is required"));
        }
        if !self.email.contains('@') {
            return Err(BookingError::invalid_details("email must contain '@'"));
        }
        if self.phone.trim().is_empty() {
            return Err(BookingError::invalid_details("phone is required"));
        }
        if self.adults_count == 0 {
            return Err(BookingError::invalid_details(
                "at least one adult is required",
            ));
        }
        if self.total_price < 0.0 {
            return Err(BookingError::InvalidAmount {
                amount: self.total_price,
            });
        }
        Ok(())
    }
}

/// A submitted booking record.
///
/// Immutable after creation except for the externally driven `status` field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConfirmedBooking {
    /// Unique identifier
    pub id: BookingId,
    /// Human-facing booking code, unique within the session
    pub reference_code: ReferenceCode,
    /// Display label of the booked trip or excursion
    pub trip_name: String,
    /// Booked service date
    pub date: NaiveDate,
    /// Number of adults
    pub adults_count: u32,
    /// Number of children
    pub children_count: u32,
    /// Total price as quoted at confirmation time
    pub total_price: f64,
    /// Customer contact name
    pub customer_name: String,
    /// Customer email
    pub email: String,
    /// Customer phone
    pub phone: String,
    /// Free-form notes
    #[serde(default)]
    pub notes: Option<String>,
    /// Approval status
    pub status: BookingStatus,
    /// When the booking was confirmed
    pub created_at: DateTime<Utc>,
}

impl ConfirmedBooking {
    /// Builds the record from validated details and generated identifiers.
    #[must_use]
    pub fn from_details(
        id: BookingId,
        reference_code: ReferenceCode,
        details: BookingDetails,
        created_at: DateTime<Utc>,
    ) -> Self {
        let status = details.status.unwrap_or_default();
        Self {
            id,
            reference_code,
            trip_name: details.trip_name,
            date: details.date,
            adults_count: details.adults_count,
            children_count: details.children_count,
            total_price: details.total_price,
            customer_name: details.customer_name,
            email: details.email,
            phone: details.phone,
            notes: details.notes,
            status,
            created_at,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)] // Test code can use unwrap/expect
mod tests {
    use super::*;

    fn details() -> BookingDetails {
        BookingDetails {
            id: None,
            reference_code: None,
            trip_name: "Desert Safari".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            adults_count: 2,
            children_count: 0,
            total_price: 240.0,
            customer_name: "A. Traveler".to_string(),
            email: "a@x.com".to_string(),
            phone: "+1555".to_string(),
            notes: None,
            status: None,
        }
    }

    #[test]
    fn ids_are_distinct() {
        assert_ne!(CartItemId::new(), CartItemId::new());
        assert_ne!(BookingId::new(), BookingId::new());
    }

    #[test]
    fn line_total_is_computed_on_read() {
        let draft = CartItemDraft {
            kind: ItemKind::Excursion,
            name: "Desert Safari".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            party_size: 3,
            duration: "6 hours".to_string(),
            unit_price: 50.0,
        };
        let mut item = BookingItem::from_draft(CartItemId::new(), draft);
        assert!((item.line_total() - 150.0).abs() < f64::EPSILON);

        // Changing the inputs changes the next read; nothing cached.
        item.party_size = 2;
        assert!((item.line_total() - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn valid_details_pass() {
        assert!(details().validate().is_ok());
    }

    #[test]
    fn blank_contact_fields_are_rejected() {
        for field in ["customer_name", "email", "phone"] {
            let mut d = details();
            match field {
                "customer_name" => d.customer_name = "  ".to_string(),
                "email" => d.email = String::new(),
                _ => d.phone = String::new(),
            }
            assert!(matches!(
                d.validate(),
                Err(BookingError::InvalidBookingDetails { .. })
            ));
        }
    }

    #[test]
    fn email_without_at_sign_is_rejected() {
        let mut d = details();
        d.email = "not-an-email".to_string();
        assert!(d.validate().is_err());
    }

    #[test]
    fn zero_adults_is_rejected() {
        let mut d = details();
        d.adults_count = 0;
        assert!(matches!(
            d.validate(),
            Err(BookingError::InvalidBookingDetails { .. })
        ));
    }

    #[test]
    fn negative_total_is_rejected() {
        let mut d = details();
        d.total_price = -1.0;
        assert!(matches!(
            d.validate(),
            Err(BookingError::InvalidAmount { .. })
        ));
    }

    #[test]
    fn status_defaults_to_pending() {
        let booking = ConfirmedBooking::from_details(
            BookingId::new(),
            ReferenceCode::new("TRB-TEST01"),
            details(),
            Utc::now(),
        );
        assert_eq!(booking.status, BookingStatus::Pending);
    }
}
