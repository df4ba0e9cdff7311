//! # Tourbook Testing
//!
//! Testing utilities for the booking coordinator.
//!
//! This crate provides:
//! - Mock implementations of the environment traits
//! - An in-memory snapshot store that counts writes
//! - Fixture builders for drafts and booking details
//! - Property-based testing strategies
//! - A Given-When-Then harness for reducer tests
//!
//! ## Example
//!
//! ```
//! use tourbook_testing::{fixtures, test_environment};
//! use tourbook_runtime::BookingStore;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let store = BookingStore::session(test_environment());
//! store.add_item(fixtures::draft("Desert Safari", 2, 120.0)).await.unwrap();
//! assert_eq!(store.item_count().await, 2);
//! # }
//! ```


use chrono::{DateTime, Utc};
use std::sync::Arc;
use tourbook_core::environment::Clock;
use tourbook_core::reducer::BookingEnvironment;

/// Mock implementations of the environment traits.
pub mod mocks {
    use super::{Clock, DateTime, Utc};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
    use tourbook_core::booking::ReferenceCode;
    use tourbook_core::environment::ReferenceCodes;
    use tourbook_runtime::{SnapshotError, SnapshotStore};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use tourbook_testing::mocks::FixedClock;
    /// use tourbook_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// let time1 = clock.now();
    /// let time2 = clock.now();
    /// assert_eq!(time1, time2); // Always the same!
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }

    /// Deterministic reference-code source.
    ///
    /// Yields `TRB-000001`, `TRB-000002`, ... so tests can assert on exact
    /// codes. Never collides within a session.
    #[derive(Debug, Default)]
    pub struct SequentialReferenceCodes {
        next: AtomicU32,
    }

    impl SequentialReferenceCodes {
        /// Creates a source starting at `TRB-000001`.
        #[must_use]
        pub const fn new() -> Self {
            Self {
                next: AtomicU32::new(0),
            }
        }
    }

    impl ReferenceCodes for SequentialReferenceCodes {
        fn generate(&self) -> ReferenceCode {
            let n = self.next.fetch_add(1, Ordering::Relaxed) + 1;
            ReferenceCode::new(format!("TRB-{n:06}"))
        }
    }

    /// In-memory snapshot store that records how often it was written.
    ///
    /// Lets tests assert the persist-per-mutation contract without touching
    /// the filesystem.
    #[derive(Debug, Default)]
    pub struct MemorySnapshotStore<S> {
        slot: Mutex<Option<S>>,
        saves: AtomicUsize,
    }

    impl<S> MemorySnapshotStore<S> {
        /// Creates an empty store.
        #[must_use]
        pub fn new() -> Self {
            Self {
                slot: Mutex::new(None),
                saves: AtomicUsize::new(0),
            }
        }

        /// Creates a store already holding a snapshot, for rehydration tests.
        #[must_use]
        pub fn seeded(state: S) -> Self {
            Self {
                slot: Mutex::new(Some(state)),
                saves: AtomicUsize::new(0),
            }
        }

        /// Number of `save` calls observed so far.
        #[must_use]
        pub fn save_count(&self) -> usize {
            self.saves.load(Ordering::SeqCst)
        }
    }

    impl<S> MemorySnapshotStore<S>
    where
        S: Clone,
    {
        /// The most recently saved snapshot, if any.
        #[must_use]
        pub fn stored(&self) -> Option<S> {
            self.slot
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
                .clone()
        }
    }

    impl<S> SnapshotStore<S> for MemorySnapshotStore<S>
    where
        S: Clone + Send,
    {
        fn load(&self) -> Result<Option<S>, SnapshotError> {
            Ok(self
                .slot
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
                .clone())
        }

        fn save(&self, state: &S) -> Result<(), SnapshotError> {
            *self
                .slot
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner) = Some(state.clone());
            self.saves.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }
}

/// Fixture builders for common domain records.
pub mod fixtures {
    use chrono::NaiveDate;
    use tourbook_core::booking::{BookingDetails, CartItemDraft, ItemKind};

    /// The service date all fixtures book for.
    ///
    /// # Panics
    ///
    /// Never in practice; the date literal is valid.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn service_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 15).expect("hardcoded date should always be valid")
    }

    /// An excursion draft with the given label, party and per-person price.
    #[must_use]
    pub fn draft(name: &str, party_size: u32, unit_price: f64) -> CartItemDraft {
        CartItemDraft {
            kind: ItemKind::Excursion,
            name: name.to_string(),
            date: service_date(),
            party_size,
            duration: "6 hours".to_string(),
            unit_price,
        }
    }

    /// Valid booking details for the given trip and quoted total.
    #[must_use]
    pub fn details(trip_name: &str, total_price: f64) -> BookingDetails {
        BookingDetails {
            id: None,
            reference_code: None,
            trip_name: trip_name.to_string(),
            date: service_date(),
            adults_count: 2,
            children_count: 0,
            total_price,
            customer_name: "A. Traveler".to_string(),
            email: "traveler@example.com".to_string(),
            phone: "+1 555 0100".to_string(),
            notes: None,
            status: None,
        }
    }
}

/// Property-based testing strategies for domain types.
pub mod properties {
    use proptest::prelude::*;
    use tourbook_core::booking::{CartItemDraft, ItemKind};

    /// Strategy producing valid cart drafts: positive party, non-negative
    /// price.
    pub fn valid_draft() -> impl Strategy<Value = CartItemDraft> {
        ("[A-Za-z ]{1,24}", 1u32..=12, 0.0f64..2_000.0).prop_map(|(name, party_size, price)| {
            CartItemDraft {
                kind: ItemKind::Excursion,
                name,
                date: super::fixtures::service_date(),
                party_size,
                duration: "4 hours".to_string(),
                unit_price: (price * 100.0).round() / 100.0,
            }
        })
    }
}

/// A booking environment wired with deterministic mocks.
///
/// Fixed clock at 2025-01-01 and sequential `TRB-000001`-style codes.
#[must_use]
pub fn test_environment() -> BookingEnvironment {
    BookingEnvironment::new(
        Arc::new(mocks::test_clock()),
        Arc::new(mocks::SequentialReferenceCodes::new()),
    )
}

/// Installs a plain `fmt` subscriber for test logs; repeated calls are no-ops.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init();
}

// Re-export commonly used items
pub use mocks::{FixedClock, MemorySnapshotStore, SequentialReferenceCodes, test_clock};
pub use reducer_test::ReducerTest;
