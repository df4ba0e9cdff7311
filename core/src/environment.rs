//! Dependency-injection traits for the reducer.
//!
//! All external inputs the reducer needs (time, generated reference codes)
//! are abstracted behind traits and injected via the environment, so the
//! decision logic stays deterministic under test.

use crate::booking::ReferenceCode;
use chrono::{DateTime, Utc};

/// Clock trait - abstracts time operations for testability
///
/// # Examples
///
/// ```
/// use tourbook_core::environment::{Clock, SystemClock};
///
/// let clock = SystemClock;
/// let now = clock.now();
/// ```
pub trait Clock: Send + Sync {
    /// Get the current time
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock backed by the system time
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Source of human-facing booking reference codes.
///
/// Implementations need not guarantee uniqueness: the reducer checks each
/// generated code against the session state and draws again on collision, so
/// uniqueness is a state-level guarantee.
pub trait ReferenceCodes: Send + Sync {
    /// Generate a candidate reference code
    fn generate(&self) -> ReferenceCode;
}
