//! # Tourbook Runtime
//!
//! Store runtime for the Tourbook booking coordinator.
//!
//! This crate provides the imperative shell around the pure reducer from
//! `tourbook-core`: the [`Store`] that owns the state, runs mutations, writes
//! snapshots, and notifies subscribers.
//!
//! ## Core Components
//!
//! - **Store**: state behind a write lock, reducer execution, event
//!   publication via a broadcast channel
//! - **Snapshot persistence**: the whole state serialized to client-local
//!   storage on every mutation, rehydrated at session start
//! - **Booking session API**: the typed operations UI surfaces call
//!   ([`BookingStore`])
//!
//! ## Consistency contract
//!
//! Each mutation runs to completion under the state write lock, and its
//! events are published before the lock is released. Subscribers therefore
//! observe mutations in exactly the order they were applied, and a
//! subscriber's next read after a notification always reflects the mutation
//! that produced it. No listener is ever notified about a half-applied
//! change; the reducer either applies a command fully or rejects it with a
//! typed error and no state change.
//!
//! ## Example
//!
//! ```
//! use tourbook_core::booking::{CartItemDraft, ItemKind};
//! use tourbook_runtime::booking::{BookingStore, production_environment};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), tourbook_core::BookingError> {
//! let store = BookingStore::session(production_environment());
//! let mut events = store.subscribe();
//!
//! let id = store
//!     .add_item(CartItemDraft {
//!         kind: ItemKind::Excursion,
//!         name: "Desert Safari".to_string(),
//!         date: chrono::NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
//!         party_size: 2,
//!         duration: "6 hours".to_string(),
//!         unit_price: 120.0,
//!     })
//!     .await?;
//!
//! assert_eq!(store.item_count().await, 2);
//! assert!(events.try_recv().is_ok());
//! store.remove_item(id).await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use tokio::sync::{RwLock, broadcast};
use tourbook_core::SmallVec;
use tourbook_core::reducer::Reducer;

/// Booking session API on top of the generic store
pub mod booking;

/// Snapshot persistence for durable session state
pub mod snapshot;

pub use booking::{BookingStore, RandomReferenceCodes, production_environment};
pub use snapshot::{FileSnapshotStore, SNAPSHOT_NAMESPACE, SnapshotError, SnapshotStore};

/// Configuration for Store instances
///
/// # Example
///
/// ```
/// use tourbook_runtime::StoreConfig;
///
/// let config = StoreConfig::default().with_broadcast_capacity(64);
/// ```
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Event broadcast channel capacity (events buffered per subscriber)
    pub broadcast_capacity: usize,
}

impl StoreConfig {
    /// Create a new configuration with custom values
    #[must_use]
    pub const fn new(broadcast_capacity: usize) -> Self {
        Self { broadcast_capacity }
    }

    /// Set the broadcast channel capacity.
    ///
    /// Default is 16. Increase when subscribers are slow to drain and
    /// frequently lag.
    #[must_use]
    pub const fn with_broadcast_capacity(mut self, capacity: usize) -> Self {
        self.broadcast_capacity = capacity;
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            broadcast_capacity: 16,
        }
    }
}

/// The Store - authoritative owner of a session's state
///
/// The Store manages:
/// 1. State (behind `RwLock`, never handed out mutably)
/// 2. Reducer (validation and mutation logic)
/// 3. Environment (injected dependencies)
/// 4. Snapshot persistence (optional, written inside the mutation path)
/// 5. Event publication (broadcast to every subscriber, in mutation order)
///
/// # Type Parameters
///
/// - `S`: State type
/// - `C`: Command type
/// - `Ev`: Event type published to subscribers
/// - `E`: Environment type
/// - `R`: Reducer implementation
pub struct Store<S, C, Ev, E, R>
where
    R: Reducer<State = S, Command = C, Event = Ev, Environment = E>,
{
    state: Arc<RwLock<S>>,
    reducer: R,
    environment: E,
    snapshots: Option<Arc<dyn SnapshotStore<S>>>,
    /// Event broadcast channel for observing applied mutations.
    ///
    /// Every subscriber receives a clone of every event, in the order the
    /// mutations were applied. Dropping a receiver unsubscribes it.
    event_broadcast: broadcast::Sender<Ev>,
}

impl<S, C, Ev, E, R> Store<S, C, Ev, E, R>
where
    R: Reducer<State = S, Command = C, Event = Ev, Environment = E> + Send + Sync + 'static,
    S: Send + Sync + 'static,
    C: Send + 'static,
    Ev: Clone + Send + 'static,
    E: Send + Sync + 'static,
{
    /// Create a new store with initial state, reducer, and environment
    ///
    /// Uses the default configuration (broadcast capacity 16) and no
    /// snapshot persistence.
    #[must_use]
    pub fn new(initial_state: S, reducer: R, environment: E) -> Self {
        Self::with_config(initial_state, reducer, environment, StoreConfig::default())
    }

    /// Create a new Store with custom configuration
    #[must_use]
    pub fn with_config(initial_state: S, reducer: R, environment: E, config: StoreConfig) -> Self {
        let (event_broadcast, _) = broadcast::channel(config.broadcast_capacity);

        Self {
            state: Arc::new(RwLock::new(initial_state)),
            reducer,
            environment,
            snapshots: None,
            event_broadcast,
        }
    }

    /// Attach snapshot persistence.
    ///
    /// From now on every applied mutation writes the full state to the given
    /// storage before subscribers are notified.
    #[must_use]
    pub fn with_snapshots(mut self, snapshots: Arc<dyn SnapshotStore<S>>) -> Self {
        self.snapshots = Some(snapshots);
        self
    }

    /// Rehydrate a store from persisted state.
    ///
    /// A missing snapshot yields the default (empty) state; the storage
    /// stays attached for subsequent mutations.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError`] when the storage is readable but the
    /// record does not parse - the caller decides whether to start fresh.
    pub fn restore(
        reducer: R,
        environment: E,
        snapshots: Arc<dyn SnapshotStore<S>>,
    ) -> Result<Self, SnapshotError>
    where
        S: Default,
    {
        let initial_state = snapshots.load()?.unwrap_or_default();
        Ok(Self::new(initial_state, reducer, environment).with_snapshots(snapshots))
    }

    /// Send a command to the store
    ///
    /// This is the only mutation path:
    /// 1. Acquires the write lock on state
    /// 2. Runs the reducer (validate, then apply)
    /// 3. Writes the snapshot, when persistence is attached
    /// 4. Publishes the returned events to every subscriber
    /// 5. Releases the lock and returns the events to the caller
    ///
    /// Because publication happens before the lock is released, subscribers
    /// observe mutations in the exact order they were applied, and every
    /// read that follows a notification sees the mutated state.
    ///
    /// An `Ok` with no events means the command was a legal no-op (for
    /// example removing an id that is already gone); nothing is persisted or
    /// published in that case because no state changed.
    ///
    /// # Errors
    ///
    /// Propagates the reducer's typed error when the command is rejected;
    /// the state is untouched and nothing is published.
    #[tracing::instrument(skip(self, command), name = "store_send")]
    pub async fn send(&self, command: C) -> Result<SmallVec<[Ev; 2]>, R::Error> {
        metrics::counter!("store.commands.total").increment(1);

        let mut state = self.state.write().await;
        tracing::trace!("acquired write lock on state");

        let start = std::time::Instant::now();
        let events = match self.reducer.reduce(&mut state, command, &self.environment) {
            Ok(events) => events,
            Err(error) => {
                metrics::counter!("store.commands.rejected").increment(1);
                tracing::debug!("command rejected by reducer");
                return Err(error);
            }
        };
        metrics::histogram!("store.reducer.duration_seconds").record(start.elapsed().as_secs_f64());

        if events.is_empty() {
            tracing::trace!("command was a no-op");
            return Ok(events);
        }

        if let Some(snapshots) = &self.snapshots {
            if let Err(error) = snapshots.save(&state) {
                // The in-memory mutation stands; at worst a crash right now
                // loses this one mutation, which is the accepted envelope.
                metrics::counter!("store.snapshot.write_failures").increment(1);
                tracing::warn!(%error, "snapshot write failed, continuing with in-memory state");
            }
        }

        for event in &events {
            // send only fails when there are no subscribers, which is fine.
            let _ = self.event_broadcast.send(event.clone());
        }
        tracing::debug!(events = events.len(), "mutation applied and published");

        Ok(events)
    }

    /// Subscribe to all events from this store
    ///
    /// Returns a receiver that gets a clone of every event published after
    /// this call, in mutation order. Dropping the receiver unsubscribes;
    /// dropping it twice is obviously safe, and receivers outliving the
    /// store simply see the channel close.
    ///
    /// A receiver that lags behind the channel capacity skips the oldest
    /// events and gets `RecvError::Lagged`; consumers recover by re-reading
    /// the current state via [`state`](Self::state).
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Ev> {
        self.event_broadcast.subscribe()
    }

    /// Number of currently subscribed receivers
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.event_broadcast.receiver_count()
    }

    /// Read current state via a closure
    ///
    /// Access state through a closure so the read lock is released promptly:
    ///
    /// ```ignore
    /// let travelers = store.state(|s| s.traveler_count()).await;
    /// ```
    pub async fn state<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&S) -> T,
    {
        let state = self.state.read().await;
        f(&state)
    }
}

impl<S, C, Ev, E, R> Clone for Store<S, C, Ev, E, R>
where
    R: Reducer<State = S, Command = C, Event = Ev, Environment = E> + Clone,
    E: Clone,
{
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            reducer: self.reducer.clone(),
            environment: self.environment.clone(),
            snapshots: self.snapshots.clone(),
            event_broadcast: self.event_broadcast.clone(),
        }
    }
}

impl<S, C, Ev, E, R> std::fmt::Debug for Store<S, C, Ev, E, R>
where
    R: Reducer<State = S, Command = C, Event = Ev, Environment = E>,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("subscribers", &self.event_broadcast.receiver_count())
            .field("snapshots", &self.snapshots.is_some())
            .finish_non_exhaustive()
    }
}
