//! End-to-end tests for the booking session store: the full booking flow,
//! subscriber notification and ordering, and snapshot persistence.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use std::sync::Arc;
use tourbook_core::booking::{BookingId, BookingStatus, CartItemId};
use tourbook_core::command::BookingEvent;
use tourbook_core::error::BookingError;
use tourbook_core::state::BookingState;
use tourbook_runtime::{BookingStore, FileSnapshotStore, SnapshotStore, StoreConfig};
use tourbook_testing::{MemorySnapshotStore, fixtures, init_test_tracing, test_environment};

#[tokio::test]
async fn full_booking_flow() {
    init_test_tracing();
    let store = BookingStore::session(test_environment());

    // Browse, then add a two-person excursion at 120 per person.
    store
        .add_item(fixtures::draft("Desert Safari", 2, 120.0))
        .await
        .unwrap();
    assert_eq!(store.item_count().await, 2);
    assert!((store.cart_total().await - 240.0).abs() < f64::EPSILON);

    // Submit the booking form.
    let booking_id = store
        .add_confirmed_booking(fixtures::details("Desert Safari", 240.0))
        .await
        .unwrap();

    let booking = store.confirmed_booking(booking_id).await.unwrap();
    assert_eq!(booking.reference_code.as_str(), "TRB-000001");
    assert_eq!(booking.status, BookingStatus::Pending);
    assert_eq!(store.confirmed_bookings().await.len(), 1);
    assert_eq!(
        store.latest_booking().await.map(|b| b.id),
        Some(booking_id)
    );

    // Empty the cart once the booking is in; the booking stays.
    store.clear_cart().await.unwrap();
    assert_eq!(store.item_count().await, 0);
    assert!((store.cart_total().await).abs() < f64::EPSILON);
    assert_eq!(store.confirmed_bookings().await.len(), 1);
}

#[tokio::test]
async fn subscribers_see_events_in_mutation_order() {
    let store = BookingStore::session(test_environment());
    let mut events = store.subscribe();
    assert_eq!(store.subscriber_count(), 1);

    let first = store
        .add_item(fixtures::draft("Desert Safari", 2, 120.0))
        .await
        .unwrap();
    store
        .add_item(fixtures::draft("Old Town Walk", 3, 30.0))
        .await
        .unwrap();
    store.remove_item(first).await.unwrap();

    let received = [
        events.recv().await.unwrap(),
        events.recv().await.unwrap(),
        events.recv().await.unwrap(),
    ];
    assert!(matches!(received[0], BookingEvent::ItemAdded { ref item } if item.name == "Desert Safari"));
    assert!(matches!(received[1], BookingEvent::ItemAdded { ref item } if item.name == "Old Town Walk"));
    assert!(matches!(received[2], BookingEvent::ItemRemoved { id } if id == first));
}

#[tokio::test]
async fn every_subscriber_is_notified() {
    let store = BookingStore::session(test_environment());
    let mut badge = store.subscribe();
    let mut cart_panel = store.subscribe();

    store
        .add_item(fixtures::draft("Desert Safari", 1, 80.0))
        .await
        .unwrap();

    assert!(matches!(
        badge.recv().await.unwrap(),
        BookingEvent::ItemAdded { .. }
    ));
    assert!(matches!(
        cart_panel.recv().await.unwrap(),
        BookingEvent::ItemAdded { .. }
    ));
}

#[tokio::test]
async fn reads_after_notification_see_the_mutation() {
    let store = BookingStore::session(test_environment());
    let mut events = store.subscribe();

    store
        .add_item(fixtures::draft("Desert Safari", 4, 55.0))
        .await
        .unwrap();

    // The notification arrives only after the mutation is fully applied.
    events.recv().await.unwrap();
    assert_eq!(store.item_count().await, 4);
}

#[tokio::test]
async fn no_op_mutations_publish_nothing() {
    let store = BookingStore::session(test_environment());
    let mut events = store.subscribe();

    store.remove_item(CartItemId::new()).await.unwrap();
    store.remove_confirmed_booking(BookingId::new()).await.unwrap();
    store.clear_cart().await.unwrap();
    store.reset().await.unwrap();

    assert!(matches!(
        events.try_recv(),
        Err(tokio::sync::broadcast::error::TryRecvError::Empty)
    ));
}

#[tokio::test]
async fn rejected_commands_mutate_and_publish_nothing() {
    let store = BookingStore::session(test_environment());
    let mut events = store.subscribe();

    let err = store
        .add_item(fixtures::draft("Desert Safari", 2, -1.0))
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::InvalidAmount { .. }));

    let mut bad = fixtures::details("Desert Safari", 240.0);
    bad.email = "nope".to_string();
    let err = store.add_confirmed_booking(bad).await.unwrap_err();
    assert!(matches!(err, BookingError::InvalidBookingDetails { .. }));

    assert_eq!(store.item_count().await, 0);
    assert!(store.confirmed_bookings().await.is_empty());
    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn removing_a_confirmed_booking_publishes_once_and_forgets_it() {
    let store = BookingStore::session(test_environment());
    let id = store
        .add_confirmed_booking(fixtures::details("Desert Safari", 240.0))
        .await
        .unwrap();
    let mut events = store.subscribe();

    store.remove_confirmed_booking(id).await.unwrap();

    assert!(matches!(
        events.recv().await.unwrap(),
        BookingEvent::BookingRemoved { id: removed } if removed == id
    ));
    assert!(store.confirmed_bookings().await.is_empty());
    assert!(store.latest_booking().await.is_none());
    let err = store.confirmed_booking(id).await.unwrap_err();
    assert_eq!(err, BookingError::NotFound);

    // Removing the same id again changes nothing and publishes nothing.
    store.remove_confirmed_booking(id).await.unwrap();
    assert!(matches!(
        events.try_recv(),
        Err(tokio::sync::broadcast::error::TryRecvError::Empty)
    ));
}

#[tokio::test]
async fn lookups_of_unknown_bookings_are_not_found() {
    let store = BookingStore::session(test_environment());

    let err = store.confirmed_booking(BookingId::new()).await.unwrap_err();
    assert_eq!(err, BookingError::NotFound);

    let err = store
        .update_booking_status(BookingId::new(), BookingStatus::Confirmed)
        .await
        .unwrap_err();
    assert_eq!(err, BookingError::NotFound);
}

#[tokio::test]
async fn status_updates_flow_through_the_store() {
    let store = BookingStore::session(test_environment());
    let id = store
        .add_confirmed_booking(fixtures::details("Desert Safari", 240.0))
        .await
        .unwrap();
    let mut events = store.subscribe();

    store
        .update_booking_status(id, BookingStatus::Confirmed)
        .await
        .unwrap();

    assert!(matches!(
        events.recv().await.unwrap(),
        BookingEvent::StatusChanged {
            status: BookingStatus::Confirmed,
            ..
        }
    ));
    let booking = store.confirmed_booking(id).await.unwrap();
    assert_eq!(booking.status, BookingStatus::Confirmed);
}

#[tokio::test]
async fn every_applied_mutation_writes_a_snapshot() {
    let snapshots = Arc::new(MemorySnapshotStore::<BookingState>::new());
    let store =
        BookingStore::session(test_environment()).with_snapshots(snapshots.clone());

    store
        .add_item(fixtures::draft("Desert Safari", 2, 120.0))
        .await
        .unwrap();
    store
        .add_confirmed_booking(fixtures::details("Desert Safari", 240.0))
        .await
        .unwrap();
    store.clear_cart().await.unwrap();
    assert_eq!(snapshots.save_count(), 3);

    // A no-op changes nothing and writes nothing.
    store.clear_cart().await.unwrap();
    assert_eq!(snapshots.save_count(), 3);

    let persisted = snapshots.stored().unwrap();
    assert_eq!(persisted.line_count(), 0);
    assert_eq!(persisted.confirmed_bookings().len(), 1);
}

#[tokio::test]
async fn restore_rehydrates_a_previous_session() {
    let snapshots = Arc::new(MemorySnapshotStore::<BookingState>::new());
    {
        let store =
            BookingStore::session(test_environment()).with_snapshots(snapshots.clone());
        store
            .add_item(fixtures::draft("Desert Safari", 2, 120.0))
            .await
            .unwrap();
        store
            .add_confirmed_booking(fixtures::details("Desert Safari", 240.0))
            .await
            .unwrap();
    }

    let restored = BookingStore::restore_session(test_environment(), snapshots).unwrap();
    assert_eq!(restored.item_count().await, 2);
    assert!((restored.cart_total().await - 240.0).abs() < f64::EPSILON);
    let booking = restored.latest_booking().await.unwrap();
    assert_eq!(booking.reference_code.as_str(), "TRB-000001");
}

#[tokio::test]
async fn restore_without_a_snapshot_starts_empty() {
    let snapshots = Arc::new(MemorySnapshotStore::<BookingState>::new());
    let store = BookingStore::restore_session(test_environment(), snapshots).unwrap();
    assert_eq!(store.item_count().await, 0);
    assert!(store.confirmed_bookings().await.is_empty());
}

#[tokio::test]
async fn file_snapshots_survive_a_session() {
    let dir = std::env::temp_dir().join(format!("tourbook-session-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = {
        let snapshots = Arc::new(FileSnapshotStore::in_dir(&dir));
        let path = snapshots.path().to_path_buf();
        let store = BookingStore::session(test_environment())
            .with_snapshots(snapshots as Arc<dyn SnapshotStore<BookingState>>);
        store
            .add_item(fixtures::draft("Desert Safari", 2, 120.0))
            .await
            .unwrap();
        path
    };

    let restored = BookingStore::restore_session(
        test_environment(),
        Arc::new(FileSnapshotStore::in_dir(&dir)),
    )
    .unwrap();
    assert_eq!(restored.item_count().await, 2);

    std::fs::remove_file(path).unwrap();
    let _ = std::fs::remove_dir(dir);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_mutations_are_serialized() {
    let store = BookingStore::session_with_config(
        test_environment(),
        StoreConfig::default().with_broadcast_capacity(64),
    );
    let mut events = store.subscribe();

    let mut handles = Vec::new();
    for i in 0..16u32 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            store
                .add_item(fixtures::draft(&format!("Tour {i}"), 1, 10.0))
                .await
                .unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(store.line_count().await, 16);
    assert!((store.cart_total().await - 160.0).abs() < 1e-9);

    // Every mutation was broadcast exactly once, with no interleaving loss.
    let mut seen = 0;
    while let Ok(event) = events.try_recv() {
        assert!(matches!(event, BookingEvent::ItemAdded { .. }));
        seen += 1;
    }
    assert_eq!(seen, 16);
}
