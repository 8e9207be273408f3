mod common;

use appcore::core::bus::EventBus;
use appcore::Event;
use crate::common::init_tracing;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{sleep, timeout};

const RECV_WINDOW: Duration = Duration::from_secs(2);

#[test]
fn subscribe_issues_unique_tokens() {
    let bus = EventBus::new();

    let tokens: HashSet<_> = (0..100).map(|_| bus.subscribe(|_| {})).collect();

    assert_eq!(tokens.len(), 100);
    assert_eq!(bus.subscriber_count(), 100);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn both_handlers_receive_then_only_remaining_after_unsubscribe() {
    init_tracing();
    let bus = EventBus::new();

    let (tx_a, mut rx_a) = mpsc::unbounded_channel();
    let (tx_b, mut rx_b) = mpsc::unbounded_channel();

    let token_a = bus.subscribe(move |e: &Event| {
        let _ = tx_a.send(e.clone());
    });
    let _token_b = bus.subscribe(move |e: &Event| {
        let _ = tx_b.send(e.clone());
    });

    let login = Event::UserLoggedIn {
        user_id: "u-1".into(),
    };
    bus.publish(login.clone());

    assert_eq!(timeout(RECV_WINDOW, rx_a.recv()).await.unwrap(), Some(login.clone()));
    assert_eq!(timeout(RECV_WINDOW, rx_b.recv()).await.unwrap(), Some(login));

    bus.unsubscribe(token_a);
    bus.publish(Event::UserLoggedOut);

    assert_eq!(
        timeout(RECV_WINDOW, rx_b.recv()).await.unwrap(),
        Some(Event::UserLoggedOut)
    );
    // The removed handler's channel stays silent.
    sleep(Duration::from_millis(100)).await;
    assert!(rx_a.try_recv().is_err());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn each_subscriber_sees_a_published_event_exactly_once() {
    let bus = EventBus::new();
    let deliveries = Arc::new(AtomicUsize::new(0));

    let (tx, mut rx) = mpsc::unbounded_channel();
    let counter = Arc::clone(&deliveries);
    bus.subscribe(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
        let _ = tx.send(());
    });

    bus.publish(Event::DataRefreshed);

    timeout(RECV_WINDOW, rx.recv()).await.unwrap();
    sleep(Duration::from_millis(100)).await;
    assert_eq!(deliveries.load(Ordering::SeqCst), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn unsubscribe_is_idempotent_and_leaves_others_untouched() {
    let bus = EventBus::new();

    let (tx, mut rx) = mpsc::unbounded_channel();
    let _survivor = bus.subscribe(move |e: &Event| {
        let _ = tx.send(e.clone());
    });
    let token = bus.subscribe(|_| {});

    bus.unsubscribe(token);
    bus.unsubscribe(token); // already removed, must be a no-op
    assert_eq!(bus.subscriber_count(), 1);

    bus.publish(Event::DataRefreshed);
    assert_eq!(
        timeout(RECV_WINDOW, rx.recv()).await.unwrap(),
        Some(Event::DataRefreshed)
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn panicking_handler_does_not_affect_publisher_or_peers() {
    init_tracing();
    let bus = EventBus::new();

    bus.subscribe(|_| panic!("handler blew up"));
    let (tx, mut rx) = mpsc::unbounded_channel();
    bus.subscribe(move |e: &Event| {
        let _ = tx.send(e.clone());
    });

    bus.publish(Event::DataRefreshed);
    assert_eq!(
        timeout(RECV_WINDOW, rx.recv()).await.unwrap(),
        Some(Event::DataRefreshed)
    );

    // Registry survives the panic and keeps delivering.
    assert_eq!(bus.subscriber_count(), 2);
    bus.publish(Event::UserLoggedOut);
    assert_eq!(
        timeout(RECV_WINDOW, rx.recv()).await.unwrap(),
        Some(Event::UserLoggedOut)
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn publish_with_no_subscribers_is_harmless() {
    let bus = EventBus::new();
    bus.publish(Event::DataRefreshed);
    assert_eq!(bus.subscriber_count(), 0);
}
