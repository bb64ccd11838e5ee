//! Background consumer draining scanner observations into the store.
//!
//! ```text
//! render path                      consumer task
//! ┌──────────┐  try_send   ┌────────────────┐  resolve   ┌──────────┐
//! │ Scanner  │ ──────────▶ │ bounded queue  │ ─────────▶ │ Registry │
//! └──────────┘  (drops     └───────┬────────┘            └──────────┘
//!                when full)        │ record
//!                                  ▼
//!                          ┌────────────────┐
//!                          │ CoordinateStore│
//!                          └────────────────┘
//! ```
//!
//! The task exits when the shutdown signal flips, when the signal sender is
//! dropped, or when every queue sender is gone. On exit it applies whatever
//! is still queued so no observation that made it into the queue is lost.

use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;

use crate::registry::Registry;
use crate::scanner::Observation;
use crate::store::CoordinateStore;

/// Items carried by the observation queue.
#[derive(Debug)]
pub(crate) enum Message {
    Observed(Observation),
    /// Acknowledged once everything queued before it has been applied.
    Flush(oneshot::Sender<()>),
}

pub(crate) fn spawn_consumer(
    runtime: &Handle,
    rx: mpsc::Receiver<Message>,
    registry: Arc<Registry>,
    store: Arc<CoordinateStore>,
    shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    runtime.spawn(run_consumer(rx, registry, store, shutdown))
}

async fn run_consumer(
    mut rx: mpsc::Receiver<Message>,
    registry: Arc<Registry>,
    store: Arc<CoordinateStore>,
    mut shutdown: watch::Receiver<bool>,
) {
    tracing::debug!("Region locator consumer started");

    loop {
        tokio::select! {
            biased;

            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    tracing::debug!("Shutdown signal received, stopping consumer");
                    break;
                }
            }

            msg = rx.recv() => {
                match msg {
                    Some(msg) => apply(msg, &registry, &store),
                    None => {
                        tracing::debug!("Observation queue closed, stopping consumer");
                        break;
                    }
                }
            }
        }
    }

    rx.close();
    let mut drained = 0usize;
    while let Ok(msg) = rx.try_recv() {
        apply(msg, &registry, &store);
        drained += 1;
    }

    tracing::debug!("Region locator consumer stopped (drained {} pending)", drained);
}

fn apply(msg: Message, registry: &Registry, store: &CoordinateStore) {
    match msg {
        Message::Observed(observation) => record(observation, registry, store),
        Message::Flush(ack) => {
            // The waiter may have given up.
            let _ = ack.send(());
        }
    }
}

/// Record an observation under its region name.
///
/// The registry stays read-locked until the store is written, so a region
/// forgotten concurrently is either recorded and then cleared, or not
/// recorded at all.
fn record(observation: Observation, registry: &Registry, store: &CoordinateStore) {
    let recorded = registry.resolve_and(observation.token, |name, role| {
        store.record(Arc::clone(name), role, observation.coord)
    });

    if recorded.is_none() {
        tracing::trace!(
            "Ignoring observation for unknown token {}",
            observation.token
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::area::{Area, Coord};
    use crate::marker::Token;

    struct Harness {
        tx: mpsc::Sender<Message>,
        shutdown_tx: watch::Sender<bool>,
        registry: Arc<Registry>,
        store: Arc<CoordinateStore>,
        handle: JoinHandle<()>,
    }

    fn harness(capacity: usize) -> Harness {
        let (tx, rx) = mpsc::channel(capacity);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let registry = Arc::new(Registry::new(500));
        let store = Arc::new(CoordinateStore::new());
        let handle = spawn_consumer(
            &Handle::current(),
            rx,
            Arc::clone(&registry),
            Arc::clone(&store),
            shutdown_rx,
        );
        Harness {
            tx,
            shutdown_tx,
            registry,
            store,
            handle,
        }
    }

    fn observed(token: Token, row: u16, column: u16) -> Message {
        Message::Observed(Observation {
            token,
            coord: Coord::new(row, column),
        })
    }

    async fn flush(tx: &mpsc::Sender<Message>) {
        let (ack_tx, ack_rx) = oneshot::channel();
        tx.send(Message::Flush(ack_tx)).await.unwrap();
        ack_rx.await.unwrap();
    }

    #[tokio::test]
    async fn test_consumer_records_observations() {
        let h = harness(16);
        let tokens = h.registry.intern("panel");

        h.tx.send(observed(tokens.start, 1, 2)).await.unwrap();
        h.tx.send(observed(tokens.end, 3, 8)).await.unwrap();
        flush(&h.tx).await;

        assert_eq!(
            h.store.get("panel"),
            Area::new(Coord::new(1, 2), Coord::new(3, 8))
        );
    }

    #[tokio::test]
    async fn test_consumer_ignores_unknown_tokens() {
        let h = harness(16);

        h.tx.send(observed(Token::new(99_999), 0, 0)).await.unwrap();
        flush(&h.tx).await;

        assert!(h.store.is_empty());
    }

    #[tokio::test]
    async fn test_consumer_last_write_wins() {
        let h = harness(16);
        let tokens = h.registry.intern("tab");

        h.tx.send(observed(tokens.start, 0, 0)).await.unwrap();
        h.tx.send(observed(tokens.start, 5, 5)).await.unwrap();
        flush(&h.tx).await;

        assert_eq!(h.store.get("tab").start(), Some(Coord::new(5, 5)));
    }

    #[tokio::test]
    async fn test_shutdown_signal_stops_consumer() {
        let h = harness(16);
        h.shutdown_tx.send(true).unwrap();

        tokio::time::timeout(std::time::Duration::from_secs(1), h.handle)
            .await
            .expect("consumer should stop promptly")
            .unwrap();
    }

    #[tokio::test]
    async fn test_shutdown_drains_pending() {
        let (tx, rx) = mpsc::channel(16);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let registry = Arc::new(Registry::new(500));
        let store = Arc::new(CoordinateStore::new());
        let tokens = registry.intern("late");

        // Queue work and request shutdown before the consumer ever runs.
        tx.try_send(observed(tokens.start, 2, 4)).unwrap();
        shutdown_tx.send(true).unwrap();

        let handle = spawn_consumer(
            &Handle::current(),
            rx,
            Arc::clone(&registry),
            Arc::clone(&store),
            shutdown_rx,
        );
        handle.await.unwrap();

        assert_eq!(store.get("late").start(), Some(Coord::new(2, 4)));
    }

    #[test]
    fn test_forget_waits_for_inflight_record() {
        let registry = Registry::new(500);
        let store = CoordinateStore::new();
        let tokens = registry.intern("retired");

        std::thread::scope(|scope| {
            let recorded = registry.resolve_and(tokens.start, |name, role| {
                let forget = scope.spawn(|| {
                    registry.forget_and("retired", || {
                        store.clear("retired");
                    })
                });

                // The forget cannot complete while the record is in progress.
                std::thread::sleep(std::time::Duration::from_millis(50));
                assert!(!forget.is_finished());

                store.record(Arc::clone(name), role, Coord::new(3, 4));
            });
            assert!(recorded.is_some());
        });

        assert_eq!(store.get("retired"), Area::UNKNOWN);
        assert!(registry.resolve(tokens.start).is_none());
    }

    #[test]
    fn test_record_after_forget_is_ignored() {
        let registry = Registry::new(500);
        let store = CoordinateStore::new();
        let tokens = registry.intern("retired");

        registry.forget_and("retired", || {
            store.clear("retired");
        });
        record(
            Observation {
                token: tokens.start,
                coord: Coord::new(3, 4),
            },
            &registry,
            &store,
        );

        assert!(store.is_empty());
    }

    #[test]
    fn test_concurrent_forget_leaves_no_stale_area() {
        let registry = Registry::new(500);
        let store = CoordinateStore::new();
        let tokens = registry.intern("flicker");
        let observation = Observation {
            token: tokens.start,
            coord: Coord::new(1, 1),
        };

        std::thread::scope(|scope| {
            scope.spawn(|| {
                for _ in 0..10_000 {
                    record(observation, &registry, &store);
                }
            });
            scope.spawn(|| {
                std::thread::yield_now();
                registry.forget_and("flicker", || {
                    store.clear("flicker");
                });
            });
        });

        // Whatever the interleaving, nothing outlives the forget.
        assert_eq!(store.get("flicker"), Area::UNKNOWN);
    }

    #[tokio::test]
    async fn test_dropped_senders_stop_consumer() {
        let h = harness(4);
        drop(h.tx);
        drop(h.shutdown_tx);

        h.handle.await.unwrap();
    }
}
