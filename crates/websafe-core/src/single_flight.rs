//! Per-key request coalescing.
//!
//! The first caller for a key spawns the computation; callers arriving while
//! it runs await the same result. The computation is a detached task, so it
//! finishes even when every waiter has gone away.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use futures::future::{BoxFuture, FutureExt, Shared};

type Pending<V> = Shared<BoxFuture<'static, Option<V>>>;
type Table<V> = Arc<Mutex<HashMap<String, Pending<V>>>>;

/// Outcome of [`SingleFlight::run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flight<V> {
    /// `None` if the computation panicked.
    pub value: Option<V>,
    /// True when this caller attached to a computation someone else started.
    pub joined: bool,
}

/// Table of in-progress computations keyed by string.
pub struct SingleFlight<V> {
    inflight: Table<V>,
}

impl<V> std::fmt::Debug for SingleFlight<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SingleFlight")
            .field("in_flight", &self.in_flight())
            .finish()
    }
}

impl<V> SingleFlight<V> {
    /// Number of keys with a computation in progress.
    pub fn in_flight(&self) -> usize {
        self.inflight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl<V> Default for SingleFlight<V> {
    fn default() -> Self {
        Self {
            inflight: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

/// Removes the key when the spawned computation ends, however it ends.
struct Landing<V> {
    table: Table<V>,
    key: String,
}

impl<V> Drop for Landing<V> {
    fn drop(&mut self) {
        self.table
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.key);
    }
}

impl<V> SingleFlight<V>
where
    V: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `make()` for `key` unless a computation for `key` is already running,
    /// in which case wait for that one instead.
    pub async fn run<F, Fut>(&self, key: &str, make: F) -> Flight<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = V> + Send + 'static,
    {
        let (pending, joined) = {
            let mut table = self.inflight.lock().unwrap_or_else(PoisonError::into_inner);
            match table.get(key) {
                Some(pending) => (pending.clone(), true),
                None => {
                    let landing = Landing {
                        table: Arc::clone(&self.inflight),
                        key: key.to_string(),
                    };
                    let work = make();
                    let handle = tokio::spawn(async move {
                        let _landing = landing;
                        work.await
                    });
                    let pending: Pending<V> = handle.map(Result::ok).boxed().shared();
                    table.insert(key.to_string(), pending.clone());
                    (pending, false)
                }
            }
        };

        Flight {
            value: pending.await,
            joined,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    #[tokio::test]
    async fn test_concurrent_callers_share_one_computation() {
        let flights = Arc::new(SingleFlight::<u32>::new());
        let runs = Arc::new(AtomicUsize::new(0));
        let gate = Arc::new(Notify::new());

        let make = |runs: Arc<AtomicUsize>, gate: Arc<Notify>| {
            move || async move {
                runs.fetch_add(1, Ordering::SeqCst);
                gate.notified().await;
                42
            }
        };

        let first = {
            let flights = Arc::clone(&flights);
            let make = make(Arc::clone(&runs), Arc::clone(&gate));
            tokio::spawn(async move { flights.run("k", make).await })
        };
        while flights.in_flight() == 0 {
            tokio::task::yield_now().await;
        }

        let release = async {
            for _ in 0..10 {
                tokio::task::yield_now().await;
            }
            gate.notify_one();
        };
        let (second, ()) = tokio::join!(
            flights.run("k", make(Arc::clone(&runs), Arc::clone(&gate))),
            release
        );
        let first = first.await.unwrap();

        assert_eq!(first.value, Some(42));
        assert_eq!(second.value, Some(42));
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert!(!first.joined);
        assert!(second.joined);
        assert_eq!(flights.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_entry_removed_after_completion() {
        let flights = SingleFlight::<&'static str>::new();

        let a = flights.run("k", || async { "a" }).await;
        let b = flights.run("k", || async { "b" }).await;

        assert_eq!(a.value, Some("a"));
        assert_eq!(b.value, Some("b"));
        assert!(!b.joined);
        assert_eq!(flights.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_distinct_keys_do_not_coalesce() {
        let flights = SingleFlight::<String>::new();
        let a = flights.run("a", || async { "A".to_string() }).await;
        let b = flights.run("b", || async { "B".to_string() }).await;
        assert_eq!(a.value.as_deref(), Some("A"));
        assert_eq!(b.value.as_deref(), Some("B"));
    }

    #[tokio::test]
    async fn test_panicking_computation_yields_none_and_clears_key() {
        let flights = SingleFlight::<u8>::new();
        let flight = flights
            .run("k", || async {
                if flights_should_panic() {
                    panic!("scorer blew up");
                }
                0
            })
            .await;
        assert_eq!(flight.value, None);
        assert_eq!(flights.in_flight(), 0);
    }

    fn flights_should_panic() -> bool {
        true
    }
}
