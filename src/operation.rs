//! Spawned network operations whose results are folded on the UI tick.
//!
//! A finished future does not touch the cache from its tokio task. Its
//! output is queued on the client's `EffectQueue` together with the closure
//! that folds it, and the queue is drained on the UI tick. Each fold writes
//! the store and yields a message for the controller that spawned it, which
//! reads it from its own `Operations<M>`.
//!
//! The queue belongs to the client, not to a controller, so a result whose
//! controller has gone away is still folded into the store. Only the message
//! is lost. Nothing is cancelled.
//!
//! # Example
//!
//! ```ignore
//! let mut ops = Operations::new();
//! ops.spawn(client.effects(), client.fetch_page(&query, None), move |result| {
//!     Message::FirstPage(fold_into_store(result))
//! });
//!
//! // In event loop tick
//! client.effects().apply_pending();
//! for message in ops.poll() {
//!     attach(message);
//! }
//! ```

use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::mpsc;
use tracing::trace;

type Effect = Box<dyn FnOnce() + Send>;

/// Completed operations waiting to be folded, in completion order.
///
/// A cheap cloneable handle; every clone feeds the same queue.
#[derive(Clone)]
pub struct EffectQueue {
  tx: mpsc::UnboundedSender<Effect>,
  rx: Arc<Mutex<mpsc::UnboundedReceiver<Effect>>>,
}

impl EffectQueue {
  pub fn new() -> Self {
    let (tx, rx) = mpsc::unbounded_channel();
    Self {
      tx,
      rx: Arc::new(Mutex::new(rx)),
    }
  }

  fn push(&self, effect: Effect) {
    // The receiver lives as long as any handle, including this one
    let _ = self.tx.send(effect);
  }

  /// Run every queued fold. Returns how many ran.
  pub fn apply_pending(&self) -> usize {
    let pending: Vec<Effect> = {
      let mut rx = self.rx.lock().unwrap_or_else(PoisonError::into_inner);
      std::iter::from_fn(|| rx.try_recv().ok()).collect()
    };
    let count = pending.len();
    for effect in pending {
      effect();
    }
    if count > 0 {
      trace!(count, "applied effects");
    }
    count
  }
}

impl Default for EffectQueue {
  fn default() -> Self {
    Self::new()
  }
}

pub struct Operations<M> {
  tx: mpsc::UnboundedSender<M>,
  rx: mpsc::UnboundedReceiver<M>,
  in_flight: usize,
}

impl<M: Send + 'static> Operations<M> {
  pub fn new() -> Self {
    let (tx, rx) = mpsc::unbounded_channel();
    Self {
      tx,
      rx,
      in_flight: 0,
    }
  }

  /// Run `future` in the background. Once it completes, `fold(output)` runs
  /// on the next drain of `effects` and its message arrives on a later poll.
  pub fn spawn<T, F, W>(&mut self, effects: &EffectQueue, future: F, fold: W)
  where
    T: Send + 'static,
    F: Future<Output = T> + Send + 'static,
    W: FnOnce(T) -> M + Send + 'static,
  {
    self.in_flight += 1;
    let tx = self.tx.clone();
    let effects = effects.clone();
    tokio::spawn(async move {
      let output = future.await;
      effects.push(Box::new(move || {
        // Ignore send errors - the controller may have been dropped
        let _ = tx.send(fold(output));
      }));
    });
  }

  /// Drain every folded operation without blocking.
  pub fn poll(&mut self) -> Vec<M> {
    let mut completed = Vec::new();
    while let Ok(message) = self.rx.try_recv() {
      completed.push(message);
    }
    self.in_flight = self.in_flight.saturating_sub(completed.len());
    completed
  }

  /// Operations spawned but not yet polled
  pub fn in_flight(&self) -> usize {
    self.in_flight
  }
}

impl<M: Send + 'static> Default for Operations<M> {
  fn default() -> Self {
    Self::new()
  }
}

impl<M> std::fmt::Debug for Operations<M> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Operations")
      .field("in_flight", &self.in_flight)
      .finish_non_exhaustive()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::atomic::{AtomicUsize, Ordering};
  use std::time::Duration;

  #[tokio::test]
  async fn test_poll_delivers_folded_output() {
    let effects = EffectQueue::new();
    let mut ops: Operations<Result<i32, String>> = Operations::new();
    ops.spawn(&effects, async { 21 * 2 }, Ok);
    assert_eq!(ops.in_flight(), 1);

    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(ops.poll().is_empty());

    assert_eq!(effects.apply_pending(), 1);
    assert_eq!(ops.poll(), vec![Ok(42)]);
    assert_eq!(ops.in_flight(), 0);
    assert!(ops.poll().is_empty());
  }

  #[tokio::test]
  async fn test_completion_order_wins_over_spawn_order() {
    let effects = EffectQueue::new();
    let mut ops: Operations<&'static str> = Operations::new();
    ops.spawn(
      &effects,
      async {
        tokio::time::sleep(Duration::from_millis(50)).await;
      },
      |_| "slow",
    );
    ops.spawn(&effects, async {}, |_| "fast");

    tokio::time::sleep(Duration::from_millis(10)).await;
    effects.apply_pending();
    assert_eq!(ops.poll(), vec!["fast"]);
    assert_eq!(ops.in_flight(), 1);

    tokio::time::sleep(Duration::from_millis(100)).await;
    effects.apply_pending();
    assert_eq!(ops.poll(), vec!["slow"]);
  }

  #[tokio::test]
  async fn test_poll_before_completion_is_empty() {
    let effects = EffectQueue::new();
    let mut ops: Operations<u8> = Operations::new();
    ops.spawn(
      &effects,
      async {
        tokio::time::sleep(Duration::from_millis(100)).await;
      },
      |_| 1,
    );
    assert_eq!(effects.apply_pending(), 0);
    assert!(ops.poll().is_empty());
    assert_eq!(ops.in_flight(), 1);
  }

  #[tokio::test]
  async fn test_fold_runs_after_controller_is_dropped() {
    let effects = EffectQueue::new();
    let folded = Arc::new(AtomicUsize::new(0));
    let mut ops: Operations<()> = Operations::new();
    let counter = folded.clone();
    ops.spawn(&effects, async { 3 }, move |n| {
      counter.fetch_add(n, Ordering::SeqCst);
    });
    drop(ops);

    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(effects.apply_pending(), 1);
    assert_eq!(folded.load(Ordering::SeqCst), 3);
  }
}
