//! Last-value-wins debouncing on a Tokio task.

use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::chat::core::errors::{ChatError, ChatResult};

/// Applies the latest pushed value once a quiet period passes with no newer
/// value.
///
/// Every push restarts the quiet period and replaces the pending value, so
/// an intermediate value is never applied after a newer one arrived.
/// Dropping the debouncer discards any pending value.
pub struct Debouncer<T> {
    tx: mpsc::UnboundedSender<T>,
    handle: JoinHandle<()>,
}

impl<T: Send + 'static> Debouncer<T> {
    /// Spawn the debounce task on the current Tokio runtime.
    ///
    /// # Errors
    /// Returns [`ChatError::NoRuntime`] outside a Tokio runtime.
    pub fn spawn<F>(quiet: Duration, apply: F) -> ChatResult<Self>
    where
        F: FnMut(T) + Send + 'static,
    {
        let runtime = Handle::try_current().map_err(|_| ChatError::NoRuntime)?;
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = runtime.spawn(run(rx, quiet, apply));
        Ok(Self { tx, handle })
    }

    /// Feed a new value. Returns `false` if the task is gone.
    #[must_use]
    pub fn push(&self, value: T) -> bool {
        self.tx.send(value).is_ok()
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn run<T, F>(mut rx: mpsc::UnboundedReceiver<T>, quiet: Duration, mut apply: F)
where
    T: Send,
    F: FnMut(T) + Send,
{
    while let Some(mut latest) = rx.recv().await {
        loop {
            tokio::select! {
                () = tokio::time::sleep(quiet) => {
                    apply(latest);
                    break;
                }
                next = rx.recv() => {
                    let Some(value) = next else {
                        debug!("Debouncer closed with a pending value");
                        return;
                    };
                    latest = value;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn spawn(quiet: Duration, apply: impl FnMut(u32) + Send + 'static) -> Debouncer<u32> {
        Debouncer::spawn(quiet, apply).unwrap_or_else(|_| unreachable!())
    }

    type Seen = Arc<Mutex<Vec<(u32, tokio::time::Instant)>>>;

    fn recorder() -> (Seen, impl FnMut(u32) + Send + 'static) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let apply = move |v: u32| {
            if let Ok(mut guard) = sink.lock() {
                guard.push((v, tokio::time::Instant::now()));
            }
        };
        (seen, apply)
    }

    fn values(seen: &Seen) -> Vec<u32> {
        seen.lock()
            .map(|g| g.iter().map(|(v, _)| *v).collect())
            .unwrap_or_default()
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_applies_once_with_last_value() {
        let (seen, apply) = recorder();
        let quiet = Duration::from_millis(300);
        let debouncer = spawn(quiet, apply);

        for v in 1..=5 {
            assert!(debouncer.push(v));
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        let last_push = tokio::time::Instant::now() - Duration::from_millis(100);

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert!(values(&seen).is_empty());

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(values(&seen), vec![5]);

        let at = seen.lock().ok().and_then(|g| g.first().map(|(_, t)| *t));
        assert!(at.is_some_and(|t| t >= last_push + quiet));
        assert!(at.is_some_and(|t| t < last_push + quiet + Duration::from_millis(5)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_separated_pushes_apply_separately() {
        let (seen, apply) = recorder();
        let debouncer = spawn(Duration::from_millis(300), apply);

        assert!(debouncer.push(1));
        tokio::time::sleep(Duration::from_millis(400)).await;
        assert!(debouncer.push(2));
        tokio::time::sleep(Duration::from_millis(400)).await;

        assert_eq!(values(&seen), vec![1, 2]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_discards_pending() {
        let (seen, apply) = recorder();
        let debouncer = spawn(Duration::from_millis(300), apply);

        assert!(debouncer.push(7));
        drop(debouncer);
        tokio::time::sleep(Duration::from_secs(1)).await;

        assert!(values(&seen).is_empty());
    }

    #[test]
    fn test_spawn_outside_runtime_is_an_error() {
        let result = Debouncer::spawn(Duration::from_millis(10), |_: u32| {});
        assert!(matches!(result, Err(ChatError::NoRuntime)));
    }
}
