//! Trailing-edge debouncing of editor snapshots.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Collapses bursts of values into one emission.
///
/// Each [`Debouncer::push`] restarts the quiet period; once `delay` passes
/// without a push, the latest value is emitted on the receiver returned by
/// [`Debouncer::new`]. Earlier values in the burst are dropped.
#[derive(Debug)]
pub struct Debouncer<T> {
    input: mpsc::UnboundedSender<T>,
    task: JoinHandle<()>,
}

impl<T: Send + 'static> Debouncer<T> {
    /// Starts the debouncer task. Must be called within a tokio runtime.
    pub fn new(delay: Duration) -> (Self, mpsc::UnboundedReceiver<T>) {
        let (input, mut pending) = mpsc::unbounded_channel::<T>();
        let (output, settled) = mpsc::unbounded_channel();

        let task = tokio::spawn(async move {
            while let Some(mut latest) = pending.recv().await {
                loop {
                    tokio::select! {
                        next = pending.recv() => match next {
                            Some(value) => latest = value,
                            None => return,
                        },
                        () = tokio::time::sleep(delay) => {
                            if output.send(latest).is_err() {
                                return;
                            }
                            break;
                        }
                    }
                }
            }
        });

        (Self { input, task }, settled)
    }

    /// Queues `value`, restarting the quiet period.
    pub fn push(&self, value: T) {
        if self.input.send(value).is_err() {
            tracing::warn!("debouncer task has stopped; dropping value");
        }
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        self.task.abort();
    }
}
