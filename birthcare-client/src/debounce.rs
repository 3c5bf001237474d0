//! Search input debouncing

use birthcare_core::DEFAULT_DEBOUNCE;
use std::time::Duration;
use tokio::sync::mpsc;

/// Coalesces rapid search updates and emits only the last value once the
/// input has been quiet for the window.
#[derive(Debug, Clone)]
pub struct SearchDebouncer {
    input: mpsc::UnboundedSender<String>,
}

impl SearchDebouncer {
    /// Start the debouncing task with the default window
    pub fn spawn() -> (Self, mpsc::Receiver<String>) {
        Self::with_window(DEFAULT_DEBOUNCE)
    }

    pub fn with_window(window: Duration) -> (Self, mpsc::Receiver<String>) {
        let (input, mut rx) = mpsc::unbounded_channel::<String>();
        let (tx, output) = mpsc::channel(16);

        tokio::spawn(async move {
            while let Some(mut latest) = rx.recv().await {
                loop {
                    tokio::select! {
                        next = rx.recv() => match next {
                            Some(value) => latest = value,
                            None => {
                                let _ = tx.send(latest).await;
                                return;
                            }
                        },
                        _ = tokio::time::sleep(window) => break,
                    }
                }
                if tx.send(latest).await.is_err() {
                    return;
                }
            }
        });

        (Self { input }, output)
    }

    /// Returns false once the receiving side is gone
    pub fn push(&self, value: impl Into<String>) -> bool {
        self.input.send(value.into()).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_burst_emits_last_value() {
        let (debouncer, mut out) = SearchDebouncer::spawn();
        debouncer.push("r");
        debouncer.push("re");
        debouncer.push("rey");

        assert_eq!(out.recv().await.as_deref(), Some("rey"));
        assert!(out.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_quiet_gaps_emit_each_value() {
        let (debouncer, mut out) = SearchDebouncer::with_window(Duration::from_millis(100));
        debouncer.push("ana");
        assert_eq!(out.recv().await.as_deref(), Some("ana"));

        tokio::time::sleep(Duration::from_millis(500)).await;
        debouncer.push("maria");
        assert_eq!(out.recv().await.as_deref(), Some("maria"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_pending_value_flushed_on_drop() {
        let (debouncer, mut out) = SearchDebouncer::spawn();
        debouncer.push("santos");
        drop(debouncer);
        assert_eq!(out.recv().await.as_deref(), Some("santos"));
        assert!(out.recv().await.is_none());
    }
}
