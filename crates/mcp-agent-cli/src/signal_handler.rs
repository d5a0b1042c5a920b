//! Ctrl+C handling for agent runs
//!
//! SIGINT and SIGTERM do not kill the process; they flip a flag that the
//! run loop watches so the MCP connection can still be closed.

use futures::stream::StreamExt;
use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook_tokio::{Handle, Signals};
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Notify;
use tokio::task::JoinHandle;

/// Exit status after an interrupted run (128 + SIGINT)
pub const INTERRUPTED_EXIT_CODE: u8 = 130;

/// Signal handler for Ctrl+C interrupts
pub struct SignalHandler {
    interrupted: Arc<AtomicBool>,
    notify: Arc<Notify>,
    signals: Handle,
    task_handle: JoinHandle<()>,
}

impl SignalHandler {
    /// Start listening for SIGINT and SIGTERM
    pub fn start() -> io::Result<Self> {
        let mut signals = Signals::new([SIGINT, SIGTERM])?;
        let handle = signals.handle();
        let interrupted = Arc::new(AtomicBool::new(false));
        let notify = Arc::new(Notify::new());

        let flag = Arc::clone(&interrupted);
        let waiters = Arc::clone(&notify);
        let task_handle = tokio::spawn(async move {
            while let Some(signal) = signals.next().await {
                match signal {
                    SIGINT => tracing::debug!("Received SIGINT"),
                    SIGTERM => tracing::debug!("Received SIGTERM"),
                    _ => continue,
                }
                flag.store(true, Ordering::SeqCst);
                waiters.notify_waiters();
            }
        });

        Ok(Self {
            interrupted,
            notify,
            signals: handle,
            task_handle,
        })
    }

    pub fn is_interrupted(&self) -> bool {
        self.interrupted.load(Ordering::SeqCst)
    }

    /// Resolves once Ctrl+C has been pressed or SIGTERM received
    pub async fn interrupted(&self) {
        let notified = self.notify.notified();
        tokio::pin!(notified);
        // Register before checking the flag so a signal in between is not missed
        notified.as_mut().enable();
        if self.is_interrupted() {
            return;
        }
        notified.await;
    }

    /// Stop listening for signals
    pub fn stop(self) {
        self.signals.close();
        self.task_handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_sigterm_interrupts() {
        let handler = SignalHandler::start().unwrap();
        assert!(!handler.is_interrupted());

        signal_hook::low_level::raise(SIGTERM).unwrap();
        tokio::time::timeout(Duration::from_secs(5), handler.interrupted())
            .await
            .expect("SIGTERM was not observed");
        assert!(handler.is_interrupted());

        handler.stop();
    }
}
