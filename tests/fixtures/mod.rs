//! Deterministic in-memory collaborators for driving the adapter.

pub mod loopback;

use bytes::BytesMut;
use crossbeam_channel::{Receiver, Sender, unbounded};
use mqio_core::Result;

/// One observed completion callback.
#[derive(Debug)]
pub struct Completion {
    /// Label the test attached when queueing the operation.
    pub label: String,
    /// The outcome delivered to the callback.
    pub outcome: Result<usize>,
    /// For receives that completed successfully, the delivered bytes.
    pub data: Option<Vec<u8>>,
}

/// Collects completion callbacks in invocation order.
///
/// Handlers are plain closures holding a channel sender, so the log
/// observes exactly what the reactor delivered and nothing else.
pub struct CompletionLog {
    tx: Sender<Completion>,
    rx: Receiver<Completion>,
}

impl CompletionLog {
    /// Create an empty log.
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx }
    }

    /// A send-completion handler that records into this log.
    pub fn send_handler(&self, label: &str) -> impl FnOnce(Result<usize>) + Send + 'static {
        let tx = self.tx.clone();
        let label = label.to_owned();
        move |outcome| {
            let _ = tx.send(Completion {
                label,
                outcome,
                data: None,
            });
        }
    }

    /// A receive-completion handler that records into this log, capturing
    /// the delivered bytes on success.
    pub fn receive_handler(
        &self,
        label: &str,
    ) -> impl FnOnce(Result<usize>, BytesMut) + Send + 'static {
        let tx = self.tx.clone();
        let label = label.to_owned();
        move |outcome, buffer: BytesMut| {
            let data = outcome
                .as_ref()
                .ok()
                .map(|received| buffer[..*received].to_vec());
            let _ = tx.send(Completion {
                label,
                outcome,
                data,
            });
        }
    }

    /// All completions observed so far, in invocation order.
    pub fn drain(&self) -> Vec<Completion> {
        self.rx.try_iter().collect()
    }

    /// Number of completions observed so far.
    pub fn count(&self) -> usize {
        self.rx.len()
    }
}

impl Default for CompletionLog {
    fn default() -> Self {
        Self::new()
    }
}
