//! One-shot send and receive operation objects.
//!
//! Each asynchronous call constructs exactly one operation. The operation
//! owns everything it needs for its lifetime (the handle reference, the
//! frame buffer, the flags with blocking forced off, and the completion
//! callback) and walks a small state machine driven by the reactor:
//!
//! ```text
//! queued ──readiness──▶ perform ──would-block──▶ queued (again)
//!                          │
//!                 success / hard error
//!                          ▼
//!                 outcome recorded ──▶ complete (exactly once)
//! ```
//!
//! A pre-resolved outcome slot covers the paths that never reach the
//! descriptor: zero-length no-ops, not-open failures, and cancellation.

use crate::driver::{Progress, TransportEndpoint};
use crate::reactor::{Perform, ReactorOp};
use bytes::{Bytes, BytesMut};
use mqio_core::{Error, MessageFlags, Result};
use std::sync::Arc;
use tracing::trace;

/// A one-shot asynchronous send.
///
/// The handler receives the bytes transferred on success or the terminal
/// error otherwise.
pub struct SendOp<F: FnOnce(Result<usize>) + Send + 'static> {
    endpoint: Option<Arc<dyn TransportEndpoint>>,
    frame: Bytes,
    flags: MessageFlags,
    handler: Option<F>,
    outcome: Option<Result<usize>>,
}

impl<F: FnOnce(Result<usize>) + Send + 'static> SendOp<F> {
    /// Construct a send of `frame` on `endpoint`. Blocking is forced off
    /// regardless of the caller's flags.
    pub fn new(endpoint: Arc<dyn TransportEndpoint>, frame: Bytes, flags: MessageFlags, handler: F) -> Self {
        Self {
            endpoint: Some(endpoint),
            frame,
            flags: flags.with_no_wait(),
            handler: Some(handler),
            outcome: None,
        }
    }

    /// Construct an already-resolved send, for failures detected before
    /// the operation could be queued (for example a socket that is not
    /// open). Posted to the completion queue, never to the descriptor.
    pub fn resolved(outcome: Result<usize>, handler: F) -> Self {
        Self {
            endpoint: None,
            frame: Bytes::new(),
            flags: MessageFlags::new().with_no_wait(),
            handler: Some(handler),
            outcome: Some(outcome),
        }
    }
}

impl<F: FnOnce(Result<usize>) + Send + 'static> ReactorOp for SendOp<F> {
    fn perform(&mut self) -> Perform {
        if self.outcome.is_some() {
            return Perform::Complete;
        }
        let Some(endpoint) = self.endpoint.as_deref() else {
            self.outcome = Some(Err(Error::NotOpen));
            return Perform::Complete;
        };
        match endpoint.try_send(&self.frame, self.flags) {
            Ok(Progress::Ready(sent)) => {
                self.outcome = Some(Ok(sent));
                Perform::Complete
            }
            Ok(Progress::WouldBlock) => {
                trace!(len = self.frame.len(), "send would block, staying queued");
                Perform::Retry
            }
            Err(err) => {
                self.outcome = Some(Err(err.into()));
                Perform::Complete
            }
        }
    }

    fn cancel(&mut self) {
        if self.outcome.is_none() {
            self.outcome = Some(Err(Error::Canceled));
        }
    }

    fn complete(self: Box<Self>) {
        let this = *self;
        let outcome = this.outcome.unwrap_or(Ok(0));
        if let Some(handler) = this.handler {
            handler(outcome);
        }
    }

    fn is_noop(&self) -> bool {
        self.outcome.is_none() && self.frame.is_empty()
    }
}

/// A one-shot asynchronous receive.
///
/// The operation owns the frame buffer exclusively for its lifetime; the
/// buffer is handed back through the handler on completion. Bytes are
/// written into `buffer[..n]` where `n` is the completed transfer size.
pub struct ReceiveOp<F: FnOnce(Result<usize>, BytesMut) + Send + 'static> {
    endpoint: Option<Arc<dyn TransportEndpoint>>,
    buffer: BytesMut,
    flags: MessageFlags,
    handler: Option<F>,
    outcome: Option<Result<usize>>,
}

impl<F: FnOnce(Result<usize>, BytesMut) + Send + 'static> ReceiveOp<F> {
    /// Construct a receive into `buffer` (its current length is the
    /// capacity offered to the transport). Blocking is forced off
    /// regardless of the caller's flags.
    pub fn new(
        endpoint: Arc<dyn TransportEndpoint>,
        buffer: BytesMut,
        flags: MessageFlags,
        handler: F,
    ) -> Self {
        Self {
            endpoint: Some(endpoint),
            buffer,
            flags: flags.with_no_wait(),
            handler: Some(handler),
            outcome: None,
        }
    }

    /// Construct an already-resolved receive; see [`SendOp::resolved`].
    pub fn resolved(outcome: Result<usize>, buffer: BytesMut, handler: F) -> Self {
        Self {
            endpoint: None,
            buffer,
            flags: MessageFlags::new().with_no_wait(),
            handler: Some(handler),
            outcome: Some(outcome),
        }
    }
}

impl<F: FnOnce(Result<usize>, BytesMut) + Send + 'static> ReactorOp for ReceiveOp<F> {
    fn perform(&mut self) -> Perform {
        if self.outcome.is_some() {
            return Perform::Complete;
        }
        let Some(endpoint) = self.endpoint.clone() else {
            self.outcome = Some(Err(Error::NotOpen));
            return Perform::Complete;
        };
        match endpoint.try_receive(&mut self.buffer, self.flags) {
            Ok(Progress::Ready(received)) => {
                self.outcome = Some(Ok(received));
                Perform::Complete
            }
            Ok(Progress::WouldBlock) => {
                trace!(capacity = self.buffer.len(), "receive would block, staying queued");
                Perform::Retry
            }
            Err(err) => {
                self.outcome = Some(Err(err.into()));
                Perform::Complete
            }
        }
    }

    fn cancel(&mut self) {
        if self.outcome.is_none() {
            self.outcome = Some(Err(Error::Canceled));
        }
    }

    fn complete(self: Box<Self>) {
        let this = *self;
        let outcome = this.outcome.unwrap_or(Ok(0));
        if let Some(handler) = this.handler {
            handler(outcome, this.buffer);
        }
    }

    fn is_noop(&self) -> bool {
        self.outcome.is_none() && self.buffer.is_empty()
    }
}
