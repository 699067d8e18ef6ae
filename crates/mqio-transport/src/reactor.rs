//! Collaborator interface to the reactor event loop.
//!
//! The reactor itself (descriptor polling, readiness dispatch, timers)
//! lives outside this crate. The adapter only relies on the contract
//! below: descriptors are registered once, operations are queued per
//! descriptor and direction, readiness invokes an operation's `perform`,
//! and cancellation completes every queued operation exactly once before
//! returning.

use crate::driver::NativeDescriptor;
use std::any::Any;
use std::fmt;
use std::io;
use std::sync::Mutex;

/// Which readiness direction an operation waits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpDirection {
    /// Read interest: receive operations.
    Read,
    /// Write interest: send operations.
    Write,
}

/// What a [`ReactorOp::perform`] invocation decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Perform {
    /// The operation reached a terminal outcome; the reactor must remove
    /// it from the queue and invoke [`ReactorOp::complete`].
    Complete,
    /// The underlying call still reports would-block; the operation stays
    /// queued for the next readiness signal.
    Retry,
}

/// A one-shot unit of asynchronous work queued on a descriptor.
///
/// The reactor drives an operation through at most three steps:
/// `perform` on each readiness signal until it returns
/// [`Perform::Complete`], optionally `cancel` if the queue is being torn
/// down, and finally `complete`, which consumes the operation and fires
/// its callback exactly once. Operations are never reused or shared.
pub trait ReactorOp: Send {
    /// Retry the underlying non-blocking call and record the outcome.
    fn perform(&mut self) -> Perform;

    /// Record a cancellation outcome. Does nothing if the operation
    /// already reached a terminal outcome.
    fn cancel(&mut self);

    /// Fire the completion callback with the recorded outcome and release
    /// the operation's storage.
    fn complete(self: Box<Self>);

    /// Whether this operation has nothing to do (for example a
    /// zero-length request). No-ops are posted straight to the completion
    /// queue and never touch the descriptor.
    fn is_noop(&self) -> bool {
        false
    }
}

/// Per-descriptor registration state, owned by the reactor.
///
/// The slot's contents are opaque to the adapter: the reactor deposits
/// whatever bookkeeping it needs at registration and reclaims it at
/// deregistration. Moving a socket re-homes the slot contents onto the
/// destination through [`Reactor::move_descriptor`], leaving the source
/// vacant.
#[derive(Default)]
pub struct Registration {
    slot: Mutex<Option<Box<dyn Any + Send>>>,
}

impl Registration {
    /// Create an empty, unregistered slot.
    pub fn vacant() -> Self {
        Self::default()
    }

    /// Deposit reactor-owned state into the slot.
    pub fn occupy(&self, state: Box<dyn Any + Send>) {
        *self.lock() = Some(state);
    }

    /// Reclaim the slot's contents, leaving it vacant.
    pub fn vacate(&self) -> Option<Box<dyn Any + Send>> {
        self.lock().take()
    }

    /// Whether the slot currently holds registration state.
    pub fn is_registered(&self) -> bool {
        self.lock().is_some()
    }

    /// Inspect the slot's contents without removing them.
    pub fn inspect<R>(&self, f: impl FnOnce(Option<&(dyn Any + Send)>) -> R) -> R {
        let guard = self.lock();
        f(guard.as_deref())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<Box<dyn Any + Send>>> {
        self.slot.lock().expect("registration slot lock poisoned")
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("registered", &self.is_registered())
            .finish()
    }
}

/// The reactor's descriptor-registration and operation-queue surface.
///
/// # Contract
///
/// - Operations queued on the same descriptor in the same direction
///   complete in submission order. No ordering is guaranteed across
///   directions or descriptors.
/// - [`Reactor::cancel_ops`] and a deregistration with `cancel_ops` set
///   complete every queued operation with its cancellation outcome
///   *before returning*.
/// - `is_continuation` is a scheduling-fairness hint only; it never
///   affects correctness.
pub trait Reactor: Send + Sync {
    /// Associate a descriptor with the reactor, depositing registration
    /// state into `registration`.
    fn register_descriptor(
        &self,
        descriptor: NativeDescriptor,
        registration: &Registration,
    ) -> io::Result<()>;

    /// Remove a descriptor's association. With `cancel_ops` set, every
    /// queued operation is canceled and completed before this returns.
    fn deregister_descriptor(
        &self,
        descriptor: NativeDescriptor,
        registration: &Registration,
        cancel_ops: bool,
    );

    /// Queue a one-shot operation on a registered descriptor.
    ///
    /// `is_non_blocking` records that the operation's underlying call
    /// never blocks; the adapter always passes `true`.
    fn start_op(
        &self,
        direction: OpDirection,
        descriptor: NativeDescriptor,
        registration: &Registration,
        op: Box<dyn ReactorOp>,
        is_continuation: bool,
        is_non_blocking: bool,
    );

    /// Cancel every operation queued on the descriptor, in both
    /// directions, completing each exactly once before returning.
    fn cancel_ops(&self, descriptor: NativeDescriptor, registration: &Registration);

    /// Complete an operation without waiting for readiness. Used for
    /// no-op requests and pre-resolved failures.
    fn post_immediate_completion(&self, op: Box<dyn ReactorOp>, is_continuation: bool);

    /// Re-home a descriptor's registration state from `src` to `dst`
    /// when its owning record moves.
    fn move_descriptor(
        &self,
        descriptor: NativeDescriptor,
        dst: &Registration,
        src: &Registration,
    );
}
