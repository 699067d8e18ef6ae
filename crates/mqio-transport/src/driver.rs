//! Collaborator interface to the external message transport library.
//!
//! The transport library owns the protocol engine, the message framing and
//! the handle lifecycle; this adapter only needs a narrow, synchronous
//! surface from it: create a handle, try a non-blocking send or receive,
//! query the pollable descriptor, and get/set options by numeric
//! identifier. Everything here is a trait so the adapter never links
//! against a concrete library.

use mqio_core::{DriverError, MessageFlags};
use std::sync::Arc;

/// The OS-level descriptor type the reactor polls.
#[cfg(unix)]
pub type NativeDescriptor = std::os::fd::RawFd;

/// The OS-level descriptor type the reactor polls.
#[cfg(not(unix))]
pub type NativeDescriptor = std::os::windows::io::RawSocket;

/// Result alias for driver calls.
pub type DriverResult<T> = Result<T, DriverError>;

/// Outcome of a single non-blocking attempt.
///
/// This is the one classification shared by the synchronous and
/// asynchronous paths: a native call either made progress, reported
/// would-block, or failed hard (`Err`). Would-block is deliberately not an
/// error: it is the signal that drives the asynchronous retry loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// The call completed, transferring this many bytes.
    Ready(usize),
    /// The call could not complete without blocking right now.
    WouldBlock,
}

/// Identifies the messaging pattern of an endpoint.
///
/// The numeric value is defined by the transport library; the adapter
/// passes it through opaquely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SocketKind(u32);

impl SocketKind {
    /// Wrap a library-defined socket type constant.
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// The library-defined constant.
    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// One message-oriented endpoint owned by the transport library.
///
/// Handles are exclusively owned by a single socket record; the adapter
/// shares them with in-flight operations through `Arc`, and the library
/// releases the underlying resource when the last reference drops.
///
/// # Blocking contract
///
/// `try_send` and `try_receive` honor [`MessageFlags::NO_WAIT`]: with the
/// flag set they return [`Progress::WouldBlock`] instead of blocking; with
/// it clear they may block the calling thread, mirroring a traditional
/// blocking socket call. Asynchronous operations always force the flag.
pub trait TransportEndpoint: Send + Sync {
    /// Attempt to send one frame. [`MessageFlags::MORE`] selects the
    /// library's "more frames follow" send variant.
    fn try_send(&self, frame: &[u8], flags: MessageFlags) -> DriverResult<Progress>;

    /// Attempt to receive one frame into `frame`. [`MessageFlags::MORE`]
    /// selects the library's multipart receive variant.
    fn try_receive(&self, frame: &mut [u8], flags: MessageFlags) -> DriverResult<Progress>;

    /// Accept incoming connections on `endpoint`.
    fn bind(&self, endpoint: &str) -> DriverResult<()>;

    /// Connect to a remote `endpoint`.
    fn connect(&self, endpoint: &str) -> DriverResult<()>;

    /// The pollable OS-level descriptor for this handle, if it exposes
    /// one. See [`crate::readiness`] for what readiness on it means.
    fn native_descriptor(&self) -> DriverResult<NativeDescriptor>;

    /// Set a socket-scoped option by its native identifier.
    fn set_option(&self, identifier: u32, payload: &[u8]) -> DriverResult<()>;

    /// Retrieve a socket-scoped option by its native identifier, writing
    /// the payload into `payload` and returning its length.
    fn get_option(&self, identifier: u32, payload: &mut [u8]) -> DriverResult<usize>;
}

/// The process-wide transport library context.
///
/// Exactly one driver-level context underlies all sockets; the adapter
/// wraps it in [`crate::Context`] for shared ownership and guarded
/// teardown. Dropping the driver releases the native context.
pub trait TransportDriver: Send + Sync {
    /// Create a new endpoint handle of the given kind.
    fn open_endpoint(&self, kind: SocketKind) -> DriverResult<Arc<dyn TransportEndpoint>>;

    /// Set a context-scoped option by its native identifier.
    fn set_context_option(&self, identifier: u32, value: i32) -> DriverResult<()>;

    /// Retrieve a context-scoped option by its native identifier.
    fn get_context_option(&self, identifier: u32) -> DriverResult<i32>;
}
