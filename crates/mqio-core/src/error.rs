//! Error types for the mqio adapter.

use std::io;
use thiserror::Error;

/// An error reported by the transport library, carried unchanged.
///
/// The adapter never reinterprets native failures: the numeric code and the
/// library's message travel through the facade exactly as the driver
/// produced them. Would-block is not an error at this level; drivers report
/// it through their progress classification instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} (native error {code})")]
pub struct DriverError {
    code: i32,
    message: String,
}

impl DriverError {
    /// Wrap a native error code and message.
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// The native error code, unchanged.
    pub fn code(&self) -> i32 {
        self.code
    }

    /// The native error message, unchanged.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Errors surfaced by socket and context operations.
///
/// Misuse of the object lifecycle (closing an unopened socket, creating
/// endpoints after context teardown) is a programmer error and panics
/// instead of appearing here.
#[derive(Debug, Error)]
pub enum Error {
    /// `open` was called on a socket that is already open.
    #[error("socket is already open")]
    AlreadyOpen,

    /// The operation requires an open socket.
    #[error("socket is not open")]
    NotOpen,

    /// The socket already recorded an endpoint; a socket may bind or
    /// connect exactly once in its lifetime.
    #[error("socket is already bound or connected")]
    AlreadyConnected,

    /// The requested shutdown direction would relax the current shutdown
    /// state. Shutdown is monotonic: a disabled direction stays disabled.
    #[error("shutdown direction cannot relax the current shutdown state")]
    InvalidShutdown,

    /// The transport context has been shut down; context-scoped options are
    /// no longer reachable.
    #[error("transport context has been shut down")]
    ContextShutDown,

    /// The operation was canceled before it could complete.
    #[error("operation canceled")]
    Canceled,

    /// The call could not complete without blocking. Surfaced only by the
    /// synchronous send/receive paths; asynchronous operations consume
    /// would-block internally to drive their retry loop.
    #[error("operation would block")]
    WouldBlock,

    /// A native transport-library failure, carried unchanged.
    #[error(transparent)]
    Driver(#[from] DriverError),

    /// A reactor-side failure, typically descriptor registration.
    #[error("reactor error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// True for the cancellation outcome delivered to queued operations.
    pub fn is_canceled(&self) -> bool {
        matches!(self, Error::Canceled)
    }
}

/// Result alias used throughout the adapter.
pub type Result<T> = std::result::Result<T, Error>;
