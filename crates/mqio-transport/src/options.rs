//! The typed option protocol.
//!
//! The transport library addresses options by numeric identifier with raw
//! byte payloads. The descriptor traits below pair an identifier with a
//! typed value so callers never touch the raw encoding: set descriptors
//! expose a payload, get descriptors absorb one. Context-scoped and
//! socket-scoped options are distinct families with distinct trait pairs.

use crate::driver::DriverResult;
use mqio_core::DriverError;

/// Identifiers understood by compatible transport libraries.
///
/// The numeric values are owned by the library; the adapter only carries
/// them through.
pub mod ids {
    /// Number of library I/O threads (context-scoped).
    pub const IO_THREADS: u32 = 1;
    /// Maximum number of concurrently open handles (context-scoped).
    pub const MAX_SOCKETS: u32 = 2;
    /// Endpoint identity payload presented to peers.
    pub const ROUTING_ID: u32 = 5;
    /// Kernel send-buffer size in bytes.
    pub const SEND_BUFFER_SIZE: u32 = 11;
    /// Kernel receive-buffer size in bytes.
    pub const RECEIVE_BUFFER_SIZE: u32 = 12;
    /// Whether the last received frame has more parts following.
    pub const RECEIVE_MORE: u32 = 13;
    /// Linger period for undelivered messages at close, in milliseconds.
    pub const LINGER: u32 = 17;
    /// High-water mark for outbound frames.
    pub const SEND_HIGH_WATER_MARK: u32 = 23;
    /// High-water mark for inbound frames.
    pub const RECEIVE_HIGH_WATER_MARK: u32 = 24;
}

/// A socket-scoped option carrying a value to set.
pub trait SetSocketOption {
    /// The native option identifier.
    fn identifier(&self) -> u32;
    /// The encoded payload handed to the library.
    fn payload(&self) -> &[u8];
}

/// A socket-scoped option receiving a retrieved value.
pub trait GetSocketOption {
    /// The native option identifier.
    fn identifier(&self) -> u32;
    /// Scratch capacity to offer the library for the payload.
    fn capacity(&self) -> usize;
    /// Absorb the retrieved payload. A payload the descriptor cannot
    /// decode is a native-layer artifact and surfaces as a driver error.
    fn store(&mut self, payload: &[u8]) -> DriverResult<()>;
}

/// A context-scoped option carrying a value to set.
pub trait SetContextOption {
    /// The native option identifier.
    fn identifier(&self) -> u32;
    /// The value handed to the library.
    fn value(&self) -> i32;
}

/// A context-scoped option receiving a retrieved value.
pub trait GetContextOption {
    /// The native option identifier.
    fn identifier(&self) -> u32;
    /// Absorb the retrieved value.
    fn store(&mut self, value: i32);
}

fn decode_i32(identifier: u32, payload: &[u8]) -> DriverResult<i32> {
    let raw: [u8; 4] = payload.try_into().map_err(|_| {
        DriverError::new(
            22,
            format!(
                "option {identifier} payload has length {}, expected 4",
                payload.len()
            ),
        )
    })?;
    Ok(i32::from_ne_bytes(raw))
}

macro_rules! integer_socket_option {
    ($(#[$meta:meta])* $name:ident, $id:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
        pub struct $name {
            raw: [u8; 4],
        }

        impl $name {
            /// Create the descriptor with a value to set.
            pub fn new(value: i32) -> Self {
                Self {
                    raw: value.to_ne_bytes(),
                }
            }

            /// The descriptor's current value.
            pub fn value(&self) -> i32 {
                i32::from_ne_bytes(self.raw)
            }
        }

        impl SetSocketOption for $name {
            fn identifier(&self) -> u32 {
                $id
            }

            fn payload(&self) -> &[u8] {
                &self.raw
            }
        }

        impl GetSocketOption for $name {
            fn identifier(&self) -> u32 {
                $id
            }

            fn capacity(&self) -> usize {
                4
            }

            fn store(&mut self, payload: &[u8]) -> DriverResult<()> {
                self.raw = decode_i32($id, payload)?.to_ne_bytes();
                Ok(())
            }
        }
    };
}

integer_socket_option!(
    /// Linger period for undelivered messages at close, in milliseconds.
    Linger,
    ids::LINGER
);

integer_socket_option!(
    /// High-water mark for outbound frames.
    SendHighWaterMark,
    ids::SEND_HIGH_WATER_MARK
);

integer_socket_option!(
    /// High-water mark for inbound frames.
    ReceiveHighWaterMark,
    ids::RECEIVE_HIGH_WATER_MARK
);

integer_socket_option!(
    /// Kernel send-buffer size in bytes.
    SendBufferSize,
    ids::SEND_BUFFER_SIZE
);

integer_socket_option!(
    /// Kernel receive-buffer size in bytes.
    ReceiveBufferSize,
    ids::RECEIVE_BUFFER_SIZE
);

/// Endpoint identity presented to peers, as an opaque byte string.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RoutingId {
    payload: Vec<u8>,
}

impl RoutingId {
    /// Maximum identity length accepted by compatible libraries.
    pub const MAX_LEN: usize = 255;

    /// Create the descriptor with an identity to set.
    pub fn new(payload: impl Into<Vec<u8>>) -> Self {
        Self {
            payload: payload.into(),
        }
    }

    /// The identity bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.payload
    }
}

impl SetSocketOption for RoutingId {
    fn identifier(&self) -> u32 {
        ids::ROUTING_ID
    }

    fn payload(&self) -> &[u8] {
        &self.payload
    }
}

impl GetSocketOption for RoutingId {
    fn identifier(&self) -> u32 {
        ids::ROUTING_ID
    }

    fn capacity(&self) -> usize {
        Self::MAX_LEN
    }

    fn store(&mut self, payload: &[u8]) -> DriverResult<()> {
        self.payload = payload.to_vec();
        Ok(())
    }
}

/// Whether the last received frame has more parts following.
///
/// Get-only: the multipart cursor is owned by the library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReceiveMore {
    raw: [u8; 4],
}

impl ReceiveMore {
    /// Create an empty query descriptor.
    pub fn new() -> Self {
        Self::default()
    }

    /// True when another frame of the current message is pending.
    pub fn more(&self) -> bool {
        i32::from_ne_bytes(self.raw) != 0
    }
}

impl GetSocketOption for ReceiveMore {
    fn identifier(&self) -> u32 {
        ids::RECEIVE_MORE
    }

    fn capacity(&self) -> usize {
        4
    }

    fn store(&mut self, payload: &[u8]) -> DriverResult<()> {
        self.raw = decode_i32(ids::RECEIVE_MORE, payload)?.to_ne_bytes();
        Ok(())
    }
}

macro_rules! integer_context_option {
    ($(#[$meta:meta])* $name:ident, $id:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
        pub struct $name {
            value: i32,
        }

        impl $name {
            /// Create the descriptor with a value to set.
            pub fn new(value: i32) -> Self {
                Self { value }
            }

            /// The descriptor's current value.
            pub fn value(&self) -> i32 {
                self.value
            }
        }

        impl SetContextOption for $name {
            fn identifier(&self) -> u32 {
                $id
            }

            fn value(&self) -> i32 {
                self.value
            }
        }

        impl GetContextOption for $name {
            fn identifier(&self) -> u32 {
                $id
            }

            fn store(&mut self, value: i32) {
                self.value = value;
            }
        }
    };
}

integer_context_option!(
    /// Number of library I/O threads.
    IoThreads,
    ids::IO_THREADS
);

integer_context_option!(
    /// Maximum number of concurrently open handles.
    MaxSockets,
    ids::MAX_SOCKETS
);
