//! Shutdown direction ordering.
//!
//! A socket's shutdown state only ever becomes more restrictive. The state
//! space is a partial order, not a numeric scale: disabling receives says
//! nothing about sends, so `Receive` and `Send` are incomparable and the
//! only way past either is `Both`.
//!
//! ```text
//!            Both
//!           /    \
//!      Receive   Send
//!           \    /
//!         NotShutDown
//! ```

/// A shutdown request: which direction of traffic to disable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shutdown {
    /// Disable receiving messages.
    Receive,
    /// Disable sending messages.
    Send,
    /// Disable both directions.
    Both,
}

/// The recorded shutdown state of a socket.
///
/// `NotShutDown` is the sentinel a freshly constructed (or moved-from)
/// socket carries; it is distinct from every real shutdown value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum ShutdownState {
    /// No direction has been disabled yet.
    #[default]
    NotShutDown,
    /// Receiving is disabled.
    Receive,
    /// Sending is disabled.
    Send,
    /// Both directions are disabled.
    Both,
}

impl ShutdownState {
    /// Whether a transition to `requested` is permitted.
    ///
    /// A request is permitted iff the current state is less than or equal
    /// to the requested state under the partial order above: requesting the
    /// same or a more restrictive direction succeeds, anything that would
    /// re-enable a disabled direction fails.
    pub fn permits(self, requested: Shutdown) -> bool {
        match self {
            Self::NotShutDown => true,
            Self::Receive => matches!(requested, Shutdown::Receive | Shutdown::Both),
            Self::Send => matches!(requested, Shutdown::Send | Shutdown::Both),
            Self::Both => matches!(requested, Shutdown::Both),
        }
    }

    /// Whether receiving has been disabled.
    pub fn receives_disabled(self) -> bool {
        matches!(self, Self::Receive | Self::Both)
    }

    /// Whether sending has been disabled.
    pub fn sends_disabled(self) -> bool {
        matches!(self, Self::Send | Self::Both)
    }
}

impl From<Shutdown> for ShutdownState {
    fn from(requested: Shutdown) -> Self {
        match requested {
            Shutdown::Receive => Self::Receive,
            Shutdown::Send => Self::Send,
            Shutdown::Both => Self::Both,
        }
    }
}
