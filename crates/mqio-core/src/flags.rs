//! Message flags for send and receive calls.

/// Per-call flags accepted by send and receive operations.
///
/// Flags are a plain bit set. The transport library maps them onto whatever
/// native call variants it provides; in particular [`MessageFlags::MORE`]
/// selects the "more frames follow" mode in both directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct MessageFlags(u32);

impl MessageFlags {
    /// The frame is one part of a logically larger multipart message.
    pub const MORE: u32 = 0b0000_0001;
    /// Never block the calling thread; report would-block instead.
    /// Forced on for every asynchronous operation.
    pub const NO_WAIT: u32 = 0b0000_0010;

    /// Create an empty flag set (blocking, single-frame).
    pub fn new() -> Self {
        Self(0)
    }

    /// Reconstruct flags from raw bits.
    pub fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// The raw bit representation.
    pub fn bits(self) -> u32 {
        self.0
    }

    /// Mark the frame as part of a multipart message.
    pub fn with_more(mut self) -> Self {
        self.0 |= Self::MORE;
        self
    }

    /// Forbid blocking; would-block is reported to the caller.
    pub fn with_no_wait(mut self) -> Self {
        self.0 |= Self::NO_WAIT;
        self
    }

    /// Check whether the multipart flag is set.
    pub fn is_more(self) -> bool {
        self.0 & Self::MORE != 0
    }

    /// Check whether blocking is forbidden.
    pub fn is_no_wait(self) -> bool {
        self.0 & Self::NO_WAIT != 0
    }
}
