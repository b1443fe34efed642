//! # Error Types
//!
//! Error taxonomy for the framing and integrity core.
//!
//! Every decode or encode failure is immediate, synchronous, and local to the
//! attempt that raised it. The codec never retries and never silently
//! truncates: a buffer that cannot satisfy a declared length fails with
//! [`ProtocolError::TruncatedInput`] and the partially decoded state is
//! discarded.
//!
//! ## Error Categories
//! - **Decode errors**: truncated or malformed inbound buffers
//! - **Encode errors**: outbound payload exceeding the wire format's bounds
//! - **Integrity errors**: checksum disagreement between peer and local state
//! - **Construction errors**: flag combinations the protocol forbids
//!
//! All errors implement `std::error::Error` for interoperability.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// ProtocolError is the primary error type for all framing operations
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProtocolError {
    /// A fixed-size or declared-length field extends past the end of the
    /// buffer. Fatal to the decode attempt; never partially recovered.
    #[error("truncated input: need {needed} bytes, have {available}")]
    TruncatedInput { needed: usize, available: usize },

    /// An outbound payload write would exceed the wire format's bound.
    #[error("oversized payload: {len} bytes exceeds maximum of {max}")]
    OversizedPayload { len: usize, max: usize },

    /// The locally computed checksum disagrees with the one carried in the
    /// packet header. Response policy (drop vs. request retransmit) belongs
    /// to the connection layer.
    #[error("checksum mismatch: computed {computed:#010x}, carried {carried:#010x}")]
    ChecksumMismatch { computed: u32, carried: u32 },

    /// A header flag combination the protocol forbids, e.g. the reserved
    /// low bit together with `EncryptedChecksum`.
    #[error("invalid flag combination: {0:#010x}")]
    InvalidFlagCombination(u32),
}

/// Type alias for Results using ProtocolError
pub type Result<T> = std::result::Result<T, ProtocolError>;
