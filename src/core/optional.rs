//! Optional-header region decoder.
//!
//! Between the fixed packet header and the payload sits a variable-length
//! run of protocol metadata blocks, each present only when its header flag
//! is set. The blocks appear in a fixed declaration order regardless of how
//! the flags were combined, so the decoder walks a static table instead of
//! a chain of flag checks.

use bytes::Buf;
use tracing::trace;

use crate::core::header::PacketHeaderFlags;
use crate::error::{ProtocolError, Result};

/// Shape of one optional-header block.
#[derive(Debug, Clone, Copy)]
enum BlockShape {
    /// A block of a fixed number of bytes.
    Fixed(usize),
    /// A u32 little-endian byte count followed by that many bytes.
    LengthPrefixed,
}

/// Declaration order is part of the wire format and must not change.
const OPTIONAL_BLOCKS: &[(PacketHeaderFlags, BlockShape)] = &[
    (PacketHeaderFlags::SERVER_SWITCH, BlockShape::Fixed(8)),
    (PacketHeaderFlags::REQUEST_RETRANSMIT, BlockShape::LengthPrefixed),
    (PacketHeaderFlags::REJECT_RETRANSMIT, BlockShape::LengthPrefixed),
    (PacketHeaderFlags::ACK_SEQUENCE, BlockShape::Fixed(4)),
    (PacketHeaderFlags::CICMD_COMMAND, BlockShape::Fixed(8)),
    (PacketHeaderFlags::TIME_SYNC, BlockShape::Fixed(8)),
    (PacketHeaderFlags::ECHO_REQUEST, BlockShape::Fixed(4)),
    (PacketHeaderFlags::ECHO_RESPONSE, BlockShape::Fixed(8)),
    (PacketHeaderFlags::FLOW, BlockShape::Fixed(6)),
];

/// Consumes every optional-header block selected by `flags` from the
/// cursor and returns the total number of bytes consumed.
///
/// The returned length is needed later by the checksum computation, which
/// hashes the optional-header region separately when fragments are present.
pub fn optional_header_len<B: Buf>(flags: PacketHeaderFlags, buf: &mut B) -> Result<usize> {
    let mut consumed = 0usize;

    for &(flag, shape) in OPTIONAL_BLOCKS {
        if !flags.contains(flag) {
            continue;
        }

        let block_len = match shape {
            BlockShape::Fixed(len) => len,
            BlockShape::LengthPrefixed => {
                if buf.remaining() < 4 {
                    return Err(ProtocolError::TruncatedInput {
                        needed: 4,
                        available: buf.remaining(),
                    });
                }
                consumed += 4;
                buf.get_u32_le() as usize
            }
        };

        if buf.remaining() < block_len {
            return Err(ProtocolError::TruncatedInput {
                needed: block_len,
                available: buf.remaining(),
            });
        }
        buf.advance(block_len);
        consumed += block_len;
    }

    if consumed > 0 {
        trace!(flags = format_args!("{:#010x}", flags.raw()), consumed, "optional header region");
    }
    Ok(consumed)
}
