//! Packet header types: flag bitmask, direction, and the fixed 20-byte
//! header codec.

use bytes::{Buf, BufMut};
use serde::{Deserialize, Serialize};
use std::ops::{BitOr, BitOrAssign};

use crate::error::{ProtocolError, Result};
use crate::session::WireHash;

/// Sentinel written over the checksum field before the header hashes
/// itself. The real checksum value is never part of its own hash input.
pub const CHECKSUM_SENTINEL: u32 = 0x0BAD_D70D;

/// Header flag bitmask.
///
/// Bit values are fixed by the legacy wire format and must never change.
/// The low bit `0x1` is reserved and may not be combined with
/// [`ENCRYPTED_CHECKSUM`](Self::ENCRYPTED_CHECKSUM); see [`Self::validate`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
pub struct PacketHeaderFlags(u32);

impl PacketHeaderFlags {
    pub const NONE: Self = Self(0x0000_0000);
    pub const ENCRYPTED_CHECKSUM: Self = Self(0x0000_0002);
    pub const BLOB_FRAGMENTS: Self = Self(0x0000_0004);
    pub const SERVER_SWITCH: Self = Self(0x0000_0100);
    pub const REQUEST_RETRANSMIT: Self = Self(0x0000_1000);
    pub const REJECT_RETRANSMIT: Self = Self(0x0000_2000);
    pub const ACK_SEQUENCE: Self = Self(0x0000_4000);
    pub const DISCONNECT: Self = Self(0x0000_8000);
    pub const LOGIN_REQUEST: Self = Self(0x0001_0000);
    pub const CONNECT_REQUEST: Self = Self(0x0004_0000);
    pub const CONNECT_RESPONSE: Self = Self(0x0008_0000);
    pub const CICMD_COMMAND: Self = Self(0x0040_0000);
    pub const TIME_SYNC: Self = Self(0x0100_0000);
    pub const ECHO_REQUEST: Self = Self(0x0200_0000);
    pub const ECHO_RESPONSE: Self = Self(0x0400_0000);
    pub const FLOW: Self = Self(0x0800_0000);

    /// Reserved low bit; incompatible with `ENCRYPTED_CHECKSUM`.
    const RESERVED_BIT: u32 = 0x0000_0001;

    /// Creates flags from a raw wire value.
    #[must_use]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw flag bits.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Returns `true` if any bit of `other` is set in `self`.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    /// Checks the protocol's flag-combination precondition.
    ///
    /// The reserved low bit and `ENCRYPTED_CHECKSUM` are mutually exclusive
    /// by protocol convention; any packet carrying both is rejected at
    /// construction rather than producing an undefined checksum.
    pub fn validate(self) -> Result<()> {
        if self.0 & Self::RESERVED_BIT != 0 && self.contains(Self::ENCRYPTED_CHECKSUM) {
            return Err(ProtocolError::InvalidFlagCombination(self.0));
        }
        Ok(())
    }
}

impl BitOr for PacketHeaderFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for PacketHeaderFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// Which of the two per-session sequence spaces (and keystreams) a packet
/// belongs to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
pub enum PacketDirection {
    #[default]
    None,
    /// Client to server.
    Client,
    /// Server to client.
    Server,
}

/// Fixed 20-byte packet header.
///
/// Little-endian field order on the wire: sequence, flags, checksum, id,
/// time, size, table. `size` counts the bytes that follow the header
/// (optional-header region plus payload or fragments).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
pub struct PacketHeader {
    pub sequence: u32,
    pub flags: PacketHeaderFlags,
    pub checksum: u32,
    pub id: u16,
    pub time: u16,
    pub size: u16,
    pub table: u16,
}

impl PacketHeader {
    /// Encoded header size in bytes.
    pub const SIZE: usize = 20;

    /// Decodes a header from the cursor, advancing it exactly
    /// [`Self::SIZE`] bytes.
    pub fn decode<B: Buf>(buf: &mut B) -> Result<Self> {
        if buf.remaining() < Self::SIZE {
            return Err(ProtocolError::TruncatedInput {
                needed: Self::SIZE,
                available: buf.remaining(),
            });
        }

        Ok(Self {
            sequence: buf.get_u32_le(),
            flags: PacketHeaderFlags::from_raw(buf.get_u32_le()),
            checksum: buf.get_u32_le(),
            id: buf.get_u16_le(),
            time: buf.get_u16_le(),
            size: buf.get_u16_le(),
            table: buf.get_u16_le(),
        })
    }

    /// Encodes the header into the buffer, field order preserved, no
    /// padding.
    pub fn encode<B: BufMut>(&self, buf: &mut B) {
        buf.put_u32_le(self.sequence);
        buf.put_u32_le(self.flags.raw());
        buf.put_u32_le(self.checksum);
        buf.put_u16_le(self.id);
        buf.put_u16_le(self.time);
        buf.put_u16_le(self.size);
        buf.put_u16_le(self.table);
    }

    /// Serializes the header to its exact wire representation.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        self.encode(&mut &mut bytes[..]);
        bytes
    }

    /// Hashes the header with its checksum field replaced by
    /// [`CHECKSUM_SENTINEL`].
    ///
    /// Works on a patched copy; the receiver-visible header is never
    /// mutated, so concurrent readers of a decoded packet stay safe.
    #[must_use]
    pub fn hash32<H: WireHash>(&self, hasher: &H) -> u32 {
        let patched = Self {
            checksum: CHECKSUM_SENTINEL,
            ..*self
        };
        hasher.hash32(&patched.to_bytes())
    }
}
