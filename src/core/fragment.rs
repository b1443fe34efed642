//! Fragment framing: the fixed 16-byte fragment header plus the two
//! fragment variants.
//!
//! Inbound (client-direction) fragments are parsed out of a packet's data
//! region; outbound (server-direction) fragments are filled incrementally
//! into a fixed-capacity arena before the connection layer sequences and
//! sends them.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::core::packet::MAX_PACKET_SIZE;
use crate::core::header::PacketHeader;
use crate::error::{ProtocolError, Result};
use crate::session::WireHash;

/// Largest fragment (header plus payload) the wire format allows.
pub const MAX_FRAGMENT_SIZE: usize = MAX_PACKET_SIZE - PacketHeader::SIZE;

/// Fixed 16-byte fragment header.
///
/// Little-endian field order on the wire: sequence, id, count, size, index,
/// group. `size` includes these 16 header bytes, so the payload length is
/// `size - 16`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FragmentHeader {
    pub sequence: u32,
    pub id: u32,
    pub count: u16,
    pub size: u16,
    pub index: u16,
    pub group: u16,
}

impl FragmentHeader {
    /// Encoded header size in bytes.
    pub const SIZE: usize = 16;

    /// Decodes a fragment header, advancing the cursor exactly
    /// [`Self::SIZE`] bytes. Field values are not range-checked here;
    /// validation belongs to the caller.
    pub fn decode<B: Buf>(buf: &mut B) -> Result<Self> {
        if buf.remaining() < Self::SIZE {
            return Err(ProtocolError::TruncatedInput {
                needed: Self::SIZE,
                available: buf.remaining(),
            });
        }

        Ok(Self {
            sequence: buf.get_u32_le(),
            id: buf.get_u32_le(),
            count: buf.get_u16_le(),
            size: buf.get_u16_le(),
            index: buf.get_u16_le(),
            group: buf.get_u16_le(),
        })
    }

    /// Encodes the header into the buffer, field order preserved, no
    /// padding.
    pub fn encode<B: BufMut>(&self, buf: &mut B) {
        buf.put_u32_le(self.sequence);
        buf.put_u32_le(self.id);
        buf.put_u16_le(self.count);
        buf.put_u16_le(self.size);
        buf.put_u16_le(self.index);
        buf.put_u16_le(self.group);
    }

    /// Serializes the header to its exact wire representation.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        self.encode(&mut &mut bytes[..]);
        bytes
    }

    /// Payload byte count declared by this header (`size - 16`).
    ///
    /// A declared size smaller than the header itself cannot describe a
    /// decodable fragment and is reported as truncation.
    pub fn payload_len(&self) -> Result<usize> {
        (self.size as usize)
            .checked_sub(Self::SIZE)
            .ok_or(ProtocolError::TruncatedInput {
                needed: Self::SIZE,
                available: self.size as usize,
            })
    }
}

/// Integrity value of one fragment: header hash plus payload hash, with
/// u32 wraparound.
pub(crate) fn fragment_hash<H: WireHash>(
    header: &FragmentHeader,
    payload: &[u8],
    hasher: &H,
) -> u32 {
    hasher
        .hash32(&header.to_bytes())
        .wrapping_add(hasher.hash32(payload))
}

/// An inbound fragment decoded from a packet's data region.
///
/// Immutable after parse; the payload is a cheap ref-counted slice of the
/// parent packet's buffer.
#[derive(Debug, Clone)]
pub struct ClientFragment {
    header: FragmentHeader,
    payload: Bytes,
}

impl ClientFragment {
    /// Parses one fragment: header, then exactly `size - 16` payload bytes.
    pub fn parse(buf: &mut Bytes) -> Result<Self> {
        let header = FragmentHeader::decode(buf)?;
        let payload_len = header.payload_len()?;

        if buf.remaining() < payload_len {
            return Err(ProtocolError::TruncatedInput {
                needed: payload_len,
                available: buf.remaining(),
            });
        }

        let payload = buf.split_to(payload_len);
        Ok(Self { header, payload })
    }

    #[must_use]
    pub fn header(&self) -> &FragmentHeader {
        &self.header
    }

    /// Payload bytes (the region after the 16-byte header).
    #[must_use]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Forward-only read cursor over the payload, for the game-logic layer.
    #[must_use]
    pub fn reader(&self) -> Bytes {
        self.payload.clone()
    }
}

/// An outbound fragment backed by a fixed-capacity arena.
///
/// The header starts zeroed except for `group`; the connection layer fills
/// sequence, id, count and index when it schedules the send. `size` tracks
/// the written payload automatically.
#[derive(Debug)]
pub struct ServerFragment {
    header: FragmentHeader,
    data: BytesMut,
}

impl ServerFragment {
    /// Largest payload one fragment can carry.
    pub const MAX_PAYLOAD: usize = MAX_FRAGMENT_SIZE - FragmentHeader::SIZE;

    /// Creates an empty fragment for `group`, writing `opcode`, when given,
    /// as the first 4 payload bytes.
    #[must_use]
    pub fn new(group: u16, opcode: Option<u32>) -> Self {
        let mut data = BytesMut::with_capacity(MAX_FRAGMENT_SIZE);
        if let Some(opcode) = opcode {
            data.put_u32_le(opcode);
        }

        let header = FragmentHeader {
            group,
            size: (FragmentHeader::SIZE + data.len()) as u16,
            ..FragmentHeader::default()
        };

        Self { header, data }
    }

    /// Appends payload bytes, bounded by [`Self::MAX_PAYLOAD`].
    pub fn write(&mut self, bytes: &[u8]) -> Result<()> {
        let len = self.data.len() + bytes.len();
        if len > Self::MAX_PAYLOAD {
            return Err(ProtocolError::OversizedPayload {
                len,
                max: Self::MAX_PAYLOAD,
            });
        }

        self.data.put_slice(bytes);
        self.header.size = (FragmentHeader::SIZE + self.data.len()) as u16;
        Ok(())
    }

    #[must_use]
    pub fn header(&self) -> &FragmentHeader {
        &self.header
    }

    /// Mutable header access for the connection layer to stamp sequence,
    /// id, count and index. `size` is overwritten on the next write.
    pub fn header_mut(&mut self) -> &mut FragmentHeader {
        &mut self.header
    }

    #[must_use]
    pub fn payload(&self) -> &[u8] {
        &self.data
    }

    /// Serializes header followed by payload.
    pub fn encode<B: BufMut>(&self, buf: &mut B) {
        self.header.encode(buf);
        buf.put_slice(&self.data);
    }

    /// Total wire size of this fragment (header plus payload).
    #[must_use]
    pub fn wire_len(&self) -> usize {
        FragmentHeader::SIZE + self.data.len()
    }
}
