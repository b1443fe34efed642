//! # datagram-protocol
//!
//! Framing and integrity core for a legacy UDP game protocol.
//!
//! This crate turns raw byte buffers into typed packet and fragment
//! structures, decodes the flag-driven optional-header region, and computes
//! the obfuscated checksum that binds header, metadata, and payload per
//! direction and sequence number. It frames, validates, and serializes
//! bytes; it never interprets payloads and never touches a socket.
//!
//! ## Components
//! - **[`core::header`]**: flag bitmask and the fixed 20-byte packet header
//! - **[`core::optional`]**: data-driven optional-header region decoder
//! - **[`core::fragment`]**: 16-byte fragment headers, inbound parsing,
//!   outbound fixed-capacity fragment arenas
//! - **[`core::packet`]**: packet assembly/disassembly and the checksum
//! - **[`session`]**: traits for the consumed hash and keystream primitives
//!
//! ## Example
//! ```rust
//! use datagram_protocol::{ClientPacket, ServerPacket, PacketHeaderFlags, ZeroKeystream};
//!
//! fn hash32(data: &[u8]) -> u32 {
//!     data.iter().fold(0u32, |acc, &b| acc.wrapping_mul(31).wrapping_add(b as u32))
//! }
//!
//! # fn main() -> datagram_protocol::Result<()> {
//! let mut outbound = ServerPacket::new(0x4000, PacketHeaderFlags::NONE)?;
//! outbound.write_payload(b"hello")?;
//! let wire = outbound.encode(&hash32, &ZeroKeystream)?;
//!
//! let inbound = ClientPacket::parse_with_direction(
//!     &wire,
//!     datagram_protocol::PacketDirection::Server,
//! )?;
//! inbound.verify_checksum(&hash32, &ZeroKeystream)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Security
//! - Every declared length is validated before allocation or iteration
//! - Malformed fragment remainders fail loudly, never silently truncate
//! - The checksum sentinel keeps the checksum out of its own hash input

pub mod core;
pub mod error;
pub mod session;

pub use crate::core::fragment::{
    ClientFragment, FragmentHeader, ServerFragment, MAX_FRAGMENT_SIZE,
};
pub use crate::core::header::{
    PacketDirection, PacketHeader, PacketHeaderFlags, CHECKSUM_SENTINEL,
};
pub use crate::core::optional::optional_header_len;
pub use crate::core::packet::{
    compute_checksum, ClientPacket, ServerPacket, MAX_DATA_SIZE, MAX_PACKET_SIZE,
};
pub use crate::error::{ProtocolError, Result};
pub use crate::session::{KeystreamSource, WireHash, ZeroKeystream};
