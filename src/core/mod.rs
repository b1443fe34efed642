//! # Core Framing Components
//!
//! Low-level packet handling: headers, optional-header decoding, fragment
//! reassembly, and the obfuscated checksum.
//!
//! This module is the only place where untrusted bytes become structured
//! state. Every length is validated before it is trusted, and every decode
//! failure is an immediate error rather than a silent truncation.
//!
//! ## Wire Format
//! ```text
//! [PacketHeader(20)] [Optional blocks(flag-driven)] [Payload | Fragments]
//!
//! PacketHeader:   sequence:u32 flags:u32 checksum:u32 id:u16 time:u16 size:u16 table:u16
//! FragmentHeader: sequence:u32 id:u32 count:u16 size:u16 index:u16 group:u16
//! ```
//! All multi-byte integers are little-endian. `PacketHeader.size` counts
//! the bytes after the header; `FragmentHeader.size` includes its own 16
//! header bytes.
//!
//! ## Bounds
//! - Maximum packet size: 484 bytes (header included)
//! - Maximum non-fragment payload: 448 bytes
//! - Maximum fragment: 464 bytes (header plus payload)

pub mod fragment;
pub mod header;
pub mod optional;
pub mod packet;
