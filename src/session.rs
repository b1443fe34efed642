//! # Session Collaborator Interfaces
//!
//! Traits for the two integrity primitives the codec consumes but does not
//! implement: the rolling checksum over a byte span, and the per-session
//! keyed pseudo-random value used to obfuscate checksums on encrypted
//! packets.
//!
//! The codec only ever *reads* a keystream value for a given
//! (direction, sequence) pair. Advancing the session's PRNG state in
//! direction+sequence order is the connection layer's responsibility.

use crate::core::header::PacketDirection;

/// The rolling, non-cryptographic, order-sensitive hash used for both header
/// and payload integrity values.
pub trait WireHash {
    /// Hashes an arbitrary byte span to a 32-bit integrity value.
    fn hash32(&self, data: &[u8]) -> u32;
}

/// Any `Fn(&[u8]) -> u32` works as a wire hash, which keeps tests and
/// callers free to pass plain functions or closures.
impl<F> WireHash for F
where
    F: Fn(&[u8]) -> u32,
{
    fn hash32(&self, data: &[u8]) -> u32 {
        self(data)
    }
}

/// Read-only view of a session's keyed pseudo-random generator, indexed by
/// direction and sequence number.
pub trait KeystreamSource {
    /// Returns the keystream value for the given direction and sequence.
    ///
    /// Must be a pure lookup: calling this repeatedly with the same
    /// arguments yields the same value and never mutates session state.
    fn keystream_value(&self, direction: PacketDirection, sequence: u32) -> u32;
}

/// Keystream that always yields zero.
///
/// Suitable wherever `EncryptedChecksum` is never set, and as a stand-in
/// before a session is established.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZeroKeystream;

impl KeystreamSource for ZeroKeystream {
    fn keystream_value(&self, _direction: PacketDirection, _sequence: u32) -> u32 {
        0
    }
}
