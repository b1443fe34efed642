#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
//! Edge-case tests for the framing core.
//! Boundary conditions, malformed buffers, and wire-format bounds.

use datagram_protocol::{
    ClientPacket, FragmentHeader, PacketHeader, PacketHeaderFlags, ProtocolError, ServerFragment,
    ServerPacket, ZeroKeystream, MAX_DATA_SIZE, MAX_PACKET_SIZE,
};

fn hash32(data: &[u8]) -> u32 {
    data.iter().fold(0x811C_9DC5u32, |acc, &b| {
        (acc ^ b as u32).wrapping_mul(0x0100_0193)
    })
}

fn raw_packet(header: &PacketHeader, body: &[u8]) -> Vec<u8> {
    let mut raw = header.to_bytes().to_vec();
    raw.extend_from_slice(body);
    raw
}

// ============================================================================
// HEADER DECODE EDGE CASES
// ============================================================================

#[test]
fn test_empty_buffer_rejected() {
    let result = ClientPacket::parse(&[]);
    assert!(
        matches!(result, Err(ProtocolError::TruncatedInput { needed: 20, available: 0 })),
        "empty buffer should fail on the header"
    );
}

#[test]
fn test_header_one_byte_short() {
    let bytes = vec![0u8; PacketHeader::SIZE - 1];
    let result = ClientPacket::parse(&bytes);
    assert!(matches!(
        result,
        Err(ProtocolError::TruncatedInput {
            needed: 20,
            available: 19
        })
    ));
}

#[test]
fn test_header_only_zero_size_packet() {
    let header = PacketHeader::default();
    let packet = ClientPacket::parse(&header.to_bytes()).expect("zero-size packet is valid");
    assert_eq!(packet.data().len(), 0);
    assert!(packet.fragments().is_empty());
}

#[test]
fn test_declared_size_exceeds_buffer() {
    let header = PacketHeader {
        size: 50,
        ..PacketHeader::default()
    };
    let raw = raw_packet(&header, &[0u8; 40]);

    let result = ClientPacket::parse(&raw);
    assert!(matches!(
        result,
        Err(ProtocolError::TruncatedInput {
            needed: 50,
            available: 40
        })
    ));
}

#[test]
fn test_trailing_bytes_beyond_declared_size_ignored() {
    // The data region is exactly header.size bytes; anything after it
    // belongs to the next datagram and is left untouched.
    let header = PacketHeader {
        size: 4,
        ..PacketHeader::default()
    };
    let mut raw = raw_packet(&header, b"ABCD");
    raw.extend_from_slice(b"JUNK");

    let packet = ClientPacket::parse(&raw).expect("parse");
    assert_eq!(packet.data(), b"ABCD");
}

// ============================================================================
// FLAG COMBINATION EDGE CASES
// ============================================================================

#[test]
fn test_reserved_bit_with_encrypted_checksum_rejected() {
    let header = PacketHeader {
        flags: PacketHeaderFlags::from_raw(0x3),
        ..PacketHeader::default()
    };
    let result = ClientPacket::parse(&header.to_bytes());
    assert!(matches!(
        result,
        Err(ProtocolError::InvalidFlagCombination(0x3))
    ));
}

#[test]
fn test_server_packet_construction_validates_flags() {
    assert!(ServerPacket::new(1, PacketHeaderFlags::ENCRYPTED_CHECKSUM).is_ok());
    assert!(matches!(
        ServerPacket::new(1, PacketHeaderFlags::from_raw(0x3)),
        Err(ProtocolError::InvalidFlagCombination(0x3))
    ));
}

#[test]
fn test_unknown_high_flag_bits_pass_through() {
    // Bits outside the known set are preserved, not rejected; only the
    // reserved/encrypted pairing is a hard precondition.
    let flags = PacketHeaderFlags::from_raw(0x8000_0000);
    let header = PacketHeader {
        flags,
        ..PacketHeader::default()
    };
    let packet = ClientPacket::parse(&header.to_bytes()).expect("parse");
    assert_eq!(packet.header().flags.raw(), 0x8000_0000);
}

// ============================================================================
// OPTIONAL HEADER EDGE CASES
// ============================================================================

#[test]
fn test_optional_block_overruns_data_region() {
    // AckSequence wants 4 bytes but the data region holds 2.
    let header = PacketHeader {
        flags: PacketHeaderFlags::ACK_SEQUENCE,
        size: 2,
        ..PacketHeader::default()
    };
    let raw = raw_packet(&header, &[0u8; 2]);

    let result = ClientPacket::parse(&raw);
    assert!(matches!(
        result,
        Err(ProtocolError::TruncatedInput {
            needed: 4,
            available: 2
        })
    ));
}

#[test]
fn test_retransmit_length_prefix_overruns_region() {
    // Declared retransmit body of 1000 bytes inside a 10-byte region.
    let mut body = 1000u32.to_le_bytes().to_vec();
    body.extend_from_slice(&[0u8; 6]);
    let header = PacketHeader {
        flags: PacketHeaderFlags::REQUEST_RETRANSMIT,
        size: body.len() as u16,
        ..PacketHeader::default()
    };
    let raw = raw_packet(&header, &body);

    let result = ClientPacket::parse(&raw);
    assert!(matches!(
        result,
        Err(ProtocolError::TruncatedInput {
            needed: 1000,
            available: 6
        })
    ));
}

#[test]
fn test_all_fixed_optional_blocks_together() {
    let flags = PacketHeaderFlags::SERVER_SWITCH
        | PacketHeaderFlags::ACK_SEQUENCE
        | PacketHeaderFlags::CICMD_COMMAND
        | PacketHeaderFlags::TIME_SYNC
        | PacketHeaderFlags::ECHO_REQUEST
        | PacketHeaderFlags::ECHO_RESPONSE
        | PacketHeaderFlags::FLOW;
    // 8 + 4 + 8 + 8 + 4 + 8 + 6
    let total = 46usize;

    let header = PacketHeader {
        flags,
        size: total as u16,
        ..PacketHeader::default()
    };
    let raw = raw_packet(&header, &vec![0u8; total]);

    let packet = ClientPacket::parse(&raw).expect("parse");
    assert_eq!(packet.optional_header_len(), total);
    assert_eq!(packet.payload().len(), 0);
}

// ============================================================================
// FRAGMENT EDGE CASES
// ============================================================================

#[test]
fn test_fragment_region_smaller_than_header() {
    // 10 bytes cannot hold a 16-byte fragment header.
    let header = PacketHeader {
        flags: PacketHeaderFlags::BLOB_FRAGMENTS,
        size: 10,
        ..PacketHeader::default()
    };
    let raw = raw_packet(&header, &[0u8; 10]);

    let result = ClientPacket::parse(&raw);
    assert!(matches!(
        result,
        Err(ProtocolError::TruncatedInput {
            needed: 16,
            available: 10
        })
    ));
}

#[test]
fn test_fragment_declared_size_below_header_size() {
    let mut body = Vec::new();
    FragmentHeader {
        size: 8,
        ..FragmentHeader::default()
    }
    .encode(&mut body);

    let header = PacketHeader {
        flags: PacketHeaderFlags::BLOB_FRAGMENTS,
        size: body.len() as u16,
        ..PacketHeader::default()
    };
    let raw = raw_packet(&header, &body);

    let result = ClientPacket::parse(&raw);
    assert!(matches!(result, Err(ProtocolError::TruncatedInput { .. })));
}

#[test]
fn test_blob_flag_with_empty_region_yields_no_fragments() {
    let header = PacketHeader {
        flags: PacketHeaderFlags::BLOB_FRAGMENTS,
        size: 0,
        ..PacketHeader::default()
    };
    let packet = ClientPacket::parse(&header.to_bytes()).expect("parse");
    assert!(packet.fragments().is_empty());
}

#[test]
fn test_max_size_single_fragment_packet() {
    // A full 464-byte fragment brings the packet to exactly 484 bytes.
    let mut fragment = ServerFragment::new(1, None);
    fragment
        .write(&vec![0xEE; ServerFragment::MAX_PAYLOAD])
        .expect("fill");

    let mut packet = ServerPacket::new(5, PacketHeaderFlags::BLOB_FRAGMENTS).expect("new");
    packet.add_fragment(fragment);

    let wire = packet.encode(&hash32, &ZeroKeystream).expect("encode");
    assert_eq!(wire.len(), MAX_PACKET_SIZE);

    let parsed = ClientPacket::parse(&wire).expect("parse");
    assert_eq!(parsed.fragments().len(), 1);
    assert_eq!(
        parsed.fragments()[0].payload().len(),
        ServerFragment::MAX_PAYLOAD
    );
}

// ============================================================================
// OUTBOUND BOUNDS
// ============================================================================

#[test]
fn test_payload_at_exact_capacity_accepted() {
    let mut packet = ServerPacket::new(1, PacketHeaderFlags::NONE).expect("new");
    assert!(packet.write_payload(&vec![0u8; MAX_DATA_SIZE]).is_ok());

    let wire = packet.encode(&hash32, &ZeroKeystream).expect("encode");
    assert_eq!(wire.len(), PacketHeader::SIZE + MAX_DATA_SIZE);
}

#[test]
fn test_payload_one_byte_over_capacity_rejected() {
    let mut packet = ServerPacket::new(1, PacketHeaderFlags::NONE).expect("new");
    packet
        .write_payload(&vec![0u8; MAX_DATA_SIZE])
        .expect("fill");

    let result = packet.write_payload(&[0]);
    assert!(matches!(
        result,
        Err(ProtocolError::OversizedPayload {
            len,
            max: MAX_DATA_SIZE
        }) if len == MAX_DATA_SIZE + 1
    ));
}

#[test]
fn test_encode_rejects_combined_body_overflow() {
    // Payload plus fragments exceeding the packet budget is caught at
    // encode even though each piece was individually in bounds.
    let mut packet = ServerPacket::new(1, PacketHeaderFlags::BLOB_FRAGMENTS).expect("new");
    packet
        .write_payload(&vec![0u8; MAX_DATA_SIZE])
        .expect("fill");

    let mut fragment = ServerFragment::new(1, None);
    fragment.write(&[0u8; 64]).expect("write");
    packet.add_fragment(fragment);

    let result = packet.encode(&hash32, &ZeroKeystream);
    assert!(matches!(result, Err(ProtocolError::OversizedPayload { .. })));
}

#[test]
fn test_fragment_write_bound() {
    let mut fragment = ServerFragment::new(1, Some(0x1234));
    // Opcode already consumed 4 bytes of the 448-byte budget.
    assert!(fragment
        .write(&vec![0u8; ServerFragment::MAX_PAYLOAD - 4])
        .is_ok());
    assert!(matches!(
        fragment.write(&[0]),
        Err(ProtocolError::OversizedPayload { .. })
    ));
}
