#![no_main]

use datagram_protocol::{ClientPacket, ZeroKeystream};
use libfuzzer_sys::fuzz_target;

fn hash32(data: &[u8]) -> u32 {
    data.iter().fold(0x811C_9DC5u32, |acc, &b| {
        (acc ^ b as u32).wrapping_mul(0x0100_0193)
    })
}

fuzz_target!(|data: &[u8]| {
    // Fuzz packet decoding - test for panics, crashes, infinite loops
    if let Ok(packet) = ClientPacket::parse(data) {
        // Checksum computation over whatever was decoded must not panic
        // either, verified or not.
        let _ = packet.verify_checksum(&hash32, &ZeroKeystream);
        for fragment in packet.fragments() {
            let _ = fragment.reader().len();
        }
    }
});
