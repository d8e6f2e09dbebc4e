//! End-to-end protocol properties: everything the encoder produces must come
//! back out of the framer intact, and everything malformed must disappear
//! without ever surfacing as an error.

use handlink::error::Result;
use handlink::protocol::{
    packet_checksum, read_duplex_int, ByteRing, PacketEncoder, PacketFramer, HEADER_LEN,
};
use handlink::transport::Transport;
use handlink::types::{DeviceId, PacketStatus, PacketType};

const NODE: DeviceId = DeviceId::new(2);
const CONTROLLER: DeviceId = DeviceId::new(1);

/// In-memory transport that captures everything the encoder flushes.
struct CaptureSink {
    written: Vec<u8>,
}

impl CaptureSink {
    fn new() -> Self {
        Self {
            written: Vec::new(),
        }
    }
}

impl Transport for CaptureSink {
    fn read_byte(&mut self) -> Result<Option<u8>> {
        Ok(None)
    }

    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        self.written.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn is_connected(&self) -> bool {
        true
    }
}

fn feed(ring: &mut ByteRing, bytes: &[u8]) {
    for &b in bytes {
        assert!(ring.append(b), "test ring overflow");
    }
}

#[test]
fn text_round_trip() {
    let mut encoder = PacketEncoder::new(CONTROLLER);
    let mut sink = CaptureSink::new();
    encoder
        .send_text(&mut sink, NODE, PacketType::LogMessage, "status nominal")
        .unwrap();

    let mut ring = ByteRing::new(1024);
    let mut framer = PacketFramer::new(NODE);
    feed(&mut ring, &sink.written);

    let frame = framer.poll(&mut ring).expect("packet decodes");
    assert_eq!(frame.packet_type(), PacketType::LogMessage);
    assert_eq!(frame.source(), CONTROLLER);
    assert_eq!(frame.payload(), b"status nominal\0");
}

#[test]
fn short_int_round_trip() {
    let values: Vec<i16> = vec![0, 1, -1, 90, -135, 32766, 32767, -32768];
    let mut encoder = PacketEncoder::new(NODE);
    let mut sink = CaptureSink::new();
    encoder
        .send_short_ints(&mut sink, CONTROLLER, PacketType::HandGestureData, &values)
        .unwrap();

    let mut ring = ByteRing::new(1024);
    let mut framer = PacketFramer::new(CONTROLLER);
    feed(&mut ring, &sink.written);

    let frame = framer.poll(&mut ring).expect("packet decodes");
    assert_eq!(frame.packet_type(), PacketType::HandGestureData);

    let decoded: Vec<i16> = frame
        .payload()
        .chunks_exact(2)
        .map(|pair| i16::from_be_bytes([pair[0], pair[1]]))
        .collect();
    assert_eq!(decoded, values);
}

#[test]
fn every_encoded_packet_sums_to_zero() {
    let payload_sizes = [0usize, 1, 2, 7, 63, 255, 500];
    for &size in &payload_sizes {
        let values: Vec<i16> = (0..size).map(|i| (i as i16).wrapping_mul(257)).collect();
        let mut encoder = PacketEncoder::new(NODE);
        let mut sink = CaptureSink::new();
        encoder
            .send_short_ints(&mut sink, CONTROLLER, PacketType::HandGestureData, &values)
            .unwrap();

        let total = sink.written.iter().fold(0u8, |acc, &b| acc.wrapping_add(b));
        assert_eq!(total, 0, "packet with {size} values must sum to zero");
    }
}

#[test]
fn resync_discards_exactly_the_garbage_prefix() {
    let mut encoder = PacketEncoder::new(CONTROLLER);
    let mut sink = CaptureSink::new();
    encoder
        .send_text(&mut sink, NODE, PacketType::LogMessage, "after the noise")
        .unwrap();

    for garbage_len in 1..24usize {
        let garbage: Vec<u8> = (0..garbage_len)
            .map(|i| {
                // Anything but a sync byte.
                let b = (37 * i + 3) as u8;
                if b == 0xAA {
                    0xAB
                } else {
                    b
                }
            })
            .collect();

        let mut ring = ByteRing::new(1024);
        let mut framer = PacketFramer::new(NODE);
        feed(&mut ring, &garbage);
        feed(&mut ring, &sink.written);

        let frame = framer.poll(&mut ring).expect("packet after garbage");
        assert_eq!(frame.payload(), b"after the noise\0");
        assert!(
            framer.resync_count() >= 1,
            "garbage prefix of {garbage_len} must count a resync"
        );
        assert!(ring.is_empty());
    }
}

#[test]
fn one_byte_per_poll_is_ready_only_on_the_last() {
    let mut encoder = PacketEncoder::new(CONTROLLER);
    let mut sink = CaptureSink::new();
    encoder
        .send_text(&mut sink, NODE, PacketType::GetDeviceInfo, "drip")
        .unwrap();

    let mut ring = ByteRing::new(1024);
    let mut framer = PacketFramer::new(NODE);

    let (last, head) = sink.written.split_last().unwrap();
    for &b in head {
        ring.append(b);
        assert!(
            framer.poll(&mut ring).is_none(),
            "not ready before the final byte"
        );
    }
    ring.append(*last);
    let frame = framer.poll(&mut ring).expect("ready on the final byte");
    assert_eq!(frame.packet_type(), PacketType::GetDeviceInfo);
}

#[test]
fn any_single_bit_flip_in_the_payload_is_rejected() {
    let mut encoder = PacketEncoder::new(CONTROLLER);
    let mut sink = CaptureSink::new();
    encoder
        .send_text(&mut sink, NODE, PacketType::LogMessage, "fragile")
        .unwrap();
    let reference = sink.written;

    let mut framer = PacketFramer::new(NODE);
    for byte_idx in HEADER_LEN..reference.len() - 1 {
        for bit in 0..8 {
            let mut corrupted = reference.clone();
            corrupted[byte_idx] ^= 1 << bit;

            let mut ring = ByteRing::new(1024);
            feed(&mut ring, &corrupted);
            assert!(
                framer.poll(&mut ring).is_none(),
                "corrupted byte {byte_idx} bit {bit} must be discarded"
            );
            framer.reset();
        }
    }
}

#[test]
fn packets_for_other_devices_never_surface() {
    let mut encoder = PacketEncoder::new(CONTROLLER);
    let mut sink = CaptureSink::new();
    // Valid checksum, wrong destination.
    encoder
        .send_text(&mut sink, DeviceId::new(77), PacketType::LogMessage, "not yours")
        .unwrap();

    let mut ring = ByteRing::new(1024);
    let mut framer = PacketFramer::new(NODE);
    feed(&mut ring, &sink.written);

    assert!(framer.poll(&mut ring).is_none());
    assert!(ring.is_empty(), "foreign packet consumed silently");

    // The very next packet for this node decodes fine.
    let mut sink = CaptureSink::new();
    encoder
        .send_text(&mut sink, NODE, PacketType::LogMessage, "yours")
        .unwrap();
    feed(&mut ring, &sink.written);
    let frame = framer.poll(&mut ring).expect("own packet decodes");
    assert_eq!(frame.payload(), b"yours\0");
}

#[test]
fn duplex_mismatch_reports_and_advances() {
    // A payload with one good duplex field and one corrupted copy.
    let payload = [
        0x00, 0x2A, 0x00, 0x2A, // 42, copy matches
        0x00, 0x2A, 0x00, 0x2B, // 42, copy disagrees
    ];

    let (status, next, value) = read_duplex_int(&payload, 0);
    assert_eq!(status, PacketStatus::Valid);
    assert_eq!((next, value), (4, 42));

    let (status, next, _) = read_duplex_int(&payload, next);
    assert_eq!(status, PacketStatus::DuplexMismatch);
    assert_eq!(next, 8, "mismatch still advances past value and copy");
}

#[test]
fn concrete_hello_scenario() {
    // Text "Hello" to destination 1, packet type 5, from device 0.
    let mut encoder = PacketEncoder::new(DeviceId::new(0));
    let mut sink = CaptureSink::new();
    encoder
        .send_text(
            &mut sink,
            DeviceId::new(1),
            PacketType::from_code(5),
            "Hello",
        )
        .unwrap();

    let body = [
        0xAA, 0x55, 0x01, 0x00, 0x05, 0x00, 0x06, 0x48, 0x65, 0x6C, 0x6C, 0x6F, 0x00,
    ];
    let checksum = packet_checksum(&body);

    let mut expected = body.to_vec();
    expected.push(checksum);
    assert_eq!(sink.written, expected);
}
