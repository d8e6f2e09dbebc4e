//! Packet framing and decoding.
//!
//! The framer consumes the receive ring and surfaces complete, checksum-valid
//! packets addressed to the local device. It is a two-state machine driven by
//! repeated polling:
//!
//! - `SeekingHeader`: hunting for the `0xAA 0x55` sync pair and a structurally
//!   complete 7-byte header;
//! - `AwaitingPayload`: header cached, waiting for the payload plus checksum
//!   byte to finish arriving.
//!
//! The split is forced by the wire format: the checksum covers the entire
//! packet, so nothing can be validated until the last byte is in. Socket
//! delivery is asynchronous with respect to polling, so a single packet may
//! take many polls to complete; every poll either yields a ready packet or
//! reports "not ready" without blocking.
//!
//! Malformed sync sequences are recovered by discarding bytes until the next
//! `0xAA` (counted in `resync_count`, never surfaced as an error). Checksum
//! and destination mismatches silently discard the packet and resume
//! scanning.

use tracing::trace;

use super::{ByteRing, HEADER_LEN, IN_BUFFER_SIZE, SYNC1, SYNC2};
use crate::types::{DeviceId, PacketType};

/// A complete, validated packet as seen by the application layer.
///
/// Borrows the framer's reassembly buffer; the data is valid until the next
/// poll.
#[derive(Debug)]
pub struct Frame<'a> {
    packet_type: PacketType,
    source: DeviceId,
    payload: &'a [u8],
}

impl Frame<'_> {
    pub fn packet_type(&self) -> PacketType {
        self.packet_type
    }

    /// Device the packet came from.
    pub fn source(&self) -> DeviceId {
        self.source
    }

    /// Payload bytes, checksum excluded.
    pub fn payload(&self) -> &[u8] {
        self.payload
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FramerState {
    SeekingHeader,
    AwaitingPayload,
}

/// Per-connection packet decoder.
///
/// Owns all in-progress parse state; resetting it (on disconnect) discards
/// any partial header or payload so nothing leaks across a reconnect.
#[derive(Debug)]
pub struct PacketFramer {
    device_id: DeviceId,
    state: FramerState,
    // Cached header fields, valid while awaiting the payload.
    dest: DeviceId,
    source: DeviceId,
    packet_type: PacketType,
    payload_len: usize,
    /// Payload length plus the trailing checksum byte.
    trailing_len: usize,
    /// Running sum of header bytes, completed over the payload on arrival.
    checksum: u32,
    resync_count: u64,
    payload: Box<[u8; IN_BUFFER_SIZE]>,
}

impl PacketFramer {
    /// Create a framer that accepts packets addressed to `device_id`.
    pub fn new(device_id: DeviceId) -> Self {
        Self {
            device_id,
            state: FramerState::SeekingHeader,
            dest: DeviceId::new(0),
            source: DeviceId::new(0),
            packet_type: PacketType::Unknown(0),
            payload_len: 0,
            trailing_len: 0,
            checksum: 0,
            resync_count: 0,
            payload: Box::new([0u8; IN_BUFFER_SIZE]),
        }
    }

    /// Number of resynchronization passes performed since the last reset.
    pub fn resync_count(&self) -> u64 {
        self.resync_count
    }

    /// Discard any partial header or payload and restart the header search.
    ///
    /// Must be called on every disconnect before the framer is reused for a
    /// new connection.
    pub fn reset(&mut self) {
        self.state = FramerState::SeekingHeader;
        self.dest = DeviceId::new(0);
        self.source = DeviceId::new(0);
        self.packet_type = PacketType::Unknown(0);
        self.payload_len = 0;
        self.trailing_len = 0;
        self.checksum = 0;
        self.resync_count = 0;
    }

    /// Check whether a full packet is ready.
    ///
    /// Returns `Some(frame)` when a complete packet with a valid checksum,
    /// addressed to this device, has been assembled. Returns `None` in every
    /// other case: not enough bytes yet, garbage discarded during
    /// resynchronization, checksum failure, or a packet for some other
    /// destination. None of those distinctions matter to the caller, which
    /// simply polls again on the next tick.
    ///
    /// Call this often to keep the receive ring from overflowing.
    pub fn poll<'a>(&'a mut self, rx: &mut ByteRing) -> Option<Frame<'a>> {
        if self.state == FramerState::SeekingHeader && !self.seek_header(rx) {
            return None;
        }

        // Awaiting payload: the header is parsed and summed; everything up to
        // and including the checksum byte must be present before any of it
        // can be judged.
        if rx.available() < self.trailing_len {
            return None;
        }

        // This header is now handled either way; the next poll searches anew.
        self.state = FramerState::SeekingHeader;

        rx.read_block(&mut self.payload[..self.trailing_len])
            .expect("availability checked above");

        if self.dest != self.device_id {
            trace!(dest = %self.dest, "discarding packet for other device");
            return None;
        }

        let total = self.payload[..self.trailing_len]
            .iter()
            .fold(self.checksum, |acc, &b| acc + u32::from(b));

        if total & 0xFF != 0 {
            trace!(packet_type = %self.packet_type, "discarding packet with bad checksum");
            return None;
        }

        Some(Frame {
            packet_type: self.packet_type,
            source: self.source,
            payload: &self.payload[..self.payload_len],
        })
    }

    /// Try to parse a header from the ring head.
    ///
    /// Returns `true` when a structurally complete header has been consumed
    /// and cached, leaving the framer in `AwaitingPayload`. Returns `false`
    /// when the ring cannot currently yield one; garbage encountered on the
    /// way is discarded via [`resync`](Self::resync).
    fn seek_header(&mut self, rx: &mut ByteRing) -> bool {
        loop {
            if rx.available() < HEADER_LEN {
                return false;
            }

            if rx.peek() != Ok(SYNC1) {
                self.resync(rx);
                continue;
            }

            // Sync byte 1 confirmed at the head; consume it and require the
            // second sync byte immediately after. On mismatch the 0xAA is
            // lost and the search restarts at the very next byte, which may
            // itself start a header.
            let _ = rx.retrieve();
            if rx.peek() != Ok(SYNC2) {
                self.resync(rx);
                continue;
            }
            let _ = rx.retrieve();

            let mut rest = [0u8; HEADER_LEN - 2];
            rx.read_block(&mut rest)
                .expect("availability checked above");

            self.checksum = rest
                .iter()
                .fold(u32::from(SYNC1) + u32::from(SYNC2), |acc, &b| {
                    acc + u32::from(b)
                });

            self.dest = DeviceId::new(rest[0]);
            self.source = DeviceId::new(rest[1]);
            self.packet_type = PacketType::from_code(rest[2]);
            self.payload_len = usize::from(u16::from_be_bytes([rest[3], rest[4]]));
            self.trailing_len = self.payload_len + 1;

            if self.trailing_len > IN_BUFFER_SIZE {
                // A length field this large cannot belong to a real packet on
                // this link; treat the header as line noise and keep
                // scanning.
                trace!(len = self.payload_len, "implausible payload length, resyncing");
                self.resync(rx);
                continue;
            }

            self.state = FramerState::AwaitingPayload;
            return true;
        }
    }

    /// Discard bytes until `0xAA` sits at the ring head or the ring empties.
    ///
    /// The `0xAA`, when found, is left in place for the next header attempt.
    /// Counted once per invocation, not once per discarded byte.
    fn resync(&mut self, rx: &mut ByteRing) {
        self.resync_count += 1;
        while let Ok(byte) = rx.peek() {
            if byte == SYNC1 {
                return;
            }
            let _ = rx.retrieve();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::packet_checksum;

    const LOCAL: DeviceId = DeviceId::new(2);
    const REMOTE: DeviceId = DeviceId::new(1);

    fn encode(dest: DeviceId, src: DeviceId, type_code: u8, payload: &[u8]) -> Vec<u8> {
        let len = payload.len() as u16;
        let mut bytes = vec![
            SYNC1,
            SYNC2,
            dest.as_u8(),
            src.as_u8(),
            type_code,
            (len >> 8) as u8,
            (len & 0xFF) as u8,
        ];
        bytes.extend_from_slice(payload);
        let ck = packet_checksum(&bytes);
        bytes.push(ck);
        bytes
    }

    fn feed(ring: &mut ByteRing, bytes: &[u8]) {
        for &b in bytes {
            assert!(ring.append(b), "test ring overflow");
        }
    }

    #[test]
    fn decodes_complete_packet() {
        let mut ring = ByteRing::new(256);
        let mut framer = PacketFramer::new(LOCAL);

        feed(&mut ring, &encode(LOCAL, REMOTE, 5, b"hello"));

        let frame = framer.poll(&mut ring).expect("packet ready");
        assert_eq!(frame.packet_type(), PacketType::LogMessage);
        assert_eq!(frame.source(), REMOTE);
        assert_eq!(frame.payload(), b"hello");
        assert_eq!(framer.resync_count(), 0);
        assert!(ring.is_empty());
    }

    #[test]
    fn empty_payload_packet() {
        let mut ring = ByteRing::new(64);
        let mut framer = PacketFramer::new(LOCAL);

        feed(&mut ring, &encode(LOCAL, REMOTE, 3, b""));

        let frame = framer.poll(&mut ring).expect("packet ready");
        assert_eq!(frame.packet_type(), PacketType::HandGestureData);
        assert!(frame.payload().is_empty());
    }

    #[test]
    fn not_ready_until_final_byte() {
        let mut ring = ByteRing::new(256);
        let mut framer = PacketFramer::new(LOCAL);
        let bytes = encode(LOCAL, REMOTE, 2, b"abc");

        for &b in &bytes[..bytes.len() - 1] {
            ring.append(b);
            assert!(framer.poll(&mut ring).is_none(), "must not be ready early");
        }
        ring.append(bytes[bytes.len() - 1]);
        let frame = framer.poll(&mut ring).expect("ready on final byte");
        assert_eq!(frame.payload(), b"abc");
    }

    #[test]
    fn resyncs_over_garbage_prefix() {
        let mut ring = ByteRing::new(256);
        let mut framer = PacketFramer::new(LOCAL);

        feed(&mut ring, &[0x00, 0x13, 0x37, 0xFE]);
        feed(&mut ring, &encode(LOCAL, REMOTE, 5, b"ok"));

        let frame = framer.poll(&mut ring).expect("packet after garbage");
        assert_eq!(frame.payload(), b"ok");
        assert_eq!(framer.resync_count(), 1);
    }

    #[test]
    fn resyncs_on_broken_sync_pair() {
        let mut ring = ByteRing::new(256);
        let mut framer = PacketFramer::new(LOCAL);

        // 0xAA not followed by 0x55: the lone sync byte is dropped and the
        // search continues with the bytes after it.
        feed(&mut ring, &[SYNC1, 0x77]);
        feed(&mut ring, &encode(LOCAL, REMOTE, 5, b"x"));

        let frame = framer.poll(&mut ring).expect("packet after bad pair");
        assert_eq!(frame.payload(), b"x");
        assert!(framer.resync_count() >= 1);
    }

    #[test]
    fn back_to_back_sync_bytes_do_not_lose_the_real_header() {
        let mut ring = ByteRing::new(256);
        let mut framer = PacketFramer::new(LOCAL);

        // A stray 0xAA immediately before a genuine packet: the genuine
        // header must survive the resync.
        ring.append(SYNC1);
        feed(&mut ring, &encode(LOCAL, REMOTE, 5, b"keep"));

        let mut frame = None;
        for _ in 0..4 {
            if let Some(f) = framer.poll(&mut ring) {
                frame = Some((f.packet_type(), f.payload().to_vec()));
                break;
            }
        }
        let (packet_type, payload) = frame.expect("real header recovered");
        assert_eq!(packet_type, PacketType::LogMessage);
        assert_eq!(payload, b"keep");
    }

    #[test]
    fn rejects_corrupted_payload() {
        let mut framer = PacketFramer::new(LOCAL);
        let reference = encode(LOCAL, REMOTE, 5, b"payload");

        // Flip every single bit of every payload byte in turn: all variants
        // must be silently discarded.
        for byte_idx in HEADER_LEN..reference.len() - 1 {
            for bit in 0..8 {
                let mut corrupted = reference.clone();
                corrupted[byte_idx] ^= 1 << bit;
                let mut ring = ByteRing::new(256);
                feed(&mut ring, &corrupted);
                assert!(
                    framer.poll(&mut ring).is_none(),
                    "bit {bit} of byte {byte_idx} must fail the checksum"
                );
                framer.reset();
            }
        }
    }

    #[test]
    fn filters_foreign_destination() {
        let mut ring = ByteRing::new(256);
        let mut framer = PacketFramer::new(LOCAL);

        feed(&mut ring, &encode(DeviceId::new(9), REMOTE, 5, b"not mine"));
        assert!(framer.poll(&mut ring).is_none());
        assert!(ring.is_empty(), "foreign packet is consumed, not surfaced");

        // The framer remains usable for the next packet.
        feed(&mut ring, &encode(LOCAL, REMOTE, 5, b"mine"));
        let frame = framer.poll(&mut ring).expect("own packet decoded");
        assert_eq!(frame.payload(), b"mine");
    }

    #[test]
    fn implausible_length_is_treated_as_noise() {
        let mut ring = ByteRing::new(256);
        let mut framer = PacketFramer::new(LOCAL);

        // Sync pair plus a length field claiming 0xFFFF payload bytes.
        feed(&mut ring, &[SYNC1, SYNC2, 2, 1, 5, 0xFF, 0xFF]);
        assert!(framer.poll(&mut ring).is_none());
        assert!(framer.resync_count() >= 1);

        feed(&mut ring, &encode(LOCAL, REMOTE, 5, b"after"));
        let mut decoded = None;
        for _ in 0..4 {
            if let Some(f) = framer.poll(&mut ring) {
                decoded = Some(f.payload().to_vec());
                break;
            }
        }
        assert_eq!(decoded.as_deref(), Some(&b"after"[..]));
    }

    #[test]
    fn reset_discards_partial_packet() {
        let mut ring = ByteRing::new(256);
        let mut framer = PacketFramer::new(LOCAL);
        let bytes = encode(LOCAL, REMOTE, 5, b"partial");

        // Deliver the header and part of the payload, then simulate a
        // disconnect.
        feed(&mut ring, &bytes[..HEADER_LEN + 3]);
        assert!(framer.poll(&mut ring).is_none());
        framer.reset();
        ring.reset();

        // A fresh, complete packet decodes cleanly afterwards.
        feed(&mut ring, &encode(LOCAL, REMOTE, 5, b"fresh"));
        let frame = framer.poll(&mut ring).expect("clean state after reset");
        assert_eq!(frame.payload(), b"fresh");
        assert_eq!(framer.resync_count(), 0);
    }

    #[test]
    fn two_packets_queued_decode_in_order() {
        let mut ring = ByteRing::new(256);
        let mut framer = PacketFramer::new(LOCAL);

        feed(&mut ring, &encode(LOCAL, REMOTE, 5, b"first"));
        feed(&mut ring, &encode(LOCAL, REMOTE, 2, b"second"));

        let first = framer.poll(&mut ring).expect("first packet");
        assert_eq!(first.payload(), b"first");
        let second = framer.poll(&mut ring).expect("second packet");
        assert_eq!(second.packet_type(), PacketType::GetDeviceInfo);
        assert_eq!(second.payload(), b"second");
        assert!(framer.poll(&mut ring).is_none());
    }
}
