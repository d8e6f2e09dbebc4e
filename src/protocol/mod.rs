//! Wire protocol for Handlink.
//!
//! Defines the packet framing, checksum rules, and payload field encodings
//! shared by both directions of the link.
//!
//! ## Packet Format
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │ 0xAA │ 0x55 │ Dest (1) │ Src (1) │ Type (1) │ Len MSB │ Len LSB      │
//! ├──────────────────────────────────────────────────────────────────────┤
//! │ Payload (Len bytes) ...                                │ Checksum (1)│
//! └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All multi-byte integers are big-endian. The two sync bytes mark the start
//! of every header; a receiver that loses framing discards bytes until the
//! next `0xAA` and tries again. The checksum byte is chosen so that the sum
//! of every byte in the packet (header, payload, and checksum) is zero
//! modulo 256.
//!
//! Payload encodings carried on top of the framing:
//! - text messages: UTF-8 bytes plus a single NUL terminator;
//! - short-int series: flat 16-bit big-endian signed values, field count
//!   derived from the payload length;
//! - duplex-protected fields: each logical value followed immediately by an
//!   identical copy, for corruption detection beyond the packet checksum.

mod duplex;
mod encoder;
mod framer;
mod ring;

pub use duplex::{read_duplex_int, read_signed_byte, sign_extend};
pub use encoder::PacketEncoder;
pub use framer::{Frame, PacketFramer};
pub use ring::ByteRing;

/// First sync byte of every packet header.
pub const SYNC1: u8 = 0xAA;

/// Second sync byte of every packet header.
pub const SYNC2: u8 = 0x55;

/// Header size in bytes: sync pair, destination, source, type, 16-bit length.
pub const HEADER_LEN: usize = 7;

/// Byte offset of the big-endian payload-length field within the header.
pub const LEN_FIELD_OFFSET: usize = 5;

/// Capacity of the framer's reassembly buffer. Bounds the payload plus its
/// checksum byte; longer length fields are treated as line noise.
pub const IN_BUFFER_SIZE: usize = 1024;

/// Capacity of the encoder's send buffer. Outbound payloads that would not
/// fit are truncated, never split across packets.
pub const OUT_BUFFER_SIZE: usize = 1024;

/// Capacity of the receive byte ring between the socket and the framer.
pub const RECEIVE_RING_CAPACITY: usize = 1024;

/// Compute the checksum byte for a serialized packet body.
///
/// Returns the value which, appended to `bytes`, makes the whole packet sum
/// to zero modulo 256.
pub fn packet_checksum(bytes: &[u8]) -> u8 {
    let sum = bytes.iter().fold(0u8, |acc, &b| acc.wrapping_add(b));
    sum.wrapping_neg()
}
