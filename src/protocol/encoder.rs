//! Packet construction and transmission.
//!
//! The encoder owns a fixed-size send buffer. Outbound packets are assembled
//! in place — header first, then payload, then the checksum byte — and
//! flushed through the transport in one pass. Payloads that would not fit are
//! truncated; truncation is a defined behavior of this link, not an error.

use byteorder::{BigEndian, ByteOrder};
use tracing::debug;

use super::{HEADER_LEN, LEN_FIELD_OFFSET, OUT_BUFFER_SIZE, SYNC1, SYNC2};
use crate::error::{Result, TransportError};
use crate::transport::Transport;
use crate::types::{DeviceId, PacketType};

/// Builds outgoing packets and writes them to a transport sink.
#[derive(Debug)]
pub struct PacketEncoder {
    device_id: DeviceId,
    buf: Box<[u8; OUT_BUFFER_SIZE]>,
}

impl PacketEncoder {
    /// Create an encoder stamping `device_id` as the source of every packet.
    pub fn new(device_id: DeviceId) -> Self {
        Self {
            device_id,
            buf: Box::new([0u8; OUT_BUFFER_SIZE]),
        }
    }

    /// Write the 7-byte header at the start of the send buffer.
    ///
    /// Returns the offset of the first payload byte. `payload_len` may be a
    /// placeholder when the true length is only known after the payload is
    /// filled in; patch it with [`set_payload_len`](Self::set_payload_len)
    /// before finalizing.
    pub fn build_header(
        &mut self,
        dest: DeviceId,
        packet_type: PacketType,
        payload_len: u16,
    ) -> usize {
        self.buf[0] = SYNC1;
        self.buf[1] = SYNC2;
        self.buf[2] = dest.as_u8();
        self.buf[3] = self.device_id.as_u8();
        self.buf[4] = packet_type.code();
        BigEndian::write_u16(&mut self.buf[LEN_FIELD_OFFSET..LEN_FIELD_OFFSET + 2], payload_len);
        HEADER_LEN
    }

    /// Overwrite the payload-length field in the already-built header.
    pub fn set_payload_len(&mut self, payload_len: u16) {
        BigEndian::write_u16(&mut self.buf[LEN_FIELD_OFFSET..LEN_FIELD_OFFSET + 2], payload_len);
    }

    /// Sum every byte from the start of the buffer up to `payload_end`, store
    /// the checksum byte there, and return the total packet length.
    pub fn finalize(&mut self, payload_end: usize) -> usize {
        let sum = self.buf[..payload_end]
            .iter()
            .fold(0u8, |acc, &b| acc.wrapping_add(b));
        self.buf[payload_end] = sum.wrapping_neg();
        payload_end + 1
    }

    /// Write exactly `total_len` bytes of the send buffer to the transport.
    ///
    /// Loops over partial writes; a write that moves zero bytes of a
    /// non-empty remainder means the remote side is gone and raises
    /// [`TransportError::ConnectionClosed`].
    pub fn flush(&mut self, sink: &mut dyn Transport, total_len: usize) -> Result<()> {
        let mut sent = 0;
        while sent < total_len {
            let n = sink.write(&self.buf[sent..total_len])?;
            if n == 0 {
                return Err(TransportError::ConnectionClosed.into());
            }
            sent += n;
        }
        Ok(())
    }

    /// Encode and send a text message: UTF-8 bytes plus a single NUL
    /// terminator.
    ///
    /// Text that would overflow the send buffer is truncated; the terminator
    /// is always present. The length field reflects the bytes actually
    /// written.
    pub fn send_text(
        &mut self,
        sink: &mut dyn Transport,
        dest: DeviceId,
        packet_type: PacketType,
        text: &str,
    ) -> Result<()> {
        let bytes = text.as_bytes();
        // Room must remain for the terminator and the checksum byte.
        let max_text = OUT_BUFFER_SIZE - HEADER_LEN - 2;
        let take = bytes.len().min(max_text);
        if take < bytes.len() {
            debug!(len = bytes.len(), sent = take, "truncating outbound text");
        }

        let mut x = self.build_header(dest, packet_type, 0);
        self.buf[x..x + take].copy_from_slice(&bytes[..take]);
        x += take;
        self.buf[x] = 0;
        x += 1;

        self.set_payload_len((x - HEADER_LEN) as u16);
        let total = self.finalize(x);
        self.flush(sink, total)
    }

    /// Encode and send a series of signed 16-bit values, each as two
    /// big-endian bytes.
    ///
    /// The series is silently truncated at the last value that fits ahead of
    /// the checksum byte. The length field reflects the bytes actually
    /// written.
    pub fn send_short_ints(
        &mut self,
        sink: &mut dyn Transport,
        dest: DeviceId,
        packet_type: PacketType,
        values: &[i16],
    ) -> Result<()> {
        let mut x = self.build_header(dest, packet_type, 0);
        let mut written = 0;
        for &value in values {
            if x + 2 > OUT_BUFFER_SIZE - 1 {
                debug!(
                    total = values.len(),
                    sent = written,
                    "truncating outbound short-int series"
                );
                break;
            }
            BigEndian::write_i16(&mut self.buf[x..x + 2], value);
            x += 2;
            written += 1;
        }

        self.set_payload_len((x - HEADER_LEN) as u16);
        let total = self.finalize(x);
        self.flush(sink, total)
    }
}
