//! Transport layer: the byte-source/byte-sink seam under the packet engine.
//!
//! The protocol core is poll-driven and must never block, so every transport
//! implementation is required to use readiness-checked reads: a read either
//! returns a byte that was already waiting or reports that nothing is ready.
//! Remote closure is detected at this layer (a zero-byte read) and surfaced
//! as [`TransportError::ConnectionClosed`](crate::error::TransportError) —
//! the only condition on the receive path that escapes as an error.

mod tcp;

pub use tcp::TcpLink;

use crate::error::Result;
use crate::protocol::ByteRing;

/// Byte-level duplex link to the remote peer.
///
/// Implemented by [`TcpLink`] in production and by in-memory mocks in tests.
pub trait Transport {
    /// Fetch one byte if one is already waiting.
    ///
    /// `Ok(None)` means nothing is ready right now — never blocks waiting for
    /// data. A remote closure is an error, not an empty read.
    fn read_byte(&mut self) -> Result<Option<u8>>;

    /// Write up to `buf.len()` bytes, returning how many were accepted.
    fn write(&mut self, buf: &[u8]) -> Result<usize>;

    /// Whether a remote peer is currently attached.
    fn is_connected(&self) -> bool;

    /// Drain every byte that is ready into the receive ring.
    ///
    /// Returns the number of bytes moved. Bytes arriving while the ring is
    /// full are dropped and counted by the ring itself.
    fn pump(&mut self, ring: &mut ByteRing) -> Result<usize> {
        let mut moved = 0;
        while let Some(byte) = self.read_byte()? {
            ring.append(byte);
            moved += 1;
        }
        Ok(moved)
    }
}
