//! Error types for Handlink.
//!
//! Recoverable protocol noise (bad sync bytes, checksum mismatches,
//! destination mismatches, duplex field mismatches) is deliberately *not*
//! represented here: the framer reports those as "packet not ready" and stays
//! usable. Only transport failures, configuration problems, and genuine I/O
//! errors surface as [`Error`] values.

use std::io;
use std::net::SocketAddr;

use thiserror::Error;

/// Result type alias for Handlink operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for Handlink.
#[derive(Error, Debug)]
pub enum Error {
    // Transport errors
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    // Protocol errors
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    // Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    // General errors
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

/// Transport layer errors.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("bind failed on {addr}: {reason}")]
    BindFailed { addr: SocketAddr, reason: String },

    /// Remote side closed the connection (zero-byte read, or a write that
    /// could move nothing on a non-empty buffer).
    #[error("connection closed by remote")]
    ConnectionClosed,

    #[error("send failed: {0}")]
    SendFailed(String),

    #[error("receive failed: {0}")]
    ReceiveFailed(String),

    #[error("socket error: {0}")]
    SocketError(String),
}

/// Protocol buffer errors.
///
/// These come out of [`crate::protocol::ByteRing`] accessors; the framer
/// checks `available()` before consuming, so in normal operation they never
/// propagate past it.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("buffer empty")]
    EmptyBuffer,

    #[error("insufficient data: need {needed} bytes, {available} available")]
    InsufficientData { needed: usize, available: usize },

    #[error("payload too large: {size} bytes (max {max})")]
    PayloadTooLarge { size: usize, max: usize },
}

impl Error {
    /// Check whether this error means the remote peer is gone and the link
    /// should reset and wait for a fresh connection.
    pub fn is_disconnect(&self) -> bool {
        matches!(self, Error::Transport(TransportError::ConnectionClosed))
    }
}
