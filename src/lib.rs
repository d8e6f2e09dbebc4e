//! # Handlink
//!
//! Camera-edge hand-gesture node that streams decoded hand-pose data to a
//! remote controller over a persistent socket link.
//!
//! The hand-pose inference itself runs in an external vision pipeline; this
//! crate accepts its per-frame [`gesture::HandObservation`] output, infers
//! digit states from the landmarks, and ships the result over a compact
//! checksummed binary packet protocol. The same protocol carries control
//! traffic (device info requests, log messages, shutdown commands) back from
//! the controller.
//!
//! ## Architecture
//!
//! ┌─────────────────────────────────────────────────────────────────┐
//! │              Vision Pipeline (external collaborator)            │
//! ├─────────────────────────────────────────────────────────────────┤
//! │     Gesture Layer (digit inference, wire layout)                │
//! ├─────────────────────────────────────────────────────────────────┤
//! │     Controller Link (per-tick poll loop, packet dispatch)       │
//! ├───────────────────────────┬─────────────────────────────────────┤
//! │   Packet Encoder (TX)     │   Packet Framer / Decoder (RX)      │
//! │                           │   Byte Ring Buffer                  │
//! ├───────────────────────────┴─────────────────────────────────────┤
//! │     TCP Link (non-blocking accept + readiness-checked reads)    │
//! └─────────────────────────────────────────────────────────────────┘
//!
//! The whole receive path is poll-driven: nothing in the protocol core ever
//! blocks, every operation either completes immediately or reports "not ready
//! yet" for the next tick. The owning process calls
//! [`controller::ControllerLink::tick`] once per application frame.

#![warn(clippy::all, clippy::pedantic)]
// Allow stylistic lints that don't affect correctness
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::cast_possible_truncation)] // Wire fields intentionally truncate
#![allow(clippy::cast_sign_loss)]           // Intentional for checksum arithmetic
#![allow(clippy::cast_possible_wrap)]       // Intentional for sign extension
#![allow(clippy::cast_precision_loss)]      // Acceptable for geometry
#![allow(clippy::doc_markdown)]             // ASCII diagrams in docs
#![allow(clippy::match_same_arms)]          // Explicit arm per variant is clearer

pub mod cli;
pub mod config;
pub mod controller;
pub mod error;
pub mod gesture;
pub mod protocol;
pub mod transport;
pub mod types;

pub use config::Config;
pub use error::{Error, Result};
pub use types::*;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default listen port for inbound controller connections
pub const DEFAULT_PORT: u16 = 4243;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::controller::{ControllerLink, TickOutcome};
    pub use crate::error::{Error, Result};
    pub use crate::gesture::HandObservation;
    pub use crate::protocol::{ByteRing, PacketEncoder, PacketFramer};
    pub use crate::transport::{TcpLink, Transport};
    pub use crate::types::*;
}
