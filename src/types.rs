//! Core types used throughout Handlink.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Numeric identifier of a device on the packet link.
///
/// Every packet carries a destination and a source identifier; packets whose
/// destination does not match the local device are silently discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(pub u8);

impl DeviceId {
    pub const fn new(id: u8) -> Self {
        Self(id)
    }

    pub const fn as_u8(self) -> u8 {
        self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u8> for DeviceId {
    fn from(id: u8) -> Self {
        Self(id)
    }
}

/// Packet type identifier.
///
/// Closed set of known codes with an explicit fallback for anything the wire
/// delivers that this build does not recognize; unknown packets are counted
/// and ignored rather than rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PacketType {
    /// Acknowledgment of a previously received packet.
    Ack,
    /// Request for a device description; answered with a log message.
    GetDeviceInfo,
    /// Hand gesture data block (signed short-int series).
    HandGestureData,
    /// Operating-system shutdown/reboot command.
    ShutdownOs,
    /// Human-readable NUL-terminated text.
    LogMessage,
    /// Unrecognized type code.
    Unknown(u8),
}

impl PacketType {
    /// Wire code for this packet type.
    pub const fn code(self) -> u8 {
        match self {
            Self::Ack => 1,
            Self::GetDeviceInfo => 2,
            Self::HandGestureData => 3,
            Self::ShutdownOs => 4,
            Self::LogMessage => 5,
            Self::Unknown(code) => code,
        }
    }

    /// Map a wire code to a packet type. Never fails; unrecognized codes map
    /// to [`PacketType::Unknown`].
    pub const fn from_code(code: u8) -> Self {
        match code {
            1 => Self::Ack,
            2 => Self::GetDeviceInfo,
            3 => Self::HandGestureData,
            4 => Self::ShutdownOs,
            5 => Self::LogMessage,
            other => Self::Unknown(other),
        }
    }
}

impl fmt::Display for PacketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ack => write!(f, "ack"),
            Self::GetDeviceInfo => write!(f, "get-device-info"),
            Self::HandGestureData => write!(f, "hand-gesture-data"),
            Self::ShutdownOs => write!(f, "shutdown-os"),
            Self::LogMessage => write!(f, "log-message"),
            Self::Unknown(code) => write!(f, "unknown({code})"),
        }
    }
}

/// Outcome of parsing a field out of a packet payload.
///
/// Duplexed fields carry the value twice; a copy that disagrees with its
/// primary yields [`PacketStatus::DuplexMismatch`]. This is payload-level
/// integrity signalling, independent of the packet checksum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketStatus {
    /// Field parsed cleanly.
    Valid,
    /// The duplexed copy did not match the primary value.
    DuplexMismatch,
}

/// Requested machine shutdown flavor, decoded from a shutdown command packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownMode {
    /// Reboot the operating system.
    Reboot,
    /// Power the operating system down.
    Halt,
}

impl fmt::Display for ShutdownMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reboot => write!(f, "reboot"),
            Self::Halt => write!(f, "halt"),
        }
    }
}
