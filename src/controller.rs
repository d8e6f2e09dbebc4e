//! Link to the remote controller device.
//!
//! [`ControllerLink`] ties the pieces together for one peer: the TCP link,
//! the receive ring, the packet framer, and the packet encoder. The owning
//! process calls [`tick`](ControllerLink::tick) once per application frame;
//! each tick accepts a pending connection if none is active, streams the
//! current hand data (rate limited), drains the socket into the ring, and
//! dispatches at most one decoded packet.
//!
//! A broken connection is not an error to the caller: the link resets all
//! per-connection state and goes back to waiting for the controller to
//! reconnect. No partial packet ever survives across a reconnect.

use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::config::{LinkConfig, NodeConfig};
use crate::error::Result;
use crate::gesture::{wire, HandObservation};
use crate::protocol::{
    read_signed_byte, ByteRing, PacketEncoder, PacketFramer, RECEIVE_RING_CAPACITY,
};
use crate::transport::{TcpLink, Transport};
use crate::types::{DeviceId, PacketStatus, PacketType, ShutdownMode};

/// What a single tick accomplished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Nothing to do: no peer, or no complete packet this tick.
    Idle,
    /// A new controller connection was accepted.
    Connected,
    /// The active connection went away; state has been reset.
    Disconnected,
    /// One inbound packet was decoded and handled.
    PacketHandled,
    /// The controller ordered an operating-system shutdown. Acting on it is
    /// the host process's decision.
    ShutdownRequested(ShutdownMode),
}

/// Per-connection glue between the gesture layer and the packet engine.
pub struct ControllerLink {
    controller_id: DeviceId,
    link: TcpLink,
    ring: ByteRing,
    framer: PacketFramer,
    encoder: PacketEncoder,
    greeting: String,
    send_interval: Duration,
    next_send: Instant,
    unhandled_packets: u64,
}

impl ControllerLink {
    /// Bind the listener and prepare all per-connection state.
    pub fn new(node: &NodeConfig, link_config: &LinkConfig) -> Result<Self> {
        let link = TcpLink::bind(link_config.listen_addr, node.remote_name.clone())?;

        Ok(Self {
            controller_id: node.controller_id,
            link,
            ring: ByteRing::new(RECEIVE_RING_CAPACITY),
            framer: PacketFramer::new(node.device_id),
            encoder: PacketEncoder::new(node.device_id),
            greeting: node.greeting.clone(),
            send_interval: node.send_interval,
            next_send: Instant::now(),
            unhandled_packets: 0,
        })
    }

    /// Whether a controller is currently connected.
    pub fn connected(&self) -> bool {
        self.link.is_connected()
    }

    /// Address the listener bound to.
    pub fn local_addr(&self) -> std::net::SocketAddr {
        self.link.local_addr()
    }

    /// Packets received whose type this node does not handle.
    pub fn unhandled_packet_count(&self) -> u64 {
        self.unhandled_packets
    }

    /// Run one iteration of the poll loop.
    ///
    /// `hands` is the current frame's hand observations from the vision
    /// pipeline; `score_threshold` is the validity cutoff applied to each
    /// hand. Call this once per application tick — the receive path only
    /// makes progress when polled.
    pub fn tick(
        &mut self,
        hands: &[HandObservation],
        score_threshold: f32,
    ) -> Result<TickOutcome> {
        if !self.link.is_connected() {
            if self.link.accept_pending()? {
                self.reset_session();
                return Ok(TickOutcome::Connected);
            }
            return Ok(TickOutcome::Idle);
        }

        match self.service(hands, score_threshold) {
            Ok(outcome) => Ok(outcome),
            Err(e) if e.is_disconnect() => {
                warn!("controller connection lost, waiting for reconnect");
                self.drop_connection();
                Ok(TickOutcome::Disconnected)
            }
            Err(e) => Err(e),
        }
    }

    /// Tear down the active connection and discard all in-flight state.
    pub fn drop_connection(&mut self) {
        self.link.disconnect();
        self.reset_session();
    }

    fn reset_session(&mut self) {
        self.ring.reset();
        self.framer.reset();
    }

    fn service(
        &mut self,
        hands: &[HandObservation],
        score_threshold: f32,
    ) -> Result<TickOutcome> {
        self.send_hand_data(hands, score_threshold)?;

        self.link.pump(&mut self.ring)?;
        if self.ring.dropped() > 0 && self.ring.available() == self.ring.capacity() {
            warn!(
                dropped = self.ring.dropped(),
                "receive ring overflowing; tick rate too low for inbound traffic"
            );
        }

        let Some(frame) = self.framer.poll(&mut self.ring) else {
            return Ok(TickOutcome::Idle);
        };

        match frame.packet_type() {
            PacketType::GetDeviceInfo => {
                debug!(source = %frame.source(), "device info requested");
                self.encoder.send_text(
                    &mut self.link,
                    self.controller_id,
                    PacketType::LogMessage,
                    &self.greeting,
                )?;
                Ok(TickOutcome::PacketHandled)
            }
            PacketType::LogMessage => {
                let text = terminated_text(frame.payload());
                info!(source = %frame.source(), message = %text, "log message from controller");
                Ok(TickOutcome::PacketHandled)
            }
            PacketType::ShutdownOs => {
                let payload = frame.payload();
                if payload.is_empty() {
                    warn!("shutdown command with empty payload ignored");
                    return Ok(TickOutcome::PacketHandled);
                }

                let (status, _, value) = read_signed_byte(payload, 0);
                if status != PacketStatus::Valid {
                    return Ok(TickOutcome::PacketHandled);
                }

                let mode = if value == 0 {
                    ShutdownMode::Reboot
                } else {
                    ShutdownMode::Halt
                };
                info!(%mode, "shutdown requested by controller");
                self.encoder.send_text(
                    &mut self.link,
                    self.controller_id,
                    PacketType::LogMessage,
                    &format!("Gesture node preparing for {mode}"),
                )?;
                Ok(TickOutcome::ShutdownRequested(mode))
            }
            PacketType::Ack => {
                debug!(source = %frame.source(), "ack received");
                Ok(TickOutcome::PacketHandled)
            }
            other => {
                self.unhandled_packets += 1;
                debug!(packet_type = %other, "ignoring unhandled packet type");
                Ok(TickOutcome::Idle)
            }
        }
    }

    /// Transmit the current hand data if the send timer has elapsed.
    ///
    /// An empty frame still produces a (payload-less) packet, which doubles
    /// as a keepalive for the controller side.
    fn send_hand_data(&mut self, hands: &[HandObservation], score_threshold: f32) -> Result<()> {
        let now = Instant::now();
        if now < self.next_send {
            return Ok(());
        }
        self.next_send = now + self.send_interval;

        let words = wire::hand_data_words(hands, score_threshold);
        self.encoder.send_short_ints(
            &mut self.link,
            self.controller_id,
            PacketType::HandGestureData,
            &words,
        )
    }
}

/// Extract the text of a NUL-terminated message payload.
///
/// Bytes past the first NUL are ignored; a missing terminator just means the
/// whole payload is text. Invalid UTF-8 is replaced rather than rejected —
/// log messages are for humans.
fn terminated_text(payload: &[u8]) -> String {
    let end = payload
        .iter()
        .position(|&b| b == 0)
        .unwrap_or(payload.len());
    String::from_utf8_lossy(&payload[..end]).into_owned()
}
