//! TCP link to the remote controller.
//!
//! The controller initiates the connection; this side listens, accepts a
//! single peer, and services it until it disappears. The listener and the
//! accepted stream are both non-blocking so the poll loop never stalls:
//! accepting, reading, and writing all either complete immediately or report
//! "nothing to do".

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};

use socket2::{Domain, Protocol, Socket, Type};
use tracing::{debug, info, warn};

use super::Transport;
use crate::error::{Result, TransportError};

/// Single-peer TCP transport.
///
/// At most one remote connection is live at a time; while one is active,
/// further connection attempts queue in the listen backlog and are only
/// accepted after a disconnect.
#[derive(Debug)]
pub struct TcpLink {
    listener: TcpListener,
    stream: Option<TcpStream>,
    local_addr: SocketAddr,
    remote_addr: Option<SocketAddr>,
    /// Human-friendly name of the expected peer, used in log lines.
    remote_name: String,
}

impl TcpLink {
    /// Bind the listener and start watching for connection requests.
    pub fn bind(addr: SocketAddr, remote_name: impl Into<String>) -> Result<Self> {
        let listener = create_listener(addr)?;
        let local_addr = listener
            .local_addr()
            .map_err(|e| TransportError::SocketError(e.to_string()))?;

        let remote_name = remote_name.into();
        info!(%local_addr, peer = %remote_name, "listening for connection requests");

        Ok(Self {
            listener,
            stream: None,
            local_addr,
            remote_addr: None,
            remote_name,
        })
    }

    /// Address the listener actually bound to (relevant when binding port 0).
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Address of the connected peer, if any.
    pub fn remote_addr(&self) -> Option<SocketAddr> {
        self.remote_addr
    }

    /// Accept a pending connection request, if one is waiting.
    ///
    /// Returns `true` when a new peer was accepted this call. Does nothing
    /// while a connection is already active.
    pub fn accept_pending(&mut self) -> Result<bool> {
        if self.stream.is_some() {
            return Ok(false);
        }

        match self.listener.accept() {
            Ok((stream, addr)) => {
                stream
                    .set_nonblocking(true)
                    .map_err(|e| TransportError::SocketError(e.to_string()))?;
                if let Err(e) = stream.set_nodelay(true) {
                    debug!(error = %e, "could not set TCP_NODELAY");
                }
                info!(peer = %self.remote_name, %addr, "connection accepted");
                self.stream = Some(stream);
                self.remote_addr = Some(addr);
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => Ok(false),
            Err(e) => Err(TransportError::SocketError(e.to_string()).into()),
        }
    }

    /// Shut the active connection down and forget it.
    ///
    /// Safe to call with no connection active, and never fails: a peer that
    /// is already gone cannot make the disconnect worse.
    pub fn disconnect(&mut self) {
        if let Some(stream) = self.stream.take() {
            if let Err(e) = stream.shutdown(std::net::Shutdown::Both) {
                debug!(error = %e, "socket shutdown failed, closing anyway");
            }
            let addr = self.remote_addr.take();
            info!(
                peer = %self.remote_name,
                addr = addr.map(|a| a.to_string()).unwrap_or_default(),
                "disconnected"
            );
        }
    }
}

impl Transport for TcpLink {
    fn read_byte(&mut self) -> Result<Option<u8>> {
        let Some(stream) = self.stream.as_mut() else {
            return Ok(None);
        };

        let mut byte = [0u8; 1];
        loop {
            match stream.read(&mut byte) {
                Ok(0) => return Err(TransportError::ConnectionClosed.into()),
                Ok(_) => return Ok(Some(byte[0])),
                Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => return Ok(None),
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e)
                    if e.kind() == std::io::ErrorKind::ConnectionReset
                        || e.kind() == std::io::ErrorKind::ConnectionAborted =>
                {
                    warn!(error = %e, "connection dropped by peer");
                    return Err(TransportError::ConnectionClosed.into());
                }
                Err(e) => return Err(TransportError::ReceiveFailed(e.to_string()).into()),
            }
        }
    }

    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        let Some(stream) = self.stream.as_mut() else {
            return Err(TransportError::SendFailed("not connected".into()).into());
        };

        loop {
            match stream.write(buf) {
                Ok(n) => return Ok(n),
                // Kernel send buffer full: wait for it to drain. The peer
                // reads continuously in normal operation, so this resolves
                // quickly or the connection is dead and a later write fails.
                Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    std::thread::yield_now();
                }
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e)
                    if e.kind() == std::io::ErrorKind::BrokenPipe
                        || e.kind() == std::io::ErrorKind::ConnectionReset =>
                {
                    return Err(TransportError::ConnectionClosed.into());
                }
                Err(e) => return Err(TransportError::SendFailed(e.to_string()).into()),
            }
        }
    }

    fn is_connected(&self) -> bool {
        self.stream.is_some()
    }
}

/// Build the non-blocking listener socket.
fn create_listener(addr: SocketAddr) -> Result<TcpListener> {
    let domain = if addr.is_ipv6() {
        Domain::IPV6
    } else {
        Domain::IPV4
    };

    let socket = Socket::new(domain, Type::STREAM, Some(Protocol::TCP))
        .map_err(|e| TransportError::SocketError(e.to_string()))?;

    socket
        .set_reuse_address(true)
        .map_err(|e| TransportError::SocketError(format!("set reuse addr: {e}")))?;

    socket
        .bind(&addr.into())
        .map_err(|e| TransportError::BindFailed {
            addr,
            reason: e.to_string(),
        })?;

    socket
        .listen(1)
        .map_err(|e| TransportError::BindFailed {
            addr,
            reason: e.to_string(),
        })?;

    socket
        .set_nonblocking(true)
        .map_err(|e| TransportError::SocketError(e.to_string()))?;

    Ok(socket.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bind_local() -> TcpLink {
        TcpLink::bind("127.0.0.1:0".parse().unwrap(), "test peer").unwrap()
    }

    #[test]
    fn no_connection_means_no_bytes() {
        let mut link = bind_local();
        assert!(!link.is_connected());
        assert_eq!(link.read_byte().unwrap(), None);
        assert!(!link.accept_pending().unwrap());
    }

    #[test]
    fn write_without_connection_fails() {
        let mut link = bind_local();
        assert!(link.write(b"x").is_err());
    }

    #[test]
    fn disconnect_without_connection_is_harmless() {
        let mut link = bind_local();
        link.disconnect();
        assert!(!link.is_connected());
    }
}
