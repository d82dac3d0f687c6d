//! UDP transport implementation

use super::DatagramTransport;
use crate::error::{Error, Result};
use std::net::{SocketAddr, UdpSocket};
use std::time::Duration;

/// How long a single `recv` call may block. Reader threads poll at this
/// cadence, so it also bounds how long a send can wait on the transport lock.
const RECV_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// UDP transport bound to a local port, optionally connected to a fixed peer
pub struct UdpTransport {
    socket: UdpSocket,
    peer: Option<SocketAddr>,
}

impl UdpTransport {
    /// Open a transport for the command channel: bind an ephemeral local
    /// port and connect it to the device address
    ///
    /// # Arguments
    /// * `peer` - Device command address (e.g. 192.168.10.1:8889)
    pub fn connect(peer: SocketAddr) -> Result<Self> {
        let socket = UdpSocket::bind(("0.0.0.0", 0))?;
        socket.connect(peer)?;
        socket.set_read_timeout(Some(RECV_POLL_INTERVAL))?;

        log::info!(
            "Opened command socket {} -> {}",
            socket.local_addr()?,
            peer
        );

        Ok(UdpTransport {
            socket,
            peer: Some(peer),
        })
    }

    /// Open a receive-only transport bound to a fixed local port
    /// (the telemetry and video push channels)
    pub fn bind(port: u16) -> Result<Self> {
        let socket = UdpSocket::bind(("0.0.0.0", port))?;
        socket.set_read_timeout(Some(RECV_POLL_INTERVAL))?;

        log::info!("Opened listen socket {}", socket.local_addr()?);

        Ok(UdpTransport { socket, peer: None })
    }

    /// Local address the socket is bound to
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }
}

impl DatagramTransport for UdpTransport {
    fn send(&mut self, payload: &[u8]) -> Result<usize> {
        if self.peer.is_none() {
            return Err(Error::Other(
                "transport is receive-only (no peer address)".to_string(),
            ));
        }
        Ok(self.socket.send(payload)?)
    }

    fn recv(&mut self, buffer: &mut [u8]) -> Result<Option<usize>> {
        match self.socket.recv_from(buffer) {
            Ok((n, _from)) => Ok(Some(n)),
            Err(e)
                if e.kind() == std::io::ErrorKind::WouldBlock
                    || e.kind() == std::io::ErrorKind::TimedOut =>
            {
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }
}
