//! Transport layer for datagram I/O abstraction

use crate::error::Result;

mod udp;
pub use udp::UdpTransport;

#[cfg(test)]
mod mock;
#[cfg(test)]
pub use mock::MockTransport;

/// Transport trait for datagram communication with the device
///
/// Unlike a byte-stream transport, payload boundaries are significant: one
/// `send` emits exactly one datagram and one `recv` returns exactly one.
/// A zero-length datagram is a real (empty) message, so "no data right now"
/// is reported as `Ok(None)` rather than a zero read.
pub trait DatagramTransport: Send {
    /// Send one datagram to the fixed peer, returns the payload length sent
    fn send(&mut self, payload: &[u8]) -> Result<usize>;

    /// Receive one datagram into the buffer, waiting at most the transport's
    /// internal poll interval
    ///
    /// Returns `Ok(Some(n))` with the datagram length, or `Ok(None)` when
    /// nothing arrived within the poll interval.
    fn recv(&mut self, buffer: &mut [u8]) -> Result<Option<usize>>;
}
