//! Mock datagram transport for testing

use super::DatagramTransport;
use crate::error::Result;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Mock transport for unit testing
///
/// Clones share the same queues, so a test can hold one handle while the
/// engine owns another.
#[derive(Clone)]
pub struct MockTransport {
    inner: Arc<Mutex<MockTransportInner>>,
}

struct MockTransportInner {
    inbound: VecDeque<Vec<u8>>,
    sent: Vec<Vec<u8>>,
    fail_sends: bool,
}

impl MockTransport {
    /// Create a new mock transport
    pub fn new() -> Self {
        MockTransport {
            inner: Arc::new(Mutex::new(MockTransportInner {
                inbound: VecDeque::new(),
                sent: Vec::new(),
                fail_sends: false,
            })),
        }
    }

    /// Inject one inbound datagram
    pub fn inject(&self, payload: &[u8]) {
        let mut inner = self.inner.lock().unwrap();
        inner.inbound.push_back(payload.to_vec());
    }

    /// Get all sent datagrams
    pub fn sent(&self) -> Vec<Vec<u8>> {
        let inner = self.inner.lock().unwrap();
        inner.sent.clone()
    }

    /// Number of datagrams sent so far
    pub fn sent_count(&self) -> usize {
        let inner = self.inner.lock().unwrap();
        inner.sent.len()
    }

    /// Make every subsequent send fail with an I/O error
    pub fn fail_sends(&self, fail: bool) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_sends = fail;
    }
}

impl DatagramTransport for MockTransport {
    fn send(&mut self, payload: &[u8]) -> Result<usize> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_sends {
            return Err(std::io::Error::new(
                std::io::ErrorKind::Other,
                "simulated send failure",
            )
            .into());
        }
        inner.sent.push(payload.to_vec());
        Ok(payload.len())
    }

    fn recv(&mut self, buffer: &mut [u8]) -> Result<Option<usize>> {
        let mut inner = self.inner.lock().unwrap();
        match inner.inbound.pop_front() {
            Some(datagram) => {
                let n = datagram.len().min(buffer.len());
                buffer[..n].copy_from_slice(&datagram[..n]);
                Ok(Some(n))
            }
            None => Ok(None),
        }
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}
