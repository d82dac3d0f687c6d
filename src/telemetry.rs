//! Telemetry (state) stream receiver
//!
//! The device pushes status datagrams to a fixed local port at its own
//! cadence, with no correlation to command traffic. Each datagram surfaces
//! as one raw decoded-text event; parsing the key:value payload into
//! structured fields is a downstream consumer's job, not this crate's.

use crate::error::{Error, Result};
use crate::transport::DatagramTransport;

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Largest state datagram the receiver accepts
const MAX_DATAGRAM_SIZE: usize = 2048;

/// Sleep between empty polls
const IDLE_BACKOFF: Duration = Duration::from_millis(2);

/// Receiver for the unsolicited state push stream
pub struct TelemetryReceiver {
    /// Transport bound to the state port
    transport: Arc<Mutex<Box<dyn DatagramTransport>>>,
    /// Running flag for the receive thread
    running: Arc<AtomicBool>,
    /// Receive thread handle
    thread: Option<JoinHandle<()>>,
    /// Datagrams surfaced so far
    datagrams_received: Arc<AtomicU64>,
}

impl TelemetryReceiver {
    /// Create a receiver over a transport bound to the state port
    pub fn new<T: DatagramTransport + 'static>(transport: T) -> Self {
        TelemetryReceiver {
            transport: Arc::new(Mutex::new(Box::new(transport) as Box<dyn DatagramTransport>)),
            running: Arc::new(AtomicBool::new(false)),
            thread: None,
            datagrams_received: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Start receiving, surfacing each datagram's decoded text to `callback`
    ///
    /// Datagrams may arrive out of order or not at all; the callback must
    /// not assume completeness.
    pub fn start<F>(&mut self, callback: F) -> Result<()>
    where
        F: Fn(&str) + Send + 'static,
    {
        if self.thread.is_some() {
            return Err(Error::Other("telemetry receiver already started".to_string()));
        }

        self.running.store(true, Ordering::Relaxed);

        let transport = Arc::clone(&self.transport);
        let running = Arc::clone(&self.running);
        let counter = Arc::clone(&self.datagrams_received);

        let handle = thread::Builder::new()
            .name("tello-state-rx".to_string())
            .spawn(move || {
                log::info!("Telemetry: Receive thread started");
                let mut buffer = [0u8; MAX_DATAGRAM_SIZE];

                while running.load(Ordering::Relaxed) {
                    let received = {
                        let mut transport = transport.lock();
                        transport.recv(&mut buffer)
                    };

                    match received {
                        Ok(Some(n)) => {
                            let text = String::from_utf8_lossy(&buffer[..n]);
                            log::trace!("Telemetry: RX {} bytes", n);
                            callback(&text);
                            counter.fetch_add(1, Ordering::Relaxed);
                        }
                        Ok(None) => {
                            thread::sleep(IDLE_BACKOFF);
                        }
                        Err(e) => {
                            log::warn!("Telemetry: Receive error: {}", e);
                            thread::sleep(IDLE_BACKOFF);
                        }
                    }
                }

                log::info!("Telemetry: Receive thread stopped");
            })
            .expect("Failed to spawn telemetry thread");

        self.thread = Some(handle);
        Ok(())
    }

    /// Stop receiving and join the thread
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }

    /// Check if the receive thread is running
    pub fn is_active(&self) -> bool {
        self.thread.is_some()
    }

    /// Number of state datagrams surfaced so far
    pub fn datagrams_received(&self) -> u64 {
        self.datagrams_received.load(Ordering::Relaxed)
    }
}

impl Drop for TelemetryReceiver {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MockTransport;
    use std::time::Instant;

    fn wait_until(mut predicate: impl FnMut() -> bool) {
        let deadline = Instant::now() + Duration::from_secs(2);
        while !predicate() {
            assert!(Instant::now() < deadline, "condition never became true");
            thread::sleep(Duration::from_millis(1));
        }
    }

    #[test]
    fn test_surfaces_raw_text_events() {
        let mock = MockTransport::new();
        let mut receiver = TelemetryReceiver::new(mock.clone());

        let events: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        receiver.start(move |text| sink.lock().push(text.to_string())).unwrap();

        mock.inject(b"pitch:0;roll:0;yaw:12;bat:87;");
        mock.inject(b"pitch:1;roll:0;yaw:13;bat:87;");

        wait_until(|| receiver.datagrams_received() == 2);
        receiver.stop();

        let events = events.lock();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], "pitch:0;roll:0;yaw:12;bat:87;");
        assert_eq!(events[1], "pitch:1;roll:0;yaw:13;bat:87;");
    }

    #[test]
    fn test_lifecycle() {
        let mock = MockTransport::new();
        let mut receiver = TelemetryReceiver::new(mock);
        assert!(!receiver.is_active());

        receiver.start(|_| {}).unwrap();
        assert!(receiver.is_active());

        // Second start without a stop is a caller bug
        assert!(receiver.start(|_| {}).is_err());

        receiver.stop();
        assert!(!receiver.is_active());

        // stop() is idempotent
        receiver.stop();
    }
}
