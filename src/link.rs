//! Command/response correlation engine
//!
//! The Tello control protocol is single-outstanding-request over UDP: a
//! command datagram goes out, and whatever datagram arrives next on the same
//! socket is its reply. There is no sequence number or request ID on the
//! wire, so correlation is purely temporal: the caller registers interest
//! in "the next message" at the moment it sends.
//!
//! [`CommandLink`] makes that contract safe to use: a dedicated reader
//! thread owns inbound polling and hands each datagram to the single armed
//! one-shot listener, and awaiting calls serialize on an internal gate so a
//! second exchange can never consume the reply meant for the first.
//! Each awaiting call races the reply against the configured response
//! timeout instead of hanging forever when the device stays silent.

use crate::commands::RESPONSE_OK;
use crate::error::{Error, Result};
use crate::transport::DatagramTransport;

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Largest datagram the reader accepts. Command replies are a few bytes;
/// this leaves generous headroom.
const MAX_DATAGRAM_SIZE: usize = 2048;

/// Sleep between empty polls so mock transports don't spin the reader hot
const IDLE_BACKOFF: Duration = Duration::from_millis(2);

/// Counters for link traffic
#[derive(Debug, Clone, Copy, Default)]
pub struct LinkStats {
    /// Command datagrams handed to the transport
    pub commands_sent: u64,
    /// Replies delivered to an armed listener
    pub replies_delivered: u64,
    /// Replies that arrived with no listener armed (or after it gave up)
    pub replies_discarded: u64,
}

/// Command/response correlation engine for the device control channel
pub struct CommandLink {
    /// Transport shared with the reader thread
    transport: Arc<Mutex<Box<dyn DatagramTransport>>>,
    /// One-shot "next datagram" listener slot; at most one armed at a time
    pending: Arc<Mutex<Option<Sender<String>>>>,
    /// Serializes awaiting calls: held for the whole send-and-await exchange
    call_gate: Mutex<()>,
    /// Reply deadline for value/ack exchanges
    response_timeout: Duration,
    /// Traffic counters shared with the reader thread
    stats: Arc<Mutex<LinkStats>>,
    /// Shutdown flag for the reader thread
    shutdown: Arc<AtomicBool>,
    /// Reader thread handle
    reader_thread: Option<JoinHandle<()>>,
}

impl CommandLink {
    /// Create a link over the given transport and start its reader thread
    pub fn new<T: DatagramTransport + 'static>(transport: T, response_timeout: Duration) -> Self {
        let transport = Arc::new(Mutex::new(Box::new(transport) as Box<dyn DatagramTransport>));
        let pending: Arc<Mutex<Option<Sender<String>>>> = Arc::new(Mutex::new(None));
        let stats = Arc::new(Mutex::new(LinkStats::default()));
        let shutdown = Arc::new(AtomicBool::new(false));

        let reader_thread = Some(spawn_reader(
            Arc::clone(&transport),
            Arc::clone(&pending),
            Arc::clone(&stats),
            Arc::clone(&shutdown),
        ));

        log::info!(
            "Link: Started (response timeout {:?})",
            response_timeout
        );

        CommandLink {
            transport,
            pending,
            call_gate: Mutex::new(()),
            response_timeout,
            stats,
            shutdown,
            reader_thread,
        }
    }

    /// Send a command without awaiting any reply
    ///
    /// Success means the datagram was handed to the transport; any reply the
    /// device produces is not consumed by this call. Does not queue behind
    /// awaiting exchanges.
    pub fn send_nowait(&self, command: &str) -> Result<()> {
        log::debug!("Link: TX {:?} (fire-and-forget)", command);
        self.write(command)
    }

    /// Send a command and resolve with the verbatim text of the next reply
    ///
    /// Whatever the next inbound datagram decodes to (numeric, empty, or
    /// garbage) is the result. Used for telemetry queries.
    pub fn send_for_value(&self, command: &str) -> Result<String> {
        self.exchange(command)
    }

    /// Send a control command and classify its acknowledgement
    ///
    /// Resolves with the literal [`RESPONSE_OK`] token on success; any other
    /// reply text rejects with [`Error::Rejected`] carrying that text.
    /// The comparison is exact: case-sensitive, untrimmed.
    pub fn send_for_ack(&self, command: &str) -> Result<String> {
        let reply = self.exchange(command)?;
        if reply == RESPONSE_OK {
            Ok(reply)
        } else {
            log::warn!("Link: Device rejected {:?}: {:?}", command, reply);
            Err(Error::Rejected(reply))
        }
    }

    /// Current traffic counters
    pub fn stats(&self) -> LinkStats {
        *self.stats.lock()
    }

    /// Send, arm the one-shot listener, and await the next inbound datagram
    fn exchange(&self, command: &str) -> Result<String> {
        // One exchange in flight at a time. Without this, the reply meant
        // for an earlier call could be consumed by a later call's listener.
        let _in_flight = self.call_gate.lock();

        let reply_rx = self.arm_listener();
        log::debug!("Link: TX {:?} (awaiting reply)", command);

        if let Err(e) = self.write(command) {
            // A failed send can never be answered; leaving the listener
            // armed would let it capture a later, unrelated datagram.
            self.disarm_listener();
            return Err(e);
        }

        match reply_rx.recv_timeout(self.response_timeout) {
            Ok(reply) => {
                log::debug!("Link: RX {:?}", reply);
                Ok(reply)
            }
            Err(RecvTimeoutError::Timeout) => {
                self.disarm_listener();
                log::warn!(
                    "Link: No reply to {:?} within {:?}",
                    command,
                    self.response_timeout
                );
                Err(Error::Timeout)
            }
            Err(RecvTimeoutError::Disconnected) => Err(Error::LinkClosed),
        }
    }

    /// Arm a one-shot listener for the next inbound datagram
    ///
    /// Replaces any previously armed listener, whose receiver then observes
    /// a disconnect. That starvation is the protocol-level hazard the call
    /// gate exists to prevent; tests pin it down through this method.
    pub(crate) fn arm_listener(&self) -> Receiver<String> {
        let (tx, rx) = bounded(1);
        let previous = self.pending.lock().replace(tx);
        if previous.is_some() {
            log::warn!("Link: Replacing an already-armed reply listener");
        }
        rx
    }

    /// Drop the armed listener, if any
    fn disarm_listener(&self) {
        self.pending.lock().take();
    }

    /// Hand one command datagram to the transport
    fn write(&self, command: &str) -> Result<()> {
        {
            let mut transport = self.transport.lock();
            transport.send(command.as_bytes())?;
        }
        self.stats.lock().commands_sent += 1;
        Ok(())
    }
}

impl Drop for CommandLink {
    fn drop(&mut self) {
        log::info!("Link: Shutting down");

        self.shutdown.store(true, Ordering::Relaxed);

        if let Some(handle) = self.reader_thread.take() {
            let _ = handle.join();
        }

        // Dropping the slot disconnects any listener still armed
        self.disarm_listener();

        log::info!("Link: Shutdown complete");
    }
}

/// Spawn the reader thread: polls the transport and routes each inbound
/// datagram to the armed listener, or counts it as discarded
fn spawn_reader(
    transport: Arc<Mutex<Box<dyn DatagramTransport>>>,
    pending: Arc<Mutex<Option<Sender<String>>>>,
    stats: Arc<Mutex<LinkStats>>,
    shutdown: Arc<AtomicBool>,
) -> JoinHandle<()> {
    thread::Builder::new()
        .name("tello-link-rx".to_string())
        .spawn(move || {
            log::debug!("Link: Reader thread started");
            let mut buffer = [0u8; MAX_DATAGRAM_SIZE];

            while !shutdown.load(Ordering::Relaxed) {
                let received = {
                    let mut transport = transport.lock();
                    transport.recv(&mut buffer)
                };

                match received {
                    Ok(Some(n)) => {
                        let text = String::from_utf8_lossy(&buffer[..n]).into_owned();
                        deliver(&pending, &stats, text);
                    }
                    Ok(None) => {
                        thread::sleep(IDLE_BACKOFF);
                    }
                    Err(e) => {
                        log::warn!("Link: Receive error: {}", e);
                        thread::sleep(IDLE_BACKOFF);
                    }
                }
            }

            log::debug!("Link: Reader thread stopped");
        })
        .expect("Failed to spawn link reader thread")
}

/// Route one decoded reply to the armed listener, or discard it
fn deliver(
    pending: &Arc<Mutex<Option<Sender<String>>>>,
    stats: &Arc<Mutex<LinkStats>>,
    text: String,
) {
    let listener = pending.lock().take();
    match listener {
        Some(tx) => {
            if tx.send(text).is_ok() {
                stats.lock().replies_delivered += 1;
            } else {
                // Listener timed out between arming and delivery
                stats.lock().replies_discarded += 1;
            }
        }
        None => {
            log::debug!("Link: Discarding unsolicited datagram: {:?}", text);
            stats.lock().replies_discarded += 1;
        }
    }
}
