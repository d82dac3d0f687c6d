//! Tello - client facade for the quadcopter
//!
//! Owns the three device channels: the command link (send/reply), the
//! telemetry receiver (unsolicited state push), and the reserved video port.
//! All named SDK operations live here; the correlation semantics live in
//! [`crate::link`].

use crate::commands::{Command, Direction, Query, Rotation};
use crate::config::AppConfig;
use crate::error::Result;
use crate::link::{CommandLink, LinkStats};
use crate::telemetry::TelemetryReceiver;
use crate::transport::{DatagramTransport, UdpTransport};

use std::net::UdpSocket;
use std::time::Duration;

/// Tello quadcopter client
///
/// The device speaks a single-outstanding-request plaintext protocol: every
/// state-changing command is acknowledged with the literal `ok`, every query
/// answers with the value itself, and nothing on the wire correlates replies
/// to commands beyond arrival order. The facade keeps that discipline for
/// you; calls block until the device answers or the configured response
/// timeout expires.
///
/// # Examples
///
/// ```no_run
/// use tello_io::{AppConfig, Tello};
///
/// # fn main() -> tello_io::Result<()> {
/// let config = AppConfig::tello_defaults();
/// let drone = Tello::connect(&config)?;
///
/// drone.enter_sdk_mode()?;
/// println!("Battery: {}%", drone.battery()?);
///
/// drone.take_off()?;
/// drone.move_forward(50)?;
/// drone.rotate_cw(90)?;
/// drone.land()?;
/// # Ok(())
/// # }
/// ```
pub struct Tello {
    /// Command/response correlation engine
    link: CommandLink,
    /// State push receiver
    telemetry: TelemetryReceiver,
    /// Bound video port; reserved for the stream push, never read here
    #[allow(dead_code)]
    video_socket: Option<UdpSocket>,
}

impl Tello {
    // === Constructors ===

    /// Connect to the device described by `config`
    ///
    /// Opens all three sockets up front: an ephemeral command socket
    /// connected to the device, the state port, and the video port. They
    /// stay open for the client's lifetime and are released on drop.
    pub fn connect(config: &AppConfig) -> Result<Self> {
        log::info!("Tello: Connecting to device at {}", config.device.address);

        let command_transport = UdpTransport::connect(config.device.command_addr()?)?;
        let state_transport = UdpTransport::bind(config.device.state_port)?;

        // The device pushes H.264 to this port once streamon is issued.
        // Binding reserves it; decoding the stream is out of scope.
        let video_socket = UdpSocket::bind(("0.0.0.0", config.device.video_port))?;
        log::info!(
            "Tello: Video port {} reserved (stream is not consumed)",
            config.device.video_port
        );

        Ok(Tello {
            link: CommandLink::new(command_transport, config.device.response_timeout()),
            telemetry: TelemetryReceiver::new(state_transport),
            video_socket: Some(video_socket),
        })
    }

    /// Build a client over caller-supplied transports
    ///
    /// The seam used by tests; no video port is reserved.
    pub fn with_transports<C, S>(command: C, state: S, response_timeout: Duration) -> Self
    where
        C: DatagramTransport + 'static,
        S: DatagramTransport + 'static,
    {
        Tello {
            link: CommandLink::new(command, response_timeout),
            telemetry: TelemetryReceiver::new(state),
            video_socket: None,
        }
    }

    // === Control commands (acknowledged) ===

    /// Enter SDK control mode; required before any other command
    pub fn enter_sdk_mode(&self) -> Result<()> {
        log::info!("Tello: Entering SDK control mode");
        self.control(Command::EnterSdkMode)
    }

    /// Automatic takeoff
    pub fn take_off(&self) -> Result<()> {
        log::info!("Tello: Taking off");
        self.control(Command::TakeOff)
    }

    /// Automatic landing
    pub fn land(&self) -> Result<()> {
        log::info!("Tello: Landing");
        self.control(Command::Land)
    }

    /// Enable the video stream push
    pub fn stream_on(&self) -> Result<()> {
        self.control(Command::StreamOn)
    }

    /// Disable the video stream push
    pub fn stream_off(&self) -> Result<()> {
        self.control(Command::StreamOff)
    }

    /// Stop all motors immediately
    pub fn emergency_stop(&self) -> Result<()> {
        log::warn!("Tello: Emergency stop");
        self.control(Command::Emergency)
    }

    /// Start motors without flying (cooling mode)
    pub fn motor_on(&self) -> Result<()> {
        self.control(Command::MotorOn)
    }

    /// Stop motor cooling mode
    pub fn motor_off(&self) -> Result<()> {
        self.control(Command::MotorOff)
    }

    // === Movement (acknowledged; distances 20-500 cm) ===

    /// Fly up `distance_cm` centimeters
    pub fn move_up(&self, distance_cm: u32) -> Result<()> {
        self.translate(Direction::Up, distance_cm)
    }

    /// Fly down `distance_cm` centimeters
    pub fn move_down(&self, distance_cm: u32) -> Result<()> {
        self.translate(Direction::Down, distance_cm)
    }

    /// Fly left `distance_cm` centimeters
    pub fn move_left(&self, distance_cm: u32) -> Result<()> {
        self.translate(Direction::Left, distance_cm)
    }

    /// Fly right `distance_cm` centimeters
    pub fn move_right(&self, distance_cm: u32) -> Result<()> {
        self.translate(Direction::Right, distance_cm)
    }

    /// Fly forward `distance_cm` centimeters
    pub fn move_forward(&self, distance_cm: u32) -> Result<()> {
        self.translate(Direction::Forward, distance_cm)
    }

    /// Fly backward `distance_cm` centimeters
    pub fn move_back(&self, distance_cm: u32) -> Result<()> {
        self.translate(Direction::Back, distance_cm)
    }

    /// Rotate clockwise by `degrees` (1-3600)
    pub fn rotate_cw(&self, degrees: u32) -> Result<()> {
        log::info!("Tello: Rotate {} deg clockwise", degrees);
        self.control(Command::Rotate {
            rotation: Rotation::Clockwise,
            degrees,
        })
    }

    /// Rotate counter-clockwise by `degrees` (1-3600)
    pub fn rotate_ccw(&self, degrees: u32) -> Result<()> {
        log::info!("Tello: Rotate {} deg counter-clockwise", degrees);
        self.control(Command::Rotate {
            rotation: Rotation::CounterClockwise,
            degrees,
        })
    }

    // === Queries (value-returning) ===

    /// Battery charge percentage, as the device reports it
    pub fn battery(&self) -> Result<String> {
        self.query(Query::Battery)
    }

    /// Current speed in cm/s
    pub fn speed(&self) -> Result<String> {
        self.query(Query::Speed)
    }

    /// Elapsed flight time in seconds
    pub fn flight_time(&self) -> Result<String> {
        self.query(Query::FlightTime)
    }

    /// Height above the takeoff point in cm
    pub fn height(&self) -> Result<String> {
        self.query(Query::Height)
    }

    /// Board temperature in degrees Celsius
    pub fn temperature(&self) -> Result<String> {
        self.query(Query::Temperature)
    }

    // === Raw pass-through ===

    /// Send an arbitrary command line and return the device's verbatim reply
    ///
    /// Used by the REPL, which forwards user input untouched.
    pub fn send_raw(&self, command: &str) -> Result<String> {
        self.link.send_for_value(command)
    }

    /// Send an arbitrary command line without awaiting any reply
    pub fn send_raw_nowait(&self, command: &str) -> Result<()> {
        self.link.send_nowait(command)
    }

    // === Telemetry ===

    /// Start surfacing state datagrams to `callback` as raw decoded text
    pub fn start_telemetry<F>(&mut self, callback: F) -> Result<()>
    where
        F: Fn(&str) + Send + 'static,
    {
        self.telemetry.start(callback)
    }

    /// Stop the telemetry receiver
    pub fn stop_telemetry(&mut self) {
        self.telemetry.stop();
    }

    /// Check if the telemetry receiver is running
    pub fn is_telemetry_active(&self) -> bool {
        self.telemetry.is_active()
    }

    /// Number of state datagrams received so far
    pub fn telemetry_datagrams(&self) -> u64 {
        self.telemetry.datagrams_received()
    }

    /// Command-channel traffic counters
    pub fn link_stats(&self) -> LinkStats {
        self.link.stats()
    }

    // === Internals ===

    /// Validate, encode and dispatch an acknowledged command
    fn control(&self, command: Command) -> Result<()> {
        command.validate()?;
        self.link.send_for_ack(&command.encode())?;
        Ok(())
    }

    /// Dispatch a movement command
    fn translate(&self, direction: Direction, distance_cm: u32) -> Result<()> {
        log::info!("Tello: Move {} {} cm", direction.verb(), distance_cm);
        self.control(Command::Move {
            direction,
            distance_cm,
        })
    }

    /// Encode and dispatch a value query
    fn query(&self, query: Query) -> Result<String> {
        self.link.send_for_value(query.verb())
    }
}

impl Drop for Tello {
    fn drop(&mut self) {
        log::info!("Tello: Shutting down client");
        self.telemetry.stop();
        // Link reader joins and sockets close via their own Drop impls
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::transport::MockTransport;
    use parking_lot::Mutex;
    use std::sync::Arc;
    use std::thread;
    use std::time::Instant;

    fn make_client(timeout_ms: u64) -> (Tello, MockTransport, MockTransport) {
        let command = MockTransport::new();
        let state = MockTransport::new();
        let drone = Tello::with_transports(
            command.clone(),
            state.clone(),
            Duration::from_millis(timeout_ms),
        );
        (drone, command, state)
    }

    fn reply_when_sent(mock: &MockTransport, sent_count: usize, reply: &[u8]) -> thread::JoinHandle<()> {
        let mock = mock.clone();
        let reply = reply.to_vec();
        thread::spawn(move || {
            let deadline = Instant::now() + Duration::from_secs(2);
            while mock.sent_count() < sent_count {
                assert!(Instant::now() < deadline, "command was never sent");
                thread::sleep(Duration::from_millis(1));
            }
            mock.inject(&reply);
        })
    }

    #[test]
    fn test_wire_text_construction() {
        let (drone, command, _state) = make_client(1000);

        let responder = reply_when_sent(&command, 1, b"ok");
        drone.move_forward(50).unwrap();
        responder.join().unwrap();

        let responder = reply_when_sent(&command, 2, b"ok");
        drone.rotate_cw(90).unwrap();
        responder.join().unwrap();

        let responder = reply_when_sent(&command, 3, b"87");
        assert_eq!(drone.battery().unwrap(), "87");
        responder.join().unwrap();

        assert_eq!(
            command.sent(),
            vec![
                b"forward 50".to_vec(),
                b"cw 90".to_vec(),
                b"battery?".to_vec()
            ]
        );
    }

    #[test]
    fn test_out_of_range_arguments_never_reach_the_wire() {
        let (drone, command, _state) = make_client(1000);

        assert!(matches!(
            drone.move_forward(19),
            Err(Error::InvalidParameter(_))
        ));
        assert!(matches!(
            drone.move_up(501),
            Err(Error::InvalidParameter(_))
        ));
        assert!(matches!(drone.rotate_cw(0), Err(Error::InvalidParameter(_))));
        assert!(matches!(
            drone.rotate_ccw(3601),
            Err(Error::InvalidParameter(_))
        ));

        assert_eq!(command.sent_count(), 0);
    }

    #[test]
    fn test_control_rejection_carries_device_text() {
        let (drone, command, _state) = make_client(1000);

        let responder = reply_when_sent(&command, 1, b"error Not joystick");
        match drone.take_off() {
            Err(Error::Rejected(text)) => assert_eq!(text, "error Not joystick"),
            other => panic!("expected Rejected, got {:?}", other),
        }
        responder.join().unwrap();
    }

    #[test]
    fn test_telemetry_never_answers_a_command() {
        let (mut drone, command, state) = make_client(100);

        let events: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        drone
            .start_telemetry(move |text| sink.lock().push(text.to_string()))
            .unwrap();

        // State traffic flows while a command awaits its reply; the command
        // must still time out because its own channel stayed silent
        state.inject(b"bat:87;h:0;");
        assert!(matches!(drone.battery(), Err(Error::Timeout)));

        let deadline = Instant::now() + Duration::from_secs(2);
        while drone.telemetry_datagrams() < 1 {
            assert!(Instant::now() < deadline, "telemetry event never surfaced");
            thread::sleep(Duration::from_millis(1));
        }
        assert_eq!(events.lock()[0], "bat:87;h:0;");
        assert_eq!(command.sent(), vec![b"battery?".to_vec()]);
    }

    #[test]
    fn test_raw_passthrough() {
        let (drone, command, _state) = make_client(1000);

        let responder = reply_when_sent(&command, 1, b"ok");
        assert_eq!(drone.send_raw("command").unwrap(), "ok");
        responder.join().unwrap();

        drone.send_raw_nowait("emergency").unwrap();
        assert_eq!(
            command.sent(),
            vec![b"command".to_vec(), b"emergency".to_vec()]
        );
    }
}
