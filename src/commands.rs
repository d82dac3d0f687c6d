//! Tello SDK command vocabulary
//!
//! Wire format: each command is a single-line plaintext token, optionally
//! followed by one space-separated decimal argument, e.g. `forward 50` or
//! `battery?`. There is no framing, no length prefix and no checksum at this
//! layer; correctness relies on UDP delivering each payload atomically.
//!
//! Replies to control commands are the literal token `ok` on success and
//! arbitrary text on failure. Replies to queries carry the answer itself.

use crate::error::{Error, Result};
use std::fmt;

/// Literal acknowledgement token the device sends for a successful control
/// command. Compared exactly: case-sensitive, untrimmed.
pub const RESPONSE_OK: &str = "ok";

/// Valid linear travel distance in centimeters
pub const DISTANCE_CM_MIN: u32 = 20;
/// Valid linear travel distance in centimeters
pub const DISTANCE_CM_MAX: u32 = 500;

/// Valid rotation angle in degrees
pub const ANGLE_DEG_MIN: u32 = 1;
/// Valid rotation angle in degrees
pub const ANGLE_DEG_MAX: u32 = 3600;

/// How the device answers a command, and therefore how the link must treat
/// the exchange. Chosen per command by this vocabulary table; nothing on the
/// wire distinguishes the three.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseMode {
    /// No reply is awaited; success is send completion
    None,
    /// The next inbound datagram's text is the result, verbatim
    Value,
    /// The next inbound datagram must equal [`RESPONSE_OK`]
    Ack,
}

/// Cardinal movement directions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
    Forward,
    Back,
}

impl Direction {
    /// Wire verb for this direction
    pub fn verb(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
            Direction::Forward => "forward",
            Direction::Back => "back",
        }
    }
}

/// Rotation sense
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rotation {
    Clockwise,
    CounterClockwise,
}

impl Rotation {
    /// Wire verb for this rotation sense
    pub fn verb(self) -> &'static str {
        match self {
            Rotation::Clockwise => "cw",
            Rotation::CounterClockwise => "ccw",
        }
    }
}

/// Telemetry queries answered with a value instead of an acknowledgement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Query {
    /// Battery charge percentage (0-100)
    Battery,
    /// Current speed in cm/s
    Speed,
    /// Elapsed flight time in seconds
    FlightTime,
    /// Height above takeoff point in cm
    Height,
    /// Board temperature in degrees Celsius
    Temperature,
}

impl Query {
    /// Wire text for this query
    pub fn verb(self) -> &'static str {
        match self {
            Query::Battery => "battery?",
            Query::Speed => "speed?",
            Query::FlightTime => "time?",
            Query::Height => "height?",
            Query::Temperature => "temp?",
        }
    }
}

/// Tello SDK commands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Enter SDK control mode; must precede every other command
    EnterSdkMode,
    /// Automatic takeoff
    TakeOff,
    /// Automatic landing
    Land,
    /// Enable the video stream push
    StreamOn,
    /// Disable the video stream push
    StreamOff,
    /// Stop all motors immediately
    Emergency,
    /// Fly `distance_cm` centimeters in a cardinal direction
    Move {
        direction: Direction,
        distance_cm: u32,
    },
    /// Rotate `degrees` in the given sense
    Rotate { rotation: Rotation, degrees: u32 },
    /// Start motors without flying (motor cooling mode)
    MotorOn,
    /// Stop motor cooling mode
    MotorOff,
    /// Read a telemetry value
    Query(Query),
}

impl Command {
    /// Produce the exact wire text for this command
    pub fn encode(&self) -> String {
        match self {
            Command::EnterSdkMode => "command".to_string(),
            Command::TakeOff => "takeoff".to_string(),
            Command::Land => "land".to_string(),
            Command::StreamOn => "streamon".to_string(),
            Command::StreamOff => "streamoff".to_string(),
            Command::Emergency => "emergency".to_string(),
            Command::Move {
                direction,
                distance_cm,
            } => format!("{} {}", direction.verb(), distance_cm),
            Command::Rotate { rotation, degrees } => {
                format!("{} {}", rotation.verb(), degrees)
            }
            Command::MotorOn => "motoron".to_string(),
            Command::MotorOff => "motoroff".to_string(),
            Command::Query(query) => query.verb().to_string(),
        }
    }

    /// Reply contract for this command
    pub fn response_mode(&self) -> ResponseMode {
        match self {
            Command::Query(_) => ResponseMode::Value,
            _ => ResponseMode::Ack,
        }
    }

    /// Range-check numeric arguments before anything touches the wire
    ///
    /// The device's own rejection behavior for out-of-range values is
    /// undocumented, so invalid arguments fail fast here instead.
    pub fn validate(&self) -> Result<()> {
        match self {
            Command::Move { distance_cm, .. } => {
                if !(DISTANCE_CM_MIN..=DISTANCE_CM_MAX).contains(distance_cm) {
                    return Err(Error::InvalidParameter(format!(
                        "distance {} cm outside {}-{} cm",
                        distance_cm, DISTANCE_CM_MIN, DISTANCE_CM_MAX
                    )));
                }
                Ok(())
            }
            Command::Rotate { degrees, .. } => {
                if !(ANGLE_DEG_MIN..=ANGLE_DEG_MAX).contains(degrees) {
                    return Err(Error::InvalidParameter(format!(
                        "angle {} deg outside {}-{} deg",
                        degrees, ANGLE_DEG_MIN, ANGLE_DEG_MAX
                    )));
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}
