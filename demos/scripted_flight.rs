//! Minimal scripted flight - take off, fly a short leg, land
//!
//! Join the drone's Wi-Fi network first, then:
//! ```sh
//! RUST_LOG=info cargo run --example scripted_flight
//! ```

use tello_io::{AppConfig, Tello};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let config = AppConfig::tello_defaults();
    let drone = Tello::connect(&config)?;

    drone.enter_sdk_mode()?;
    drone.take_off()?;

    drone.move_forward(50)?;

    drone.land()?;

    log::info!("Flight complete");
    Ok(())
}
