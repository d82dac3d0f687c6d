//! Read telemetry values without leaving the ground
//!
//! ```sh
//! RUST_LOG=info cargo run --example battery_check
//! ```

use tello_io::{AppConfig, Tello};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let config = AppConfig::tello_defaults();
    let drone = Tello::connect(&config)?;

    drone.enter_sdk_mode()?;

    println!("Battery:     {}%", drone.battery()?);
    println!("Temperature: {} C", drone.temperature()?);
    println!("Height:      {} cm", drone.height()?);

    Ok(())
}
