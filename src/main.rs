//! tello-io - interactive command-line client for the Tello quadcopter
//!
//! Reads SDK command lines from stdin, forwards each to the device verbatim,
//! and prints the reply. State telemetry is printed as it arrives on its own
//! port. `exit` lands the drone and quits.

use std::env;
use std::io::{self, BufRead};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tello_io::config::AppConfig;
use tello_io::{Error, Result, Tello};

/// Parse config path from command line arguments.
///
/// Supports:
/// - `tello-io <path>` (positional)
/// - `tello-io --config <path>` (flag-based)
/// - `tello-io -c <path>` (short flag)
///
/// Returns `None` when no path was given; the built-in Tello defaults apply.
fn parse_config_path() -> Option<String> {
    let args: Vec<String> = env::args().collect();

    // Look for --config or -c flag
    for i in 1..args.len() {
        if (args[i] == "--config" || args[i] == "-c") && i + 1 < args.len() {
            return Some(args[i + 1].clone());
        }
    }

    // Fall back to first positional argument (if it doesn't start with -)
    if args.len() > 1 && !args[1].starts_with('-') {
        return Some(args[1].clone());
    }

    None
}

fn main() -> Result<()> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("tello-io starting...");

    // Load configuration, or fall back to the factory device addresses
    let config = match parse_config_path() {
        Some(path) => {
            log::info!("Using config: {}", path);
            AppConfig::from_file(&path)?
        }
        None => AppConfig::tello_defaults(),
    };

    let mut drone = Tello::connect(&config)?;

    // Set up shutdown signal handler
    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);

    ctrlc::set_handler(move || {
        log::info!("Received shutdown signal");
        r.store(false, Ordering::Relaxed);
    })
    .map_err(|e| Error::Other(format!("Error setting Ctrl-C handler: {}", e)))?;

    // Print state pushes as they arrive
    drone.start_telemetry(|state| println!("Tello state: {}", state))?;

    println!("Connected to {}. Enter SDK commands (`command` first);", config.device.address);
    println!("`exit` lands the drone and quits.");

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        if !running.load(Ordering::Relaxed) {
            break;
        }

        let line = line?;
        let command = line.trim();
        if command.is_empty() {
            continue;
        }

        if command == "exit" {
            println!("Landing...");
            if let Err(e) = drone.land() {
                log::error!("Landing failed: {}", e);
            }
            break;
        }

        // Forward the raw line; the reply is whatever the device says
        match drone.send_raw(command) {
            Ok(reply) => println!("Tello response: {}", reply),
            Err(e) => println!("Command failed: {}", e),
        }
    }

    log::info!("tello-io stopped");
    Ok(())
}
