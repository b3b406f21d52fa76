//! SetuIO - SLIP/OSC bridge daemon
//!
//! Reads SLIP-framed OSC datagrams from a serial device and forwards them
//! to the configured UDP destinations; datagrams queued for the device go
//! out over the same link.

use setu_io::{AppConfig, BridgeApp, Result};
use std::env;

/// Parse config path from command line arguments.
///
/// Supports:
/// - `setu-io <path>` (positional)
/// - `setu-io --config <path>` (flag-based)
/// - `setu-io -c <path>` (short flag)
///
/// Defaults to `/etc/setu.toml` if not specified.
fn parse_config_path() -> String {
    let args: Vec<String> = env::args().collect();

    // Look for --config or -c flag
    for i in 1..args.len() {
        if (args[i] == "--config" || args[i] == "-c") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }

    // Fall back to first positional argument (if it doesn't start with -)
    if args.len() > 1 && !args[1].starts_with('-') {
        return args[1].clone();
    }

    // Default path
    "/etc/setu.toml".to_string()
}

fn main() -> Result<()> {
    let config_path = parse_config_path();
    let config = AppConfig::from_file(&config_path)?;

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.logging.level.as_str()),
    )
    .init();

    log::info!("SetuIO starting (config: {})", config_path);
    log::info!(
        "Serial: {} @ {} baud, {} UDP destination(s)",
        config.serial.port,
        config.serial.baud_rate,
        config.destinations.len()
    );

    BridgeApp::new(config)?.run()
}
