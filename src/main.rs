//! aqlink - run one acquisition against a tag-prefixed serial board
//!
//! Loads the TOML config, opens the board's serial port, sends the
//! acquisition command, and streams classified response lines to the log
//! until the device delivers data or reports a fault. Ctrl-C interrupts a
//! blocking read or settle delay cleanly.

use aqlink::board::BoardDriver;
use aqlink::config::AppConfig;
use aqlink::error::{Error, Result};
use std::env;
use std::path::Path;
use std::sync::atomic::Ordering;

/// Default config path when none is given on the command line
const DEFAULT_CONFIG_PATH: &str = "/etc/aqlink.toml";

/// Parsed command line options
struct CliArgs {
    config_path: String,
    config_explicit: bool,
    port: Option<String>,
}

/// Parse command line arguments.
///
/// Supports:
/// - `aqlink <path>` (positional config path)
/// - `aqlink --config <path>` / `aqlink -c <path>`
/// - `aqlink --port <dev>` / `aqlink -p <dev>` (overrides the configured port)
///
/// Defaults to `/etc/aqlink.toml` if no config path is specified.
fn parse_args() -> CliArgs {
    let args: Vec<String> = env::args().collect();
    let mut cli = CliArgs {
        config_path: DEFAULT_CONFIG_PATH.to_string(),
        config_explicit: false,
        port: None,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" | "-c" if i + 1 < args.len() => {
                cli.config_path = args[i + 1].clone();
                cli.config_explicit = true;
                i += 2;
            }
            "--port" | "-p" if i + 1 < args.len() => {
                cli.port = Some(args[i + 1].clone());
                i += 2;
            }
            arg if !arg.starts_with('-') => {
                cli.config_path = arg.to_string();
                cli.config_explicit = true;
                i += 1;
            }
            _ => {
                i += 1;
            }
        }
    }

    cli
}

fn main() -> Result<()> {
    let args = parse_args();

    // Config comes first so its log level can seed the logger. An explicit
    // path must load; the default path may be absent on a fresh machine.
    let config = if args.config_explicit || Path::new(&args.config_path).exists() {
        AppConfig::from_file(&args.config_path)?
    } else {
        eprintln!("Config {} not found, using defaults", args.config_path);
        AppConfig::default()
    };

    // Initialize logger (RUST_LOG overrides the configured level)
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.logging.level.clone()),
    )
    .init();

    log::info!("aqlink v{} starting", env!("CARGO_PKG_VERSION"));

    let mut device = config.device.clone();
    if let Some(port) = args.port {
        device.port = port;
    }
    log::info!("Board: {} on {}", device.board, device.port);

    let mut driver = BoardDriver::from_config(&device)?;
    log::info!("Device open: {}", driver.is_open());

    // Ctrl-C raises the link's cancellation flag, so a blocking read or a
    // settle delay ends with Error::Cancelled instead of hanging
    let cancel = driver.cancel_handle();
    ctrlc::set_handler(move || {
        log::info!("Received shutdown signal");
        cancel.store(true, Ordering::Relaxed);
    })
    .map_err(|e| Error::Other(format!("Error setting Ctrl-C handler: {}", e)))?;

    driver.start_acquisition()?;

    log::info!("aqlink done");
    Ok(())
}
