//! cdcectl - CDCE913 clock synthesizer controller
//!
//! Drives a CDCE913 through the XMEGA bridge console: board power
//! sequencing, output dividers, crystal load capacitance and PLL
//! frequency programming.

mod cli;
mod commands;

use cdcectl_bridge::{Bridge, BridgeConnection, Transport};
use cdcectl_core::Cdce913;
use clap::Parser;
use cli::Cli;

/// Open the transport named by a bridge connection string
fn open_transport(conn: &str) -> Result<Box<dyn Transport>, Box<dyn std::error::Error>> {
    #[cfg(feature = "dummy")]
    if conn == "dummy" {
        use cdcectl_dummy::{DummyBridge, DummyConfig};
        log::info!("Using emulated bridge");
        return Ok(Box::new(DummyBridge::new(DummyConfig {
            powered: true,
            ..Default::default()
        })));
    }

    let conn = BridgeConnection::parse(conn)?;
    log::info!("Opening bridge on {}", conn.device);
    Ok(Box::new(conn.open_transport()?))
}

/// Default log filter for a `-v` count
fn log_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(log_filter(cli.verbose)),
    )
    .init();

    let transport = open_transport(&cli.bridge)?;
    let mut chip = Cdce913::with_address(Bridge::new(transport), cli.address);

    if let Err(e) = commands::run(&mut chip, cli.command) {
        log::error!("{}", e);
        std::process::exit(1);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_filter_follows_verbosity() {
        assert_eq!(log_filter(0), "info");
        assert_eq!(log_filter(1), "debug");
        assert_eq!(log_filter(2), "trace");
        assert_eq!(log_filter(5), "trace");
    }

    #[test]
    fn test_verbose_flag_selects_debug() {
        let cli = Cli::try_parse_from(["cdcectl", "-v", "dump"]).unwrap();
        let logger = env_logger::Builder::new()
            .parse_filters(log_filter(cli.verbose))
            .build();
        assert_eq!(logger.filter(), log::LevelFilter::Debug);
    }

    #[test]
    fn test_open_transport_rejects_bad_connection() {
        assert!(open_transport("/dev/ttyACM0").is_err());
    }
}
