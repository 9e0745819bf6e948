//! cdcectl-bridge - serial console bridge support
//!
//! This crate talks to the XMEGA bridge that sits between the host and the
//! CDCE913. The bridge exposes a line-oriented shell on a serial port: the
//! host types a command, the bridge echoes it, performs the I2C or GPIO
//! operation, prints any result lines and finally a `"\r\n% "` prompt.
//!
//! # Layers
//!
//! - [`framer`]: sends command lines and reads everything up to the prompt
//! - [`protocol`]: builds bridge commands and parses their results
//! - [`device`]: the [`Bridge`] session with echo stripping, single-byte
//!   register reads, burst register writes and board power sequencing. It
//!   implements [`RegisterBus`](cdcectl_core::RegisterBus) and
//!   [`PowerControl`](cdcectl_core::PowerControl).
//!
//! # Example
//!
//! ```no_run
//! use cdcectl_bridge::{Bridge, BridgeConnection};
//! use cdcectl_core::Cdce913;
//!
//! let conn = BridgeConnection::parse("dev=/dev/ttyACM0")?;
//! let mut chip = Cdce913::new(Bridge::new(conn.open_transport()?));
//! chip.enable()?;
//! chip.set_frequency_ratio(75, 8, false)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod device;
pub mod error;
pub mod framer;
pub mod protocol;
pub mod transport;

#[cfg(test)]
mod mock;

// Re-exports
pub use device::Bridge;
pub use error::{BridgeError, Result};
pub use framer::{Framer, MAX_RESPONSE_LEN, PROMPT};
pub use transport::serial::SerialTransport;
pub use transport::Transport;

use std::time::Duration;
use transport::serial::DEFAULT_TIMEOUT;

/// Connection options for the bridge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeConnection {
    /// Device path (e.g., "/dev/ttyACM0" or "COM3")
    pub device: String,
    /// Baud rate (None for the default)
    pub baud: Option<u32>,
    /// Read deadline for a single byte
    pub timeout: Duration,
}

impl BridgeConnection {
    /// Parse a connection string
    ///
    /// Formats:
    /// - `dev=/dev/ttyACM0` - serial with default baud and timeout
    /// - `dev=/dev/ttyACM0:115200` - serial with specified baud
    /// - `dev=/dev/ttyACM0,timeout=2000` - read timeout in milliseconds
    pub fn parse(s: &str) -> std::result::Result<Self, String> {
        let mut parts = s.split(',');
        let first = parts.next().unwrap_or_default();

        let dev = first.strip_prefix("dev=").ok_or_else(|| {
            format!(
                "Invalid bridge connection string: {}. Use dev=<port>[:baud][,timeout=<ms>]",
                s
            )
        })?;

        let (device, baud) = match dev.rsplit_once(':') {
            Some((device, baud_str)) => {
                let baud = baud_str
                    .parse()
                    .map_err(|_| format!("Invalid baud rate: {}", baud_str))?;
                (device, Some(baud))
            }
            None => (dev, None),
        };
        if device.is_empty() {
            return Err("Missing device path in dev= parameter".to_string());
        }

        let mut timeout = DEFAULT_TIMEOUT;
        for opt in parts {
            match opt.split_once('=') {
                Some(("timeout", ms)) => {
                    let ms: u64 = ms
                        .parse()
                        .map_err(|_| format!("Invalid timeout: {}", ms))?;
                    if ms == 0 {
                        return Err("Timeout must be at least 1 ms".to_string());
                    }
                    timeout = Duration::from_millis(ms);
                }
                Some((key, _)) => return Err(format!("Unknown bridge parameter: {}", key)),
                None => {
                    return Err(format!(
                        "Invalid parameter format: '{}' (expected key=value)",
                        opt
                    ))
                }
            }
        }

        Ok(BridgeConnection {
            device: device.to_string(),
            baud,
            timeout,
        })
    }

    /// Open the serial port with these options
    pub fn open_transport(&self) -> Result<SerialTransport> {
        SerialTransport::open(&self.device, self.baud, self.timeout)
    }
}
