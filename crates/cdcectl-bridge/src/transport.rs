//! Transport layer abstraction for the bridge console
//!
//! The console only needs a byte stream: write whole command lines, read
//! back one byte at a time until the prompt shows up.

use crate::error::{BridgeError, Result};

/// Transport trait for reading and writing bytes
pub trait Transport {
    /// Write bytes to the transport
    fn write(&mut self, data: &[u8]) -> Result<()>;

    /// Read a single byte
    ///
    /// Returns [`BridgeError::Timeout`] if nothing arrives before the
    /// transport's read deadline.
    fn read_byte(&mut self) -> Result<u8>;

    /// Flush any buffered data
    fn flush(&mut self) -> Result<()>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn write(&mut self, data: &[u8]) -> Result<()> {
        (**self).write(data)
    }

    fn read_byte(&mut self) -> Result<u8> {
        (**self).read_byte()
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }
}

pub mod serial {
    //! Serial port transport implementation

    use super::*;
    use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};
    use std::io::{Read, Write};
    use std::time::Duration;

    /// Baud rate used when none is given
    pub const DEFAULT_BAUD: u32 = 115200;

    /// Read deadline used when none is given
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);

    /// Serial port transport
    pub struct SerialTransport {
        port: Box<dyn SerialPort>,
    }

    impl SerialTransport {
        /// Open a serial port
        ///
        /// `timeout` bounds every single-byte read. A bridge that stays
        /// silent for longer is treated as lost.
        pub fn open(device: &str, baud: Option<u32>, timeout: Duration) -> Result<Self> {
            let baud_rate = baud.unwrap_or(DEFAULT_BAUD);

            let port = serialport::new(device, baud_rate)
                .data_bits(DataBits::Eight)
                .parity(Parity::None)
                .stop_bits(StopBits::One)
                .flow_control(FlowControl::None)
                .timeout(timeout)
                .open()?;

            log::info!(
                "Opened serial port {} at {} baud ({} ms timeout)",
                device,
                baud_rate,
                timeout.as_millis()
            );

            Ok(Self { port })
        }
    }

    impl Transport for SerialTransport {
        fn write(&mut self, data: &[u8]) -> Result<()> {
            self.port.write_all(data)?;
            Ok(())
        }

        fn read_byte(&mut self) -> Result<u8> {
            let mut c = [0u8];
            match self.port.read(&mut c) {
                Ok(1) => Ok(c[0]),
                Ok(_) => Err(BridgeError::Timeout),
                Err(e) => Err(BridgeError::from(e)),
            }
        }

        fn flush(&mut self) -> Result<()> {
            self.port.flush()?;
            Ok(())
        }
    }
}
