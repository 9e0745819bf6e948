//! Bridge device implementation
//!
//! This module provides the main `Bridge` struct: one console session on
//! one transport. It issues commands, strips their echo, and builds the I2C
//! register access and power sequencing of the CDCE913 board on top.

use crate::error::{BridgeError, Result};
use crate::framer::Framer;
use crate::protocol::*;
use crate::transport::Transport;

use cdcectl_core::error::Result as CoreResult;
use cdcectl_core::{PowerControl, RegisterBus};

/// Largest register offset (exclusive) reachable without colliding with
/// [`READ_FLAG`]
const REGISTER_SPACE: usize = READ_FLAG as usize;

/// Bridge console session
///
/// Holds the transport exclusively. Commands are strictly sequential: each
/// one is sent, then its response is read up to the prompt before anything
/// else happens.
pub struct Bridge<T: Transport> {
    framer: Framer<T>,
}

impl<T: Transport> Bridge<T> {
    /// Start a session on an open transport
    pub fn new(transport: T) -> Self {
        Self {
            framer: Framer::new(transport),
        }
    }

    /// Issue one command and return its response without the echo line
    pub fn issue(&mut self, command: &str) -> Result<Vec<String>> {
        log::debug!("bridge: > {}", command);
        self.framer.send(&[command])?;

        let mut lines = self.framer.receive()?;
        if lines.is_empty() {
            return Err(BridgeError::MissingEcho);
        }

        let echo = lines.remove(0);
        if echo.trim() != command {
            log::warn!("bridge: echo {:?} does not match {:?}", echo, command);
        }
        for line in &lines {
            log::trace!("bridge: < {}", line);
        }

        Ok(lines)
    }

    /// Manipulate GPIO pins on one port
    pub fn port(&mut self, port: Port, op: PortOp, pins: Pins) -> Result<()> {
        self.issue(&port_command(port, op, pins))?;
        Ok(())
    }

    /// Enable the I2C peripheral at `baud` Hz
    pub fn twi_enable(&mut self, baud: u32) -> Result<()> {
        self.issue(&twi_enable_command(baud))?;
        Ok(())
    }

    /// Disable the I2C peripheral
    pub fn twi_disable(&mut self) -> Result<()> {
        self.issue(TWI_DISABLE)?;
        Ok(())
    }

    /// Read register `offset` `count` times
    ///
    /// Every byte is fetched with its own single-byte transaction. The
    /// CDCE913 returns garbage on multi-byte reads.
    pub fn i2c_read(&mut self, offset: u8, count: usize, address: u8) -> Result<Vec<u8>> {
        let cmd = twi_read_command(address, offset);
        let mut values = Vec::with_capacity(count);
        for _ in 0..count {
            let lines = self.issue(&cmd)?;
            let line = lines
                .get(1)
                .ok_or_else(|| BridgeError::MissingResponseLine {
                    command: cmd.clone(),
                    index: 1,
                })?;
            values.push(parse_hex_byte(line)?);
        }
        Ok(values)
    }

    /// Read `count` consecutive registers starting at `offset`, one
    /// [`i2c_read`](Self::i2c_read) per register
    pub fn read_range(&mut self, offset: u8, count: usize, address: u8) -> Result<Vec<u8>> {
        if offset as usize + count > REGISTER_SPACE {
            return Err(BridgeError::InvalidParameter(format!(
                "read of {} registers at 0x{:02x} leaves the register space",
                count, offset
            )));
        }

        let mut values = Vec::with_capacity(count);
        for i in 0..count {
            values.extend(self.i2c_read(offset + i as u8, 1, address)?);
        }
        Ok(values)
    }

    /// Write `values` to consecutive registers starting at `offset` in a
    /// single transmit burst
    pub fn i2c_write(&mut self, offset: u8, values: &[u8], address: u8) -> Result<()> {
        let payload = register_write_payload(offset, values)?;
        self.issue(&twi_transmit_command(address, &payload))?;
        Ok(())
    }

    /// Power the CDCE913 and bring up I2C
    ///
    /// S0 is held low through its pulldown gate first, then the chip
    /// supply and the pull-ups are switched on, then the bus is enabled.
    pub fn power_up(&mut self) -> Result<()> {
        let (port, pins) = board::S0_GATE;
        self.port(port, PortOp::OutClr, pins)?;
        self.port(port, PortOp::DirSet, pins)?;

        let (port, pins) = board::CHIP_SUPPLY;
        self.port(port, PortOp::OutSet, pins)?;
        self.port(port, PortOp::DirSet, pins)?;

        let (port, pins) = board::I2C_PULLUP;
        self.port(port, PortOp::OutSet, pins)?;
        self.port(port, PortOp::DirSet, pins)?;

        self.twi_enable(DEFAULT_I2C_BAUD)
    }

    /// Shut I2C down and remove power in reverse order
    pub fn power_down(&mut self) -> Result<()> {
        self.twi_disable()?;

        let (port, pins) = board::I2C_PULLUP;
        self.port(port, PortOp::DirClr, pins)?;

        let (port, pins) = board::CHIP_SUPPLY;
        self.port(port, PortOp::DirClr, pins)
    }

    /// Borrow the transport
    pub fn transport_mut(&mut self) -> &mut T {
        self.framer.transport_mut()
    }

    /// End the session and release the transport
    pub fn into_transport(self) -> T {
        self.framer.into_inner()
    }
}

impl<T: Transport> RegisterBus for Bridge<T> {
    fn read_registers(&mut self, address: u8, offset: u8, buf: &mut [u8]) -> CoreResult<()> {
        let values = self.read_range(offset, buf.len(), address)?;
        buf.copy_from_slice(&values);
        Ok(())
    }

    fn write_registers(&mut self, address: u8, offset: u8, values: &[u8]) -> CoreResult<()> {
        self.i2c_write(offset, values, address)?;
        Ok(())
    }
}

impl<T: Transport> PowerControl for Bridge<T> {
    fn power_up(&mut self) -> CoreResult<()> {
        Bridge::power_up(self)?;
        Ok(())
    }

    fn power_down(&mut self) -> CoreResult<()> {
        Bridge::power_down(self)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockTransport;
    use cdcectl_core::{Cdce913, Error as CoreError, DEFAULT_ADDRESS};

    fn bridge_with(responses: &[&[&str]]) -> Bridge<MockTransport> {
        let mut mock = MockTransport::new();
        for lines in responses {
            mock.push_response(lines);
        }
        Bridge::new(mock)
    }

    #[test]
    fn test_issue_strips_echo() {
        let mut bridge = bridge_with(&[&["cmd", "0x2a"]]);
        assert_eq!(bridge.issue("cmd").unwrap(), ["0x2a"]);
        assert_eq!(bridge.into_transport().sent_lines(), ["cmd"]);
    }

    #[test]
    fn test_issue_without_echo_fails() {
        let mut bridge = bridge_with(&[&[]]);
        assert!(matches!(bridge.issue("cmd"), Err(BridgeError::MissingEcho)));
    }

    #[test]
    fn test_issue_echo_only() {
        let mut bridge = bridge_with(&[&["twic dis"]]);
        assert!(bridge.issue("twic dis").unwrap().is_empty());
    }

    #[test]
    fn test_i2c_read_repeats_same_register() {
        let mut bridge = bridge_with(&[
            &["twic tx 0xca T 0x94 R 1", "OK", "0x6d"],
            &["twic tx 0xca T 0x94 R 1", "OK", "0x6d"],
        ]);
        assert_eq!(bridge.i2c_read(0x14, 2, DEFAULT_ADDRESS).unwrap(), [0x6D, 0x6D]);
        assert_eq!(
            bridge.into_transport().sent_lines(),
            ["twic tx 0xca T 0x94 R 1", "twic tx 0xca T 0x94 R 1"]
        );
    }

    #[test]
    fn test_read_range_one_command_per_register() {
        let mut bridge = bridge_with(&[
            &["twic tx 0xca T 0x98 R 1", "OK", "0x04"],
            &["twic tx 0xca T 0x99 R 1", "OK", "0xb0"],
        ]);
        assert_eq!(bridge.read_range(0x18, 2, DEFAULT_ADDRESS).unwrap(), [0x04, 0xB0]);
        assert_eq!(
            bridge.into_transport().sent_lines(),
            ["twic tx 0xca T 0x98 R 1", "twic tx 0xca T 0x99 R 1"]
        );
    }

    #[test]
    fn test_i2c_read_same_register_twice() {
        let mut bridge = bridge_with(&[
            &["twic tx 0xca T 0x94 R 1", "OK", "0x6d"],
            &["twic tx 0xca T 0x94 R 1", "OK", "0x6d"],
        ]);
        let first = bridge.i2c_read(0x14, 1, DEFAULT_ADDRESS).unwrap();
        let second = bridge.i2c_read(0x14, 1, DEFAULT_ADDRESS).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_i2c_read_malformed_value() {
        let mut bridge = bridge_with(&[&["twic tx 0xca T 0x94 R 1", "OK", "NACK"]]);
        let err = bridge.i2c_read(0x14, 1, DEFAULT_ADDRESS).unwrap_err();
        assert!(matches!(err, BridgeError::InvalidHexByte(_)));
        assert_eq!(err.kind(), CoreError::ProtocolViolation);
    }

    #[test]
    fn test_i2c_read_missing_value_line() {
        let mut bridge = bridge_with(&[&["twic tx 0xca T 0x94 R 1", "OK"]]);
        assert!(matches!(
            bridge.i2c_read(0x14, 1, DEFAULT_ADDRESS),
            Err(BridgeError::MissingResponseLine { index: 1, .. })
        ));
    }

    #[test]
    fn test_read_range_outside_register_space() {
        let mut bridge = bridge_with(&[]);
        assert!(matches!(
            bridge.read_range(0x7F, 2, DEFAULT_ADDRESS),
            Err(BridgeError::InvalidParameter(_))
        ));
        assert!(bridge.into_transport().sent_lines().is_empty());
    }

    #[test]
    fn test_i2c_write_burst() {
        let mut bridge = bridge_with(&[&["twic tx 0xca T 0x02 0x02 0xb4 0x03"]]);
        bridge.i2c_write(0x02, &[0xB4, 0x03], DEFAULT_ADDRESS).unwrap();
        assert_eq!(
            bridge.into_transport().sent_lines(),
            ["twic tx 0xca T 0x02 0x02 0xb4 0x03"]
        );
    }

    #[test]
    fn test_i2c_write_empty_is_invalid() {
        let mut bridge = bridge_with(&[]);
        let err = bridge.i2c_write(0x02, &[], DEFAULT_ADDRESS).unwrap_err();
        assert_eq!(err.kind(), CoreError::InvalidArgument);
    }

    #[test]
    fn test_timeout_is_reported() {
        let mut bridge = bridge_with(&[]);
        let err = bridge.i2c_read(0x00, 1, DEFAULT_ADDRESS).unwrap_err();
        assert!(matches!(err, BridgeError::Timeout));
        assert_eq!(CoreError::from(err), CoreError::Timeout);
    }

    #[test]
    fn test_power_sequences() {
        let up = [
            "port c outclr 0x04",
            "port c dirset 0x04",
            "port b outset 0xfa",
            "port b dirset 0xfa",
            "port c outset 0x80",
            "port c dirset 0x80",
            "twic en 100000",
        ];
        let down = ["twic dis", "port c dirclr 0x80", "port b dirclr 0xfa"];

        let mut mock = MockTransport::new();
        for cmd in up.iter().chain(down.iter()) {
            mock.push_response(&[*cmd]);
        }
        let mut bridge = Bridge::new(mock);
        bridge.power_up().unwrap();
        bridge.power_down().unwrap();

        let sent = bridge.into_transport().sent_lines();
        assert_eq!(sent[..up.len()], up);
        assert_eq!(sent[up.len()..], down);
    }

    #[test]
    fn test_power_up_stops_at_first_failure() {
        let mut mock = MockTransport::new();
        mock.push_response(&["port c outclr 0x04"]);
        mock.push_response(&["port c dirset 0x04"]);
        let mut bridge = Bridge::new(mock);

        assert!(matches!(bridge.power_up(), Err(BridgeError::Timeout)));
        assert_eq!(bridge.into_transport().sent_lines().len(), 3);
    }

    #[test]
    fn test_chip_dump_walks_registers() {
        let mut bridge = bridge_with(&[
            &["twic tx 0xca T 0x82 R 1", "OK", "0xb4"],
            &["twic tx 0xca T 0x83 R 1", "OK", "0x01"],
        ]);
        let mut chip = Cdce913::new(&mut bridge);
        let mut regs = [0u8; 2];
        chip.dump_registers(0x02, &mut regs).unwrap();
        assert_eq!(regs, [0xB4, 0x01]);
    }

    #[test]
    fn test_chip_over_bridge() {
        let mut bridge = bridge_with(&[
            &["twic tx 0xca T 0x94 R 1", "OK", "0x6d"],
            &["twic tx 0xca T 0x14 0x01 0xed"],
        ]);
        let mut chip = Cdce913::new(&mut bridge);
        chip.use_pll(false).unwrap();
        assert_eq!(
            bridge.into_transport().sent_lines(),
            ["twic tx 0xca T 0x94 R 1", "twic tx 0xca T 0x14 0x01 0xed"]
        );
    }
}
