//! Bridge console command language
//!
//! The bridge is an XMEGA running a small shell. Every command is a single
//! ASCII line; hex arguments are written as two lowercase digits with a
//! `0x` prefix. The commands used here:
//!
//! ```text
//! port <p> outclr|outset|dirclr|dirset 0x<pins>
//! twic en <baud>
//! twic dis
//! twic tx 0x<addr> T 0x<byte> [0x<byte> ...]
//! twic tx 0x<addr> T 0x<reg|0x80> R 1
//! ```

use crate::error::{BridgeError, Result};
use bitflags::bitflags;
use core::fmt;

/// I2C bus clock used when powering up
pub const DEFAULT_I2C_BAUD: u32 = 100_000;

/// Set on the register byte of a read request
pub const READ_FLAG: u8 = 0x80;

/// Command that shuts the I2C peripheral down
pub const TWI_DISABLE: &str = "twic dis";

/// XMEGA GPIO port
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Port {
    A,
    B,
    C,
    D,
    E,
    R,
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::A => "a",
            Self::B => "b",
            Self::C => "c",
            Self::D => "d",
            Self::E => "e",
            Self::R => "r",
        };
        f.write_str(name)
    }
}

/// Port register operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortOp {
    /// Drive pins low
    OutClr,
    /// Drive pins high
    OutSet,
    /// Make pins inputs
    DirClr,
    /// Make pins outputs
    DirSet,
}

impl fmt::Display for PortOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::OutClr => "outclr",
            Self::OutSet => "outset",
            Self::DirClr => "dirclr",
            Self::DirSet => "dirset",
        };
        f.write_str(name)
    }
}

bitflags! {
    /// Pin mask within one port
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Pins: u8 {
        const PIN0 = 1 << 0;
        const PIN1 = 1 << 1;
        const PIN2 = 1 << 2;
        const PIN3 = 1 << 3;
        const PIN4 = 1 << 4;
        const PIN5 = 1 << 5;
        const PIN6 = 1 << 6;
        const PIN7 = 1 << 7;
    }
}

/// Board wiring between the bridge and the CDCE913
pub mod board {
    use super::{Pins, Port};

    /// Gate of the FET pulling S0 down
    pub const S0_GATE: (Port, Pins) = (Port::C, Pins::PIN2);

    /// CDCE913 supply pins
    pub const CHIP_SUPPLY: (Port, Pins) = (
        Port::B,
        Pins::PIN1
            .union(Pins::PIN3)
            .union(Pins::PIN4)
            .union(Pins::PIN5)
            .union(Pins::PIN6)
            .union(Pins::PIN7),
    );

    /// I2C pull-up supply
    pub const I2C_PULLUP: (Port, Pins) = (Port::C, Pins::PIN7);
}

/// `port <p> <op> 0x<pins>`
pub fn port_command(port: Port, op: PortOp, pins: Pins) -> String {
    format!("port {} {} 0x{:02x}", port, op, pins.bits())
}

/// `twic en <baud>`
pub fn twi_enable_command(baud: u32) -> String {
    format!("twic en {}", baud)
}

/// `twic tx 0x<addr> T 0x<b0> 0x<b1> ...`
pub fn twi_transmit_command(address: u8, bytes: &[u8]) -> String {
    let mut cmd = format!("twic tx 0x{:02x} T", address);
    for b in bytes {
        cmd.push_str(&format!(" 0x{:02x}", b));
    }
    cmd
}

/// `twic tx 0x<addr> T 0x<reg|0x80> R 1`
pub fn twi_read_command(address: u8, offset: u8) -> String {
    format!(
        "twic tx 0x{:02x} T 0x{:02x} R 1",
        address,
        READ_FLAG | offset
    )
}

/// Payload of a register write burst: `[offset, len, values...]`
pub fn register_write_payload(offset: u8, values: &[u8]) -> Result<Vec<u8>> {
    if values.is_empty() {
        return Err(BridgeError::InvalidParameter(
            "register write needs at least one value".into(),
        ));
    }
    let len = u8::try_from(values.len()).map_err(|_| {
        BridgeError::InvalidParameter(format!(
            "register write of {} bytes exceeds 255",
            values.len()
        ))
    })?;

    let mut payload = Vec::with_capacity(values.len() + 2);
    payload.push(offset);
    payload.push(len);
    payload.extend_from_slice(values);
    Ok(payload)
}

/// Parse a response line holding one hex byte (`0x2a`, `2A`, ...)
pub fn parse_hex_byte(line: &str) -> Result<u8> {
    let trimmed = line.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);

    if digits.is_empty() || digits.len() > 2 || !digits.chars().all(|c| c.is_ascii_hexdigit())
    {
        return Err(BridgeError::InvalidHexByte(line.to_string()));
    }
    u8::from_str_radix(digits, 16).map_err(|_| BridgeError::InvalidHexByte(line.to_string()))
}
