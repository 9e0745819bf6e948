//! cdcectl-dummy - Emulated bridge console for testing
//!
//! This crate provides a [`Transport`] that behaves like the XMEGA bridge
//! shell with a CDCE913 attached. Commands written to it are echoed,
//! executed against an in-memory register file and GPIO state, and
//! answered with a prompt. It's useful for testing and development without
//! real hardware.

use cdcectl_bridge::error::{BridgeError, Result};
use cdcectl_bridge::Transport;
use std::collections::VecDeque;

/// Number of emulated registers
pub const REGISTER_COUNT: usize = 32;

/// Pins on port B feeding the chip supply
const SUPPLY_PINS: u8 = 0xfa;
/// Pin on port C feeding the I2C pull-ups
const PULLUP_PIN: u8 = 0x80;

/// Configuration for the dummy bridge
#[derive(Debug, Clone)]
pub struct DummyConfig {
    /// I2C address the emulated chip answers on
    pub address: u8,
    /// Register contents at power-on
    pub registers: [u8; REGISTER_COUNT],
    /// Start with the chip already powered and I2C enabled
    pub powered: bool,
}

impl Default for DummyConfig {
    fn default() -> Self {
        let mut registers = [0u8; REGISTER_COUNT];
        registers[0x00] = 0x81; // device ID, revision 1
        registers[0x02] = 0xb4;
        registers[0x03] = 0x01;
        registers[0x05] = 0x50;
        registers[0x14] = 0x6d;
        registers[0x16] = 0x02;
        registers[0x17] = 0x02;
        Self {
            address: 0xca,
            registers,
            powered: false,
        }
    }
}

/// GPIO port state (output and direction registers)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PortState {
    /// OUT register
    pub out: u8,
    /// DIR register (1 = output)
    pub dir: u8,
}

impl PortState {
    fn driven_high(&self, mask: u8) -> bool {
        self.out & self.dir & mask == mask
    }
}

/// Emulated bridge with a CDCE913 behind it
pub struct DummyBridge {
    config: DummyConfig,
    registers: [u8; REGISTER_COUNT],
    port_b: PortState,
    port_c: PortState,
    twi_baud: Option<u32>,
    line: Vec<u8>,
    rx: VecDeque<u8>,
    history: Vec<String>,
}

impl DummyBridge {
    /// Create a new dummy bridge with the given configuration
    pub fn new(config: DummyConfig) -> Self {
        let registers = config.registers;
        let mut dummy = Self {
            config,
            registers,
            port_b: PortState::default(),
            port_c: PortState::default(),
            twi_baud: None,
            line: Vec::new(),
            rx: VecDeque::new(),
            history: Vec::new(),
        };
        if dummy.config.powered {
            dummy.port_b = PortState {
                out: SUPPLY_PINS,
                dir: SUPPLY_PINS,
            };
            dummy.port_c = PortState {
                out: PULLUP_PIN,
                dir: PULLUP_PIN | 0x04,
            };
            dummy.twi_baud = Some(100_000);
        }
        dummy
    }

    /// Create a new dummy bridge with default configuration
    pub fn new_default() -> Self {
        Self::new(DummyConfig::default())
    }

    /// Current value of an emulated register
    ///
    /// Panics if `offset` is past [`REGISTER_COUNT`].
    pub fn register(&self, offset: u8) -> u8 {
        self.registers[offset as usize]
    }

    /// Port B state
    pub fn port_b(&self) -> PortState {
        self.port_b
    }

    /// Port C state
    pub fn port_c(&self) -> PortState {
        self.port_c
    }

    /// I2C clock if the bus is enabled
    pub fn twi_baud(&self) -> Option<u32> {
        self.twi_baud
    }

    /// Every command line received so far
    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// Whether the chip has supply, pull-ups and an enabled bus
    pub fn chip_reachable(&self) -> bool {
        self.twi_baud.is_some()
            && self.port_b.driven_high(SUPPLY_PINS)
            && self.port_c.driven_high(PULLUP_PIN)
    }

    fn handle_line(&mut self, line: &str) {
        log::trace!("dummy: {}", line);
        self.history.push(line.to_string());

        let response = self.execute(line);

        self.rx.extend(line.bytes());
        self.rx.extend(b"\r\n");
        for out in response {
            self.rx.extend(out.bytes());
            self.rx.extend(b"\r\n");
        }
        self.rx.extend(b"% ");
    }

    fn execute(&mut self, line: &str) -> Vec<String> {
        let args: Vec<&str> = line.split_whitespace().collect();
        match args.as_slice() {
            [] => Vec::new(),
            ["port", port, op, mask] => self.port_op(port, op, mask),
            ["twic", "en", baud] => match baud.parse() {
                Ok(baud) => {
                    self.twi_baud = Some(baud);
                    Vec::new()
                }
                Err(_) => vec![format!("bad baud rate: {}", baud)],
            },
            ["twic", "dis"] => {
                self.twi_baud = None;
                Vec::new()
            }
            ["twic", "tx", rest @ ..] => self.twi_tx(rest),
            _ => vec![format!("unknown command: {}", line)],
        }
    }

    fn port_op(&mut self, port: &str, op: &str, mask: &str) -> Vec<String> {
        let Some(mask) = parse_hex(mask) else {
            return vec![format!("bad mask: {}", mask)];
        };
        let state = match port {
            "b" => &mut self.port_b,
            "c" => &mut self.port_c,
            // Other ports exist on the bridge but nothing is wired to them
            "a" | "d" | "e" | "r" => return Vec::new(),
            _ => return vec![format!("bad port: {}", port)],
        };
        match op {
            "outclr" => state.out &= !mask,
            "outset" => state.out |= mask,
            "dirclr" => state.dir &= !mask,
            "dirset" => state.dir |= mask,
            _ => return vec![format!("bad port op: {}", op)],
        }
        Vec::new()
    }

    fn twi_tx(&mut self, args: &[&str]) -> Vec<String> {
        let nack = || vec!["NACK".to_string()];

        let Some((address, rest)) = args.split_first() else {
            return nack();
        };
        let Some(address) = parse_hex(address) else {
            return nack();
        };
        let Some(("T", rest)) = rest.split_first().map(|(t, r)| (*t, r)) else {
            return nack();
        };

        let (tx, rx_len) = match rest.iter().position(|a| *a == "R") {
            Some(pos) => {
                let Some(n) = rest.get(pos + 1).and_then(|n| n.parse::<usize>().ok()) else {
                    return nack();
                };
                (&rest[..pos], Some(n))
            }
            None => (rest, None),
        };
        let Some(bytes) = tx.iter().map(|b| parse_hex(b)).collect::<Option<Vec<u8>>>() else {
            return nack();
        };

        if !self.chip_reachable() || address != self.config.address || bytes.is_empty() {
            return nack();
        }

        match rx_len {
            Some(n) => self.register_read(bytes[0], n),
            None => self.register_write(&bytes),
        }
    }

    fn register_read(&self, cmd: u8, n: usize) -> Vec<String> {
        if cmd & 0x80 == 0 {
            return vec!["NACK".to_string()];
        }
        let offset = (cmd & 0x7f) as usize;
        let mut out = vec!["OK".to_string()];
        for i in 0..n {
            // The real chip corrupts everything past the first byte of a
            // block read
            let value = match self.registers.get(offset + i) {
                Some(v) if i == 0 => *v,
                _ => 0xff,
            };
            out.push(format!("0x{:02x}", value));
        }
        out
    }

    fn register_write(&mut self, bytes: &[u8]) -> Vec<String> {
        let [offset, len, values @ ..] = bytes else {
            return vec!["NACK".to_string()];
        };
        let offset = *offset as usize;
        if *len as usize != values.len() || offset + values.len() > REGISTER_COUNT {
            return vec!["NACK".to_string()];
        }
        self.registers[offset..offset + values.len()].copy_from_slice(values);
        vec!["OK".to_string()]
    }
}

impl Transport for DummyBridge {
    fn write(&mut self, data: &[u8]) -> Result<()> {
        for &c in data {
            if c == b'\r' {
                let line = std::mem::take(&mut self.line);
                let line = String::from_utf8(line)
                    .map_err(|_| BridgeError::IoError("non-ASCII command".into()))?;
                self.handle_line(&line);
            } else {
                self.line.push(c);
            }
        }
        Ok(())
    }

    fn read_byte(&mut self) -> Result<u8> {
        self.rx.pop_front().ok_or(BridgeError::Timeout)
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

fn parse_hex(s: &str) -> Option<u8> {
    let digits = s.strip_prefix("0x")?;
    u8::from_str_radix(digits, 16).ok()
}
