//! CLI argument parsing

use clap::{Parser, Subcommand, ValueEnum};

/// Parse a string as a hex or decimal integer
fn parse_hex_u32(s: &str) -> Result<u32, String> {
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16).map_err(|e| format!("Invalid hex value: {}", e))
    } else {
        s.parse::<u32>().map_err(|e| format!("Invalid number: {}", e))
    }
}

fn parse_hex_u8(s: &str) -> Result<u8, String> {
    let v = parse_hex_u32(s)?;
    u8::try_from(v).map_err(|_| format!("Value {} does not fit in a byte", s))
}

fn parse_hex_u16(s: &str) -> Result<u16, String> {
    let v = parse_hex_u32(s)?;
    u16::try_from(v).map_err(|_| format!("Value {} does not fit in 16 bits", s))
}

#[derive(Parser)]
#[command(name = "cdcectl")]
#[command(author, version, about = "CDCE913 clock synthesizer controller", long_about = None)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Bridge connection: dev=<port>[:baud][,timeout=<ms>], or "dummy" for
    /// the emulated bridge
    #[arg(short, long, global = true, default_value = "dev=/dev/ttyACM0")]
    pub bridge: String,

    /// I2C address of the CDCE913 as the bridge expects it
    #[arg(long, global = true, default_value = "0xca", value_parser = parse_hex_u8)]
    pub address: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// PLL routing
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum PllMode {
    /// Output through the PLL
    On,
    /// Bypass the PLL
    Off,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Power up the chip and initialize I2C
    Enable,

    /// Shut down I2C and power the chip down
    Disable,

    /// Set the Y1 output divider
    Divider {
        /// Divider (0-1023)
        #[arg(value_parser = parse_hex_u16)]
        divider: u16,
    },

    /// Set the Y2 output divider
    Y2div {
        /// Divider (1-127)
        #[arg(value_parser = parse_hex_u8)]
        divider: u8,
    },

    /// Set the Y3 output divider
    Y3div {
        /// Divider (1-127)
        #[arg(value_parser = parse_hex_u8)]
        divider: u8,
    },

    /// Set the crystal load capacitance
    Loadcap {
        /// Capacitance in pF (0-20)
        pf: u8,
    },

    /// Route the output through the PLL or bypass it
    Pll {
        #[arg(value_enum)]
        mode: PllMode,
    },

    /// Program the PLL to XTAL * NUMERATOR / DENOMINATOR
    Ratio {
        /// PLL numerator N (1-4095)
        numerator: u16,

        /// PLL denominator M (1-256)
        denominator: u16,

        /// Allow frequencies outside 80-230 MHz
        #[arg(long)]
        force: bool,
    },

    /// Show the PLL configuration currently in the chip
    Plan,

    /// Read registers
    Read {
        /// First register (hex or decimal)
        #[arg(value_parser = parse_hex_u8)]
        offset: u8,

        /// Number of registers
        #[arg(short, long, default_value_t = 1)]
        count: usize,
    },

    /// Write registers in one burst
    Write {
        /// First register (hex or decimal)
        #[arg(value_parser = parse_hex_u8)]
        offset: u8,

        /// Values (hex or decimal)
        #[arg(required = true, value_parser = parse_hex_u8)]
        values: Vec<u8>,
    },

    /// Read all configuration registers
    Dump,

    /// Send a raw line to the bridge console and print the response
    Raw {
        /// Command line, quoted
        line: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_values() {
        assert_eq!(parse_hex_u8("0xca"), Ok(0xca));
        assert_eq!(parse_hex_u8("202"), Ok(202));
        assert!(parse_hex_u8("0x100").is_err());
        assert_eq!(parse_hex_u16("0x3ff"), Ok(1023));
        assert!(parse_hex_u16("ten").is_err());
    }

    #[test]
    fn test_cli_ratio() {
        let cli = Cli::try_parse_from(["cdcectl", "-b", "dummy", "ratio", "75", "8", "--force"])
            .unwrap();
        assert_eq!(cli.bridge, "dummy");
        assert_eq!(cli.address, 0xca);
        assert!(matches!(
            cli.command,
            Commands::Ratio {
                numerator: 75,
                denominator: 8,
                force: true
            }
        ));
    }

    #[test]
    fn test_cli_write_needs_values() {
        assert!(Cli::try_parse_from(["cdcectl", "write", "0x05"]).is_err());
        let cli = Cli::try_parse_from(["cdcectl", "write", "0x02", "0xb4", "3"]).unwrap();
        match cli.command {
            Commands::Write { offset, values } => {
                assert_eq!(offset, 2);
                assert_eq!(values, [0xb4, 3]);
            }
            _ => panic!("expected write"),
        }
    }
}
