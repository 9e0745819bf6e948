//! CLI command implementations
//!
//! Chip settings go through [`Cdce913`] so they get its validation and
//! encoding. Raw register access and console passthrough go straight to
//! the [`Bridge`] so errors keep their full detail.

use crate::cli::{Commands, PllMode};
use cdcectl_bridge::{Bridge, BridgeError, Transport};
use cdcectl_core::plan::PllFields;
use cdcectl_core::Cdce913;
use thiserror::Error;

/// Number of configuration registers shown by `dump`
const DUMP_LEN: usize = 0x20;

/// Error from a CLI command
#[derive(Debug, Error)]
pub enum CommandError {
    /// Chip-level failure
    #[error("{0}")]
    Chip(#[from] cdcectl_core::Error),

    /// Bridge-level failure
    #[error("{0}")]
    Bridge(#[from] BridgeError),
}

/// Run one command against the chip
pub fn run<T: Transport>(
    chip: &mut Cdce913<Bridge<T>>,
    command: Commands,
) -> Result<(), CommandError> {
    match command {
        Commands::Enable => chip.enable()?,
        Commands::Disable => chip.disable()?,
        Commands::Divider { divider } => {
            chip.set_output_divider(divider)?;
            println!("Y1 divider set to {}", divider);
        }
        Commands::Y2div { divider } => {
            chip.set_y2_divider(divider)?;
            println!("Y2 divider set to {}", divider);
        }
        Commands::Y3div { divider } => {
            chip.set_y3_divider(divider)?;
            println!("Y3 divider set to {}", divider);
        }
        Commands::Loadcap { pf } => {
            chip.set_load_capacitance(pf)?;
            println!("Load capacitance set to {} pF", pf);
        }
        Commands::Pll { mode } => {
            chip.use_pll(mode == PllMode::On)?;
            match mode {
                PllMode::On => println!("PLL enabled"),
                PllMode::Off => println!("PLL bypassed"),
            }
        }
        Commands::Ratio {
            numerator,
            denominator,
            force,
        } => {
            let plan = chip.set_frequency_ratio(numerator, denominator, force)?;
            print_fields(&plan.fields());
            println!("Frequency: {} Hz", plan.frequency_hz());
        }
        Commands::Plan => {
            let fields = chip.read_frequency_plan()?;
            print_fields(&fields);
        }
        Commands::Read { offset, count } => {
            let address = chip.address();
            let values = chip.bus_mut().read_range(offset, count, address)?;
            print_registers(offset, &values);
        }
        Commands::Write { offset, values } => {
            let address = chip.address();
            chip.bus_mut().i2c_write(offset, &values, address)?;
            println!("Wrote {} register(s) at 0x{:02x}", values.len(), offset);
        }
        Commands::Dump => {
            let address = chip.address();
            let values = chip.bus_mut().read_range(0, DUMP_LEN, address)?;
            print_registers(0, &values);
        }
        Commands::Raw { line } => {
            for response in chip.bus_mut().issue(&line)? {
                println!("{}", response);
            }
        }
    }
    Ok(())
}

fn print_fields(fields: &PllFields) {
    println!(
        "N = {}, P = {}, Q = {}, R = {}, FRANGE = {} ({:?})",
        fields.n,
        fields.p,
        fields.q,
        fields.r,
        fields.range.code(),
        fields.range
    );
}

fn print_registers(offset: u8, values: &[u8]) {
    for (i, chunk) in values.chunks(8).enumerate() {
        let line: Vec<String> = chunk.iter().map(|v| format!("{:02x}", v)).collect();
        println!("{:02x}: {}", offset as usize + i * 8, line.join(" "));
    }
}
