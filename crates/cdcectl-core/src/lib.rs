//! cdcectl-core - CDCE913 register encoding and chip control
//!
//! This crate knows how the CDCE913 programmable clock synthesizer lays out
//! its configuration registers and how high-level settings (output
//! dividers, crystal load capacitance, PLL ratio) translate into register
//! bytes. It does not know how those bytes reach the chip: that is the job
//! of a [`RegisterBus`] implementation such as the serial bridge in
//! `cdcectl-bridge`.
//!
//! The crate is `no_std` compatible.
//!
//! # Example
//!
//! ```ignore
//! use cdcectl_core::{Cdce913, RegisterBus, PowerControl};
//!
//! fn configure<B: RegisterBus + PowerControl>(bus: B) -> cdcectl_core::Result<()> {
//!     let mut chip = Cdce913::new(bus);
//!     chip.enable()?;
//!     // 20 MHz * 75 / 8 = 187.5 MHz
//!     chip.set_frequency_ratio(75, 8, false)?;
//!     chip.set_output_divider(3)?;
//!     Ok(())
//! }
//! ```

#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod bus;
pub mod chip;
pub mod error;
pub mod plan;
pub mod registers;

pub use bus::{PowerControl, RegisterBus};
pub use chip::{Cdce913, PowerState};
pub use error::{Error, Result};
pub use plan::{FrequencyPlan, PllFields, VcoRange};

/// Default I2C address of the CDCE913, as addressed by the bridge
pub const DEFAULT_ADDRESS: u8 = 0xCA;

/// Reference crystal frequency in Hz
pub const XTAL_HZ: u64 = 20_000_000;
