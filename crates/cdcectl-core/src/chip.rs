//! CDCE913 chip control
//!
//! [`Cdce913`] binds a bus to the chip's I2C address and exposes the
//! configuration operations. Each operation validates its input, encodes
//! the register bytes and hands them to the bus. Nothing is cached: every
//! read-modify-write reads the register fresh.

use crate::bus::{PowerControl, RegisterBus};
use crate::error::Result;
use crate::plan::{FrequencyPlan, PllFields};
use crate::registers::*;
use crate::DEFAULT_ADDRESS;

/// Power state as last driven through this handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PowerState {
    /// Supplies off (initial)
    #[default]
    Disabled,
    /// Supplies, pull-ups and bus up
    Enabled,
}

/// A CDCE913 behind a register bus
pub struct Cdce913<B> {
    bus: B,
    address: u8,
    power: PowerState,
}

impl<B> Cdce913<B> {
    /// Create a handle at the default address
    pub fn new(bus: B) -> Self {
        Self::with_address(bus, DEFAULT_ADDRESS)
    }

    /// Create a handle for a chip at a non-default address
    pub fn with_address(bus: B, address: u8) -> Self {
        Self {
            bus,
            address,
            power: PowerState::Disabled,
        }
    }

    /// I2C address used for every register access
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Last power state driven through this handle
    pub fn power_state(&self) -> PowerState {
        self.power
    }

    /// Borrow the underlying bus
    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    /// Release the underlying bus
    pub fn into_inner(self) -> B {
        self.bus
    }
}

impl<B: RegisterBus + PowerControl> Cdce913<B> {
    /// Power the chip and bring up the bus
    ///
    /// The state only changes to [`PowerState::Enabled`] once every step
    /// has succeeded.
    pub fn enable(&mut self) -> Result<()> {
        self.bus.power_up()?;
        self.power = PowerState::Enabled;
        log::info!("CDCE913 at 0x{:02x} powered up", self.address);
        Ok(())
    }

    /// Shut the bus down and remove power
    pub fn disable(&mut self) -> Result<()> {
        self.bus.power_down()?;
        self.power = PowerState::Disabled;
        log::info!("CDCE913 at 0x{:02x} powered down", self.address);
        Ok(())
    }
}

impl<B: RegisterBus> Cdce913<B> {
    /// Read one register
    pub fn read_register(&mut self, offset: u8) -> Result<u8> {
        let mut buf = [0u8];
        self.bus.read_registers(self.address, offset, &mut buf)?;
        Ok(buf[0])
    }

    /// Read consecutive registers starting at `offset` into `buf`
    pub fn dump_registers(&mut self, offset: u8, buf: &mut [u8]) -> Result<()> {
        self.bus.read_registers(self.address, offset, buf)
    }

    /// Write one register
    pub fn write_register(&mut self, offset: u8, value: u8) -> Result<()> {
        self.bus.write_registers(self.address, offset, &[value])
    }

    /// Set the Y1 output divider (0 to 1023)
    pub fn set_output_divider(&mut self, divider: u16) -> Result<()> {
        let regs = encode_y1_divider(divider)?;
        log::debug!("Y1 divider {} -> {:02x?}", divider, regs);
        self.bus.write_registers(self.address, Y1_DIV_HIGH, &regs)
    }

    /// Set the Y2 output divider (1 to 127)
    pub fn set_y2_divider(&mut self, divider: u8) -> Result<()> {
        check_y23_divider(divider)?;
        let current = self.read_register(Y2_DIV)?;
        let value = apply_y2_divider(current, divider)?;
        self.write_register(Y2_DIV, value)
    }

    /// Set the Y3 output divider (1 to 127)
    pub fn set_y3_divider(&mut self, divider: u8) -> Result<()> {
        let value = encode_y3_divider(divider)?;
        self.write_register(Y3_DIV, value)
    }

    /// Set the crystal load capacitance (0 to 20 pF)
    pub fn set_load_capacitance(&mut self, pf: u8) -> Result<()> {
        let value = encode_load_capacitance(pf)?;
        self.write_register(XTAL_LOAD, value)
    }

    /// Route the output through the PLL (`true`) or bypass it (`false`)
    ///
    /// This is a read-modify-write of a shared register and is not atomic.
    pub fn use_pll(&mut self, enabled: bool) -> Result<()> {
        let current = self.read_register(PLL1_CFG)?;
        let value = apply_pll_bypass(current, enabled);
        log::debug!("PLL1 config 0x{:02x} -> 0x{:02x}", current, value);
        self.write_register(PLL1_CFG, value)
    }

    /// Same as [`use_pll`](Self::use_pll)
    pub fn set_pll_bypass(&mut self, enabled: bool) -> Result<()> {
        self.use_pll(enabled)
    }

    /// Program the PLL to `XTAL * numerator / denominator`
    ///
    /// The four PLL registers are written one at a time in increasing
    /// offset order. A failure part way through leaves the earlier
    /// registers updated.
    pub fn set_frequency_ratio(
        &mut self,
        numerator: u16,
        denominator: u16,
        force: bool,
    ) -> Result<FrequencyPlan> {
        let plan = FrequencyPlan::compute(numerator, denominator, force)?;
        log::info!(
            "PLL ratio {}/{} -> {} Hz",
            numerator,
            denominator,
            plan.frequency_hz()
        );

        for (offset, value) in (PLL1_NRQP..).zip(plan.registers()) {
            self.write_register(offset, value)?;
        }
        Ok(plan)
    }

    /// Read back the PLL fields currently programmed in the chip
    pub fn read_frequency_plan(&mut self) -> Result<PllFields> {
        let mut regs = [0u8; 4];
        self.dump_registers(PLL1_NRQP, &mut regs)?;
        Ok(PllFields::unpack(regs))
    }
}
