//! Bus trait definitions
//!
//! A [`RegisterBus`] moves register bytes between the host and an I2C
//! target. A [`PowerControl`] brings the target's supply rails and the bus
//! itself up or down. Anything that can do both can drive a
//! [`Cdce913`](crate::Cdce913).

use crate::error::Result;

/// Register-level access to an I2C target
///
/// Reads and writes are independent: there is no multi-register
/// transaction guarantee, and an implementation is free to split a read
/// into several bus transactions.
pub trait RegisterBus {
    /// Read `buf.len()` consecutive registers starting at `offset`
    fn read_registers(&mut self, address: u8, offset: u8, buf: &mut [u8]) -> Result<()>;

    /// Write `values` to consecutive registers starting at `offset`
    ///
    /// `values` must not be empty.
    fn write_registers(&mut self, address: u8, offset: u8, values: &[u8]) -> Result<()>;
}

/// Power sequencing for the target and its bus
///
/// Sequences are not transactional. A failure part way through leaves the
/// hardware in whatever state the completed steps produced.
pub trait PowerControl {
    /// Power the target, its pull-ups, and the bus
    fn power_up(&mut self) -> Result<()>;

    /// Shut the bus down and remove power, in reverse order
    fn power_down(&mut self) -> Result<()>;
}

impl<B: RegisterBus + ?Sized> RegisterBus for &mut B {
    fn read_registers(&mut self, address: u8, offset: u8, buf: &mut [u8]) -> Result<()> {
        (**self).read_registers(address, offset, buf)
    }

    fn write_registers(&mut self, address: u8, offset: u8, values: &[u8]) -> Result<()> {
        (**self).write_registers(address, offset, values)
    }
}

impl<P: PowerControl + ?Sized> PowerControl for &mut P {
    fn power_up(&mut self) -> Result<()> {
        (**self).power_up()
    }

    fn power_down(&mut self) -> Result<()> {
        (**self).power_down()
    }
}
