//! CDCE913 register map and single-register encoders
//!
//! Only the registers this crate touches are listed. Offsets are byte
//! offsets within the device's configuration space.

use crate::error::{Error, Result};

/// Y1 divider high bits plus fixed output configuration
pub const Y1_DIV_HIGH: u8 = 0x02;
/// Y1 divider low byte
pub const Y1_DIV_LOW: u8 = 0x03;
/// Crystal load capacitance
pub const XTAL_LOAD: u8 = 0x05;
/// PLL1 configuration (bit 7: PLL bypass)
pub const PLL1_CFG: u8 = 0x14;
/// Y2 divider (bits 6:0)
pub const Y2_DIV: u8 = 0x16;
/// Y3 divider
pub const Y3_DIV: u8 = 0x17;
/// First of the four PLL1 N/R/Q/P/FRANGE registers
pub const PLL1_NRQP: u8 = 0x18;

/// Fixed bits written alongside the Y1 divider high bits
pub const Y1_CFG_BITS: u8 = 0xB4;
/// PLL bypass bit in [`PLL1_CFG`]
pub const PLL_BYPASS: u8 = 0x80;

/// Largest Y1 output divider
pub const Y1_DIV_MAX: u16 = 1023;
/// Largest Y2/Y3 output divider
pub const Y23_DIV_MAX: u8 = 127;
/// Largest crystal load capacitance in pF
pub const LOAD_CAP_MAX_PF: u8 = 20;

/// Encode the Y1 divider into the values for [`Y1_DIV_HIGH`] and
/// [`Y1_DIV_LOW`]
pub fn encode_y1_divider(divider: u16) -> Result<[u8; 2]> {
    if divider > Y1_DIV_MAX {
        return Err(Error::OutOfRange);
    }
    let high = Y1_CFG_BITS | ((divider & 0x300) >> 8) as u8;
    let low = (divider & 0xff) as u8;
    Ok([high, low])
}

/// Encode a crystal load capacitance (0 to 20 pF) for [`XTAL_LOAD`]
pub fn encode_load_capacitance(pf: u8) -> Result<u8> {
    if pf > LOAD_CAP_MAX_PF {
        return Err(Error::OutOfRange);
    }
    Ok(pf << 3)
}

/// Apply the PLL bypass setting to the current [`PLL1_CFG`] value
///
/// The bit is set when the PLL is bypassed, so `use_pll == true` clears it.
pub fn apply_pll_bypass(current: u8, use_pll: bool) -> u8 {
    if use_pll {
        current & !PLL_BYPASS
    } else {
        current | PLL_BYPASS
    }
}

/// Apply a Y2 divider (1 to 127) to the current [`Y2_DIV`] value
///
/// Bit 7 belongs to another setting and is preserved.
pub fn apply_y2_divider(current: u8, divider: u8) -> Result<u8> {
    check_y23_divider(divider)?;
    Ok((current & 0x80) | divider)
}

/// Encode a Y3 divider (1 to 127) for [`Y3_DIV`]
pub fn encode_y3_divider(divider: u8) -> Result<u8> {
    check_y23_divider(divider)?;
    Ok(divider)
}

/// Check a Y2/Y3 divider is in 1 to 127
pub fn check_y23_divider(divider: u8) -> Result<()> {
    if divider == 0 || divider > Y23_DIV_MAX {
        Err(Error::OutOfRange)
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_y1_divider_all_values() {
        for d in 0..=Y1_DIV_MAX {
            let [high, low] = encode_y1_divider(d).unwrap();
            assert_eq!(high, 0xB4 | (d >> 8) as u8);
            assert_eq!(low, (d & 0xff) as u8);
        }
    }

    #[test]
    fn test_y1_divider_out_of_range() {
        assert_eq!(encode_y1_divider(1024), Err(Error::OutOfRange));
        assert_eq!(encode_y1_divider(u16::MAX), Err(Error::OutOfRange));
    }

    #[test]
    fn test_load_capacitance() {
        for pf in 0..=LOAD_CAP_MAX_PF {
            assert_eq!(encode_load_capacitance(pf).unwrap(), pf << 3);
        }
        assert_eq!(encode_load_capacitance(21), Err(Error::OutOfRange));
    }

    #[test]
    fn test_pll_bypass_polarity() {
        assert_eq!(apply_pll_bypass(0xFF, true), 0x7F);
        assert_eq!(apply_pll_bypass(0x00, false), 0x80);
        assert_eq!(apply_pll_bypass(0x2A, true), 0x2A);
        assert_eq!(apply_pll_bypass(0x2A, false), 0xAA);
    }

    #[test]
    fn test_y2_divider_keeps_top_bit() {
        assert_eq!(apply_y2_divider(0x80, 5), Ok(0x85));
        assert_eq!(apply_y2_divider(0x7F, 5), Ok(0x05));
        assert_eq!(apply_y2_divider(0x00, 0), Err(Error::OutOfRange));
        assert_eq!(apply_y2_divider(0x00, 128), Err(Error::OutOfRange));
    }

    #[test]
    fn test_y3_divider() {
        assert_eq!(encode_y3_divider(1), Ok(1));
        assert_eq!(encode_y3_divider(127), Ok(127));
        assert_eq!(encode_y3_divider(0), Err(Error::OutOfRange));
    }
}
