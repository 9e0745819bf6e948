//! PLL frequency planning
//!
//! The CDCE913 PLL multiplies the crystal by N/M. The chip is not given M
//! directly; instead it takes N together with P, Q and R, where
//!
//! ```text
//! P  = 4 - floor(log2(N / M))
//! N' = N * 2^P
//! Q  = floor(N' / M)
//! R  = N' - M * Q
//! ```
//!
//! plus a 2-bit range code (FRANGE) selecting the VCO band. These are packed
//! across four consecutive registers starting at
//! [`PLL1_NRQP`](crate::registers::PLL1_NRQP):
//!
//! ```text
//! reg0 = N[11:4]
//! reg1 = N[3:0] << 4 | R[7:4]
//! reg2 = R[3:0] << 4 | Q[5:3]
//! reg3 = Q[2:0] << 5 | P[1:0] << 2 | FRANGE
//! ```
//!
//! All frequency comparisons are done on integers (`XTAL * N` against
//! `limit * M`) so band edges are exact.

use crate::error::{Error, Result};
use crate::XTAL_HZ;

/// Lowest supported VCO frequency in Hz
pub const VCO_MIN_HZ: u64 = 80_000_000;
/// Highest supported VCO frequency in Hz
pub const VCO_MAX_HZ: u64 = 230_000_000;

/// Largest PLL numerator (12-bit N)
pub const NUMERATOR_MAX: u16 = 4095;
/// Largest PLL denominator
///
/// R is always smaller than the denominator and has an 8-bit slot.
pub const DENOMINATOR_MAX: u16 = 256;

/// VCO frequency band (the FRANGE field)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum VcoRange {
    /// Below 125 MHz
    Below125MHz = 0,
    /// 125 MHz up to (not including) 150 MHz
    Below150MHz = 1,
    /// 150 MHz up to (not including) 175 MHz
    Below175MHz = 2,
    /// 175 MHz and above
    From175MHz = 3,
}

impl VcoRange {
    /// Classify the frequency `XTAL * numerator / denominator`
    pub fn classify(numerator: u16, denominator: u16) -> Self {
        if below(numerator, denominator, 125_000_000) {
            Self::Below125MHz
        } else if below(numerator, denominator, 150_000_000) {
            Self::Below150MHz
        } else if below(numerator, denominator, 175_000_000) {
            Self::Below175MHz
        } else {
            Self::From175MHz
        }
    }

    /// The 2-bit register code
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Decode a register code (only the low two bits are used)
    pub fn from_code(code: u8) -> Self {
        match code & 0x03 {
            0 => Self::Below125MHz,
            1 => Self::Below150MHz,
            2 => Self::Below175MHz,
            _ => Self::From175MHz,
        }
    }
}

/// The register-level PLL fields, already narrowed to their slot widths
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PllFields {
    /// Numerator N (12 bits)
    pub n: u16,
    /// Remainder R (8 bits)
    pub r: u8,
    /// Quotient Q (6 bits)
    pub q: u8,
    /// Post-scaler P (2 bits)
    pub p: u8,
    /// VCO band
    pub range: VcoRange,
}

impl PllFields {
    /// Pack into the four PLL register values, lowest offset first
    pub fn pack(&self) -> [u8; 4] {
        let n = self.n & 0xfff;
        let r = self.r;
        let q = self.q & 0x3f;
        let p = self.p & 0x03;

        [
            ((n & 0xff0) >> 4) as u8,
            (((n & 0x00f) << 4) as u8) | ((r & 0xf0) >> 4),
            ((r & 0x0f) << 4) | ((q & 0x38) >> 3),
            ((q & 0x07) << 5) | (p << 2) | self.range.code(),
        ]
    }

    /// Unpack the four PLL register values, lowest offset first
    pub fn unpack(regs: [u8; 4]) -> Self {
        Self {
            n: ((regs[0] as u16) << 4) | ((regs[1] as u16) >> 4),
            r: ((regs[1] & 0x0f) << 4) | (regs[2] >> 4),
            q: ((regs[2] & 0x07) << 3) | (regs[3] >> 5),
            p: (regs[3] >> 2) & 0x03,
            range: VcoRange::from_code(regs[3]),
        }
    }
}

/// A computed PLL configuration for one frequency ratio
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrequencyPlan {
    numerator: u16,
    denominator: u16,
    fields: PllFields,
}

impl FrequencyPlan {
    /// Compute the plan for `XTAL * numerator / denominator`
    ///
    /// Fails with [`Error::InvalidArgument`] when either term is outside its
    /// field, and with [`Error::OutOfRange`] when the resulting frequency is
    /// outside [`VCO_MIN_HZ`]..=[`VCO_MAX_HZ`] unless `force` is set. Forced
    /// ratios of 32 or more cannot be expressed (P would be negative) and
    /// are rejected as invalid.
    pub fn compute(numerator: u16, denominator: u16, force: bool) -> Result<Self> {
        if numerator == 0 || numerator > NUMERATOR_MAX {
            return Err(Error::InvalidArgument);
        }
        if denominator == 0 || denominator > DENOMINATOR_MAX {
            return Err(Error::InvalidArgument);
        }

        let in_band = !below(numerator, denominator, VCO_MIN_HZ)
            && !above(numerator, denominator, VCO_MAX_HZ);
        if !in_band {
            if !force {
                return Err(Error::OutOfRange);
            }
            log::warn!(
                "PLL ratio {}/{} is outside the supported VCO band, continuing anyway",
                numerator,
                denominator
            );
        }

        let n = numerator as u32;
        let m = denominator as u32;
        let p = 4 - floor_log2_ratio(n, m);
        if p < 0 {
            return Err(Error::InvalidArgument);
        }
        let np = n << p;
        let q = np / m;
        let r = np - m * q;
        let range = VcoRange::classify(numerator, denominator);

        log::debug!("N = {}, P = {}, Q = {}, R = {}", n, p, q, r);

        if p > 0x03 {
            log::warn!("P = {} does not fit its 2-bit field, truncating", p);
        }

        // Q always lands in [16, 32) and R < M <= 256, so only P can be
        // wider than its slot.
        let fields = PllFields {
            n: numerator,
            r: r as u8,
            q: q as u8,
            p: (p & 0x03) as u8,
            range,
        };

        Ok(Self {
            numerator,
            denominator,
            fields,
        })
    }

    /// PLL numerator
    pub fn numerator(&self) -> u16 {
        self.numerator
    }

    /// PLL denominator
    pub fn denominator(&self) -> u16 {
        self.denominator
    }

    /// The register-level fields
    pub fn fields(&self) -> PllFields {
        self.fields
    }

    /// The four PLL register values, lowest offset first
    pub fn registers(&self) -> [u8; 4] {
        self.fields.pack()
    }

    /// Synthesized frequency in Hz, rounded down
    pub fn frequency_hz(&self) -> u64 {
        XTAL_HZ * self.numerator as u64 / self.denominator as u64
    }
}

/// `XTAL * num / den < limit_hz`
fn below(num: u16, den: u16, limit_hz: u64) -> bool {
    XTAL_HZ * (num as u64) < limit_hz * (den as u64)
}

/// `XTAL * num / den > limit_hz`
fn above(num: u16, den: u16, limit_hz: u64) -> bool {
    XTAL_HZ * (num as u64) > limit_hz * (den as u64)
}

/// `floor(log2(num / den))` for positive `num` and `den`
///
/// This is the largest `k` (possibly negative) with `den * 2^k <= num`.
fn floor_log2_ratio(num: u32, den: u32) -> i32 {
    let num = num as u64;
    let den = den as u64;
    let mut k = 0i32;
    if num >= den {
        while den << (k + 1) <= num {
            k += 1;
        }
    } else {
        while num << (-k) < den {
            k -= 1;
        }
    }
    k
}
