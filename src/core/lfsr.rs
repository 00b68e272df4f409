//! Galois linear-feedback shift register with maximal-length taps.
//!
//! The tap table follows the Otago report "Efficient Shift Registers, LFSR
//! Counters, and Long Pseudo-Random Sequence Generators". Every entry gives a
//! period of `2^width - 1`, so starting from a non-zero state the register
//! visits every non-zero state exactly once per period.

use crate::error::FigureError;

#[derive(Clone, Copy, Debug)]
pub struct Lfsr {
    state: u64,
    taps: u64,
    width: u32,
}

impl Lfsr {
    /// Register of `width` bits seeded with state 1.
    pub fn new(width: u32) -> Result<Self, FigureError> {
        Self::with_seed(width, 1)
    }

    pub fn with_seed(width: u32, seed: u64) -> Result<Self, FigureError> {
        let taps = tap_mask(width).ok_or(FigureError::LfsrWidth(width))?;
        let mask = (1u64 << width) - 1;
        // The all-zero state is a fixed point of the recurrence.
        let state = match seed & mask {
            0 => 1,
            s => s,
        };
        Ok(Self { state, taps, width })
    }

    #[inline]
    pub fn state(&self) -> u64 {
        self.state
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn period(&self) -> u64 {
        (1u64 << self.width) - 1
    }

    /// Advance one step and return the new state.
    #[inline]
    pub fn next(&mut self) -> u64 {
        let toggle = if self.state & 1 == 0 { 0 } else { self.taps };
        self.state = (self.state >> 1) ^ toggle;
        self.state
    }

    /// Split the current state into two little-endian index fields of
    /// `lo_bits` and `hi_bits` bits.
    #[inline]
    pub fn split(&self, lo_bits: u32, hi_bits: u32) -> (usize, usize) {
        let lo = self.state & low_mask(lo_bits);
        let hi = (self.state >> lo_bits) & low_mask(hi_bits);
        (lo as usize, hi as usize)
    }
}

#[inline]
fn low_mask(bits: u32) -> u64 {
    if bits >= 64 { u64::MAX } else { (1u64 << bits) - 1 }
}

fn tap_mask(width: u32) -> Option<u64> {
    let (a, b, c, d) = match width {
        5 => (5, 4, 3, 2),
        6 => (6, 5, 3, 2),
        7 => (7, 6, 5, 4),
        8 => (8, 6, 5, 4),
        9 => (9, 8, 6, 5),
        10 => (10, 9, 7, 6),
        11 => (11, 10, 9, 7),
        12 => (12, 11, 8, 6),
        13 => (13, 12, 10, 9),
        14 => (14, 13, 11, 9),
        15 => (15, 14, 13, 11),
        16 => (16, 14, 13, 11),
        17 => (17, 16, 15, 14),
        18 => (18, 17, 16, 13),
        19 => (19, 18, 17, 14),
        20 => (20, 19, 16, 14),
        21 => (21, 20, 19, 16),
        22 => (22, 19, 18, 17),
        23 => (23, 22, 20, 18),
        24 => (24, 23, 21, 20),
        25 => (25, 24, 23, 22),
        26 => (26, 25, 24, 20),
        27 => (27, 26, 25, 22),
        28 => (28, 27, 24, 22),
        29 => (29, 28, 27, 25),
        30 => (30, 29, 26, 24),
        31 => (31, 30, 29, 28),
        32 => (32, 30, 26, 25),
        33 => (33, 32, 29, 27),
        34 => (34, 31, 30, 26),
        35 => (35, 34, 28, 27),
        36 => (36, 35, 29, 28),
        37 => (37, 36, 33, 31),
        38 => (38, 37, 33, 32),
        39 => (39, 38, 35, 32),
        40 => (40, 37, 36, 35),
        41 => (41, 40, 39, 38),
        42 => (42, 40, 37, 35),
        43 => (43, 42, 38, 37),
        44 => (44, 42, 39, 38),
        45 => (45, 44, 42, 41),
        46 => (46, 40, 39, 38),
        47 => (47, 46, 43, 42),
        48 => (48, 44, 41, 39),
        49 => (49, 45, 44, 43),
        50 => (50, 48, 47, 46),
        51 => (51, 50, 48, 45),
        52 => (52, 51, 49, 46),
        53 => (53, 52, 51, 47),
        54 => (54, 51, 48, 46),
        55 => (55, 54, 53, 49),
        56 => (56, 54, 52, 49),
        57 => (57, 55, 54, 52),
        58 => (58, 57, 53, 52),
        59 => (59, 57, 55, 52),
        60 => (60, 58, 56, 55),
        61 => (61, 60, 59, 56),
        62 => (62, 59, 57, 56),
        63 => (63, 62, 59, 58),
        _ => return None,
    };
    // Tap n toggles bit n-1 once the register has shifted right.
    Some((1u64 << (a - 1)) | (1u64 << (b - 1)) | (1u64 << (c - 1)) | (1u64 << (d - 1)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_widths_have_maximal_period() {
        for width in 5..=16 {
            let mut lfsr = Lfsr::new(width).unwrap();
            let seed = lfsr.state();
            let mut steps = 1u64;
            while lfsr.next() != seed {
                assert_ne!(lfsr.state(), 0, "zero state reached at width {width}");
                steps += 1;
                assert!(steps <= lfsr.period(), "period exceeded at width {width}");
            }
            assert_eq!(steps, lfsr.period(), "width {width}");
        }
    }

    #[test]
    fn unsupported_widths_are_rejected() {
        assert!(matches!(Lfsr::new(4), Err(FigureError::LfsrWidth(4))));
        assert!(matches!(Lfsr::new(64), Err(FigureError::LfsrWidth(64))));
        assert!(Lfsr::new(30).is_ok());
        assert!(Lfsr::new(40).is_ok());
    }

    #[test]
    fn zero_seed_is_replaced() {
        let lfsr = Lfsr::with_seed(8, 0x100).unwrap();
        assert_eq!(lfsr.state(), 1);
    }

    #[test]
    fn split_reads_little_endian_fields() {
        let lfsr = Lfsr::with_seed(12, 0b1011_0110_1101).unwrap();
        let (lo, hi) = lfsr.split(5, 7);
        assert_eq!(lo, 0b0_1101);
        assert_eq!(hi, 0b101_1011);
    }
}
