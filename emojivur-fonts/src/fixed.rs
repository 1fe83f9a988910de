//! 26.6 fixed-point pixel values.
//!
//! HarfBuzz-style shaping reports advances and offsets in 1/64 pixel units.
//! `Fixed26_6` keeps that unit explicit so the conversion to whole pixels
//! happens in exactly one place.

use std::fmt;
use std::ops::{Add, AddAssign, Neg};

/// Number of fixed-point units in one pixel.
pub const UNITS_PER_PIXEL: i32 = 64;

/// A pixel value stored as a signed count of 1/64 pixel units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fixed26_6(i32);

impl Fixed26_6 {
    pub const ZERO: Fixed26_6 = Fixed26_6(0);

    /// Wrap a raw value already expressed in 1/64 pixel units.
    pub const fn from_raw(raw: i32) -> Self {
        Fixed26_6(raw)
    }

    /// Whole pixels to fixed point.
    pub const fn from_px(px: i32) -> Self {
        Fixed26_6(px * UNITS_PER_PIXEL)
    }

    /// Scale a value in font design units to 26.6 pixels for a given pixel
    /// size, rounding half away from zero.
    ///
    /// A zero `units_per_em` yields zero rather than dividing by zero.
    pub fn from_font_units(units: i32, units_per_em: u16, pxsize: u32) -> Self {
        if units_per_em == 0 {
            return Fixed26_6::ZERO;
        }
        let upem = i64::from(units_per_em);
        let scaled = i64::from(units) * i64::from(pxsize) * i64::from(UNITS_PER_PIXEL);
        let half = upem / 2;
        let rounded = if scaled >= 0 {
            (scaled + half) / upem
        } else {
            (scaled - half) / upem
        };
        Fixed26_6(rounded.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32)
    }

    /// The raw 1/64 pixel count.
    pub const fn raw(self) -> i32 {
        self.0
    }

    /// Whole pixels, truncated toward zero.
    ///
    /// This is the only lossy conversion; layout arithmetic that accumulates
    /// advances goes through it so every caller truncates the same way.
    pub const fn to_px(self) -> i32 {
        self.0 / UNITS_PER_PIXEL
    }

    /// Exact pixel value as a float, for per-glyph offsets.
    pub fn to_px_f32(self) -> f32 {
        self.0 as f32 / UNITS_PER_PIXEL as f32
    }
}

impl Add for Fixed26_6 {
    type Output = Fixed26_6;

    fn add(self, rhs: Self) -> Self::Output {
        Fixed26_6(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Fixed26_6 {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Neg for Fixed26_6 {
    type Output = Fixed26_6;

    fn neg(self) -> Self::Output {
        Fixed26_6(self.0.saturating_neg())
    }
}

impl fmt::Display for Fixed26_6 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_px_f32())
    }
}
