//! 128-bit lane primitives.
//!
//! The conversion algorithms are written once against the [`Lanes`] trait and
//! instantiated per back-end:
//!
//! - [`Portable`] - plain `[u8; 16]`, available everywhere and used as the
//!   reference implementation in tests
//! - `Sse41` - SSSE3/SSE4.1 intrinsics on x86_64, selected at runtime with
//!   `is_x86_feature_detected!` when `std` is enabled
//!
//! All operations follow the x86 semantics of the corresponding instruction so
//! both back-ends produce bit-identical registers.

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::WINDOW;

pub mod portable;

#[cfg(target_arch = "x86_64")]
pub mod x86;

pub use portable::Portable;

/// One 128-bit register viewed as 16 byte lanes.
pub trait Lanes: Copy {
    fn from_array(bytes: [u8; WINDOW]) -> Self;

    fn to_array(self) -> [u8; WINDOW];

    /// Byte shuffle: lane `i` takes `self[mask[i] & 0x0F]`, or zero when
    /// `mask[i]` has its high bit set.
    fn shuffle(self, mask: Self) -> Self;

    /// `self & !mask`
    fn and_not(self, mask: Self) -> Self;

    fn or(self, other: Self) -> Self;

    /// `0xFF` in lanes equal to `byte`, `0x00` elsewhere.
    fn eq_byte(self, byte: u8) -> Self;

    /// High bit of every lane, lane 0 in bit 0.
    fn move_mask(self) -> u16;

    /// Per-lane unsigned saturating subtraction.
    fn saturating_sub_byte(self, byte: u8) -> Self;

    /// Multiply unsigned bytes of `self` with signed bytes of `weights` and add
    /// adjacent pairs into saturated `i16` lanes.
    fn maddubs(self, weights: Self) -> Self;

    /// Multiply `i16` lanes and add adjacent pairs into `i32` lanes.
    fn madd(self, weights: Self) -> Self;

    /// Narrow `i32` lanes to `u16` with unsigned saturation; the four results
    /// fill both halves of the register.
    fn pack_u32_to_u16(self) -> Self;

    #[inline(always)]
    fn from_i8(lanes: [i8; WINDOW]) -> Self {
        Self::from_array(bytemuck::cast(lanes))
    }

    #[inline(always)]
    fn from_i16(lanes: [i16; 8]) -> Self {
        Self::from_array(bytemuck::cast(lanes))
    }

    #[inline(always)]
    fn to_i16(self) -> [i16; 8] {
        bytemuck::cast(self.to_array())
    }

    #[inline(always)]
    fn to_i32(self) -> [i32; 4] {
        bytemuck::cast(self.to_array())
    }
}

/// Instruction set used for the vectorized paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Backend {
    /// Scalar emulation of the lane operations.
    Portable,
    /// SSSE3 + SSE4.1 (x86_64 only).
    Sse41,
}

impl Backend {
    /// Every back-end, in order of preference.
    pub const ALL: [Backend; 2] = [Self::Sse41, Self::Portable];

    /// Best back-end supported by the running CPU.
    pub fn detect() -> Self {
        Self::ALL
            .into_iter()
            .find(|backend| backend.is_supported())
            .unwrap_or(Self::Portable)
    }

    /// Whether this back-end can run on the current CPU.
    pub fn is_supported(self) -> bool {
        match self {
            Self::Portable => true,
            Self::Sse41 => sse41_available(),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Portable => "portable",
            Self::Sse41 => "sse4.1",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(all(target_arch = "x86_64", any(test, feature = "std")))]
fn sse41_available() -> bool {
    is_x86_feature_detected!("ssse3") && is_x86_feature_detected!("sse4.1")
}

#[cfg(all(target_arch = "x86_64", not(any(test, feature = "std"))))]
fn sse41_available() -> bool {
    cfg!(all(target_feature = "ssse3", target_feature = "sse4.1"))
}

#[cfg(not(target_arch = "x86_64"))]
fn sse41_available() -> bool {
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_is_supported() {
        let backend = Backend::detect();
        assert!(backend.is_supported());
        assert!(Backend::Portable.is_supported());
    }

    #[test]
    fn test_display() {
        assert_eq!(Backend::Portable.to_string(), "portable");
        assert_eq!(Backend::Sse41.to_string(), "sse4.1");
    }

    #[test]
    fn test_lane_casts() {
        let weights = Portable::from_i16([10000, 1, 10000, 1, 10000, 1, 10000, 1]);
        assert_eq!(weights.to_i16(), [10000, 1, 10000, 1, 10000, 1, 10000, 1]);

        let signed = Portable::from_i8([-1; 16]);
        assert_eq!(signed.to_array(), [0xFF; 16]);
        assert_eq!(signed.to_i32(), [-1; 4]);
    }
}
