//! Portable reference implementation of [`Lanes`].
//!
//! Every operation is a plain loop over the 16 byte lanes, mirroring the x86
//! instruction it stands in for. Used on targets without an accelerated
//! back-end and as the oracle the SSE back-end is tested against.

use super::Lanes;
use crate::WINDOW;

/// A 16-byte register emulated with an array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Portable(pub [u8; WINDOW]);

impl Lanes for Portable {
    #[inline(always)]
    fn from_array(bytes: [u8; WINDOW]) -> Self {
        Self(bytes)
    }

    #[inline(always)]
    fn to_array(self) -> [u8; WINDOW] {
        self.0
    }

    #[inline]
    fn shuffle(self, mask: Self) -> Self {
        Self(core::array::from_fn(|i| {
            let m = mask.0[i];
            if m & 0x80 != 0 {
                0
            } else {
                self.0[(m & 0x0F) as usize]
            }
        }))
    }

    #[inline]
    fn and_not(self, mask: Self) -> Self {
        Self(core::array::from_fn(|i| self.0[i] & !mask.0[i]))
    }

    #[inline]
    fn or(self, other: Self) -> Self {
        Self(core::array::from_fn(|i| self.0[i] | other.0[i]))
    }

    #[inline]
    fn eq_byte(self, byte: u8) -> Self {
        Self(self.0.map(|b| if b == byte { 0xFF } else { 0x00 }))
    }

    #[inline]
    fn move_mask(self) -> u16 {
        self.0
            .iter()
            .enumerate()
            .fold(0u16, |mask, (i, &b)| mask | (u16::from(b >> 7) << i))
    }

    #[inline]
    fn saturating_sub_byte(self, byte: u8) -> Self {
        Self(self.0.map(|b| b.saturating_sub(byte)))
    }

    #[inline]
    fn maddubs(self, weights: Self) -> Self {
        let w: [i8; WINDOW] = bytemuck::cast(weights.0);
        let pairs: [i16; 8] = core::array::from_fn(|i| {
            let lo = i16::from(self.0[2 * i]) * i16::from(w[2 * i]);
            let hi = i16::from(self.0[2 * i + 1]) * i16::from(w[2 * i + 1]);
            lo.saturating_add(hi)
        });
        Self::from_i16(pairs)
    }

    #[inline]
    fn madd(self, weights: Self) -> Self {
        let a = self.to_i16();
        let w = weights.to_i16();
        let pairs: [i32; 4] = core::array::from_fn(|i| {
            let lo = i32::from(a[2 * i]) * i32::from(w[2 * i]);
            let hi = i32::from(a[2 * i + 1]) * i32::from(w[2 * i + 1]);
            lo.wrapping_add(hi)
        });
        Self::from_array(bytemuck::cast(pairs))
    }

    #[inline]
    fn pack_u32_to_u16(self) -> Self {
        let a = self.to_i32();
        let packed: [u16; 8] = core::array::from_fn(|i| a[i % 4].clamp(0, 0xFFFF) as u16);
        Self::from_array(bytemuck::cast(packed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shuffle() {
        let input = Portable(*b"0123456789abcdef");
        let mut mask = [0x80u8; 16];
        mask[0] = 15;
        mask[1] = 0;
        mask[2] = 0x1A; // only the low nibble selects
        let out = input.shuffle(Portable(mask)).to_array();
        assert_eq!(&out[..3], b"f0a");
        assert!(out[3..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_eq_byte_and_move_mask() {
        let input = Portable(*b"-12,+34,-5,,,,,-");
        let minus = input.eq_byte(b'-');
        assert_eq!(minus.move_mask(), 0b1000_0001_0000_0001);
        let plus = input.eq_byte(b'+');
        assert_eq!(minus.or(plus).move_mask(), 0b1000_0001_0001_0001);
    }

    #[test]
    fn test_and_not() {
        let input = Portable(*b"-12,+34,-5,,,,,-");
        let signs = input.eq_byte(b'-').or(input.eq_byte(b'+'));
        let digits = input.and_not(signs).to_array();
        assert_eq!(&digits[..8], b"\x0012,\x0034,");
    }

    #[test]
    fn test_saturating_sub() {
        let input = Portable(*b"0123456789\0\0\0\0\0\0");
        let out = input.saturating_sub_byte(b'0').to_array();
        assert_eq!(out, [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_maddubs() {
        let digits = Portable([1, 2, 3, 4, 9, 9, 0, 7, 0, 0, 0, 0, 0, 0, 0, 0]);
        let weights = Portable::from_i8([10, 1, 10, 1, 10, 1, 10, 1, 10, 1, 10, 1, 10, 1, 10, 1]);
        assert_eq!(digits.maddubs(weights).to_i16(), [12, 34, 99, 7, 0, 0, 0, 0]);

        // saturates like pmaddubsw
        let big = Portable([255; 16]);
        let weights = Portable::from_i8([127; 16]);
        assert_eq!(big.maddubs(weights).to_i16(), [i16::MAX; 8]);
    }

    #[test]
    fn test_madd_and_pack() {
        let pairs = Portable::from_i16([12, 34, 56, 78, 99, 99, 0, 1]);
        let weights = Portable::from_i16([100, 1, 100, 1, 100, 1, 100, 1]);
        let quads = pairs.madd(weights);
        assert_eq!(quads.to_i32(), [1234, 5678, 9999, 1]);

        let packed: [u16; 8] = bytemuck::cast(quads.pack_u32_to_u16().to_array());
        assert_eq!(packed, [1234, 5678, 9999, 1, 1234, 5678, 9999, 1]);

        let clamped = Portable::from_array(bytemuck::cast([-5i32, 70_000, 65_535, 0]));
        let packed: [u16; 8] = bytemuck::cast(clamped.pack_u32_to_u16().to_array());
        assert_eq!(packed[..4], [0, 65_535, 65_535, 0]);
    }
}
