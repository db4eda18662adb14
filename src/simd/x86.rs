//! x86_64 SSE implementation of [`Lanes`].
//!
//! Uses PSHUFB and PMADDUBSW (SSSE3) plus PACKUSDW (SSE4.1). Values of
//! [`Sse41`] are only created inside the `#[target_feature]` trampolines below,
//! which the caller reaches after [`Backend::Sse41`](super::Backend) was
//! detected as supported.

#[cfg(target_arch = "x86_64")]
use core::arch::x86_64::*;

use super::Lanes;
use crate::block::BlockInfo;
use crate::parse;
use crate::sink::Sink;
use crate::stats::Statistics;
use crate::WINDOW;

/// A 16-byte SSE register.
#[derive(Clone, Copy)]
pub(crate) struct Sse41(__m128i);

// SAFETY (all methods): an `Sse41` only exists inside functions compiled with
// `ssse3` and `sse4.1` enabled, which are only called once the CPU has been
// checked for both.
impl Lanes for Sse41 {
    #[inline(always)]
    fn from_array(bytes: [u8; WINDOW]) -> Self {
        Self(unsafe { _mm_loadu_si128(bytes.as_ptr() as *const __m128i) })
    }

    #[inline(always)]
    fn to_array(self) -> [u8; WINDOW] {
        let mut out = [0u8; WINDOW];
        unsafe { _mm_storeu_si128(out.as_mut_ptr() as *mut __m128i, self.0) };
        out
    }

    #[inline(always)]
    fn shuffle(self, mask: Self) -> Self {
        Self(unsafe { _mm_shuffle_epi8(self.0, mask.0) })
    }

    #[inline(always)]
    fn and_not(self, mask: Self) -> Self {
        Self(unsafe { _mm_andnot_si128(mask.0, self.0) })
    }

    #[inline(always)]
    fn or(self, other: Self) -> Self {
        Self(unsafe { _mm_or_si128(self.0, other.0) })
    }

    #[inline(always)]
    fn eq_byte(self, byte: u8) -> Self {
        Self(unsafe { _mm_cmpeq_epi8(self.0, _mm_set1_epi8(byte as i8)) })
    }

    #[inline(always)]
    fn move_mask(self) -> u16 {
        unsafe { _mm_movemask_epi8(self.0) as u16 }
    }

    #[inline(always)]
    fn saturating_sub_byte(self, byte: u8) -> Self {
        Self(unsafe { _mm_subs_epu8(self.0, _mm_set1_epi8(byte as i8)) })
    }

    #[inline(always)]
    fn maddubs(self, weights: Self) -> Self {
        Self(unsafe { _mm_maddubs_epi16(self.0, weights.0) })
    }

    #[inline(always)]
    fn madd(self, weights: Self) -> Self {
        Self(unsafe { _mm_madd_epi16(self.0, weights.0) })
    }

    #[inline(always)]
    fn pack_u32_to_u16(self) -> Self {
        Self(unsafe { _mm_packus_epi32(self.0, self.0) })
    }
}

/// Unsigned parse on SSE registers.
///
/// # Safety
///
/// The CPU must support SSSE3 and SSE4.1.
#[target_feature(enable = "ssse3", enable = "sse4.1")]
#[allow(clippy::too_many_arguments)]
pub unsafe fn parse_unsigned_sse41<S: Sink<u32>, const COLLECT: bool>(
    block: &BlockInfo,
    window: &[u8; WINDOW],
    data: &[u8],
    pos: usize,
    end: usize,
    stats: &mut Statistics,
    output: S,
) -> usize {
    parse::parse_unsigned::<Sse41, S, COLLECT>(
        block,
        Sse41::from_array(*window),
        data,
        pos,
        end,
        stats,
        output,
    )
}

/// Signed parse on SSE registers; the sign bytemask is derived from `window`.
///
/// # Safety
///
/// The CPU must support SSSE3 and SSE4.1.
#[target_feature(enable = "ssse3", enable = "sse4.1")]
#[allow(clippy::too_many_arguments)]
pub unsafe fn parse_signed_sse41<S: Sink<i32>, const COLLECT: bool>(
    block: &BlockInfo,
    window: &[u8; WINDOW],
    data: &[u8],
    pos: usize,
    end: usize,
    stats: &mut Statistics,
    output: S,
) -> usize {
    let input = Sse41::from_array(*window);
    let signs = input.eq_byte(b'-').or(input.eq_byte(b'+'));
    parse::parse_signed::<Sse41, S, COLLECT>(block, input, signs, data, pos, end, stats, output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simd::Portable;

    fn sse_available() -> bool {
        is_x86_feature_detected!("ssse3") && is_x86_feature_detected!("sse4.1")
    }

    #[target_feature(enable = "ssse3", enable = "sse4.1")]
    unsafe fn run_ops(a: [u8; 16], b: [u8; 16]) -> [[u8; 16]; 9] {
        let (x, y) = (Sse41::from_array(a), Sse41::from_array(b));
        [
            x.shuffle(y).to_array(),
            x.and_not(y).to_array(),
            x.or(y).to_array(),
            x.eq_byte(b'-').to_array(),
            x.saturating_sub_byte(b'0').to_array(),
            x.maddubs(y).to_array(),
            x.madd(y).to_array(),
            x.pack_u32_to_u16().to_array(),
            bytemuck::cast([x.move_mask(), 0, 0, 0, 0, 0, 0, 0]),
        ]
    }

    fn portable_ops(a: [u8; 16], b: [u8; 16]) -> [[u8; 16]; 9] {
        let (x, y) = (Portable::from_array(a), Portable::from_array(b));
        [
            x.shuffle(y).to_array(),
            x.and_not(y).to_array(),
            x.or(y).to_array(),
            x.eq_byte(b'-').to_array(),
            x.saturating_sub_byte(b'0').to_array(),
            x.maddubs(y).to_array(),
            x.madd(y).to_array(),
            x.pack_u32_to_u16().to_array(),
            bytemuck::cast([x.move_mask(), 0u16, 0, 0, 0, 0, 0, 0]),
        ]
    }

    #[test]
    fn test_matches_portable() {
        if !sse_available() {
            return;
        }

        let inputs: [[u8; 16]; 4] = [
            *b"-12,+34,5678,-90",
            *b"0123456789012345",
            [0x80, 0x81, 0, 1, 2, 3, 0xFF, 0x7F, 9, 8, 7, 6, 5, 4, 3, 2],
            [255; 16],
        ];
        for a in inputs {
            for b in inputs {
                let expected = portable_ops(a, b);
                let actual = unsafe { run_ops(a, b) };
                assert_eq!(actual, expected, "a={:?} b={:?}", a, b);
            }
        }
    }
}
