//! Lane-parallel decimal conversion.
//!
//! Input is a register whose lanes already hold ASCII digits grouped into
//! `count` fields of 1, 2, 4 or 8 digits, most significant digit first, as
//! produced by shuffling a window with a descriptor's `shuffle_digits`. Lanes
//! that the shuffle zeroed count as leading zeros.
//!
//! The digit bias is removed with an unsigned saturating subtraction, then
//! adjacent lanes are combined pairwise:
//!
//! ```text
//! bytes   [1 2 3 4 5 6 7 8]   x [10 1 10 1 ..]      PMADDUBSW
//! i16     [12  34  56  78 ]   x [100 1 100 1]       PMADDWD
//! i32     [1234    5678   ]   -> u16 (PACKUSDW) x [10000 1 ..] PMADDWD
//! i32     [12345678       ]
//! ```
//!
//! Digit validity is not checked; a non-digit byte in a digit lane gives an
//! unspecified value.

use crate::simd::Lanes;
use crate::sink::Sink;
use crate::WINDOW;

const DIGIT_BIAS: u8 = b'0';

const TENS: [i8; WINDOW] = [10, 1, 10, 1, 10, 1, 10, 1, 10, 1, 10, 1, 10, 1, 10, 1];
const HUNDREDS: [i16; 8] = [100, 1, 100, 1, 100, 1, 100, 1];
const TEN_THOUSANDS: [i16; 8] = [10000, 1, 10000, 1, 10000, 1, 10000, 1];

#[inline(always)]
fn digit_values<L: Lanes>(shuffled: L) -> L {
    shuffled.saturating_sub_byte(DIGIT_BIAS)
}

/// Two-digit values in `i16` lanes 0..8.
#[inline(always)]
fn pairs<L: Lanes>(shuffled: L) -> L {
    digit_values(shuffled).maddubs(L::from_i8(TENS))
}

/// Four-digit values in `i32` lanes 0..4.
#[inline(always)]
fn quads<L: Lanes>(shuffled: L) -> L {
    pairs(shuffled).madd(L::from_i16(HUNDREDS))
}

/// Eight-digit values in `i32` lanes 0..2.
#[inline(always)]
fn octets<L: Lanes>(shuffled: L) -> L {
    quads(shuffled)
        .pack_u32_to_u16()
        .madd(L::from_i16(TEN_THOUSANDS))
}

/// Two's complement negation of `value` when `negate` is set.
#[inline(always)]
fn apply_sign(value: u32, negate: bool) -> i32 {
    let m = (negate as i32).wrapping_neg();
    (value as i32 ^ m).wrapping_sub(m)
}

/// Whether field `index` of width `digits` carries a minus sign.
#[inline(always)]
fn is_negative(negate_mask: u16, index: usize, digits: usize) -> bool {
    (negate_mask >> (index * digits)) & 1 != 0
}

/// Convert up to 16 one-digit fields.
#[inline(always)]
pub fn convert_1digit<L: Lanes, S: Sink<u32>>(shuffled: L, count: usize, mut output: S) {
    debug_assert!(count <= WINDOW);
    for &digit in digit_values(shuffled).to_array().iter().take(count) {
        output.push(u32::from(digit));
    }
}

/// Convert up to 8 two-digit fields.
#[inline(always)]
pub fn convert_2digits<L: Lanes, S: Sink<u32>>(shuffled: L, count: usize, mut output: S) {
    debug_assert!(count <= 8);
    for &value in pairs(shuffled).to_i16().iter().take(count) {
        output.push(value as u32);
    }
}

/// Convert up to 4 four-digit fields.
#[inline(always)]
pub fn convert_4digits<L: Lanes, S: Sink<u32>>(shuffled: L, count: usize, mut output: S) {
    debug_assert!(count <= 4);
    for &value in quads(shuffled).to_i32().iter().take(count) {
        output.push(value as u32);
    }
}

/// Convert up to 2 eight-digit fields.
#[inline(always)]
pub fn convert_8digits<L: Lanes, S: Sink<u32>>(shuffled: L, count: usize, mut output: S) {
    debug_assert!(count <= 2);
    for &value in octets(shuffled).to_i32().iter().take(count) {
        output.push(value as u32);
    }
}

/// Signed variant of [`convert_2digits`].
///
/// `negate_mask` holds `0xFF` in lane `2 * i` when field `i` is negative (the
/// result of comparing the shuffled sign lanes with `'-'`).
#[inline(always)]
pub fn convert_2digits_signed<L: Lanes, S: Sink<i32>>(
    shuffled: L,
    negate_mask: L,
    count: usize,
    mut output: S,
) {
    debug_assert!(count <= 8);
    let negate = negate_mask.move_mask();
    for (i, &value) in pairs(shuffled).to_i16().iter().take(count).enumerate() {
        output.push(apply_sign(value as u32, is_negative(negate, i, 2)));
    }
}

/// Signed variant of [`convert_4digits`]; sign of field `i` in lane `4 * i`.
#[inline(always)]
pub fn convert_4digits_signed<L: Lanes, S: Sink<i32>>(
    shuffled: L,
    negate_mask: L,
    count: usize,
    mut output: S,
) {
    debug_assert!(count <= 4);
    let negate = negate_mask.move_mask();
    for (i, &value) in quads(shuffled).to_i32().iter().take(count).enumerate() {
        output.push(apply_sign(value as u32, is_negative(negate, i, 4)));
    }
}

/// Signed variant of [`convert_8digits`]; sign of field `i` in lane `8 * i`.
#[inline(always)]
pub fn convert_8digits_signed<L: Lanes, S: Sink<i32>>(
    shuffled: L,
    negate_mask: L,
    count: usize,
    mut output: S,
) {
    debug_assert!(count <= 2);
    let negate = negate_mask.move_mask();
    for (i, &value) in octets(shuffled).to_i32().iter().take(count).enumerate() {
        output.push(apply_sign(value as u32, is_negative(negate, i, 8)));
    }
}
