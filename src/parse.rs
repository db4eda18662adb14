//! Entry operations.
//!
//! [`parse_unsigned`] and [`parse_signed`] take one 16-byte window, the
//! descriptor that classifies it and the read cursor. Fixed-width descriptors
//! convert every field of the window at once and move the cursor by
//! `total_skip`; irregular descriptors parse a single field with a scalar scan
//! and leave the cursor on the byte that ended it.
//!
//! The `COLLECT` parameter selects at compile time whether `stats` is updated;
//! with `COLLECT = false` no counter code is emitted.
//!
//! # Cursor contract
//!
//! `pos` and the returned cursor index into `data`; `end` (clamped to
//! `data.len()`) bounds the scalar scan, which never reads at or past it. The
//! window is supplied by the caller, who decides how bytes past `end` are
//! padded.

use crate::block::{BlockInfo, ElementSize};
use crate::convert::{
    convert_1digit, convert_2digits, convert_2digits_signed, convert_4digits,
    convert_4digits_signed, convert_8digits, convert_8digits_signed,
};
use crate::simd::Lanes;
use crate::sink::Sink;
use crate::stats::Statistics;

/// Parse the unsigned fields of one window.
///
/// Appends `block.element_count()` values for fixed widths, or zero or one
/// value for the scalar fallback. Returns the new cursor.
#[inline(always)]
pub fn parse_unsigned<L: Lanes, S: Sink<u32>, const COLLECT: bool>(
    block: &BlockInfo,
    input: L,
    data: &[u8],
    pos: usize,
    end: usize,
    stats: &mut Statistics,
    mut output: S,
) -> usize {
    let shuffled = input.shuffle(L::from_array(*block.shuffle_digits()));
    let count = block.element_count();

    match block.element_size() {
        ElementSize::One => convert_1digit(shuffled, count, &mut output),
        ElementSize::Two => convert_2digits(shuffled, count, &mut output),
        ElementSize::Four => convert_4digits(shuffled, count, &mut output),
        ElementSize::Eight => convert_8digits(shuffled, count, &mut output),
        ElementSize::Irregular => {
            let (next, value) = scan_unsigned(data, pos + block.first_skip(), end);
            if let Some(value) = value {
                output.push(value);
            }
            if COLLECT {
                stats.record_scalar();
            }
            return next;
        }
    }

    if COLLECT {
        stats.record_vector(block.element_size(), count, block.total_skip());
    }
    pos + block.total_skip()
}

/// Parse the signed fields of one window.
///
/// `sign_mask` holds `0xFF` in every lane of `input` that is a `'+'` or `'-'`
/// byte; those lanes are cleared before the digits are shuffled. Fixed-width
/// descriptors must use 2, 4 or 8 digits: one-digit fields have no sign and
/// are parsed as unsigned.
#[inline(always)]
#[allow(clippy::too_many_arguments)]
pub fn parse_signed<L: Lanes, S: Sink<i32>, const COLLECT: bool>(
    block: &BlockInfo,
    input: L,
    sign_mask: L,
    data: &[u8],
    pos: usize,
    end: usize,
    stats: &mut Statistics,
    mut output: S,
) -> usize {
    let digits = input.and_not(sign_mask);
    let shuffled = digits.shuffle(L::from_array(*block.shuffle_digits()));
    let shuffled_signs = input.shuffle(L::from_array(*block.shuffle_signs()));
    let negate_mask = shuffled_signs.eq_byte(b'-');
    let size = block.element_size();
    let element_count = block.element_count();

    debug_assert_ne!(size, ElementSize::One, "signed fields have at least two digits");
    match size {
        ElementSize::One => convert_1digit(shuffled, element_count, Unsigned(&mut output)),
        ElementSize::Two => {
            convert_2digits_signed(shuffled, negate_mask, element_count, &mut output)
        }
        ElementSize::Four => {
            convert_4digits_signed(shuffled, negate_mask, element_count, &mut output)
        }
        ElementSize::Eight => {
            convert_8digits_signed(shuffled, negate_mask, element_count, &mut output)
        }
        ElementSize::Irregular => {
            let (next, value) = scan_signed(data, pos + block.first_skip(), end);
            if let Some(value) = value {
                output.push(value);
            }
            if COLLECT {
                stats.record_scalar();
            }
            return next;
        }
    }

    if COLLECT {
        stats.record_vector(size, element_count, block.total_skip());
    }
    pos + block.total_skip()
}

/// Adapts a signed sink to receive non-negative unsigned values.
struct Unsigned<S>(S);

impl<S: Sink<i32>> Sink<u32> for Unsigned<S> {
    #[inline]
    fn push(&mut self, value: u32) {
        self.0.push(value as i32);
    }
}

/// Scan decimal digits from `pos` until a non-digit byte or `end`.
///
/// Returns the cursor after the last digit and the value, or `None` when no
/// digit was found. Values wider than `u32` wrap.
#[inline]
pub fn scan_unsigned(data: &[u8], pos: usize, end: usize) -> (usize, Option<u32>) {
    let end = end.min(data.len());
    let mut cursor = pos;
    let mut value = 0u32;
    while cursor < end {
        let digit = data[cursor].wrapping_sub(b'0');
        if digit > 9 {
            break;
        }
        value = value.wrapping_mul(10).wrapping_add(u32::from(digit));
        cursor += 1;
    }
    (cursor, (cursor > pos).then_some(value))
}

/// Scan an optionally signed decimal number from `pos`.
///
/// A leading `'+'` or `'-'` is consumed even when no digit follows; in that
/// case the cursor ends just after the sign and no value is returned.
#[inline]
pub fn scan_signed(data: &[u8], pos: usize, end: usize) -> (usize, Option<i32>) {
    let first = if pos < end { data.get(pos).copied() } else { None };
    let negative = match first {
        Some(b'-') => true,
        Some(b'+') => false,
        _ => {
            let (next, value) = scan_unsigned(data, pos, end);
            return (next, value.map(|v| v as i32));
        }
    };
    let (next, magnitude) = scan_unsigned(data, pos + 1, end);
    let value = magnitude.map(|m| {
        let m = m as i32;
        if negative {
            m.wrapping_neg()
        } else {
            m
        }
    });
    (next, value)
}
