//! Synthetic fixed-width columns and their descriptors.

use anyhow::{bail, Result};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use lanewise::block::ZERO_LANE;
use lanewise::{BlockInfo, ElementSize};

/// A generated column: `count` fields of `digits` zero-padded digits, each
/// optionally preceded by a sign and followed by `,`.
pub struct Column {
    pub text: Vec<u8>,
    pub size: ElementSize,
    pub signed: bool,
    pub count: usize,
}

impl Column {
    /// Bytes per field including sign and separator.
    pub fn stride(&self) -> usize {
        self.digits() + usize::from(self.signed) + 1
    }

    pub fn digits(&self) -> usize {
        self.size.digits().unwrap_or(0)
    }

    /// Fields covered by one full window.
    pub fn per_window(&self) -> usize {
        (16 / self.stride()).min(self.size.max_elements()).max(1)
    }
}

pub fn generate_column(
    size: ElementSize,
    count: usize,
    signed: bool,
    seed: Option<u64>,
) -> Result<Column> {
    let Some(digits) = size.digits() else {
        bail!("column width must be 1, 2, 4 or 8 digits");
    };
    if signed && digits == 1 {
        bail!("signed columns need at least two digits");
    }

    let mut rng = ChaCha8Rng::seed_from_u64(seed.unwrap_or(0));
    let limit = 10u32.pow(digits as u32);
    let stride = digits + usize::from(signed) + 1;
    let mut text = Vec::with_capacity(count * stride);
    for _ in 0..count {
        if signed {
            text.push(if rng.gen::<bool>() { b'-' } else { b'+' });
        }
        let value = rng.gen_range(0..limit);
        text.extend_from_slice(format!("{:0width$},", value, width = digits).as_bytes());
    }

    Ok(Column {
        text,
        size,
        signed,
        count,
    })
}

/// Descriptors indexed by field count: `blocks[k]` covers `k` fields
/// (`blocks[0]` is unused).
pub fn column_blocks(column: &Column) -> Result<Vec<BlockInfo>> {
    let digits = column.digits();
    let stride = column.stride();
    let sign_offset = usize::from(column.signed);

    let mut blocks = vec![BlockInfo::irregular(0)];
    for fields in 1..=column.per_window() {
        let mut shuffle_digits = [ZERO_LANE; 16];
        let mut shuffle_signs = [ZERO_LANE; 16];
        for field in 0..fields {
            let start = field * stride;
            for k in 0..digits {
                shuffle_digits[field * digits + k] = (start + sign_offset + k) as u8;
            }
            if column.signed {
                shuffle_signs[field * digits] = start as u8;
            }
        }
        blocks.push(BlockInfo::new(
            shuffle_digits,
            shuffle_signs,
            column.size,
            fields as u8,
            0,
            (fields * stride) as u8,
        )?);
    }
    Ok(blocks)
}

/// Reference values from `str::parse`.
pub fn reference_values(column: &Column) -> Result<Vec<i64>> {
    column
        .text
        .split(|&b| b == b',')
        .filter(|field| !field.is_empty())
        .map(|field| -> Result<i64> { Ok(std::str::from_utf8(field)?.parse()?) })
        .collect()
}
