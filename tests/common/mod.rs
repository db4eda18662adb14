//! Descriptor construction for tests.
//!
//! The library consumes descriptors but never builds them; these helpers play
//! the role of the descriptor table for layouts the tests generate themselves.

#![allow(dead_code)]

use lanewise::block::ZERO_LANE;
use lanewise::{Backend, BlockInfo, ElementSize, Parser, ParserConfig};

/// Where one field sits in the window.
#[derive(Debug, Clone, Copy)]
pub struct Field {
    /// Offset of the sign byte, if the field has one.
    pub sign: Option<usize>,
    /// Offset of the first digit.
    pub start: usize,
    /// Number of digits (at most the element size).
    pub len: usize,
}

/// Descriptor for fixed-width fields at the given offsets.
pub fn fixed_block(size: ElementSize, fields: &[Field], total_skip: usize) -> BlockInfo {
    let digits = size.digits().expect("fixed width");
    let mut shuffle_digits = [ZERO_LANE; 16];
    let mut shuffle_signs = [ZERO_LANE; 16];
    for (i, field) in fields.iter().enumerate() {
        assert!(field.len <= digits);
        let group = i * digits;
        let pad = digits - field.len;
        for k in 0..field.len {
            shuffle_digits[group + pad + k] = (field.start + k) as u8;
        }
        if let Some(sign) = field.sign {
            shuffle_signs[group] = sign as u8;
        }
    }
    BlockInfo::new(
        shuffle_digits,
        shuffle_signs,
        size,
        fields.len() as u8,
        0,
        total_skip as u8,
    )
    .expect("valid descriptor")
}

/// Render `values` zero-padded to `digits`, each followed by `separators`
/// commas, and return the text together with its descriptor.
pub fn uniform_unsigned(
    size: ElementSize,
    values: &[u32],
    separators: usize,
) -> (Vec<u8>, BlockInfo) {
    let digits = size.digits().expect("fixed width");
    let mut text = Vec::new();
    let mut fields = Vec::new();
    for &value in values {
        fields.push(Field {
            sign: None,
            start: text.len(),
            len: digits,
        });
        text.extend_from_slice(format!("{:0width$}", value, width = digits).as_bytes());
        text.extend(std::iter::repeat(b',').take(separators));
    }
    let block = fixed_block(size, &fields, text.len());
    (text, block)
}

/// Every back-end the running CPU supports.
pub fn supported_backends() -> Vec<Backend> {
    Backend::ALL
        .into_iter()
        .filter(|b| b.is_supported())
        .collect()
}

pub fn parser(backend: Backend) -> Parser {
    Parser::new(ParserConfig::profiling().with_backend(backend))
}
