//! Layout descriptors.
//!
//! A [`BlockInfo`] describes how one 16-byte window of input maps onto SIMD
//! lanes: which input bytes are digits, where the sign bytes are, how many
//! digits each field has and how far the cursor moves afterwards. Descriptor
//! tables are built by the caller (usually ahead of time, keyed by the
//! classification of the upcoming bytes); this module only checks that a
//! descriptor is well formed.
//!
//! # Lane conventions
//!
//! - `shuffle_digits` places field `i` in lanes `i * d .. (i + 1) * d` (where
//!   `d` is the digit count), most significant digit first. Short fields are
//!   right-aligned and the leading lanes use a zeroing byte (high bit set).
//! - `shuffle_signs` places the sign byte of field `i` at lane `i * d`.
//! - A mask byte with the high bit set zeroes its lane, any other byte must
//!   select one of the 16 input lanes.

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::WINDOW;

/// Mask byte that zeroes its output lane.
pub const ZERO_LANE: u8 = 0x80;

/// Digit count per field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ElementSize {
    /// One digit per field (up to 16 fields).
    One,
    /// Two digits per field (up to 8 fields).
    Two,
    /// Four digits per field (up to 4 fields).
    Four,
    /// Eight digits per field (up to 2 fields).
    Eight,
    /// No fixed lane mapping applies; one field is parsed by the scalar fallback.
    Irregular,
}

impl ElementSize {
    /// All fixed widths, narrowest first.
    pub const FIXED: [ElementSize; 4] = [Self::One, Self::Two, Self::Four, Self::Eight];

    /// Map a digit count to its width; anything other than 1/2/4/8 is irregular.
    pub fn from_digits(digits: u8) -> Self {
        match digits {
            1 => Self::One,
            2 => Self::Two,
            4 => Self::Four,
            8 => Self::Eight,
            _ => Self::Irregular,
        }
    }

    /// Digit count, or `None` for [`ElementSize::Irregular`].
    #[inline]
    pub fn digits(self) -> Option<usize> {
        match self {
            Self::One => Some(1),
            Self::Two => Some(2),
            Self::Four => Some(4),
            Self::Eight => Some(8),
            Self::Irregular => None,
        }
    }

    /// Maximum number of fields of this width in one window.
    pub fn max_elements(self) -> usize {
        self.digits().map_or(1, |d| WINDOW / d)
    }
}

/// Precomputed layout of one 16-byte window.
///
/// Deserialized descriptors go through [`BlockInfo::new`] and are rejected
/// when invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawBlockInfo"))]
pub struct BlockInfo {
    shuffle_digits: [u8; WINDOW],
    shuffle_signs: [u8; WINDOW],
    element_size: ElementSize,
    element_count: u8,
    first_skip: u8,
    total_skip: u8,
}

/// Unchecked serialized form of [`BlockInfo`].
#[cfg(feature = "serde")]
#[derive(Deserialize)]
struct RawBlockInfo {
    shuffle_digits: [u8; WINDOW],
    shuffle_signs: [u8; WINDOW],
    element_size: ElementSize,
    element_count: u8,
    first_skip: u8,
    total_skip: u8,
}

#[cfg(feature = "serde")]
impl TryFrom<RawBlockInfo> for BlockInfo {
    type Error = BlockInfoError;

    fn try_from(raw: RawBlockInfo) -> Result<Self, Self::Error> {
        Self::new(
            raw.shuffle_digits,
            raw.shuffle_signs,
            raw.element_size,
            raw.element_count,
            raw.first_skip,
            raw.total_skip,
        )
    }
}

impl BlockInfo {
    /// Create a descriptor, checking masks, element count and skips.
    pub fn new(
        shuffle_digits: [u8; WINDOW],
        shuffle_signs: [u8; WINDOW],
        element_size: ElementSize,
        element_count: u8,
        first_skip: u8,
        total_skip: u8,
    ) -> Result<Self, BlockInfoError> {
        check_mask(MaskName::Digits, &shuffle_digits)?;
        check_mask(MaskName::Signs, &shuffle_signs)?;

        if let Some(digits) = element_size.digits() {
            let count = element_count as usize;
            if count == 0 || count * digits > WINDOW {
                return Err(BlockInfoErrorKind::ElementCountOutOfRange {
                    element_size,
                    element_count,
                }
                .into());
            }
        }

        if first_skip as usize >= WINDOW {
            return Err(BlockInfoErrorKind::SkipOutOfRange {
                which: SkipName::First,
                value: first_skip,
            }
            .into());
        }
        if total_skip as usize > WINDOW {
            return Err(BlockInfoErrorKind::SkipOutOfRange {
                which: SkipName::Total,
                value: total_skip,
            }
            .into());
        }

        Ok(Self {
            shuffle_digits,
            shuffle_signs,
            element_size,
            element_count,
            first_skip,
            total_skip,
        })
    }

    /// Descriptor for a window handled by the scalar fallback.
    ///
    /// # Panics
    ///
    /// Panics if `first_skip >= 16`.
    pub fn irregular(first_skip: u8) -> Self {
        assert!(
            (first_skip as usize) < WINDOW,
            "first_skip must be less than {WINDOW}"
        );
        Self {
            shuffle_digits: [ZERO_LANE; WINDOW],
            shuffle_signs: [ZERO_LANE; WINDOW],
            element_size: ElementSize::Irregular,
            element_count: 1,
            first_skip,
            total_skip: 0,
        }
    }

    #[inline]
    pub fn shuffle_digits(&self) -> &[u8; WINDOW] {
        &self.shuffle_digits
    }

    #[inline]
    pub fn shuffle_signs(&self) -> &[u8; WINDOW] {
        &self.shuffle_signs
    }

    #[inline]
    pub fn element_size(&self) -> ElementSize {
        self.element_size
    }

    /// Number of fields in the window (1 for irregular descriptors).
    #[inline]
    pub fn element_count(&self) -> usize {
        self.element_count as usize
    }

    /// Bytes skipped before the field in the scalar fallback.
    #[inline]
    pub fn first_skip(&self) -> usize {
        self.first_skip as usize
    }

    /// Bytes consumed by a vectorized call.
    #[inline]
    pub fn total_skip(&self) -> usize {
        self.total_skip as usize
    }
}

fn check_mask(mask: MaskName, bytes: &[u8; WINDOW]) -> Result<(), BlockInfoError> {
    match bytes
        .iter()
        .position(|&b| (b & ZERO_LANE) == 0 && b as usize >= WINDOW)
    {
        Some(lane) => Err(BlockInfoErrorKind::MaskLaneOutOfRange {
            mask,
            lane,
            value: bytes[lane],
        }
        .into()),
        None => Ok(()),
    }
}

/// Which shuffle mask an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaskName {
    Digits,
    Signs,
}

/// Which skip value an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipName {
    First,
    Total,
}

/// Kinds of descriptor errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockInfoErrorKind {
    /// A mask byte selects a lane outside the window without zeroing it.
    MaskLaneOutOfRange { mask: MaskName, lane: usize, value: u8 },
    /// The fields do not fit the window, or there are none.
    ElementCountOutOfRange {
        element_size: ElementSize,
        element_count: u8,
    },
    /// A skip does not fit the window.
    SkipOutOfRange { which: SkipName, value: u8 },
}

impl fmt::Display for BlockInfoErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MaskLaneOutOfRange { mask, lane, value } => {
                let name = match mask {
                    MaskName::Digits => "shuffle_digits",
                    MaskName::Signs => "shuffle_signs",
                };
                write!(
                    f,
                    "{} lane {} selects input lane 0x{:02X} outside the window",
                    name, lane, value
                )
            }
            Self::ElementCountOutOfRange {
                element_size,
                element_count,
            } => write!(
                f,
                "{} fields of {:?} digits do not fit a {}-byte window",
                element_count, element_size, WINDOW
            ),
            Self::SkipOutOfRange { which, value } => {
                let name = match which {
                    SkipName::First => "first_skip",
                    SkipName::Total => "total_skip",
                };
                write!(f, "{} of {} exceeds the {}-byte window", name, value, WINDOW)
            }
        }
    }
}

/// A rejected layout descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockInfoError {
    /// The kind of error.
    pub kind: BlockInfoErrorKind,
}

impl From<BlockInfoErrorKind> for BlockInfoError {
    fn from(kind: BlockInfoErrorKind) -> Self {
        Self { kind }
    }
}

impl fmt::Display for BlockInfoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid block descriptor: {}", self.kind)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for BlockInfoError {}

#[cfg(test)]
mod tests {
    use super::*;

    const Z: u8 = ZERO_LANE;

    #[test]
    fn test_element_size_from_digits() {
        assert_eq!(ElementSize::from_digits(1), ElementSize::One);
        assert_eq!(ElementSize::from_digits(2), ElementSize::Two);
        assert_eq!(ElementSize::from_digits(4), ElementSize::Four);
        assert_eq!(ElementSize::from_digits(8), ElementSize::Eight);
        assert_eq!(ElementSize::from_digits(0), ElementSize::Irregular);
        assert_eq!(ElementSize::from_digits(3), ElementSize::Irregular);
        assert_eq!(ElementSize::from_digits(16), ElementSize::Irregular);
    }

    #[test]
    fn test_max_elements() {
        assert_eq!(ElementSize::One.max_elements(), 16);
        assert_eq!(ElementSize::Two.max_elements(), 8);
        assert_eq!(ElementSize::Four.max_elements(), 4);
        assert_eq!(ElementSize::Eight.max_elements(), 2);
        assert_eq!(ElementSize::Irregular.max_elements(), 1);
    }

    #[test]
    fn test_new_accepts_full_window() {
        let identity: [u8; 16] = core::array::from_fn(|i| i as u8);
        let block =
            BlockInfo::new(identity, [Z; 16], ElementSize::Eight, 2, 0, 16).unwrap();
        assert_eq!(block.element_count(), 2);
        assert_eq!(block.total_skip(), 16);
        assert_eq!(block.shuffle_digits(), &identity);
    }

    #[test]
    fn test_new_rejects_mask_lane() {
        let mut digits = [Z; 16];
        digits[5] = 16;
        let err = BlockInfo::new(digits, [Z; 16], ElementSize::One, 1, 0, 1).unwrap_err();
        assert_eq!(
            err.kind,
            BlockInfoErrorKind::MaskLaneOutOfRange {
                mask: MaskName::Digits,
                lane: 5,
                value: 16
            }
        );

        let mut signs = [Z; 16];
        signs[0] = 0x7F;
        let err = BlockInfo::new([Z; 16], signs, ElementSize::Two, 1, 0, 3).unwrap_err();
        assert!(matches!(
            err.kind,
            BlockInfoErrorKind::MaskLaneOutOfRange {
                mask: MaskName::Signs,
                lane: 0,
                ..
            }
        ));
    }

    #[test]
    fn test_new_rejects_element_count() {
        assert!(BlockInfo::new([Z; 16], [Z; 16], ElementSize::Four, 0, 0, 0).is_err());
        assert!(BlockInfo::new([Z; 16], [Z; 16], ElementSize::Four, 5, 0, 16).is_err());
        assert!(BlockInfo::new([Z; 16], [Z; 16], ElementSize::Eight, 3, 0, 16).is_err());
        // Irregular descriptors ignore the count.
        assert!(BlockInfo::new([Z; 16], [Z; 16], ElementSize::Irregular, 0, 0, 0).is_ok());
    }

    #[test]
    fn test_new_rejects_skips() {
        let err = BlockInfo::new([Z; 16], [Z; 16], ElementSize::One, 1, 16, 1).unwrap_err();
        assert_eq!(
            err.kind,
            BlockInfoErrorKind::SkipOutOfRange {
                which: SkipName::First,
                value: 16
            }
        );
        let err = BlockInfo::new([Z; 16], [Z; 16], ElementSize::One, 1, 0, 17).unwrap_err();
        assert_eq!(
            err.kind,
            BlockInfoErrorKind::SkipOutOfRange {
                which: SkipName::Total,
                value: 17
            }
        );
    }

    #[test]
    fn test_irregular() {
        let block = BlockInfo::irregular(3);
        assert_eq!(block.element_size(), ElementSize::Irregular);
        assert_eq!(block.first_skip(), 3);
        assert_eq!(block.shuffle_digits(), &[Z; 16]);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_deserialize_validates() {
        let block = BlockInfo::new(
            [0, 1, 3, 4, Z, Z, Z, Z, Z, Z, Z, Z, Z, Z, Z, Z],
            [Z; 16],
            ElementSize::Two,
            2,
            0,
            6,
        )
        .unwrap();
        let json = serde_json::to_string(&block).unwrap();
        assert_eq!(serde_json::from_str::<BlockInfo>(&json).unwrap(), block);

        let overfull = json.replace("\"element_count\":2", "\"element_count\":20");
        assert_ne!(overfull, json);
        let err = serde_json::from_str::<BlockInfo>(&overfull).unwrap_err();
        assert!(err.to_string().contains("do not fit"), "{}", err);

        let bad_skip = json.replace("\"total_skip\":6", "\"total_skip\":40");
        assert!(serde_json::from_str::<BlockInfo>(&bad_skip).is_err());
    }

    #[test]
    fn test_error_display() {
        let err = BlockInfo::new([Z; 16], [Z; 16], ElementSize::One, 1, 0, 20).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid block descriptor: total_skip of 20 exceeds the 16-byte window"
        );
    }
}
