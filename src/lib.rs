//! # Lanewise
//!
//! SIMD batch conversion of fixed-layout ASCII decimal fields into integers.
//!
//! Many integers laid out back-to-back in a byte buffer (for example the numeric
//! columns of a tabular text format) are converted 16 bytes at a time: a
//! precomputed [`BlockInfo`] descriptor shuffles the digit bytes of one window
//! into SIMD lanes, and a lane-parallel multiply-add turns each group of
//! 1, 2, 4 or 8 digits into a binary integer. Windows whose layout is irregular
//! fall back to a bounded byte-at-a-time scan of a single field.
//!
//! ## Module Organization
//!
//! - [`block`] - Layout descriptors consumed by the parser
//! - [`convert`] - Lane-parallel digit conversion for 1/2/4/8 digit fields
//! - [`parse`] - Unsigned/signed entry operations and the scalar fallback
//! - [`parser`] - Session facade owning config, back-end and statistics
//! - [`simd`] - 128-bit lane primitives with portable and SSE back-ends
//! - [`stats`] - Per-session counters
//!
//! ## Quick Start
//!
//! ```
//! use lanewise::{BlockInfo, ElementSize, Parser, ParserConfig};
//!
//! // "12,34,56": three 2-digit fields, one separator byte between fields.
//! const Z: u8 = 0x80;
//! let block = BlockInfo::new(
//!     [0, 1, 3, 4, 6, 7, Z, Z, Z, Z, Z, Z, Z, Z, Z, Z],
//!     [Z; 16],
//!     ElementSize::Two,
//!     3,
//!     0,
//!     9,
//! )
//! .unwrap();
//!
//! let buffer = b"12,34,56,";
//! let mut parser = Parser::new(ParserConfig::default());
//! let mut values = Vec::new();
//! let next = parser.parse_unsigned(&block, buffer, 0, buffer.len(), &mut values);
//!
//! assert_eq!(values, [12, 34, 56]);
//! assert_eq!(next, 9);
//! ```
//!
//! ## Features
//!
//! - `std` (default) - Runtime CPU detection for the SSE back-end
//! - `statistics` - Collect statistics unless the config turns them off
//! - `serde` - Serialization of descriptors, config and statistics
//! - `cli` - The `lanewise` benchmark binary

// Use no_std unless std feature is enabled or we're in test mode
#![cfg_attr(not(any(test, feature = "std")), no_std)]

// When using no_std, we need to explicitly link the alloc crate
#[cfg(not(any(test, feature = "std")))]
extern crate alloc;

// When using std, re-export alloc types from std for compatibility
#[cfg(any(test, feature = "std"))]
extern crate std as alloc;

/// Layout descriptors for one 16-byte input window.
pub mod block;

/// Runtime configuration of a parse session.
pub mod config;

/// Lane-parallel decimal conversion.
pub mod convert;

/// Entry operations: dispatch by field width, scalar fallback.
pub mod parse;

/// Session facade.
pub mod parser;

/// 128-bit lane primitives and back-end selection.
pub mod simd;

/// Append-only output capability.
pub mod sink;

/// Parse statistics.
pub mod stats;

pub use block::{BlockInfo, BlockInfoError, BlockInfoErrorKind, ElementSize};
pub use config::ParserConfig;
pub use parser::{load_window, sign_bytemask, Parser};
pub use simd::{Backend, Lanes, Portable};
pub use sink::Sink;
pub use stats::{Statistics, WidthCounters};

/// Width of one input window in bytes.
pub const WINDOW: usize = 16;
