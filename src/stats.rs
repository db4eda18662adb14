//! Parse statistics.
//!
//! One [`Statistics`] record belongs to one parse session. Counters only ever
//! grow; the record is read after the session completes. Sessions running on
//! different threads keep separate records and [`Statistics::merge`] them
//! afterwards.

use alloc::vec;
use alloc::vec::Vec;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::block::ElementSize;
use crate::WINDOW;

/// Largest histogram bound; descriptors store `total_skip` in a byte.
pub const MAX_HISTOGRAM_SKIP: usize = u8::MAX as usize;

/// Counters for one fixed field width.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WidthCounters {
    /// Vectorized calls using this width.
    pub calls: u64,
    /// Fields converted by those calls.
    pub conversions: u64,
}

impl WidthCounters {
    fn merge(&mut self, other: &Self) {
        self.calls += other.calls;
        self.conversions += other.conversions;
    }
}

/// Counters accumulated over a parse session.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Statistics {
    pub digit1: WidthCounters,
    pub digit2: WidthCounters,
    pub digit4: WidthCounters,
    pub digit8: WidthCounters,
    /// Scalar fallback invocations.
    pub scalar_conversions: u64,
    /// Vectorized calls per `total_skip` value; index is the skip.
    total_skip_histogram: Vec<u64>,
    /// Vectorized calls whose skip exceeded the histogram bound.
    histogram_overflow: u64,
}

impl Default for Statistics {
    fn default() -> Self {
        Self::with_max_total_skip(WINDOW)
    }
}

impl Statistics {
    /// Create an empty record whose histogram covers skips `0..=max_total_skip`.
    ///
    /// The bound is clamped to [`MAX_HISTOGRAM_SKIP`].
    pub fn with_max_total_skip(max_total_skip: usize) -> Self {
        let max_total_skip = max_total_skip.min(MAX_HISTOGRAM_SKIP);
        Self {
            digit1: WidthCounters::default(),
            digit2: WidthCounters::default(),
            digit4: WidthCounters::default(),
            digit8: WidthCounters::default(),
            scalar_conversions: 0,
            total_skip_histogram: vec![0; max_total_skip + 1],
            histogram_overflow: 0,
        }
    }

    /// Largest skip with its own histogram bucket.
    pub fn max_total_skip(&self) -> usize {
        self.total_skip_histogram.len().saturating_sub(1)
    }

    /// Record one vectorized call.
    #[inline]
    pub fn record_vector(&mut self, size: ElementSize, count: usize, total_skip: usize) {
        if let Some(counters) = self.width_mut(size) {
            counters.calls += 1;
            counters.conversions += count as u64;
        }
        self.record_skip(total_skip, 1);
    }

    /// Record one scalar fallback call.
    #[inline]
    pub fn record_scalar(&mut self) {
        self.scalar_conversions += 1;
    }

    #[inline]
    fn record_skip(&mut self, total_skip: usize, calls: u64) {
        match self.total_skip_histogram.get_mut(total_skip) {
            Some(bucket) => *bucket += calls,
            None => self.histogram_overflow += calls,
        }
    }

    /// Counters for a fixed width; irregular widths have none.
    pub fn width(&self, size: ElementSize) -> Option<&WidthCounters> {
        match size {
            ElementSize::One => Some(&self.digit1),
            ElementSize::Two => Some(&self.digit2),
            ElementSize::Four => Some(&self.digit4),
            ElementSize::Eight => Some(&self.digit8),
            ElementSize::Irregular => None,
        }
    }

    fn width_mut(&mut self, size: ElementSize) -> Option<&mut WidthCounters> {
        match size {
            ElementSize::One => Some(&mut self.digit1),
            ElementSize::Two => Some(&mut self.digit2),
            ElementSize::Four => Some(&mut self.digit4),
            ElementSize::Eight => Some(&mut self.digit8),
            ElementSize::Irregular => None,
        }
    }

    pub fn total_skip_histogram(&self) -> &[u64] {
        &self.total_skip_histogram
    }

    pub fn histogram_overflow(&self) -> u64 {
        self.histogram_overflow
    }

    /// Total vectorized calls across all widths.
    pub fn vector_calls(&self) -> u64 {
        self.widths().map(|w| w.calls).sum()
    }

    /// Total fields converted by vectorized calls.
    pub fn vector_conversions(&self) -> u64 {
        self.widths().map(|w| w.conversions).sum()
    }

    fn widths(&self) -> impl Iterator<Item = &WidthCounters> {
        [&self.digit1, &self.digit2, &self.digit4, &self.digit8].into_iter()
    }

    /// Add another session's counters to this one.
    ///
    /// Buckets of `other` beyond this record's bound go to the overflow counter.
    pub fn merge(&mut self, other: &Statistics) {
        self.digit1.merge(&other.digit1);
        self.digit2.merge(&other.digit2);
        self.digit4.merge(&other.digit4);
        self.digit8.merge(&other.digit8);
        self.scalar_conversions += other.scalar_conversions;
        for (skip, &calls) in other.total_skip_histogram.iter().enumerate() {
            if calls != 0 {
                self.record_skip(skip, calls);
            }
        }
        self.histogram_overflow += other.histogram_overflow;
    }
}
