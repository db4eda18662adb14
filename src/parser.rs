//! Session facade.
//!
//! A [`Parser`] bundles what one parse session needs: the configuration, the
//! back-end chosen for the running CPU and the statistics record. Its methods
//! load the window at the cursor themselves (zero-padding past the end of the
//! buffer), so callers only supply descriptors and cursors.

use tracing::{debug, warn};

use crate::block::BlockInfo;
use crate::config::ParserConfig;
use crate::parse;
use crate::simd::{Backend, Lanes, Portable};
use crate::sink::Sink;
use crate::stats::Statistics;
use crate::WINDOW;

/// Copy the 16 bytes at `pos`, zero-padding whatever lies past the buffer.
#[inline]
pub fn load_window(buffer: &[u8], pos: usize) -> [u8; WINDOW] {
    let mut window = [0u8; WINDOW];
    let available = buffer.get(pos..).unwrap_or(&[]);
    let n = available.len().min(WINDOW);
    window[..n].copy_from_slice(&available[..n]);
    window
}

/// `0xFF` in every lane holding a `'+'` or `'-'` byte.
#[inline]
pub fn sign_bytemask(window: &[u8; WINDOW]) -> [u8; WINDOW] {
    let input = Portable(*window);
    input.eq_byte(b'-').or(input.eq_byte(b'+')).to_array()
}

/// A parse session.
#[derive(Debug, Clone)]
pub struct Parser {
    config: ParserConfig,
    backend: Backend,
    stats: Statistics,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new(ParserConfig::default())
    }
}

impl Parser {
    /// Start a session, resolving the back-end for the running CPU.
    pub fn new(config: ParserConfig) -> Self {
        let backend = match config.backend {
            Some(forced) if forced.is_supported() => forced,
            Some(forced) => {
                let detected = Backend::detect();
                warn!(
                    requested = %forced,
                    fallback = %detected,
                    "requested back-end is not supported on this CPU"
                );
                detected
            }
            None => Backend::detect(),
        };
        debug!(
            %backend,
            collect_statistics = config.collect_statistics,
            max_total_skip = config.max_total_skip,
            "parser session started"
        );
        Self {
            stats: Statistics::with_max_total_skip(config.max_total_skip),
            config,
            backend,
        }
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    pub fn statistics(&self) -> &Statistics {
        &self.stats
    }

    /// End the session, returning its statistics.
    pub fn into_statistics(self) -> Statistics {
        self.stats
    }

    /// Parse the unsigned fields of the window at `pos`; returns the new cursor.
    ///
    /// `end` bounds the scalar fallback and must not exceed `buffer.len()`.
    pub fn parse_unsigned<S: Sink<u32>>(
        &mut self,
        block: &BlockInfo,
        buffer: &[u8],
        pos: usize,
        end: usize,
        output: S,
    ) -> usize {
        debug_assert!(end <= buffer.len());
        let window = load_window(buffer, pos);
        if self.config.collect_statistics {
            self.unsigned_with::<S, true>(block, &window, buffer, pos, end, output)
        } else {
            self.unsigned_with::<S, false>(block, &window, buffer, pos, end, output)
        }
    }

    /// Parse the signed fields of the window at `pos`; returns the new cursor.
    ///
    /// `end` bounds the scalar fallback and must not exceed `buffer.len()`.
    pub fn parse_signed<S: Sink<i32>>(
        &mut self,
        block: &BlockInfo,
        buffer: &[u8],
        pos: usize,
        end: usize,
        output: S,
    ) -> usize {
        debug_assert!(end <= buffer.len());
        let window = load_window(buffer, pos);
        if self.config.collect_statistics {
            self.signed_with::<S, true>(block, &window, buffer, pos, end, output)
        } else {
            self.signed_with::<S, false>(block, &window, buffer, pos, end, output)
        }
    }

    #[inline]
    fn unsigned_with<S: Sink<u32>, const COLLECT: bool>(
        &mut self,
        block: &BlockInfo,
        window: &[u8; WINDOW],
        buffer: &[u8],
        pos: usize,
        end: usize,
        output: S,
    ) -> usize {
        match self.backend {
            #[cfg(target_arch = "x86_64")]
            // SAFETY: `backend` is only Sse41 after `is_supported` returned true.
            Backend::Sse41 => unsafe {
                crate::simd::x86::parse_unsigned_sse41::<S, COLLECT>(
                    block,
                    window,
                    buffer,
                    pos,
                    end,
                    &mut self.stats,
                    output,
                )
            },
            _ => parse::parse_unsigned::<Portable, S, COLLECT>(
                block,
                Portable(*window),
                buffer,
                pos,
                end,
                &mut self.stats,
                output,
            ),
        }
    }

    #[inline]
    fn signed_with<S: Sink<i32>, const COLLECT: bool>(
        &mut self,
        block: &BlockInfo,
        window: &[u8; WINDOW],
        buffer: &[u8],
        pos: usize,
        end: usize,
        output: S,
    ) -> usize {
        match self.backend {
            #[cfg(target_arch = "x86_64")]
            // SAFETY: `backend` is only Sse41 after `is_supported` returned true.
            Backend::Sse41 => unsafe {
                crate::simd::x86::parse_signed_sse41::<S, COLLECT>(
                    block,
                    window,
                    buffer,
                    pos,
                    end,
                    &mut self.stats,
                    output,
                )
            },
            _ => parse::parse_signed::<Portable, S, COLLECT>(
                block,
                Portable(*window),
                Portable(sign_bytemask(window)),
                buffer,
                pos,
                end,
                &mut self.stats,
                output,
            ),
        }
    }
}
