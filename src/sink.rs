//! Output capability for parsed values.
//!
//! The parser appends values in field order and never inspects the result,
//! so anything that can accept "the next value" works as an output.

use alloc::collections::VecDeque;
use alloc::vec::Vec;

/// Append-only receiver of parsed integers.
pub trait Sink<T> {
    /// Accept the next value.
    fn push(&mut self, value: T);
}

impl<T> Sink<T> for Vec<T> {
    #[inline]
    fn push(&mut self, value: T) {
        Vec::push(self, value);
    }
}

impl<T> Sink<T> for VecDeque<T> {
    #[inline]
    fn push(&mut self, value: T) {
        self.push_back(value);
    }
}

impl<T, S: Sink<T> + ?Sized> Sink<T> for &mut S {
    #[inline]
    fn push(&mut self, value: T) {
        (**self).push(value);
    }
}
