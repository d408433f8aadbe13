//! Combining operations applied per element by the permute engine.
//!
//! A combining operation consumes the current destination slot and the
//! current source value and updates the slot in place. The engine is generic
//! over `Op: CombineOp<T> + ?Sized`, so the same call site works with a
//! zero-sized marker type (static dispatch), a closure, or a
//! `&dyn CombineOp<T>` chosen at runtime:
//!
//! ```
//! use strided_traits::{AddAssign, Assign, CombineOp};
//!
//! fn pick(accumulate: bool) -> &'static dyn CombineOp<f64> {
//!     if accumulate { &AddAssign } else { &Assign }
//! }
//!
//! let mut slot = 1.0;
//! pick(true).combine(&mut slot, 2.0);
//! assert_eq!(slot, 3.0);
//! pick(false).combine(&mut slot, 5.0);
//! assert_eq!(slot, 5.0);
//! ```

use std::ops::{Add, Mul};

/// Binary per-element operation `dst <- f(dst, src)`.
pub trait CombineOp<T> {
    /// Update `dst` with `src`.
    fn combine(&self, dst: &mut T, src: T);
}

/// Plain assignment: `*dst = src`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Assign;

/// Accumulation: `*dst = *dst + src`.
///
/// Not idempotent: running a permuted copy twice with this operation into
/// the same destination adds the source twice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AddAssign;

/// Scaled accumulation: `*dst = *dst + alpha * src`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScaledAdd<T> {
    pub alpha: T,
}

impl<T> ScaledAdd<T> {
    pub fn new(alpha: T) -> Self {
        Self { alpha }
    }
}

impl<T> CombineOp<T> for Assign {
    #[inline(always)]
    fn combine(&self, dst: &mut T, src: T) {
        *dst = src;
    }
}

impl<T: Copy + Add<Output = T>> CombineOp<T> for AddAssign {
    #[inline(always)]
    fn combine(&self, dst: &mut T, src: T) {
        *dst = *dst + src;
    }
}

impl<T: Copy + Add<Output = T> + Mul<Output = T>> CombineOp<T> for ScaledAdd<T> {
    #[inline(always)]
    fn combine(&self, dst: &mut T, src: T) {
        *dst = *dst + self.alpha * src;
    }
}

// Any `Fn(&mut T, T)` closure is a combining operation.
impl<T, F> CombineOp<T> for F
where
    F: Fn(&mut T, T),
{
    #[inline(always)]
    fn combine(&self, dst: &mut T, src: T) {
        self(dst, src)
    }
}
