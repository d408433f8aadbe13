//! Multi-index odometer over per-axis inclusive bounds.

use std::ops::Index;

use strided_view::{Result, StridedError};

/// Odometer over a multi-dimensional index space.
///
/// Each axis runs over an inclusive `[min, max]`; axes that were never
/// configured stay pinned at 0. Axis 0 is least significant: [`advance`]
/// increments it first and carries into higher axes on overflow. Every
/// combination is visited exactly once, after which the counter is done.
///
/// ```
/// use strided_perm::GCounter;
///
/// let mut c = GCounter::new(2);
/// c.set_range(0, 0, 1).unwrap();
/// c.set_range(1, 5, 6).unwrap();
/// let mut seen = Vec::new();
/// while c.not_done() {
///     seen.push(c.index().to_vec());
///     c.advance();
/// }
/// assert_eq!(seen, vec![vec![0, 5], vec![1, 5], vec![0, 6], vec![1, 6]]);
/// ```
///
/// [`advance`]: GCounter::advance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GCounter {
    first: Vec<usize>,
    last: Vec<usize>,
    index: Vec<usize>,
    done: bool,
}

impl GCounter {
    /// Counter of the given rank with every axis pinned at 0.
    pub fn new(rank: usize) -> Self {
        Self {
            first: vec![0; rank],
            last: vec![0; rank],
            index: vec![0; rank],
            done: false,
        }
    }

    /// Set the inclusive bounds of one axis and restart iteration.
    pub fn set_range(&mut self, axis: usize, min: usize, max: usize) -> Result<()> {
        let rank = self.rank();
        if axis >= rank {
            return Err(StridedError::InvalidAxis { axis, rank });
        }
        if min > max {
            return Err(StridedError::EmptyRange {
                axis,
                start: min,
                stop: max,
            });
        }
        self.first[axis] = min;
        self.last[axis] = max;
        self.reset();
        Ok(())
    }

    /// Return to the first combination.
    pub fn reset(&mut self) {
        self.index.copy_from_slice(&self.first);
        self.done = false;
    }

    /// Step to the next combination; a no-op once done.
    #[inline]
    pub fn advance(&mut self) {
        if self.done {
            return;
        }
        for axis in 0..self.index.len() {
            if self.index[axis] < self.last[axis] {
                self.index[axis] += 1;
                return;
            }
            self.index[axis] = self.first[axis];
        }
        self.done = true;
    }

    #[inline]
    pub fn not_done(&self) -> bool {
        !self.done
    }

    /// Current multi-index.
    #[inline]
    pub fn index(&self) -> &[usize] {
        &self.index
    }

    #[inline]
    pub fn rank(&self) -> usize {
        self.index.len()
    }

    /// Total number of combinations (1 for rank 0).
    pub fn count(&self) -> usize {
        self.first
            .iter()
            .zip(&self.last)
            .map(|(&lo, &hi)| hi - lo + 1)
            .product()
    }

    /// Jump to the `n`-th combination in visiting order; done if `n` is past
    /// the end.
    pub fn seek(&mut self, n: usize) {
        if n >= self.count() {
            self.reset();
            self.done = true;
            return;
        }
        let mut rest = n;
        for axis in 0..self.index.len() {
            let span = self.last[axis] - self.first[axis] + 1;
            self.index[axis] = self.first[axis] + rest % span;
            rest /= span;
        }
        self.done = false;
    }
}

impl Index<usize> for GCounter {
    type Output = usize;

    #[inline]
    fn index(&self, axis: usize) -> &usize {
        &self.index[axis]
    }
}
