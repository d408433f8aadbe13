//! Zero-copy view construction: sub-ranges, axis grouping and permutation.
//!
//! Every operation here rewrites only the range and base offset of a view;
//! the result aliases the same storage. Checks run when
//! [`default_validation`](crate::default_validation) is
//! [`Validation::Checked`](crate::Validation::Checked).
//!
//! Operations on [`StridedViewMut`] consume the view, matching
//! [`StridedViewMut::permute`] in never leaving two live mutable aliases.

use crate::config::default_validation;
use crate::permutation::Permutation;
use crate::range::Range;
use crate::view::{StridedView, StridedViewMut};
use crate::{Result, StridedError};

/// Range and base offset of the hyper-rectangle `[start, stop)`.
fn sub_tensor_parts(
    range: &Range,
    offset: isize,
    start: &[usize],
    stop: &[usize],
) -> Result<(Range, isize)> {
    let rank = range.rank();
    if default_validation().is_checked() {
        for got in [start.len(), stop.len()] {
            if got != rank {
                return Err(StridedError::BoundsLength {
                    expected: rank,
                    got,
                });
            }
        }
        for axis in 0..rank {
            check_span(axis, start[axis], stop[axis], range.extent(axis))?;
        }
    }
    let mut new_offset = offset;
    let mut dims = Vec::with_capacity(rank);
    for axis in 0..rank {
        new_offset += range.stride(axis) * start[axis] as isize;
        dims.push(stop[axis].saturating_sub(start[axis]));
    }
    Ok((
        Range::from_vecs(dims, range.strides().to_vec()),
        new_offset,
    ))
}

/// Range and base offset with axis `axis` narrowed to `[start, stop)`.
fn sub_index_parts(
    range: &Range,
    offset: isize,
    axis: usize,
    start: usize,
    stop: usize,
) -> Result<(Range, isize)> {
    if default_validation().is_checked() {
        let rank = range.rank();
        if axis >= rank {
            return Err(StridedError::InvalidAxis { axis, rank });
        }
        check_span(axis, start, stop, range.extent(axis))?;
    }
    Ok((
        range.with_extent(axis, stop.saturating_sub(start)),
        offset + range.stride(axis) * start as isize,
    ))
}

fn group_range(range: &Range, start: usize, end: usize) -> Result<Range> {
    if default_validation().is_checked() {
        range.grouped(start, end)
    } else {
        Ok(range.grouped_unchecked(start, end))
    }
}

fn permute_range(range: &Range, perm: &Permutation) -> Result<Range> {
    if default_validation().is_checked() && perm.rank() != range.rank() {
        return Err(StridedError::PermutationLength {
            len: perm.rank(),
            rank: range.rank(),
        });
    }
    Ok(range.permuted(perm))
}

fn check_span(axis: usize, start: usize, stop: usize, extent: usize) -> Result<()> {
    if start >= stop {
        return Err(StridedError::EmptyRange { axis, start, stop });
    }
    if stop > extent {
        return Err(StridedError::StopOutOfBounds { axis, stop, extent });
    }
    Ok(())
}

impl<'a, T> StridedView<'a, T> {
    /// View of the hyper-rectangle `[start[j], stop[j])` on every axis.
    ///
    /// Strides are unchanged; the base moves by `Σ stride[j] * start[j]`.
    pub fn sub_tensor(&self, start: &[usize], stop: &[usize]) -> Result<StridedView<'a, T>> {
        let (range, offset) = sub_tensor_parts(&self.range, self.offset, start, stop)?;
        Ok(StridedView {
            data: self.data,
            range,
            offset,
        })
    }

    /// View with one axis narrowed to `[start, stop)`.
    pub fn sub_index(&self, axis: usize, start: usize, stop: usize) -> Result<StridedView<'a, T>> {
        let (range, offset) = sub_index_parts(&self.range, self.offset, axis, start, stop)?;
        Ok(StridedView {
            data: self.data,
            range,
            offset,
        })
    }

    /// Merge the nested axis run `[start, end)` into a single axis.
    ///
    /// Aliases the storage; fails with
    /// [`StridedError::NonContiguousGroup`] when the strides do not nest.
    /// See `strided_perm::group_axes_copied` for arbitrary axis sets.
    pub fn group_axes(&self, start: usize, end: usize) -> Result<StridedView<'a, T>> {
        Ok(StridedView {
            data: self.data,
            range: group_range(&self.range, start, end)?,
            offset: self.offset,
        })
    }

    /// Reorder axes: axis `j` of `self` becomes axis `perm.dest(j)`.
    ///
    /// Only the range changes; use the permute engine for a reordered
    /// memory layout.
    pub fn permute(&self, perm: &Permutation) -> Result<StridedView<'a, T>> {
        Ok(StridedView {
            data: self.data,
            range: permute_range(&self.range, perm)?,
            offset: self.offset,
        })
    }
}

impl<'a, T> StridedViewMut<'a, T> {
    /// Mutable view of the hyper-rectangle `[start[j], stop[j])`.
    pub fn sub_tensor(self, start: &[usize], stop: &[usize]) -> Result<StridedViewMut<'a, T>> {
        let (range, offset) = sub_tensor_parts(&self.range, self.offset, start, stop)?;
        Ok(StridedViewMut {
            data: self.data,
            range,
            offset,
        })
    }

    /// Mutable view with one axis narrowed to `[start, stop)`.
    pub fn sub_index(
        self,
        axis: usize,
        start: usize,
        stop: usize,
    ) -> Result<StridedViewMut<'a, T>> {
        let (range, offset) = sub_index_parts(&self.range, self.offset, axis, start, stop)?;
        Ok(StridedViewMut {
            data: self.data,
            range,
            offset,
        })
    }

    /// Merge the nested axis run `[start, end)` into a single axis.
    pub fn group_axes(self, start: usize, end: usize) -> Result<StridedViewMut<'a, T>> {
        let range = group_range(&self.range, start, end)?;
        Ok(StridedViewMut {
            data: self.data,
            range,
            offset: self.offset,
        })
    }

    /// Reorder axes, consuming the mutable view.
    pub fn permute(self, perm: &Permutation) -> Result<StridedViewMut<'a, T>> {
        let range = permute_range(&self.range, perm)?;
        Ok(StridedViewMut {
            data: self.data,
            range,
            offset: self.offset,
        })
    }
}
