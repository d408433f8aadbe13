//! Dynamic-rank strided views and the owned strided array.
//!
//! - [`StridedView`]: read-only view (borrowed slice + base offset + [`Range`])
//! - [`StridedViewMut`]: mutable view
//! - [`StridedArray`]: owned contiguous array
//!
//! Positions are computed as signed offsets and resolved through the
//! borrowed slice, so a malformed view fails with a bounds panic on access
//! instead of touching memory it does not own.

use std::ops::{Index, IndexMut};

use crate::range::Range;
use crate::{Result, StridedError};

// ============================================================================
// Validation helpers
// ============================================================================

/// Validate that every position addressed by `range` from `offset` lies in
/// `[0, len)`.
fn validate_bounds(len: usize, range: &Range, offset: isize) -> Result<()> {
    let (lo, hi) = range.span()?;
    let min = offset.checked_add(lo).ok_or(StridedError::OffsetOverflow)?;
    let max = offset.checked_add(hi).ok_or(StridedError::OffsetOverflow)?;
    if min < 0 || max < 0 || max as usize >= len {
        return Err(StridedError::OutOfStorage { min, max, len });
    }
    Ok(())
}

/// Relative position of `index`, panicking on a wrong rank or an index past
/// an extent.
fn checked_position(range: &Range, index: &[usize]) -> isize {
    assert_eq!(index.len(), range.rank(), "wrong number of indices");
    for (axis, (&i, &d)) in index.iter().zip(range.dims()).enumerate() {
        assert!(i < d, "index {i} out of bounds for axis {axis} of extent {d}");
    }
    range.offset(index)
}

/// Slice index of a signed position. Negative positions wrap to a huge
/// index and fail the slice bounds check.
#[inline(always)]
pub(crate) fn slot(position: isize) -> usize {
    position as usize
}

// ============================================================================
// StridedView
// ============================================================================

/// Read-only dynamic-rank strided view.
pub struct StridedView<'a, T> {
    pub(crate) data: &'a [T],
    pub(crate) range: Range,
    pub(crate) offset: isize,
}

impl<T> Clone for StridedView<'_, T> {
    fn clone(&self) -> Self {
        Self {
            data: self.data,
            range: self.range.clone(),
            offset: self.offset,
        }
    }
}

impl<T> std::fmt::Debug for StridedView<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StridedView")
            .field("dims", &self.range.dims())
            .field("strides", &self.range.strides())
            .field("offset", &self.offset)
            .finish()
    }
}

impl<'a, T> StridedView<'a, T> {
    /// Create a view over `data`, checking every addressed position.
    pub fn new(data: &'a [T], dims: &[usize], strides: &[isize], offset: isize) -> Result<Self> {
        Self::from_range(data, Range::new(dims, strides)?, offset)
    }

    /// Create a view from an existing range.
    pub fn from_range(data: &'a [T], range: Range, offset: isize) -> Result<Self> {
        validate_bounds(data.len(), &range, offset)?;
        Ok(Self {
            data,
            range,
            offset,
        })
    }

    #[inline]
    pub fn range(&self) -> &Range {
        &self.range
    }

    #[inline]
    pub fn dims(&self) -> &[usize] {
        self.range.dims()
    }

    #[inline]
    pub fn strides(&self) -> &[isize] {
        self.range.strides()
    }

    /// Base offset into [`data`](Self::data).
    #[inline]
    pub fn offset(&self) -> isize {
        self.offset
    }

    #[inline]
    pub fn ndim(&self) -> usize {
        self.range.rank()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.range.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }

    /// The whole borrowed slice, not just the addressed elements.
    #[inline]
    pub fn data(&self) -> &'a [T] {
        self.data
    }

    /// Reference to the element at `index`.
    pub fn at(&self, index: &[usize]) -> &'a T {
        let data = self.data;
        &data[slot(self.offset + checked_position(&self.range, index))]
    }
}

impl<T: Copy> StridedView<'_, T> {
    /// Get an element.
    pub fn get(&self, index: &[usize]) -> T {
        *self.at(index)
    }

    /// Collect the addressed elements in row-major index order.
    pub fn to_vec(&self) -> Vec<T> {
        let mut out = Vec::with_capacity(self.len());
        for_each_index(self.range.dims(), |idx| {
            out.push(self.data[slot(self.offset + self.range.offset(idx))]);
        });
        out
    }
}

/// Visit every multi-index of `dims` in row-major order.
fn for_each_index(dims: &[usize], mut f: impl FnMut(&[usize])) {
    if dims.iter().any(|&d| d == 0) {
        return;
    }
    let rank = dims.len();
    let mut idx = vec![0usize; rank];
    loop {
        f(&idx);
        let mut axis = rank;
        loop {
            if axis == 0 {
                return;
            }
            axis -= 1;
            idx[axis] += 1;
            if idx[axis] < dims[axis] {
                break;
            }
            idx[axis] = 0;
        }
    }
}

// ============================================================================
// StridedViewMut
// ============================================================================

/// Mutable dynamic-rank strided view.
///
/// View constructors on a mutable view consume it, so two mutable views of
/// the same storage never coexist in safe code.
pub struct StridedViewMut<'a, T> {
    pub(crate) data: &'a mut [T],
    pub(crate) range: Range,
    pub(crate) offset: isize,
}

impl<T> std::fmt::Debug for StridedViewMut<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StridedViewMut")
            .field("dims", &self.range.dims())
            .field("strides", &self.range.strides())
            .field("offset", &self.offset)
            .finish()
    }
}

impl<'a, T> StridedViewMut<'a, T> {
    /// Create a mutable view over `data`, checking every addressed position.
    pub fn new(
        data: &'a mut [T],
        dims: &[usize],
        strides: &[isize],
        offset: isize,
    ) -> Result<Self> {
        Self::from_range(data, Range::new(dims, strides)?, offset)
    }

    /// Create a mutable view from an existing range.
    pub fn from_range(data: &'a mut [T], range: Range, offset: isize) -> Result<Self> {
        validate_bounds(data.len(), &range, offset)?;
        Ok(Self {
            data,
            range,
            offset,
        })
    }

    #[inline]
    pub fn range(&self) -> &Range {
        &self.range
    }

    #[inline]
    pub fn dims(&self) -> &[usize] {
        self.range.dims()
    }

    #[inline]
    pub fn strides(&self) -> &[isize] {
        self.range.strides()
    }

    #[inline]
    pub fn offset(&self) -> isize {
        self.offset
    }

    #[inline]
    pub fn ndim(&self) -> usize {
        self.range.rank()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.range.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }

    /// The whole borrowed slice, mutably.
    #[inline]
    pub fn data_mut(&mut self) -> &mut [T] {
        &mut *self.data
    }

    /// Reborrow as an immutable view.
    pub fn as_view(&self) -> StridedView<'_, T> {
        StridedView {
            data: &*self.data,
            range: self.range.clone(),
            offset: self.offset,
        }
    }

    /// Reborrow as a shorter-lived mutable view.
    pub fn reborrow(&mut self) -> StridedViewMut<'_, T> {
        StridedViewMut {
            data: &mut *self.data,
            range: self.range.clone(),
            offset: self.offset,
        }
    }

    /// Give up the view, returning the borrowed slice, range and base offset.
    pub fn into_parts(self) -> (&'a mut [T], Range, isize) {
        (self.data, self.range, self.offset)
    }

    /// Mutable reference to the element at `index`.
    pub fn at_mut(&mut self, index: &[usize]) -> &mut T {
        let pos = self.offset + checked_position(&self.range, index);
        &mut self.data[slot(pos)]
    }
}

impl<T: Copy> StridedViewMut<'_, T> {
    /// Get an element.
    pub fn get(&self, index: &[usize]) -> T {
        self.data[slot(self.offset + checked_position(&self.range, index))]
    }

    /// Set an element.
    pub fn set(&mut self, index: &[usize], value: T) {
        *self.at_mut(index) = value;
    }

    /// Write `value` to every addressed element.
    pub fn fill(&mut self, value: T) {
        let range = self.range.clone();
        let offset = self.offset;
        let data = &mut *self.data;
        for_each_index(range.dims(), |idx| {
            data[slot(offset + range.offset(idx))] = value;
        });
    }
}

// ============================================================================
// StridedArray
// ============================================================================

/// Owned strided array.
///
/// Storage starts at position 0 and holds exactly the elements addressed by
/// the range (row-major or column-major when built by the constructors here).
pub struct StridedArray<T> {
    data: Vec<T>,
    range: Range,
}

impl<T> std::fmt::Debug for StridedArray<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StridedArray")
            .field("dims", &self.range.dims())
            .field("strides", &self.range.strides())
            .finish()
    }
}

impl<T: Clone> Clone for StridedArray<T> {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            range: self.range.clone(),
        }
    }
}

impl<T: Clone + Default> StridedArray<T> {
    /// Create a row-major (C order) array filled with default values.
    pub fn row_major(dims: &[usize]) -> Result<Self> {
        let range = Range::row_major(dims)?;
        Ok(Self {
            data: vec![T::default(); range.len()],
            range,
        })
    }

    /// Create a column-major (Fortran order) array filled with default values.
    pub fn col_major(dims: &[usize]) -> Result<Self> {
        let range = Range::col_major(dims)?;
        Ok(Self {
            data: vec![T::default(); range.len()],
            range,
        })
    }
}

impl<T> StridedArray<T> {
    /// Row-major array from a function of the multi-index.
    pub fn from_fn_row_major(dims: &[usize], mut f: impl FnMut(&[usize]) -> T) -> Result<Self> {
        let range = Range::row_major(dims)?;
        let mut data = Vec::with_capacity(range.len());
        for_each_index(dims, |idx| data.push(f(idx)));
        Ok(Self { data, range })
    }

    /// Row-major array taking ownership of `data`.
    pub fn from_vec_row_major(data: Vec<T>, dims: &[usize]) -> Result<Self> {
        let range = Range::row_major(dims)?;
        if data.len() != range.len() {
            return Err(StridedError::LenMismatch {
                dst: range.len(),
                src: data.len(),
            });
        }
        Ok(Self { data, range })
    }

    /// Array over `data` with an arbitrary range starting at position 0.
    pub fn from_parts(data: Vec<T>, range: Range) -> Result<Self> {
        validate_bounds(data.len(), &range, 0)?;
        Ok(Self { data, range })
    }

    /// Give up the range and return the storage.
    pub fn into_data(self) -> Vec<T> {
        self.data
    }

    #[inline]
    pub fn range(&self) -> &Range {
        &self.range
    }

    #[inline]
    pub fn dims(&self) -> &[usize] {
        self.range.dims()
    }

    #[inline]
    pub fn strides(&self) -> &[isize] {
        self.range.strides()
    }

    #[inline]
    pub fn ndim(&self) -> usize {
        self.range.rank()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.range.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }

    #[inline]
    pub fn data(&self) -> &[T] {
        &self.data
    }

    #[inline]
    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Create an immutable view over this array.
    pub fn view(&self) -> StridedView<'_, T> {
        StridedView {
            data: &self.data,
            range: self.range.clone(),
            offset: 0,
        }
    }

    /// Create a mutable view over this array.
    pub fn view_mut(&mut self) -> StridedViewMut<'_, T> {
        StridedViewMut {
            data: &mut self.data,
            range: self.range.clone(),
            offset: 0,
        }
    }

    /// Iterate over all elements in memory order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.data.iter()
    }
}

impl<T: Copy> StridedArray<T> {
    /// Get an element by multi-dimensional index.
    pub fn get(&self, index: &[usize]) -> T {
        self[index]
    }

    /// Set an element by multi-dimensional index.
    pub fn set(&mut self, index: &[usize], value: T) {
        self[index] = value;
    }
}

impl<T> Index<&[usize]> for StridedArray<T> {
    type Output = T;

    fn index(&self, index: &[usize]) -> &T {
        &self.data[slot(checked_position(&self.range, index))]
    }
}

impl<T> IndexMut<&[usize]> for StridedArray<T> {
    fn index_mut(&mut self, index: &[usize]) -> &mut T {
        &mut self.data[slot(checked_position(&self.range, index))]
    }
}

// ============================================================================
// Tests
// ============================================================================
