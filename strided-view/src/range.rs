//! Shape descriptors: per-axis extents and strides.

use std::sync::Arc;

use crate::permutation::Permutation;
use crate::{Result, StridedError};

/// Compute column-major strides (first index varies fastest).
pub fn col_major_strides(dims: &[usize]) -> Vec<isize> {
    let mut strides = Vec::with_capacity(dims.len());
    let mut step = 1isize;
    for &d in dims {
        strides.push(step);
        step *= d as isize;
    }
    strides
}

/// Compute row-major strides (last index varies fastest).
pub fn row_major_strides(dims: &[usize]) -> Vec<isize> {
    let mut strides = vec![0isize; dims.len()];
    let mut step = 1isize;
    for (s, &d) in strides.iter_mut().zip(dims).rev() {
        *s = step;
        step *= d as isize;
    }
    strides
}

/// Ordered `(extent, stride)` pairs, one per axis.
///
/// Every extent is at least one. Strides are arbitrary signed integers, which
/// is what lets a `Range` describe a non-contiguous view. The flat position
/// of a multi-index `i` relative to the view's base is `Σ stride[j] * i[j]`.
///
/// Rank 0 is valid and describes a single element.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Range {
    dims: Arc<[usize]>,
    strides: Arc<[isize]>,
}

impl std::fmt::Debug for Range {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Range")
            .field("dims", &self.dims)
            .field("strides", &self.strides)
            .finish()
    }
}

impl Range {
    /// Create a range, rejecting zero extents and length mismatches.
    pub fn new(dims: &[usize], strides: &[isize]) -> Result<Self> {
        if dims.len() != strides.len() {
            return Err(StridedError::StrideLengthMismatch);
        }
        check_extents(dims)?;
        Ok(Self {
            dims: Arc::from(dims),
            strides: Arc::from(strides),
        })
    }

    /// Build without validation; callers uphold the extent invariant.
    pub(crate) fn from_vecs(dims: Vec<usize>, strides: Vec<isize>) -> Self {
        debug_assert_eq!(dims.len(), strides.len());
        Self {
            dims: Arc::from(dims),
            strides: Arc::from(strides),
        }
    }

    /// The rank-0 range of a single element.
    pub fn scalar() -> Self {
        Self::from_vecs(Vec::new(), Vec::new())
    }

    /// Contiguous row-major range (C order).
    pub fn row_major(dims: &[usize]) -> Result<Self> {
        check_extents(dims)?;
        Ok(Self::from_vecs(dims.to_vec(), row_major_strides(dims)))
    }

    /// Contiguous column-major range (Fortran order).
    pub fn col_major(dims: &[usize]) -> Result<Self> {
        check_extents(dims)?;
        Ok(Self::from_vecs(dims.to_vec(), col_major_strides(dims)))
    }

    #[inline]
    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    #[inline]
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    #[inline]
    pub fn strides(&self) -> &[isize] {
        &self.strides
    }

    #[inline]
    pub fn extent(&self, axis: usize) -> usize {
        self.dims[axis]
    }

    #[inline]
    pub fn stride(&self, axis: usize) -> isize {
        self.strides[axis]
    }

    /// Number of addressed elements (1 for rank 0).
    #[inline]
    pub fn len(&self) -> usize {
        self.dims.iter().product()
    }

    /// False for every validated range; only unchecked view construction can
    /// produce a zero extent.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.dims.iter().any(|&d| d == 0)
    }

    /// Flat position of `index` relative to the base: `Σ stride[j] * index[j]`.
    #[inline]
    pub fn offset(&self, index: &[usize]) -> isize {
        index
            .iter()
            .zip(self.strides.iter())
            .map(|(&i, &s)| i as isize * s)
            .sum()
    }

    /// Smallest and largest relative position addressed by the range.
    pub fn span(&self) -> Result<(isize, isize)> {
        let mut lo = 0isize;
        let mut hi = 0isize;
        for (&dim, &stride) in self.dims.iter().zip(self.strides.iter()) {
            if dim <= 1 {
                continue;
            }
            let end = stride
                .checked_mul(dim as isize - 1)
                .ok_or(StridedError::OffsetOverflow)?;
            if end >= 0 {
                hi = hi.checked_add(end).ok_or(StridedError::OffsetOverflow)?;
            } else {
                lo = lo.checked_add(end).ok_or(StridedError::OffsetOverflow)?;
            }
        }
        Ok((lo, hi))
    }

    /// True when the strides are exactly the row-major strides of the dims.
    pub fn is_row_major_contiguous(&self) -> bool {
        let mut expected = 1isize;
        for (&d, &s) in self.dims.iter().zip(self.strides.iter()).rev() {
            if d > 1 && s != expected {
                return false;
            }
            expected *= d as isize;
        }
        true
    }

    /// True when no two multi-indices address the same position.
    ///
    /// Conservative: axes sorted by `|stride|` must each step past the full
    /// reach of the axes below them. Zero strides on a non-unit axis fail.
    pub fn is_non_overlapping(&self) -> bool {
        if self.is_row_major_contiguous() {
            return true;
        }
        let mut axes: Vec<(usize, usize)> = self
            .dims
            .iter()
            .zip(self.strides.iter())
            .filter(|(&d, _)| d > 1)
            .map(|(&d, &s)| (d, s.unsigned_abs()))
            .collect();
        axes.sort_unstable_by_key(|&(_, s)| s);
        let mut reach = 0usize;
        for (d, s) in axes {
            if s <= reach {
                return false;
            }
            match s.checked_mul(d - 1).and_then(|r| r.checked_add(reach)) {
                Some(r) => reach = r,
                None => return false,
            }
        }
        true
    }

    /// Reorder axes under `perm`: new axis `perm[j]` carries old axis `j`.
    ///
    /// Panics if `perm` is shorter than the rank; callers check the length
    /// when validating.
    pub fn permuted(&self, perm: &Permutation) -> Range {
        let rank = self.rank();
        let mut dims = vec![0usize; rank];
        let mut strides = vec![0isize; rank];
        for j in 0..rank {
            let d = perm.dest(j);
            dims[d] = self.dims[j];
            strides[d] = self.strides[j];
        }
        Range::from_vecs(dims, strides)
    }

    /// Merge the axis run `[start, end)` into one axis.
    ///
    /// Requires nested strides (`stride[k] == stride[k + 1] * extent[k + 1]`
    /// inside the run). The merged axis has the product of the extents and
    /// the stride of the last axis in the run.
    pub fn grouped(&self, start: usize, end: usize) -> Result<Range> {
        let rank = self.rank();
        if start >= end || end > rank {
            return Err(StridedError::InvalidAxisRange { start, end, rank });
        }
        for k in start..end - 1 {
            let nested = self.strides[k + 1]
                .checked_mul(self.dims[k + 1] as isize)
                .map_or(false, |s| s == self.strides[k]);
            if !nested {
                return Err(StridedError::NonContiguousGroup {
                    start,
                    end,
                    axis: k,
                    next: k + 1,
                });
            }
        }
        Ok(self.grouped_unchecked(start, end))
    }

    /// Merge `[start, end)` without checking the stride pattern.
    pub(crate) fn grouped_unchecked(&self, start: usize, end: usize) -> Range {
        let merged: usize = self.dims[start..end].iter().product();
        let mut dims = Vec::with_capacity(self.rank() + start + 1 - end);
        let mut strides = Vec::with_capacity(dims.capacity());
        dims.extend_from_slice(&self.dims[..start]);
        strides.extend_from_slice(&self.strides[..start]);
        dims.push(merged);
        strides.push(self.strides[end - 1]);
        dims.extend_from_slice(&self.dims[end..]);
        strides.extend_from_slice(&self.strides[end..]);
        Range::from_vecs(dims, strides)
    }

    /// Copy of this range with one axis narrowed to `extent`.
    pub(crate) fn with_extent(&self, axis: usize, extent: usize) -> Range {
        let mut dims = self.dims.to_vec();
        dims[axis] = extent;
        Range {
            dims: Arc::from(dims),
            strides: self.strides.clone(),
        }
    }
}

fn check_extents(dims: &[usize]) -> Result<()> {
    match dims.iter().position(|&d| d == 0) {
        Some(axis) => Err(StridedError::ZeroExtent { axis }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_col_major_strides() {
        assert_eq!(col_major_strides(&[3, 4]), vec![1, 3]);
        assert_eq!(col_major_strides(&[2, 3, 4]), vec![1, 2, 6]);
        assert!(col_major_strides(&[]).is_empty());
    }

    #[test]
    fn test_row_major_strides() {
        assert_eq!(row_major_strides(&[3, 4]), vec![4, 1]);
        assert_eq!(row_major_strides(&[2, 3, 4]), vec![12, 4, 1]);
        assert!(row_major_strides(&[]).is_empty());
    }

    #[test]
    fn test_new_rejects_zero_extent() {
        assert_eq!(
            Range::new(&[2, 0], &[1, 2]),
            Err(StridedError::ZeroExtent { axis: 1 })
        );
        assert_eq!(
            Range::new(&[2], &[1, 2]),
            Err(StridedError::StrideLengthMismatch)
        );
    }

    #[test]
    fn test_offset() {
        let r = Range::new(&[2, 3, 4], &[12, 4, 1]).unwrap();
        assert_eq!(r.offset(&[0, 0, 0]), 0);
        assert_eq!(r.offset(&[1, 2, 3]), 23);
        let neg = Range::new(&[3], &[-2]).unwrap();
        assert_eq!(neg.offset(&[2]), -4);
    }

    #[test]
    fn test_scalar() {
        let r = Range::scalar();
        assert_eq!(r.rank(), 0);
        assert_eq!(r.len(), 1);
        assert_eq!(r.offset(&[]), 0);
        assert_eq!(r.span().unwrap(), (0, 0));
    }

    #[test]
    fn test_span() {
        let r = Range::new(&[3, 2], &[-4, 1]).unwrap();
        assert_eq!(r.span().unwrap(), (-8, 1));
        let huge = Range::new(&[3], &[isize::MAX]).unwrap();
        assert_eq!(huge.span(), Err(StridedError::OffsetOverflow));
    }

    #[test]
    fn test_row_major_contiguous() {
        assert!(Range::row_major(&[2, 3, 4]).unwrap().is_row_major_contiguous());
        assert!(!Range::col_major(&[2, 3]).unwrap().is_row_major_contiguous());
        // Unit extents do not constrain their stride.
        assert!(Range::new(&[1, 3], &[99, 1]).unwrap().is_row_major_contiguous());
    }

    #[test]
    fn test_non_overlapping() {
        assert!(Range::row_major(&[2, 3, 4]).unwrap().is_non_overlapping());
        assert!(Range::col_major(&[2, 3, 4]).unwrap().is_non_overlapping());
        assert!(Range::new(&[2, 3], &[-3, 1]).unwrap().is_non_overlapping());
        assert!(Range::new(&[2, 2], &[8, 2]).unwrap().is_non_overlapping());
        assert!(Range::scalar().is_non_overlapping());
        // Broadcast axis.
        assert!(!Range::new(&[2, 3], &[0, 1]).unwrap().is_non_overlapping());
        // Rows of length 3 overlapping at stride 2.
        assert!(!Range::new(&[2, 3], &[2, 1]).unwrap().is_non_overlapping());
    }

    #[test]
    fn test_permuted() {
        let r = Range::new(&[2, 3, 4], &[12, 4, 1]).unwrap();
        let p = Permutation::new(&[2, 0, 1]).unwrap();
        let q = r.permuted(&p);
        assert_eq!(q.dims(), &[3, 4, 2]);
        assert_eq!(q.strides(), &[4, 1, 12]);
    }

    #[test]
    fn test_grouped_row_major() {
        let r = Range::row_major(&[2, 3, 4]).unwrap();
        let g = r.grouped(1, 3).unwrap();
        assert_eq!(g.dims(), &[2, 12]);
        assert_eq!(g.strides(), &[12, 1]);
        let all = r.grouped(0, 3).unwrap();
        assert_eq!(all.dims(), &[24]);
        assert_eq!(all.strides(), &[1]);
    }

    #[test]
    fn test_grouped_single_axis_is_identity() {
        let r = Range::new(&[2, 3], &[7, 2]).unwrap();
        assert_eq!(r.grouped(1, 2).unwrap(), r);
    }

    #[test]
    fn test_grouped_rejects_col_major() {
        let r = Range::col_major(&[2, 3]).unwrap();
        assert_eq!(
            r.grouped(0, 2),
            Err(StridedError::NonContiguousGroup {
                start: 0,
                end: 2,
                axis: 0,
                next: 1
            })
        );
    }

    #[test]
    fn test_grouped_bad_axis_range() {
        let r = Range::row_major(&[2, 3]).unwrap();
        assert!(matches!(
            r.grouped(1, 1),
            Err(StridedError::InvalidAxisRange { .. })
        ));
        assert!(matches!(
            r.grouped(0, 3),
            Err(StridedError::InvalidAxisRange { .. })
        ));
    }
}
