//! Operations that materialize a permuted view into fresh storage.

use strided_traits::Assign;
use strided_view::{Permutation, Result, StridedArray, StridedError, StridedView, Validation};

use crate::permute::permute_into_with;

/// Copy `src` into a new row-major array whose extents are the permuted
/// source extents, so that `out[perm(i)] == src[i]`.
pub fn permute_to_array<T: Copy + Default>(
    src: &StridedView<'_, T>,
    perm: &Permutation,
) -> Result<StridedArray<T>> {
    if perm.rank() != src.ndim() {
        return Err(StridedError::PermutationLength {
            len: perm.rank(),
            rank: src.ndim(),
        });
    }
    let dims = src.range().permuted(perm).dims().to_vec();
    let mut out = StridedArray::row_major(&dims)?;
    tracing::debug!(?dims, len = out.len(), "allocated permuted array");
    // Shapes agree by construction.
    permute_into_with(
        &mut out.view_mut(),
        src,
        perm,
        &Assign,
        Validation::Unchecked,
    )?;
    Ok(out)
}

/// Gather the named `axes` into a single leading axis, copying the data.
///
/// The named axes move to the front in ascending source order and the
/// remaining axes follow in their original order. The result is a fresh
/// row-major array in which the leading block has then been merged into one
/// axis whose extent is the product of the named extents. Naming fewer than
/// two axes skips the merge, leaving a plain permuted copy.
///
/// Unlike [`StridedView::group_axes`] this works for any set of axes, at the
/// cost of a full copy.
///
/// ```
/// use strided_perm::{group_axes_copied, StridedArray};
///
/// let a = StridedArray::from_fn_row_major(&[2, 3, 4], |i| i[0] * 100 + i[1] * 10 + i[2])
///     .unwrap();
/// let g = group_axes_copied(&a.view(), &[2, 0]).unwrap();
/// assert_eq!(g.dims(), &[8, 3]);
/// // Leading index runs over (i0, i2) with i2 fastest.
/// assert_eq!(g.get(&[5, 1]), 100 + 10 + 1);
/// ```
pub fn group_axes_copied<T: Copy + Default>(
    src: &StridedView<'_, T>,
    axes: &[usize],
) -> Result<StridedArray<T>> {
    let rank = src.ndim();
    let mut named = vec![false; rank];
    for &axis in axes {
        if axis >= rank {
            return Err(StridedError::InvalidAxis { axis, rank });
        }
        if named[axis] {
            return Err(StridedError::DuplicateAxis(axis));
        }
        named[axis] = true;
    }

    let n = axes.len();
    let mut dest = vec![0usize; rank];
    let (mut front, mut back) = (0, n);
    for (j, &is_named) in named.iter().enumerate() {
        if is_named {
            dest[j] = front;
            front += 1;
        } else {
            dest[j] = back;
            back += 1;
        }
    }
    let perm = Permutation::new(&dest)?;
    let copied = permute_to_array(src, &perm)?;
    if n < 2 {
        return Ok(copied);
    }

    let range = copied.range().grouped(0, n)?;
    tracing::debug!(axes = ?axes, dims = ?range.dims(), "grouped axes into copy");
    StridedArray::from_parts(copied.into_data(), range)
}
