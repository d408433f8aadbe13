//! Big-axis permute/copy engine.
//!
//! Copies (or accumulates) every element of a source view into a destination
//! view whose axes are a permutation of the source's. Source axis `j` lands
//! on destination axis `perm.dest(j)`.
//!
//! The source axis with the largest extent is driven by a tight inner loop
//! that steps both positions by a fixed stride. The remaining axes are
//! enumerated by a [`GCounter`], so the offset dot-product is paid once per
//! outer configuration rather than once per element.

use strided_traits::{AddAssign, Assign, CombineOp, ScalarBase};
use strided_view::{
    default_validation, Permutation, Range, Result, StridedError, StridedView, StridedViewMut,
    Validation,
};

use crate::counter::GCounter;

/// Check the engine's shape preconditions.
pub(crate) fn validate(src: &Range, dst: &Range, perm: &Permutation) -> Result<()> {
    let rank = src.rank();
    if perm.rank() != rank {
        return Err(StridedError::PermutationLength {
            len: perm.rank(),
            rank,
        });
    }
    if dst.rank() != rank {
        return Err(StridedError::RankMismatch(dst.rank(), rank));
    }
    if dst.len() != src.len() {
        return Err(StridedError::LenMismatch {
            dst: dst.len(),
            src: src.len(),
        });
    }
    for axis in 0..rank {
        let dest_axis = perm.dest(axis);
        if dst.extent(dest_axis) != src.extent(axis) {
            return Err(StridedError::ExtentMismatch {
                axis,
                dest_axis,
                src: src.extent(axis),
                dst: dst.extent(dest_axis),
            });
        }
    }
    Ok(())
}

/// Precomputed loop structure of one permuted copy.
///
/// The outer configurations (all axes except the big one) are numbered
/// `0..outer_len()`. Distinct outer configurations write disjoint runs of the
/// destination, so a caller may split `0..outer_len()` and hand the pieces
/// to [`execute_outer`](Self::execute_outer) one after another, or to
/// parallel workers through [`shards`](Self::shards).
#[derive(Debug, Clone)]
pub struct PermutePlan {
    pub(crate) src: Range,
    pub(crate) dst: Range,
    pub(crate) perm: Permutation,
    /// `None` for rank 0.
    big_axis: Option<usize>,
    big_extent: usize,
    src_step: isize,
    dst_step: isize,
    validation: Validation,
}

impl PermutePlan {
    /// Build a plan using the process-wide validation mode.
    pub fn new(src: &Range, dst: &Range, perm: &Permutation) -> Result<Self> {
        Self::with_validation(src, dst, perm, default_validation())
    }

    /// Build a plan, validating shapes when `validation` is checked.
    pub fn with_validation(
        src: &Range,
        dst: &Range,
        perm: &Permutation,
        validation: Validation,
    ) -> Result<Self> {
        if validation.is_checked() {
            validate(src, dst, perm)?;
        }

        // First axis with the largest extent.
        let big_axis = (0..src.rank()).fold(None, |best: Option<usize>, j| match best {
            Some(b) if src.extent(b) >= src.extent(j) => Some(b),
            _ => Some(j),
        });
        let (big_extent, src_step, dst_step) = match big_axis {
            Some(b) => (src.extent(b), src.stride(b), dst.stride(perm.dest(b))),
            None => (1, 0, 0),
        };

        let plan = Self {
            src: src.clone(),
            dst: dst.clone(),
            perm: perm.clone(),
            big_axis,
            big_extent,
            src_step,
            dst_step,
            validation,
        };
        tracing::trace!(
            rank = src.rank(),
            ?big_axis,
            big_extent,
            outer = plan.outer_len(),
            src_step,
            dst_step,
            "permute plan"
        );
        Ok(plan)
    }

    /// Source axis driven by the inner loop.
    pub fn big_axis(&self) -> Option<usize> {
        self.big_axis
    }

    /// Number of outer configurations.
    pub fn outer_len(&self) -> usize {
        if self.big_extent == 0 {
            return 0;
        }
        self.src.len() / self.big_extent
    }

    /// Run the whole copy.
    pub fn execute<T, Op>(
        &self,
        dst: &mut StridedViewMut<'_, T>,
        src: &StridedView<'_, T>,
        op: &Op,
    ) -> Result<()>
    where
        T: Copy,
        Op: CombineOp<T> + ?Sized,
    {
        self.execute_outer(0..self.outer_len(), dst, src, op)
    }

    /// Run the outer configurations numbered `outer`.
    ///
    /// A panic inside `op` leaves the elements already visited modified.
    pub fn execute_outer<T, Op>(
        &self,
        outer: std::ops::Range<usize>,
        dst: &mut StridedViewMut<'_, T>,
        src: &StridedView<'_, T>,
        op: &Op,
    ) -> Result<()>
    where
        T: Copy,
        Op: CombineOp<T> + ?Sized,
    {
        if self.validation.is_checked() {
            if src.range() != &self.src || dst.range() != &self.dst {
                return Err(StridedError::PlanMismatch);
            }
            let len = self.outer_len();
            if outer.start > outer.end || outer.end > len {
                return Err(StridedError::OuterRangeOutOfBounds {
                    start: outer.start,
                    end: outer.end,
                    len,
                });
            }
        }
        let dst_base = dst.offset();
        let dst_data = dst.data_mut();
        // Negative positions wrap and fail the slice bounds check.
        self.walk(outer, src, dst_base, |pd, value| {
            op.combine(&mut dst_data[pd as usize], value)
        })
    }

    /// Feed `visit` the destination position and source value of every
    /// element in the outer configurations numbered `outer`.
    pub(crate) fn walk<T, F>(
        &self,
        outer: std::ops::Range<usize>,
        src: &StridedView<'_, T>,
        dst_base: isize,
        mut visit: F,
    ) -> Result<()>
    where
        T: Copy,
        F: FnMut(isize, T),
    {
        if outer.is_empty() {
            return Ok(());
        }
        let src_data = src.data();
        let src_base = src.offset();

        let Some(big) = self.big_axis else {
            visit(dst_base, src_data[src_base as usize]);
            return Ok(());
        };

        let rank = self.src.rank();
        let mut counter = GCounter::new(rank);
        for j in 0..rank {
            counter.set_range(j, 0, self.src.extent(j).saturating_sub(1))?;
        }
        // The big axis is stepped by hand below.
        counter.set_range(big, 0, 0)?;
        counter.seek(outer.start);

        let mut ti = vec![0usize; rank];
        for _ in outer {
            let ci = counter.index();
            for (j, &c) in ci.iter().enumerate() {
                ti[self.perm.dest(j)] = c;
            }
            let mut pd = dst_base + self.dst.offset(&ti);
            let mut ps = src_base + self.src.offset(ci);
            for _ in 0..self.big_extent {
                visit(pd, src_data[ps as usize]);
                pd += self.dst_step;
                ps += self.src_step;
            }
            counter.advance();
        }
        Ok(())
    }
}

/// Copy `src` into `dst` under `perm`: `dst[perm(i)] = src[i]`.
pub fn permute_into<T: Copy>(
    dst: &mut StridedViewMut<'_, T>,
    src: &StridedView<'_, T>,
    perm: &Permutation,
) -> Result<()> {
    permute_into_with(dst, src, perm, &Assign, default_validation())
}

/// Accumulate `src` into `dst` under `perm`: `dst[perm(i)] += src[i]`.
pub fn permute_add_into<T: ScalarBase>(
    dst: &mut StridedViewMut<'_, T>,
    src: &StridedView<'_, T>,
    perm: &Permutation,
) -> Result<()> {
    permute_into_with(dst, src, perm, &AddAssign, default_validation())
}

/// Apply `op(dst[perm(i)], src[i])` for every source multi-index `i`.
///
/// With [`Validation::Checked`] all shape preconditions are verified before
/// any element is written. `dst` and `src` borrow distinct storage, so they
/// cannot overlap.
pub fn permute_into_with<T, Op>(
    dst: &mut StridedViewMut<'_, T>,
    src: &StridedView<'_, T>,
    perm: &Permutation,
    op: &Op,
    validation: Validation,
) -> Result<()>
where
    T: Copy,
    Op: CombineOp<T> + ?Sized,
{
    let plan = PermutePlan::with_validation(src.range(), dst.range(), perm, validation)?;
    plan.execute(dst, src, op)
}

/// Label-driven permuted copy using the process-wide validation mode.
///
/// See [`permute_labels_into_with`].
pub fn permute_labels_into<T, L, Op>(
    dst: &mut StridedViewMut<'_, T>,
    dst_labels: &[L],
    src: &StridedView<'_, T>,
    src_labels: &[L],
    op: &Op,
) -> Result<()>
where
    T: Copy,
    L: PartialEq,
    Op: CombineOp<T> + ?Sized,
{
    permute_labels_into_with(dst, dst_labels, src, src_labels, op, default_validation())
}

/// Permuted copy where the permutation is derived by matching axis labels.
///
/// Source axis `j` goes to the destination axis carrying `src_labels[j]`.
/// Two empty label sequences copy the single scalar element directly,
/// without applying `op`.
pub fn permute_labels_into_with<T, L, Op>(
    dst: &mut StridedViewMut<'_, T>,
    dst_labels: &[L],
    src: &StridedView<'_, T>,
    src_labels: &[L],
    op: &Op,
    validation: Validation,
) -> Result<()>
where
    T: Copy,
    L: PartialEq,
    Op: CombineOp<T> + ?Sized,
{
    if validation.is_checked() && src_labels.len() != dst_labels.len() {
        return Err(StridedError::LabelLengthMismatch(
            src_labels.len(),
            dst_labels.len(),
        ));
    }
    if src_labels.is_empty() {
        if validation.is_checked() {
            if src.ndim() != 0 {
                return Err(StridedError::RankMismatch(src.ndim(), 0));
            }
            if dst.ndim() != 0 {
                return Err(StridedError::RankMismatch(dst.ndim(), 0));
            }
        }
        let value = src.data()[src.offset() as usize];
        let base = dst.offset() as usize;
        dst.data_mut()[base] = value;
        return Ok(());
    }
    let perm = Permutation::from_labels(src_labels, dst_labels)?;
    permute_into_with(dst, src, &perm, op, validation)
}
