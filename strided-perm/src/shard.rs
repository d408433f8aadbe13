//! Destination shards for running one permute plan from several threads.
//!
//! [`PermutePlan::shards`] consumes a mutable destination view and splits
//! the plan's outer configurations into consecutive, disjoint ranges. Each
//! [`DestinationShard`] owns one range and is `Send`, so the shards can be
//! moved into scoped threads (or any other worker pool) and executed
//! concurrently:
//!
//! ```
//! use strided_perm::{Assign, Permutation, PermutePlan, StridedArray};
//!
//! let src = StridedArray::from_fn_row_major(&[64, 48], |i| (i[0] * 48 + i[1]) as f64)
//!     .unwrap();
//! let mut dst = StridedArray::<f64>::row_major(&[48, 64]).unwrap();
//! let swap = Permutation::new(&[1, 0]).unwrap();
//! let plan = PermutePlan::new(src.range(), dst.range(), &swap).unwrap();
//!
//! let shards = plan.shards(dst.view_mut(), 4).unwrap();
//! std::thread::scope(|s| {
//!     for mut shard in shards {
//!         let src = src.view();
//!         s.spawn(move || shard.execute(&src, &Assign).unwrap());
//!     }
//! });
//! assert_eq!(dst.get(&[5, 7]), src.get(&[7, 5]));
//! ```

use std::marker::PhantomData;
use std::ops;

use strided_traits::CombineOp;
use strided_view::{Result, StridedError, StridedView, StridedViewMut};

use crate::permute::{validate, PermutePlan};

/// A raw pointer wrapper that is `Send` + `Sync`.
///
/// # Safety
/// Only stored inside a [`DestinationShard`]. Shards of one plan cover
/// disjoint outer ranges over a destination whose layout never maps two
/// multi-indices to the same position, so no two threads write the same
/// element.
struct SendPtr<T>(*mut T);

impl<T> Clone for SendPtr<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for SendPtr<T> {}

unsafe impl<T> Send for SendPtr<T> {}
unsafe impl<T> Sync for SendPtr<T> {}

/// Exclusive write access to the destination elements of one outer range.
///
/// Borrows the destination storage for `'a`; `Send` and `Sync` follow `T`.
pub struct DestinationShard<'a, T> {
    plan: PermutePlan,
    outer: ops::Range<usize>,
    ptr: SendPtr<T>,
    len: usize,
    offset: isize,
    _marker: PhantomData<&'a mut [T]>,
}

impl<T> std::fmt::Debug for DestinationShard<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DestinationShard")
            .field("outer", &self.outer)
            .field("offset", &self.offset)
            .finish()
    }
}

impl PermutePlan {
    /// Split `dst` into `count` shards over consecutive outer ranges.
    ///
    /// The shape checks of [`PermutePlan::with_validation`] always run here,
    /// whatever the plan's validation mode, and the destination layout must
    /// not address any position twice. A `count` of zero is treated as one;
    /// shards past `outer_len()` cover empty ranges.
    pub fn shards<'a, T>(
        &self,
        dst: StridedViewMut<'a, T>,
        count: usize,
    ) -> Result<Vec<DestinationShard<'a, T>>> {
        validate(&self.src, &self.dst, &self.perm)?;
        if dst.range() != &self.dst {
            return Err(StridedError::PlanMismatch);
        }
        if !self.dst.is_non_overlapping() {
            return Err(StridedError::OverlappingDestination);
        }

        let (data, _, offset) = dst.into_parts();
        let len = data.len();
        let ptr = SendPtr(data.as_mut_ptr());

        let count = count.max(1);
        let total = self.outer_len();
        let (step, extra) = (total / count, total % count);
        let mut start = 0;
        let shards = (0..count)
            .map(|k| {
                let end = start + step + usize::from(k < extra);
                let outer = start..end;
                start = end;
                DestinationShard {
                    plan: self.clone(),
                    outer,
                    ptr,
                    len,
                    offset,
                    _marker: PhantomData,
                }
            })
            .collect();
        tracing::debug!(count, outer = total, "split permute plan into shards");
        Ok(shards)
    }
}

impl<T: Copy> DestinationShard<'_, T> {
    /// Outer configurations this shard writes.
    pub fn outer(&self) -> ops::Range<usize> {
        self.outer.clone()
    }

    /// Apply `op` to every destination element of this shard's outer range.
    ///
    /// `src` must have the layout the plan was built for.
    pub fn execute<Op>(&mut self, src: &StridedView<'_, T>, op: &Op) -> Result<()>
    where
        Op: CombineOp<T> + ?Sized,
    {
        if src.range() != &self.plan.src {
            return Err(StridedError::PlanMismatch);
        }
        let (ptr, len) = (self.ptr, self.len);
        self.plan
            .walk(self.outer.clone(), src, self.offset, |pd, value| {
                let i = pd as usize;
                assert!(i < len, "destination position {pd} outside storage of length {len}");
                // SAFETY: `i` is in bounds of the borrowed slice, and no
                // other shard of this plan visits position `i` (see SendPtr).
                unsafe { op.combine(&mut *ptr.0.add(i), value) }
            })
    }
}
