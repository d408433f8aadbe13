//! Permuted copy and accumulation for dynamic-rank strided tensors.
//!
//! This crate sits on top of `strided-view` (ranges, permutations, views)
//! and `strided-traits` (combining operations) and is the only layer that
//! touches storage element by element.
//!
//! # Dependency graph
//!
//! ```text
//! strided-traits -> strided-view -> strided-perm
//! ```
//!
//! # Operations
//!
//! - [`permute_into`] / [`permute_add_into`]: `dst[perm(i)] = src[i]` or `+= src[i]`
//! - [`permute_into_with`]: any [`CombineOp`], explicit [`Validation`]
//! - [`permute_labels_into`]: permutation derived from axis labels
//! - [`PermutePlan`]: the engine's loop structure, splittable over outer configurations
//! - [`DestinationShard`]: one disjoint piece of a plan, executable on its own thread
//! - [`permute_to_array`] / [`group_axes_copied`]: copy into freshly allocated storage
//! - [`GCounter`]: the multi-index odometer driving the outer loops
//!
//! ```
//! use strided_perm::{permute_into, Permutation, StridedArray};
//!
//! let src = StridedArray::from_vec_row_major(vec![0, 1, 2, 3, 4, 5], &[2, 3]).unwrap();
//! let mut dst = StridedArray::<i32>::row_major(&[3, 2]).unwrap();
//! let swap = Permutation::new(&[1, 0]).unwrap();
//! permute_into(&mut dst.view_mut(), &src.view(), &swap).unwrap();
//! assert_eq!(dst.data(), &[0, 3, 1, 4, 2, 5]);
//! ```

pub mod counter;
pub mod group;
pub mod permute;
pub mod shard;

pub use counter::GCounter;
pub use group::{group_axes_copied, permute_to_array};
pub use permute::{
    permute_add_into, permute_into, permute_into_with, permute_labels_into,
    permute_labels_into_with, PermutePlan,
};
pub use shard::DestinationShard;

pub use strided_traits::{AddAssign, Assign, CombineOp, ScalarBase, ScaledAdd};
pub use strided_view::{
    default_validation, set_default_validation, Permutation, Range, Result, StridedArray,
    StridedError, StridedView, StridedViewMut, Validation,
};
