//! Dynamic-rank strided views and zero-copy view construction.
//!
//! This crate holds the data model shared by the permutation engine in
//! `strided-perm`: shape descriptors, permutations, borrowed views and owned
//! arrays, plus the metadata-only operations that build new views aliasing
//! existing storage.
//!
//! # Core Types
//!
//! - [`Range`]: per-axis `(extent, stride)` pairs of a possibly non-contiguous layout
//! - [`Permutation`]: bijective map from source axis to destination axis
//! - [`StridedView`] / [`StridedViewMut`]: borrowed storage + base offset + [`Range`]
//! - [`StridedArray`]: owned contiguous storage + [`Range`]
//!
//! # View Construction
//!
//! These touch only the range and offset, never the elements:
//! - `sub_tensor`: hyper-rectangle `[start, stop)` on every axis
//! - `sub_index`: narrow a single axis
//! - `group_axes`: merge a run of nested axes into one
//! - `permute`: reorder axes
//!
//! A view borrows its storage, so a view into a dropped temporary is a
//! compile error rather than a dangling reference.

pub mod config;
pub mod permutation;
pub mod range;
mod slice;
pub mod view;

pub use config::{default_validation, set_default_validation, Validation, VALIDATE_ENV};
pub use permutation::Permutation;
pub use range::{col_major_strides, row_major_strides, Range};
pub use view::{StridedArray, StridedView, StridedViewMut};

// ============================================================================
// Error types
// ============================================================================

/// Errors that can occur during strided array operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StridedError {
    /// Array ranks do not match.
    #[error("rank mismatch: {0} vs {1}")]
    RankMismatch(usize, usize),

    /// Destination and source hold a different number of elements.
    #[error("element count mismatch: destination has {dst}, source has {src}")]
    LenMismatch { dst: usize, src: usize },

    /// Permutation length differs from the tensor rank.
    #[error("permutation of length {len} applied to rank-{rank} tensor")]
    PermutationLength { len: usize, rank: usize },

    /// The given axis map is not a bijection over `[0, rank)`.
    #[error("not a permutation: {0:?}")]
    InvalidPermutation(Vec<usize>),

    /// Destination extent at a permuted position differs from the source extent.
    #[error(
        "extent mismatch: source axis {axis} has extent {src}, destination axis {dest_axis} has extent {dst}"
    )]
    ExtentMismatch {
        axis: usize,
        dest_axis: usize,
        src: usize,
        dst: usize,
    },

    /// Invalid axis index for the given array rank.
    #[error("invalid axis {axis} for rank {rank}")]
    InvalidAxis { axis: usize, rank: usize },

    /// The same axis was named more than once.
    #[error("axis {0} given more than once")]
    DuplicateAxis(usize),

    /// Every extent must be at least one.
    #[error("axis {axis} has zero extent")]
    ZeroExtent { axis: usize },

    /// Stride array length doesn't match dimensions.
    #[error("stride and dims length mismatch")]
    StrideLengthMismatch,

    /// `start` / `stop` sequences do not have one entry per axis.
    #[error("expected {expected} bounds, got {got}")]
    BoundsLength { expected: usize, got: usize },

    /// `start >= stop` on an axis.
    #[error("empty range on axis {axis}: start {start} >= stop {stop}")]
    EmptyRange {
        axis: usize,
        start: usize,
        stop: usize,
    },

    /// `stop` exceeds the extent of an axis.
    #[error("stop {stop} exceeds extent {extent} on axis {axis}")]
    StopOutOfBounds {
        axis: usize,
        stop: usize,
        extent: usize,
    },

    /// Axis run `[start, end)` is empty or extends past the rank.
    #[error("invalid axis range {start}..{end} for rank {rank}")]
    InvalidAxisRange {
        start: usize,
        end: usize,
        rank: usize,
    },

    /// Strides of a contiguous group are not nested.
    #[error("axes {start}..{end} cannot be grouped: axis {axis} is not nested in axis {next}")]
    NonContiguousGroup {
        start: usize,
        end: usize,
        axis: usize,
        next: usize,
    },

    /// Integer overflow while computing array offset.
    #[error("offset overflow while computing position")]
    OffsetOverflow,

    /// The addressed positions fall outside the backing storage.
    #[error("view addresses positions {min}..={max} outside storage of length {len}")]
    OutOfStorage { min: isize, max: isize, len: usize },

    /// Source and destination label sequences differ in length.
    #[error("label sequences differ in length: {0} vs {1}")]
    LabelLengthMismatch(usize, usize),

    /// A source label has no counterpart among the destination labels.
    #[error("source label at position {0} has no match among destination labels")]
    LabelNotFound(usize),

    /// A source label matches more than one destination label.
    #[error("source label at position {0} matches more than one destination label")]
    AmbiguousLabel(usize),

    /// Two source labels resolve to the same destination axis.
    #[error("source labels at positions {first} and {second} both match destination axis {dest}")]
    DuplicateLabelTarget {
        first: usize,
        second: usize,
        dest: usize,
    },

    /// A permute plan was executed with views it was not built for.
    #[error("view layout does not match the plan it is executed with")]
    PlanMismatch,

    /// A destination shared between shards addresses some position twice.
    #[error("destination layout addresses the same position more than once")]
    OverlappingDestination,

    /// Outer configuration range exceeds what the plan enumerates.
    #[error("outer range {start}..{end} exceeds {len} outer configurations")]
    OuterRangeOutOfBounds { start: usize, end: usize, len: usize },
}

/// Result type for strided array operations.
pub type Result<T> = std::result::Result<T, StridedError>;
