//! Shared traits for the strided-rs ecosystem.
//!
//! This crate holds the element-level traits used by `strided-perm`: the
//! combining operation applied per element during a permuted copy, and the
//! scalar bounds required by accumulating operations.
//!
//! External crates can depend on `strided-traits` to implement these traits
//! for their own element or operation types without orphan rule violations.

pub mod combine;
pub mod scalar;

pub use combine::{AddAssign, Assign, CombineOp, ScaledAdd};
pub use scalar::ScalarBase;
