//! Scalar type bounds for strided operations.

/// Bounds for element types combined by accumulating operations.
///
/// `Add` and `Mul` back [`AddAssign`](crate::AddAssign) and
/// [`ScaledAdd`](crate::ScaledAdd); `Send + Sync` lets a destination be
/// written from several shards at once. Plain assignment has no such
/// requirement, so copies of arbitrary `Copy` data do not need this trait.
pub trait ScalarBase:
    Copy + Send + Sync + std::ops::Mul<Output = Self> + std::ops::Add<Output = Self>
{
}

impl<T> ScalarBase for T where
    T: Copy + Send + Sync + std::ops::Mul<Output = T> + std::ops::Add<Output = T>
{
}
