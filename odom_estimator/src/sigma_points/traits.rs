use super::weights::UTWeights;
use alloc::vec::Vec;
use nalgebra::{allocator::Allocator, DefaultAllocator, DimName, OMatrix, OVector, RealField};

/// Sigma points of an `L`-dimensional distribution and their weights.
#[derive(Clone, Debug)]
pub struct SigmaSet<T, L>
where
    T: RealField + Copy,
    L: DimName,
    DefaultAllocator: Allocator<L>,
{
    pub points: Vec<OVector<T, L>>,
    pub weights: UTWeights<T>,
}

impl<T, L> SigmaSet<T, L>
where
    T: RealField + Copy,
    L: DimName,
    DefaultAllocator: Allocator<L>,
{
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Trait for sigma point generators
pub trait SigmaPoints<T: RealField + Copy> {
    /// Generate sigma points around `mean` from a lower-triangular factor
    /// `sqrt_cov` with `sqrt_cov * sqrt_cov^T = P`.
    fn generate<L>(&self, mean: &OVector<T, L>, sqrt_cov: &OMatrix<T, L, L>) -> SigmaSet<T, L>
    where
        L: DimName,
        DefaultAllocator: Allocator<L> + Allocator<L, L>;
}
