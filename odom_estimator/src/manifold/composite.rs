//! Product of two manifolds.
//!
//! Heterogeneous random inputs (e.g. a gyro reading, an accelerometer reading
//! and a scalar noise term) are built by nesting pairs. The tangent space of a
//! pair is the direct sum of its components' tangent spaces and its covariance
//! is composed block-diagonally.

use super::Manifold;
use core::marker::PhantomData;
use nalgebra::{
    allocator::Allocator, DefaultAllocator, DimAdd, DimName, DimSum, OMatrix, OVector, RealField,
};

/// Pair of manifold points with tangent dimensions `Dim1` and `Dim2`.
///
/// The scalar and dimension parameters are carried in the type so the
/// [`Manifold`] implementation can name `DimSum<Dim1, Dim2>`.
#[derive(Clone, Debug, PartialEq)]
pub struct ManifoldPair<T, M1, M2, Dim1, Dim2> {
    pub first: M1,
    pub second: M2,
    _marker: PhantomData<(T, Dim1, Dim2)>,
}

impl<T, M1, M2, Dim1, Dim2> ManifoldPair<T, M1, M2, Dim1, Dim2> {
    pub fn new(first: M1, second: M2) -> Self {
        Self {
            first,
            second,
            _marker: PhantomData,
        }
    }

    pub fn into_components(self) -> (M1, M2) {
        (self.first, self.second)
    }
}

impl<T, M1, M2, Dim1, Dim2> ManifoldPair<T, M1, M2, Dim1, Dim2>
where
    T: RealField + Copy,
    Dim1: DimName + DimAdd<Dim2>,
    Dim2: DimName,
    DimSum<Dim1, Dim2>: DimName,
    DefaultAllocator: Allocator<Dim1, Dim1>
        + Allocator<Dim2, Dim2>
        + Allocator<DimSum<Dim1, Dim2>, DimSum<Dim1, Dim2>>,
{
    /// Covariance of the pair when the components are independent.
    pub fn build_cov(
        first: &OMatrix<T, Dim1, Dim1>,
        second: &OMatrix<T, Dim2, Dim2>,
    ) -> OMatrix<T, DimSum<Dim1, Dim2>, DimSum<Dim1, Dim2>> {
        block_diagonal(first, second)
    }
}

/// `[[a, 0], [0, b]]`
pub fn block_diagonal<T, Dim1, Dim2>(
    a: &OMatrix<T, Dim1, Dim1>,
    b: &OMatrix<T, Dim2, Dim2>,
) -> OMatrix<T, DimSum<Dim1, Dim2>, DimSum<Dim1, Dim2>>
where
    T: RealField + Copy,
    Dim1: DimName + DimAdd<Dim2>,
    Dim2: DimName,
    DimSum<Dim1, Dim2>: DimName,
    DefaultAllocator: Allocator<Dim1, Dim1>
        + Allocator<Dim2, Dim2>
        + Allocator<DimSum<Dim1, Dim2>, DimSum<Dim1, Dim2>>,
{
    let n = Dim1::dim();
    OMatrix::<T, DimSum<Dim1, Dim2>, DimSum<Dim1, Dim2>>::from_fn(|row, col| {
        match (row < n, col < n) {
            (true, true) => a[(row, col)],
            (false, false) => b[(row - n, col - n)],
            _ => T::zero(),
        }
    })
}

impl<T, M1, M2, Dim1, Dim2> Manifold<DimSum<Dim1, Dim2>, T> for ManifoldPair<T, M1, M2, Dim1, Dim2>
where
    T: RealField + Copy,
    M1: Manifold<Dim1, T>,
    M2: Manifold<Dim2, T>,
    Dim1: DimName + DimAdd<Dim2>,
    Dim2: DimName,
    DimSum<Dim1, Dim2>: DimName,
    DefaultAllocator: Allocator<Dim1> + Allocator<Dim2> + Allocator<DimSum<Dim1, Dim2>>,
{
    fn plus(&self, delta: &OVector<T, DimSum<Dim1, Dim2>>) -> Self {
        let n = Dim1::dim();
        let delta_first = OVector::<T, Dim1>::from_fn(|row, _| delta[row]);
        let delta_second = OVector::<T, Dim2>::from_fn(|row, _| delta[n + row]);
        Self::new(
            self.first.plus(&delta_first),
            self.second.plus(&delta_second),
        )
    }

    fn minus(&self, other: &Self) -> OVector<T, DimSum<Dim1, Dim2>> {
        let n = Dim1::dim();
        let first = self.first.minus(&other.first);
        let second = self.second.minus(&other.second);
        OVector::<T, DimSum<Dim1, Dim2>>::from_fn(|row, _| {
            if row < n {
                first[row]
            } else {
                second[row - n]
            }
        })
    }
}
