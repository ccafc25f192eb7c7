use alloc::vec::Vec;

use log::{trace, warn};
use nalgebra::allocator::Allocator;
use nalgebra::{Cholesky, DefaultAllocator, DimAdd, DimName, DimSum, OMatrix, OVector, RealField};

use super::distribution::GaussianDistribution;
use super::error::TransformError;
use crate::manifold::composite::block_diagonal;
use crate::manifold::{Manifold, MeanError};
use crate::sigma_points::{MerweScaled, SigmaPoints};

/// A nonlinear map whose output depends on its input and on an independent
/// random "extra" input with a known Gaussian distribution.
///
/// Process models implement this so the transform can propagate the state
/// belief and the process noise jointly.
pub trait DistributionFunction<In, InDim, Out, OutDim, Extra, ExtraDim, T>
where
    InDim: DimName,
    OutDim: DimName,
    ExtraDim: DimName,
    T: RealField + Copy,
    In: Manifold<InDim, T>,
    Out: Manifold<OutDim, T>,
    Extra: Manifold<ExtraDim, T>,
    DefaultAllocator: Allocator<InDim>
        + Allocator<OutDim>
        + Allocator<ExtraDim>
        + Allocator<ExtraDim, ExtraDim>,
{
    /// Distribution of the random input. Must not have side effects.
    fn extra_distribution(&self) -> GaussianDistribution<Extra, ExtraDim, T>;

    /// Deterministic map evaluated once per sigma point.
    fn apply(&self, input: &In, extra: &Extra) -> Out;
}

/// Unscented transform over manifold-valued distributions.
///
/// Sigma points are generated in the joint tangent space of the input and
/// the extra input, mapped onto the manifolds with `plus`, pushed through the
/// function, and recombined with the manifold weighted mean and `minus`.
#[derive(Clone, Debug)]
pub struct UnscentedTransform<T, SigmaGen = MerweScaled<T>>
where
    T: RealField + Copy,
{
    sigma_generator: SigmaGen,
    regularization_factor: T,
    mean_tolerance: T,
    max_mean_iterations: usize,
}

impl<T> Default for UnscentedTransform<T, MerweScaled<T>>
where
    T: RealField + Copy,
{
    fn default() -> Self {
        Self::new(MerweScaled::default())
    }
}

impl<T, SigmaGen> UnscentedTransform<T, SigmaGen>
where
    T: RealField + Copy,
    SigmaGen: SigmaPoints<T>,
{
    pub fn new(sigma_generator: SigmaGen) -> Self {
        Self {
            sigma_generator,
            regularization_factor: T::from_subset(&1e-9),
            mean_tolerance: T::from_subset(&1e-12),
            max_mean_iterations: 100,
        }
    }

    /// Diagonal loading applied when the augmented covariance is not positive definite.
    pub fn with_regularization_factor(mut self, factor: T) -> Self {
        self.regularization_factor = factor;
        self
    }

    /// Convergence criterion of the iterative manifold mean.
    pub fn with_mean_tolerance(mut self, tolerance: T, max_iterations: usize) -> Self {
        self.mean_tolerance = tolerance;
        self.max_mean_iterations = max_iterations;
        self
    }

    pub fn sigma_generator(&self) -> &SigmaGen {
        &self.sigma_generator
    }

    /// Propagate `input` through `func`.
    pub fn propagate<F, In, InDim, Out, OutDim, Extra, ExtraDim>(
        &self,
        func: &F,
        input: &GaussianDistribution<In, InDim, T>,
    ) -> Result<GaussianDistribution<Out, OutDim, T>, TransformError>
    where
        F: DistributionFunction<In, InDim, Out, OutDim, Extra, ExtraDim, T>,
        In: Manifold<InDim, T>,
        Out: Manifold<OutDim, T>,
        Extra: Manifold<ExtraDim, T>,
        InDim: DimName + DimAdd<ExtraDim>,
        OutDim: DimName,
        ExtraDim: DimName,
        DimSum<InDim, ExtraDim>: DimName,
        DefaultAllocator: Allocator<InDim>
            + Allocator<InDim, InDim>
            + Allocator<OutDim>
            + Allocator<OutDim, OutDim>
            + Allocator<ExtraDim>
            + Allocator<ExtraDim, ExtraDim>
            + Allocator<DimSum<InDim, ExtraDim>>
            + Allocator<DimSum<InDim, ExtraDim>, DimSum<InDim, ExtraDim>>,
    {
        let extra = func.extra_distribution();
        let n_in = InDim::dim();

        let joint_cov = block_diagonal(input.cov(), extra.cov());
        let sqrt_cov = self.factor(joint_cov)?;

        let zero = OVector::<T, DimSum<InDim, ExtraDim>>::zeros();
        let sigmas = self.sigma_generator.generate(&zero, &sqrt_cov);
        trace!("propagating {} sigma points", sigmas.len());

        let outputs: Vec<Out> = sigmas
            .points
            .iter()
            .map(|point| {
                let d_in = OVector::<T, InDim>::from_fn(|row, _| point[row]);
                let d_extra = OVector::<T, ExtraDim>::from_fn(|row, _| point[n_in + row]);
                func.apply(&input.mean().plus(&d_in), &extra.mean().plus(&d_extra))
            })
            .collect();

        let w_mean = &sigmas.weights.w_mean;
        let w_covar = &sigmas.weights.w_covar;

        let mean = match Out::weighted_mean(
            &outputs,
            w_mean,
            self.mean_tolerance,
            self.max_mean_iterations,
        ) {
            Ok(mean) => mean,
            Err(MeanError::NotConverged) => {
                warn!(
                    "sigma point mean did not converge in {} iterations, using central point",
                    self.max_mean_iterations
                );
                outputs[0].clone()
            }
            Err(e) => return Err(TransformError::MeanComputationFailed(e)),
        };

        let deviations: Vec<OVector<T, OutDim>> =
            outputs.iter().map(|out| out.minus(&mean)).collect();

        // The deviations need not average to zero around a manifold mean that
        // was reached with a finite tolerance (or the fallback above).
        let mut centre = OVector::<T, OutDim>::zeros();
        for (deviation, &w) in deviations.iter().zip(w_mean.iter()) {
            centre.axpy(w, deviation, T::one());
        }

        let mut cov = OMatrix::<T, OutDim, OutDim>::zeros();
        for (deviation, &w) in deviations.iter().zip(w_covar.iter()) {
            let d = deviation - &centre;
            cov.ger(w, &d, &d, T::one());
        }
        let half = T::one() / (T::one() + T::one());
        let cov = (&cov + cov.transpose()) * half;

        Ok(GaussianDistribution::new(mean, cov))
    }

    /// Lower Cholesky factor, retrying once with diagonal loading.
    fn factor<D>(&self, cov: OMatrix<T, D, D>) -> Result<OMatrix<T, D, D>, TransformError>
    where
        D: DimName,
        DefaultAllocator: Allocator<D> + Allocator<D, D>,
    {
        if let Some(chol) = Cholesky::new(cov.clone()) {
            return Ok(chol.l());
        }

        let regularized = cov + OMatrix::<T, D, D>::identity() * self.regularization_factor;
        match Cholesky::new(regularized) {
            Some(chol) => Ok(chol.l()),
            None => Err(TransformError::CholeskyDecompositionFailed),
        }
    }
}
