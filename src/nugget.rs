//! Regularization of the Gram matrix by a nugget.
//!
//! Gram matrices of smooth kernels are notoriously ill-conditioned and
//! become numerically singular for dense point sets. Adding a small
//! nonnegative perturbation on the diagonal (the *nugget*) restores numerical
//! positive-definiteness.
//!
//! Blocks measuring higher-order derivatives have systematically larger
//! diagonal entries than the value block. With the
//! [adaptive](NuggetPolicy::Adaptive) policy, the nugget added to block `b`
//! is scaled by `trace(G_b) / trace(G_ref)`, where `G_ref` is the value block,
//! so that the relative perturbation is the same for all blocks.
//!
//! # References
//!
//! \[1\] [Solving and learning nonlinear PDEs with Gaussian
//! processes](https://doi.org/10.1016/j.jcp.2021.110668)

use log::debug;
use nalgebra::{DMatrix, DVector};

use crate::{core::Layout, gram::block_trace};

/// Policy of distributing the nugget over the diagonal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NuggetPolicy {
    /// Nugget scaled per block by its trace relative to the value block.
    #[default]
    Adaptive,
    /// Uniform nugget on the whole diagonal.
    Identity,
    /// No regularization.
    None,
}

/// Nugget value together with the policy of applying it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Nugget {
    value: f64,
    policy: NuggetPolicy,
}

impl Nugget {
    /// Creates the nugget.
    pub fn new(value: f64, policy: NuggetPolicy) -> Self {
        Self { value, policy }
    }

    /// No regularization at all.
    pub fn none() -> Self {
        Self::new(0.0, NuggetPolicy::None)
    }

    /// Base value of the nugget.
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Policy of applying the nugget.
    pub fn policy(&self) -> NuggetPolicy {
        self.policy
    }

    /// Checks that the value is finite and nonnegative.
    pub fn is_valid(&self) -> bool {
        self.value.is_finite() && self.value >= 0.0
    }

    /// Scaling ratio of every block of the layout.
    ///
    /// For the adaptive policy, the ratio of block `b` is
    /// `trace(G_b) / trace(G_ref)`. Otherwise all ratios are one.
    pub fn ratios(&self, gram: &DMatrix<f64>, layout: &Layout) -> Vec<f64> {
        let n_blocks = layout.blocks().len();

        match self.policy {
            NuggetPolicy::Adaptive => {
                let reference = block_trace(gram, layout, layout.reference());
                (0..n_blocks)
                    .map(|b| block_trace(gram, layout, b) / reference)
                    .collect()
            }
            NuggetPolicy::Identity | NuggetPolicy::None => vec![1.0; n_blocks],
        }
    }

    /// Diagonal perturbation that [`apply`](Nugget::apply) adds to the Gram
    /// matrix.
    pub fn diagonal(&self, gram: &DMatrix<f64>, layout: &Layout) -> DVector<f64> {
        let mut diag = DVector::zeros(layout.dim());

        match self.policy {
            NuggetPolicy::None => {}
            NuggetPolicy::Identity => diag.fill(self.value),
            NuggetPolicy::Adaptive => {
                for (b, ratio) in self.ratios(gram, layout).into_iter().enumerate() {
                    for i in layout.range(b) {
                        diag[i] = self.value * ratio;
                    }
                }
            }
        }

        diag
    }

    /// Adds the nugget to the diagonal of the Gram matrix.
    pub fn apply(&self, gram: &mut DMatrix<f64>, layout: &Layout) {
        if self.policy == NuggetPolicy::None {
            return;
        }

        let diag = self.diagonal(gram, layout);
        for (i, d) in diag.iter().enumerate() {
            gram[(i, i)] += d;
        }

        debug!(
            "regularized Gram matrix with nugget {} ({:?})",
            self.value, self.policy
        );
    }
}

impl Default for Nugget {
    fn default() -> Self {
        Self::new(1e-8, NuggetPolicy::Adaptive)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    use crate::{core::Pde, gram::assemble, kernel::Kernel, testing};

    fn setup() -> (DMatrix<f64>, Layout) {
        let points = testing::grid([[0.0, 1.0], [0.0, 1.0]], 4, false);
        let layout = Layout::new(&Pde::elliptic(1.0, 3), points.n_domain(), points.n_boundary());
        let gram = assemble(&Kernel::gaussian(0.3), &layout, &points);
        (gram, layout)
    }

    #[test]
    fn none_leaves_matrix_unchanged() {
        let (gram, layout) = setup();
        let mut regularized = gram.clone();

        Nugget::none().apply(&mut regularized, &layout);
        assert_eq!(regularized, gram);
    }

    #[test]
    fn identity_adds_uniform_diagonal() {
        let (gram, layout) = setup();
        let mut regularized = gram.clone();

        Nugget::new(1e-3, NuggetPolicy::Identity).apply(&mut regularized, &layout);
        let diff = regularized - gram;

        assert_relative_eq!(
            diff,
            DMatrix::identity(layout.dim(), layout.dim()) * 1e-3,
            epsilon = 1e-12
        );
    }

    #[test]
    fn adaptive_ratios_are_trace_ratios() {
        let (gram, layout) = setup();
        let nugget = Nugget::new(1e-6, NuggetPolicy::Adaptive);
        let ratios = nugget.ratios(&gram, &layout);

        let n = layout.n_domain();
        let all = n + layout.n_boundary();
        let trace_laplacian: f64 = (0..n).map(|i| gram[(i, i)]).sum();
        let trace_value: f64 = (n..n + all).map(|i| gram[(i, i)]).sum();

        assert_eq!(ratios.len(), 2);
        assert_relative_eq!(ratios[0], trace_laplacian / trace_value, max_relative = 1e-12);
        assert_relative_eq!(ratios[1], 1.0);

        // Derivative block receives larger perturbation than the value block.
        assert!(ratios[0] > 1.0);

        let mut regularized = gram.clone();
        nugget.apply(&mut regularized, &layout);
        assert_relative_eq!(
            regularized[(0, 0)] - gram[(0, 0)],
            1e-6 * ratios[0],
            max_relative = 1e-6
        );
        assert_relative_eq!(
            regularized[(n, n)] - gram[(n, n)],
            1e-6,
            max_relative = 1e-6
        );
        assert_eq!(regularized[(0, 1)], gram[(0, 1)]);
    }

    #[test]
    fn validity() {
        assert!(Nugget::default().is_valid());
        assert!(Nugget::none().is_valid());
        assert!(!Nugget::new(-1e-3, NuggetPolicy::Identity).is_valid());
        assert!(!Nugget::new(f64::NAN, NuggetPolicy::Adaptive).is_valid());
    }
}
