//! Cholesky factorization of the regularized Gram matrix and triangular
//! solves against the factor.
//!
//! The squared RKHS norm of the function interpolating measurements `r` is
//! `rᵀ G⁻¹ r = |L⁻¹ r|²` where `G = L Lᵀ`. Computing `L⁻¹ r` by forward
//! substitution is called *whitening* here.

use log::debug;
use nalgebra::{DMatrix, DVector};
use rayon::prelude::*;
use thiserror::Error;

/// Error returned from [`CholeskyFactor::new`].
#[derive(Debug, Error)]
pub enum FactorError {
    /// The matrix is not numerically positive-definite.
    #[error("matrix is not positive-definite, increase the nugget or change the kernel")]
    NotPositiveDefinite {
        /// Index of the offending pivot if known.
        pivot: Option<usize>,
    },
}

/// Lower-triangular Cholesky factor `L` of a symmetric positive-definite
/// matrix `G = L Lᵀ`.
#[derive(Debug, Clone)]
pub struct CholeskyFactor {
    l: DMatrix<f64>,
}

impl CholeskyFactor {
    /// Factorizes the matrix.
    ///
    /// A pivot `L_ii` is rejected if it is not finite or if `L_ii²` is not
    /// larger than `n ε G_ii`, in which case the matrix is singular up to
    /// rounding errors (e.g., because of duplicate collocation points).
    pub fn new(gram: &DMatrix<f64>) -> Result<Self, FactorError> {
        let n = gram.nrows();

        let l = gram
            .clone()
            .cholesky()
            .ok_or(FactorError::NotPositiveDefinite { pivot: None })?
            .unpack();

        let tol = n as f64 * f64::EPSILON;
        for i in 0..n {
            let pivot = l[(i, i)];
            if !pivot.is_finite() || pivot * pivot <= tol * gram[(i, i)] {
                debug!("rejected pivot {} = {}", i, pivot);
                return Err(FactorError::NotPositiveDefinite { pivot: Some(i) });
            }
        }

        debug!("factorized matrix of size {}", n);

        Ok(Self { l })
    }

    /// The lower-triangular factor.
    pub fn l(&self) -> &DMatrix<f64> {
        &self.l
    }

    /// Size of the factorized matrix.
    pub fn dim(&self) -> usize {
        self.l.nrows()
    }

    /// Computes `L⁻¹ b`.
    pub fn whiten(&self, b: &DVector<f64>) -> DVector<f64> {
        let mut x = b.clone();
        forward_substitute(&self.l, x.as_mut_slice());
        x
    }

    /// Computes `L⁻¹ B` column by column.
    pub fn whiten_columns(&self, b: &DMatrix<f64>) -> DMatrix<f64> {
        let mut x = b.clone();
        let n = self.dim();

        if n > 0 {
            x.as_mut_slice()
                .par_chunks_mut(n)
                .for_each(|col| forward_substitute(&self.l, col));
        }

        x
    }

    /// Computes `G⁻¹ b = L⁻ᵀ L⁻¹ b`.
    pub fn solve(&self, b: &DVector<f64>) -> DVector<f64> {
        let mut x = b.clone();
        forward_substitute(&self.l, x.as_mut_slice());
        backward_substitute_tr(&self.l, x.as_mut_slice());
        x
    }

    /// Computes `L Lᵀ`.
    pub fn reconstruct(&self) -> DMatrix<f64> {
        &self.l * self.l.transpose()
    }
}

// Solves `L x = b` in place. Columns of `L` are traversed contiguously.
fn forward_substitute(l: &DMatrix<f64>, x: &mut [f64]) {
    let n = l.nrows();

    for j in 0..n {
        x[j] /= l[(j, j)];
        let xj = x[j];
        if xj != 0.0 {
            for i in (j + 1)..n {
                x[i] -= l[(i, j)] * xj;
            }
        }
    }
}

// Solves `Lᵀ x = b` in place.
fn backward_substitute_tr(l: &DMatrix<f64>, x: &mut [f64]) {
    let n = l.nrows();

    for j in (0..n).rev() {
        let mut sum = x[j];
        for i in (j + 1)..n {
            sum -= l[(i, j)] * x[i];
        }
        x[j] = sum / l[(j, j)];
    }
}
