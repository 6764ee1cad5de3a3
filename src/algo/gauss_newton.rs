//! Gauss-Newton method with a fixed iteration budget.
//!
//! In every iteration, the objective is linearized at the current iterate,
//! giving the gradient `g` and the Gauss-Newton Hessian `H`. The step `Δ` is
//! the solution of `H Δ = g` and the iterate is updated as `x ← x - s Δ`,
//! where `s` is the [step size](GaussNewtonOptions::step_size). There is no
//! line search and no convergence test; the method runs for
//! [`max_iter`](GaussNewtonOptions::max_iter) iterations.
//!
//! A non-finite loss usually means that the Gram matrix is regularized too
//! weakly. Depending on [`NanPolicy`], the iteration either continues (and the
//! condition is recorded in [`Status`]) or stops with an error.
//!
//! # References
//!
//! \[1\] [Numerical
//! Optimization](https://link.springer.com/book/10.1007/978-0-387-40065-5)
//!
//! \[2\] [Methods for Non-Linear Least Squares
//! Problems](https://api.semanticscholar.org/CorpusID:64217935)

use getset::{CopyGetters, Setters};
use log::{debug, warn};
use nalgebra::DVector;
use thiserror::Error;

use crate::core::{Objective, Optimizer};

/// What to do when the loss becomes non-finite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NanPolicy {
    /// Log a warning, record the iteration in [`Status`] and keep iterating.
    /// A singular Gauss-Newton system yields a non-finite step.
    #[default]
    Continue,
    /// Stop with [`GaussNewtonError::NonFiniteLoss`].
    Abort,
}

/// Health of the iteration process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Status {
    /// All losses so far are finite.
    #[default]
    Finite,
    /// The loss became non-finite.
    NonFinite {
        /// Iteration at which that happened for the first time. Zero is the
        /// initial value.
        first_iter: usize,
    },
}

impl Status {
    /// Returns `true` if all losses so far are finite.
    pub fn is_finite(&self) -> bool {
        matches!(self, Status::Finite)
    }
}

/// Options for [`GaussNewton`] method.
#[derive(Debug, Clone, CopyGetters, Setters)]
#[getset(get_copy = "pub", set = "pub")]
pub struct GaussNewtonOptions {
    /// Number of iterations done by [`GaussNewton::run`]. Default: `10`.
    max_iter: usize,
    /// Multiplier of the Gauss-Newton step. Default: `1.0`.
    step_size: f64,
    /// Handling of non-finite losses. Default: [`NanPolicy::Continue`].
    nan_policy: NanPolicy,
}

impl Default for GaussNewtonOptions {
    fn default() -> Self {
        Self {
            max_iter: 10,
            step_size: 1.0,
            nan_policy: NanPolicy::Continue,
        }
    }
}

/// Error returned from [`GaussNewton`] method.
#[derive(Debug, Error)]
pub enum GaussNewtonError {
    /// The loss is non-finite and the policy is [`NanPolicy::Abort`].
    #[error("loss is not finite in iteration {iter}, the nugget may be too small")]
    NonFiniteLoss {
        /// Iteration in which the loss became non-finite.
        iter: usize,
    },
    /// The linear system for the step could not be solved and the policy is
    /// [`NanPolicy::Abort`].
    #[error("Gauss-Newton system is singular in iteration {iter}")]
    SingularSystem {
        /// Iteration in which the system was singular.
        iter: usize,
    },
    /// Dimension of the variables does not match the objective.
    #[error("invalid dimensionality: expected {expected}, got {actual}")]
    InvalidDimensionality {
        /// Dimension of the objective.
        expected: usize,
        /// Dimension of the variables.
        actual: usize,
    },
}

/// Loss history of a [`GaussNewton::run`].
#[derive(Debug, Clone)]
pub struct Report {
    losses: Vec<f64>,
    status: Status,
}

impl Report {
    /// Losses, starting with the initial one and followed by one value per
    /// iteration.
    pub fn losses(&self) -> &[f64] {
        &self.losses
    }

    /// The last loss.
    pub fn final_loss(&self) -> f64 {
        self.losses.last().copied().unwrap_or(f64::NAN)
    }

    /// Health of the run.
    pub fn status(&self) -> Status {
        self.status
    }
}

/// Gauss-Newton method.
///
/// See [module](self) documentation for more details.
#[derive(Debug, Clone)]
pub struct GaussNewton {
    options: GaussNewtonOptions,
    iter: usize,
    status: Status,
}

impl GaussNewton {
    /// Initializes the method with default options.
    pub fn new() -> Self {
        Self::with_options(GaussNewtonOptions::default())
    }

    /// Initializes the method with given options.
    pub fn with_options(options: GaussNewtonOptions) -> Self {
        Self {
            options,
            iter: 0,
            status: Status::Finite,
        }
    }

    /// The options.
    pub fn options(&self) -> &GaussNewtonOptions {
        &self.options
    }

    /// Number of iterations done so far.
    pub fn iter(&self) -> usize {
        self.iter
    }

    /// Health of the iteration process so far.
    pub fn status(&self) -> Status {
        self.status
    }

    /// Resets the internal state of the method.
    pub fn reset(&mut self) {
        self.iter = 0;
        self.status = Status::Finite;
    }

    /// Evaluates the initial loss at `x` before any iteration is done.
    ///
    /// A non-finite initial loss is handled according to the
    /// [`NanPolicy`] as if it occurred in iteration zero.
    pub fn start<O: Objective>(
        &mut self,
        o: &O,
        x: &DVector<f64>,
    ) -> Result<f64, GaussNewtonError> {
        check_dim(o, x)?;

        let initial = o.loss(x);
        debug!("initial loss = {}", initial);
        self.check_loss(initial)?;

        Ok(initial)
    }

    /// Runs [`max_iter`](GaussNewtonOptions::max_iter) iterations from `x`,
    /// recording the initial loss and the loss after every iteration.
    pub fn run<O: Objective>(
        &mut self,
        o: &O,
        x: &mut DVector<f64>,
    ) -> Result<Report, GaussNewtonError> {
        let initial = self.start(o, x)?;

        let mut losses = Vec::with_capacity(self.options.max_iter + 1);
        losses.push(initial);

        for _ in 0..self.options.max_iter {
            losses.push(self.next(o, x)?);
        }

        Ok(Report {
            losses,
            status: self.status,
        })
    }

    fn check_loss(&mut self, loss: f64) -> Result<(), GaussNewtonError> {
        if loss.is_finite() {
            return Ok(());
        }

        match self.options.nan_policy {
            NanPolicy::Abort => Err(GaussNewtonError::NonFiniteLoss { iter: self.iter }),
            NanPolicy::Continue => {
                if self.status.is_finite() {
                    warn!(
                        "loss is not finite in iteration {}, the nugget may be too small",
                        self.iter
                    );
                    self.status = Status::NonFinite {
                        first_iter: self.iter,
                    };
                }
                Ok(())
            }
        }
    }
}

impl Default for GaussNewton {
    fn default() -> Self {
        Self::new()
    }
}

impl<O: Objective> Optimizer<O> for GaussNewton {
    const NAME: &'static str = "Gauss-Newton";

    type Error = GaussNewtonError;

    fn next(&mut self, o: &O, x: &mut DVector<f64>) -> Result<f64, Self::Error> {
        check_dim(o, x)?;

        self.iter += 1;
        let iter = self.iter;

        let lin = o.linearize(x);
        let finite = lin.gradient.iter().all(|g| g.is_finite())
            && lin.hessian.iter().all(|h| h.is_finite());

        let step = if finite {
            match lin.hessian.clone().cholesky() {
                Some(chol) => chol.solve(&lin.gradient),
                None => {
                    debug!("Hessian is not positive-definite, falling back to LU");
                    match lin.hessian.lu().solve(&lin.gradient) {
                        Some(step) => step,
                        None => match self.options.nan_policy {
                            NanPolicy::Abort => {
                                return Err(GaussNewtonError::SingularSystem { iter })
                            }
                            NanPolicy::Continue => {
                                warn!("Gauss-Newton system is singular in iteration {}", iter);
                                DVector::from_element(x.len(), f64::NAN)
                            }
                        },
                    }
                }
            }
        } else {
            // Propagate the non-finite state to the iterate instead of failing.
            DVector::from_element(x.len(), f64::NAN)
        };

        x.axpy(-self.options.step_size, &step, 1.0);

        let loss = o.loss(x);
        debug!(
            "iter {}: loss = {}, |step| = {}",
            iter,
            loss,
            step.norm() * self.options.step_size.abs()
        );

        self.check_loss(loss)?;

        Ok(loss)
    }
}

fn check_dim<O: Objective>(o: &O, x: &DVector<f64>) -> Result<(), GaussNewtonError> {
    if x.len() != o.dim() {
        return Err(GaussNewtonError::InvalidDimensionality {
            expected: o.dim(),
            actual: x.len(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use nalgebra::{dvector, DMatrix};

    use crate::core::Linearization;

    // Residuals r(x) = (x0² - 2, x1 - 1, x0 x1 - sqrt(2)).
    struct Residuals;

    impl Residuals {
        fn residuals(x: &DVector<f64>) -> DVector<f64> {
            dvector![x[0] * x[0] - 2.0, x[1] - 1.0, x[0] * x[1] - 2f64.sqrt()]
        }

        fn jacobian(x: &DVector<f64>) -> DMatrix<f64> {
            DMatrix::from_row_slice(3, 2, &[2.0 * x[0], 0.0, 0.0, 1.0, x[1], x[0]])
        }
    }

    impl Objective for Residuals {
        fn dim(&self) -> usize {
            2
        }

        fn loss(&self, x: &DVector<f64>) -> f64 {
            Self::residuals(x).norm_squared()
        }

        fn linearize(&self, x: &DVector<f64>) -> Linearization {
            let r = Self::residuals(x);
            let j = Self::jacobian(x);
            Linearization {
                gradient: j.tr_mul(&r) * 2.0,
                hessian: j.tr_mul(&j) * 2.0,
            }
        }
    }

    // Constant gradient with zero curvature.
    struct Flat;

    impl Objective for Flat {
        fn dim(&self) -> usize {
            2
        }

        fn loss(&self, x: &DVector<f64>) -> f64 {
            x.sum()
        }

        fn linearize(&self, _: &DVector<f64>) -> Linearization {
            Linearization {
                gradient: dvector![1.0, 1.0],
                hessian: DMatrix::zeros(2, 2),
            }
        }
    }

    #[test]
    fn converges_on_zero_residual_problem() {
        let mut gn = GaussNewton::new();
        let mut x = dvector![1.0, 0.5];

        let report = gn.run(&Residuals, &mut x).unwrap();

        assert_eq!(report.losses().len(), 11);
        assert!(report.losses()[1] < report.losses()[0]);
        assert!(report.final_loss() < 1e-20);
        assert_eq!(report.status(), Status::Finite);
        assert_relative_eq!(x, dvector![2f64.sqrt(), 1.0], epsilon = 1e-10);
    }

    #[test]
    fn fixed_budget() {
        let mut options = GaussNewtonOptions::default();
        options.set_max_iter(3);
        let mut gn = GaussNewton::with_options(options);
        let mut x = dvector![2.0, 2.0];

        let report = gn.run(&Residuals, &mut x).unwrap();
        assert_eq!(report.losses().len(), 4);
        assert_eq!(gn.iter(), 3);

        let mut options = GaussNewtonOptions::default();
        options.set_max_iter(0);
        let mut gn = GaussNewton::with_options(options);
        let report = gn.run(&Residuals, &mut x).unwrap();
        assert_eq!(report.losses().len(), 1);
    }

    #[test]
    fn step_size_scales_step() {
        let x0 = dvector![1.5, 0.0];

        let mut full = x0.clone();
        GaussNewton::new().next(&Residuals, &mut full).unwrap();

        let mut options = GaussNewtonOptions::default();
        options.set_step_size(0.5);
        let mut half = x0.clone();
        GaussNewton::with_options(options)
            .next(&Residuals, &mut half)
            .unwrap();

        assert_relative_eq!(&half - &x0, (&full - &x0) * 0.5, epsilon = 1e-12);
    }

    #[test]
    fn non_finite_continue() {
        let mut gn = GaussNewton::new();
        let mut x = dvector![f64::NAN, 1.0];

        let report = gn.run(&Residuals, &mut x).unwrap();

        assert_eq!(report.losses().len(), 11);
        assert!(report.losses().iter().all(|loss| loss.is_nan()));
        assert_eq!(report.status(), Status::NonFinite { first_iter: 0 });
        assert!(!gn.status().is_finite());
    }

    #[test]
    fn non_finite_abort() {
        let mut options = GaussNewtonOptions::default();
        options.set_nan_policy(NanPolicy::Abort);
        let mut gn = GaussNewton::with_options(options);
        let mut x = dvector![f64::INFINITY, 1.0];

        assert!(matches!(
            gn.run(&Residuals, &mut x),
            Err(GaussNewtonError::NonFiniteLoss { iter: 0 })
        ));
    }

    #[test]
    fn singular_system_abort() {
        let mut options = GaussNewtonOptions::default();
        options.set_nan_policy(NanPolicy::Abort);
        let mut gn = GaussNewton::with_options(options);
        let mut x = dvector![0.0, 0.0];

        assert!(matches!(
            gn.next(&Flat, &mut x),
            Err(GaussNewtonError::SingularSystem { iter: 1 })
        ));
    }

    #[test]
    fn singular_system_continue() {
        let mut gn = GaussNewton::new();
        let mut x = dvector![0.0, 0.0];

        let report = gn.run(&Flat, &mut x).unwrap();

        assert_eq!(report.losses().len(), 11);
        assert_eq!(report.losses()[0], 0.0);
        assert!(report.losses()[1..].iter().all(|loss| loss.is_nan()));
        assert_eq!(report.status(), Status::NonFinite { first_iter: 1 });
    }

    #[test]
    fn dimension_mismatch() {
        let mut gn = GaussNewton::new();
        let mut x = dvector![1.0, 2.0, 3.0];

        assert!(matches!(
            gn.run(&Residuals, &mut x),
            Err(GaussNewtonError::InvalidDimensionality {
                expected: 2,
                actual: 3
            })
        ));
    }
}
