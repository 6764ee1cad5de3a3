//! Collocation loss of the discretized equation.
//!
//! The unknowns `z` are values of the solution (and, depending on the
//! family, of some of its derivatives) at the interior collocation points.
//! From `z` and the problem data, the *measurement vector* `r(z)` is built so
//! that it is aligned with the [layout](crate::core::Layout) of the Gram
//! matrix: entry `i` is the value that the `i`-th linear measurement of the
//! solution must take for the equation to hold. The loss is the squared RKHS
//! norm of the minimum-norm interpolant of these measurements,
//!
//! ```text
//! loss(z) = r(z)ᵀ G⁻¹ r(z) = |L⁻¹ r(z)|².
//! ```
//!
//! The measurements depend on `z` nonlinearly only through the nonlinear term
//! of the equation, and the Jacobian `J = ∂r/∂z` is known in closed form.
//! The gradient is `2 (L⁻¹J)ᵀ L⁻¹r` and the Gauss-Newton Hessian, the
//! Hessian of the loss with `r` replaced by its linearization, is
//! `2 (L⁻¹J)ᵀ (L⁻¹J)`.
//!
//! | family   | unknowns         | measurements                          |
//! |----------|------------------|---------------------------------------|
//! | elliptic | `u`              | `[α uᵐ - f, u, g]`                    |
//! | relaxed  | `[v, w]`         | `[v, w, g]`, penalty `-v + α wᵐ - f`  |
//! | Burgers  | `[u, u_x]`       | `[f - α u u_x, u_x, u, g]`            |
//! | Eikonal  | `[u, u₁, u₂]`    | `[u₁, u₂, (u₁² + u₂² - f²)/ε, u, g]`  |
//!
//! # References
//!
//! \[1\] [Solving and learning nonlinear PDEs with Gaussian
//! processes](https://doi.org/10.1016/j.jcp.2021.110668)

use nalgebra::{DMatrix, DVector};

use crate::{
    core::{Collocation, Error, Layout, Linearization, Objective, Pde},
    factor::CholeskyFactor,
};

/// Formulation of the optimization problem.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Formulation {
    /// The equation is imposed exactly at interior points.
    #[default]
    Exact,
    /// The nonlinear term is decoupled from the Laplacian by auxiliary
    /// unknowns and the equation is imposed by a quadratic penalty. Available
    /// only for the elliptic family.
    Relaxed {
        /// Penalty parameter. The smaller, the stricter.
        penalty: f64,
    },
}

/// Loss of a collocation discretization, see [module](self) documentation.
#[derive(Debug, Clone)]
pub struct CollocationLoss {
    pde: Pde,
    formulation: Formulation,
    layout: Layout,
    data: Collocation,
    factor: CholeskyFactor,
}

impl CollocationLoss {
    /// Creates the loss for given equation, data and factorized Gram matrix.
    pub fn new(
        pde: Pde,
        formulation: Formulation,
        data: Collocation,
        factor: CholeskyFactor,
    ) -> Result<Self, Error> {
        if data.n_domain() == 0 {
            return Err(Error::EmptyDomain);
        }

        check_formulation(&pde, formulation)?;

        let layout = Layout::new(&pde, data.n_domain(), data.n_boundary());

        if factor.dim() != layout.dim() {
            return Err(Error::InvalidDimensionality {
                expected: layout.dim(),
                actual: factor.dim(),
            });
        }

        Ok(Self {
            pde,
            formulation,
            layout,
            data,
            factor,
        })
    }

    /// The equation.
    pub fn pde(&self) -> &Pde {
        &self.pde
    }

    /// The formulation.
    pub fn formulation(&self) -> Formulation {
        self.formulation
    }

    /// Layout of the measurements.
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Collocation points and problem data.
    pub fn data(&self) -> &Collocation {
        &self.data
    }

    /// Cholesky factor of the regularized Gram matrix.
    pub fn factor(&self) -> &CholeskyFactor {
        &self.factor
    }

    /// Number of unknowns.
    pub fn n_unknowns(&self) -> usize {
        let n = self.data.n_domain();

        match (self.pde, self.formulation) {
            (Pde::Elliptic { .. }, Formulation::Exact) => n,
            (Pde::Elliptic { .. }, Formulation::Relaxed { .. }) => 2 * n,
            (Pde::Burgers { .. }, _) => 2 * n,
            (Pde::Eikonal { .. }, _) => 3 * n,
        }
    }

    /// Values of the solution at interior points.
    pub fn field(&self, z: &DVector<f64>) -> DVector<f64> {
        let n = self.data.n_domain();

        match self.formulation {
            Formulation::Relaxed { .. } => z.rows(n, n).into_owned(),
            Formulation::Exact => z.rows(0, n).into_owned(),
        }
    }

    /// The measurement vector `r(z)`.
    pub fn measurements(&self, z: &DVector<f64>) -> DVector<f64> {
        let n = self.data.n_domain();
        let nb = self.data.n_boundary();
        let f = self.data.rhs();
        let g = self.data.bdy();

        let mut r = DVector::zeros(self.layout.dim());
        // Every family ends with the values followed by the boundary data.
        let value = self.layout.range(self.layout.reference()).start;
        r.rows_mut(value, n).copy_from(&self.field(z));
        r.rows_mut(value + n, nb).copy_from(g);

        match (self.pde, self.formulation) {
            (Pde::Elliptic { alpha, m }, Formulation::Exact) => {
                for i in 0..n {
                    r[i] = alpha * z[i].powi(m) - f[i];
                }
            }
            (Pde::Elliptic { .. }, Formulation::Relaxed { .. }) => {
                r.rows_mut(0, n).copy_from(&z.rows(0, n));
            }
            (Pde::Burgers { alpha, .. }, _) => {
                for i in 0..n {
                    let (u, ux) = (z[i], z[n + i]);
                    r[i] = f[i] - alpha * u * ux;
                    r[n + i] = ux;
                }
            }
            (Pde::Eikonal { eps }, _) => {
                for i in 0..n {
                    let (u1, u2) = (z[n + i], z[2 * n + i]);
                    r[i] = u1;
                    r[n + i] = u2;
                    r[2 * n + i] = (u1 * u1 + u2 * u2 - f[i] * f[i]) / eps;
                }
            }
        }

        r
    }

    /// The Jacobian `∂r/∂z` of the measurement vector.
    pub fn jacobian(&self, z: &DVector<f64>) -> DMatrix<f64> {
        let n = self.data.n_domain();
        let mut jac = DMatrix::zeros(self.layout.dim(), self.n_unknowns());

        match (self.pde, self.formulation) {
            (Pde::Elliptic { alpha, m }, Formulation::Exact) => {
                for i in 0..n {
                    jac[(i, i)] = power_derivative(alpha, m, z[i]);
                    jac[(n + i, i)] = 1.0;
                }
            }
            (Pde::Elliptic { .. }, Formulation::Relaxed { .. }) => {
                for i in 0..2 * n {
                    jac[(i, i)] = 1.0;
                }
            }
            (Pde::Burgers { alpha, .. }, _) => {
                for i in 0..n {
                    let (u, ux) = (z[i], z[n + i]);
                    jac[(i, i)] = -alpha * ux;
                    jac[(i, n + i)] = -alpha * u;
                    jac[(n + i, n + i)] = 1.0;
                    jac[(2 * n + i, i)] = 1.0;
                }
            }
            (Pde::Eikonal { eps }, _) => {
                for i in 0..n {
                    let (u1, u2) = (z[n + i], z[2 * n + i]);
                    jac[(i, n + i)] = 1.0;
                    jac[(n + i, 2 * n + i)] = 1.0;
                    jac[(2 * n + i, n + i)] = 2.0 * u1 / eps;
                    jac[(2 * n + i, 2 * n + i)] = 2.0 * u2 / eps;
                    jac[(3 * n + i, i)] = 1.0;
                }
            }
        }

        jac
    }

    /// Violation of the equation `-v + α wᵐ - f` in the relaxed formulation.
    pub fn penalty(&self, z: &DVector<f64>) -> Option<DVector<f64>> {
        match (self.pde, self.formulation) {
            (Pde::Elliptic { alpha, m }, Formulation::Relaxed { .. }) => {
                let n = self.data.n_domain();
                let f = self.data.rhs();
                Some(DVector::from_fn(n, |i, _| {
                    -z[i] + alpha * z[n + i].powi(m) - f[i]
                }))
            }
            _ => None,
        }
    }

    /// The Jacobian of the [penalty](CollocationLoss::penalty).
    pub fn penalty_jacobian(&self, z: &DVector<f64>) -> Option<DMatrix<f64>> {
        match (self.pde, self.formulation) {
            (Pde::Elliptic { alpha, m }, Formulation::Relaxed { .. }) => {
                let n = self.data.n_domain();
                let mut jac = DMatrix::zeros(n, 2 * n);
                for i in 0..n {
                    jac[(i, i)] = -1.0;
                    jac[(i, n + i)] = power_derivative(alpha, m, z[n + i]);
                }
                Some(jac)
            }
            _ => None,
        }
    }

    /// Loss with the measurements (and penalty) linearized at `z_old`.
    ///
    /// It is a quadratic function of `z` whose Hessian is the Gauss-Newton
    /// Hessian at `z_old`. For `z = z_old`, it equals the loss.
    pub fn linearized_loss(&self, z: &DVector<f64>, z_old: &DVector<f64>) -> f64 {
        let dz = z - z_old;
        let r = self.measurements(z_old) + self.jacobian(z_old) * &dz;
        let mut loss = self.factor.whiten(&r).norm_squared();

        if let (Some(p), Some(jp), Formulation::Relaxed { penalty }) = (
            self.penalty(z_old),
            self.penalty_jacobian(z_old),
            self.formulation,
        ) {
            loss += (p + jp * &dz).norm_squared() / penalty;
        }

        loss
    }
}

impl Objective for CollocationLoss {
    fn dim(&self) -> usize {
        self.n_unknowns()
    }

    fn loss(&self, z: &DVector<f64>) -> f64 {
        let mut loss = self.factor.whiten(&self.measurements(z)).norm_squared();

        if let (Some(p), Formulation::Relaxed { penalty }) = (self.penalty(z), self.formulation) {
            loss += p.norm_squared() / penalty;
        }

        loss
    }

    fn linearize(&self, z: &DVector<f64>) -> Linearization {
        let w = self.factor.whiten(&self.measurements(z));
        let wj = self.factor.whiten_columns(&self.jacobian(z));

        let mut gradient = wj.tr_mul(&w) * 2.0;
        let mut hessian = wj.tr_mul(&wj) * 2.0;

        if let (Some(p), Some(jp), Formulation::Relaxed { penalty }) = (
            self.penalty(z),
            self.penalty_jacobian(z),
            self.formulation,
        ) {
            gradient += jp.tr_mul(&p) * (2.0 / penalty);
            hessian += jp.tr_mul(&jp) * (2.0 / penalty);
        }

        Linearization { gradient, hessian }
    }
}

/// Checks that the formulation is available for the equation.
pub fn check_formulation(pde: &Pde, formulation: Formulation) -> Result<(), Error> {
    if let Formulation::Relaxed { penalty } = formulation {
        if !matches!(pde, Pde::Elliptic { .. }) {
            return Err(Error::InvalidCombination(format!(
                "relaxed formulation is not available for {} equation",
                pde.name()
            )));
        }

        if !(penalty.is_finite() && penalty > 0.0) {
            return Err(Error::InvalidCombination(format!(
                "penalty must be positive, got {}",
                penalty
            )));
        }
    }

    Ok(())
}

// d/dz (α zᵐ)
fn power_derivative(alpha: f64, m: i32, z: f64) -> f64 {
    if m == 0 {
        0.0
    } else {
        alpha * m as f64 * z.powi(m - 1)
    }
}
