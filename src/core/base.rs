use thiserror::Error;

use super::points::Point;
use crate::{
    algo::GaussNewtonError,
    factor::FactorError,
    kernel::{Kernel, KernelError},
    nugget::{Nugget, NuggetPolicy},
};

/// Family of the partial differential equation together with its
/// coefficients.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Pde {
    /// Nonlinear elliptic equation `-Δu + alpha * u^m = f` with Dirichlet
    /// boundary condition `u = g`.
    Elliptic {
        /// Coefficient of the nonlinear term.
        alpha: f64,
        /// Exponent of the nonlinear term.
        m: i32,
    },
    /// Viscous Burgers' equation `u_t + alpha * u * u_x - nu * u_xx = f` in
    /// (t, x) coordinates, with initial and boundary condition `u = g`.
    Burgers {
        /// Coefficient of the advection term.
        alpha: f64,
        /// Viscosity.
        nu: f64,
    },
    /// Regularized Eikonal equation `|∇u|^2 = f^2 + eps * Δu` with Dirichlet
    /// boundary condition `u = g`.
    Eikonal {
        /// Regularization parameter.
        eps: f64,
    },
}

impl Pde {
    /// Nonlinear elliptic equation.
    pub fn elliptic(alpha: f64, m: i32) -> Self {
        Self::Elliptic { alpha, m }
    }

    /// Viscous Burgers' equation.
    pub fn burgers(alpha: f64, nu: f64) -> Self {
        Self::Burgers { alpha, nu }
    }

    /// Regularized Eikonal equation.
    pub fn eikonal(eps: f64) -> Self {
        Self::Eikonal { eps }
    }

    /// Name of the equation family.
    pub fn name(&self) -> &'static str {
        match self {
            Pde::Elliptic { .. } => "nonlinear elliptic",
            Pde::Burgers { .. } => "Burgers",
            Pde::Eikonal { .. } => "Eikonal",
        }
    }

    /// Whether the first coordinate is time.
    pub fn is_time_dependent(&self) -> bool {
        matches!(self, Pde::Burgers { .. })
    }

    /// Kernel that works well for the family on unit-sized domains.
    pub fn default_kernel(&self) -> Kernel {
        match self {
            Pde::Burgers { .. } => Kernel::anisotropic_gaussian([1.0 / 3.0, 1.0 / 20.0]),
            Pde::Elliptic { .. } | Pde::Eikonal { .. } => Kernel::gaussian(0.2),
        }
    }

    /// Nugget that works well for the family with the default kernel.
    pub fn default_nugget(&self) -> Nugget {
        match self {
            Pde::Burgers { .. } => Nugget::new(1e-5, NuggetPolicy::Adaptive),
            Pde::Elliptic { .. } | Pde::Eikonal { .. } => Nugget::new(1e-8, NuggetPolicy::Adaptive),
        }
    }
}

/// The trait for defining boundary value problems.
///
/// ## Defining a problem
///
/// A problem is any type that implements [`Problem`]. It determines the
/// equation and provides the right-hand side and boundary data, which are
/// evaluated once per collocation point when a session is built.
///
/// ```rust
/// use kercol::{Pde, Point, Problem};
///
/// // -Δu + u^3 = f on the unit square, u = 0 on the boundary.
/// struct Cubic;
///
/// impl Problem for Cubic {
///     fn pde(&self) -> Pde {
///         Pde::elliptic(1.0, 3)
///     }
///
///     fn rhs(&self, x: &Point) -> f64 {
///         x[0] * x[1]
///     }
///
///     fn boundary(&self, _: &Point) -> f64 {
///         0.0
///     }
/// }
/// ```
pub trait Problem {
    /// Equation family and coefficients.
    fn pde(&self) -> Pde;

    /// Right-hand side `f` at an interior point.
    fn rhs(&self, x: &Point) -> f64;

    /// Boundary (and for time-dependent problems, initial) value `g`.
    fn boundary(&self, x: &Point) -> f64;
}

/// Error encountered while setting up or running a solve session.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid kernel specification.
    #[error("{0}")]
    Kernel(#[from] KernelError),
    /// The regularized Gram matrix could not be factorized.
    #[error("{0}")]
    Factor(#[from] FactorError),
    /// Failure of the Gauss-Newton iteration.
    #[error("{0}")]
    GaussNewton(#[from] GaussNewtonError),
    /// Requested combination of equation family and method is not supported.
    #[error("unsupported combination: {0}")]
    InvalidCombination(String),
    /// The nugget is negative or not finite.
    #[error("nugget must be finite and nonnegative, got {0}")]
    InvalidNugget(f64),
    /// There are no interior collocation points.
    #[error("no interior collocation points")]
    EmptyDomain,
    /// A supplied vector does not have the expected length.
    #[error("invalid dimensionality: expected {expected}, got {actual}")]
    InvalidDimensionality {
        /// Expected length.
        expected: usize,
        /// Actual length.
        actual: usize,
    },
}
