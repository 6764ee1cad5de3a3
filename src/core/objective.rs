use nalgebra::{DMatrix, DVector};

/// Gradient and Gauss-Newton Hessian of an objective at a point.
#[derive(Debug, Clone)]
pub struct Linearization {
    /// Gradient of the objective.
    pub gradient: DVector<f64>,
    /// Hessian of the objective linearized at the point.
    pub hessian: DMatrix<f64>,
}

/// The trait for sum-of-squares objectives minimized by Gauss-Newton type
/// methods.
///
/// ## Defining an objective
///
/// An objective provides its value and a local quadratic model given by the
/// exact gradient and the Gauss-Newton Hessian, i.e., the Hessian of the
/// objective with the residual replaced by its linearization at the point.
///
/// ```rust
/// use kercol::nalgebra::{DMatrix, DVector};
/// use kercol::{Linearization, Objective};
///
/// // || A x - b ||^2
/// struct LinearLeastSquares {
///     a: DMatrix<f64>,
///     b: DVector<f64>,
/// }
///
/// impl Objective for LinearLeastSquares {
///     fn dim(&self) -> usize {
///         self.a.ncols()
///     }
///
///     fn loss(&self, x: &DVector<f64>) -> f64 {
///         (&self.a * x - &self.b).norm_squared()
///     }
///
///     fn linearize(&self, x: &DVector<f64>) -> Linearization {
///         let r = &self.a * x - &self.b;
///         Linearization {
///             gradient: self.a.tr_mul(&r) * 2.0,
///             hessian: self.a.tr_mul(&self.a) * 2.0,
///         }
///     }
/// }
/// ```
pub trait Objective {
    /// Number of variables.
    fn dim(&self) -> usize;

    /// Value of the objective.
    fn loss(&self, x: &DVector<f64>) -> f64;

    /// Gradient and Gauss-Newton Hessian at `x`.
    fn linearize(&self, x: &DVector<f64>) -> Linearization;
}
