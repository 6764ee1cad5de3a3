//! Linear differential operators acting on one argument of a kernel.
//!
//! An [`Operator`] is a finite sum of constant-coefficient partial
//! derivatives,
//!
//! ```text
//! L = sum_i c_i * d^(a_i1) / dx1^(a_i1) * d^(a_i2) / dx2^(a_i2)
//! ```
//!
//! which is all the collocation method needs to encode the differential
//! operators of the supported equations. Orders are limited to
//! [`MAX_ORDER`] per coordinate.

use super::KernelError;

/// Maximum supported derivative order per coordinate and per kernel
/// argument.
pub const MAX_ORDER: u8 = 2;

/// Orders of partial derivatives with respect to both coordinates.
pub type MultiIndex = [u8; 2];

/// Coordinate of a point. For time-dependent problems, [`Axis::First`] is
/// time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// First coordinate.
    First,
    /// Second coordinate.
    Second,
}

impl Axis {
    /// Position of the coordinate in a point or a [`MultiIndex`].
    pub fn index(self) -> usize {
        match self {
            Axis::First => 0,
            Axis::Second => 1,
        }
    }

    fn unit(self, order: u8) -> MultiIndex {
        let mut index = [0, 0];
        index[self.index()] = order;
        index
    }
}

/// Single term of an operator: a coefficient multiplying a partial
/// derivative.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Term {
    /// Coefficient of the term.
    pub coef: f64,
    /// Partial derivative orders.
    pub index: MultiIndex,
}

/// Linear differential operator with constant coefficients.
#[derive(Debug, Clone, PartialEq)]
pub struct Operator {
    terms: Vec<Term>,
}

impl Operator {
    /// Creates an operator from given terms.
    ///
    /// Fails if any term requests a derivative of order higher than
    /// [`MAX_ORDER`] in some coordinate.
    pub fn new(terms: Vec<Term>) -> Result<Self, KernelError> {
        if let Some(term) = terms.iter().find(|term| term.index.iter().any(|&a| a > MAX_ORDER)) {
            return Err(KernelError::UnsupportedOrder {
                index: term.index,
                max: MAX_ORDER,
            });
        }

        Ok(Self { terms })
    }

    fn from_terms<const N: usize>(terms: [(f64, MultiIndex); N]) -> Self {
        Self {
            terms: terms
                .into_iter()
                .map(|(coef, index)| Term { coef, index })
                .collect(),
        }
    }

    /// Point evaluation, i.e., the function value itself.
    pub fn identity() -> Self {
        Self::from_terms([(1.0, [0, 0])])
    }

    /// First partial derivative with respect to given coordinate.
    pub fn partial(axis: Axis) -> Self {
        Self::from_terms([(1.0, axis.unit(1))])
    }

    /// Second partial derivative with respect to given coordinate.
    pub fn second_partial(axis: Axis) -> Self {
        Self::from_terms([(1.0, axis.unit(2))])
    }

    /// Laplace operator.
    pub fn laplacian() -> Self {
        Self::from_terms([(1.0, [2, 0]), (1.0, [0, 2])])
    }

    /// Linear part of the viscous Burgers' operator in (t, x) coordinates,
    /// `d/dt - nu * d^2/dx^2`.
    pub fn advection_diffusion(nu: f64) -> Self {
        Self::from_terms([(1.0, [1, 0]), (-nu, [0, 2])])
    }

    /// Terms of the operator.
    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    /// Highest derivative order over both coordinates.
    pub fn order(&self) -> u8 {
        self.terms
            .iter()
            .flat_map(|term| term.index)
            .max()
            .unwrap_or(0)
    }
}
