//! Gaussian kernels and their closed-form derivatives.
//!
//! Both supported kernels factorize over coordinates,
//!
//! ```text
//! k(x, y) = prod_j exp(-(x_j - y_j)^2 / (2 sigma_j^2)),
//! ```
//!
//! so any mixed partial derivative is a product of one-dimensional ones. For
//! the one-dimensional factor g(x, y) = exp(-t^2 / 2) with t = (x - y) /
//! sigma, the derivatives are
//!
//! ```text
//! d^a/dx^a d^b/dy^b g(x, y) = (-1)^a sigma^-(a + b) He_(a + b)(t) exp(-t^2 / 2),
//! ```
//!
//! where He_n are the probabilists' Hermite polynomials. This lets
//! [`Kernel::apply`] evaluate `L_x M_y k(x, y)` for any pair of
//! [operators](Operator) with a single exponential per point pair.
//!
//! # References
//!
//! \[1\] [Solving and Learning Nonlinear PDEs with Gaussian
//! Processes](https://arxiv.org/abs/2103.12959)

mod operator;

pub use operator::*;

use thiserror::Error;

use crate::core::Point;

/// Error in the kernel specification.
#[derive(Debug, Error)]
pub enum KernelError {
    /// A bandwidth is not a finite positive number.
    #[error("kernel bandwidth must be finite and positive, got {0}")]
    InvalidBandwidth(f64),
    /// An operator requests a derivative the kernel does not provide.
    #[error("derivative {index:?} exceeds the maximum supported order {max}")]
    UnsupportedOrder {
        /// Requested derivative orders.
        index: MultiIndex,
        /// Maximum supported order per coordinate.
        max: u8,
    },
}

/// Covariance function of the Gaussian process prior.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Kernel {
    /// Isotropic Gaussian kernel with a single bandwidth.
    Gaussian {
        /// Bandwidth (lengthscale).
        sigma: f64,
    },
    /// Gaussian kernel with one bandwidth per coordinate.
    AnisotropicGaussian {
        /// Bandwidths for the first and second coordinate.
        sigma: [f64; 2],
    },
}

impl Kernel {
    /// Isotropic Gaussian kernel.
    pub fn gaussian(sigma: f64) -> Self {
        Self::Gaussian { sigma }
    }

    /// Anisotropic Gaussian kernel.
    pub fn anisotropic_gaussian(sigma: [f64; 2]) -> Self {
        Self::AnisotropicGaussian { sigma }
    }

    /// Bandwidths per coordinate.
    pub fn bandwidths(&self) -> [f64; 2] {
        match *self {
            Kernel::Gaussian { sigma } => [sigma, sigma],
            Kernel::AnisotropicGaussian { sigma } => sigma,
        }
    }

    /// Checks that the kernel parameters are valid.
    pub fn validate(&self) -> Result<(), KernelError> {
        match self
            .bandwidths()
            .into_iter()
            .find(|s| !s.is_finite() || *s <= 0.0)
        {
            Some(s) => Err(KernelError::InvalidBandwidth(s)),
            None => Ok(()),
        }
    }

    /// Kernel value `k(x, y)`.
    pub fn value(&self, x: &Point, y: &Point) -> f64 {
        self.derivative(x, y, [0, 0], [0, 0])
    }

    /// Mixed partial derivative `d^dx_x d^dy_y k(x, y)`.
    pub fn derivative(&self, x: &Point, y: &Point, dx: MultiIndex, dy: MultiIndex) -> f64 {
        let (t, base) = self.scaled_diff(x, y);
        base * self.factor(&t, dx, dy)
    }

    /// Evaluates `lx` applied to the first argument and `ly` applied to the
    /// second argument of the kernel at the pair `(x, y)`.
    pub fn apply(&self, lx: &Operator, ly: &Operator, x: &Point, y: &Point) -> f64 {
        let (t, base) = self.scaled_diff(x, y);

        let mut acc = 0.0;
        for a in lx.terms() {
            for b in ly.terms() {
                acc += a.coef * b.coef * self.factor(&t, a.index, b.index);
            }
        }

        acc * base
    }

    fn scaled_diff(&self, x: &Point, y: &Point) -> ([f64; 2], f64) {
        let sigma = self.bandwidths();
        let t = [(x[0] - y[0]) / sigma[0], (x[1] - y[1]) / sigma[1]];
        let base = (-0.5 * (t[0] * t[0] + t[1] * t[1])).exp();
        (t, base)
    }

    // Polynomial part of the derivative; the exponential is shared by all
    // terms and multiplied in by the caller.
    fn factor(&self, t: &[f64; 2], dx: MultiIndex, dy: MultiIndex) -> f64 {
        let sigma = self.bandwidths();

        (0..2)
            .map(|j| {
                let n = dx[j] + dy[j];
                if n == 0 {
                    return 1.0;
                }

                let sign = if dx[j] % 2 == 1 { -1.0 } else { 1.0 };
                sign * hermite(n, t[j]) / sigma[j].powi(n as i32)
            })
            .product()
    }
}

/// Probabilists' Hermite polynomial `He_n(t)`.
fn hermite(n: u8, t: f64) -> f64 {
    let mut prev = 1.0;
    if n == 0 {
        return prev;
    }

    let mut curr = t;
    for k in 1..n {
        let next = t * curr - f64::from(k) * prev;
        prev = curr;
        curr = next;
    }

    curr
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use nalgebra::point;

    const H: f64 = 1e-4;

    fn kernels() -> Vec<Kernel> {
        vec![
            Kernel::gaussian(0.3),
            Kernel::anisotropic_gaussian([0.4, 0.25]),
        ]
    }

    // Central difference of `f` along coordinate `axis` of the first (`arg =
    // 0`) or second (`arg = 1`) point.
    fn central<F>(f: F, x: &Point, y: &Point, arg: usize, axis: usize) -> f64
    where
        F: Fn(&Point, &Point) -> f64,
    {
        let mut x1 = *x;
        let mut y1 = *y;
        let mut x2 = *x;
        let mut y2 = *y;
        if arg == 0 {
            x1[axis] += H;
            x2[axis] -= H;
        } else {
            y1[axis] += H;
            y2[axis] -= H;
        }
        (f(&x1, &y1) - f(&x2, &y2)) / (2.0 * H)
    }

    #[test]
    fn hermite_polynomials() {
        let t = 0.7;
        assert_relative_eq!(hermite(0, t), 1.0);
        assert_relative_eq!(hermite(1, t), t);
        assert_relative_eq!(hermite(2, t), t * t - 1.0);
        assert_relative_eq!(hermite(3, t), t.powi(3) - 3.0 * t);
        assert_relative_eq!(hermite(4, t), t.powi(4) - 6.0 * t * t + 3.0, epsilon = 1e-14);
    }

    #[test]
    fn value_is_maximal_on_diagonal() {
        let x = point![0.3, 0.6];
        let others = [point![0.31, 0.6], point![0.0, 0.0], point![1.0, -2.0]];

        for k in kernels() {
            let kxx = k.value(&x, &x);
            assert_relative_eq!(kxx, 1.0);
            for y in &others {
                assert!(k.value(&x, y) <= kxx);
                assert_relative_eq!(k.value(&x, y), k.value(y, &x));
            }
        }
    }

    #[test]
    fn first_derivatives_match_finite_differences() {
        let x = point![0.2, 0.5];
        let y = point![0.35, 0.4];

        for k in kernels() {
            let value = |x: &Point, y: &Point| k.value(x, y);
            for axis in 0..2 {
                let mut index = [0, 0];
                index[axis] = 1;

                let dx = k.derivative(&x, &y, index, [0, 0]);
                let dy = k.derivative(&x, &y, [0, 0], index);
                assert_relative_eq!(dx, central(value, &x, &y, 0, axis), max_relative = 1e-6);
                assert_relative_eq!(dy, central(value, &x, &y, 1, axis), max_relative = 1e-6);
            }
        }
    }

    #[test]
    fn mixed_derivatives_match_finite_differences() {
        let x = point![0.2, 0.5];
        let y = point![0.35, 0.4];

        for k in kernels() {
            // d_x1 d^2_y2 obtained by differentiating d^2_y2 in x1.
            let inner = |x: &Point, y: &Point| k.derivative(x, y, [0, 0], [0, 2]);
            let expected = central(inner, &x, &y, 0, 0);
            let actual = k.derivative(&x, &y, [1, 0], [0, 2]);
            assert_relative_eq!(actual, expected, max_relative = 1e-5);

            // d^2_x2 d^2_y2 obtained by differentiating d_x2 d^2_y2 in x2.
            let inner = |x: &Point, y: &Point| k.derivative(x, y, [0, 1], [0, 2]);
            let expected = central(inner, &x, &y, 0, 1);
            let actual = k.derivative(&x, &y, [0, 2], [0, 2]);
            assert_relative_eq!(actual, expected, max_relative = 1e-5);
        }
    }

    #[test]
    fn bilaplacian_on_diagonal() {
        // For the isotropic kernel in two dimensions, the value at x = y is
        // 8 / sigma^4.
        let sigma = 0.2;
        let k = Kernel::gaussian(sigma);
        let x = point![0.5, 0.5];
        let lap = Operator::laplacian();

        assert_relative_eq!(
            k.apply(&lap, &lap, &x, &x),
            8.0 / sigma.powi(4),
            max_relative = 1e-12
        );
    }

    #[test]
    fn apply_is_symmetric_under_swap() {
        let x = point![0.1, 0.9];
        let y = point![0.3, 0.7];
        let burgers = Operator::advection_diffusion(0.05);
        let dx = Operator::partial(Axis::Second);

        for k in kernels() {
            assert_relative_eq!(
                k.apply(&burgers, &dx, &x, &y),
                k.apply(&dx, &burgers, &y, &x),
                max_relative = 1e-12
            );
        }
    }

    #[test]
    fn invalid_bandwidth() {
        assert!(Kernel::gaussian(0.2).validate().is_ok());
        assert!(matches!(
            Kernel::gaussian(0.0).validate(),
            Err(KernelError::InvalidBandwidth(_))
        ));
        assert!(matches!(
            Kernel::anisotropic_gaussian([0.1, f64::NAN]).validate(),
            Err(KernelError::InvalidBandwidth(_))
        ));
    }
}
