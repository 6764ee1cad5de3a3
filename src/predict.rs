//! Extension of the solution to arbitrary points.
//!
//! The solution is the minimum-norm function in the RKHS that takes the
//! measurements `r(z)` at the collocation points. Its value (or the value of
//! any linear operator `L` applied to it) at a point `x` is the posterior
//! mean
//!
//! ```text
//! L u(x) = K_L(x, X) G⁻¹ r(z),
//! ```
//!
//! where `K_L(x, X)` is the cross-covariance between `L` at `x` and the
//! measurements of the layout. The *dual coefficients* `G⁻¹ r(z)` are
//! computed once.

use nalgebra::DVector;

use crate::{
    core::{CollocationSet, Layout, Point},
    factor::CholeskyFactor,
    gram::cross_covariance,
    kernel::{Kernel, Operator},
};

/// Posterior mean of the solution given the solved measurements.
#[derive(Debug, Clone)]
pub struct Posterior {
    kernel: Kernel,
    layout: Layout,
    points: CollocationSet,
    dual: DVector<f64>,
}

impl Posterior {
    /// Computes the dual coefficients for measurements `r`.
    pub fn new(
        kernel: Kernel,
        layout: Layout,
        points: CollocationSet,
        factor: &CholeskyFactor,
        measurements: &DVector<f64>,
    ) -> Self {
        debug_assert_eq!(measurements.len(), layout.dim());

        let dual = factor.solve(measurements);

        Self {
            kernel,
            layout,
            points,
            dual,
        }
    }

    /// The dual coefficients `G⁻¹ r`.
    pub fn dual(&self) -> &DVector<f64> {
        &self.dual
    }

    /// Values of the solution at given points.
    pub fn evaluate(&self, queries: &[Point]) -> DVector<f64> {
        self.evaluate_operator(&Operator::identity(), queries)
    }

    /// Values of `op` applied to the solution at given points.
    pub fn evaluate_operator(&self, op: &Operator, queries: &[Point]) -> DVector<f64> {
        let cross = cross_covariance(&self.kernel, op, queries, &self.layout, &self.points);
        cross * &self.dual
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use nalgebra::point;

    use crate::{
        core::Pde,
        gram::assemble,
        kernel::Axis,
        nugget::{Nugget, NuggetPolicy},
        testing,
    };

    fn interpolant(
        pde: Pde,
        kernel: Kernel,
        points: CollocationSet,
        values: impl Fn(usize) -> f64,
    ) -> (Posterior, DVector<f64>) {
        let layout = Layout::new(&pde, points.n_domain(), points.n_boundary());
        let mut gram = assemble(&kernel, &layout, &points);
        Nugget::new(1e-10, NuggetPolicy::Identity).apply(&mut gram, &layout);
        let factor = CholeskyFactor::new(&gram).unwrap();
        let r = DVector::from_fn(layout.dim(), |i, _| values(i));

        (Posterior::new(kernel, layout, points, &factor, &r), r)
    }

    #[test]
    fn reproduces_values_at_collocation_points() {
        let points = testing::grid([[0.0, 1.0], [0.0, 1.0]], 5, false);
        let (posterior, r) = interpolant(
            Pde::elliptic(1.0, 3),
            Kernel::gaussian(0.15),
            points.clone(),
            |i| (i as f64 * 0.37).cos(),
        );

        let all: Vec<Point> = points.all().copied().collect();
        let values = posterior.evaluate(&all);
        let offset = posterior.layout.range(posterior.layout.reference()).start;

        for (i, value) in values.iter().enumerate() {
            assert_relative_eq!(*value, r[offset + i], epsilon = 1e-6);
        }
    }

    #[test]
    fn reproduces_derivative_measurements() {
        let points = testing::grid([[0.0, 1.0], [0.0, 1.0]], 5, false);
        let (posterior, r) = interpolant(
            Pde::eikonal(0.1),
            Kernel::gaussian(0.15),
            points.clone(),
            |i| (i as f64 * 0.21).sin(),
        );

        let n = points.n_domain();
        let d2 = posterior.evaluate_operator(&Operator::partial(Axis::Second), points.domain());
        for i in 0..n {
            assert_relative_eq!(d2[i], r[n + i], epsilon = 1e-5);
        }
    }

    #[test]
    fn linear_in_measurements() {
        let points = CollocationSet::new(
            vec![point![0.3, 0.4], point![0.7, 0.6]],
            vec![point![0.0, 0.5], point![1.0, 0.5]],
        );
        let queries = [point![0.5, 0.5], point![0.1, 0.9]];

        let pde = Pde::elliptic(1.0, 3);
        let kernel = Kernel::gaussian(0.5);
        let (a, _) = interpolant(pde, kernel, points.clone(), |i| i as f64);
        let (b, _) = interpolant(pde, kernel, points, |i| 2.0 * i as f64);

        assert_relative_eq!(
            b.evaluate(&queries),
            a.evaluate(&queries) * 2.0,
            max_relative = 1e-10
        );
    }
}
