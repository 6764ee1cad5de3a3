//! Reference problems and collocation-point samplers useful for benchmarking,
//! debugging and smoke testing.
//!
//! Every reference problem is manufactured from a known smooth solution, so
//! the error of a computed solution can be measured exactly. [`SineElliptic`]
//! is recommended for first tests.
//!
//! # References
//!
//! \[1\] [Solving and learning nonlinear PDEs with Gaussian
//! processes](https://doi.org/10.1016/j.jcp.2021.110668)

#![allow(unused)]

use std::f64::consts::PI;

use nalgebra::{point, DVector};
use rand::Rng;

use crate::core::{CollocationSet, Pde, Point, Problem};

/// Extension of the [`Problem`] trait that provides additional information
/// that is useful for testing solvers.
pub trait TestProblem: Problem {
    /// Rectangular domain `[[lo, hi], [lo, hi]]`. For time-dependent problems
    /// the first coordinate is time.
    fn bounds(&self) -> [[f64; 2]; 2];

    /// The exact solution.
    fn solution(&self, x: &Point) -> f64;
}

/// Nonlinear elliptic equation `-Δu + α uᵐ = f` with the solution
/// `u = sin(πx₁) sin(πx₂)` on the unit square.
#[derive(Debug, Clone, Copy)]
pub struct SineElliptic {
    alpha: f64,
    m: i32,
}

impl SineElliptic {
    /// Initializes the problem with given nonlinearity.
    pub fn new(alpha: f64, m: i32) -> Self {
        Self { alpha, m }
    }
}

impl Default for SineElliptic {
    fn default() -> Self {
        Self::new(1.0, 3)
    }
}

impl Problem for SineElliptic {
    fn pde(&self) -> Pde {
        Pde::elliptic(self.alpha, self.m)
    }

    fn rhs(&self, x: &Point) -> f64 {
        let u = self.solution(x);
        2.0 * PI * PI * u + self.alpha * u.powi(self.m)
    }

    fn boundary(&self, x: &Point) -> f64 {
        self.solution(x)
    }
}

impl TestProblem for SineElliptic {
    fn bounds(&self) -> [[f64; 2]; 2] {
        [[0.0, 1.0], [0.0, 1.0]]
    }

    fn solution(&self, x: &Point) -> f64 {
        (PI * x[0]).sin() * (PI * x[1]).sin()
    }
}

/// Laplace equation `-Δu = 0` with constant boundary value, whose solution is
/// that constant.
#[derive(Debug, Clone, Copy)]
pub struct ConstantElliptic {
    c: f64,
}

impl ConstantElliptic {
    /// Initializes the problem with given boundary value.
    pub fn new(c: f64) -> Self {
        Self { c }
    }
}

impl Problem for ConstantElliptic {
    fn pde(&self) -> Pde {
        Pde::elliptic(0.0, 3)
    }

    fn rhs(&self, _: &Point) -> f64 {
        0.0
    }

    fn boundary(&self, _: &Point) -> f64 {
        self.c
    }
}

impl TestProblem for ConstantElliptic {
    fn bounds(&self) -> [[f64; 2]; 2] {
        [[0.0, 1.0], [0.0, 1.0]]
    }

    fn solution(&self, _: &Point) -> f64 {
        self.c
    }
}

/// Viscous Burgers' equation on `(t, x) ∈ [0, 1] × [-1, 1]` with the decaying
/// solution `u = exp(-t) sin(πx)`.
#[derive(Debug, Clone, Copy)]
pub struct BurgersDecay {
    alpha: f64,
    nu: f64,
}

impl BurgersDecay {
    /// Initializes the problem with given advection coefficient and
    /// viscosity.
    pub fn new(alpha: f64, nu: f64) -> Self {
        Self { alpha, nu }
    }
}

impl Default for BurgersDecay {
    fn default() -> Self {
        Self::new(1.0, 0.1)
    }
}

impl Problem for BurgersDecay {
    fn pde(&self) -> Pde {
        Pde::burgers(self.alpha, self.nu)
    }

    fn rhs(&self, x: &Point) -> f64 {
        let (t, s) = (x[0], x[1]);
        let u = self.solution(x);
        let u_x = PI * (-t).exp() * (PI * s).cos();
        // u_t = -u, u_xx = -π² u
        -u + self.alpha * u * u_x + self.nu * PI * PI * u
    }

    fn boundary(&self, x: &Point) -> f64 {
        self.solution(x)
    }
}

impl TestProblem for BurgersDecay {
    fn bounds(&self) -> [[f64; 2]; 2] {
        [[0.0, 1.0], [-1.0, 1.0]]
    }

    fn solution(&self, x: &Point) -> f64 {
        (-x[0]).exp() * (PI * x[1]).sin()
    }
}

/// Regularized Eikonal equation `|∇u|² = f² + ε Δu` with the linear solution
/// `u = x₁ + x₂` and `f = √2` on the unit square.
#[derive(Debug, Clone, Copy)]
pub struct PlaneEikonal {
    eps: f64,
}

impl PlaneEikonal {
    /// Initializes the problem with given regularization.
    pub fn new(eps: f64) -> Self {
        Self { eps }
    }
}

impl Problem for PlaneEikonal {
    fn pde(&self) -> Pde {
        Pde::eikonal(self.eps)
    }

    fn rhs(&self, _: &Point) -> f64 {
        2f64.sqrt()
    }

    fn boundary(&self, x: &Point) -> f64 {
        self.solution(x)
    }
}

impl TestProblem for PlaneEikonal {
    fn bounds(&self) -> [[f64; 2]; 2] {
        [[0.0, 1.0], [0.0, 1.0]]
    }

    fn solution(&self, x: &Point) -> f64 {
        x[0] + x[1]
    }
}

/// Uniform grid of `n × n` points covering the closed rectangle.
///
/// Points on the boundary of the rectangle are boundary points, the rest are
/// interior points. If `time_dependent` is set, the first coordinate is time
/// and the final time slice is part of the interior, so the boundary is
/// `{t = t₀} ∪ {x = x_lo} ∪ {x = x_hi}`.
pub fn grid(bounds: [[f64; 2]; 2], n: usize, time_dependent: bool) -> CollocationSet {
    let n = n.max(2);
    let coord = |axis: usize, i: usize| {
        let [lo, hi] = bounds[axis];
        lo + (hi - lo) * i as f64 / (n - 1) as f64
    };

    let mut domain = Vec::new();
    let mut boundary = Vec::new();

    for i in 0..n {
        for j in 0..n {
            let x = point![coord(0, i), coord(1, j)];
            let on_first = if time_dependent {
                i == 0
            } else {
                i == 0 || i == n - 1
            };

            if on_first || j == 0 || j == n - 1 {
                boundary.push(x);
            } else {
                domain.push(x);
            }
        }
    }

    CollocationSet::new(domain, boundary)
}

/// Uniformly random interior points and uniformly random points on the
/// boundary (with respect to its length).
///
/// For `time_dependent`, the boundary excludes the final time edge as in
/// [`grid`].
pub fn random<R: Rng + ?Sized>(
    bounds: [[f64; 2]; 2],
    n_domain: usize,
    n_boundary: usize,
    time_dependent: bool,
    rng: &mut R,
) -> CollocationSet {
    let [[a0, b0], [a1, b1]] = bounds;
    let (w0, w1) = (b0 - a0, b1 - a1);

    let domain = (0..n_domain)
        .map(|_| point![a0 + w0 * rng.gen::<f64>(), a1 + w1 * rng.gen::<f64>()])
        .collect();

    // Edges as (start, direction) in the order x₀ = a0, x₀ = b0, x₁ = a1, x₁ = b1.
    let mut edges = vec![
        (point![a0, a1], [0.0, w1]),
        (point![b0, a1], [0.0, w1]),
        (point![a0, a1], [w0, 0.0]),
        (point![a0, b1], [w0, 0.0]),
    ];
    if time_dependent {
        edges.remove(1);
    }

    let lengths: Vec<f64> = edges.iter().map(|(_, d)| d[0].abs() + d[1].abs()).collect();
    let perimeter: f64 = lengths.iter().sum();

    let boundary = (0..n_boundary)
        .map(|_| {
            let mut s = perimeter * rng.gen::<f64>();
            let mut edge = edges.len() - 1;
            for (k, length) in lengths.iter().enumerate() {
                if s < *length {
                    edge = k;
                    break;
                }
                s -= length;
            }

            let (start, d) = edges[edge];
            let frac = (s / lengths[edge]).clamp(0.0, 1.0);
            point![start[0] + frac * d[0], start[1] + frac * d[1]]
        })
        .collect();

    CollocationSet::new(domain, boundary)
}

/// Maximum absolute difference between `values` and the exact solution at
/// `points`.
pub fn max_error<P: TestProblem + ?Sized>(
    problem: &P,
    points: &[Point],
    values: &DVector<f64>,
) -> f64 {
    points
        .iter()
        .zip(values.iter())
        .map(|(x, value)| (problem.solution(x) - value).abs())
        .fold(0.0, f64::max)
}
