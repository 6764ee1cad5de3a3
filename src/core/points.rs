//! Collocation points and the problem data cached at them.

use nalgebra::{DVector, Point2};

use super::base::Problem;

/// Point in the two-dimensional domain, (x1, x2) or (t, x).
pub type Point = Point2<f64>;

/// Interior and boundary collocation points.
///
/// The order of points is significant. All matrices and vectors built from
/// the set are indexed by the position of the points, with interior points
/// always preceding boundary points.
#[derive(Debug, Clone, PartialEq)]
pub struct CollocationSet {
    domain: Vec<Point>,
    boundary: Vec<Point>,
}

impl CollocationSet {
    /// Creates the set from interior and boundary points.
    pub fn new(domain: Vec<Point>, boundary: Vec<Point>) -> Self {
        Self { domain, boundary }
    }

    /// Interior points.
    pub fn domain(&self) -> &[Point] {
        &self.domain
    }

    /// Boundary points.
    pub fn boundary(&self) -> &[Point] {
        &self.boundary
    }

    /// Number of interior points.
    pub fn n_domain(&self) -> usize {
        self.domain.len()
    }

    /// Number of boundary points.
    pub fn n_boundary(&self) -> usize {
        self.boundary.len()
    }

    /// Interior points followed by boundary points.
    pub fn all(&self) -> impl Iterator<Item = &Point> + '_ {
        self.domain.iter().chain(self.boundary.iter())
    }
}

/// Collocation points together with the right-hand side and boundary values
/// evaluated at them.
///
/// The values are computed once on construction and never change.
#[derive(Debug, Clone)]
pub struct Collocation {
    points: CollocationSet,
    rhs: DVector<f64>,
    bdy: DVector<f64>,
}

impl Collocation {
    /// Evaluates the problem data at given points.
    pub fn new<P: Problem + ?Sized>(problem: &P, points: CollocationSet) -> Self {
        let rhs = DVector::from_iterator(
            points.n_domain(),
            points.domain().iter().map(|x| problem.rhs(x)),
        );
        let bdy = DVector::from_iterator(
            points.n_boundary(),
            points.boundary().iter().map(|x| problem.boundary(x)),
        );

        Self { points, rhs, bdy }
    }

    /// The collocation points.
    pub fn points(&self) -> &CollocationSet {
        &self.points
    }

    /// Right-hand side at interior points.
    pub fn rhs(&self) -> &DVector<f64> {
        &self.rhs
    }

    /// Boundary values at boundary points.
    pub fn bdy(&self) -> &DVector<f64> {
        &self.bdy
    }

    /// Number of interior points.
    pub fn n_domain(&self) -> usize {
        self.points.n_domain()
    }

    /// Number of boundary points.
    pub fn n_boundary(&self) -> usize {
        self.points.n_boundary()
    }
}
