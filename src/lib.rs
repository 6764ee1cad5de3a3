#![allow(clippy::many_single_char_names)]
#![allow(clippy::needless_range_loop)]
#![warn(missing_docs)]

//! # Kercol
//!
//! Gaussian-process (kernel) collocation solvers for nonlinear partial
//! differential equations, written entirely in Rust.
//!
//! The unknown solution is modelled as a function in the reproducing kernel
//! Hilbert space of a Gaussian kernel. The equation is imposed at a finite set
//! of collocation points, which turns it into a nonlinear least-squares
//! problem over the values of the solution (and some of its derivatives) at
//! those points. The problem is solved by the Gauss-Newton method with an
//! exact, closed-form Jacobian, and the solution is then extended to
//! arbitrary points by the posterior mean of the Gaussian process.
//!
//! ## Equations
//!
//! Three families of equations on two-dimensional rectangular domains are
//! supported (see [`Pde`]):
//!
//! * Nonlinear elliptic: `-Δu + α uᵐ = f` with Dirichlet boundary condition.
//! * Viscous Burgers': `u_t + α u u_x - ν u_xx = f` in (t, x) coordinates.
//! * Regularized Eikonal: `|∇u|² = f² + ε Δu` with Dirichlet boundary
//!   condition.
//!
//! ## Problem
//!
//! The problem is any type that implements the [`Problem`] trait.
//!
//! ```rust
//! use kercol::{Pde, Point, Problem};
//!
//! // -Δu + u³ = f on the unit square, u = 0 on the boundary.
//! struct Cubic;
//!
//! impl Problem for Cubic {
//!     fn pde(&self) -> Pde {
//!         Pde::elliptic(1.0, 3)
//!     }
//!
//!     fn rhs(&self, x: &Point) -> f64 {
//!         x[0] * x[1]
//!     }
//!
//!     fn boundary(&self, _: &Point) -> f64 {
//!         0.0
//!     }
//! }
//! ```
//!
//! ## Solving
//!
//! When you have your problem and collocation points available, use the
//! [`Session`] to run the solver and extend the solution.
//!
//! ```rust
//! use kercol::nalgebra::point;
//! use kercol::{CollocationSet, Initial, Session};
//! # use kercol::{Pde, Point, Problem};
//! #
//! # struct Cubic;
//! #
//! # impl Problem for Cubic {
//! #     fn pde(&self) -> Pde {
//! #         Pde::elliptic(1.0, 3)
//! #     }
//! #
//! #     fn rhs(&self, x: &Point) -> f64 {
//! #         x[0] * x[1]
//! #     }
//! #
//! #     fn boundary(&self, _: &Point) -> f64 {
//! #         0.0
//! #     }
//! # }
//!
//! let n = 8;
//! let h = 1.0 / (n - 1) as f64;
//! let mut domain = Vec::new();
//! let mut boundary = Vec::new();
//! for i in 0..n {
//!     for j in 0..n {
//!         let x = point![i as f64 * h, j as f64 * h];
//!         if i == 0 || j == 0 || i == n - 1 || j == n - 1 {
//!             boundary.push(x);
//!         } else {
//!             domain.push(x);
//!         }
//!     }
//! }
//!
//! let mut session = Session::builder(&Cubic, CollocationSet::new(domain, boundary))
//!     .with_initial(Initial::Random { seed: Some(0) })
//!     .build()
//!     .expect("factorization failed");
//!
//! let report = session.run().expect("solver encountered an error");
//!
//! for (iter, loss) in report.losses().iter().enumerate() {
//!     println!("iter = {}\tloss = {}", iter, loss);
//! }
//!
//! let u = session.extend(&[point![0.5, 0.5]]);
//! println!("u(0.5, 0.5) = {}", u[0]);
//! ```
//!
//! ## Pipeline
//!
//! The session is a thin layer over the components, which can be used
//! separately:
//!
//! * [`kernel`] -- kernels and linear differential operators applied to them.
//! * [`gram`] -- assembly of Gram and cross-covariance matrices.
//! * [`nugget`] -- regularization of the Gram matrix.
//! * [`factor`] -- Cholesky factorization and whitening.
//! * [`loss`] -- the collocation loss with its closed-form linearization.
//! * [`algo`] -- the Gauss-Newton method.
//! * [`predict`] -- extension of the solution to arbitrary points.
//!
//! ## License
//!
//! Licensed under MIT.

pub mod algo;
mod core;
pub mod driver;
pub mod factor;
pub mod gram;
pub mod kernel;
pub mod loss;
pub mod nugget;
pub mod predict;

pub use core::*;
pub use driver::{Initial, Session, SessionBuilder};
pub use kernel::{Axis, Kernel, Operator};
pub use loss::Formulation;
pub use nugget::{Nugget, NuggetPolicy};

#[cfg(feature = "testing")]
pub mod testing;

#[cfg(not(feature = "testing"))]
pub(crate) mod testing;

pub use nalgebra;
