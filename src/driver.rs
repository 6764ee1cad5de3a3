//! High-level API for solving a boundary value problem.
//!
//! The [`Session`] encapsulates the whole pipeline: it evaluates the problem
//! data at the collocation points, assembles and regularizes the Gram matrix,
//! factorizes it, and then runs the Gauss-Newton iteration on the collocation
//! loss. The simplest way of using it is with the defaults for the equation
//! family:
//!
//! ```rust
//! use kercol::nalgebra::point;
//! use kercol::{CollocationSet, Session};
//! # use kercol::{Pde, Point, Problem};
//! #
//! # struct Poisson;
//! #
//! # impl Problem for Poisson {
//! #     fn pde(&self) -> Pde {
//! #         Pde::elliptic(0.0, 1)
//! #     }
//! #
//! #     fn rhs(&self, _: &Point) -> f64 {
//! #         1.0
//! #     }
//! #
//! #     fn boundary(&self, _: &Point) -> f64 {
//! #         0.0
//! #     }
//! # }
//!
//! let points = CollocationSet::new(
//!     vec![point![0.5, 0.5], point![0.25, 0.5], point![0.75, 0.5]],
//!     vec![point![0.0, 0.5], point![1.0, 0.5], point![0.5, 0.0], point![0.5, 1.0]],
//! );
//!
//! let mut session = Session::new(&Poisson, points).expect("valid setup");
//! ```
//!
//! If you need to specify additional settings, use the builder:
//!
//! ```rust
//! # use kercol::nalgebra::point;
//! # use kercol::{CollocationSet, Pde, Point, Problem};
//! use kercol::{Initial, Kernel, Nugget, NuggetPolicy, Session};
//! #
//! # struct Poisson;
//! #
//! # impl Problem for Poisson {
//! #     fn pde(&self) -> Pde {
//! #         Pde::elliptic(0.0, 1)
//! #     }
//! #
//! #     fn rhs(&self, _: &Point) -> f64 {
//! #         1.0
//! #     }
//! #
//! #     fn boundary(&self, _: &Point) -> f64 {
//! #         0.0
//! #     }
//! # }
//! #
//! # let points = CollocationSet::new(
//! #     vec![point![0.5, 0.5], point![0.25, 0.5], point![0.75, 0.5]],
//! #     vec![point![0.0, 0.5], point![1.0, 0.5], point![0.5, 0.0], point![0.5, 1.0]],
//! # );
//!
//! let mut session = Session::builder(&Poisson, points)
//!     .with_kernel(Kernel::gaussian(0.3))
//!     .with_nugget(Nugget::new(1e-6, NuggetPolicy::Adaptive))
//!     .with_initial(Initial::Random { seed: Some(42) })
//!     .build()
//!     .expect("valid setup");
//!
//! let report = session.run().expect("no solver error");
//! let u = session.extend(&[point![0.4, 0.6]]);
//! ```
//!
//! If you need more control over the iteration process, you can do the
//! iterations manually using [`Session::next`].

use log::debug;
use nalgebra::DVector;
use rand::{rngs::StdRng, Rng, SeedableRng};
use rand_distr::StandardNormal;

use crate::{
    algo::{GaussNewton, GaussNewtonOptions, Report, Status},
    core::{Collocation, CollocationSet, Error, Layout, Objective, Optimizer, Point, Problem},
    factor::CholeskyFactor,
    gram::assemble,
    kernel::{Kernel, Operator},
    loss::{check_formulation, CollocationLoss, Formulation},
    nugget::Nugget,
    predict::Posterior,
};

/// Specification of the initial value of the unknowns.
#[derive(Debug, Clone, PartialEq)]
pub enum Initial {
    /// Independent draws from the standard normal distribution. Without a
    /// seed, the generator is seeded from the operating system.
    Random {
        /// Seed of the random number generator.
        seed: Option<u64>,
    },
    /// Given values. The length must match the number of unknowns.
    Supplied(Vec<f64>),
}

impl Default for Initial {
    fn default() -> Self {
        Initial::Random { seed: None }
    }
}

/// Builder for the [`Session`].
pub struct SessionBuilder<'a, P: Problem + ?Sized> {
    problem: &'a P,
    points: CollocationSet,
    kernel: Kernel,
    nugget: Nugget,
    formulation: Formulation,
    options: GaussNewtonOptions,
    initial: Initial,
}

impl<'a, P: Problem + ?Sized> SessionBuilder<'a, P> {
    fn new(problem: &'a P, points: CollocationSet) -> Self {
        let pde = problem.pde();

        Self {
            problem,
            points,
            kernel: pde.default_kernel(),
            nugget: pde.default_nugget(),
            formulation: Formulation::Exact,
            options: GaussNewtonOptions::default(),
            initial: Initial::default(),
        }
    }

    /// Sets the kernel. Default: [`Pde::default_kernel`](crate::Pde::default_kernel).
    pub fn with_kernel(mut self, kernel: Kernel) -> Self {
        self.kernel = kernel;
        self
    }

    /// Sets the nugget. Default: [`Pde::default_nugget`](crate::Pde::default_nugget).
    pub fn with_nugget(mut self, nugget: Nugget) -> Self {
        self.nugget = nugget;
        self
    }

    /// Sets the formulation. Default: [`Formulation::Exact`].
    pub fn with_formulation(mut self, formulation: Formulation) -> Self {
        self.formulation = formulation;
        self
    }

    /// Sets the options of the Gauss-Newton method.
    pub fn with_options(mut self, options: GaussNewtonOptions) -> Self {
        self.options = options;
        self
    }

    /// Sets the initial value of the unknowns. Default: random.
    pub fn with_initial(mut self, initial: Initial) -> Self {
        self.initial = initial;
        self
    }

    /// Builds the [`Session`].
    ///
    /// The Gram matrix is assembled, regularized and factorized here, so any
    /// failure of the factorization is reported before the first iteration.
    pub fn build(self) -> Result<Session, Error> {
        let Self {
            problem,
            points,
            kernel,
            nugget,
            formulation,
            options,
            initial,
        } = self;

        let pde = problem.pde();

        kernel.validate()?;
        if !nugget.is_valid() {
            return Err(Error::InvalidNugget(nugget.value()));
        }
        if points.n_domain() == 0 {
            return Err(Error::EmptyDomain);
        }
        check_formulation(&pde, formulation)?;

        let layout = Layout::new(&pde, points.n_domain(), points.n_boundary());
        let mut gram = assemble(&kernel, &layout, &points);

        let ratios = nugget.ratios(&gram, &layout);
        debug!("nugget ratios per block: {:?}", ratios);
        nugget.apply(&mut gram, &layout);

        let factor = CholeskyFactor::new(&gram)?;

        let data = Collocation::new(problem, points);
        let loss = CollocationLoss::new(pde, formulation, data, factor)?;

        let dim = loss.dim();
        let x0 = match initial {
            Initial::Random { seed } => {
                let mut rng = match seed {
                    Some(seed) => StdRng::seed_from_u64(seed),
                    None => StdRng::from_entropy(),
                };
                DVector::from_iterator(dim, (0..dim).map(|_| rng.sample(StandardNormal)))
            }
            Initial::Supplied(x0) => {
                if x0.len() != dim {
                    return Err(Error::InvalidDimensionality {
                        expected: dim,
                        actual: x0.len(),
                    });
                }
                DVector::from_vec(x0)
            }
        };

        debug!(
            "{} session with {} interior and {} boundary points, {} unknowns",
            pde.name(),
            layout.n_domain(),
            layout.n_boundary(),
            dim
        );

        Ok(Session {
            kernel,
            loss,
            ratios,
            algo: GaussNewton::with_options(options),
            x: x0.clone(),
            x0,
            history: Vec::new(),
        })
    }
}

/// Solve session of a boundary value problem.
///
/// For default settings, use [`Session::new`]. For more flexibility, use
/// [`Session::builder`]. For the usage of the session, see [module](self)
/// documentation.
pub struct Session {
    kernel: Kernel,
    loss: CollocationLoss,
    ratios: Vec<f64>,
    algo: GaussNewton,
    x: DVector<f64>,
    x0: DVector<f64>,
    history: Vec<f64>,
}

impl Session {
    /// Returns the builder for specifying additional settings.
    pub fn builder<P: Problem + ?Sized>(problem: &P, points: CollocationSet) -> SessionBuilder<'_, P> {
        SessionBuilder::new(problem, points)
    }

    /// Initializes the session with the default settings.
    pub fn new<P: Problem + ?Sized>(problem: &P, points: CollocationSet) -> Result<Self, Error> {
        Session::builder(problem, points).build()
    }

    /// Does one Gauss-Newton iteration, returning the loss in case of no
    /// error.
    ///
    /// The initial loss is recorded before the first iteration.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Result<f64, Error> {
        if self.history.is_empty() {
            let initial = self.algo.start(&self.loss, &self.x)?;
            self.history.push(initial);
        }

        let loss = self.algo.next(&self.loss, &mut self.x)?;
        self.history.push(loss);

        Ok(loss)
    }

    /// Runs the whole iteration budget from the initial value.
    ///
    /// The state of previous iterations, if any, is discarded.
    pub fn run(&mut self) -> Result<Report, Error> {
        self.algo.reset();
        self.x.copy_from(&self.x0);
        self.history.clear();

        let report = self.algo.run(&self.loss, &mut self.x)?;
        self.history.extend_from_slice(report.losses());

        Ok(report)
    }

    /// Returns the name of the used method.
    pub fn name(&self) -> &str {
        <GaussNewton as Optimizer<CollocationLoss>>::NAME
    }

    /// Current values of the unknowns.
    pub fn x(&self) -> &[f64] {
        self.x.as_slice()
    }

    /// Initial values of the unknowns.
    pub fn initial(&self) -> &[f64] {
        self.x0.as_slice()
    }

    /// Losses recorded so far, starting with the initial one.
    pub fn loss_history(&self) -> &[f64] {
        &self.history
    }

    /// Health of the iteration process so far.
    pub fn status(&self) -> Status {
        self.algo.status()
    }

    /// Current values of the solution at interior points.
    pub fn field_values(&self) -> DVector<f64> {
        self.loss.field(&self.x)
    }

    /// Current measurement vector, i.e., all linear measurements of the
    /// solution in the order of the [layout](Session::layout).
    pub fn solution_vector(&self) -> DVector<f64> {
        self.loss.measurements(&self.x)
    }

    /// Posterior mean of the current solution.
    pub fn posterior(&self) -> Posterior {
        Posterior::new(
            self.kernel,
            self.loss.layout().clone(),
            self.loss.data().points().clone(),
            self.loss.factor(),
            &self.solution_vector(),
        )
    }

    /// Values of the current solution at given points.
    pub fn extend(&self, queries: &[Point]) -> DVector<f64> {
        self.posterior().evaluate(queries)
    }

    /// Values of `op` applied to the current solution at given points.
    pub fn extend_operator(&self, op: &Operator, queries: &[Point]) -> DVector<f64> {
        self.posterior().evaluate_operator(op, queries)
    }

    /// Scaling ratios of the nugget per block.
    pub fn ratios(&self) -> &[f64] {
        &self.ratios
    }

    /// Layout of the Gram matrix.
    pub fn layout(&self) -> &Layout {
        self.loss.layout()
    }

    /// Cholesky factor of the regularized Gram matrix.
    pub fn factor(&self) -> &CholeskyFactor {
        self.loss.factor()
    }

    /// The kernel.
    pub fn kernel(&self) -> &Kernel {
        &self.kernel
    }

    /// The minimized objective.
    pub fn objective(&self) -> &CollocationLoss {
        &self.loss
    }
}
