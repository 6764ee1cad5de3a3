use kercol::algo::GaussNewtonOptions;
use kercol::testing::{grid, max_error, BurgersDecay, TestProblem};
use kercol::{Initial, Kernel, Nugget, NuggetPolicy, Session};

// u_t + u u_x - 0.1 u_xx = f on [0, 1] × [-1, 1] with u = exp(-t) sin(πx).
fn main() -> Result<(), String> {
    let problem = BurgersDecay::new(1.0, 0.1);
    let points = grid(problem.bounds(), 20, true);
    let n = points.n_domain();

    let mut options = GaussNewtonOptions::default();
    options.set_max_iter(15);

    let mut session = Session::builder(&problem, points.clone())
        .with_kernel(Kernel::anisotropic_gaussian([0.3, 0.2]))
        .with_nugget(Nugget::new(1e-6, NuggetPolicy::Adaptive))
        .with_options(options)
        .with_initial(Initial::Supplied(vec![0.0; 2 * n]))
        .build()
        .map_err(|error| format!("{error}"))?;

    println!("nugget ratios = {:?}", session.ratios());

    let report = session.run().map_err(|error| format!("{error}"))?;

    for (iter, loss) in report.losses().iter().enumerate() {
        println!("iter = {}\tloss = {}", iter, loss);
    }

    let error = max_error(&problem, points.domain(), &session.field_values());
    println!("max error at collocation points = {}", error);

    if report.status().is_finite() && error < 1e-1 {
        Ok(())
    } else {
        Err("did not converge".to_string())
    }
}
