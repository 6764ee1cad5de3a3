use kercol::testing::{grid, max_error, SineElliptic, TestProblem};
use kercol::{Initial, Session};

// -Δu + u³ = f on the unit square with u = sin(πx₁) sin(πx₂).
fn main() -> Result<(), String> {
    let problem = SineElliptic::new(1.0, 3);
    let points = grid(problem.bounds(), 20, false);

    let mut session = Session::builder(&problem, points.clone())
        .with_initial(Initial::Random { seed: Some(0) })
        .build()
        .map_err(|error| format!("{error}"))?;

    let report = session.run().map_err(|error| format!("{error}"))?;

    for (iter, loss) in report.losses().iter().enumerate() {
        println!("iter = {}\tloss = {}", iter, loss);
    }

    let error = max_error(&problem, points.domain(), &session.field_values());
    println!("max error at collocation points = {}", error);

    let test = grid(problem.bounds(), 37, false);
    let extended = session.extend(test.domain());
    let test_error = max_error(&problem, test.domain(), &extended);
    println!("max error at test points = {}", test_error);

    if report.status().is_finite() && test_error < 1e-2 {
        Ok(())
    } else {
        Err("did not converge".to_string())
    }
}
