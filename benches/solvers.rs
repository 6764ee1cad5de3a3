use criterion::{criterion_group, criterion_main, Criterion};
use kercol::{
    gram::assemble,
    testing::{grid, SineElliptic, TestProblem},
    Initial, Kernel, Layout, Pde, Session,
};

fn gram_assembly(c: &mut Criterion) {
    let kernel = Kernel::gaussian(0.2);

    for pde in [Pde::elliptic(1.0, 3), Pde::eikonal(0.1)] {
        let points = grid([[0.0, 1.0], [0.0, 1.0]], 20, false);
        let layout = Layout::new(&pde, points.n_domain(), points.n_boundary());

        c.bench_function(&format!("gram assembly {}", pde.name()), |b| {
            b.iter(|| assemble(&kernel, &layout, &points))
        });
    }
}

fn elliptic_solve(c: &mut Criterion) {
    let problem = SineElliptic::new(1.0, 3);
    let points = grid(problem.bounds(), 15, false);

    c.bench_function("Gauss-Newton nonlinear elliptic", |b| {
        b.iter(|| {
            let mut session = Session::builder(&problem, points.clone())
                .with_initial(Initial::Random { seed: Some(0) })
                .build()
                .expect("valid setup");
            let report = session.run().expect("no solver error");
            assert!(report.status().is_finite());
        })
    });
}

criterion_group!(benches, gram_assembly, elliptic_solve);
criterion_main!(benches);
