//! Assembly of Gram and cross-covariance matrices.
//!
//! Entry `(i, j)` of the Gram matrix is `L_i,x L_j,y k(x_i, x_j)` where
//! `(L_i, x_i)` is the i-th [node](Layout::nodes) of the layout. The matrix
//! is symmetric positive semi-definite. Only the upper triangle is evaluated
//! and then mirrored, so the result is exactly symmetric.
//!
//! Kernel evaluations dominate the cost and are independent for every pair
//! of points, so the columns of the column-major buffer are filled in
//! parallel.

use log::debug;
use nalgebra::DMatrix;
use rayon::prelude::*;

use crate::{
    core::{CollocationSet, Layout, Point},
    kernel::{Kernel, Operator},
};

/// Assembles the Gram matrix of `layout` at `points`.
pub fn assemble(kernel: &Kernel, layout: &Layout, points: &CollocationSet) -> DMatrix<f64> {
    let nodes = layout.nodes(points);
    let n = nodes.len();

    let mut data = vec![0.0; n * n];
    data.par_chunks_mut(n.max(1))
        .enumerate()
        .for_each(|(j, col)| {
            let (lj, xj) = &nodes[j];
            for (i, (li, xi)) in nodes.iter().enumerate().take(j + 1) {
                col[i] = kernel.apply(li, lj, xi, xj);
            }
        });

    let mut gram = DMatrix::from_vec(n, n, data);
    gram.fill_lower_triangle_with_upper_triangle();

    debug!(
        "assembled Gram matrix of size {} ({} blocks)",
        n,
        layout.blocks().len()
    );

    gram
}

/// Assembles the cross-covariance between measurements `op` at `queries` and
/// the measurements of `layout` at `points`.
///
/// The result has one row per query point and one column per node of the
/// layout.
pub fn cross_covariance(
    kernel: &Kernel,
    op: &Operator,
    queries: &[Point],
    layout: &Layout,
    points: &CollocationSet,
) -> DMatrix<f64> {
    let nodes = layout.nodes(points);
    let (m, n) = (queries.len(), nodes.len());

    let mut data = vec![0.0; m * n];
    if m > 0 {
        data.par_chunks_mut(m).enumerate().for_each(|(j, col)| {
            let (lj, xj) = &nodes[j];
            for (value, q) in col.iter_mut().zip(queries) {
                *value = kernel.apply(op, lj, q, xj);
            }
        });
    }

    DMatrix::from_vec(m, n, data)
}

/// Trace of the diagonal block of `gram` belonging to block `b` of `layout`.
pub fn block_trace(gram: &DMatrix<f64>, layout: &Layout, b: usize) -> f64 {
    layout.range(b).map(|i| gram[(i, i)]).sum()
}
