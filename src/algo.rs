//! The collection of implemented algorithms.

pub mod gauss_newton;

pub use gauss_newton::{
    GaussNewton, GaussNewtonError, GaussNewtonOptions, NanPolicy, Report, Status,
};
