//! Core abstractions and types for kercol.
//!
//! *Users* are mainly interested in implementing the [`Problem`] trait and
//! providing [collocation points](CollocationSet).
//!
//! Algorithm *developers* are interested in the [`Objective`] and
//! [`Optimizer`] traits and in the [`Layout`] that ties the Gram matrix,
//! residual vectors and cross-covariances together.

mod base;
mod layout;
mod objective;
mod optimizer;
mod points;

pub use base::*;
pub use layout::*;
pub use objective::*;
pub use optimizer::*;
pub use points::*;
