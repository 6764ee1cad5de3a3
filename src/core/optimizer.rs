use nalgebra::DVector;

use super::objective::Objective;

/// Common interface for iterative minimizers of an [`Objective`].
///
/// The essential method is [`next`](Optimizer::next) which takes the
/// variables *x* and performs one step. Thus it represents one iteration in
/// the process.
pub trait Optimizer<O: Objective> {
    /// Name of the optimizer.
    const NAME: &'static str;

    /// Error type of the iteration.
    type Error;

    /// Computes the next step in the optimization process.
    ///
    /// The value of `x` is the current values of variables. After the method
    /// returns, `x` holds the variable values of the performed step and the
    /// return value is the objective value at that step as computed by
    /// [`Objective::loss`].
    fn next(&mut self, o: &O, x: &mut DVector<f64>) -> Result<f64, Self::Error>;
}
