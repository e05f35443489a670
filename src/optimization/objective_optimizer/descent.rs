//! Fixed-step gradient descent as an argmin [`Solver`].
//!
//! Each iteration takes `θ ← θ − η·∇c(θ)` with a constant learning rate `η`
//! and no line search. The cost and gradient are evaluated once per
//! iteration at the new iterate, so the state always carries `c(θ)` and
//! `∇c(θ)` for the current `θ`.
//!
//! Termination is driven by the executor's `max_iters` and, when set, by
//! the gradient-norm and cost-change tolerances.
use argmin::core::{
    ArgminError, CostFunction, Error, Gradient, IterState, Problem, Solver, State,
    TerminationReason, TerminationStatus, KV,
};
use argmin_math::ArgminL2Norm;
use serde::{Deserialize, Serialize};

use crate::optimization::{
    errors::OptResult,
    objective_optimizer::{
        types::{Grad, Theta},
        validation::verify_learning_rate,
    },
};

type DescentState = IterState<Theta, Grad, (), (), (), f64>;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FixedStepDescent {
    learning_rate: f64,
    tol_grad: Option<f64>,
    tol_cost: Option<f64>,
}

impl FixedStepDescent {
    /// # Errors
    /// [`OptError::InvalidLearningRate`](crate::optimization::errors::OptError::InvalidLearningRate)
    /// for a non-finite or non-positive rate.
    pub fn new(learning_rate: f64) -> OptResult<Self> {
        verify_learning_rate(learning_rate)?;
        Ok(Self { learning_rate, tol_grad: None, tol_cost: None })
    }

    pub fn with_tolerance_grad(mut self, tol: f64) -> Self {
        self.tol_grad = Some(tol);
        self
    }

    pub fn with_tolerance_cost(mut self, tol: f64) -> Self {
        self.tol_cost = Some(tol);
        self
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }
}

impl<O> Solver<O, DescentState> for FixedStepDescent
where
    O: CostFunction<Param = Theta, Output = f64> + Gradient<Param = Theta, Gradient = Grad>,
{
    const NAME: &'static str = "Fixed-step gradient descent";

    fn init(
        &mut self, problem: &mut Problem<O>, mut state: DescentState,
    ) -> Result<(DescentState, Option<KV>), Error> {
        let theta = state.take_param().ok_or_else(missing_param)?;
        let cost = problem.cost(&theta)?;
        let grad = problem.gradient(&theta)?;
        Ok((state.param(theta).cost(cost).gradient(grad), None))
    }

    fn next_iter(
        &mut self, problem: &mut Problem<O>, mut state: DescentState,
    ) -> Result<(DescentState, Option<KV>), Error> {
        let theta = state.take_param().ok_or_else(missing_param)?;
        let grad = match state.take_gradient() {
            Some(g) => g,
            None => problem.gradient(&theta)?,
        };
        let mut next = theta;
        next.scaled_add(-self.learning_rate, &grad);
        let cost = problem.cost(&next)?;
        let grad = problem.gradient(&next)?;
        Ok((state.param(next).cost(cost).gradient(grad), None))
    }

    fn terminate(&mut self, state: &DescentState) -> TerminationStatus {
        if let (Some(tol), Some(g)) = (self.tol_grad, state.get_gradient()) {
            if g.l2_norm() < tol {
                return TerminationStatus::Terminated(TerminationReason::SolverConverged);
            }
        }
        if let Some(tol) = self.tol_cost {
            if (state.get_prev_cost() - state.get_cost()).abs() < tol {
                return TerminationStatus::Terminated(TerminationReason::SolverConverged);
            }
        }
        TerminationStatus::NotTerminated
    }
}

fn missing_param() -> Error {
    ArgminError::NotInitialized {
        text: "Fixed-step descent requires an initial parameter vector.".to_string(),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::errors::OptError;
    use argmin::core::Executor;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Exact iterates of fixed-step descent on a quadratic.
    // - Gradient-norm termination.
    // - Learning-rate validation.
    // - The solver name argmin reports in results and observers.
    // -------------------------------------------------------------------------

    struct Bowl;

    impl CostFunction for Bowl {
        type Param = Theta;
        type Output = f64;

        fn cost(&self, theta: &Theta) -> Result<f64, Error> {
            Ok(theta.dot(theta))
        }
    }

    impl Gradient for Bowl {
        type Param = Theta;
        type Gradient = Grad;

        fn gradient(&self, theta: &Theta) -> Result<Grad, Error> {
            Ok(theta * 2.0)
        }
    }

    #[test]
    // Purpose
    // -------
    // Each iteration is exactly `θ − η·2θ`.
    //
    // Given
    // -----
    // - `c(θ) = θ·θ`, `θ0 = [1, -2]`, `η = 0.25`, three iterations.
    //
    // Expect
    // ------
    // - `θ3 = θ0 · 0.5³ = [0.125, -0.25]` and cost `0.078125`.
    fn fixed_step_iterates_are_exact() {
        let solver = FixedStepDescent::new(0.25).unwrap();

        let result = Executor::new(Bowl, solver)
            .configure(|state| state.param(array![1.0, -2.0]).max_iters(3))
            .run()
            .unwrap();
        let state = result.state();

        assert_eq!(state.get_iter(), 3);
        assert_eq!(state.get_best_param().unwrap(), &array![0.125, -0.25]);
        assert_eq!(state.get_best_cost(), 0.078125);
    }

    #[test]
    // Purpose
    // -------
    // A gradient tolerance stops the run before `max_iters`.
    //
    // Given
    // -----
    // - `η = 0.5`, which lands on the minimum after one step.
    //
    // Expect
    // ------
    // - Termination by `SolverConverged` after one iteration.
    fn gradient_tolerance_stops_early() {
        let solver = FixedStepDescent::new(0.5).unwrap().with_tolerance_grad(1e-8);

        let result = Executor::new(Bowl, solver)
            .configure(|state| state.param(array![3.0, 4.0]).max_iters(50))
            .run()
            .unwrap();
        let state = result.state();

        assert_eq!(state.get_iter(), 1);
        assert_eq!(
            state.get_termination_status(),
            &TerminationStatus::Terminated(TerminationReason::SolverConverged)
        );
    }

    #[test]
    // Purpose
    // -------
    // The solver identifies itself through argmin's associated `NAME`.
    fn solver_name_is_reported_to_argmin() {
        assert_eq!(
            <FixedStepDescent as Solver<Bowl, DescentState>>::NAME,
            "Fixed-step gradient descent"
        );
    }

    #[test]
    fn fixed_step_rejects_invalid_rate() {
        assert!(matches!(FixedStepDescent::new(0.0), Err(OptError::InvalidLearningRate { .. })));
    }
}
