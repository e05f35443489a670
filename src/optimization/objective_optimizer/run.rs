//! Execution helper that runs an `argmin` solver on an objective and returns
//! a crate-friendly [`OptimOutcome`].
use crate::optimization::{
    errors::OptResult,
    objective_optimizer::{
        adapter::ArgMinAdapter,
        traits::{Objective, OptimOutcome, OptimizerOptions},
        types::{Grad, Theta},
    },
};
use argmin::core::{CostFunction, Executor, Gradient, IterState, Solver, State};
use argmin_math::ArgminL2Norm;
use tracing::debug;

/// Run an `argmin` solver on an objective problem.
///
/// Shared by every solver choice. It wires up the adapter, the solver, the
/// initial parameter `theta0`, the optional slog observer (feature
/// `obs_slog`, when `opts.verbose`), and `max_iters`, then converts the final
/// state into an [`OptimOutcome`] from the best parameter and best cost.
/// Verbose runs also emit one `debug` event with the starting cost and
/// gradient norm.
///
/// # Errors
/// - Propagates any `argmin` runtime error (solver errors, line-search
///   failures, objective errors) through `From<argmin::core::Error>`.
/// - Propagates validation errors raised while building the outcome.
pub fn run_solver<'a, F, S>(
    theta0: Theta, opts: &OptimizerOptions, problem: ArgMinAdapter<'a, F>, solver: S,
) -> OptResult<OptimOutcome>
where
    F: Objective,
    S: Solver<ArgMinAdapter<'a, F>, IterState<Theta, Grad, (), (), (), f64>> + Send + 'static,
{
    if opts.verbose {
        log_initial_state(&theta0, &problem)?;
    }
    let mut optimizer = Executor::new(problem, solver);
    optimizer = optimizer.configure(|state| state.param(theta0));
    #[cfg(feature = "obs_slog")]
    if opts.verbose {
        let observer = argmin_observer_slog::SlogLogger::term_noblock();
        optimizer = optimizer.add_observer(observer, argmin::core::observers::ObserverMode::Always);
    }
    if let Some(max_iter) = opts.tols.max_iter {
        optimizer = optimizer.configure(|state| state.max_iters(max_iter as u64));
    }

    let mut result = optimizer.run()?.state().clone();
    let iterations = result.get_iter();
    let function_counts = result.get_func_counts().clone();
    let termination = result.get_termination_status().clone();
    let grad = result.take_gradient();
    OptimOutcome::new(
        result.take_best_param(),
        result.get_best_cost(),
        termination,
        iterations,
        function_counts,
        grad,
    )
}

fn log_initial_state<F>(theta0: &Theta, problem: &ArgMinAdapter<'_, F>) -> OptResult<()>
where
    F: Objective,
{
    let cost = problem.cost(theta0)?;
    let grad_norm = problem.gradient(theta0).ok().map(|g| g.l2_norm());
    debug!(dim = theta0.len(), cost, grad_norm = ?grad_norm, "optimizer initial state");
    Ok(())
}
