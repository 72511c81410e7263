//! Binding of a solver to its state vector and derivative function.

use crate::solver::{DerivativeFn, Solver, SolverStats};

/// A solver bound to an owned state vector and derivative function.
///
/// This is the `initialize(size, state, derivative)` / `step(dt, accuracy)`
/// surface: the integrator owns everything the solver touches, so there
/// is no aliasing between the state and whatever the derivative closes
/// over.
pub struct Integrator<S, F> {
    solver: S,
    state: Vec<f64>,
    derivative: F,
}

impl<S, F> Integrator<S, F>
where
    S: Solver,
    F: DerivativeFn,
{
    /// Bind `solver` to `state` and `derivative`, sizing its scratch space.
    pub fn initialize(mut solver: S, state: Vec<f64>, derivative: F) -> Self {
        solver.initialize(state.len());
        Self {
            solver,
            state,
            derivative,
        }
    }

    /// Advance the bound state by one adaptive step of at most `dt`.
    ///
    /// Returns the step actually taken.
    pub fn step(&mut self, dt: f64, accuracy: f64) -> f64 {
        self.solver
            .step(&mut self.state, &mut self.derivative, dt, accuracy)
    }

    /// Current state vector.
    pub fn state(&self) -> &[f64] {
        &self.state
    }

    /// The bound derivative function.
    pub fn derivative(&self) -> &F {
        &self.derivative
    }

    /// Mutable access to the state vector and derivative together.
    pub fn parts_mut(&mut self) -> (&mut [f64], &mut F) {
        (&mut self.state, &mut self.derivative)
    }

    /// Solver counters.
    pub fn stats(&self) -> SolverStats {
        self.solver.stats()
    }

    /// Release the bound parts.
    pub fn into_parts(self) -> (S, Vec<f64>, F) {
        (self.solver, self.state, self.derivative)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EulerSolver, RungeKuttaSolver};

    #[test]
    fn initialize_sizes_solver() {
        let integ = Integrator::initialize(
            EulerSolver::default(),
            vec![1.0, 2.0, 3.0],
            |y: &[f64], out: &mut [f64]| out.copy_from_slice(y),
        );
        let (solver, state, _) = integ.into_parts();
        assert_eq!(solver.size(), 3);
        assert_eq!(state, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn boxed_solvers_are_interchangeable() {
        let zero = |_y: &[f64], out: &mut [f64]| out.fill(0.0);
        for solver in [
            Box::new(EulerSolver::default()) as Box<dyn Solver>,
            Box::new(RungeKuttaSolver::default()),
        ] {
            let mut integ = Integrator::initialize(solver, vec![4.0, -4.0], zero);
            let used = integ.step(0.001, 1.0);
            assert_eq!(used, 0.001);
            assert_eq!(integ.state(), &[4.0, -4.0]);
            assert_eq!(integ.stats().accepted_steps, 1);
        }
    }
}
