//! Classical fourth-order Runge–Kutta with an adaptive pre-pass.

use crate::solver::{halve_until_consistent, DerivativeFn, Solver, SolverConfig, SolverStats};

/// Classical RK4 preceded by the same halving search the Euler solver
/// uses to choose `dt`.
///
/// Unlike [`EulerSolver`](crate::EulerSolver) the candidate step is not
/// capped by the previous one; only the accuracy test shrinks it.
pub struct RungeKuttaSolver {
    config: SolverConfig,
    size: usize,
    k1: Vec<f64>,
    k2: Vec<f64>,
    k3: Vec<f64>,
    k4: Vec<f64>,
    tmp: Vec<f64>,
    stats: SolverStats,
}

impl RungeKuttaSolver {
    /// Create an uninitialised solver.
    pub fn new(config: SolverConfig) -> Self {
        Self {
            config,
            size: 0,
            k1: Vec::new(),
            k2: Vec::new(),
            k3: Vec::new(),
            k4: Vec::new(),
            tmp: Vec::new(),
            stats: SolverStats::default(),
        }
    }

    fn stage(tmp: &mut [f64], y: &[f64], k: &[f64], h: f64) {
        for ((t, yi), ki) in tmp.iter_mut().zip(y).zip(k) {
            *t = yi + ki * h;
        }
    }
}

impl Default for RungeKuttaSolver {
    fn default() -> Self {
        Self::new(SolverConfig::default())
    }
}

impl Solver for RungeKuttaSolver {
    fn name(&self) -> &'static str {
        "runge-kutta"
    }

    fn initialize(&mut self, size: usize) {
        self.size = size;
        self.k1 = vec![0.0; size];
        self.k2 = vec![0.0; size];
        self.k3 = vec![0.0; size];
        self.k4 = vec![0.0; size];
        self.tmp = vec![0.0; size];
        self.stats = SolverStats::default();
    }

    fn size(&self) -> usize {
        self.size
    }

    fn step(
        &mut self,
        state: &mut [f64],
        derivative: &mut dyn DerivativeFn,
        dt: f64,
        accuracy: f64,
    ) -> f64 {
        debug_assert_eq!(state.len(), self.size, "solver not initialised for this state");

        derivative.evaluate(state, &mut self.k1);
        self.stats.evaluations += 1;

        // k2/k3 double as probe scratch here; both are overwritten below.
        let h = halve_until_consistent(
            state,
            &self.k1,
            &mut self.k2,
            &mut self.k3,
            derivative,
            dt,
            accuracy,
            self.config.max_halvings,
            &mut self.stats.evaluations,
        );
        let dt = h.dt;

        Self::stage(&mut self.tmp, state, &self.k1, dt / 2.0);
        derivative.evaluate(&self.tmp, &mut self.k2);
        Self::stage(&mut self.tmp, state, &self.k2, dt / 2.0);
        derivative.evaluate(&self.tmp, &mut self.k3);
        Self::stage(&mut self.tmp, state, &self.k3, dt);
        derivative.evaluate(&self.tmp, &mut self.k4);
        self.stats.evaluations += 3;

        for (i, y) in state.iter_mut().enumerate() {
            *y += dt / 6.0 * (self.k1[i] + 2.0 * self.k2[i] + 2.0 * self.k3[i] + self.k4[i]);
        }

        self.stats.halvings += h.halvings;
        self.stats.accepted_steps += 1;
        if h.limit_hit {
            self.stats.halving_limit_hits += 1;
        }
        self.stats.last_dt = dt;
        dt
    }

    fn stats(&self) -> SolverStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decay(y: &[f64], out: &mut [f64]) {
        out[0] = -y[0];
    }

    #[test]
    fn request_is_not_capped_by_history() {
        let mut s = RungeKuttaSolver::default();
        s.initialize(1);
        let mut y = [1.0];
        assert_eq!(s.step(&mut y, &mut decay, 0.1, 1.0), 0.1);
    }

    #[test]
    fn single_step_matches_rk4_formula() {
        let mut s = RungeKuttaSolver::default();
        s.initialize(1);
        let mut y = [1.0];
        let h = s.step(&mut y, &mut decay, 0.1, 1.0);
        // For y' = -y one RK4 step multiplies y by 1 - h + h²/2 - h³/6 + h⁴/24.
        let factor = 1.0 - h + h * h / 2.0 - h.powi(3) / 6.0 + h.powi(4) / 24.0;
        assert!((y[0] - factor).abs() < 1e-15);
    }

    #[test]
    fn pre_pass_halves_until_consistent() {
        let mut s = RungeKuttaSolver::default();
        s.initialize(1);
        let mut y = [1.0];
        // Disagreement for y' = -y is y·dt; 0.4 -> 0.2 -> 0.1 passes 0.15.
        let h = s.step(&mut y, &mut decay, 0.4, 0.15);
        assert_eq!(h, 0.1);
        assert_eq!(s.stats().halvings, 2);
        // 1 + 3 probes + 3 stages
        assert_eq!(s.stats().evaluations, 7);
    }
}
