//! Trapezoid-corrected adaptive Euler integrator.

use crate::solver::{halve_until_consistent, DerivativeFn, Solver, SolverConfig, SolverStats};

/// Adaptive explicit Euler with a trapezoidal correction.
///
/// Each step:
///
/// 1. Caps the candidate at twice the previous accepted step.
/// 2. Evaluates `f0 = f(y)`, probes `y1 = y + f0·dt`, evaluates
///    `f1 = f(y1)`.
/// 3. If `|f1 − f0| < accuracy` accepts; otherwise halves `dt` and
///    probes again.
/// 4. Advances `y += (f0 + f1)/2 · dt`.
///
/// The derivative disagreement is a stiffness proxy, not a truncation
/// error estimate.
pub struct EulerSolver {
    config: SolverConfig,
    size: usize,
    fy: Vec<f64>,
    y1: Vec<f64>,
    fy1: Vec<f64>,
    last_dt: f64,
    stats: SolverStats,
}

impl EulerSolver {
    /// Create an uninitialised solver.
    pub fn new(config: SolverConfig) -> Self {
        Self {
            config,
            size: 0,
            fy: Vec::new(),
            y1: Vec::new(),
            fy1: Vec::new(),
            last_dt: config.initial_dt,
            stats: SolverStats::default(),
        }
    }

    /// The step accepted most recently (or `initial_dt` before any step).
    pub fn last_dt(&self) -> f64 {
        self.last_dt
    }
}

impl Default for EulerSolver {
    fn default() -> Self {
        Self::new(SolverConfig::default())
    }
}

impl Solver for EulerSolver {
    fn name(&self) -> &'static str {
        "euler"
    }

    fn initialize(&mut self, size: usize) {
        self.size = size;
        self.fy = vec![0.0; size];
        self.y1 = vec![0.0; size];
        self.fy1 = vec![0.0; size];
        self.last_dt = self.config.initial_dt;
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

        let dt = if dt > self.last_dt * 2.0 {
            self.last_dt * 2.0
        } else {
            dt
        };

        derivative.evaluate(state, &mut self.fy);
        self.stats.evaluations += 1;

        let h = halve_until_consistent(
            state,
            &self.fy,
            &mut self.y1,
            &mut self.fy1,
            derivative,
            dt,
            accuracy,
            self.config.max_halvings,
            &mut self.stats.evaluations,
        );

        // A zero step (paused time scale) must not pin the cap at zero.
        if h.dt > 0.0 {
            self.last_dt = h.dt;
        }
        for ((y, f0), f1) in state.iter_mut().zip(&self.fy).zip(&self.fy1) {
            *y += (f0 + f1) / 2.0 * h.dt;
        }

        self.stats.halvings += h.halvings;
        self.stats.accepted_steps += 1;
        if h.limit_hit {
            self.stats.halving_limit_hits += 1;
        }
        self.stats.last_dt = h.dt;
        h.dt
    }

    fn stats(&self) -> SolverStats {
        self.stats
    }
}
