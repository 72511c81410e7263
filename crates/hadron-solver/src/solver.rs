//! The [`Solver`] trait, its configuration, and shared helpers.

use std::error::Error;
use std::fmt;

use crate::euler::EulerSolver;
use crate::runge_kutta::RungeKuttaSolver;

/// Time-derivative of a full state vector.
///
/// `evaluate` must overwrite every element of `out`; solvers never clear
/// it beforehand. Implemented for any `FnMut(&[f64], &mut [f64])`.
pub trait DerivativeFn {
    /// Write `d(state)/dt` into `out`. Both slices have the solver's size.
    fn evaluate(&mut self, state: &[f64], out: &mut [f64]);
}

impl<F> DerivativeFn for F
where
    F: FnMut(&[f64], &mut [f64]),
{
    fn evaluate(&mut self, state: &[f64], out: &mut [f64]) {
        self(state, out)
    }
}

/// An adaptive explicit integrator over a fixed-size state vector.
///
/// # Contract
///
/// - [`initialize`](Solver::initialize) is called once with the state
///   length before the first step; it sizes internal scratch buffers.
/// - [`step`](Solver::step) advances `state` in place by roughly `dt`
///   and returns the step actually taken (never larger than `dt`).
/// - Variants share no mutable state; each owns its scratch space.
pub trait Solver: Send {
    /// Short name for logging.
    fn name(&self) -> &'static str;

    /// Allocate scratch space for a state vector of `size` elements.
    fn initialize(&mut self, size: usize);

    /// The size passed to the last [`initialize`](Solver::initialize).
    fn size(&self) -> usize;

    /// Advance `state` by one adaptively sized step of at most `dt`.
    ///
    /// Returns the accepted step.
    fn step(
        &mut self,
        state: &mut [f64],
        derivative: &mut dyn DerivativeFn,
        dt: f64,
        accuracy: f64,
    ) -> f64;

    /// Counters accumulated since [`initialize`](Solver::initialize).
    fn stats(&self) -> SolverStats;
}

impl<S: Solver + ?Sized> Solver for Box<S> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn initialize(&mut self, size: usize) {
        (**self).initialize(size)
    }

    fn size(&self) -> usize {
        (**self).size()
    }

    fn step(
        &mut self,
        state: &mut [f64],
        derivative: &mut dyn DerivativeFn,
        dt: f64,
        accuracy: f64,
    ) -> f64 {
        (**self).step(state, derivative, dt, accuracy)
    }

    fn stats(&self) -> SolverStats {
        (**self).stats()
    }
}

/// Which integrator an engine runs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SolverKind {
    /// [`EulerSolver`].
    #[default]
    Euler,
    /// [`RungeKuttaSolver`].
    RungeKutta,
}

impl SolverKind {
    /// Construct a boxed solver of this kind.
    pub fn build(self, config: SolverConfig) -> Box<dyn Solver> {
        match self {
            Self::Euler => Box::new(EulerSolver::new(config)),
            Self::RungeKutta => Box::new(RungeKuttaSolver::new(config)),
        }
    }
}

/// Step-size control settings shared by both solvers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SolverConfig {
    /// Step assumed to precede the first one; the Euler solver caps each
    /// candidate at twice the previous accepted step. Default: 0.001.
    pub initial_dt: f64,
    /// Optional cap on consecutive halvings within one step. When reached,
    /// the current candidate is accepted as-is. Default: `None` (halve
    /// until the accuracy test passes).
    pub max_halvings: Option<u32>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            initial_dt: 0.001,
            max_halvings: None,
        }
    }
}

impl SolverConfig {
    /// Check that `initial_dt` is finite and positive.
    pub fn validate(&self) -> Result<(), SolverConfigError> {
        if !self.initial_dt.is_finite() || self.initial_dt <= 0.0 {
            return Err(SolverConfigError::InvalidInitialDt {
                value: self.initial_dt,
            });
        }
        Ok(())
    }
}

/// Invalid [`SolverConfig`].
#[derive(Clone, Debug, PartialEq)]
pub enum SolverConfigError {
    /// `initial_dt` is NaN, infinite, zero, or negative.
    InvalidInitialDt {
        /// The rejected value.
        value: f64,
    },
}

impl fmt::Display for SolverConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidInitialDt { value } => {
                write!(f, "initial_dt must be finite and positive, got {value}")
            }
        }
    }
}

impl Error for SolverConfigError {}

/// Counters describing solver work.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SolverStats {
    /// Derivative evaluations performed.
    pub evaluations: u64,
    /// Candidate steps rejected and halved.
    pub halvings: u64,
    /// Steps accepted.
    pub accepted_steps: u64,
    /// Steps accepted because `max_halvings` ran out.
    pub halving_limit_hits: u64,
    /// Most recently accepted step.
    pub last_dt: f64,
}

/// Euclidean distance between two equally sized vectors.
pub(crate) fn distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum::<f64>()
        .sqrt()
}

/// Outcome of the shared halving search.
pub(crate) struct Halving {
    pub dt: f64,
    pub halvings: u64,
    pub limit_hit: bool,
}

/// Halve `dt` until `f(y + f0 * dt)` lies within `accuracy` of `f0`.
///
/// On return `probe` holds `y + f0 * dt` and `f_probe` its derivative
/// for the accepted `dt`.
#[allow(clippy::too_many_arguments)]
pub(crate) fn halve_until_consistent(
    y: &[f64],
    f0: &[f64],
    probe: &mut [f64],
    f_probe: &mut [f64],
    derivative: &mut dyn DerivativeFn,
    mut dt: f64,
    accuracy: f64,
    max_halvings: Option<u32>,
    evaluations: &mut u64,
) -> Halving {
    let mut halvings = 0u64;
    loop {
        for ((p, yi), fi) in probe.iter_mut().zip(y).zip(f0) {
            *p = yi + fi * dt;
        }
        derivative.evaluate(probe, f_probe);
        *evaluations += 1;

        if distance(f_probe, f0) < accuracy {
            return Halving {
                dt,
                halvings,
                limit_hit: false,
            };
        }
        if let Some(max) = max_halvings {
            if halvings >= u64::from(max) {
                return Halving {
                    dt,
                    halvings,
                    limit_hit: true,
                };
            }
        }
        dt /= 2.0;
        halvings += 1;
    }
}
