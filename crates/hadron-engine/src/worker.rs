//! Background integration loop.
//!
//! The worker thread owns the working buffer, the solver, and the live
//! parameters exclusively. It touches shared state only through the
//! barrier lock (once per flush interval) and two atomics.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use hadron_core::{InputParameters, Link, OutputParameters, ParticleInfo, StateLayout};
use hadron_solver::{DerivativeFn, Integrator, Solver};

use crate::barrier::{lock, Barrier};
use crate::force::{ForceContext, ForceModel};
use crate::metrics::WorkerMetrics;

/// State shared between an [`Engine`](crate::Engine) and its worker.
pub(crate) struct Shared<const D: usize> {
    pub barrier: Mutex<Barrier<D>>,
    pub stop: AtomicBool,
    pub step_count: AtomicU64,
}

impl<const D: usize> Shared<D> {
    pub fn new(barrier: Barrier<D>) -> Self {
        Self {
            barrier: Mutex::new(barrier),
            stop: AtomicBool::new(false),
            step_count: AtomicU64::new(0),
        }
    }
}

// ── EngineDerivative ─────────────────────────────────────────────

/// The worker's derivative: a force model evaluated against the live
/// parameters, with fixed particles masked to a zero derivative so the
/// solver never moves them.
pub(crate) struct EngineDerivative<const D: usize> {
    pub model: Box<dyn ForceModel<D>>,
    pub params: InputParameters,
    pub infos: Vec<ParticleInfo>,
    pub links: Vec<Link>,
}

impl<const D: usize> DerivativeFn for EngineDerivative<D> {
    fn evaluate(&mut self, state: &[f64], out: &mut [f64]) {
        let ctx = ForceContext {
            params: &self.params,
            infos: &self.infos,
            links: &self.links,
        };
        self.model.calculate(&ctx, state, out);
        for (i, info) in self.infos.iter().enumerate() {
            if info.fixed {
                StateLayout::<D>::record_mut(out, i).fill(0.0);
            }
        }
    }
}

// ── Worker ───────────────────────────────────────────────────────

/// Worker-thread state. Consumed by [`run`](Worker::run).
pub(crate) struct Worker<const D: usize> {
    shared: Arc<Shared<D>>,
    integrator: Integrator<Box<dyn Solver>, EngineDerivative<D>>,
    output: OutputParameters,
    flush_interval: Duration,
    flushes: u64,
}

impl<const D: usize> Worker<D> {
    pub fn new(
        shared: Arc<Shared<D>>,
        solver: Box<dyn Solver>,
        working: Vec<f64>,
        derivative: EngineDerivative<D>,
        output: OutputParameters,
        flush_interval: Duration,
    ) -> Self {
        Self {
            shared,
            integrator: Integrator::initialize(solver, working, derivative),
            output,
            flush_interval,
            flushes: 0,
        }
    }

    /// Integrate until the stop flag is raised.
    ///
    /// Each iteration flushes the barrier if the flush interval has
    /// elapsed, then advances the system by the wall-clock time since the
    /// previous step scaled by `time_scale`. Returns the final metrics.
    pub fn run(mut self) -> WorkerMetrics {
        let mut last_flush = Instant::now();
        let mut last_step = last_flush;

        while !self.shared.stop.load(Ordering::Acquire) {
            if last_flush.elapsed() >= self.flush_interval {
                self.flush();
                last_flush = Instant::now();
            }

            let step_start = Instant::now();
            let dt = step_start.duration_since(last_step).as_secs_f64();
            if dt == 0.0 {
                continue;
            }
            last_step = step_start;

            let params = self.integrator.derivative().params;
            let actual = self
                .integrator
                .step(dt * params.time_scale, params.accuracy);
            let step_count = self.shared.step_count.fetch_add(1, Ordering::AcqRel) + 1;

            self.output = OutputParameters {
                step_elapsed_time: step_start.elapsed().as_secs_f64(),
                real_time_scale: actual / dt,
                step_count,
            };
        }

        self.metrics(0)
    }

    fn flush(&mut self) {
        let start = Instant::now();
        let mut barrier = lock(&self.shared.barrier);
        let (working, derivative) = self.integrator.parts_mut();
        barrier.flush(
            working,
            &mut derivative.infos,
            &mut derivative.params,
            &self.output,
        );
        self.flushes += 1;
        let held_us = start.elapsed().as_micros() as u64;
        barrier.metrics = self.metrics(held_us);
        drop(barrier);

        log::debug!(
            "flush {}: step {} held lock {}us",
            self.flushes,
            self.output.step_count,
            held_us
        );
    }

    fn metrics(&self, last_flush_us: u64) -> WorkerMetrics {
        WorkerMetrics {
            flushes: self.flushes,
            step_count: self.output.step_count,
            last_flush_us,
            solver: self.integrator.stats(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::force::PairwiseForce;
    use hadron_core::{Parameters, Particle};

    fn derivative(fixed: bool) -> EngineDerivative<1> {
        EngineDerivative {
            model: Box::new(PairwiseForce),
            params: InputParameters::default(),
            infos: vec![
                ParticleInfo { mass: 1.0, fixed },
                ParticleInfo::default(),
            ],
            links: vec![Link::new(0, 1)],
        }
    }

    #[test]
    fn fixed_particles_get_zero_derivative() {
        let state = StateLayout::<1>::pack(&[
            Particle {
                position: hadron_core::Vector::new([0.0]),
                velocity: hadron_core::Vector::new([3.0]),
            },
            Particle::at([1.0]),
        ]);
        let mut out = vec![0.0; state.len()];

        derivative(true).evaluate(&state, &mut out);
        assert_eq!(&out[..2], &[0.0, 0.0]);
        assert_ne!(out[3], 0.0);

        derivative(false).evaluate(&state, &mut out);
        assert_eq!(out[0], 3.0);
    }

    #[test]
    fn run_exits_when_stop_is_preset() {
        let data = StateLayout::<1>::pack(&[Particle::at([0.0]), Particle::at([1.0])]);
        let barrier = Barrier::<1>::new(
            data.clone(),
            vec![ParticleInfo::default(); 2],
            &Parameters::default(),
        );
        let shared = Arc::new(Shared::new(barrier));
        shared.stop.store(true, Ordering::Release);
        let worker = Worker::new(
            Arc::clone(&shared),
            hadron_solver::SolverKind::Euler.build(Default::default()),
            data,
            derivative(false),
            OutputParameters::default(),
            Duration::from_millis(30),
        );
        let metrics = worker.run();
        assert_eq!(metrics.step_count, 0);
        assert_eq!(shared.step_count.load(Ordering::Acquire), 0);
    }
}
