//! User-facing [`Engine`] lifecycle: start, sync, step count, stop.
//!
//! # Architecture
//!
//! ```text
//! Caller Thread(s)                  Worker Thread
//!     |                                 |
//!     |--start()---spawn--------------->| working buffer (owned)
//!     |                                 | loop:
//!     |--sync()--+                      |   every flush_interval:
//!     |          | lock(barrier)        |     lock(barrier)
//!     |          | fixed: caller->bar   |     fixed: bar->working
//!     |          | free:  bar->caller   |     free:  working->bar
//!     |          | unlock               |     unlock
//!     |<---------+                      |   solver.step(dt * time_scale)
//!     |                                 |   step_count += 1 (atomic)
//!     |--step_count()--atomic load      |
//!     |--stop()--set flag, join-------->| exits after current step
//! ```

use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Instant;

use hadron_core::{LayoutError, Link, Parameters, ParticleInfo, StateLayout};

use crate::barrier::{lock, Barrier};
use crate::config::{ConfigError, EngineConfig};
use crate::force::{ForceModel, PairwiseForce};
use crate::metrics::WorkerMetrics;
use crate::worker::{EngineDerivative, Shared, Worker};

// ── Error types ──────────────────────────────────────────────────

/// Errors from engine lifecycle operations.
#[derive(Debug, PartialEq)]
pub enum EngineError {
    /// The engine is not running (never started, or already stopped).
    NotRunning,
    /// `start` was called on an engine that has already been started.
    AlreadyStarted,
    /// Start-time configuration was rejected.
    Config(ConfigError),
    /// A sync buffer does not match the running system.
    Layout(LayoutError),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotRunning => write!(f, "engine is not running"),
            Self::AlreadyStarted => write!(f, "engine has already been started"),
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Layout(e) => write!(f, "layout: {e}"),
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Layout(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigError> for EngineError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<LayoutError> for EngineError {
    fn from(e: LayoutError) -> Self {
        Self::Layout(e)
    }
}

// ── EngineState / StopReport ─────────────────────────────────────

/// Lifecycle state. Transitions only move forward.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineState {
    /// Constructed, not yet started.
    Created,
    /// Worker thread is integrating.
    Running,
    /// Stop flag raised, waiting for the worker to exit.
    Stopping,
    /// Worker joined and buffers released.
    Stopped,
}

/// Report from [`Engine::stop`].
#[derive(Clone, Debug)]
pub struct StopReport {
    /// Time spent stopping, in milliseconds.
    pub total_ms: u64,
    /// Whether the worker thread exited normally.
    pub worker_joined: bool,
    /// Steps completed over the whole run.
    pub step_count: u64,
    /// Final worker counters, if the worker exited normally.
    pub metrics: Option<WorkerMetrics>,
}

// ── Engine ───────────────────────────────────────────────────────

/// A `D`-dimensional particle engine with a background worker.
///
/// `sync`, `step_count`, and `metrics` take `&self` and may be called
/// from several threads at once; `start` and `stop` take `&mut self`.
pub struct Engine<const D: usize> {
    config: EngineConfig,
    state: EngineState,
    /// Taken by `start`. Wrapped in a Mutex so the engine is `Sync`
    /// (force models are `Send` but not necessarily `Sync`). Never
    /// contended: only accessed through `&mut self`.
    force: Mutex<Option<Box<dyn ForceModel<D>>>>,
    shared: Option<Arc<Shared<D>>>,
    worker: Option<JoinHandle<WorkerMetrics>>,
    particle_count: usize,
    link_count: usize,
    final_step_count: u64,
}

impl<const D: usize> Engine<D> {
    /// Create an engine using [`PairwiseForce`].
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        Self::with_force_model(config, Box::new(PairwiseForce))
    }

    /// Create an engine with a custom force model.
    pub fn with_force_model(
        config: EngineConfig,
        force: Box<dyn ForceModel<D>>,
    ) -> Result<Self, ConfigError> {
        if D == 0 {
            return Err(ConfigError::InvalidDimension { dimension: D });
        }
        config.validate()?;
        Ok(Self {
            config,
            state: EngineState::Created,
            force: Mutex::new(Some(force)),
            shared: None,
            worker: None,
            particle_count: 0,
            link_count: 0,
            final_step_count: 0,
        })
    }

    /// Copy the initial system into the engine and spawn the worker.
    ///
    /// `particle_data` holds one record per entry of `infos`. Returns as
    /// soon as the worker is spawned. The output step count starts at 0.
    pub fn start(
        &mut self,
        parameters: &Parameters,
        particle_data: &[f64],
        infos: &[ParticleInfo],
        links: &[Link],
    ) -> Result<(), EngineError> {
        if self.state != EngineState::Created {
            return Err(EngineError::AlreadyStarted);
        }

        let n = infos.len();
        StateLayout::<D>::check(particle_data, n).map_err(ConfigError::from)?;
        for (k, link) in links.iter().enumerate() {
            for index in [link.a, link.b] {
                if index >= n {
                    return Err(ConfigError::LinkOutOfRange {
                        link: k,
                        index,
                        particle_count: n,
                    }
                    .into());
                }
            }
        }

        let mut parameters = *parameters;
        parameters.output.step_count = 0;

        let barrier = Barrier::<D>::new(particle_data.to_vec(), infos.to_vec(), &parameters);
        let shared = Arc::new(Shared::new(barrier));

        let model = self
            .force
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .unwrap_or_else(|| Box::new(PairwiseForce));
        let model_name = model.name();
        let derivative = EngineDerivative {
            model,
            params: parameters.input,
            infos: infos.to_vec(),
            links: links.to_vec(),
        };
        let solver = self.config.solver.build(self.config.solver_config);
        let solver_name = solver.name();
        let worker = Worker::new(
            Arc::clone(&shared),
            solver,
            particle_data.to_vec(),
            derivative,
            parameters.output,
            self.config.flush_interval,
        );

        let handle = thread::Builder::new()
            .name(self.config.thread_name.clone())
            .spawn(move || worker.run())
            .map_err(|e| {
                // The force model moved into the failed closure.
                self.state = EngineState::Stopped;
                ConfigError::ThreadSpawnFailed {
                    reason: e.to_string(),
                }
            })?;

        self.shared = Some(shared);
        self.worker = Some(handle);
        self.particle_count = n;
        self.link_count = links.len();
        self.final_step_count = 0;
        self.state = EngineState::Running;

        log::info!(
            "engine started: {} particles, {} links, dimension {}, {} solver, {} force",
            n,
            links.len(),
            D,
            solver_name,
            model_name
        );
        Ok(())
    }

    /// Exchange state with the running worker.
    ///
    /// For each particle the caller's fixed flag is recorded; fixed
    /// particles are copied from `particle_data` into the engine, all
    /// others are copied out of the engine into `particle_data`.
    /// `parameters.input` is queued for the worker's next flush and
    /// `parameters.output` receives the outputs of its last flush.
    pub fn sync(
        &self,
        parameters: &mut Parameters,
        particle_data: &mut [f64],
        infos: &[ParticleInfo],
    ) -> Result<(), EngineError> {
        let shared = self.shared.as_ref().ok_or(EngineError::NotRunning)?;
        StateLayout::<D>::check(particle_data, self.particle_count)?;
        if infos.len() != self.particle_count {
            return Err(LayoutError::CountMismatch {
                what: "infos",
                expected: self.particle_count,
                actual: infos.len(),
            }
            .into());
        }
        lock(&shared.barrier).sync(parameters, particle_data, infos);
        Ok(())
    }

    /// Steps completed since start, without taking the lock.
    ///
    /// After `stop` this is the final count; before `start` it is 0.
    pub fn step_count(&self) -> u64 {
        match &self.shared {
            Some(shared) => shared.step_count.load(Ordering::Acquire),
            None => self.final_step_count,
        }
    }

    /// Worker counters as of the last flush.
    pub fn metrics(&self) -> Result<WorkerMetrics, EngineError> {
        let shared = self.shared.as_ref().ok_or(EngineError::NotRunning)?;
        Ok(lock(&shared.barrier).metrics)
    }

    /// Signal the worker to stop, wait for it, and release the buffers.
    ///
    /// Blocks for at most one integration step plus one flush.
    pub fn stop(&mut self) -> Result<StopReport, EngineError> {
        let shared = self.shared.take().ok_or(EngineError::NotRunning)?;
        let start = Instant::now();

        self.state = EngineState::Stopping;
        shared.stop.store(true, Ordering::Release);

        let (worker_joined, metrics) = match self.worker.take() {
            Some(handle) => match handle.join() {
                Ok(metrics) => (true, Some(metrics)),
                Err(_) => {
                    log::warn!("engine worker thread panicked");
                    (false, None)
                }
            },
            None => (false, None),
        };

        self.final_step_count = shared.step_count.load(Ordering::Acquire);
        self.state = EngineState::Stopped;
        drop(shared);

        let total_ms = start.elapsed().as_millis() as u64;
        log::info!(
            "engine stopped after {} steps ({}ms to stop)",
            self.final_step_count,
            total_ms
        );
        Ok(StopReport {
            total_ms,
            worker_joined,
            step_count: self.final_step_count,
            metrics,
        })
    }

    /// Current lifecycle state.
    pub fn state(&self) -> EngineState {
        self.state
    }

    /// The configuration this engine was built with.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Particle count of the current (or last) run.
    pub fn particle_count(&self) -> usize {
        self.particle_count
    }

    /// Link count of the current (or last) run.
    pub fn link_count(&self) -> usize {
        self.link_count
    }
}

impl<const D: usize> Drop for Engine<D> {
    fn drop(&mut self) {
        if self.shared.is_some() {
            let _ = self.stop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use hadron_test_utils::{two_particles, wait_until};

    fn fast_config() -> EngineConfig {
        EngineConfig {
            flush_interval: Duration::from_millis(5),
            ..EngineConfig::default()
        }
    }

    #[test]
    fn zero_dimension_rejected() {
        assert!(matches!(
            Engine::<0>::new(EngineConfig::default()),
            Err(ConfigError::InvalidDimension { dimension: 0 })
        ));
    }

    #[test]
    fn lifecycle_transitions() {
        let f = two_particles::<2>();
        let mut engine = Engine::<2>::new(fast_config()).unwrap();
        assert_eq!(engine.state(), EngineState::Created);
        assert_eq!(engine.step_count(), 0);

        engine
            .start(&f.parameters, &f.particle_data, &f.infos, &f.links)
            .unwrap();
        assert_eq!(engine.state(), EngineState::Running);
        assert_eq!(
            engine.start(&f.parameters, &f.particle_data, &f.infos, &f.links),
            Err(EngineError::AlreadyStarted)
        );

        assert!(wait_until(Duration::from_secs(5), || engine.step_count() > 10));
        let report = engine.stop().unwrap();
        assert!(report.worker_joined);
        assert!(report.step_count > 10);
        assert_eq!(engine.state(), EngineState::Stopped);
        assert_eq!(engine.step_count(), report.step_count);

        assert_eq!(engine.stop().unwrap_err(), EngineError::NotRunning);
        assert_eq!(
            engine.start(&f.parameters, &f.particle_data, &f.infos, &f.links),
            Err(EngineError::AlreadyStarted)
        );
    }

    #[test]
    fn sync_before_start_is_rejected() {
        let mut f = two_particles::<2>();
        let engine = Engine::<2>::new(fast_config()).unwrap();
        assert_eq!(
            engine.sync(&mut f.parameters, &mut f.particle_data, &f.infos),
            Err(EngineError::NotRunning)
        );
        assert_eq!(engine.metrics(), Err(EngineError::NotRunning));
    }

    #[test]
    fn start_validates_buffer_and_links() {
        let f = two_particles::<2>();
        let mut engine = Engine::<2>::new(fast_config()).unwrap();

        let short = &f.particle_data[..7];
        assert!(matches!(
            engine.start(&f.parameters, short, &f.infos, &f.links),
            Err(EngineError::Config(ConfigError::Layout(
                LayoutError::BufferLength { expected: 8, actual: 7 }
            )))
        ));

        let bad_links = [Link::new(0, 2)];
        assert_eq!(
            engine.start(&f.parameters, &f.particle_data, &f.infos, &bad_links),
            Err(EngineError::Config(ConfigError::LinkOutOfRange {
                link: 0,
                index: 2,
                particle_count: 2
            }))
        );

        // Failed attempts leave the engine startable.
        assert_eq!(engine.state(), EngineState::Created);
        engine
            .start(&f.parameters, &f.particle_data, &f.infos, &f.links)
            .unwrap();
    }

    #[test]
    fn sync_rejects_mismatched_buffers() {
        let mut f = two_particles::<2>();
        let mut engine = Engine::<2>::new(fast_config()).unwrap();
        engine
            .start(&f.parameters, &f.particle_data, &f.infos, &f.links)
            .unwrap();

        let mut short = vec![0.0; 4];
        assert!(matches!(
            engine.sync(&mut f.parameters, &mut short, &f.infos),
            Err(EngineError::Layout(LayoutError::BufferLength { .. }))
        ));
        assert!(matches!(
            engine.sync(&mut f.parameters, &mut f.particle_data, &f.infos[..1]),
            Err(EngineError::Layout(LayoutError::CountMismatch { .. }))
        ));
    }

    #[test]
    fn metrics_advance_with_flushes() {
        let f = two_particles::<1>();
        let mut engine = Engine::<1>::new(fast_config()).unwrap();
        engine
            .start(&f.parameters, &f.particle_data, &f.infos, &f.links)
            .unwrap();
        assert!(wait_until(Duration::from_secs(5), || {
            engine.metrics().map(|m| m.flushes >= 2).unwrap_or(false)
        }));
        let m = engine.metrics().unwrap();
        assert!(m.solver.accepted_steps > 0);
        assert!(m.solver.evaluations >= 2 * m.solver.accepted_steps);
    }

    #[test]
    fn drop_stops_running_engine() {
        let f = two_particles::<3>();
        let mut engine = Engine::<3>::new(fast_config()).unwrap();
        engine
            .start(&f.parameters, &f.particle_data, &f.infos, &f.links)
            .unwrap();
        drop(engine);
    }

    #[test]
    fn engine_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Engine<2>>();
    }
}
