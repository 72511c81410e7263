//! `#[repr(C)]` mirrors of the engine's data model.

use hadron_core::{InputParameters, Link, OutputParameters, Parameters, ParticleInfo};
use hadron_engine::WorkerMetrics;

/// Input and output parameters exchanged on start and every sync.
///
/// The first nine fields are host-owned inputs; the last three are
/// written by the engine.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HadronParameters {
    /// Linear velocity damping.
    pub viscosity: f64,
    /// Pairwise interaction coefficient. Negative values repel.
    pub particle_attraction: f64,
    /// Distance exponent of the pairwise interaction.
    pub particle_power: f64,
    /// Link coefficient.
    pub link_attraction: f64,
    /// Distance exponent of the link force.
    pub link_power: f64,
    /// Axis-0 bias pulling link endpoints apart.
    pub stretch_attraction: f64,
    /// Axis-0 acceleration on every particle.
    pub gravity: f64,
    /// Solver accuracy threshold.
    pub accuracy: f64,
    /// Simulated seconds per wall-clock second.
    pub time_scale: f64,
    /// Wall-clock duration of the latest step, in seconds.
    pub step_elapsed_time: f64,
    /// Simulated over wall-clock time for the latest step.
    pub real_time_scale: f64,
    /// Steps completed since start.
    pub step_count: u64,
}

impl From<&Parameters> for HadronParameters {
    fn from(p: &Parameters) -> Self {
        let (i, o) = (&p.input, &p.output);
        Self {
            viscosity: i.viscosity,
            particle_attraction: i.particle_attraction,
            particle_power: i.particle_power,
            link_attraction: i.link_attraction,
            link_power: i.link_power,
            stretch_attraction: i.stretch_attraction,
            gravity: i.gravity,
            accuracy: i.accuracy,
            time_scale: i.time_scale,
            step_elapsed_time: o.step_elapsed_time,
            real_time_scale: o.real_time_scale,
            step_count: o.step_count,
        }
    }
}

impl From<&HadronParameters> for Parameters {
    fn from(p: &HadronParameters) -> Self {
        Parameters {
            input: InputParameters {
                viscosity: p.viscosity,
                particle_attraction: p.particle_attraction,
                particle_power: p.particle_power,
                link_attraction: p.link_attraction,
                link_power: p.link_power,
                stretch_attraction: p.stretch_attraction,
                gravity: p.gravity,
                accuracy: p.accuracy,
                time_scale: p.time_scale,
            },
            output: OutputParameters {
                step_elapsed_time: p.step_elapsed_time,
                real_time_scale: p.real_time_scale,
                step_count: p.step_count,
            },
        }
    }
}

/// Per-particle mass and fixed flag.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HadronParticleInfo {
    /// Particle mass.
    pub mass: f64,
    /// Non-zero pins the particle in place.
    pub fixed: u8,
}

impl From<&HadronParticleInfo> for ParticleInfo {
    fn from(info: &HadronParticleInfo) -> Self {
        ParticleInfo {
            mass: info.mass,
            fixed: info.fixed != 0,
        }
    }
}

/// A link between two particles by index.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HadronLink {
    /// First endpoint.
    pub a: i32,
    /// Second endpoint.
    pub b: i32,
    /// Link strength multiplier.
    pub strength: f64,
}

impl HadronLink {
    /// Convert to a [`Link`], or `None` if either index is negative.
    pub(crate) fn to_link(self) -> Option<Link> {
        Some(Link {
            a: usize::try_from(self.a).ok()?,
            b: usize::try_from(self.b).ok()?,
            strength: self.strength,
        })
    }
}

/// Worker counters as of the latest flush.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct HadronWorkerMetrics {
    /// Completed flushes.
    pub flushes: u64,
    /// Step count at the snapshot.
    pub step_count: u64,
    /// Barrier lock hold time of the last flush, in microseconds.
    pub last_flush_us: u64,
    /// Derivative evaluations.
    pub evaluations: u64,
    /// Rejected and halved candidate steps.
    pub halvings: u64,
    /// Accepted steps.
    pub accepted_steps: u64,
    /// Steps accepted because the halving limit ran out.
    pub halving_limit_hits: u64,
    /// Most recently accepted solver step.
    pub last_dt: f64,
}

impl From<&WorkerMetrics> for HadronWorkerMetrics {
    fn from(m: &WorkerMetrics) -> Self {
        Self {
            flushes: m.flushes,
            step_count: m.step_count,
            last_flush_us: m.last_flush_us,
            evaluations: m.solver.evaluations,
            halvings: m.solver.halvings,
            accepted_steps: m.solver.accepted_steps,
            halving_limit_hits: m.solver.halving_limit_hits,
            last_dt: m.solver.last_dt,
        }
    }
}
