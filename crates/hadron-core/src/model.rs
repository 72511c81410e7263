//! Particle data model and engine parameters.
//!
//! These are the records a host hands to the engine at start and
//! exchanges with it on every sync. Topology ([`Link`]) and masses are
//! fixed for the lifetime of a run; positions, velocities, fixed flags,
//! and [`InputParameters`] may change between syncs.

use crate::vector::Vector;

/// Kinematic state of one particle.
///
/// In flat buffers a particle is laid out as its position components
/// followed by its velocity components (see [`StateLayout`](crate::StateLayout)).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Particle<const D: usize> {
    /// Position.
    pub position: Vector<D>,
    /// Velocity.
    pub velocity: Vector<D>,
}

impl<const D: usize> Particle<D> {
    /// A particle at rest at `position`.
    pub fn at(position: impl Into<Vector<D>>) -> Self {
        Self {
            position: position.into(),
            velocity: Vector::zero(),
        }
    }
}

/// Per-particle attributes that are not integrated.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParticleInfo {
    /// Particle mass. Pairwise and link forces on a particle are weighted
    /// by the mass of the *other* particle.
    pub mass: f64,
    /// When set, the host is authoritative for this particle's position
    /// and velocity and the engine never integrates it forward.
    pub fixed: bool,
}

impl Default for ParticleInfo {
    fn default() -> Self {
        Self {
            mass: 1.0,
            fixed: false,
        }
    }
}

/// An elastic link between two particles.
///
/// `a == b` is accepted but produces a zero-length displacement and
/// therefore non-finite forces.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Link {
    /// Index of the first particle.
    pub a: usize,
    /// Index of the second particle.
    pub b: usize,
    /// Spring strength multiplier.
    pub strength: f64,
}

impl Link {
    /// A link of unit strength.
    pub fn new(a: usize, b: usize) -> Self {
        Self {
            a,
            b,
            strength: 1.0,
        }
    }
}

/// Host-owned tuning parameters, consumed by the engine once per flush.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InputParameters {
    /// Linear damping coefficient applied to every particle's velocity.
    pub viscosity: f64,
    /// Pairwise interaction coefficient. Negative values repel.
    pub particle_attraction: f64,
    /// Distance exponent of the pairwise interaction.
    pub particle_power: f64,
    /// Link (spring) coefficient.
    pub link_attraction: f64,
    /// Distance exponent of the link force.
    pub link_power: f64,
    /// Constant axis-0 bias pulling link endpoints apart.
    pub stretch_attraction: f64,
    /// Constant axis-0 acceleration applied to every particle.
    pub gravity: f64,
    /// Maximum derivative disagreement accepted by the adaptive solver.
    pub accuracy: f64,
    /// Simulated seconds per wall-clock second.
    pub time_scale: f64,
}

impl Default for InputParameters {
    fn default() -> Self {
        Self {
            viscosity: 10.0,
            particle_attraction: -1.0,
            particle_power: -2.0,
            link_attraction: 10.0,
            link_power: -1.0,
            stretch_attraction: 0.0,
            gravity: 0.0,
            accuracy: 50.0,
            time_scale: 1.0,
        }
    }
}

/// Engine-written run statistics.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OutputParameters {
    /// Wall-clock duration of the most recent step, in seconds.
    pub step_elapsed_time: f64,
    /// Ratio of simulated time actually advanced to wall-clock time
    /// elapsed for the most recent step.
    pub real_time_scale: f64,
    /// Number of steps completed since start. Strictly increasing.
    pub step_count: u64,
}

impl Default for OutputParameters {
    fn default() -> Self {
        Self {
            step_elapsed_time: 0.0,
            real_time_scale: 1.0,
            step_count: 0,
        }
    }
}

/// Input and output parameter blocks exchanged on every sync.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Parameters {
    /// Host-owned inputs.
    pub input: InputParameters,
    /// Engine-owned outputs.
    pub output: OutputParameters,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_parameters_match_host_defaults() {
        let p = InputParameters::default();
        assert_eq!(p.viscosity, 10.0);
        assert_eq!(p.particle_attraction, -1.0);
        assert_eq!(p.particle_power, -2.0);
        assert_eq!(p.link_attraction, 10.0);
        assert_eq!(p.link_power, -1.0);
        assert_eq!(p.stretch_attraction, 0.0);
        assert_eq!(p.gravity, 0.0);
        assert_eq!(p.accuracy, 50.0);
        assert_eq!(p.time_scale, 1.0);

        let out = OutputParameters::default();
        assert_eq!(out.step_count, 0);
        assert_eq!(out.real_time_scale, 1.0);
    }

    #[test]
    fn particle_at_rest() {
        let p = Particle::<2>::at([1.0, 2.0]);
        assert_eq!(p.position, Vector::new([1.0, 2.0]));
        assert_eq!(p.velocity, Vector::zero());
    }

    #[test]
    fn default_info_is_unit_mass_free() {
        let info = ParticleInfo::default();
        assert_eq!(info.mass, 1.0);
        assert!(!info.fixed);
    }
}
