//! Runtime dimension dispatch over [`Engine`].

use hadron_core::{Link, Parameters, ParticleInfo};

use crate::config::{ConfigError, EngineConfig};
use crate::engine::{Engine, EngineError, EngineState, StopReport};
use crate::metrics::WorkerMetrics;

/// An [`Engine`] whose dimension is chosen at run time (1, 2, or 3).
///
/// Used where the dimension arrives as data, such as across the C ABI.
pub enum DynEngine {
    /// One-dimensional system.
    D1(Engine<1>),
    /// Two-dimensional system.
    D2(Engine<2>),
    /// Three-dimensional system.
    D3(Engine<3>),
}

macro_rules! dispatch {
    ($self:expr, $engine:ident => $body:expr) => {
        match $self {
            DynEngine::D1($engine) => $body,
            DynEngine::D2($engine) => $body,
            DynEngine::D3($engine) => $body,
        }
    };
}

impl DynEngine {
    /// Create an engine of the given dimension.
    pub fn new(dimension: usize, config: EngineConfig) -> Result<Self, ConfigError> {
        Ok(match dimension {
            1 => Self::D1(Engine::new(config)?),
            2 => Self::D2(Engine::new(config)?),
            3 => Self::D3(Engine::new(config)?),
            _ => return Err(ConfigError::InvalidDimension { dimension }),
        })
    }

    /// Components per vector.
    pub fn dimension(&self) -> usize {
        match self {
            Self::D1(_) => 1,
            Self::D2(_) => 2,
            Self::D3(_) => 3,
        }
    }

    /// See [`Engine::start`].
    pub fn start(
        &mut self,
        parameters: &Parameters,
        particle_data: &[f64],
        infos: &[ParticleInfo],
        links: &[Link],
    ) -> Result<(), EngineError> {
        dispatch!(self, e => e.start(parameters, particle_data, infos, links))
    }

    /// See [`Engine::sync`].
    pub fn sync(
        &self,
        parameters: &mut Parameters,
        particle_data: &mut [f64],
        infos: &[ParticleInfo],
    ) -> Result<(), EngineError> {
        dispatch!(self, e => e.sync(parameters, particle_data, infos))
    }

    /// See [`Engine::step_count`].
    pub fn step_count(&self) -> u64 {
        dispatch!(self, e => e.step_count())
    }

    /// See [`Engine::metrics`].
    pub fn metrics(&self) -> Result<WorkerMetrics, EngineError> {
        dispatch!(self, e => e.metrics())
    }

    /// See [`Engine::stop`].
    pub fn stop(&mut self) -> Result<StopReport, EngineError> {
        dispatch!(self, e => e.stop())
    }

    /// See [`Engine::state`].
    pub fn state(&self) -> EngineState {
        dispatch!(self, e => e.state())
    }

    /// See [`Engine::particle_count`].
    pub fn particle_count(&self) -> usize {
        dispatch!(self, e => e.particle_count())
    }
}
