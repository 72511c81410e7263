//! Engine configuration, validation, and error types.
//!
//! [`EngineConfig`] selects the solver and worker timing. Structural
//! checks on the particle data itself happen at
//! [`Engine::start`](crate::Engine::start) and report the same
//! [`ConfigError`].

use std::error::Error;
use std::fmt;
use std::time::Duration;

use hadron_core::LayoutError;
use hadron_solver::{SolverConfig, SolverConfigError, SolverKind};

/// Interval between barrier flushes when none is configured.
pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_millis(30);

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected while configuring or starting an engine.
#[derive(Debug, PartialEq)]
pub enum ConfigError {
    /// Dimension outside the supported range.
    InvalidDimension {
        /// The rejected dimension.
        dimension: usize,
    },
    /// Particle buffer or info array does not match the particle count.
    Layout(LayoutError),
    /// A link refers to a particle that does not exist.
    LinkOutOfRange {
        /// Position of the link in the link array.
        link: usize,
        /// The offending particle index.
        index: usize,
        /// Number of particles.
        particle_count: usize,
    },
    /// Flush interval is zero.
    InvalidFlushInterval,
    /// Solver configuration rejected.
    Solver(SolverConfigError),
    /// The worker thread could not be spawned.
    ThreadSpawnFailed {
        /// OS error text.
        reason: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDimension { dimension } => {
                write!(f, "dimension {dimension} is not supported (expected 1, 2, or 3)")
            }
            Self::Layout(e) => write!(f, "layout: {e}"),
            Self::LinkOutOfRange {
                link,
                index,
                particle_count,
            } => write!(
                f,
                "link {link} refers to particle {index}, but there are only {particle_count}"
            ),
            Self::InvalidFlushInterval => write!(f, "flush_interval must be non-zero"),
            Self::Solver(e) => write!(f, "solver: {e}"),
            Self::ThreadSpawnFailed { reason } => write!(f, "thread spawn failed: {reason}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Layout(e) => Some(e),
            Self::Solver(e) => Some(e),
            _ => None,
        }
    }
}

impl From<LayoutError> for ConfigError {
    fn from(e: LayoutError) -> Self {
        Self::Layout(e)
    }
}

impl From<SolverConfigError> for ConfigError {
    fn from(e: SolverConfigError) -> Self {
        Self::Solver(e)
    }
}

// ── EngineConfig ───────────────────────────────────────────────────

/// Configuration for constructing an [`Engine`](crate::Engine).
#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// Integrator variant. Default: Euler.
    pub solver: SolverKind,
    /// Step-size control settings.
    pub solver_config: SolverConfig,
    /// Minimum time between barrier flushes on the worker. Default: 30ms.
    pub flush_interval: Duration,
    /// Name given to the worker thread. Default: `"hadron-worker"`.
    pub thread_name: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            solver: SolverKind::default(),
            solver_config: SolverConfig::default(),
            flush_interval: DEFAULT_FLUSH_INTERVAL,
            thread_name: "hadron-worker".to_string(),
        }
    }
}

impl EngineConfig {
    /// Validate all settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.flush_interval.is_zero() {
            return Err(ConfigError::InvalidFlushInterval);
        }
        self.solver_config.validate()?;
        Ok(())
    }
}
