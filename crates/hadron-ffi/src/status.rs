//! Status codes returned across the C ABI.
//!
//! [`HadronStatus`] is `repr(i32)`: `Ok` is zero and every failure is
//! negative. Rust error types convert through `From<&E>` so entry points
//! can write `HadronStatus::from(&e) as i32`.

use hadron_core::LayoutError;
use hadron_engine::{ConfigError, EngineError};

/// C-compatible status code returned by every status-returning function.
///
/// Values are ABI-stable.
#[repr(i32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HadronStatus {
    /// Success.
    Ok = 0,
    /// Handle is unknown or the engine was already stopped.
    InvalidHandle = -1,
    /// A pointer is null where data is required, or a value is out of range.
    InvalidArgument = -2,
    /// Engine configuration was rejected.
    ConfigError = -3,
    /// Dimension is not 1, 2, or 3.
    InvalidDimension = -4,
    /// Particle buffer length or per-particle array length is inconsistent.
    BufferLengthMismatch = -5,
    /// A link names a particle index outside the system.
    LinkOutOfRange = -6,
    /// The engine is not running.
    NotRunning = -7,
    /// The engine was already started.
    AlreadyStarted = -8,
    /// The worker thread could not be spawned.
    ThreadSpawnFailed = -9,
    /// Internal error (e.g. poisoned mutex after a prior panic).
    InternalError = -10,
    /// A Rust panic was caught at the FFI boundary.
    Panicked = -128,
}

impl From<&LayoutError> for HadronStatus {
    fn from(_e: &LayoutError) -> Self {
        HadronStatus::BufferLengthMismatch
    }
}

impl From<&ConfigError> for HadronStatus {
    fn from(e: &ConfigError) -> Self {
        match e {
            ConfigError::InvalidDimension { .. } => HadronStatus::InvalidDimension,
            ConfigError::Layout(layout) => HadronStatus::from(layout),
            ConfigError::LinkOutOfRange { .. } => HadronStatus::LinkOutOfRange,
            ConfigError::ThreadSpawnFailed { .. } => HadronStatus::ThreadSpawnFailed,
            ConfigError::InvalidFlushInterval | ConfigError::Solver(_) => {
                HadronStatus::ConfigError
            }
        }
    }
}

impl From<&EngineError> for HadronStatus {
    fn from(e: &EngineError) -> Self {
        match e {
            EngineError::NotRunning => HadronStatus::NotRunning,
            EngineError::AlreadyStarted => HadronStatus::AlreadyStarted,
            EngineError::Config(config) => HadronStatus::from(config),
            EngineError::Layout(layout) => HadronStatus::from(layout),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_code_values_are_stable() {
        assert_eq!(HadronStatus::Ok as i32, 0);
        assert_eq!(HadronStatus::InvalidHandle as i32, -1);
        assert_eq!(HadronStatus::InvalidArgument as i32, -2);
        assert_eq!(HadronStatus::ConfigError as i32, -3);
        assert_eq!(HadronStatus::InvalidDimension as i32, -4);
        assert_eq!(HadronStatus::BufferLengthMismatch as i32, -5);
        assert_eq!(HadronStatus::LinkOutOfRange as i32, -6);
        assert_eq!(HadronStatus::NotRunning as i32, -7);
        assert_eq!(HadronStatus::AlreadyStarted as i32, -8);
        assert_eq!(HadronStatus::ThreadSpawnFailed as i32, -9);
        assert_eq!(HadronStatus::InternalError as i32, -10);
        assert_eq!(HadronStatus::Panicked as i32, -128);
    }

    #[test]
    fn config_errors_keep_their_cause() {
        assert_eq!(
            HadronStatus::from(&ConfigError::InvalidDimension { dimension: 4 }),
            HadronStatus::InvalidDimension
        );
        assert_eq!(
            HadronStatus::from(&ConfigError::LinkOutOfRange {
                link: 0,
                index: 9,
                particle_count: 2,
            }),
            HadronStatus::LinkOutOfRange
        );
        assert_eq!(
            HadronStatus::from(&ConfigError::InvalidFlushInterval),
            HadronStatus::ConfigError
        );
        assert_eq!(
            HadronStatus::from(&ConfigError::Layout(LayoutError::BufferLength {
                expected: 4,
                actual: 5,
            })),
            HadronStatus::BufferLengthMismatch
        );
    }

    #[test]
    fn engine_errors_to_status() {
        assert_eq!(
            HadronStatus::from(&EngineError::NotRunning),
            HadronStatus::NotRunning
        );
        assert_eq!(
            HadronStatus::from(&EngineError::AlreadyStarted),
            HadronStatus::AlreadyStarted
        );
        assert_eq!(
            HadronStatus::from(&EngineError::Config(ConfigError::InvalidDimension {
                dimension: 0
            })),
            HadronStatus::InvalidDimension
        );
    }
}
