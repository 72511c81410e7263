//! Error types shared across the Hadron workspace.

use std::error::Error;
use std::fmt;

/// A flat particle buffer does not match the expected record layout.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LayoutError {
    /// Buffer length differs from `particle_count * record_len`.
    BufferLength {
        /// Required length.
        expected: usize,
        /// Length supplied.
        actual: usize,
    },
    /// Buffer length is not a whole number of records.
    RaggedBuffer {
        /// Length supplied.
        len: usize,
        /// Values per record.
        record_len: usize,
    },
    /// A per-particle array has a different count than the state buffer.
    CountMismatch {
        /// Which array was wrong.
        what: &'static str,
        /// Particle count of the state buffer.
        expected: usize,
        /// Entries supplied.
        actual: usize,
    },
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BufferLength { expected, actual } => {
                write!(f, "particle buffer holds {actual} values, expected {expected}")
            }
            Self::RaggedBuffer { len, record_len } => {
                write!(
                    f,
                    "particle buffer length {len} is not a multiple of record length {record_len}"
                )
            }
            Self::CountMismatch {
                what,
                expected,
                actual,
            } => write!(f, "{what} has {actual} entries, expected {expected}"),
        }
    }
}

impl Error for LayoutError {}
