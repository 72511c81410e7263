//! Scene errors.

use std::error::Error;
use std::fmt;

/// Errors from scene editing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SceneError {
    /// More links requested than distinct pairs exist.
    TooManyLinks {
        /// Particles being generated.
        particle_count: usize,
        /// Links requested.
        link_count: usize,
        /// `particle_count * (particle_count - 1) / 2`, or `usize::MAX` if
        /// that overflows.
        max: usize,
    },
}

impl fmt::Display for SceneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooManyLinks {
                particle_count,
                link_count,
                max,
            } => write!(
                f,
                "{particle_count} particles cannot have {link_count} links (at most {max})"
            ),
        }
    }
}

impl Error for SceneError {}
