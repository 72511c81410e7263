//! Core types for the Hadron particle engine.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the fixed-arity [`Vector`], the particle data model shared by the
//! engine and its hosts, the flat state-record layout the solvers
//! operate on, and the core error types.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod model;
pub mod state;
pub mod vector;

pub use error::LayoutError;
pub use model::{InputParameters, Link, OutputParameters, Parameters, Particle, ParticleInfo};
pub use state::StateLayout;
pub use vector::Vector;
