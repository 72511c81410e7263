//! Real-time particle simulation engine.
//!
//! An [`Engine`] integrates a system of particles, links, and pairwise
//! forces continuously on a background worker thread. Callers exchange
//! state with it through [`Engine::sync`], which holds a single lock for
//! a linear copy; the worker picks up changes at its next flush, at
//! most one flush interval later.
//!
//! Forces come from a pluggable [`ForceModel`]; [`PairwiseForce`] is the
//! reference kernel. [`DynEngine`] selects the dimension at run time.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod dyn_engine;
pub mod engine;
pub mod force;
pub mod metrics;

mod barrier;
mod worker;

pub use config::{ConfigError, EngineConfig, DEFAULT_FLUSH_INTERVAL};
pub use dyn_engine::DynEngine;
pub use engine::{Engine, EngineError, EngineState, StopReport};
pub use force::{ForceContext, ForceModel, PairwiseForce};
pub use metrics::WorkerMetrics;
