//! Hadron: a real-time particle simulation engine.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all Hadron sub-crates. For most users, adding `hadron` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use hadron::prelude::*;
//!
//! // A fixed anchor and one free particle joined by a link.
//! let mut scene = Scene::<2>::new();
//! let anchor = scene.add_particle(SceneParticle {
//!     fixed: true,
//!     ..SceneParticle::at([0.0, 0.0])
//! });
//! let bob = scene.add_particle(SceneParticle::at([1.0, 0.0]));
//! assert!(scene.add_link(anchor, bob));
//!
//! let mut params = Parameters::default();
//! params.input.gravity = -1.0;
//!
//! let mut engine = Engine::<2>::new(EngineConfig::default()).unwrap();
//! scene.start(&mut engine, &params).unwrap();
//! scene.refresh(&engine, &mut params).unwrap();
//! let report = engine.stop().unwrap();
//! assert!(report.worker_joined);
//! assert_eq!(scene.particles()[anchor].position, Vector::new([0.0, 0.0]));
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `hadron-core` | Vectors, particles, links, parameters, state layout |
//! | [`solver`] | `hadron-solver` | Adaptive Euler and Runge–Kutta integrators |
//! | [`engine`] | `hadron-engine` | Background engine, force models, runtime dimension |
//! | [`scene`] | `hadron-scene` | Host-side particle graph and random generation |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Vectors, the particle data model, and the flat state layout
/// (`hadron-core`).
pub use hadron_core as types;

/// Adaptive integrators (`hadron-solver`).
///
/// [`solver::EulerSolver`] and [`solver::RungeKuttaSolver`] behind the
/// [`solver::Solver`] trait, plus [`solver::Integrator`].
pub use hadron_solver as solver;

/// The real-time engine (`hadron-engine`).
///
/// [`engine::Engine`] for a compile-time dimension,
/// [`engine::DynEngine`] when the dimension arrives at run time, and the
/// [`engine::ForceModel`] seam.
pub use hadron_engine as engine;

/// Host-side scene editing (`hadron-scene`).
pub use hadron_scene as scene;

/// Common imports for typical Hadron usage.
///
/// ```rust
/// use hadron::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use hadron_core::{
        InputParameters, Link, OutputParameters, Parameters, Particle, ParticleInfo, StateLayout,
        Vector,
    };

    // Solvers
    pub use hadron_solver::{SolverConfig, SolverKind};

    // Engine
    pub use hadron_engine::{
        DynEngine, Engine, EngineConfig, EngineError, ForceModel, PairwiseForce, StopReport,
    };

    // Scene
    pub use hadron_scene::{Scene, SceneParticle, Zone};
}
