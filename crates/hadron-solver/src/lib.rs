//! Adaptive explicit integrators for the Hadron engine.
//!
//! A [`Solver`] advances an opaque `f64` state vector by one adaptively
//! sized step using a caller-supplied [`DerivativeFn`]. Two variants are
//! provided and are interchangeable behind the trait:
//!
//! - [`EulerSolver`]: trapezoid-corrected explicit Euler with step
//!   doubling/halving.
//! - [`RungeKuttaSolver`]: classical fourth-order Runge–Kutta preceded by
//!   the same halving pre-pass.
//!
//! [`Integrator`] binds a solver to an owned state vector and derivative
//! function so callers can simply call [`Integrator::step`].
//!
//! # Liveness
//!
//! Step-size control halves the candidate step until two derivative
//! evaluations agree within `accuracy`. There is no lower bound unless
//! [`SolverConfig::max_halvings`] is set: a derivative that never
//! settles (including one producing NaN) keeps the solver halving
//! forever.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod euler;
pub mod integrator;
pub mod runge_kutta;
pub mod solver;

pub use euler::EulerSolver;
pub use integrator::Integrator;
pub use runge_kutta::RungeKuttaSolver;
pub use solver::{DerivativeFn, Solver, SolverConfig, SolverConfigError, SolverKind, SolverStats};
