//! Test fixtures for Hadron development.
//!
//! Provides analytic derivative functions for solver tests, small
//! particle systems with known behaviour for engine tests, and a
//! polling helper for waiting on a background worker.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use std::time::{Duration, Instant};

pub use fixtures::{random_cloud, two_particles, SystemFixture};

/// `dy/dt = -y`, componentwise. The analytic solution is `y0·e^(-t)`.
pub fn decay(y: &[f64], out: &mut [f64]) {
    for (o, v) in out.iter_mut().zip(y) {
        *o = -v;
    }
}

/// Unit harmonic oscillator on `[x, v]` pairs: `x' = v`, `v' = -x`.
pub fn harmonic(y: &[f64], out: &mut [f64]) {
    for (o, s) in out.chunks_exact_mut(2).zip(y.chunks_exact(2)) {
        o[0] = s[1];
        o[1] = -s[0];
    }
}

/// Poll `condition` every millisecond until it holds or `timeout` passes.
///
/// Returns whether the condition was observed.
pub fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    loop {
        if condition() {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        std::thread::sleep(Duration::from_millis(1));
    }
}
