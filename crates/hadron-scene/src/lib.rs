//! Host-side particle graph for driving a Hadron engine.
//!
//! A [`Scene`] owns the topology and the user-facing particle state:
//! it edits links and particles, generates random systems, exports the
//! flat buffers an [`Engine`](hadron_engine::Engine) starts from, and
//! performs the host half of every sync through [`Scene::refresh`].

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod scene;
pub mod zone;

pub use error::SceneError;
pub use scene::{Scene, SceneBuffers, SceneParticle};
pub use zone::Zone;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Deterministic generator for scene construction.
pub fn rng_from_seed(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}
