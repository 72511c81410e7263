//! Benchmark profiles for the Hadron particle engine.
//!
//! - [`cloud_profile`]: a seeded random cloud with a sparse link graph
//! - [`kernel_derivative`]: the pairwise kernel as a solver derivative

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use hadron_core::{Link, Parameters, ParticleInfo};
use hadron_engine::{ForceContext, ForceModel, PairwiseForce};
use hadron_scene::{rng_from_seed, Scene, SceneBuffers, Zone};

/// Flat buffers and parameters for a benchmark system.
pub struct Profile {
    /// Parameters with host defaults.
    pub parameters: Parameters,
    /// Engine-layout particle records.
    pub particle_data: Vec<f64>,
    /// Mass and fixed flag per particle.
    pub infos: Vec<ParticleInfo>,
    /// Link topology.
    pub links: Vec<Link>,
}

/// `count` particles spread over a cube sized for unit average spacing,
/// with `count` random links. Particle 0 is fixed.
pub fn cloud_profile<const D: usize>(count: usize, seed: u64) -> Profile {
    let extent = (count as f64).powf(1.0 / D as f64);
    let links = count.min(count * count.saturating_sub(1) / 2);

    let mut scene = Scene::<D>::new();
    let mut rng = rng_from_seed(seed);
    scene
        .add_random_particles(count, links, &Zone::centered(extent), &mut rng)
        .unwrap();
    if let Some(p) = scene.particle_mut(0) {
        p.fixed = true;
    }

    let SceneBuffers {
        particle_data,
        infos,
        links,
    } = scene.buffers();
    Profile {
        parameters: Parameters::default(),
        particle_data,
        infos,
        links,
    }
}

/// The reference kernel over `profile`, shaped for a solver.
pub fn kernel_derivative<const D: usize>(
    profile: &Profile,
) -> impl FnMut(&[f64], &mut [f64]) + '_ {
    let mut kernel = PairwiseForce;
    move |state: &[f64], out: &mut [f64]| {
        let ctx = ForceContext {
            params: &profile.parameters.input,
            infos: &profile.infos,
            links: &profile.links,
        };
        ForceModel::<D>::calculate(&mut kernel, &ctx, state, out);
    }
}
