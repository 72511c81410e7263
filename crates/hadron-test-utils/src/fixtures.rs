//! Particle systems for engine and force-model tests.
//!
//! - [`two_particles`]: particle 0 pinned at the origin, particle 1 free.
//! - [`random_cloud`]: a seeded cloud with a chain of links.

use hadron_core::{Link, Parameters, Particle, ParticleInfo, StateLayout, Vector};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Everything `Engine::start` needs, in owned form.
#[derive(Clone, Debug)]
pub struct SystemFixture<const D: usize> {
    pub parameters: Parameters,
    pub particle_data: Vec<f64>,
    pub infos: Vec<ParticleInfo>,
    pub links: Vec<Link>,
}

impl<const D: usize> SystemFixture<D> {
    pub fn particle_count(&self) -> usize {
        self.infos.len()
    }

    pub fn position(&self, i: usize) -> Vector<D> {
        StateLayout::<D>::position(&self.particle_data, i)
    }

    pub fn velocity(&self, i: usize) -> Vector<D> {
        StateLayout::<D>::velocity(&self.particle_data, i)
    }
}

/// Particle 0 fixed at the origin, particle 1 free at distance 1 on axis 0,
/// joined by one link.
pub fn two_particles<const D: usize>() -> SystemFixture<D> {
    let mut far = Vector::<D>::zero();
    far[0] = 1.0;
    let particles = [Particle::<D>::default(), Particle::at(far)];
    SystemFixture {
        parameters: Parameters::default(),
        particle_data: StateLayout::<D>::pack(&particles),
        infos: vec![
            ParticleInfo {
                mass: 1.0,
                fixed: true,
            },
            ParticleInfo::default(),
        ],
        links: vec![Link::new(0, 1)],
    }
}

/// `count` free particles at seeded positions in `[-extent, extent]^D`,
/// linked in a chain `0-1-2-...`.
pub fn random_cloud<const D: usize>(count: usize, extent: f64, seed: u64) -> SystemFixture<D> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let particles: Vec<Particle<D>> = (0..count)
        .map(|_| {
            let mut p = Vector::<D>::zero();
            for c in p.0.iter_mut() {
                *c = rng.random_range(-extent..=extent);
            }
            Particle::at(p)
        })
        .collect();
    SystemFixture {
        parameters: Parameters::default(),
        particle_data: StateLayout::<D>::pack(&particles),
        infos: vec![ParticleInfo::default(); count],
        links: (1..count).map(|i| Link::new(i - 1, i)).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_particles_layout() {
        let f = two_particles::<2>();
        assert_eq!(f.particle_count(), 2);
        assert_eq!(f.particle_data, vec![0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0]);
        assert!(f.infos[0].fixed);
        assert!(!f.infos[1].fixed);
    }

    #[test]
    fn random_cloud_is_seeded() {
        let a = random_cloud::<3>(8, 5.0, 42);
        let b = random_cloud::<3>(8, 5.0, 42);
        assert_eq!(a.particle_data, b.particle_data);
        assert_eq!(a.links.len(), 7);
        for i in 0..8 {
            assert!(a.position(i).0.iter().all(|c| c.abs() <= 5.0));
            assert_eq!(a.velocity(i), Vector::zero());
        }
    }
}
