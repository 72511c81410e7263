//! The host-side particle graph.

use std::ops::Range;

use hadron_core::{Link, OutputParameters, Parameters, ParticleInfo, StateLayout, Vector};
use hadron_engine::{Engine, EngineError};
use indexmap::IndexMap;
use rand::Rng;

use crate::error::SceneError;
use crate::zone::Zone;

/// Placement attempts per particle before the spacing rule is waived.
const MAX_PLACEMENT_ATTEMPTS: usize = 10_000;

/// A particle as the host sees it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneParticle<const D: usize> {
    /// Position.
    pub position: Vector<D>,
    /// Velocity.
    pub velocity: Vector<D>,
    /// Mass. Default: 1.
    pub mass: f64,
    /// Host-driven; the engine will not integrate it.
    pub fixed: bool,
}

impl<const D: usize> SceneParticle<D> {
    /// A free unit-mass particle at rest at `position`.
    pub fn at(position: impl Into<Vector<D>>) -> Self {
        Self {
            position: position.into(),
            velocity: Vector::zero(),
            mass: 1.0,
            fixed: false,
        }
    }
}

/// Flat buffers for [`Engine::start`].
#[derive(Clone, Debug, PartialEq)]
pub struct SceneBuffers {
    /// One position+velocity record per particle.
    pub particle_data: Vec<f64>,
    /// Mass and fixed flag per particle.
    pub infos: Vec<ParticleInfo>,
    /// Links in insertion order.
    pub links: Vec<Link>,
}

/// Key of a link: the unordered endpoint pair.
fn key(a: usize, b: usize) -> (usize, usize) {
    (a.min(b), a.max(b))
}

/// Particles plus links, with at most one link per unordered pair.
#[derive(Clone, Debug, Default)]
pub struct Scene<const D: usize> {
    particles: Vec<SceneParticle<D>>,
    links: IndexMap<(usize, usize), Link>,
    output: OutputParameters,
}

impl<const D: usize> Scene<D> {
    /// An empty scene.
    pub fn new() -> Self {
        Self {
            particles: Vec::new(),
            links: IndexMap::new(),
            output: OutputParameters::default(),
        }
    }

    /// All particles, indexed as in the engine buffers.
    pub fn particles(&self) -> &[SceneParticle<D>] {
        &self.particles
    }

    /// Mutable particle access (for dragging and pinning).
    pub fn particle_mut(&mut self, i: usize) -> Option<&mut SceneParticle<D>> {
        self.particles.get_mut(i)
    }

    /// Links in insertion order.
    pub fn links(&self) -> impl Iterator<Item = &Link> {
        self.links.values()
    }

    /// Number of links.
    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    /// Outputs received by the last [`refresh`](Scene::refresh).
    pub fn output(&self) -> &OutputParameters {
        &self.output
    }

    /// Append a particle and return its index.
    pub fn add_particle(&mut self, particle: SceneParticle<D>) -> usize {
        self.particles.push(particle);
        self.particles.len() - 1
    }

    /// Link `a` and `b` with unit strength.
    ///
    /// Returns `false` for a self-link, an out-of-range index, or a pair
    /// that is already linked in either order.
    pub fn add_link(&mut self, a: usize, b: usize) -> bool {
        if a == b || a >= self.particles.len() || b >= self.particles.len() {
            return false;
        }
        let k = key(a, b);
        if self.links.contains_key(&k) {
            return false;
        }
        self.links.insert(k, Link::new(a, b));
        true
    }

    /// The link between `a` and `b` in either order.
    pub fn find_link(&self, a: usize, b: usize) -> Option<&Link> {
        self.links.get(&key(a, b))
    }

    /// Remove the link between `a` and `b` in either order.
    pub fn remove_link(&mut self, a: usize, b: usize) -> bool {
        self.links.shift_remove(&key(a, b)).is_some()
    }

    /// Remove particle `i` and its links. Higher indices shift down by one.
    pub fn remove_particle(&mut self, i: usize) -> Option<SceneParticle<D>> {
        if i >= self.particles.len() {
            return None;
        }
        let removed = self.particles.remove(i);
        let shift = |x: usize| if x > i { x - 1 } else { x };
        self.links = self
            .links
            .drain(..)
            .filter(|(_, link)| link.a != i && link.b != i)
            .map(|(_, link)| {
                let link = Link {
                    a: shift(link.a),
                    b: shift(link.b),
                    strength: link.strength,
                };
                (key(link.a, link.b), link)
            })
            .collect();
        Some(removed)
    }

    /// Remove every particle and link.
    pub fn clear(&mut self) {
        self.particles.clear();
        self.links.clear();
    }

    /// Add `count` particles at rest, spread over `zone`, plus
    /// `link_count` distinct random links among them.
    ///
    /// Returns the index range of the new particles. A `count` whose pair
    /// count overflows `usize` is rejected as [`SceneError::TooManyLinks`].
    pub fn add_random_particles<R: Rng + ?Sized>(
        &mut self,
        count: usize,
        link_count: usize,
        zone: &Zone<D>,
        rng: &mut R,
    ) -> Result<Range<usize>, SceneError> {
        let max = count
            .checked_mul(count.saturating_sub(1))
            .map(|pairs| pairs / 2);
        match max {
            Some(max) if link_count <= max => {}
            _ => {
                return Err(SceneError::TooManyLinks {
                    particle_count: count,
                    link_count,
                    max: max.unwrap_or(usize::MAX),
                })
            }
        }

        let first = self.particles.len();
        let positions = spread(count, zone, rng);
        self.particles
            .extend(positions.into_iter().map(SceneParticle::at));

        let mut added = 0;
        while added < link_count {
            let a = first + rng.random_range(0..count);
            let b = first + rng.random_range(0..count);
            if self.add_link(a, b) {
                added += 1;
            }
        }

        log::debug!("added {count} random particles and {link_count} links");
        Ok(first..self.particles.len())
    }

    /// Re-place every particle in `zone` at rest.
    pub fn randomize_positions<R: Rng + ?Sized>(&mut self, zone: &Zone<D>, rng: &mut R) {
        let positions = spread(self.particles.len(), zone, rng);
        for (p, position) in self.particles.iter_mut().zip(positions) {
            p.position = position;
            p.velocity = Vector::zero();
        }
    }

    /// Export the scene in engine layout.
    pub fn buffers(&self) -> SceneBuffers {
        SceneBuffers {
            particle_data: self.particle_data(),
            infos: self.infos(),
            links: self.links.values().copied().collect(),
        }
    }

    /// Start `engine` on this scene.
    pub fn start(&self, engine: &mut Engine<D>, parameters: &Parameters) -> Result<(), EngineError> {
        let b = self.buffers();
        engine.start(parameters, &b.particle_data, &b.infos, &b.links)
    }

    /// Host side of a sync.
    ///
    /// Fixed particles are pushed to the engine; every other particle
    /// takes the engine's latest state. `parameters.output` and
    /// [`output`](Scene::output) receive the engine's run statistics.
    pub fn refresh(
        &mut self,
        engine: &Engine<D>,
        parameters: &mut Parameters,
    ) -> Result<(), EngineError> {
        let mut data = self.particle_data();
        let infos = self.infos();
        engine.sync(parameters, &mut data, &infos)?;
        for (i, p) in self.particles.iter_mut().enumerate() {
            if !p.fixed {
                p.position = StateLayout::<D>::position(&data, i);
                p.velocity = StateLayout::<D>::velocity(&data, i);
            }
        }
        self.output = parameters.output;
        Ok(())
    }

    fn particle_data(&self) -> Vec<f64> {
        let mut data = vec![0.0; StateLayout::<D>::buffer_len(self.particles.len())];
        for (i, p) in self.particles.iter().enumerate() {
            StateLayout::<D>::set_position(&mut data, i, p.position);
            StateLayout::<D>::set_velocity(&mut data, i, p.velocity);
        }
        data
    }

    fn infos(&self) -> Vec<ParticleInfo> {
        self.particles
            .iter()
            .map(|p| ParticleInfo {
                mass: p.mass,
                fixed: p.fixed,
            })
            .collect()
    }
}

/// `count` points in `zone`, each at least half the average spacing from
/// the points placed before it.
fn spread<const D: usize, R: Rng + ?Sized>(count: usize, zone: &Zone<D>, rng: &mut R) -> Vec<Vector<D>> {
    if count == 0 {
        return Vec::new();
    }
    let min_dist = zone.average_spacing(count) / 2.0;
    let mut placed: Vec<Vector<D>> = Vec::with_capacity(count);
    let mut waived = 0usize;
    for _ in 0..count {
        let mut candidate = zone.sample(rng);
        let mut attempts = 1;
        while placed.iter().any(|q| (*q - candidate).length() < min_dist) {
            if attempts >= MAX_PLACEMENT_ATTEMPTS {
                waived += 1;
                break;
            }
            candidate = zone.sample(rng);
            attempts += 1;
        }
        placed.push(candidate);
    }
    if waived > 0 {
        log::warn!("{waived} of {count} particles placed closer than {min_dist} after {MAX_PLACEMENT_ATTEMPTS} attempts");
    }
    placed
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    #[derive(Clone, Debug)]
    enum Edit {
        Link(usize, usize),
        Unlink(usize, usize),
        RemoveParticle(usize),
    }

    fn edit() -> impl Strategy<Value = Edit> {
        prop_oneof![
            (0..8usize, 0..8usize).prop_map(|(a, b)| Edit::Link(a, b)),
            (0..8usize, 0..8usize).prop_map(|(a, b)| Edit::Unlink(a, b)),
            (0..8usize).prop_map(Edit::RemoveParticle),
        ]
    }

    proptest! {
        #[test]
        fn links_stay_valid_and_unique(edits in prop::collection::vec(edit(), 0..64)) {
            let mut s = Scene::<2>::new();
            for i in 0..8 {
                s.add_particle(SceneParticle::at([i as f64, 0.0]));
            }
            for e in edits {
                match e {
                    Edit::Link(a, b) => { s.add_link(a, b); }
                    Edit::Unlink(a, b) => { s.remove_link(a, b); }
                    Edit::RemoveParticle(i) => { s.remove_particle(i); }
                }
            }

            let n = s.particles().len();
            let mut seen = std::collections::HashSet::new();
            for l in s.links() {
                prop_assert!(l.a != l.b);
                prop_assert!(l.a < n && l.b < n);
                prop_assert!(seen.insert((l.a.min(l.b), l.a.max(l.b))));
                prop_assert!(s.find_link(l.b, l.a).is_some());
            }
            prop_assert_eq!(s.link_count(), seen.len());
        }
    }
}
