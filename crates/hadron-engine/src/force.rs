//! Force models: full state in, time-derivative out.
//!
//! A [`ForceModel`] maps the flat state buffer (see
//! [`StateLayout`](hadron_core::StateLayout)) to its derivative. The
//! engine calls it zero or more times per solver step, so it dominates
//! run time. [`PairwiseForce`] is the reference CPU kernel; an
//! accelerated kernel plugs in behind the same trait.

use hadron_core::{InputParameters, Link, ParticleInfo, StateLayout, Vector};

/// Everything a force model reads besides the state itself.
#[derive(Clone, Copy, Debug)]
pub struct ForceContext<'a> {
    /// Live input parameters.
    pub params: &'a InputParameters,
    /// Per-particle mass and fixed flag, indexed like the state records.
    pub infos: &'a [ParticleInfo],
    /// Link topology.
    pub links: &'a [Link],
}

/// Strategy computing `d(state)/dt` for a `D`-dimensional system.
///
/// # Contract
///
/// - `inputs` and `outputs` both hold `ctx.infos.len()` records.
/// - `outputs` is overwritten, never accumulated into.
/// - The position slot of each output record is the input velocity.
pub trait ForceModel<const D: usize>: Send {
    /// Short name for logging.
    fn name(&self) -> &'static str;

    /// Write the derivative of `inputs` into `outputs`.
    fn calculate(&mut self, ctx: &ForceContext<'_>, inputs: &[f64], outputs: &mut [f64]);
}

/// Pairwise power-law interaction, power-law springs along links, linear
/// damping, and constant axis-0 gravity and stretch bias.
///
/// Every unordered pair is visited once and both endpoints are updated in
/// the same pass, so the cost is `N(N-1)/2` distance evaluations.
///
/// The displacement vector itself is scaled by `attraction · d^(power-1)`,
/// giving a magnitude of `attraction · d^power`. Coincident particles make
/// `d = 0` and the result non-finite; this is not guarded.
#[derive(Clone, Copy, Debug, Default)]
pub struct PairwiseForce;

#[inline]
fn add_velocity<const D: usize>(data: &mut [f64], i: usize, dv: Vector<D>) {
    let v = StateLayout::<D>::velocity(data, i) + dv;
    StateLayout::<D>::set_velocity(data, i, v);
}

impl<const D: usize> ForceModel<D> for PairwiseForce {
    fn name(&self) -> &'static str {
        "pairwise"
    }

    fn calculate(&mut self, ctx: &ForceContext<'_>, inputs: &[f64], outputs: &mut [f64]) {
        let p = ctx.params;
        let n = ctx.infos.len();

        for i in 0..n {
            StateLayout::<D>::set_velocity(outputs, i, Vector::zero());
        }

        for i in 0..n {
            let pi = StateLayout::<D>::position(inputs, i);
            let mi = ctx.infos[i].mass;
            for j in (i + 1)..n {
                let mut v = StateLayout::<D>::position(inputs, j) - pi;
                let d = v.length();
                v *= p.particle_attraction * d.powf(p.particle_power - 1.0);
                add_velocity(outputs, i, v * ctx.infos[j].mass);
                add_velocity(outputs, j, -(v * mi));
            }
        }

        for i in 0..n {
            let mut acc = StateLayout::<D>::velocity(outputs, i)
                - StateLayout::<D>::velocity(inputs, i) * p.viscosity;
            if D > 0 {
                acc[0] += p.gravity;
            }
            StateLayout::<D>::set_velocity(outputs, i, acc);
        }

        for link in ctx.links {
            let (a, b) = (link.a, link.b);
            let mut v = StateLayout::<D>::position(inputs, b) - StateLayout::<D>::position(inputs, a);
            let d = v.length();
            v *= p.link_attraction * link.strength / d.powf(p.link_power - 1.0);
            let mut da = v * ctx.infos[b].mass;
            let mut db = -(v * ctx.infos[a].mass);
            if D > 0 {
                da[0] -= p.stretch_attraction;
                db[0] += p.stretch_attraction;
            }
            add_velocity(outputs, a, da);
            add_velocity(outputs, b, db);
        }

        for i in 0..n {
            let v = StateLayout::<D>::velocity(inputs, i);
            StateLayout::<D>::set_position(outputs, i, v);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hadron_core::Particle;
    use proptest::prelude::*;

    fn quiet() -> InputParameters {
        InputParameters {
            viscosity: 0.0,
            particle_attraction: 0.0,
            link_attraction: 0.0,
            ..InputParameters::default()
        }
    }

    fn derive<const D: usize>(
        params: &InputParameters,
        infos: &[ParticleInfo],
        links: &[Link],
        particles: &[Particle<D>],
    ) -> Vec<Particle<D>> {
        let inputs = StateLayout::<D>::pack(particles);
        let mut outputs = vec![f64::NAN; inputs.len()];
        let ctx = ForceContext {
            params,
            infos,
            links,
        };
        ForceModel::<D>::calculate(&mut PairwiseForce, &ctx, &inputs, &mut outputs);
        StateLayout::<D>::unpack(&outputs).unwrap()
    }

    #[test]
    fn position_derivative_is_velocity() {
        let particles = [Particle::<2> {
            position: Vector::new([1.0, 1.0]),
            velocity: Vector::new([0.5, -2.0]),
        }];
        let out = derive(&quiet(), &[ParticleInfo::default()], &[], &particles);
        assert_eq!(out[0].position, Vector::new([0.5, -2.0]));
        assert_eq!(out[0].velocity, Vector::zero());
    }

    #[test]
    fn viscosity_and_gravity() {
        let params = InputParameters {
            viscosity: 2.0,
            gravity: -9.8,
            ..quiet()
        };
        let particles = [Particle::<2> {
            position: Vector::zero(),
            velocity: Vector::new([1.0, 3.0]),
        }];
        let out = derive(&params, &[ParticleInfo::default()], &[], &particles);
        assert_eq!(out[0].velocity, Vector::new([-2.0 - 9.8, -6.0]));
    }

    #[test]
    fn pairwise_uses_raw_displacement_scaling() {
        // d = 2, power -2: v * (-1 * 2^-3) = (2, 0) * -0.125.
        let params = InputParameters {
            particle_attraction: -1.0,
            particle_power: -2.0,
            ..quiet()
        };
        let particles = [Particle::<2>::at([0.0, 0.0]), Particle::at([2.0, 0.0])];
        let infos = [
            ParticleInfo {
                mass: 3.0,
                fixed: false,
            },
            ParticleInfo {
                mass: 5.0,
                fixed: false,
            },
        ];
        let out = derive(&params, &infos, &[], &particles);
        // Each side is weighted by the other particle's mass.
        assert_eq!(out[0].velocity, Vector::new([-0.25 * 5.0, 0.0]));
        assert_eq!(out[1].velocity, Vector::new([0.25 * 3.0, 0.0]));
    }

    #[test]
    fn link_spring_and_stretch() {
        // d = 2, link_power -1: scale = 10 * 0.5 / 2^-2 = 20.
        let params = InputParameters {
            link_attraction: 10.0,
            link_power: -1.0,
            stretch_attraction: 1.5,
            ..quiet()
        };
        let particles = [Particle::<2>::at([0.0, 0.0]), Particle::at([0.0, 2.0])];
        let links = [Link {
            a: 0,
            b: 1,
            strength: 0.5,
        }];
        let infos = [ParticleInfo::default(); 2];
        let out = derive(&params, &infos, &links, &particles);
        assert_eq!(out[0].velocity, Vector::new([-1.5, 40.0]));
        assert_eq!(out[1].velocity, Vector::new([1.5, -40.0]));
    }

    #[test]
    fn outputs_are_overwritten() {
        let particles = [Particle::<1>::at([0.0]), Particle::at([1.0])];
        let infos = [ParticleInfo::default(); 2];
        let inputs = StateLayout::<1>::pack(&particles);
        let mut outputs = vec![123.0; inputs.len()];
        let params = quiet();
        let ctx = ForceContext {
            params: &params,
            infos: &infos,
            links: &[],
        };
        ForceModel::<1>::calculate(&mut PairwiseForce, &ctx, &inputs, &mut outputs);
        assert_eq!(outputs, vec![0.0; 4]);
    }

    #[test]
    fn coincident_particles_are_not_guarded() {
        let particles = [Particle::<2>::at([1.0, 1.0]), Particle::at([1.0, 1.0])];
        let out = derive(
            &InputParameters::default(),
            &[ParticleInfo::default(); 2],
            &[],
            &particles,
        );
        assert!(!out[0].velocity.is_finite());
    }

    proptest! {
        #[test]
        fn pairwise_momentum_is_conserved(
            ax in -10.0f64..10.0, ay in -10.0f64..10.0,
            bx in -10.0f64..10.0, by in -10.0f64..10.0,
            attraction in -5.0f64..5.0,
            power in -3.0f64..2.0,
        ) {
            let a = Vector::new([ax, ay]);
            let b = Vector::new([bx, by]);
            prop_assume!((b - a).length() > 1e-3);
            let params = InputParameters {
                particle_attraction: attraction,
                particle_power: power,
                ..quiet()
            };
            let out = derive(
                &params,
                &[ParticleInfo::default(); 2],
                &[],
                &[Particle::at(a), Particle::at(b)],
            );
            let total = out[0].velocity + out[1].velocity;
            let scale = out[0].velocity.length().max(1.0);
            prop_assert!(total.length() <= 1e-12 * scale, "net = {:?}", total);
        }
    }
}
