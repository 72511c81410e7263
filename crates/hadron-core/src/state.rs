//! Flat state-record layout.
//!
//! The solvers see the whole system as one `&[f64]`. Each particle
//! occupies a record of `2 * D` values: `D` position components followed
//! by `D` velocity components. [`StateLayout`] centralises the index
//! arithmetic so that the force model, the engine, and hosts agree on it.

use crate::error::LayoutError;
use crate::model::Particle;
use crate::vector::Vector;

/// Index helpers for a `D`-dimensional flat particle buffer.
#[derive(Clone, Copy, Debug, Default)]
pub struct StateLayout<const D: usize>;

impl<const D: usize> StateLayout<D> {
    /// Number of `f64` values per particle record.
    pub const RECORD_LEN: usize = 2 * D;

    /// Buffer length needed for `particle_count` particles.
    pub const fn buffer_len(particle_count: usize) -> usize {
        particle_count * Self::RECORD_LEN
    }

    /// Check that `data` holds exactly `particle_count` records.
    pub fn check(data: &[f64], particle_count: usize) -> Result<(), LayoutError> {
        let expected = Self::buffer_len(particle_count);
        if data.len() != expected {
            return Err(LayoutError::BufferLength {
                expected,
                actual: data.len(),
            });
        }
        Ok(())
    }

    /// Position of particle `i`.
    #[inline]
    pub fn position(data: &[f64], i: usize) -> Vector<D> {
        Vector::from_slice(&data[i * Self::RECORD_LEN..])
    }

    /// Velocity of particle `i`.
    #[inline]
    pub fn velocity(data: &[f64], i: usize) -> Vector<D> {
        Vector::from_slice(&data[i * Self::RECORD_LEN + D..])
    }

    /// Overwrite the position slot of particle `i`.
    #[inline]
    pub fn set_position(data: &mut [f64], i: usize, v: Vector<D>) {
        v.write_to(&mut data[i * Self::RECORD_LEN..]);
    }

    /// Overwrite the velocity slot of particle `i`.
    #[inline]
    pub fn set_velocity(data: &mut [f64], i: usize, v: Vector<D>) {
        v.write_to(&mut data[i * Self::RECORD_LEN + D..]);
    }

    /// The whole record of particle `i`.
    #[inline]
    pub fn record(data: &[f64], i: usize) -> &[f64] {
        &data[i * Self::RECORD_LEN..(i + 1) * Self::RECORD_LEN]
    }

    /// The whole record of particle `i`, mutably.
    #[inline]
    pub fn record_mut(data: &mut [f64], i: usize) -> &mut [f64] {
        &mut data[i * Self::RECORD_LEN..(i + 1) * Self::RECORD_LEN]
    }

    /// Read particle `i`.
    pub fn read(data: &[f64], i: usize) -> Particle<D> {
        Particle {
            position: Self::position(data, i),
            velocity: Self::velocity(data, i),
        }
    }

    /// Write particle `i`.
    pub fn write(data: &mut [f64], i: usize, particle: &Particle<D>) {
        Self::set_position(data, i, particle.position);
        Self::set_velocity(data, i, particle.velocity);
    }

    /// Flatten a particle slice into a new buffer.
    pub fn pack(particles: &[Particle<D>]) -> Vec<f64> {
        let mut data = vec![0.0; Self::buffer_len(particles.len())];
        for (i, p) in particles.iter().enumerate() {
            Self::write(&mut data, i, p);
        }
        data
    }

    /// Split a flat buffer back into particles.
    pub fn unpack(data: &[f64]) -> Result<Vec<Particle<D>>, LayoutError> {
        if D == 0 || data.len() % Self::RECORD_LEN != 0 {
            return Err(LayoutError::RaggedBuffer {
                len: data.len(),
                record_len: Self::RECORD_LEN,
            });
        }
        let n = data.len() / Self::RECORD_LEN;
        Ok((0..n).map(|i| Self::read(data, i)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type L2 = StateLayout<2>;

    #[test]
    fn record_order_is_position_then_velocity() {
        let p = Particle {
            position: Vector::new([1.0, 2.0]),
            velocity: Vector::new([3.0, 4.0]),
        };
        let data = L2::pack(&[Particle::default(), p]);
        assert_eq!(data, vec![0.0, 0.0, 0.0, 0.0, 1.0, 2.0, 3.0, 4.0]);
        assert_eq!(L2::record(&data, 1), &[1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn pack_unpack_preserves_particles() {
        let particles = vec![
            Particle {
                position: Vector::new([0.5, -1.5]),
                velocity: Vector::new([2.0, 0.0]),
            },
            Particle::at([9.0, 9.0]),
        ];
        let data = L2::pack(&particles);
        assert_eq!(L2::unpack(&data).unwrap(), particles);
    }

    #[test]
    fn check_rejects_wrong_length() {
        let data = vec![0.0; 7];
        assert_eq!(
            L2::check(&data, 2),
            Err(LayoutError::BufferLength {
                expected: 8,
                actual: 7
            })
        );
        assert!(L2::check(&data[..4], 1).is_ok());
    }

    #[test]
    fn unpack_rejects_ragged_buffer() {
        assert!(matches!(
            L2::unpack(&[0.0; 5]),
            Err(LayoutError::RaggedBuffer { len: 5, .. })
        ));
    }

    #[test]
    fn setters_touch_only_their_slot() {
        let mut data = vec![0.0; StateLayout::<3>::buffer_len(2)];
        StateLayout::<3>::set_velocity(&mut data, 1, Vector::new([1.0, 1.0, 1.0]));
        assert_eq!(&data[..9], &[0.0; 9]);
        assert_eq!(&data[9..], &[1.0, 1.0, 1.0]);
    }
}
