//! Axis-aligned placement zones.

use hadron_core::Vector;
use rand::Rng;

/// An axis-aligned box `[origin, origin + size)` in `D` dimensions.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Zone<const D: usize> {
    /// Lowest corner.
    pub origin: Vector<D>,
    /// Extent along each axis.
    pub size: Vector<D>,
}

impl<const D: usize> Zone<D> {
    /// A zone from its lowest corner and extent.
    pub fn new(origin: impl Into<Vector<D>>, size: impl Into<Vector<D>>) -> Self {
        Self {
            origin: origin.into(),
            size: size.into(),
        }
    }

    /// A zone of edge `extent` centred on the origin.
    pub fn centered(extent: f64) -> Self {
        Self {
            origin: Vector::new([-extent / 2.0; D]),
            size: Vector::new([extent; D]),
        }
    }

    /// Product of the extents.
    pub fn volume(&self) -> f64 {
        self.size.0.iter().product()
    }

    /// Average spacing of `count` particles spread evenly: `(volume/count)^(1/D)`.
    pub fn average_spacing(&self, count: usize) -> f64 {
        (self.volume() / count as f64).powf(1.0 / D as f64)
    }

    /// A uniformly distributed point inside the zone.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Vector<D> {
        let mut p = self.origin;
        for axis in 0..D {
            p[axis] += rng.random::<f64>() * self.size[axis];
        }
        p
    }

    /// True if `p` lies inside the zone.
    pub fn contains(&self, p: &Vector<D>) -> bool {
        (0..D).all(|axis| {
            let lo = self.origin[axis];
            p[axis] >= lo && p[axis] <= lo + self.size[axis]
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn spacing_matches_volume() {
        let zone = Zone::<2>::new([0.0, 0.0], [10.0, 40.0]);
        assert_eq!(zone.volume(), 400.0);
        assert!((zone.average_spacing(4) - 10.0).abs() < 1e-12);
        let cube = Zone::<3>::centered(2.0);
        assert!((cube.average_spacing(8) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn samples_stay_inside() {
        let zone = Zone::<3>::new([1.0, -2.0, 0.0], [0.5, 4.0, 3.0]);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..200 {
            assert!(zone.contains(&zone.sample(&mut rng)));
        }
    }
}
