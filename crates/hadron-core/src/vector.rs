//! Fixed-arity Euclidean vector.
//!
//! [`Vector<D>`] is a thin wrapper over `[f64; D]` with componentwise
//! arithmetic. Particle positions and velocities are stored as vectors;
//! in flat state buffers they appear as `D` consecutive `f64` values.

use std::ops::{Add, AddAssign, Index, IndexMut, Mul, MulAssign, Neg, Sub, SubAssign};

/// A `D`-component vector of `f64`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vector<const D: usize>(pub [f64; D]);

impl<const D: usize> Default for Vector<D> {
    fn default() -> Self {
        Self::zero()
    }
}

impl<const D: usize> Vector<D> {
    /// The zero vector.
    pub const fn zero() -> Self {
        Self([0.0; D])
    }

    /// Build a vector from its components.
    pub const fn new(components: [f64; D]) -> Self {
        Self(components)
    }

    /// Read `D` components from the front of `data`.
    ///
    /// # Panics
    ///
    /// Panics if `data` holds fewer than `D` values.
    #[inline]
    pub fn from_slice(data: &[f64]) -> Self {
        let mut v = [0.0; D];
        v.copy_from_slice(&data[..D]);
        Self(v)
    }

    /// Write the components into the front of `data`.
    ///
    /// # Panics
    ///
    /// Panics if `data` holds fewer than `D` values.
    #[inline]
    pub fn write_to(&self, data: &mut [f64]) {
        data[..D].copy_from_slice(&self.0);
    }

    /// Sum of squared components.
    #[inline]
    pub fn length_squared(&self) -> f64 {
        self.0.iter().map(|c| c * c).sum()
    }

    /// Euclidean norm.
    ///
    /// `length_squared()` is never negative for real inputs, so the root
    /// is always defined.
    #[inline]
    pub fn length(&self) -> f64 {
        self.length_squared().sqrt()
    }

    /// True if every component is finite.
    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|c| c.is_finite())
    }
}

impl<const D: usize> From<[f64; D]> for Vector<D> {
    fn from(components: [f64; D]) -> Self {
        Self(components)
    }
}

impl<const D: usize> Index<usize> for Vector<D> {
    type Output = f64;

    fn index(&self, axis: usize) -> &f64 {
        &self.0[axis]
    }
}

impl<const D: usize> IndexMut<usize> for Vector<D> {
    fn index_mut(&mut self, axis: usize) -> &mut f64 {
        &mut self.0[axis]
    }
}

impl<const D: usize> AddAssign for Vector<D> {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        for (a, b) in self.0.iter_mut().zip(other.0) {
            *a += b;
        }
    }
}

impl<const D: usize> SubAssign for Vector<D> {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        for (a, b) in self.0.iter_mut().zip(other.0) {
            *a -= b;
        }
    }
}

impl<const D: usize> MulAssign<f64> for Vector<D> {
    #[inline]
    fn mul_assign(&mut self, k: f64) {
        for a in self.0.iter_mut() {
            *a *= k;
        }
    }
}

impl<const D: usize> Add for Vector<D> {
    type Output = Self;

    #[inline]
    fn add(mut self, other: Self) -> Self {
        self += other;
        self
    }
}

impl<const D: usize> Sub for Vector<D> {
    type Output = Self;

    #[inline]
    fn sub(mut self, other: Self) -> Self {
        self -= other;
        self
    }
}

impl<const D: usize> Mul<f64> for Vector<D> {
    type Output = Self;

    #[inline]
    fn mul(mut self, k: f64) -> Self {
        self *= k;
        self
    }
}

impl<const D: usize> Mul<Vector<D>> for f64 {
    type Output = Vector<D>;

    #[inline]
    fn mul(self, v: Vector<D>) -> Vector<D> {
        v * self
    }
}

impl<const D: usize> Neg for Vector<D> {
    type Output = Self;

    fn neg(self) -> Self {
        self * -1.0
    }
}
