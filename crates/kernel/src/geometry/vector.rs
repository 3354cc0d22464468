use approx::{AbsDiffEq, RelativeEq};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Neg, Sub};

/// A point or direction in 3D Euclidean space.
///
/// Thin value wrapper over [`nalgebra::Vector3`]. Every operation returns a
/// new value. Serializes as a plain `[x, y, z]` triple.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 3]", into = "[f64; 3]")]
pub struct Vec3(Vector3<f64>);

impl Vec3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self(Vector3::new(x, y, z))
    }

    pub fn zero() -> Self {
        Self(Vector3::zeros())
    }

    pub fn unit_x() -> Self {
        Self::new(1.0, 0.0, 0.0)
    }

    pub fn unit_y() -> Self {
        Self::new(0.0, 1.0, 0.0)
    }

    pub fn unit_z() -> Self {
        Self::new(0.0, 0.0, 1.0)
    }

    pub fn x(&self) -> f64 {
        self.0.x
    }

    pub fn y(&self) -> f64 {
        self.0.y
    }

    pub fn z(&self) -> f64 {
        self.0.z
    }

    pub fn scale(&self, s: f64) -> Self {
        Self(self.0 * s)
    }

    pub fn dot(&self, other: &Self) -> f64 {
        self.0.dot(&other.0)
    }

    pub fn cross(&self, other: &Self) -> Self {
        Self(self.0.cross(&other.0))
    }

    pub fn length(&self) -> f64 {
        self.0.norm()
    }

    pub fn length_squared(&self) -> f64 {
        self.0.norm_squared()
    }

    /// Unit vector in the same direction.
    ///
    /// A zero vector yields NaN components; callers own input quality.
    pub fn normalize(&self) -> Self {
        Self(self.0 / self.0.norm())
    }

    pub fn distance(&self, other: &Self) -> f64 {
        (self.0 - other.0).norm()
    }

    /// Component-wise mean of two vectors.
    pub fn average(&self, other: &Self) -> Self {
        Self((self.0 + other.0) * 0.5)
    }

    /// Component-wise mean of a set of vectors. Empty input yields NaN.
    pub fn mean(vectors: &[Vec3]) -> Self {
        let sum = vectors.iter().fold(Vector3::zeros(), |acc, v| acc + v.0);
        Self(sum / vectors.len() as f64)
    }

    /// Point reflection of `self` through `center`.
    pub fn mirror_around(&self, center: &Self) -> Self {
        Self(center.0 * 2.0 - self.0)
    }

    pub fn lerp(&self, other: &Self, t: f64) -> Self {
        Self(self.0.lerp(&other.0, t))
    }

    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|c| c.is_finite())
    }

    pub fn to_array(&self) -> [f64; 3] {
        [self.0.x, self.0.y, self.0.z]
    }

    pub fn from_array(arr: [f64; 3]) -> Self {
        Self::new(arr[0], arr[1], arr[2])
    }

    pub fn as_nalgebra(&self) -> &Vector3<f64> {
        &self.0
    }
}

impl From<[f64; 3]> for Vec3 {
    fn from(arr: [f64; 3]) -> Self {
        Self::from_array(arr)
    }
}

impl From<Vec3> for [f64; 3] {
    fn from(v: Vec3) -> Self {
        v.to_array()
    }
}

impl From<Vector3<f64>> for Vec3 {
    fn from(v: Vector3<f64>) -> Self {
        Self(v)
    }
}

impl Add for Vec3 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Vec3 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl Mul<f64> for Vec3 {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self::Output {
        Self(self.0 * rhs)
    }
}

impl Mul<Vec3> for f64 {
    type Output = Vec3;
    fn mul(self, rhs: Vec3) -> Self::Output {
        Vec3(rhs.0 * self)
    }
}

impl Neg for Vec3 {
    type Output = Self;
    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

impl AbsDiffEq for Vec3 {
    type Epsilon = f64;

    fn default_epsilon() -> f64 {
        f64::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: f64) -> bool {
        self.0.abs_diff_eq(&other.0, epsilon)
    }
}

impl RelativeEq for Vec3 {
    fn default_max_relative() -> f64 {
        f64::default_max_relative()
    }

    fn relative_eq(&self, other: &Self, epsilon: f64, max_relative: f64) -> bool {
        self.0.relative_eq(&other.0, epsilon, max_relative)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_cross_product() {
        let result = Vec3::unit_x().cross(&Vec3::unit_y());
        assert_abs_diff_eq!(result, Vec3::unit_z(), epsilon = 1e-12);
    }

    #[test]
    fn test_normalize() {
        let n = Vec3::new(3.0, 0.0, 4.0).normalize();
        assert_abs_diff_eq!(n.length(), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(n, Vec3::new(0.6, 0.0, 0.8), epsilon = 1e-12);
    }

    #[test]
    fn test_normalize_zero_is_not_finite() {
        assert!(!Vec3::zero().normalize().is_finite());
    }

    #[test]
    fn test_distance() {
        let a = Vec3::new(1.0, 0.0, 0.0);
        let b = Vec3::new(4.0, 4.0, 0.0);
        assert_abs_diff_eq!(a.distance(&b), 5.0, epsilon = 1e-12);
    }

    #[test]
    fn test_mirror_around() {
        let p = Vec3::new(1.0, 2.0, 3.0);
        let c = Vec3::new(2.0, 2.0, 2.0);
        assert_abs_diff_eq!(p.mirror_around(&c), Vec3::new(3.0, 2.0, 1.0), epsilon = 1e-12);
    }

    #[test]
    fn test_mean() {
        let m = Vec3::mean(&[Vec3::unit_x(), Vec3::unit_y(), Vec3::zero(), Vec3::new(1.0, 1.0, 4.0)]);
        assert_abs_diff_eq!(m, Vec3::new(0.5, 0.5, 1.0), epsilon = 1e-12);
    }
}
