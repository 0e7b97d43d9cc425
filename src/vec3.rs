use std::ops::*;
use rand::Rng;
use serde::{Deserialize, Serialize};

// vector representing direction and length, where length can be any float
// serialized as a plain [x, y, z] array, which is how the solver sends positions
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 3]", into = "[f64; 3]")]
pub struct Vec3 {
	pub x: f64,
	pub y: f64,
	pub z: f64,
}

impl Default for Vec3 {
	fn default() -> Self {
		Vec3::new(0.0, 0.0, 0.0)
	}
}

impl From<[f64; 3]> for Vec3 {
	fn from(value: [f64; 3]) -> Self {
		Vec3::new(value[0], value[1], value[2])
	}
}

impl From<Vec3> for [f64; 3] {
	fn from(value: Vec3) -> Self {
		[value.x, value.y, value.z]
	}
}

impl Vec3 {
	pub const X: Vec3 = Vec3 {x: 1.0, y: 0.0, z: 0.0};
	pub const Y: Vec3 = Vec3 {x: 0.0, y: 1.0, z: 0.0};
	pub const Z: Vec3 = Vec3 {x: 0.0, y: 0.0, z: 1.0};

	pub fn grey(value: f64) -> Self {
		Colour3::new(value, value, value)
	}

	pub const fn new(x: f64, y: f64, z: f64) -> Self {
		Vec3 {x, y, z}
	}

	pub fn length_squared(self) -> f64 {
		self.dot(self)
	}

	pub fn length(self) -> f64 {
		self.length_squared().sqrt()
	}

	pub fn distance(self, other: Self) -> f64 {
		(self - other).length()
	}

	pub fn normalized(self) -> Self {
		self / self.length()
	}

	// unit vector, or the fallback when self is too short to have a direction
	pub fn normalized_or(self, fallback: Self) -> Self {
		let length = self.length();
		if length < 1e-12 || !length.is_finite() {
			fallback
		} else {
			self / length
		}
	}

	pub fn dot(self, other: Self) -> f64 {
		self.x*other.x + self.y*other.y + self.z*other.z
	}

	pub fn cross(self, other: Self) -> Self {
		Vec3::new(
			self.y*other.z - self.z*other.y,
			self.z*other.x - self.x*other.z,
			self.x*other.y - self.y*other.x,
		)
	}

	// per-axis linear interpolation, exact at f = 0 and f = 1
	pub fn lerp(self, other: Self, f: f64) -> Self {
		Vec3::new(
			lerp(self.x, other.x, f),
			lerp(self.y, other.y, f),
			lerp(self.z, other.z, f),
		)
	}

	pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
		Vec3::new(
			rng.gen_range(-1.0..1.0),
			rng.gen_range(-1.0..1.0),
			rng.gen_range(-1.0..1.0),
		)
	}

	// rejection sampling keeps the distribution uniform over the sphere
	pub fn random_unit<R: Rng + ?Sized>(rng: &mut R) -> Self {
		loop {
			let vector = Self::random(rng);
			if vector.length_squared() <= 1.0 && vector.length_squared() > 1e-160 {
				return vector.normalized();
			}
		}
	}

	pub fn add_gamma(self) -> Self {
		Colour3::new(
			linear_add_gamma(self.x),
			linear_add_gamma(self.y),
			linear_add_gamma(self.z),
		)
	}

	pub fn is_finite(self) -> bool {
		self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
	}

	// find the greatest component, mainly used for exposure adjustment
	pub fn max_component(self) -> f64 {
		let xy = if self.x > self.y {self.x} else {self.y};
		if xy > self.z {xy} else {self.z}
	}
}

// written as a + (b - a) * f would miss b at f = 1 by rounding
pub fn lerp(a: f64, b: f64, f: f64) -> f64 {
	(1.0 - f) * a + f * b
}

// add gamma for one channel, which is 1/2 in this case
fn linear_add_gamma(value: f64) -> f64 {
	if value < 0.0 {
		// clamp
		0.0
	} else {
		value.sqrt()
	}
}

impl Neg for Vec3 {
	type Output = Self;

	fn neg(self) -> Self {
		Vec3::new(-self.x, -self.y, -self.z)
	}
}

impl Add<Vec3> for Vec3 {
	type Output = Self;

	fn add(self, other: Self) -> Self {
		Vec3::new(self.x + other.x, self.y + other.y, self.z + other.z)
	}
}

impl AddAssign<Vec3> for Vec3 {
	fn add_assign(&mut self, other: Self) {
		*self = *self + other;
	}
}

impl Sub<Vec3> for Vec3 {
	type Output = Self;

	fn sub(self, other: Self) -> Self {
		Vec3::new(self.x - other.x, self.y - other.y, self.z - other.z)
	}
}

impl SubAssign<Vec3> for Vec3 {
	fn sub_assign(&mut self, other: Self) {
		*self = *self - other;
	}
}

impl Mul<f64> for Vec3 {
	type Output = Self;

	fn mul(self, other: f64) -> Self {
		Vec3::new(self.x * other, self.y * other, self.z * other)
	}
}

impl MulAssign<f64> for Vec3 {
	fn mul_assign(&mut self, other: f64) {
		*self = *self * other;
	}
}

impl Mul<Vec3> for f64 {
	type Output = Vec3;

	fn mul(self, other: Vec3) -> Vec3 {
		other * self
	}
}

impl Div<f64> for Vec3 {
	type Output = Self;

	fn div(self, other: f64) -> Self {
		Vec3::new(self.x / other, self.y / other, self.z / other)
	}
}

impl DivAssign<f64> for Vec3 {
	fn div_assign(&mut self, other: f64) {
		*self = *self / other;
	}
}

// type aliases
pub type Point3 = Vec3;
pub type Colour3 = Vec3;

#[cfg(test)]
mod tests {
	use super::*;
	use rand::SeedableRng;
	use rand::rngs::StdRng;

	#[test]
	fn lerp_hits_both_endpoints_exactly() {
		let a = Vec3::new(0.1, -3.7, 1e9);
		let b = Vec3::new(2.3, 0.7, -4.2e-3);
		assert_eq!(a.lerp(b, 0.0), a);
		assert_eq!(a.lerp(b, 1.0), b);
	}

	#[test]
	fn normalized_or_falls_back_for_zero_vector() {
		let fallback = Vec3::Z;
		assert_eq!(Vec3::default().normalized_or(fallback), fallback);
		let unit = Vec3::new(3.0, 0.0, 4.0).normalized_or(fallback);
		assert!((unit.length() - 1.0).abs() < 1e-12);
	}

	#[test]
	fn random_unit_vectors_cover_every_octant() {
		let mut rng = StdRng::seed_from_u64(7);
		let mut negative_x = false;
		let mut negative_z = false;
		for _ in 0..200 {
			let v = Vec3::random_unit(&mut rng);
			assert!((v.length() - 1.0).abs() < 1e-12);
			negative_x |= v.x < 0.0;
			negative_z |= v.z < 0.0;
		}
		assert!(negative_x && negative_z);
	}

	#[test]
	fn deserializes_from_plain_array() {
		let v: Vec3 = serde_json::from_str("[1.0, -2.5, 0.0]").unwrap();
		assert_eq!(v, Vec3::new(1.0, -2.5, 0.0));
	}
}
