use std::ops::Mul;
use crate::vec3::*;

// unit quaternion w + xi + yj + zk, used for camera orientation only
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Quat {
	pub w: f64,
	pub x: f64,
	pub y: f64,
	pub z: f64,
}

impl Default for Quat {
	fn default() -> Self {
		Quat::IDENTITY
	}
}

impl Quat {
	pub const IDENTITY: Quat = Quat {w: 1.0, x: 0.0, y: 0.0, z: 0.0};

	pub fn new(w: f64, x: f64, y: f64, z: f64) -> Self {
		Quat {w, x, y, z}
	}

	pub fn from_axis_angle(axis: Vec3, angle: f64) -> Self {
		let axis = axis.normalized();
		let (sin, cos) = (angle * 0.5).sin_cos();
		Quat::new(cos, axis.x * sin, axis.y * sin, axis.z * sin)
	}

	// rotation taking the camera's local -Z onto forward and local +Y towards up
	// the caller is responsible for up not being parallel to forward
	pub fn look_rotation(forward: Vec3, up: Vec3) -> Self {
		let back = -forward.normalized();
		let right = up.cross(back).normalized();
		let up = back.cross(right);
		Self::from_basis(right, up, back)
	}

	// columns of an orthonormal, right handed rotation matrix
	// Shepperd's method, branching on the largest diagonal term for stability
	pub fn from_basis(right: Vec3, up: Vec3, back: Vec3) -> Self {
		let (m00, m01, m02) = (right.x, up.x, back.x);
		let (m10, m11, m12) = (right.y, up.y, back.y);
		let (m20, m21, m22) = (right.z, up.z, back.z);
		let trace = m00 + m11 + m22;

		let q = if trace > 0.0 {
			let s = (trace + 1.0).sqrt() * 2.0;
			Quat::new(0.25 * s, (m21 - m12) / s, (m02 - m20) / s, (m10 - m01) / s)
		} else if m00 > m11 && m00 > m22 {
			let s = (1.0 + m00 - m11 - m22).sqrt() * 2.0;
			Quat::new((m21 - m12) / s, 0.25 * s, (m01 + m10) / s, (m02 + m20) / s)
		} else if m11 > m22 {
			let s = (1.0 + m11 - m00 - m22).sqrt() * 2.0;
			Quat::new((m02 - m20) / s, (m01 + m10) / s, 0.25 * s, (m12 + m21) / s)
		} else {
			let s = (1.0 + m22 - m00 - m11).sqrt() * 2.0;
			Quat::new((m10 - m01) / s, (m02 + m20) / s, (m12 + m21) / s, 0.25 * s)
		};
		q.normalized()
	}

	pub fn dot(self, other: Self) -> f64 {
		self.w*other.w + self.x*other.x + self.y*other.y + self.z*other.z
	}

	pub fn length(self) -> f64 {
		self.dot(self).sqrt()
	}

	pub fn normalized(self) -> Self {
		let length = self.length();
		if length < 1e-12 || !length.is_finite() {
			return Quat::IDENTITY;
		}
		Quat::new(self.w / length, self.x / length, self.y / length, self.z / length)
	}

	pub fn conjugate(self) -> Self {
		Quat::new(self.w, -self.x, -self.y, -self.z)
	}

	// shortest path spherical interpolation, t in [0, 1]
	pub fn slerp(self, other: Self, t: f64) -> Self {
		let mut dot = self.dot(other);
		let mut other = other;
		// q and -q are the same rotation, take the short way round
		if dot < 0.0 {
			other = Quat::new(-other.w, -other.x, -other.y, -other.z);
			dot = -dot;
		}
		let dot = dot.min(1.0);

		// nearly identical: sin(theta) would vanish, lerp is accurate enough
		if dot > 0.9995 {
			return Quat::new(
				lerp(self.w, other.w, t),
				lerp(self.x, other.x, t),
				lerp(self.y, other.y, t),
				lerp(self.z, other.z, t),
			).normalized();
		}

		let theta = dot.acos();
		let sin_theta = theta.sin();
		let a = ((1.0 - t) * theta).sin() / sin_theta;
		let b = (t * theta).sin() / sin_theta;
		Quat::new(
			a * self.w + b * other.w,
			a * self.x + b * other.x,
			a * self.y + b * other.y,
			a * self.z + b * other.z,
		).normalized()
	}

	pub fn rotate(self, v: Vec3) -> Vec3 {
		// v' = v + 2w(u x v) + 2u x (u x v)
		let u = Vec3::new(self.x, self.y, self.z);
		let t = 2.0 * u.cross(v);
		v + self.w * t + u.cross(t)
	}

	// angle between two orientations, in radians
	pub fn angle_to(self, other: Self) -> f64 {
		2.0 * self.dot(other).abs().min(1.0).acos()
	}

	pub fn forward(self) -> Vec3 {
		self.rotate(-Vec3::Z)
	}

	pub fn up(self) -> Vec3 {
		self.rotate(Vec3::Y)
	}

	pub fn right(self) -> Vec3 {
		self.rotate(Vec3::X)
	}
}

impl Mul for Quat {
	type Output = Self;

	fn mul(self, o: Self) -> Self {
		Quat::new(
			self.w*o.w - self.x*o.x - self.y*o.y - self.z*o.z,
			self.w*o.x + self.x*o.w + self.y*o.z - self.z*o.y,
			self.w*o.y - self.x*o.z + self.y*o.w + self.z*o.x,
			self.w*o.z + self.x*o.y - self.y*o.x + self.z*o.w,
		)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::f64::consts::FRAC_PI_2;

	const EPS: f64 = 1e-10;

	fn close(a: Vec3, b: Vec3) -> bool {
		(a - b).length() < EPS
	}

	#[test]
	fn look_rotation_points_forward_along_target() {
		for forward in [Vec3::X, -Vec3::X, Vec3::Z, -Vec3::Z, Vec3::new(1.0, 2.0, -3.0).normalized()] {
			let q = Quat::look_rotation(forward, Vec3::Y);
			assert!(close(q.forward(), forward), "{:?} vs {:?}", q.forward(), forward);
			assert!(q.up().dot(forward).abs() < EPS);
		}
	}

	#[test]
	fn slerp_halfway_is_half_the_angle() {
		let a = Quat::IDENTITY;
		let b = Quat::from_axis_angle(Vec3::Y, FRAC_PI_2);
		let mid = a.slerp(b, 0.5);
		assert!((a.angle_to(mid) - FRAC_PI_2 / 2.0).abs() < EPS);
		assert!((mid.angle_to(b) - FRAC_PI_2 / 2.0).abs() < EPS);
	}

	#[test]
	fn slerp_endpoints_are_exact_rotations() {
		let a = Quat::from_axis_angle(Vec3::X, 0.3);
		let b = Quat::from_axis_angle(Vec3::Z, 2.0);
		assert!(a.slerp(b, 0.0).angle_to(a) < 1e-7);
		assert!(a.slerp(b, 1.0).angle_to(b) < 1e-7);
	}

	#[test]
	fn rotation_matches_product_form() {
		let q = Quat::from_axis_angle(Vec3::Z, FRAC_PI_2);
		assert!(close(q.rotate(Vec3::X), Vec3::Y));
		let v = Vec3::new(0.2, -0.4, 0.9);
		let p = Quat::new(0.0, v.x, v.y, v.z);
		let r = q * p * q.conjugate();
		assert!(close(q.rotate(v), Vec3::new(r.x, r.y, r.z)));
	}
}
