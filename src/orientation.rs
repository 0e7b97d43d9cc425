use crate::quat::*;
use crate::vec3::*;

pub const PRIMARY_UP: Vec3 = Vec3::Y;
pub const FALLBACK_UP: Vec3 = Vec3::Z;

// camera that looks along the ship's velocity and eases towards it
#[derive(Clone, Debug)]
pub struct OrientationController {
	current: Quat,
	initialized: bool,
	slerp_fraction: f64,
	parallel_threshold: f64,
}

impl Default for OrientationController {
	fn default() -> Self {
		OrientationController::new(0.05, 0.99)
	}
}

impl OrientationController {
	pub fn new(slerp_fraction: f64, parallel_threshold: f64) -> Self {
		OrientationController {
			current: Quat::IDENTITY,
			initialized: false,
			slerp_fraction: slerp_fraction.clamp(0.0, 1.0),
			parallel_threshold,
		}
	}

	pub fn current(&self) -> Quat {
		self.current
	}

	pub fn is_initialized(&self) -> bool {
		self.initialized
	}

	// forget the smoothed orientation, next update snaps again
	pub fn reset(&mut self) {
		self.current = Quat::IDENTITY;
		self.initialized = false;
	}

	// look-at with an up axis that is never (anti)parallel to the view direction
	pub fn target_for(&self, direction: Vec3) -> Quat {
		let forward = direction.normalized_or(-Vec3::Z);
		let up = if forward.dot(PRIMARY_UP).abs() > self.parallel_threshold {
			FALLBACK_UP
		} else {
			PRIMARY_UP
		};
		Quat::look_rotation(forward, up)
	}

	// once per frame; the first call snaps, later calls move a fixed fraction of the way
	pub fn update(&mut self, velocity_direction: Vec3) -> Quat {
		let target = self.target_for(velocity_direction);
		if self.initialized {
			self.current = self.current.slerp(target, self.slerp_fraction);
		} else {
			self.current = target;
			self.initialized = true;
		}
		self.current
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn first_frame_snaps_to_target() {
		let mut controller = OrientationController::default();
		let q = controller.update(Vec3::X);
		assert!((q.forward() - Vec3::X).length() < 1e-10);
		assert!(controller.is_initialized());
	}

	#[test]
	fn reversal_is_smoothed_not_snapped() {
		let mut controller = OrientationController::default();
		controller.update(Vec3::X);
		// turnaround: velocity flips
		let q = controller.update(-Vec3::X);
		let turned = q.forward().dot(Vec3::X).clamp(-1.0, 1.0).acos();
		assert!(turned > 0.0 && turned < 0.2, "turned {turned} rad in one frame");

		let mut previous = turned;
		for _ in 0..400 {
			let q = controller.update(-Vec3::X);
			let angle = q.forward().dot(Vec3::X).clamp(-1.0, 1.0).acos();
			assert!(angle + 1e-9 >= previous);
			previous = angle;
		}
		assert!((controller.current().forward() + Vec3::X).length() < 1e-3);
	}

	#[test]
	fn each_step_covers_the_configured_fraction() {
		let mut controller = OrientationController::new(0.05, 0.99);
		controller.update(Vec3::X);
		let target = controller.target_for(-Vec3::Z);
		let before = controller.current().angle_to(target);
		controller.update(-Vec3::Z);
		let after = controller.current().angle_to(target);
		assert!((after - 0.95 * before).abs() < 1e-9);
	}

	#[test]
	fn vertical_velocity_uses_fallback_up() {
		let controller = OrientationController::default();
		for direction in [Vec3::Y, -Vec3::Y, Vec3::new(0.01, 1.0, 0.0).normalized()] {
			let q = controller.target_for(direction);
			assert!(q.forward().is_finite() && q.up().is_finite());
			assert!((q.forward() - direction).length() < 1e-10);
			assert!((q.length() - 1.0).abs() < 1e-12);
		}
	}

	#[test]
	fn reset_snaps_again() {
		let mut controller = OrientationController::default();
		controller.update(Vec3::X);
		controller.reset();
		let q = controller.update(Vec3::Z);
		assert!((q.forward() - Vec3::Z).length() < 1e-10);
	}
}
