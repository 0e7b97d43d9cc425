use std::thread;
use serde::Serialize;

use crate::colour::*;
use crate::config::OpticsConfig;
use crate::interpolate::InterpolatedState;
use crate::relativity::*;
use crate::starfield::StarPoint;
use crate::vec3::*;

// below this the direction is treated as lying on the velocity axis
const AXIS_EPSILON: f64 = 1e-9;

// read-only per frame inputs, shared by every point
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct OpticalUniforms {
	pub beta: f64,
	pub gamma: f64,
	pub velocity_direction: Vec3,
}

impl OpticalUniforms {
	pub fn new(beta: f64, velocity_direction: Vec3) -> Self {
		let beta = clamp_beta(beta);
		OpticalUniforms {
			beta,
			gamma: lorentz_factor(beta),
			velocity_direction: velocity_direction.normalized_or(Vec3::X),
		}
	}

	pub fn at_rest() -> Self {
		Self::new(0.0, Vec3::X)
	}

	pub fn from_state(state: &InterpolatedState) -> Self {
		OpticalUniforms {
			beta: state.beta,
			gamma: state.gamma,
			velocity_direction: state.velocity_direction,
		}
	}
}

// how one point should be drawn this frame
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct PointAppearance {
	pub direction: Vec3,
	pub cos_theta: f64,
	pub doppler: f64,
	pub beaming: f64,
	pub colour: Colour3,
	pub size: f64,
	pub opacity: f64,
	pub brightness: f64,
}

// apparent direction of a point seen from the moving observer
// the angle to the velocity changes, the plane containing both stays the same
pub fn aberrate_direction(direction: Vec3, uniforms: &OpticalUniforms) -> Vec3 {
	if uniforms.beta == 0.0 {
		return direction;
	}
	let v = uniforms.velocity_direction;
	let cos_theta = direction.dot(v);
	let cos_prime = aberrate_cos(cos_theta, uniforms.beta);

	let perpendicular = direction - cos_theta * v;
	let sin_theta = perpendicular.length();
	if sin_theta < AXIS_EPSILON {
		return if cos_prime >= 0.0 {v} else {-v};
	}
	let sin_prime = (1.0 - cos_prime * cos_prime).max(0.0).sqrt();
	cos_prime * v + sin_prime * (perpendicular / sin_theta)
}

pub fn clamped_doppler(cos_theta: f64, uniforms: &OpticalUniforms, config: &OpticsConfig) -> f64 {
	doppler_factor(cos_theta, uniforms.beta, uniforms.gamma)
		.max(config.doppler_min)
		.min(config.doppler_max)
}

// intensity grows with the cube of the doppler factor
pub fn beaming_factor(doppler: f64, config: &OpticsConfig) -> f64 {
	doppler.powi(3).max(config.beaming_min).min(config.beaming_max)
}

// independent of every other point; safe to evaluate in any order or in parallel
pub fn transform_point(star: &StarPoint, uniforms: &OpticalUniforms, config: &OpticsConfig) -> PointAppearance {
	let cos_theta = star.direction.dot(uniforms.velocity_direction).clamp(-1.0, 1.0);
	let direction = aberrate_direction(star.direction, uniforms);
	let doppler = clamped_doppler(cos_theta, uniforms, config);
	let beaming = beaming_factor(doppler, config);
	let scale = beaming * star.brightness;

	PointAppearance {
		direction,
		cos_theta,
		doppler,
		beaming,
		colour: doppler_tint(star.colour, doppler),
		size: config.base_size * scale,
		opacity: (config.base_opacity * scale).clamp(0.0, 1.0),
		brightness: scale,
	}
}

pub fn transform_all(stars: &[StarPoint], uniforms: &OpticalUniforms, config: &OpticsConfig) -> Vec<PointAppearance> {
	stars.iter().map(|star| transform_point(star, uniforms, config)).collect()
}

// same results as transform_all, bit for bit, split over scoped threads
// thread k takes points k, k + threads, k + 2 * threads, ...
pub fn transform_all_parallel(
	stars: &[StarPoint],
	uniforms: &OpticalUniforms,
	config: &OpticsConfig,
	threads: usize,
) -> Vec<PointAppearance> {
	let threads = threads.clamp(1, stars.len().max(1));
	if threads == 1 {
		return transform_all(stars, uniforms, config);
	}

	let mut parts = Vec::with_capacity(threads);
	thread::scope(|s| {
		let mut handles = Vec::with_capacity(threads);
		for threadindex in 0..threads {
			handles.push(s.spawn(move || {
				stars.iter()
					.skip(threadindex)
					.step_by(threads)
					.map(|star| transform_point(star, uniforms, config))
					.collect::<Vec<_>>()
			}));
		}
		for handle in handles {
			match handle.join() {
				Ok(part) => parts.push(part),
				Err(panic) => std::panic::resume_unwind(panic),
			}
		}
	});

	// interleave back into the original order
	let mut result = Vec::with_capacity(stars.len());
	for index in 0..stars.len() {
		result.push(parts[index % threads][index / threads]);
	}
	result
}

// hermite ramp between two edges, 0 below the first and 1 above the second
pub fn smoothstep(edge0: f64, edge1: f64, x: f64) -> f64 {
	if edge1 <= edge0 {
		return if x < edge0 {0.0} else {1.0};
	}
	let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
	t * t * (3.0 - 2.0 * t)
}

// radial streaks along the direction of travel, a separate effect from the star transform
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct WarpStreaks {
	pub intensity: f64,
	pub direction: Vec3,
}

impl WarpStreaks {
	pub fn for_frame(uniforms: &OpticalUniforms, config: &OpticsConfig) -> Self {
		WarpStreaks {
			intensity: warp_intensity(uniforms.beta, config),
			direction: uniforms.velocity_direction,
		}
	}

	pub fn active(&self) -> bool {
		self.intensity > 0.0
	}
}

pub fn warp_intensity(beta: f64, config: &OpticsConfig) -> f64 {
	if beta <= config.warp_threshold {
		0.0
	} else {
		smoothstep(config.warp_threshold, config.warp_full, beta)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::starfield;

	fn config() -> OpticsConfig {
		OpticsConfig::default()
	}

	#[test]
	fn rest_frame_is_identity() {
		let uniforms = OpticalUniforms::at_rest();
		for star in starfield::generate(200, 5) {
			let out = transform_point(&star, &uniforms, &config());
			assert_eq!(out.direction, star.direction);
			assert_eq!(out.doppler, 1.0);
			assert_eq!(out.beaming, 1.0);
			assert_eq!(out.colour, star.colour);
		}
	}

	#[test]
	fn ahead_is_blueshifted_and_behind_redshifted() {
		let uniforms = OpticalUniforms::new(MAX_BETA, Vec3::X);
		let ahead = StarPoint::new(Vec3::X, 6000.0, 1.0);
		let behind = StarPoint::new(-Vec3::X, 6000.0, 1.0);
		let a = transform_point(&ahead, &uniforms, &config());
		let b = transform_point(&behind, &uniforms, &config());
		assert!(a.doppler > b.doppler);
		assert_eq!(a.doppler, config().doppler_max);
		assert_eq!(b.doppler, config().doppler_min);
		assert_eq!(a.beaming, config().beaming_max);
		assert_eq!(b.beaming, config().beaming_min);
		assert_eq!(a.colour, BLUE_WHITE);
		// 1 - 0.1 of the way to red
		assert!((b.colour - behind.colour.lerp(DEEP_RED, 0.9)).length() < 1e-12);
	}

	#[test]
	fn doppler_matches_closed_form_inside_clamp() {
		let uniforms = OpticalUniforms::new(0.6, Vec3::Z);
		// gamma = 1.25, head on: 1 / (1.25 * 0.4) = 2
		let out = transform_point(&StarPoint::new(Vec3::Z, 6000.0, 0.5), &uniforms, &config());
		assert!((out.doppler - 2.0).abs() < 1e-12);
		assert!((out.beaming - 8.0).abs() < 1e-12);
		assert!((out.brightness - 4.0).abs() < 1e-12);
		assert!((out.size - 4.0).abs() < 1e-12);
		assert_eq!(out.opacity, 1.0);
	}

	#[test]
	fn aberrated_direction_stays_unit_and_in_plane() {
		let uniforms = OpticalUniforms::new(0.8, Vec3::new(1.0, 1.0, 0.0));
		for star in starfield::generate(300, 11) {
			let out = aberrate_direction(star.direction, &uniforms);
			assert!((out.length() - 1.0).abs() < 1e-9);
			let expected = aberrate_cos(star.direction.dot(uniforms.velocity_direction), uniforms.beta);
			assert!((out.dot(uniforms.velocity_direction) - expected).abs() < 1e-9);
			// the velocity, the original and the aberrated direction are coplanar
			let normal = star.direction.cross(uniforms.velocity_direction);
			assert!(out.dot(normal).abs() < 1e-9);
		}
	}

	#[test]
	fn axis_points_stay_on_axis() {
		let uniforms = OpticalUniforms::new(0.9, Vec3::Y);
		assert_eq!(aberrate_direction(Vec3::Y, &uniforms), Vec3::Y);
		assert_eq!(aberrate_direction(-Vec3::Y, &uniforms), -Vec3::Y);
	}

	#[test]
	fn parallel_matches_sequential_bit_for_bit() {
		let stars = starfield::generate(1001, 2);
		let uniforms = OpticalUniforms::new(0.73, Vec3::new(0.3, -0.2, 0.9));
		let sequential = transform_all(&stars, &uniforms, &config());
		for threads in [1, 2, 3, 8, 64] {
			assert_eq!(transform_all_parallel(&stars, &uniforms, &config(), threads), sequential);
		}
		assert!(transform_all_parallel(&[], &uniforms, &config(), 4).is_empty());
	}

	#[test]
	fn warp_gate_ramps_smoothly_above_threshold() {
		let config = config();
		assert_eq!(warp_intensity(0.0, &config), 0.0);
		assert_eq!(warp_intensity(config.warp_threshold, &config), 0.0);
		assert_eq!(warp_intensity(config.warp_full, &config), 1.0);
		let mut previous = 0.0;
		for step in 0..=100 {
			let beta = config.warp_threshold + step as f64 * (config.warp_full - config.warp_threshold) / 100.0;
			let intensity = warp_intensity(beta, &config);
			assert!(intensity >= previous);
			previous = intensity;
		}
		let streaks = WarpStreaks::for_frame(&OpticalUniforms::new(0.2, Vec3::X), &config);
		assert!(!streaks.active());
		let streaks = WarpStreaks::for_frame(&OpticalUniforms::new(0.6, Vec3::X), &config);
		assert!(streaks.active());
		assert_eq!(streaks.direction, Vec3::X);
	}
}
