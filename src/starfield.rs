use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;

use crate::colour::*;
use crate::vec3::*;

// a background star at a fixed direction on the celestial sphere
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StarPoint {
	pub direction: Vec3,// unit, from the observer towards the star
	pub colour: Colour3,
	pub brightness: f64,// intrinsic, roughly in [0, 1]
	pub temperature: f64,// kelvins
}

impl StarPoint {
	pub fn new(direction: Vec3, temperature: f64, brightness: f64) -> Self {
		StarPoint {
			direction: direction.normalized_or(Vec3::X),
			colour: Incandescant::new(temperature, 1.0).rgb(),
			brightness,
			temperature,
		}
	}
}

// same seed, same sky
pub fn generate(count: usize, seed: u64) -> Vec<StarPoint> {
	let mut rng = StdRng::seed_from_u64(seed);
	(0..count).map(|_| {
		let direction = Vec3::random_unit(&mut rng);
		// cool stars are far more common than hot ones
		let temperature = 2500.0 + 27500.0 * rng.gen::<f64>().powi(3);
		// many faint stars, a few bright ones
		let brightness = 0.15 + 0.85 * rng.gen::<f64>().powi(4);
		StarPoint::new(direction, temperature, brightness)
	}).collect()
}
