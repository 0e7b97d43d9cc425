use crate::vec3::*;

// units are years and astronomical units, so c is not 1 here
// c in AU per Julian year: 299792458 m/s * 31557600 s / 1.496e11 m
pub const SPEED_OF_LIGHT: f64 = 299_792_458.0 * YEAR_S / AU_M;
pub const YEAR_S: f64 = 365.25 * 24.0 * 3600.0;
pub const AU_M: f64 = 1.496e11;
pub const SPEED_OF_LIGHT_SI: f64 = 299_792_458.0;
pub const STANDARD_GRAVITY: f64 = 9.80665;// m/s^2

// beta never reaches 1, gamma stays finite (about 70.7 at the bound)
pub const MAX_BETA: f64 = 0.9999;

// the only way beta gets into gamma; NaN collapses to rest
pub fn clamp_beta(beta: f64) -> f64 {
	if beta.is_nan() {
		0.0
	} else {
		beta.clamp(0.0, MAX_BETA)
	}
}

pub fn lorentz_factor(beta: f64) -> f64 {
	let beta = clamp_beta(beta);
	1.0 / (1.0 - beta * beta).sqrt()
}

// proper time on a constant velocity segment: dtau = dt / gamma
pub fn proper_time_elapsed(beta: f64, coord_time_delta: f64) -> f64 {
	coord_time_delta / lorentz_factor(beta)
}

// (gamma - 1) m c^2, SI units
pub fn kinetic_energy(beta: f64, mass_kg: f64) -> f64 {
	(lorentz_factor(beta) - 1.0) * mass_kg * SPEED_OF_LIGHT_SI * SPEED_OF_LIGHT_SI
}

// gamma m beta c, SI units
pub fn momentum(beta: f64, mass_kg: f64) -> f64 {
	lorentz_factor(beta) * mass_kg * clamp_beta(beta) * SPEED_OF_LIGHT_SI
}

// rapidities add linearly for collinear boosts, velocities do not
pub fn rapidity(beta: f64) -> f64 {
	clamp_beta(beta).atanh()
}

pub fn beta_from_rapidity(rapidity: f64) -> f64 {
	rapidity.tanh()
}

// ds^2 = -c^2 dt^2 + |dx|^2, negative when timelike
// events are (coordinate time in years, position in AU)
pub fn minkowski_interval(t1: f64, x1: Point3, t2: f64, x2: Point3) -> f64 {
	let dt = t2 - t1;
	-SPEED_OF_LIGHT * SPEED_OF_LIGHT * dt * dt + (x2 - x1).length_squared()
}

pub fn is_timelike(interval: f64) -> bool {
	interval < 0.0
}

// relativistic aberration of the angle between an incoming ray and the velocity
pub fn aberrate_cos(cos_theta: f64, beta: f64) -> f64 {
	((cos_theta - beta) / (1.0 - beta * cos_theta)).clamp(-1.0, 1.0)
}

// frequency ratio of light arriving from angle theta; > 1 is blueshift
pub fn doppler_factor(cos_theta: f64, beta: f64, gamma: f64) -> f64 {
	1.0 / (gamma * (1.0 - beta * cos_theta))
}
