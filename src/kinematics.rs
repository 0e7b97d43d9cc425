//! Worldline builders for the two trajectory models, plus the circular
//! Earth orbit. These construct sample data for the demo and for tests;
//! they take the trip geometry as given rather than solving for it.

use std::f64::consts::TAU;

use crate::mission::*;
use crate::relativity::*;
use crate::vec3::*;

pub const EARTH_ORBIT_RADIUS: f64 = 1.0;// AU
pub const EARTH_ANGULAR_VELOCITY: f64 = TAU;// rad per year

/// Proper acceleration in AU/year² from a multiple of standard gravity.
pub fn acceleration_from_g(g: f64) -> f64 {
	g * STANDARD_GRAVITY * YEAR_S * YEAR_S / AU_M
}

pub fn earth_position(t: f64) -> Point3 {
	let angle = EARTH_ANGULAR_VELOCITY * t;
	Point3::new(EARTH_ORBIT_RADIUS * angle.cos(), EARTH_ORBIT_RADIUS * angle.sin(), 0.0)
}

pub fn earth_velocity(t: f64) -> Vec3 {
	let angle = EARTH_ANGULAR_VELOCITY * t;
	let speed = EARTH_ORBIT_RADIUS * EARTH_ANGULAR_VELOCITY;
	Vec3::new(-speed * angle.sin(), speed * angle.cos(), 0.0)
}

pub fn earth_trajectory(t0: f64, tf: f64, samples: usize) -> ReferenceBodyTrajectory {
	let samples = samples.max(2);
	let times: Vec<f64> = (0..samples)
		.map(|i| lerp(t0, tf, i as f64 / (samples - 1) as f64))
		.collect();
	let positions = times.iter().map(|&t| earth_position(t)).collect();
	ReferenceBodyTrajectory {times, positions}
}

/// Two constant velocity legs of equal length and duration that leave
/// `start` at `t0` and reach `end` at `tf`, turning around at the midpoint
/// in time. `side` picks which way the turnaround point bulges away from
/// the straight line. If `beta` is too slow to cover the distance the
/// turnaround sits on the straight line instead.
pub fn constant_velocity_worldline(
	t0: f64,
	tf: f64,
	beta: f64,
	start: Point3,
	end: Point3,
	side: Vec3,
	samples_per_leg: usize,
) -> (Worldline, SolutionSummary) {
	let samples_per_leg = samples_per_leg.max(2);
	let beta = clamp_beta(beta);
	let half = 0.5 * (tf - t0);
	let turnaround_time = t0 + half;

	let chord = end - start;
	let middle = start + 0.5 * chord;
	let half_chord = 0.5 * chord.length();
	let leg_length = beta * SPEED_OF_LIGHT * half;

	// component of side perpendicular to the chord
	let axis = chord.normalized_or(Vec3::X);
	let normal = (side - side.dot(axis) * axis).normalized_or(Vec3::Y.cross(axis).normalized_or(Vec3::Z));
	let offset = (leg_length * leg_length - half_chord * half_chord).max(0.0).sqrt();
	let turnaround = middle + offset * normal;

	// recompute so the samples match the actual geometry
	let leg_beta = if half > 0.0 {
		turnaround.distance(start) / (SPEED_OF_LIGHT * half)
	} else {
		0.0
	};

	let mut coord_times = Vec::with_capacity(2 * samples_per_leg - 1);
	let mut positions = Vec::with_capacity(2 * samples_per_leg - 1);
	let mut proper_times = Vec::with_capacity(2 * samples_per_leg - 1);

	for (leg, (from, to)) in [(start, turnaround), (turnaround, end)].into_iter().enumerate() {
		let leg_start = t0 + leg as f64 * half;
		// the turnaround sample is shared by both legs
		let first = if leg == 0 {0} else {1};
		for i in first..samples_per_leg {
			let f = i as f64 / (samples_per_leg - 1) as f64;
			let t = leg_start + f * half;
			coord_times.push(t);
			positions.push(from.lerp(to, f));
			proper_times.push(proper_time_elapsed(leg_beta, t - t0));
		}
	}

	let worldline = Worldline {
		coord_times,
		positions,
		proper_times,
		beta_profile: None,
	};
	let mut solution = SolutionSummary::constant_velocity(leg_beta);
	solution.turnaround_time = Some(turnaround_time);
	solution.total_proper_time = worldline.proper_times.last().copied();
	(worldline, solution)
}

// one constant proper acceleration burn along a fixed direction, continuing from an
// existing rapidity; a negative acceleration slows motion along direction
struct Burn {
	acceleration: f64,
	proper_duration: f64,
	direction: Vec3,
}

struct BurnSamples {
	coord_times: Vec<f64>,
	positions: Vec<Point3>,
	proper_times: Vec<f64>,
	betas: Vec<f64>,
}

fn build_burn(
	burn: &Burn,
	samples: usize,
	start_position: Point3,
	start_coord_time: f64,
	start_proper_time: f64,
	start_rapidity: f64,
) -> BurnSamples {
	let c = SPEED_OF_LIGHT;
	let a = burn.acceleration;
	let mut out = BurnSamples {
		coord_times: Vec::with_capacity(samples),
		positions: Vec::with_capacity(samples),
		proper_times: Vec::with_capacity(samples),
		betas: Vec::with_capacity(samples),
	};

	for i in 0..samples {
		let tau = burn.proper_duration * i as f64 / (samples - 1) as f64;
		let (dt, dx, beta) = if a.abs() < 1e-20 {
			// coast at the current rapidity
			let dt = tau * start_rapidity.cosh();
			(dt, start_rapidity.tanh() * c * dt, start_rapidity.tanh().abs())
		} else {
			// dt = (c/a)[sinh(phi) - sinh(phi0)], dx = (c^2/a)[cosh(phi) - cosh(phi0)]
			let phi = start_rapidity + a * tau / c;
			let dt = (c / a) * (phi.sinh() - start_rapidity.sinh());
			let dx = (c * c / a) * (phi.cosh() - start_rapidity.cosh());
			(dt, dx, phi.tanh().abs())
		};
		out.coord_times.push(start_coord_time + dt);
		out.positions.push(start_position + dx * burn.direction);
		out.proper_times.push(start_proper_time + tau);
		out.betas.push(beta);
	}
	out
}

/// Round trip at constant proper acceleration: accelerate out, decelerate to
/// rest at the turnaround, accelerate back, decelerate to rest on arrival.
/// Each burn lasts `proper_duration` of ship time. The reported phase
/// boundaries mark a zero width coast, the turnaround manoeuvre (the two
/// middle burns) and arrival.
pub fn brachistochrone_worldline(
	acceleration: f64,
	proper_duration: f64,
	direction: Vec3,
	start: Point3,
	t0: f64,
	samples_per_burn: usize,
) -> (Worldline, SolutionSummary) {
	let samples_per_burn = samples_per_burn.max(2);
	let direction = direction.normalized_or(Vec3::X);
	let burns = [
		Burn {acceleration, proper_duration, direction},
		Burn {acceleration: -acceleration, proper_duration, direction},
		Burn {acceleration, proper_duration, direction: -direction},
		Burn {acceleration: -acceleration, proper_duration, direction: -direction},
	];

	let mut coord_times = Vec::new();
	let mut positions = Vec::new();
	let mut proper_times = Vec::new();
	let mut betas = Vec::new();
	let mut burn_ends = Vec::with_capacity(burns.len());

	let (mut position, mut t, mut tau, mut rapidity) = (start, t0, 0.0, 0.0);
	for (index, burn) in burns.iter().enumerate() {
		let samples = build_burn(burn, samples_per_burn, position, t, tau, rapidity);
		// consecutive burns share their boundary sample
		let skip = if index == 0 {0} else {1};
		coord_times.extend_from_slice(&samples.coord_times[skip..]);
		positions.extend_from_slice(&samples.positions[skip..]);
		proper_times.extend_from_slice(&samples.proper_times[skip..]);
		betas.extend_from_slice(&samples.betas[skip..]);

		// back to zero at the turnaround, so the inbound burns start from rest
		rapidity += burn.acceleration * burn.proper_duration / SPEED_OF_LIGHT;
		position = positions[positions.len() - 1];
		t = coord_times[coord_times.len() - 1];
		tau = proper_times[proper_times.len() - 1];
		burn_ends.push(t);
	}

	let peak_beta = beta_from_rapidity(acceleration.abs() * proper_duration / SPEED_OF_LIGHT);
	let boundaries = SolutionSummary::boundaries_from_burn_ends([burn_ends[0], burn_ends[1], burn_ends[2], burn_ends[3]]);
	let mut solution = SolutionSummary::constant_acceleration(peak_beta, boundaries);
	solution.turnaround_time = Some(burn_ends[1]);
	solution.total_proper_time = Some(tau);

	let worldline = Worldline {
		coord_times,
		positions,
		proper_times,
		beta_profile: Some(betas),
	};
	(worldline, solution)
}

/// Ship proper time per burn so the symmetric round trip takes `duration` years.
pub fn burn_duration_for_trip(acceleration: f64, duration: f64) -> f64 {
	let c = SPEED_OF_LIGHT;
	// each burn covers a quarter of the coordinate time: t = (c/a) sinh(a tau / c)
	(c / acceleration) * (acceleration * duration / (4.0 * c)).asinh()
}

pub const DEMO_DURATION: f64 = 2.0;// years, a whole number of orbits
pub const DEMO_BETA: f64 = 0.6;
pub const DEMO_ACCELERATION_G: f64 = 1.0;
const DEMO_SAMPLES: usize = 200;

/// Round trip from Earth and back over two years, for playback without a solver.
pub fn demo_mission(model: TrajectoryModel) -> Mission {
	let (t0, tf) = (0.0, DEMO_DURATION);
	let earth = earth_trajectory(t0, tf, DEMO_SAMPLES);
	let heading = Vec3::new(1.0, 0.4, 0.2);
	let (worldline, solution) = match model {
		TrajectoryModel::ConstantVelocity => constant_velocity_worldline(
			t0, tf, DEMO_BETA, earth_position(t0), earth_position(tf), heading, DEMO_SAMPLES / 2,
		),
		TrajectoryModel::ConstantAcceleration => {
			let acceleration = acceleration_from_g(DEMO_ACCELERATION_G);
			let proper_duration = burn_duration_for_trip(acceleration, tf - t0);
			brachistochrone_worldline(acceleration, proper_duration, heading, earth_position(t0), t0, DEMO_SAMPLES / 4)
		}
	};
	Mission::new(worldline, earth, solution)
}
