//! Continuous ship state reconstructed from the sampled worldline.
//!
//! [`interpolate`] is a pure function: identical inputs give identical
//! states, and nothing is cached inside it. Callers that redraw the same
//! progress many times can put a [`StateCache`] in front of it.

use serde::Serialize;

use crate::mission::*;
use crate::phase::*;
use crate::relativity::*;
use crate::vec3::*;

// direction reported when two samples coincide
pub const DEFAULT_DIRECTION: Vec3 = Vec3::X;

/// Everything a frame needs to know about the ship at one instant.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct InterpolatedState {
	pub progress: f64,
	pub coord_time: f64,
	pub proper_time: f64,
	pub position: Point3,
	/// Clamped to `[0, MAX_BETA]`.
	pub beta: f64,
	pub gamma: f64,
	/// Unit tangent of the worldline polyline at this instant.
	pub velocity_direction: Vec3,
	pub phase: MissionPhase,
	pub reference_position: Point3,
	pub reference_distance: f64,
}

/// Index `i` of the interval with `times[i] <= t < times[i + 1]`.
///
/// Targets before the first sample map to interval 0 and targets at or past
/// the last sample map to the final interval, so the result is always a
/// valid interval for `times.len() >= 2`.
pub fn bracket_interval(times: &[f64], t: f64) -> usize {
	debug_assert!(times.len() >= 2);
	let last = times.len() - 2;
	// first index whose time is strictly greater than t
	let upper = times.partition_point(|&sample| sample <= t);
	upper.saturating_sub(1).min(last)
}

// fraction through interval i; zero length intervals stay at their start
fn interval_fraction(times: &[f64], i: usize, t: f64) -> f64 {
	let span = times[i + 1] - times[i];
	if span > 0.0 {
		((t - times[i]) / span).clamp(0.0, 1.0)
	} else {
		0.0
	}
}

/// Position of the reference body at `t`, held at its end samples outside its own time range.
pub fn reference_position_at(trajectory: &ReferenceBodyTrajectory, t: f64) -> Option<Point3> {
	let n = trajectory.times.len().min(trajectory.positions.len());
	match n {
		0 => None,
		1 => Some(trajectory.positions[0]),
		_ => {
			let times = &trajectory.times[..n];
			if t <= times[0] {
				return Some(trajectory.positions[0]);
			}
			if t >= times[n - 1] {
				return Some(trajectory.positions[n - 1]);
			}
			let i = bracket_interval(times, t);
			let f = interval_fraction(times, i, t);
			Some(trajectory.positions[i].lerp(trajectory.positions[i + 1], f))
		},
	}
}

/// Ship state at `progress` in `[0, 1]` through the mission.
///
/// Returns `None` when any input is missing or the worldline has fewer than
/// two usable samples. Out of range values are clamped rather than rejected.
pub fn interpolate(
	worldline: Option<&Worldline>,
	reference_body: Option<&ReferenceBodyTrajectory>,
	solution: Option<&SolutionSummary>,
	progress: f64,
) -> Option<InterpolatedState> {
	let (worldline, reference_body, solution) = (worldline?, reference_body?, solution?);

	// mismatched sequences are cut to their common prefix
	let n = worldline.coord_times.len()
		.min(worldline.positions.len())
		.min(worldline.proper_times.len());
	if n < 2 {
		return None;
	}
	let times = &worldline.coord_times[..n];
	let progress = if progress.is_nan() {0.0} else {progress.clamp(0.0, 1.0)};

	let t = lerp(times[0], times[n - 1], progress);
	let i = bracket_interval(times, t);
	let f = interval_fraction(times, i, t);

	let position = worldline.positions[i].lerp(worldline.positions[i + 1], f);
	// same interval and fraction as the position, so the state stays self consistent
	let proper_time = lerp(worldline.proper_times[i], worldline.proper_times[i + 1], f);

	let raw_beta = match worldline.usable_beta_profile() {
		Some(profile) => lerp(profile[i], profile[i + 1], f),
		None => solution.beta,
	};
	let beta = clamp_beta(raw_beta);
	let gamma = lorentz_factor(beta);

	let velocity_direction = (worldline.positions[i + 1] - worldline.positions[i])
		.normalized_or(DEFAULT_DIRECTION);

	let phase = Schedule::for_solution(solution).phase_at(progress, t);

	// an empty reference trajectory leaves the body at the origin
	let reference_position = reference_position_at(reference_body, t).unwrap_or_default();
	let reference_distance = position.distance(reference_position);

	Some(InterpolatedState {
		progress,
		coord_time: t,
		proper_time,
		position,
		beta,
		gamma,
		velocity_direction,
		phase,
		reference_position,
		reference_distance,
	})
}

impl Mission {
	pub fn state_at(&self, progress: f64) -> Option<InterpolatedState> {
		interpolate(
			Some(&*self.worldline),
			Some(&*self.reference_body),
			Some(&*self.solution),
			progress,
		)
	}
}

/// Memo of the last computed state, keyed by mission identity and exact progress.
#[derive(Clone, Debug, Default)]
pub struct StateCache {
	key: Option<(u64, u64)>,
	state: Option<InterpolatedState>,
	hits: u64,
	misses: u64,
}

impl StateCache {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn get(&mut self, mission: &Mission, progress: f64) -> Option<InterpolatedState> {
		let key = (mission.id(), progress.to_bits());
		if self.key == Some(key) {
			self.hits += 1;
			return self.state;
		}
		self.misses += 1;
		self.key = Some(key);
		self.state = mission.state_at(progress);
		self.state
	}

	pub fn invalidate(&mut self) {
		self.key = None;
		self.state = None;
	}

	pub fn hits(&self) -> u64 {
		self.hits
	}

	pub fn misses(&self) -> u64 {
		self.misses
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn scenario() -> Mission {
		let worldline = Worldline::new(
			vec![0.0, 1.0, 2.0],
			vec![Vec3::new(0.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 0.0)],
			vec![0.0, 0.8, 1.5],
			None,
		).unwrap();
		let earth = ReferenceBodyTrajectory::new(
			vec![0.0, 2.0],
			vec![Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.0, 1.0, 0.0)],
		).unwrap();
		Mission::new(worldline, earth, SolutionSummary::constant_velocity(0.6))
	}

	#[test]
	fn quarter_progress_scenario() {
		let state = scenario().state_at(0.25).unwrap();
		assert_eq!(state.coord_time, 0.5);
		assert_eq!(state.position, Vec3::new(0.5, 0.0, 0.0));
		assert_eq!(state.proper_time, 0.4);
		assert_eq!(state.phase, MissionPhase::Accelerating);
		assert_eq!(state.velocity_direction, Vec3::X);
		assert!((state.reference_distance - (1.25f64).sqrt()).abs() < 1e-12);
	}

	#[test]
	fn endpoints_are_exact_samples() {
		let mission = scenario();
		let start = mission.state_at(0.0).unwrap();
		assert_eq!(start.coord_time, 0.0);
		assert_eq!(start.proper_time, 0.0);
		assert_eq!(start.position, Vec3::new(0.0, 0.0, 0.0));

		let end = mission.state_at(1.0).unwrap();
		assert_eq!(end.coord_time, 2.0);
		assert_eq!(end.proper_time, 1.5);
		assert_eq!(end.position, Vec3::new(0.0, 0.0, 0.0));
		assert_eq!(end.velocity_direction, -Vec3::X);
		assert_eq!(end.phase, MissionPhase::Decelerating);
	}

	#[test]
	fn bracket_edges() {
		let times = [0.0, 1.0, 2.0, 3.0];
		assert_eq!(bracket_interval(&times, -1.0), 0);
		assert_eq!(bracket_interval(&times, 0.0), 0);
		assert_eq!(bracket_interval(&times, 0.5), 0);
		assert_eq!(bracket_interval(&times, 1.0), 1);
		assert_eq!(bracket_interval(&times, 2.999), 2);
		assert_eq!(bracket_interval(&times, 3.0), 2);
		assert_eq!(bracket_interval(&times, 9.0), 2);
	}

	#[test]
	fn missing_inputs_give_no_state() {
		let mission = scenario();
		assert!(interpolate(None, Some(&*mission.reference_body), Some(&*mission.solution), 0.5).is_none());
		assert!(interpolate(Some(&*mission.worldline), None, Some(&*mission.solution), 0.5).is_none());
		assert!(interpolate(Some(&*mission.worldline), Some(&*mission.reference_body), None, 0.5).is_none());

		let single = Worldline::new(vec![0.0], vec![Vec3::default()], vec![0.0], None).unwrap();
		assert!(interpolate(Some(&single), Some(&*mission.reference_body), Some(&*mission.solution), 0.5).is_none());
	}

	#[test]
	fn duplicate_timestamps_do_not_divide_by_zero() {
		let worldline = Worldline::new(
			vec![0.0, 1.0, 1.0, 2.0],
			vec![Vec3::default(), Vec3::X, Vec3::X, Vec3::X],
			vec![0.0, 0.5, 0.5, 1.0],
			None,
		).unwrap();
		let earth = ReferenceBodyTrajectory::new(vec![0.0], vec![Vec3::default()]).unwrap();
		let summary = SolutionSummary::constant_velocity(0.3);
		for step in 0..=20 {
			let state = interpolate(Some(&worldline), Some(&earth), Some(&summary), step as f64 / 20.0).unwrap();
			assert!(state.position.is_finite());
			assert!(state.proper_time.is_finite());
			assert!((state.velocity_direction.length() - 1.0).abs() < 1e-12);
		}
		// coincident samples fall back to the default direction
		let state = interpolate(Some(&worldline), Some(&earth), Some(&summary), 0.75).unwrap();
		assert_eq!(state.velocity_direction, DEFAULT_DIRECTION);
	}

	#[test]
	fn beta_profile_is_interpolated_and_clamped() {
		let worldline = Worldline::new(
			vec![0.0, 1.0],
			vec![Vec3::default(), Vec3::X],
			vec![0.0, 0.5],
			Some(vec![0.2, 1.4]),
		).unwrap();
		let earth = ReferenceBodyTrajectory::new(vec![0.0], vec![Vec3::default()]).unwrap();
		let summary = SolutionSummary::constant_velocity(0.1);
		let state = interpolate(Some(&worldline), Some(&earth), Some(&summary), 0.25).unwrap();
		assert!((state.beta - 0.5).abs() < 1e-12);
		let state = interpolate(Some(&worldline), Some(&earth), Some(&summary), 1.0).unwrap();
		assert_eq!(state.beta, MAX_BETA);
		assert!(state.gamma.is_finite());
	}

	#[test]
	fn short_beta_profile_falls_back_to_scalar() {
		let worldline = Worldline::new(
			vec![0.0, 1.0],
			vec![Vec3::default(), Vec3::X],
			vec![0.0, 0.5],
			Some(vec![0.2]),
		).unwrap();
		let earth = ReferenceBodyTrajectory::new(vec![0.0], vec![Vec3::default()]).unwrap();
		let summary = SolutionSummary::constant_velocity(0.6);
		let state = interpolate(Some(&worldline), Some(&earth), Some(&summary), 0.5).unwrap();
		assert_eq!(state.beta, 0.6);
		assert!((state.gamma - 1.25).abs() < 1e-12);
	}

	#[test]
	fn reference_body_is_clamped_outside_its_range() {
		let earth = ReferenceBodyTrajectory::new(
			vec![1.0, 2.0],
			vec![Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 1.0, 0.0)],
		).unwrap();
		assert_eq!(reference_position_at(&earth, 0.0), Some(Vec3::new(1.0, 0.0, 0.0)));
		assert_eq!(reference_position_at(&earth, 5.0), Some(Vec3::new(0.0, 1.0, 0.0)));
		assert_eq!(reference_position_at(&earth, 1.5), Some(Vec3::new(0.5, 0.5, 0.0)));
	}

	#[test]
	fn cache_recomputes_only_on_new_key() {
		let mission = scenario();
		let mut cache = StateCache::new();
		let a = cache.get(&mission, 0.3);
		let b = cache.get(&mission, 0.3);
		assert_eq!(a, b);
		assert_eq!((cache.hits(), cache.misses()), (1, 1));
		cache.get(&mission, 0.31);
		assert_eq!(cache.misses(), 2);

		let replacement = scenario();
		cache.get(&replacement, 0.31);
		assert_eq!(cache.misses(), 3);
	}
}
