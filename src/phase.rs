use std::fmt;
use enum_dispatch::enum_dispatch;
use serde::Serialize;

use crate::mission::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MissionPhase {
	Accelerating,
	Coasting,
	Turnaround,
	Decelerating,
}

impl fmt::Display for MissionPhase {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			MissionPhase::Accelerating => "ACCELERATING",
			MissionPhase::Coasting => "COASTING",
			MissionPhase::Turnaround => "TURNAROUND",
			MissionPhase::Decelerating => "DECELERATING",
		};
		f.write_str(name)
	}
}

// phase as a pure function of where playback is; each model reads the part it needs
#[enum_dispatch]
pub trait PhaseSchedule {
	fn phase_at(&self, progress: f64, coord_time: f64) -> MissionPhase;
}

// the two trajectory models get separate state machines
#[derive(Clone, Debug, PartialEq)]
#[enum_dispatch(PhaseSchedule)]
pub enum Schedule {
	ThreeLeg(ThreeLeg),
	TwoBurn(TwoBurn),
	CoastingBurn(CoastingBurn),
}

impl Schedule {
	// boundary counts other than 2 or 4 have no defined meaning, those play as three legs
	pub fn for_solution(solution: &SolutionSummary) -> Self {
		match (solution.model, solution.phase_boundaries.as_slice()) {
			(TrajectoryModel::ConstantAcceleration, &[accel_end, decel_end]) => {
				Schedule::TwoBurn(TwoBurn {accel_end, decel_end})
			},
			(TrajectoryModel::ConstantAcceleration, &[accel_end, coast_end, turnaround_end, decel_end]) => {
				Schedule::CoastingBurn(CoastingBurn {accel_end, coast_end, turnaround_end, decel_end})
			},
			_ => Schedule::ThreeLeg(ThreeLeg),
		}
	}
}

// turnaround is assumed to sit at the temporal midpoint of playback,
// which an asymmetric outbound/inbound trip would not satisfy
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ThreeLeg;

impl PhaseSchedule for ThreeLeg {
	fn phase_at(&self, progress: f64, _coord_time: f64) -> MissionPhase {
		if progress < 0.5 {
			MissionPhase::Accelerating
		} else if progress > 0.5 {
			MissionPhase::Decelerating
		} else {
			MissionPhase::Turnaround
		}
	}
}

// accelerate then decelerate, no coast and no explicit turnaround
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TwoBurn {
	pub accel_end: f64,
	pub decel_end: f64,
}

impl PhaseSchedule for TwoBurn {
	fn phase_at(&self, _progress: f64, coord_time: f64) -> MissionPhase {
		if coord_time < self.accel_end {
			MissionPhase::Accelerating
		} else {
			MissionPhase::Decelerating
		}
	}
}

// the last boundary closes the final burn, so anything past the third one is deceleration
// a zero width turnaround (coast_end == turnaround_end) is never reported
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CoastingBurn {
	pub accel_end: f64,
	pub coast_end: f64,
	pub turnaround_end: f64,
	pub decel_end: f64,
}

impl PhaseSchedule for CoastingBurn {
	fn phase_at(&self, _progress: f64, coord_time: f64) -> MissionPhase {
		if coord_time < self.accel_end {
			MissionPhase::Accelerating
		} else if coord_time < self.coast_end {
			MissionPhase::Coasting
		} else if coord_time < self.turnaround_end {
			MissionPhase::Turnaround
		} else {
			MissionPhase::Decelerating
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn schedule(boundaries: Vec<f64>) -> Schedule {
		Schedule::for_solution(&SolutionSummary::constant_acceleration(0.5, boundaries))
	}

	#[test]
	fn three_leg_splits_at_midpoint() {
		let legs = Schedule::for_solution(&SolutionSummary::constant_velocity(0.6));
		assert_eq!(legs.phase_at(0.0, 0.0), MissionPhase::Accelerating);
		assert_eq!(legs.phase_at(0.4999, 0.0), MissionPhase::Accelerating);
		assert_eq!(legs.phase_at(0.5, 0.0), MissionPhase::Turnaround);
		assert_eq!(legs.phase_at(0.5001, 0.0), MissionPhase::Decelerating);
		assert_eq!(legs.phase_at(1.0, 0.0), MissionPhase::Decelerating);
	}

	#[test]
	fn four_boundaries_walk_through_every_phase() {
		let burn = schedule(vec![1.0, 2.0, 3.0, 5.0]);
		assert_eq!(burn.phase_at(0.0, 0.5), MissionPhase::Accelerating);
		assert_eq!(burn.phase_at(0.0, 1.5), MissionPhase::Coasting);
		assert_eq!(burn.phase_at(0.0, 2.5), MissionPhase::Turnaround);
		assert_eq!(burn.phase_at(0.0, 4.0), MissionPhase::Decelerating);
		assert_eq!(burn.phase_at(0.0, 6.0), MissionPhase::Decelerating);
	}

	#[test]
	fn zero_width_turnaround_goes_straight_to_deceleration() {
		let burn = schedule(vec![1.0, 3.0, 3.0, 5.0]);
		assert_eq!(burn.phase_at(0.0, 3.5), MissionPhase::Decelerating);
		assert_eq!(burn.phase_at(0.0, 3.0), MissionPhase::Decelerating);
		assert_eq!(burn.phase_at(0.0, 2.9), MissionPhase::Coasting);
	}

	#[test]
	fn two_boundaries_skip_coast_and_turnaround() {
		let burn = schedule(vec![1.0, 2.0]);
		assert!(matches!(burn, Schedule::TwoBurn(_)));
		assert_eq!(burn.phase_at(0.9, 0.5), MissionPhase::Accelerating);
		assert_eq!(burn.phase_at(0.1, 1.5), MissionPhase::Decelerating);
	}

	#[test]
	fn progress_is_ignored_by_time_based_models() {
		let burn = schedule(vec![1.0, 2.0, 3.0, 4.0]);
		assert_eq!(burn.phase_at(0.5, 0.2), MissionPhase::Accelerating);
	}

	#[test]
	fn unusable_boundaries_fall_back_to_three_legs() {
		assert!(matches!(schedule(vec![1.0, 2.0, 3.0]), Schedule::ThreeLeg(_)));
		assert!(matches!(schedule(Vec::new()), Schedule::ThreeLeg(_)));
	}
}
