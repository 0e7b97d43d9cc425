use std::fmt;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::error::MissionError;
use crate::relativity::*;
use crate::vec3::*;

// everything in a mission is in years and AU, as the solver reports it

// ship samples; coordinate times strictly increase and all sequences match in length
#[derive(Clone, Debug, PartialEq)]
pub struct Worldline {
	pub coord_times: Vec<f64>,
	pub positions: Vec<Point3>,
	pub proper_times: Vec<f64>,
	pub beta_profile: Option<Vec<f64>>,
}

impl Worldline {
	pub fn new(
		coord_times: Vec<f64>,
		positions: Vec<Point3>,
		proper_times: Vec<f64>,
		beta_profile: Option<Vec<f64>>,
	) -> Result<Self, MissionError> {
		let expected = coord_times.len();
		if positions.len() != expected {
			return Err(MissionError::LengthMismatch {name: "worldline positions", expected, found: positions.len()});
		}
		if proper_times.len() != expected {
			return Err(MissionError::LengthMismatch {name: "worldline proper times", expected, found: proper_times.len()});
		}
		Ok(Worldline {
			coord_times,
			positions,
			proper_times,
			beta_profile,
		})
	}

	pub fn len(&self) -> usize {
		self.coord_times.len()
	}

	pub fn is_empty(&self) -> bool {
		self.coord_times.is_empty()
	}

	// the profile is only usable when it lines up with the samples
	pub fn usable_beta_profile(&self) -> Option<&[f64]> {
		match &self.beta_profile {
			Some(profile) if profile.len() == self.len() => Some(profile),
			_ => None,
		}
	}

	pub fn duration(&self) -> f64 {
		match (self.coord_times.first(), self.coord_times.last()) {
			(Some(first), Some(last)) => last - first,
			_ => 0.0,
		}
	}

	// mean speed of each segment as a fraction of c
	pub fn segment_betas(&self) -> Vec<f64> {
		self.coord_times.windows(2).zip(self.positions.windows(2)).map(|(t, x)| {
			let dt = t[1] - t[0];
			if dt > 0.0 {
				x[1].distance(x[0]) / (SPEED_OF_LIGHT * dt)
			} else {
				0.0
			}
		}).collect()
	}

	pub fn validate(&self) -> ValidationReport {
		let mut findings = Vec::new();
		if self.len() < 2 {
			findings.push(Finding::TooFewSamples(self.len()));
		}
		if let Some(profile) = &self.beta_profile {
			if profile.len() != self.len() {
				findings.push(Finding::BetaProfileLength {expected: self.len(), found: profile.len()});
			}
		}
		check_monotonic("worldline", &self.coord_times, &mut findings);

		for (index, beta) in self.segment_betas().into_iter().enumerate() {
			if beta >= 1.0 {
				findings.push(Finding::Superluminal {index, beta});
			}
		}

		for i in 1..self.len() {
			let interval = minkowski_interval(
				self.coord_times[i - 1], self.positions[i - 1],
				self.coord_times[i], self.positions[i],
			);
			// null is still causal
			if interval > 0.0 {
				findings.push(Finding::Acausal {index: i - 1});
			}
		}

		if let (Some(&t0), Some(&tau0)) = (self.coord_times.first(), self.proper_times.first()) {
			for (index, (t, tau)) in self.coord_times.iter().zip(&self.proper_times).enumerate() {
				// small slack for rounding in the solver output
				if tau - tau0 > (t - t0) * (1.0 + 1e-9) + 1e-12 {
					findings.push(Finding::ProperTimeExceedsCoordinate {index});
					break;
				}
			}
		}

		ValidationReport {findings}
	}
}

// the body the traveller leaves and returns to, sampled on its own time grid
#[derive(Clone, Debug, PartialEq)]
pub struct ReferenceBodyTrajectory {
	pub times: Vec<f64>,
	pub positions: Vec<Point3>,
}

impl ReferenceBodyTrajectory {
	pub fn new(times: Vec<f64>, positions: Vec<Point3>) -> Result<Self, MissionError> {
		if positions.len() != times.len() {
			return Err(MissionError::LengthMismatch {name: "reference body positions", expected: times.len(), found: positions.len()});
		}
		Ok(ReferenceBodyTrajectory {times, positions})
	}

	pub fn validate(&self) -> ValidationReport {
		let mut findings = Vec::new();
		if self.times.is_empty() {
			findings.push(Finding::NoReferenceSamples);
		}
		check_monotonic("reference body", &self.times, &mut findings);
		ValidationReport {findings}
	}
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrajectoryModel {
	// instantaneous departure, cruise, turnaround, cruise, arrival
	#[default]
	ConstantVelocity,
	// brachistochrone burns at constant proper acceleration
	ConstantAcceleration,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SolutionSummary {
	pub beta: f64,
	pub model: TrajectoryModel,
	pub phase_boundaries: Vec<f64>,
	pub turnaround_time: Option<f64>,
	pub total_proper_time: Option<f64>,
	pub peak_beta: Option<f64>,
}

impl SolutionSummary {
	pub fn constant_velocity(beta: f64) -> Self {
		SolutionSummary {
			beta,
			model: TrajectoryModel::ConstantVelocity,
			phase_boundaries: Vec::new(),
			turnaround_time: None,
			total_proper_time: None,
			peak_beta: None,
		}
	}

	pub fn constant_acceleration(peak_beta: f64, phase_boundaries: Vec<f64>) -> Self {
		SolutionSummary {
			beta: peak_beta,
			model: TrajectoryModel::ConstantAcceleration,
			phase_boundaries,
			turnaround_time: None,
			total_proper_time: None,
			peak_beta: Some(peak_beta),
		}
	}

	/// Boundaries for a brachistochrone round trip from the end times of its
	/// four burns (accelerate out, decelerate out, accelerate in, decelerate
	/// in). The two middle burns are the turnaround manoeuvre; there is no coast.
	pub fn boundaries_from_burn_ends(ends: [f64; 4]) -> Vec<f64> {
		vec![ends[0], ends[0], ends[2], ends[3]]
	}

	pub fn validate(&self) -> ValidationReport {
		let mut findings = Vec::new();
		if !(0.0..1.0).contains(&self.beta) {
			findings.push(Finding::BetaOutOfRange(self.beta));
		}
		let count = self.phase_boundaries.len();
		if self.model == TrajectoryModel::ConstantAcceleration && count != 2 && count != 4 {
			findings.push(Finding::PhaseBoundaryCount(count));
		}
		if self.phase_boundaries.windows(2).any(|pair| pair[1] < pair[0]) {
			findings.push(Finding::PhaseBoundaryOrder);
		}
		ValidationReport {findings}
	}
}

fn check_monotonic(name: &'static str, times: &[f64], findings: &mut Vec<Finding>) {
	if let Some(index) = times.windows(2).position(|pair| !(pair[1] > pair[0])) {
		findings.push(Finding::NotIncreasing {name, index});
	}
}

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum Finding {
	#[error("worldline has {0} samples, at least 2 are needed")]
	TooFewSamples(usize),
	#[error("beta profile has {found} entries for {expected} samples, the scalar beta will be used")]
	BetaProfileLength {expected: usize, found: usize},
	#[error("{name} times stop increasing at sample {index}")]
	NotIncreasing {name: &'static str, index: usize},
	#[error("segment {index} moves at {beta:.4}c")]
	Superluminal {index: usize, beta: f64},
	#[error("segment {index} is spacelike")]
	Acausal {index: usize},
	#[error("proper time runs ahead of coordinate time at sample {index}")]
	ProperTimeExceedsCoordinate {index: usize},
	#[error("reference body trajectory is empty")]
	NoReferenceSamples,
	#[error("solution beta {0} is outside [0, 1)")]
	BetaOutOfRange(f64),
	#[error("constant acceleration model with {0} phase boundaries, expected 2 or 4")]
	PhaseBoundaryCount(usize),
	#[error("phase boundaries are not in order")]
	PhaseBoundaryOrder,
}

// findings never block playback, they only get reported
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ValidationReport {
	pub findings: Vec<Finding>,
}

impl ValidationReport {
	pub fn is_clean(&self) -> bool {
		self.findings.is_empty()
	}

	pub fn merge(mut self, other: ValidationReport) -> Self {
		self.findings.extend(other.findings);
		self
	}
}

impl fmt::Display for ValidationReport {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if self.is_clean() {
			return write!(f, "no findings");
		}
		for (i, finding) in self.findings.iter().enumerate() {
			if i > 0 {
				write!(f, "; ")?;
			}
			write!(f, "{finding}")?;
		}
		Ok(())
	}
}

static NEXT_MISSION_ID: AtomicU64 = AtomicU64::new(1);

// one solver response worth of data, replaced wholesale and never patched
#[derive(Clone, Debug)]
pub struct Mission {
	id: u64,
	pub worldline: Arc<Worldline>,
	pub reference_body: Arc<ReferenceBodyTrajectory>,
	pub solution: Arc<SolutionSummary>,
}

impl Mission {
	pub fn new(worldline: Worldline, reference_body: ReferenceBodyTrajectory, solution: SolutionSummary) -> Self {
		let report = worldline.validate()
			.merge(reference_body.validate())
			.merge(solution.validate());
		for finding in &report.findings {
			warn!("mission data: {finding}");
		}

		let mission = Mission {
			id: NEXT_MISSION_ID.fetch_add(1, Ordering::Relaxed),
			worldline: Arc::new(worldline),
			reference_body: Arc::new(reference_body),
			solution: Arc::new(solution),
		};
		info!(
			"mission {}: {} worldline samples over {:.3} years, {:?}, beta {:.4}",
			mission.id,
			mission.worldline.len(),
			mission.worldline.duration(),
			mission.solution.model,
			mission.solution.beta,
		);
		mission
	}

	// identity for caller side caching; every new mission gets a new one
	pub fn id(&self) -> u64 {
		self.id
	}

	pub fn validate(&self) -> ValidationReport {
		self.worldline.validate()
			.merge(self.reference_body.validate())
			.merge(self.solution.validate())
	}
}

// wire format of the trajectory service; unknown fields are ignored
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SolveResponse {
	#[serde(default)]
	pub solution: Option<SolutionData>,
	#[serde(default)]
	pub worldline: Option<WorldlineData>,
	#[serde(default)]
	pub earth: Option<EarthData>,
	#[serde(default)]
	pub error: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SolutionData {
	pub beta: f64,
	#[serde(default)]
	pub gamma: Option<f64>,
	#[serde(default)]
	pub turnaround_time_years: Option<f64>,
	#[serde(default)]
	pub total_proper_time_years: Option<f64>,
	#[serde(default)]
	pub trajectory_model: TrajectoryModel,
	#[serde(default)]
	pub phase_boundaries_years: Option<Vec<f64>>,
	#[serde(default)]
	pub peak_beta: Option<f64>,
	#[serde(default)]
	pub proper_acceleration_m_s2: Option<f64>,
	#[serde(default)]
	pub converged: Option<bool>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorldlineData {
	pub coord_times_years: Vec<f64>,
	pub positions_au: Vec<Vec3>,
	pub proper_times_years: Vec<f64>,
	#[serde(default)]
	pub beta_profile: Option<Vec<f64>>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EarthData {
	pub trajectory_times_years: Vec<f64>,
	pub trajectory_positions_au: Vec<Vec3>,
	#[serde(default)]
	pub orbit_radius_au: Option<f64>,
}

impl SolveResponse {
	pub fn from_json(text: &str) -> Result<Self, MissionError> {
		Ok(serde_json::from_str(text)?)
	}

	pub fn load(path: &Path) -> Result<Self, MissionError> {
		let text = std::fs::read_to_string(path).map_err(|source| MissionError::Read {
			path: path.to_path_buf(),
			source,
		})?;
		let response = Self::from_json(&text)?;
		info!("loaded solver response from {}", path.display());
		Ok(response)
	}

	// all three parts or nothing; a partial response is never played back
	pub fn into_mission(self) -> Result<Mission, MissionError> {
		if let Some(error) = self.error {
			return Err(MissionError::Solver(error));
		}
		let solution = self.solution.ok_or(MissionError::Missing("solution"))?;
		let worldline = self.worldline.ok_or(MissionError::Missing("worldline"))?;
		let earth = self.earth.ok_or(MissionError::Missing("reference body trajectory"))?;

		let worldline = Worldline::new(
			worldline.coord_times_years,
			worldline.positions_au,
			worldline.proper_times_years,
			worldline.beta_profile,
		)?;
		let reference_body = ReferenceBodyTrajectory::new(
			earth.trajectory_times_years,
			earth.trajectory_positions_au,
		)?;
		let phase_boundaries = wire_phase_boundaries(
			solution.trajectory_model,
			solution.phase_boundaries_years.unwrap_or_default(),
			worldline.coord_times.first().copied(),
		);
		let solution = SolutionSummary {
			beta: solution.beta,
			model: solution.trajectory_model,
			phase_boundaries,
			turnaround_time: solution.turnaround_time_years,
			total_proper_time: solution.total_proper_time_years,
			peak_beta: solution.peak_beta,
		};
		Ok(Mission::new(worldline, reference_body, solution))
	}
}

// the service sends the departure time followed by the four burn ends
fn wire_phase_boundaries(model: TrajectoryModel, boundaries: Vec<f64>, departure: Option<f64>) -> Vec<f64> {
	if model == TrajectoryModel::ConstantAcceleration {
		if let (&[start, accel_out, decel_out, accel_in, decel_in], Some(t0)) = (boundaries.as_slice(), departure) {
			if (start - t0).abs() <= 1e-9 * t0.abs().max(1.0) {
				return SolutionSummary::boundaries_from_burn_ends([accel_out, decel_out, accel_in, decel_in]);
			}
		}
	}
	boundaries
}

impl From<&Mission> for SolveResponse {
	fn from(mission: &Mission) -> Self {
		let solution = &mission.solution;
		SolveResponse {
			solution: Some(SolutionData {
				beta: solution.beta,
				gamma: Some(lorentz_factor(solution.beta)),
				turnaround_time_years: solution.turnaround_time,
				total_proper_time_years: solution.total_proper_time,
				trajectory_model: solution.model,
				phase_boundaries_years: if solution.phase_boundaries.is_empty() {
					None
				} else {
					Some(solution.phase_boundaries.clone())
				},
				peak_beta: solution.peak_beta,
				proper_acceleration_m_s2: None,
				converged: Some(true),
			}),
			worldline: Some(WorldlineData {
				coord_times_years: mission.worldline.coord_times.clone(),
				positions_au: mission.worldline.positions.clone(),
				proper_times_years: mission.worldline.proper_times.clone(),
				beta_profile: mission.worldline.beta_profile.clone(),
			}),
			earth: Some(EarthData {
				trajectory_times_years: mission.reference_body.times.clone(),
				trajectory_positions_au: mission.reference_body.positions.clone(),
				orbit_radius_au: None,
			}),
			error: None,
		}
	}
}
