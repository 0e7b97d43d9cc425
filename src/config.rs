//! Playback configuration, loaded from TOML.
//!
//! Every section has defaults, so a config file only needs the values it
//! changes. Out of range values are reported by [`PlaybackConfig::validate`]
//! and replaced by defaults in [`PlaybackConfig::sanitized`].

use std::path::Path;
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
	pub clock: ClockConfig,
	pub orientation: OrientationConfig,
	pub optics: OpticsConfig,
	pub starfield: StarfieldConfig,
	pub render: RenderConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
	/// Wall clock seconds for one full playback at speed 1.
	pub base_duration_s: f64,
	pub speed: f64,
}

impl Default for ClockConfig {
	fn default() -> Self {
		Self {
			base_duration_s: 20.0,
			speed: 1.0,
		}
	}
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrientationConfig {
	/// Share of the remaining rotation covered each frame (valid range: 0.0-1.0).
	pub slerp_fraction: f64,
	/// |cos| between velocity and world up above which the fallback up axis is used.
	pub parallel_threshold: f64,
}

impl Default for OrientationConfig {
	fn default() -> Self {
		Self {
			slerp_fraction: 0.05,
			parallel_threshold: 0.99,
		}
	}
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpticsConfig {
	pub doppler_min: f64,
	pub doppler_max: f64,
	pub beaming_min: f64,
	pub beaming_max: f64,
	/// Beta at which warp streaks start to fade in.
	pub warp_threshold: f64,
	/// Beta at which warp streaks reach full strength.
	pub warp_full: f64,
	pub base_size: f64,
	pub base_opacity: f64,
}

impl Default for OpticsConfig {
	fn default() -> Self {
		Self {
			doppler_min: 0.1,
			doppler_max: 10.0,
			beaming_min: 0.005,
			beaming_max: 80.0,
			warp_threshold: 0.3,
			warp_full: 0.9,
			base_size: 1.0,
			base_opacity: 0.8,
		}
	}
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StarfieldConfig {
	pub count: usize,
	pub seed: u64,
}

impl Default for StarfieldConfig {
	fn default() -> Self {
		Self {
			count: 4000,
			seed: 42,
		}
	}
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
	pub width: usize,
	pub height: usize,
	pub vfov_deg: f64,
	/// Worker threads for the per-star transform; 0 means one per CPU.
	pub threads: usize,
}

impl Default for RenderConfig {
	fn default() -> Self {
		Self {
			width: 640,
			height: 360,
			vfov_deg: 90.0,
			threads: 0,
		}
	}
}

impl RenderConfig {
	pub fn thread_count(&self) -> usize {
		if self.threads == 0 {
			num_cpus::get()
		} else {
			self.threads
		}
	}
}

impl PlaybackConfig {
	pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
		Ok(toml::from_str(text)?)
	}

	pub fn to_toml(&self) -> Result<String, ConfigError> {
		Ok(toml::to_string_pretty(self)?)
	}

	/// Load from a TOML file. Validation findings are logged, not fatal.
	pub fn load(path: &Path) -> Result<Self, ConfigError> {
		let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
			path: path.to_path_buf(),
			source,
		})?;
		let config = Self::from_toml(&text)?;
		for problem in config.validate() {
			warn!("config: {problem}");
		}
		info!("loaded config from {}", path.display());
		Ok(config)
	}

	pub fn validate(&self) -> Vec<String> {
		let mut problems = Vec::new();
		if !(self.clock.base_duration_s > 0.0) {
			problems.push(format!("clock.base_duration_s must be positive, got {}", self.clock.base_duration_s));
		}
		if !(self.clock.speed > 0.0) {
			problems.push(format!("clock.speed must be positive, got {}", self.clock.speed));
		}
		if !(0.0..=1.0).contains(&self.orientation.slerp_fraction) {
			problems.push(format!("orientation.slerp_fraction must be in [0, 1], got {}", self.orientation.slerp_fraction));
		}
		if !(0.0..1.0).contains(&self.orientation.parallel_threshold) {
			problems.push(format!("orientation.parallel_threshold must be in [0, 1), got {}", self.orientation.parallel_threshold));
		}
		let optics = &self.optics;
		if !(optics.doppler_min > 0.0 && optics.doppler_min <= optics.doppler_max) {
			problems.push(format!("optics doppler range [{}, {}] is empty or not positive", optics.doppler_min, optics.doppler_max));
		}
		if !(optics.beaming_min > 0.0 && optics.beaming_min <= optics.beaming_max) {
			problems.push(format!("optics beaming range [{}, {}] is empty or not positive", optics.beaming_min, optics.beaming_max));
		}
		if !(optics.warp_threshold < optics.warp_full) {
			problems.push(format!("optics.warp_threshold {} must be below warp_full {}", optics.warp_threshold, optics.warp_full));
		}
		if self.render.width == 0 || self.render.height == 0 {
			problems.push(format!("render size {}x{} has no pixels", self.render.width, self.render.height));
		}
		if !(self.render.vfov_deg > 0.0 && self.render.vfov_deg < 180.0) {
			problems.push(format!("render.vfov_deg must be in (0, 180), got {}", self.render.vfov_deg));
		}
		problems
	}

	// each section that fails validation falls back to its defaults
	pub fn sanitized(&self) -> Self {
		let mut config = self.clone();
		let defaults = PlaybackConfig::default();
		if !(config.clock.base_duration_s > 0.0) || !(config.clock.speed > 0.0) {
			config.clock = defaults.clock;
		}
		if !(0.0..=1.0).contains(&config.orientation.slerp_fraction)
			|| !(0.0..1.0).contains(&config.orientation.parallel_threshold) {
			config.orientation = defaults.orientation;
		}
		let optics = &config.optics;
		if !(optics.doppler_min > 0.0 && optics.doppler_min <= optics.doppler_max)
			|| !(optics.beaming_min > 0.0 && optics.beaming_min <= optics.beaming_max)
			|| !(optics.warp_threshold < optics.warp_full) {
			config.optics = defaults.optics;
		}
		if config.render.width == 0 || config.render.height == 0
			|| !(config.render.vfov_deg > 0.0 && config.render.vfov_deg < 180.0) {
			config.render = RenderConfig {threads: config.render.threads, ..defaults.render};
		}
		config
	}
}
