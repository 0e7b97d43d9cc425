//! The per-frame driver.
//!
//! One call to [`Playback::frame`] runs, in order: the clock advance, the
//! state interpolation, the orientation update and the optical transform of
//! every star. Only the clock and the orientation controller carry state from
//! one frame to the next; everything else is recomputed from the frame's
//! interpolated state.

use log::{debug, info};

use crate::clock::*;
use crate::config::PlaybackConfig;
use crate::image::{Image, Projection};
use crate::interpolate::*;
use crate::mission::Mission;
use crate::optics::*;
use crate::orientation::OrientationController;
use crate::quat::Quat;
use crate::starfield::{self, StarPoint};

// everything produced for one frame
#[derive(Clone, Debug)]
pub struct FrameOutput {
	pub index: u64,
	pub clock: AnimationClockState,
	pub state: InterpolatedState,
	pub orientation: Quat,
	pub uniforms: OpticalUniforms,
	pub points: Vec<PointAppearance>,
	pub warp: WarpStreaks,
}

pub struct Playback {
	mission: Option<Mission>,
	clock: AnimationClock,
	orientation: OrientationController,
	stars: Vec<StarPoint>,
	config: PlaybackConfig,
	cache: StateCache,
	frames: u64,
}

impl Playback {
	pub fn new(config: PlaybackConfig) -> Self {
		let config = config.sanitized();
		let mut clock = AnimationClock::new(config.clock.base_duration_s);
		clock.set_speed(config.clock.speed);
		let orientation = OrientationController::new(
			config.orientation.slerp_fraction,
			config.orientation.parallel_threshold,
		);
		let stars = starfield::generate(config.starfield.count, config.starfield.seed);
		Playback {
			mission: None,
			clock,
			orientation,
			stars,
			config,
			cache: StateCache::new(),
			frames: 0,
		}
	}

	/// Replaces the current mission as a whole. Playback position is kept,
	/// the camera snaps to the new trajectory on the next frame.
	pub fn load_mission(&mut self, mission: Mission) {
		info!("playing mission {}", mission.id());
		self.mission = Some(mission);
		self.cache.invalidate();
		self.orientation.reset();
	}

	pub fn clear_mission(&mut self) {
		self.mission = None;
		self.cache.invalidate();
		self.orientation.reset();
	}

	pub fn mission(&self) -> Option<&Mission> {
		self.mission.as_ref()
	}

	pub fn clock(&self) -> &AnimationClock {
		&self.clock
	}

	pub fn clock_mut(&mut self) -> &mut AnimationClock {
		&mut self.clock
	}

	pub fn orientation(&self) -> &OrientationController {
		&self.orientation
	}

	pub fn stars(&self) -> &[StarPoint] {
		&self.stars
	}

	pub fn config(&self) -> &PlaybackConfig {
		&self.config
	}

	pub fn cache(&self) -> &StateCache {
		&self.cache
	}

	/// State at the current progress, without advancing anything.
	pub fn current_state(&mut self) -> Option<InterpolatedState> {
		let mission = self.mission.as_ref()?;
		self.cache.get(mission, self.clock.progress())
	}

	/// Runs one frame at wall clock time `now` (seconds). Returns `None`
	/// while there is nothing to render yet.
	pub fn frame(&mut self, now: f64) -> Option<FrameOutput> {
		if self.clock.frame_scheduled() {
			self.clock.advance(now);
		}
		let state = self.current_state()?;

		let orientation = self.orientation.update(state.velocity_direction);
		let uniforms = OpticalUniforms::from_state(&state);
		let points = transform_all_parallel(
			&self.stars,
			&uniforms,
			&self.config.optics,
			self.config.render.thread_count(),
		);
		let warp = WarpStreaks::for_frame(&uniforms, &self.config.optics);

		let index = self.frames;
		self.frames += 1;
		debug!(
			"frame {index}: progress {:.4} t {:.4} yr tau {:.4} yr beta {:.4} gamma {:.4} {} distance {:.2} AU",
			state.progress,
			state.coord_time,
			state.proper_time,
			state.beta,
			state.gamma,
			state.phase,
			state.reference_distance,
		);

		Some(FrameOutput {
			index,
			clock: self.clock.snapshot(),
			state,
			orientation,
			uniforms,
			points,
			warp,
		})
	}

	// the starfield as seen through the smoothed camera
	pub fn render(&self, output: &FrameOutput) -> Image {
		let render = &self.config.render;
		let projection = Projection::new(output.orientation, render.width, render.height, render.vfov_deg);
		let mut image = Image::new(render.width, render.height);
		image.draw_starfield(&output.points, &projection);
		image.draw_warp(&output.warp, &output.points, &projection);
		image.normalize();
		image
	}
}
