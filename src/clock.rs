use log::{debug, info, warn};
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ClockState {
	Idle,
	Playing,
	Paused,
}

// what controls (scrubber, play button, speed readout) need to draw
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct AnimationClockState {
	pub progress: f64,
	pub playing: bool,
	pub speed: f64,
}

// progress is measured from here rather than summed frame by frame
#[derive(Clone, Copy, Debug, PartialEq)]
struct Anchor {
	time: f64,
	progress: f64,
	last_frame: f64,
}

impl Anchor {
	fn at(time: f64, progress: f64) -> Self {
		Anchor {time, progress, last_frame: time}
	}
}

// within this of the end counts as the end
const END_TOLERANCE: f64 = 1e-9;

// the single writer of playback progress
// timestamps are wall clock seconds from any fixed origin, one per frame
#[derive(Clone, Debug)]
pub struct AnimationClock {
	progress: f64,
	state: ClockState,
	speed: f64,
	base_duration: f64,// seconds for a full playback at speed 1
	anchor: Option<Anchor>,
	frame_scheduled: bool,
}

impl AnimationClock {
	pub fn new(base_duration: f64) -> Self {
		let base_duration = if base_duration > 0.0 && base_duration.is_finite() {
			base_duration
		} else {
			warn!("clock base duration {base_duration} is not positive, using 1s");
			1.0
		};
		AnimationClock {
			progress: 0.0,
			state: ClockState::Idle,
			speed: 1.0,
			base_duration,
			anchor: None,
			frame_scheduled: false,
		}
	}

	pub fn progress(&self) -> f64 {
		self.progress
	}

	pub fn state(&self) -> ClockState {
		self.state
	}

	pub fn is_playing(&self) -> bool {
		self.state == ClockState::Playing
	}

	pub fn speed(&self) -> f64 {
		self.speed
	}

	pub fn base_duration(&self) -> f64 {
		self.base_duration
	}

	// whether the frame driver should call advance on the next frame
	pub fn frame_scheduled(&self) -> bool {
		self.frame_scheduled
	}

	pub fn snapshot(&self) -> AnimationClockState {
		AnimationClockState {
			progress: self.progress,
			playing: self.is_playing(),
			speed: self.speed,
		}
	}

	// replays from the start once the end was reached
	pub fn play(&mut self) {
		if self.progress >= 1.0 {
			self.progress = 0.0;
		}
		self.state = ClockState::Playing;
		self.anchor = None;
		self.frame_scheduled = true;
		debug!("clock playing from {:.4}", self.progress);
	}

	pub fn pause(&mut self) {
		self.state = ClockState::Paused;
		self.anchor = None;
		self.frame_scheduled = false;
	}

	// works in any state; the next advance only re-anchors
	pub fn seek(&mut self, progress: f64) {
		self.progress = if progress.is_nan() {0.0} else {progress.clamp(0.0, 1.0)};
		self.anchor = None;
	}

	pub fn set_speed(&mut self, speed: f64) {
		if speed > 0.0 && speed.is_finite() {
			self.speed = speed;
			// elapsed time so far stays at the old speed
			if let Some(anchor) = &mut self.anchor {
				*anchor = Anchor::at(anchor.last_frame, self.progress);
			}
		} else {
			warn!("ignoring playback speed {speed}, it must be positive");
		}
	}

	pub fn reset(&mut self) {
		self.pause();
		self.progress = 0.0;
	}

	// one scheduled frame; returns whether progress moved
	pub fn advance(&mut self, now: f64) -> bool {
		if self.state != ClockState::Playing {
			return false;
		}
		let mut anchor = match self.anchor {
			Some(anchor) => anchor,
			// first frame after play or seek only sets the anchor
			None => {
				self.anchor = Some(Anchor::at(now, self.progress));
				return false;
			},
		};

		// a clock that steps backwards contributes nothing
		if now < anchor.last_frame {
			self.anchor = Some(Anchor::at(now, self.progress));
			return false;
		}
		anchor.last_frame = now;
		self.anchor = Some(anchor);

		let before = self.progress;
		let target = anchor.progress + (now - anchor.time) * self.speed / self.base_duration;
		self.progress = target.max(before).min(1.0);

		if self.progress >= 1.0 - END_TOLERANCE {
			self.progress = 1.0;
			self.pause();
			info!("playback reached the end");
		}
		self.progress != before
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn starts_idle_at_zero() {
		let clock = AnimationClock::new(20.0);
		assert_eq!(clock.state(), ClockState::Idle);
		assert_eq!(clock.progress(), 0.0);
		assert!(!clock.frame_scheduled());
	}

	#[test]
	fn full_duration_plays_to_the_end_and_pauses() {
		let mut clock = AnimationClock::new(20.0);
		clock.set_speed(2.0);
		clock.play();
		assert!(!clock.advance(100.0));
		assert!(clock.advance(110.0));
		assert_eq!(clock.progress(), 1.0);
		assert_eq!(clock.state(), ClockState::Paused);
		assert!(!clock.frame_scheduled());
		assert!(!clock.advance(120.0));
	}

	#[test]
	fn first_frame_only_anchors() {
		let mut clock = AnimationClock::new(10.0);
		clock.play();
		assert!(!clock.advance(5000.0));
		assert_eq!(clock.progress(), 0.0);
		clock.advance(5001.0);
		assert!((clock.progress() - 0.1).abs() < 1e-12);
	}

	#[test]
	fn seek_while_playing_does_not_jump() {
		let mut clock = AnimationClock::new(20.0);
		clock.play();
		clock.advance(0.0);
		clock.advance(1.0);
		clock.seek(0.4);
		// long gap between the seek and the next frame
		clock.advance(100.0);
		assert_eq!(clock.progress(), 0.4);
		clock.advance(100.5);
		assert!((clock.progress() - 0.425).abs() < 1e-12);
	}

	#[test]
	fn seek_clamps_and_works_when_paused() {
		let mut clock = AnimationClock::new(20.0);
		clock.seek(1.7);
		assert_eq!(clock.progress(), 1.0);
		clock.seek(-3.0);
		assert_eq!(clock.progress(), 0.0);
		clock.seek(0.25);
		assert_eq!(clock.state(), ClockState::Idle);
		assert_eq!(clock.progress(), 0.25);
	}

	#[test]
	fn pause_freezes_progress() {
		let mut clock = AnimationClock::new(20.0);
		clock.play();
		clock.advance(0.0);
		clock.advance(2.0);
		clock.pause();
		let frozen = clock.progress();
		assert!(!clock.advance(50.0));
		assert_eq!(clock.progress(), frozen);

		// resuming re-anchors instead of applying the paused gap
		clock.play();
		clock.advance(60.0);
		assert_eq!(clock.progress(), frozen);
	}

	#[test]
	fn play_at_end_restarts() {
		let mut clock = AnimationClock::new(20.0);
		clock.seek(1.0);
		clock.play();
		assert_eq!(clock.progress(), 0.0);
		assert!(clock.is_playing());
	}

	#[test]
	fn speed_changes_future_advances_only() {
		let mut clock = AnimationClock::new(10.0);
		clock.play();
		clock.advance(0.0);
		clock.advance(1.0);
		clock.set_speed(3.0);
		assert!((clock.progress() - 0.1).abs() < 1e-12);
		clock.advance(2.0);
		assert!((clock.progress() - 0.4).abs() < 1e-12);

		clock.set_speed(0.0);
		clock.set_speed(-1.0);
		assert_eq!(clock.speed(), 3.0);
	}

	fn frames_to_the_end(fps: f64) -> (u64, AnimationClock) {
		let mut clock = AnimationClock::new(20.0);
		clock.play();
		let mut frame = 0;
		while clock.is_playing() && frame <= 100_000 {
			clock.advance(frame as f64 / fps);
			frame += 1;
		}
		(frame - 1, clock)
	}

	#[test]
	fn common_frame_rates_reach_the_end_on_time() {
		for fps in [30.0, 60.0, 144.0] {
			let (last_frame, clock) = frames_to_the_end(fps);
			assert_eq!(clock.progress(), 1.0, "{fps} fps");
			assert_eq!(clock.state(), ClockState::Paused, "{fps} fps");
			// twenty seconds of frames, not one more
			assert_eq!(last_frame, (20.0 * fps) as u64, "{fps} fps");
		}
	}

	#[test]
	fn sixty_frames_per_second_stays_on_schedule() {
		let mut clock = AnimationClock::new(20.0);
		clock.play();
		for frame in 0..=600 {
			clock.advance(frame as f64 / 60.0);
		}
		assert!((clock.progress() - 0.5).abs() < 1e-12, "{}", clock.progress());
	}

	#[test]
	fn backwards_timestamps_rebase_without_losing_progress() {
		let mut clock = AnimationClock::new(10.0);
		clock.play();
		clock.advance(5.0);
		clock.advance(6.0);
		assert!(!clock.advance(2.0));
		assert!((clock.progress() - 0.1).abs() < 1e-12);
		clock.advance(3.0);
		assert!((clock.progress() - 0.2).abs() < 1e-12);
	}

	#[test]
	fn reset_pauses_and_rewinds() {
		let mut clock = AnimationClock::new(10.0);
		clock.play();
		clock.advance(0.0);
		clock.advance(4.0);
		clock.reset();
		assert_eq!(clock.progress(), 0.0);
		assert_eq!(clock.state(), ClockState::Paused);
		assert!(!clock.snapshot().playing);
	}
}
