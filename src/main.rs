use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use log::{error, info, warn};

use relativistic_playback::config::PlaybackConfig;
use relativistic_playback::error::PlaybackError;
use relativistic_playback::frame::*;
use relativistic_playback::interpolate::InterpolatedState;
use relativistic_playback::kinematics::demo_mission;
use relativistic_playback::mission::*;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Demo {
	ConstantVelocity,
	ConstantAcceleration,
}

impl From<Demo> for TrajectoryModel {
	fn from(demo: Demo) -> Self {
		match demo {
			Demo::ConstantVelocity => TrajectoryModel::ConstantVelocity,
			Demo::ConstantAcceleration => TrajectoryModel::ConstantAcceleration,
		}
	}
}

/// Plays a relativistic mission back frame by frame and writes starfield snapshots.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
	/// Trajectory solver response (JSON) to play back.
	#[arg(long, conflicts_with = "demo")]
	response: Option<PathBuf>,

	/// Built in round trip to play when no response is given.
	#[arg(long, value_enum, default_value_t = Demo::ConstantVelocity)]
	demo: Demo,

	/// TOML playback configuration.
	#[arg(long)]
	config: Option<PathBuf>,

	/// Frames to simulate.
	#[arg(long, default_value_t = 600)]
	frames: u64,

	/// Simulated frames per second of wall clock time.
	#[arg(long, default_value_t = 30.0)]
	fps: f64,

	/// Playback speed multiplier, overrides the config.
	#[arg(long)]
	speed: Option<f64>,

	/// Start position, 0 to 1.
	#[arg(long)]
	seek: Option<f64>,

	/// Write the final frame as a PPM image.
	#[arg(long)]
	snapshot: Option<PathBuf>,

	/// Also write a numbered snapshot every N frames (needs --snapshot).
	#[arg(long, requires = "snapshot")]
	snapshot_every: Option<u64>,
}

// min and max over the frames that were rendered
#[derive(Default)]
struct Summary {
	frames: u64,
	snapshots: u64,
	last: Option<InterpolatedState>,
	peak_beta: f64,
	peak_gamma: f64,
	closest: Option<f64>,
}

impl Summary {
	fn record(&mut self, state: InterpolatedState) {
		self.frames += 1;
		self.peak_beta = self.peak_beta.max(state.beta);
		self.peak_gamma = self.peak_gamma.max(state.gamma);
		self.closest = Some(self.closest.map_or(state.reference_distance, |d| d.min(state.reference_distance)));
		self.last = Some(state);
	}

	fn print(&self) {
		println!("frames rendered      {}", self.frames);
		println!("snapshots written    {}", self.snapshots);
		if let Some(state) = &self.last {
			println!("final progress       {:.4}", state.progress);
			println!("coordinate time      {:.4} yr", state.coord_time);
			println!("proper time          {:.4} yr", state.proper_time);
			println!("phase                {}", state.phase);
		}
		println!("peak beta            {:.4}", self.peak_beta);
		println!("peak gamma           {:.4}", self.peak_gamma);
		if let Some(closest) = self.closest {
			println!("closest to earth     {closest:.3} AU");
		}
	}
}

fn load_mission(args: &Args) -> Result<Mission, PlaybackError> {
	match &args.response {
		Some(path) => {
			let mission = SolveResponse::load(path)?.into_mission()?;
			Ok(mission)
		}
		None => {
			info!("no solver response given, playing the {:?} demo", args.demo);
			Ok(demo_mission(args.demo.into()))
		}
	}
}

fn numbered(path: &Path, index: u64) -> PathBuf {
	let stem = path.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
	let extension = path.extension().map(|s| s.to_string_lossy().into_owned()).unwrap_or_else(|| "ppm".to_string());
	path.with_file_name(format!("{stem}-{index:05}.{extension}"))
}

fn run(args: Args) -> Result<Summary, PlaybackError> {
	let config = match &args.config {
		Some(path) => PlaybackConfig::load(path)?,
		None => PlaybackConfig::default(),
	};
	let mut playback = Playback::new(config);
	playback.load_mission(load_mission(&args)?);

	if let Some(speed) = args.speed {
		playback.clock_mut().set_speed(speed);
	}
	if let Some(progress) = args.seek {
		playback.clock_mut().seek(progress);
	}
	playback.clock_mut().play();

	let fps = if args.fps > 0.0 {
		args.fps
	} else {
		warn!("fps {} is not positive, using 30", args.fps);
		30.0
	};

	let mut summary = Summary::default();
	let mut last_output = None;
	for frame in 0..args.frames {
		let now = frame as f64 / fps;
		let Some(output) = playback.frame(now) else {
			continue;
		};
		summary.record(output.state);

		if let (Some(path), Some(every)) = (&args.snapshot, args.snapshot_every) {
			if every > 0 && output.index % every == 0 {
				playback.render(&output).write_ppm(&numbered(path, output.index))?;
				summary.snapshots += 1;
			}
		}
		let finished = !playback.clock().is_playing();
		last_output = Some(output);
		if finished {
			info!("stopping after frame {frame}");
			break;
		}
	}

	if let (Some(path), Some(output)) = (&args.snapshot, &last_output) {
		playback.render(output).write_ppm(path)?;
		summary.snapshots += 1;
	}
	Ok(summary)
}

fn main() -> ExitCode {
	env_logger::init();
	let args = Args::parse();

	match run(args) {
		Ok(summary) => {
			summary.print();
			ExitCode::SUCCESS
		}
		Err(err) => {
			error!("{err}");
			eprintln!("error: {err}");
			ExitCode::FAILURE
		}
	}
}
