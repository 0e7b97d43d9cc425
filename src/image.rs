use std::fs::File;
use std::io::Write;
use std::path::Path;

use log::info;
use ndarray::{Array2, Axis};

use crate::error::ImageError;
use crate::optics::{PointAppearance, WarpStreaks};
use crate::quat::Quat;
use crate::vec3::{Colour3, Vec3};

const XAXIS: Axis = Axis(1);
const YAXIS: Axis = Axis(0);

// star splats never grow past this many pixels across
const MAX_SPLAT_RADIUS: f64 = 4.0;
// longest warp streak as a share of the image width
const STREAK_LENGTH: f64 = 0.12;

// pinhole camera looking down the orientation's forward axis
#[derive(Clone, Copy, Debug)]
pub struct Projection {
	forward: Vec3,
	up: Vec3,
	right: Vec3,
	half_width: f64,
	half_height: f64,
	width: usize,
	height: usize,
}

impl Projection {
	pub fn new(orientation: Quat, width: usize, height: usize, vfov_deg: f64) -> Self {
		let half_height = (vfov_deg.to_radians() / 2.0).tan();
		let aspect = width as f64 / height.max(1) as f64;
		Projection {
			forward: orientation.forward(),
			up: orientation.up(),
			right: orientation.right(),
			half_width: half_height * aspect,
			half_height,
			width,
			height,
		}
	}

	// pixel coordinates of a direction, None when it is behind the camera
	pub fn project(&self, direction: Vec3) -> Option<(f64, f64)> {
		let depth = direction.dot(self.forward);
		if depth <= 1e-6 {
			return None;
		}
		let x = direction.dot(self.right) / (depth * self.half_width);
		let y = direction.dot(self.up) / (depth * self.half_height);
		Some((
			0.5 * (x + 1.0) * self.width as f64,
			0.5 * (1.0 - y) * self.height as f64,
		))
	}

	pub fn contains(&self, (x, y): (f64, f64)) -> bool {
		x >= 0.0 && y >= 0.0 && x < self.width as f64 && y < self.height as f64
	}
}

pub struct Image(pub Array2<Colour3>);

impl Image {
	pub fn new(width: usize, height: usize) -> Image {
		Image(Array2::from_elem((height, width), Colour3::default()))
	}

	pub fn width(&self) -> usize {
		self.0.len_of(XAXIS)
	}

	pub fn height(&self) -> usize {
		self.0.len_of(YAXIS)
	}

	pub fn pixel(&self, x: usize, y: usize) -> Option<Colour3> {
		self.0.get((y, x)).copied()
	}

	// add light around a subpixel position, fading linearly to the radius
	pub fn splat(&mut self, (cx, cy): (f64, f64), colour: Colour3, radius: f64) {
		let radius = radius.clamp(0.5, MAX_SPLAT_RADIUS);
		let x0 = (cx - radius).floor().max(0.0) as usize;
		let y0 = (cy - radius).floor().max(0.0) as usize;
		let x1 = ((cx + radius).ceil().max(0.0) as usize).min(self.width());
		let y1 = ((cy + radius).ceil().max(0.0) as usize).min(self.height());

		for y in y0..y1 {
			for x in x0..x1 {
				let dx = x as f64 + 0.5 - cx;
				let dy = y as f64 + 0.5 - cy;
				let weight = 1.0 - (dx * dx + dy * dy).sqrt() / (radius + 0.5);
				if weight > 0.0 {
					self.0[(y, x)] += weight * colour;
				}
			}
		}
	}

	// each star at its aberrated direction, tinted and scaled by beaming
	pub fn draw_starfield(&mut self, points: &[PointAppearance], projection: &Projection) -> usize {
		let mut drawn = 0;
		for point in points {
			let Some(position) = projection.project(point.direction) else {
				continue;
			};
			if !projection.contains(position) {
				continue;
			}
			self.splat(position, point.opacity * point.colour, 0.5 * point.size.sqrt());
			drawn += 1;
		}
		drawn
	}

	// radial lines pointing away from where the ship is heading
	pub fn draw_warp(&mut self, streaks: &WarpStreaks, points: &[PointAppearance], projection: &Projection) {
		if !streaks.active() {
			return;
		}
		let centre = projection.project(streaks.direction)
			.unwrap_or((0.5 * self.width() as f64, 0.5 * self.height() as f64));
		let max_length = STREAK_LENGTH * self.width() as f64 * streaks.intensity;

		for point in points {
			let Some((x, y)) = projection.project(point.direction) else {
				continue;
			};
			if !projection.contains((x, y)) {
				continue;
			}
			let (dx, dy) = (x - centre.0, y - centre.1);
			let distance = (dx * dx + dy * dy).sqrt();
			if distance < 1.0 {
				continue;
			}
			let (ux, uy) = (dx / distance, dy / distance);
			let length = max_length * point.opacity;
			let steps = length.ceil() as usize;
			for step in 0..steps {
				let s = step as f64;
				let fade = streaks.intensity * (1.0 - s / length).max(0.0);
				let (px, py) = (x + ux * s, y + uy * s);
				if !projection.contains((px, py)) {
					break;
				}
				self.0[(py as usize, px as usize)] += (0.25 * fade) * point.colour;
			}
		}
	}

	pub fn normalize(&mut self) {
		// exposure from the mean and spread of brightness, Welford's algorithm
		let mut count: f64 = 0.0;
		let mut mean: f64 = 0.0;
		let mut m2: f64 = 0.0;

		for colour in self.0.iter() {
			let brightness = colour.max_component();
			count += 1.0;
			let delta = brightness - mean;
			mean += delta / count;
			let delta2 = brightness - mean;
			m2 += delta * delta2;
		}
		if count == 0.0 {
			return;
		}

		let stdev = (m2 / count).sqrt();
		let exposure = mean + 1.5 * stdev;
		// nothing was drawn
		if !(exposure > 0.0) {
			return;
		}
		let adjust = 1.0 / exposure;

		for colour in self.0.iter_mut() {
			*colour *= adjust;
			if colour.max_component() > 1.0 {
				*colour /= colour.max_component();
			}
		}
	}

	// binary PPM, gamma corrected
	pub fn to_ppm(&self) -> Result<Vec<u8>, ImageError> {
		if self.0.is_empty() {
			return Err(ImageError::Empty);
		}
		let mut result = vec![b'P', b'6', b'\n'];
		result.extend_from_slice(self.width().to_string().as_bytes());
		result.push(b' ');
		result.extend_from_slice(self.height().to_string().as_bytes());
		result.extend_from_slice(b"\n255\n");

		for colour in self.0.iter() {
			let colour = colour.add_gamma();
			for value in [colour.x, colour.y, colour.z] {
				result.push((value.clamp(0.0, 1.0) * 255.0) as u8)
			}
		}
		Ok(result)
	}

	pub fn write_ppm(&self, filename: &Path) -> Result<(), ImageError> {
		let bytes = self.to_ppm()?;
		let to_error = |source| ImageError::Write {
			path: filename.to_path_buf(),
			source,
		};
		let mut file = File::create(filename).map_err(to_error)?;
		file.write_all(&bytes).map_err(to_error)?;
		info!("wrote {}x{} snapshot to {}", self.width(), self.height(), filename.display());
		Ok(())
	}
}
