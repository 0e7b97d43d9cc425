use crate::vec3::*;

// incandescance constaints
const KB: f64 = 1.380649e-23;// J/K
const H: f64 = 6.62607015e-34;// J/Hz
const C: f64 = 299792458.0;// m/s

// the three wavelengths the rgb channels sample
pub const RED: f64 = 640e-9;
pub const GREEN: f64 = 545e-9;
pub const BLUE: f64 = 450e-9;

// targets for the doppler tint
pub const BLUE_WHITE: Colour3 = Colour3::new(0.62, 0.74, 1.0);
pub const DEEP_RED: Colour3 = Colour3::new(1.0, 0.22, 0.08);

// "warmer" colours have lower temperature when incandescing
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Incandescant {
	temperature: f64,// in kelvins
	attenuation: f64,
}

impl Incandescant {
	pub fn new(temperature: f64, attenuation: f64) -> Incandescant {
		Incandescant {
			temperature,
			attenuation,
		}
	}

	// spectral radiance from Planck's law, all values in SI units
	pub fn radiance(&self, wavelength: f64) -> f64 {
		let f = C / wavelength;
		let exponential = ((H*f)/(KB*self.temperature)).exp() - 1.0;
		self.attenuation * (2.0 * H * f.powi(3)) / (C.powi(2) * exponential)
	}

	// hue only: the brightest channel is scaled to 1
	pub fn rgb(&self) -> Colour3 {
		let raw = Colour3::new(self.radiance(RED), self.radiance(GREEN), self.radiance(BLUE));
		let peak = raw.max_component();
		if peak > 0.0 && peak.is_finite() {
			raw / peak
		} else {
			Colour3::grey(1.0)
		}
	}
}

pub fn blend(from: Colour3, to: Colour3, amount: f64) -> Colour3 {
	from.lerp(to, amount.clamp(0.0, 1.0))
}

// blueshifted light whitens towards blue, redshifted light reddens
pub fn doppler_tint(base: Colour3, doppler: f64) -> Colour3 {
	if doppler > 1.0 {
		blend(base, BLUE_WHITE, doppler - 1.0)
	} else if doppler < 1.0 {
		blend(base, DEEP_RED, 1.0 - doppler)
	} else {
		base
	}
}
