use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum MissionError {
	#[error("failed to read solver response {path}: {source}")]
	Read {
		path: PathBuf,
		source: std::io::Error,
	},

	#[error("failed to parse solver response: {0}")]
	Parse(#[from] serde_json::Error),

	#[error("trajectory solver reported an error: {0}")]
	Solver(String),

	#[error("solver response is missing {0}")]
	Missing(&'static str),

	#[error("{name} has {found} entries, expected {expected}")]
	LengthMismatch {
		name: &'static str,
		expected: usize,
		found: usize,
	},
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	#[error("failed to read config {path}: {source}")]
	Read {
		path: PathBuf,
		source: std::io::Error,
	},

	#[error("failed to parse TOML config: {0}")]
	Parse(#[from] toml::de::Error),

	#[error("failed to serialize config: {0}")]
	Serialize(#[from] toml::ser::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum ImageError {
	#[error("failed to write image {path}: {source}")]
	Write {
		path: PathBuf,
		source: std::io::Error,
	},

	#[error("image has no pixels")]
	Empty,
}

#[derive(Debug, thiserror::Error)]
pub enum PlaybackError {
	#[error(transparent)]
	Mission(#[from] MissionError),

	#[error(transparent)]
	Config(#[from] ConfigError),

	#[error(transparent)]
	Image(#[from] ImageError),
}
