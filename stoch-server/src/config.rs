use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;
use stoch_core::ModelConfig;

/// Server settings, read from a TOML file.
///
/// Every field is optional in the file; missing ones take the defaults
/// below.
///
/// ```toml
/// host = "0.0.0.0"
/// port = 5000
/// preload = "./data"
///
/// [model]
/// order = "first"
/// overflow = "saturate"
/// ```
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
	pub host: String,
	pub port: u16,

	/// Size used when `/v1/generate` is called without `size`.
	pub default_size: usize,

	/// Largest accepted generation request.
	pub max_size: usize,

	/// Largest accepted training body, in bytes.
	pub max_train_bytes: usize,

	/// File or directory to train on at startup.
	pub preload: Option<PathBuf>,

	pub model: ModelConfig,
}

impl Default for ServerConfig {
	fn default() -> Self {
		Self {
			host: "127.0.0.1".to_owned(),
			port: 5000,
			default_size: 256,
			max_size: 1 << 20,
			max_train_bytes: 1 << 20,
			preload: None,
			model: ModelConfig::default(),
		}
	}
}

impl ServerConfig {
	/// Loads the configuration file, or the defaults when no path is given.
	pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
		let config = match path {
			Some(path) => {
				let text = fs::read_to_string(path)
					.with_context(|| format!("failed to read config file {}", path.display()))?;
				Self::parse(&text).with_context(|| format!("invalid config file {}", path.display()))?
			}
			None => Self::default(),
		};
		Ok(config)
	}

	pub fn parse(text: &str) -> anyhow::Result<Self> {
		let config: Self = toml::from_str(text)?;
		config.model.validate()?;
		if config.default_size == 0 || config.default_size > config.max_size {
			anyhow::bail!("default_size must be between 1 and max_size ({})", config.max_size);
		}
		Ok(config)
	}
}
