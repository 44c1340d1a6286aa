//! TOML configuration for the command-line front end.
//!
//! ```toml
//! [options]
//! max-pattern-len = 512
//!
//! [vars]
//! LINE_COMMENT = "//"
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;
use tabstop_snippet::SnippetOptions;

#[derive(Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
	/// Parser limits.
	pub options: SnippetOptions,
	/// Fixed variable values layered over the computed context.
	pub vars: BTreeMap<String, String>,
}

impl Config {
	pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
		toml::from_str(text)
	}

	/// Loads `explicit`, or the default config file if it exists.
	///
	/// An explicitly named file must exist; a missing default file yields the
	/// default configuration.
	pub fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
		let path = match explicit {
			Some(path) => path.to_path_buf(),
			None => match default_path() {
				Some(path) if path.exists() => path,
				_ => {
					tracing::debug!("no config file, using defaults");
					return Ok(Self::default());
				}
			},
		};

		let text = std::fs::read_to_string(&path).with_context(|| format!("failed to read config {}", path.display()))?;
		let config = Self::parse(&text).with_context(|| format!("invalid config {}", path.display()))?;
		tracing::debug!(path = %path.display(), vars = config.vars.len(), "loaded config");
		Ok(config)
	}
}

pub fn default_path() -> Option<PathBuf> {
	dirs::config_dir().map(|dir| dir.join("tabstop").join("config.toml"))
}
