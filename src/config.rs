use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::RopelineResult;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
	// Longest request line accepted, in bytes
	pub max_message: usize,
	// Deduplicate leaves of every line before writing the file
	pub reduce_on_save: bool,
	// Used when RUST_LOG is not set
	pub log_filter: String,
}

impl Default for Config {
	fn default() -> Self {
		Config {
			max_message: 1024,
			reduce_on_save: true,
			log_filter: "info".to_string(),
		}
	}
}

impl Config {
	pub fn load<P: AsRef<Path>>(path: P) -> RopelineResult<Config> {
		Ok(serde_json::from_slice(&fs::read(path)?)?)
	}
}
