//! Parser limits.

use serde::{Deserialize, Serialize};

/// Default upper bound on a transform pattern, in bytes.
pub const DEFAULT_MAX_PATTERN_LEN: usize = 1024;

/// Default compiled-regex size limit, in bytes.
pub const DEFAULT_REGEX_SIZE_LIMIT: usize = 1 << 20;

/// Default limit on nested `${…}` constructs.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Limits applied while parsing snippets.
///
/// Transform patterns come from language servers and are compiled eagerly,
/// so the parser bounds both the source length and the compiled program
/// size. A pattern exceeding either bound is treated as a malformed
/// transform and the whole construct stays literal. Constructs nested
/// deeper than `max_depth`, including `${N:…}` items of transform formats,
/// stay literal the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SnippetOptions {
	/// Longest accepted transform pattern, in bytes.
	pub max_pattern_len: usize,
	/// Size limit handed to the regex compiler.
	pub regex_size_limit: usize,
	/// Deepest accepted nesting of `${…}` constructs.
	pub max_depth: usize,
}

impl Default for SnippetOptions {
	fn default() -> Self {
		Self {
			max_pattern_len: DEFAULT_MAX_PATTERN_LEN,
			regex_size_limit: DEFAULT_REGEX_SIZE_LIMIT,
			max_depth: DEFAULT_MAX_DEPTH,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn missing_fields_fall_back_to_defaults() {
		let options: SnippetOptions = toml::from_str("max-pattern-len = 16").unwrap();
		assert_eq!(options.max_pattern_len, 16);
		assert_eq!(options.regex_size_limit, DEFAULT_REGEX_SIZE_LIMIT);
		assert_eq!(options.max_depth, DEFAULT_MAX_DEPTH);
	}

	#[test]
	fn reads_max_depth() {
		let options: SnippetOptions = toml::from_str("max-depth = 4").unwrap();
		assert_eq!(options.max_depth, 4);
	}

	#[test]
	fn empty_table_is_default() {
		let options: SnippetOptions = toml::from_str("").unwrap();
		assert_eq!(options, SnippetOptions::default());
	}
}
