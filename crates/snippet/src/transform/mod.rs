//! Regex transforms attached to snippet variables and tabstops.
//!
//! A transform `/pattern/format/flags` rewrites the value of its source with
//! a regex substitution. The format is a small template language over the
//! match's capture groups, see [`FormatItem`].

use regex::{Captures, Regex, RegexBuilder};
use thiserror::Error;

use crate::options::SnippetOptions;

#[cfg(test)]
mod tests;

/// Reasons a transform is rejected. A rejected transform is kept as literal
/// text by the parser.
#[derive(Debug, Error)]
pub enum TransformError {
	#[error("unsupported transform flag '{0}'")]
	UnknownFlag(char),
	#[error("pattern is {len} bytes, limit is {max}")]
	PatternTooLong { len: usize, max: usize },
	#[error(transparent)]
	Regex(#[from] regex::Error),
	#[error("format references group {group} but the pattern has {available}")]
	MissingGroup { group: usize, available: usize },
}

/// Case conversion applied by `${N:/name}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseModifier {
	Upcase,
	Downcase,
	Capitalize,
	CamelCase,
	PascalCase,
}

impl CaseModifier {
	pub fn from_name(name: &str) -> Option<Self> {
		match name {
			"upcase" => Some(Self::Upcase),
			"downcase" => Some(Self::Downcase),
			"capitalize" => Some(Self::Capitalize),
			"camelcase" => Some(Self::CamelCase),
			"pascalcase" => Some(Self::PascalCase),
			_ => None,
		}
	}

	pub fn apply(self, text: &str) -> String {
		match self {
			Self::Upcase => text.to_uppercase(),
			Self::Downcase => text.to_lowercase(),
			Self::Capitalize => capitalize(text),
			Self::PascalCase => words(text).map(capitalize).collect(),
			Self::CamelCase => words(text)
				.enumerate()
				.map(|(i, word)| if i == 0 { uncapitalize(word) } else { capitalize(word) })
				.collect(),
		}
	}
}

fn words(text: &str) -> impl Iterator<Item = &str> {
	text.split(|c: char| !c.is_alphanumeric()).filter(|word| !word.is_empty())
}

fn capitalize(text: &str) -> String {
	let mut chars = text.chars();
	match chars.next() {
		Some(first) => first.to_uppercase().chain(chars).collect(),
		None => String::new(),
	}
}

fn uncapitalize(text: &str) -> String {
	let mut chars = text.chars();
	match chars.next() {
		Some(first) => first.to_lowercase().chain(chars).collect(),
		None => String::new(),
	}
}

/// One token of a transform format string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatItem {
	Text(String),
	/// `$N` or `${N}`: the text of capture group `N`, empty if it did not match.
	Group(usize),
	/// `${N:/upcase}` and friends.
	Case(usize, CaseModifier),
	/// `${N:+a}`, `${N:-b}`, `${N:b}` and `${N:?a:b}`.
	Conditional {
		group: usize,
		matched: Vec<FormatItem>,
		unmatched: Vec<FormatItem>,
	},
}

impl FormatItem {
	fn max_group(items: &[FormatItem]) -> Option<usize> {
		items
			.iter()
			.filter_map(|item| match item {
				FormatItem::Text(_) => None,
				FormatItem::Group(group) | FormatItem::Case(group, _) => Some(*group),
				FormatItem::Conditional { group, matched, unmatched } => {
					[Some(*group), Self::max_group(matched), Self::max_group(unmatched)].into_iter().flatten().max()
				}
			})
			.max()
	}

	fn expand(items: &[FormatItem], caps: &Captures<'_>, out: &mut String) {
		for item in items {
			match item {
				FormatItem::Text(text) => out.push_str(text),
				FormatItem::Group(group) => {
					if let Some(m) = caps.get(*group) {
						out.push_str(m.as_str());
					}
				}
				FormatItem::Case(group, modifier) => {
					if let Some(m) = caps.get(*group) {
						out.push_str(&modifier.apply(m.as_str()));
					}
				}
				FormatItem::Conditional { group, matched, unmatched } => {
					let branch = if caps.get(*group).is_some() { matched } else { unmatched };
					Self::expand(branch, caps, out);
				}
			}
		}
	}
}

/// A compiled `/pattern/format/flags` transform.
#[derive(Debug, Clone)]
pub struct Transform {
	regex: Regex,
	format: Vec<FormatItem>,
	flags: String,
	global: bool,
}

impl PartialEq for Transform {
	fn eq(&self, other: &Self) -> bool {
		self.regex.as_str() == other.regex.as_str() && self.format == other.format && self.flags == other.flags
	}
}

impl Transform {
	/// Compiles a transform.
	///
	/// `g` replaces every match instead of the first; `i`, `m`, `s` and `x`
	/// map onto the regex engine's flags; `u` and `y` are accepted and
	/// ignored.
	pub fn new(pattern: &str, format: Vec<FormatItem>, flags: &str, options: &SnippetOptions) -> Result<Self, TransformError> {
		if pattern.len() > options.max_pattern_len {
			return Err(TransformError::PatternTooLong {
				len: pattern.len(),
				max: options.max_pattern_len,
			});
		}

		let mut builder = RegexBuilder::new(pattern);
		builder.size_limit(options.regex_size_limit);
		let mut global = false;
		for flag in flags.chars() {
			match flag {
				'g' => global = true,
				'i' => {
					builder.case_insensitive(true);
				}
				'm' => {
					builder.multi_line(true);
				}
				's' => {
					builder.dot_matches_new_line(true);
				}
				'x' => {
					builder.ignore_whitespace(true);
				}
				'u' | 'y' => {}
				other => return Err(TransformError::UnknownFlag(other)),
			}
		}
		let regex = builder.build()?;

		let available = regex.captures_len() - 1;
		if let Some(group) = FormatItem::max_group(&format)
			&& group > available
		{
			return Err(TransformError::MissingGroup { group, available });
		}

		Ok(Self {
			regex,
			format,
			flags: flags.to_string(),
			global,
		})
	}

	pub fn pattern(&self) -> &str {
		self.regex.as_str()
	}

	pub fn format(&self) -> &[FormatItem] {
		&self.format
	}

	pub fn flags(&self) -> &str {
		&self.flags
	}

	pub fn is_global(&self) -> bool {
		self.global
	}

	/// Rewrites `input`: the first match, or every match with `g`, is
	/// replaced by the expanded format. Text outside matches is kept.
	pub fn apply(&self, input: &str) -> String {
		let limit = if self.global { usize::MAX } else { 1 };
		let mut out = String::with_capacity(input.len());
		let mut last = 0;
		for caps in self.regex.captures_iter(input).take(limit) {
			let Some(whole) = caps.get(0) else {
				continue;
			};
			out.push_str(&input[last..whole.start()]);
			FormatItem::expand(&self.format, &caps, &mut out);
			last = whole.end();
		}
		out.push_str(&input[last..]);
		out
	}
}
