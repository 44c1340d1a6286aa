//! Snippet variables: the recognized catalog, the resolver seam, and a
//! resolver backed by an editing context (paths, selection, time).

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Datelike, Local, Timelike};
use uuid::Uuid;


/// Variable names the engine knows about.
///
/// For these a missing value means "currently empty" and the variable's
/// default is used. Any other name is a named tabstop.
pub const KNOWN_VARIABLES: &[&str] = &[
	"TM_SELECTED_TEXT",
	"TM_CURRENT_LINE",
	"TM_CURRENT_WORD",
	"TM_LINE_INDEX",
	"TM_LINE_NUMBER",
	"TM_FILENAME",
	"TM_FILENAME_BASE",
	"TM_DIRECTORY",
	"TM_FILEPATH",
	"RELATIVE_FILEPATH",
	"CLIPBOARD",
	"WORKSPACE_NAME",
	"WORKSPACE_FOLDER",
	"CURSOR_INDEX",
	"CURSOR_NUMBER",
	"CURRENT_YEAR",
	"CURRENT_YEAR_SHORT",
	"CURRENT_MONTH",
	"CURRENT_MONTH_NAME",
	"CURRENT_MONTH_NAME_SHORT",
	"CURRENT_DATE",
	"CURRENT_DAY_NAME",
	"CURRENT_DAY_NAME_SHORT",
	"CURRENT_HOUR",
	"CURRENT_MINUTE",
	"CURRENT_SECOND",
	"CURRENT_SECONDS_UNIX",
	"CURRENT_TIMEZONE_OFFSET",
	"RANDOM",
	"RANDOM_HEX",
	"UUID",
	"BLOCK_COMMENT_START",
	"BLOCK_COMMENT_END",
	"LINE_COMMENT",
	"SELECTION",
];

pub fn is_known_variable(name: &str) -> bool {
	KNOWN_VARIABLES.contains(&name)
}

/// Supplies values for recognized snippet variables.
pub trait SnippetVarResolver {
	fn resolve_var(&self, name: &str) -> Option<String>;
}

impl<F> SnippetVarResolver for F
where
	F: Fn(&str) -> Option<String>,
{
	fn resolve_var(&self, name: &str) -> Option<String> {
		self(name)
	}
}

impl SnippetVarResolver for HashMap<String, String> {
	fn resolve_var(&self, name: &str) -> Option<String> {
		self.get(name).cloned()
	}
}

impl SnippetVarResolver for BTreeMap<String, String> {
	fn resolve_var(&self, name: &str) -> Option<String> {
		self.get(name).cloned()
	}
}

/// Resolver with no values; every recognized variable is empty.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoVars;

impl SnippetVarResolver for NoVars {
	fn resolve_var(&self, _name: &str) -> Option<String> {
		None
	}
}

/// Editing context a snippet is expanded in.
///
/// The timestamp is captured once so every date/time variable in one
/// expansion agrees.
#[derive(Debug, Clone)]
pub struct SnippetContext {
	pub file_path: Option<PathBuf>,
	pub workspace_folder: Option<PathBuf>,
	pub selection: Option<String>,
	pub clipboard: Option<String>,
	pub current_line: Option<String>,
	pub current_word: Option<String>,
	/// Zero-based line of the cursor.
	pub line_index: Option<usize>,
	/// Zero-based index of the cursor among multiple cursors.
	pub cursor_index: Option<usize>,
	pub line_comment: Option<String>,
	pub block_comment: Option<(String, String)>,
	pub now: DateTime<Local>,
}

impl Default for SnippetContext {
	fn default() -> Self {
		Self::at(Local::now())
	}
}

impl SnippetContext {
	pub fn at(now: DateTime<Local>) -> Self {
		Self {
			file_path: None,
			workspace_folder: None,
			selection: None,
			clipboard: None,
			current_line: None,
			current_word: None,
			line_index: None,
			cursor_index: None,
			line_comment: None,
			block_comment: None,
			now,
		}
	}

	fn relative_path(&self) -> Option<String> {
		let path = self.file_path.as_deref()?;
		let relative = self.workspace_folder.as_deref().and_then(|root| path.strip_prefix(root).ok()).unwrap_or(path);
		Some(lossy(relative))
	}
}

impl SnippetVarResolver for SnippetContext {
	fn resolve_var(&self, name: &str) -> Option<String> {
		let now = &self.now;
		match name {
			"TM_FILEPATH" => self.file_path.as_deref().map(lossy),
			"TM_DIRECTORY" => self.file_path.as_deref().and_then(Path::parent).map(lossy),
			"TM_FILENAME" => self.file_path.as_deref().and_then(Path::file_name).map(|name| name.to_string_lossy().to_string()),
			"TM_FILENAME_BASE" => self.file_path.as_deref().and_then(Path::file_stem).map(|stem| stem.to_string_lossy().to_string()),
			"RELATIVE_FILEPATH" => self.relative_path(),
			"WORKSPACE_FOLDER" => self.workspace_folder.as_deref().map(lossy),
			"WORKSPACE_NAME" => self
				.workspace_folder
				.as_deref()
				.and_then(Path::file_name)
				.map(|name| name.to_string_lossy().to_string()),
			"SELECTION" | "TM_SELECTED_TEXT" => self.selection.clone().filter(|text| !text.is_empty()),
			"TM_CURRENT_LINE" => self.current_line.clone(),
			"TM_CURRENT_WORD" => self.current_word.clone(),
			"CLIPBOARD" => self.clipboard.clone(),
			"TM_LINE_INDEX" => self.line_index.map(|line| line.to_string()),
			"TM_LINE_NUMBER" => self.line_index.map(|line| (line + 1).to_string()),
			"CURSOR_INDEX" => self.cursor_index.map(|cursor| cursor.to_string()),
			"CURSOR_NUMBER" => self.cursor_index.map(|cursor| (cursor + 1).to_string()),
			"CURRENT_YEAR" => Some(format!("{:04}", now.year())),
			"CURRENT_YEAR_SHORT" => Some(format!("{:02}", now.year().rem_euclid(100))),
			"CURRENT_MONTH" => Some(format!("{:02}", now.month())),
			"CURRENT_MONTH_NAME" => Some(now.format("%B").to_string()),
			"CURRENT_MONTH_NAME_SHORT" => Some(now.format("%b").to_string()),
			"CURRENT_DATE" => Some(format!("{:02}", now.day())),
			"CURRENT_DAY_NAME" => Some(now.format("%A").to_string()),
			"CURRENT_DAY_NAME_SHORT" => Some(now.format("%a").to_string()),
			"CURRENT_HOUR" => Some(format!("{:02}", now.hour())),
			"CURRENT_MINUTE" => Some(format!("{:02}", now.minute())),
			"CURRENT_SECOND" => Some(format!("{:02}", now.second())),
			"CURRENT_SECONDS_UNIX" => Some(now.timestamp().to_string()),
			"CURRENT_TIMEZONE_OFFSET" => Some(now.format("%:z").to_string()),
			"RANDOM" => Some(format!("{:06}", Uuid::new_v4().as_u128() % 1_000_000)),
			"RANDOM_HEX" => Some(format!("{:06x}", Uuid::new_v4().as_u128() & 0xff_ffff)),
			"UUID" => Some(Uuid::new_v4().to_string()),
			"LINE_COMMENT" => self.line_comment.clone(),
			"BLOCK_COMMENT_START" => self.block_comment.as_ref().map(|(start, _)| start.clone()),
			"BLOCK_COMMENT_END" => self.block_comment.as_ref().map(|(_, end)| end.clone()),
			_ => None,
		}
	}
}

fn lossy(path: &Path) -> String {
	path.to_string_lossy().to_string()
}
