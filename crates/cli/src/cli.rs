use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "tabstop")]
#[command(about = "Expand LSP snippets into text and linked regions")]
#[command(version)]
/// Command-line arguments.
pub struct Cli {
	/// Configuration file (defaults to <config dir>/tabstop/config.toml)
	#[arg(long, global = true, value_name = "PATH")]
	pub config: Option<PathBuf>,

	/// Verbose logging
	#[arg(short, long, global = true)]
	pub verbose: bool,

	/// Subcommand to execute.
	#[command(subcommand)]
	pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
	/// Expand a snippet and print the result
	Expand(ExpandArgs),
	/// List recognized variables and the values they resolve to
	Vars(ContextArgs),
}

#[derive(Args, Debug)]
pub struct ExpandArgs {
	/// Snippet source (read from --input or stdin if omitted)
	pub snippet: Option<String>,

	/// Read the snippet source from a file
	#[arg(long, short, value_name = "PATH", conflicts_with = "snippet")]
	pub input: Option<PathBuf>,

	/// Print text, regions, values and choices as JSON
	#[arg(long)]
	pub json: bool,

	/// Editing context for variables.
	#[command(flatten)]
	pub context: ContextArgs,
}

#[derive(Args, Debug, Default)]
pub struct ContextArgs {
	/// Fixed variable value, overriding the computed context (repeatable)
	#[arg(long = "var", value_name = "NAME=VALUE", value_parser = parse_var)]
	pub vars: Vec<(String, String)>,

	/// File the snippet is inserted into
	#[arg(long, value_name = "PATH")]
	pub file: Option<PathBuf>,

	/// Workspace folder containing the file
	#[arg(long, value_name = "PATH")]
	pub workspace: Option<PathBuf>,

	/// Currently selected text
	#[arg(long)]
	pub selection: Option<String>,

	/// Clipboard contents
	#[arg(long)]
	pub clipboard: Option<String>,
}

fn parse_var(raw: &str) -> Result<(String, String), String> {
	let (name, value) = raw.split_once('=').ok_or_else(|| format!("expected NAME=VALUE, got '{raw}'"))?;
	if name.is_empty() {
		return Err(format!("empty variable name in '{raw}'"));
	}
	Ok((name.to_string(), value.to_string()))
}
