//! `tabstop` command-line front end.
//!
//! Expands a snippet against an editing context assembled from flags and the
//! config file, printing either the text or the full expansion as JSON.

use std::io::Write;
use std::path::Path;

use anyhow::Context;
use clap::Parser;
use tabstop_snippet::{KNOWN_VARIABLES, SnippetContext, SnippetParser, SnippetVarResolver};
use tracing::{debug, info};

mod cli;
mod config;
mod layers;

use cli::{Cli, Command, ContextArgs, ExpandArgs};
use config::Config;
use layers::LayeredVars;

fn main() -> anyhow::Result<()> {
	let cli = Cli::parse();

	setup_tracing(cli.verbose);

	let config = Config::load(cli.config.as_deref())?;
	match cli.command {
		Command::Expand(args) => run_expand(&config, args),
		Command::Vars(args) => run_vars(&config, &args),
	}
}

fn setup_tracing(verbose: bool) {
	use tracing_subscriber::EnvFilter;

	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
		if verbose {
			EnvFilter::new("tabstop=trace,tabstop_snippet=trace,info")
		} else {
			EnvFilter::new("tabstop=info,tabstop_snippet=info,warn")
		}
	});

	tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).with_target(true).init();
}

fn run_expand(config: &Config, args: ExpandArgs) -> anyhow::Result<()> {
	let source = match (args.snippet, args.input.as_deref()) {
		(Some(source), _) => source,
		(None, Some(path)) => read_source(path)?,
		(None, None) => std::io::read_to_string(std::io::stdin()).context("failed to read snippet from stdin")?,
	};
	debug!(len = source.len(), "read snippet source");

	let vars = LayeredVars::new(&config.vars, &args.context.vars, context(&args.context));
	let snippet = SnippetParser::with_options(config.options).parse(&source);
	let expansion = snippet.expand(&vars).context("failed to expand snippet")?;
	info!(regions = expansion.regions.len(), values = expansion.values.len(), "expanded snippet");

	let mut stdout = std::io::stdout().lock();
	if args.json {
		serde_json::to_writer_pretty(&mut stdout, &expansion).context("failed to serialize expansion")?;
		writeln!(stdout)?;
	} else {
		write!(stdout, "{}", expansion.text)?;
	}
	stdout.flush()?;
	Ok(())
}

fn run_vars(config: &Config, args: &ContextArgs) -> anyhow::Result<()> {
	let vars = LayeredVars::new(&config.vars, &args.vars, context(args));
	let mut stdout = std::io::stdout().lock();
	for name in KNOWN_VARIABLES {
		match vars.resolve_var(name) {
			Some(value) => writeln!(stdout, "{name}={value}")?,
			None => writeln!(stdout, "{name}")?,
		}
	}
	Ok(())
}

fn read_source(path: &Path) -> anyhow::Result<String> {
	std::fs::read_to_string(path).with_context(|| format!("failed to read snippet {}", path.display()))
}

fn context(args: &ContextArgs) -> SnippetContext {
	SnippetContext {
		file_path: args.file.clone(),
		workspace_folder: args.workspace.clone(),
		selection: args.selection.clone(),
		clipboard: args.clipboard.clone(),
		..SnippetContext::default()
	}
}
