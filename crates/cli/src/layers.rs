use std::collections::BTreeMap;

use tabstop_snippet::{SnippetContext, SnippetVarResolver};

/// Variable values from every source, highest priority first: `--var`
/// flags, then the config file's `[vars]`, then the editing context.
pub struct LayeredVars {
	overrides: BTreeMap<String, String>,
	context: SnippetContext,
}

impl LayeredVars {
	pub fn new(config_vars: &BTreeMap<String, String>, cli_vars: &[(String, String)], context: SnippetContext) -> Self {
		let mut overrides = config_vars.clone();
		overrides.extend(cli_vars.iter().cloned());
		Self { overrides, context }
	}
}

impl SnippetVarResolver for LayeredVars {
	fn resolve_var(&self, name: &str) -> Option<String> {
		self.overrides.resolve_var(name).or_else(|| self.context.resolve_var(name))
	}
}
