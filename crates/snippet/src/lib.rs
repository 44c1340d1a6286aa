//! LSP snippet expansion.
//!
//! Expands completion snippets (`for ${1:i} in ${2:iter} {\n\t$0\n}`) into
//! flat text plus the linked regions an editor keeps synchronized while the
//! user fills in placeholders:
//!
//! 1. [`SnippetParser`] turns the source into a [`Snippet`] node tree.
//!    Malformed constructs stay literal; parsing never fails.
//! 2. [`resolve`] assigns every placeholder key its value, consulting a
//!    [`SnippetVarResolver`] for recognized variables and rejecting cyclic
//!    defaults.
//! 3. [`render`] flattens the tree into an [`Expansion`].
//!
//! ```
//! use tabstop_snippet::{NoVars, expand};
//!
//! let expansion = expand("$1 ${1:${2:a}}", &NoVars).unwrap();
//! assert_eq!(expansion.text, "a a");
//! assert_eq!(expansion.regions_of("2"), &[0, 2]);
//! ```

mod error;
mod options;
mod render;
mod resolve;
mod syntax;
mod transform;
mod vars;

pub use error::{Result, SnippetError};
pub use options::{DEFAULT_MAX_DEPTH, DEFAULT_MAX_PATTERN_LEN, DEFAULT_REGEX_SIZE_LIMIT, SnippetOptions};
pub use render::{Expansion, render};
pub use resolve::{Resolution, resolve};
pub use syntax::{Choice, IndexId, IndexTable, Node, Snippet, SnippetParser, TabStop, Variable, escape_literal, parse_snippet};
pub use transform::{CaseModifier, FormatItem, Transform, TransformError};
pub use vars::{KNOWN_VARIABLES, NoVars, SnippetContext, SnippetVarResolver, is_known_variable};

impl Snippet {
	/// Resolves and renders this snippet.
	///
	/// # Errors
	///
	/// Returns [`SnippetError::CyclicDependency`] if a placeholder's default
	/// depends on itself.
	pub fn expand<R>(&self, vars: &R) -> Result<Expansion>
	where
		R: SnippetVarResolver + ?Sized,
	{
		let resolution = resolve(self, vars)?;
		Ok(render(self, &resolution))
	}
}

/// Parses, resolves and renders `source` with default options.
///
/// # Errors
///
/// Returns [`SnippetError::CyclicDependency`] if a placeholder's default
/// depends on itself.
pub fn expand<R>(source: &str, vars: &R) -> Result<Expansion>
where
	R: SnippetVarResolver + ?Sized,
{
	parse_snippet(source).expand(vars)
}
