//! Error type for snippet expansion.

use thiserror::Error;

/// Errors raised while resolving a parsed snippet.
///
/// Malformed syntax never produces an error; it degrades to literal text
/// during parsing. The only failure is a placeholder whose default value
/// depends on itself.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SnippetError {
	/// A placeholder default refers back to the placeholder being resolved.
	#[error("cyclic placeholder dependency at '{index}': {}", chain.join(" -> "))]
	CyclicDependency {
		/// Index at which the cycle closed.
		index: String,
		/// Indices visited from the first in-progress occurrence of `index`
		/// back to `index` itself.
		chain: Vec<String>,
	},
}

/// Result type for snippet operations.
pub type Result<T> = std::result::Result<T, SnippetError>;
