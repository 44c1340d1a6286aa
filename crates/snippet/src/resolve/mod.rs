//! Placeholder value resolution.
//!
//! Every key in a snippet gets exactly one value. The first occurrence that
//! carries content (`${1:…}`, `${1|…|}` or `${NAME:…}`, in depth-first
//! document order) defines the key; later content is still walked for the
//! keys nested in it but never displayed. Likewise the first occurrence
//! carrying a transform (`${NAME/…/…/}`, `${1/…/…/}`) rewrites the key's
//! value, and every occurrence displays the rewritten text.
//!
//! A value may be composed from other keys' values, which forms a
//! dependency graph that must be acyclic. The graph is walked with an
//! explicit stack, so long dependency chains do not consume call stack.

use tracing::debug;

use crate::error::{Result, SnippetError};
use crate::syntax::{IndexId, Node, Snippet, TabStop, Variable};
use crate::transform::Transform;
use crate::vars::{SnippetVarResolver, is_known_variable};

#[cfg(test)]
mod tests;

/// Position of a directly substituted key inside a composed value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct Link {
	/// Char offset from the start of the value.
	pub(crate) offset: usize,
	pub(crate) index: IndexId,
}

/// Text built from literal pieces and placeholder values.
///
/// `links` only names the keys substituted into this value itself. Keys
/// nested deeper are reached through the linked key's own value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Composed {
	pub(crate) text: String,
	/// Length of `text` in chars.
	pub(crate) len: usize,
	pub(crate) links: Vec<Link>,
}

impl Composed {
	fn from_text(text: String) -> Self {
		Self {
			len: text.chars().count(),
			text,
			links: Vec::new(),
		}
	}

	pub(crate) fn push_text(&mut self, text: &str) {
		self.text.push_str(text);
		self.len += text.chars().count();
	}

	/// Appends the value of `index`, linking it at the insertion point.
	pub(crate) fn push_value(&mut self, index: IndexId, value: &Composed) {
		self.links.push(Link { offset: self.len, index });
		self.push_text(&value.text);
	}

	/// Rewritten text is opaque: the keys it was built from are no longer
	/// addressable inside it.
	fn transformed(&self, transform: &Transform) -> Self {
		Self::from_text(transform.apply(&self.text))
	}
}

/// Content that defines a key's value.
#[derive(Debug, Clone, Copy)]
enum Definition<'a> {
	Content(&'a [Node]),
	Choice(&'a [String]),
}

/// First defining occurrence and first transform of every key.
struct Definitions<'a> {
	content: Vec<Option<Definition<'a>>>,
	transforms: Vec<Option<&'a Transform>>,
}

impl<'a> Definitions<'a> {
	fn collect(snippet: &'a Snippet) -> Self {
		let mut definitions = Self {
			content: vec![None; snippet.indices.len()],
			transforms: vec![None; snippet.indices.len()],
		};
		definitions.walk(&snippet.nodes);
		definitions
	}

	/// Records definitions depth-first; nesting is bounded by the parser.
	fn walk(&mut self, nodes: &'a [Node]) {
		for node in nodes {
			if let Some(index) = node.reference()
				&& let Some(transform) = node.transform()
				&& self.transforms[index.idx()].is_none()
			{
				self.transforms[index.idx()] = Some(transform);
			}
			match node {
				Node::Text(_) => {}
				Node::Choice(choice) => self.define(choice.index, Definition::Choice(&choice.options)),
				Node::TabStop(TabStop {
					index, content: Some(content), ..
				})
				| Node::Variable(Variable {
					index, content: Some(content), ..
				}) => {
					self.define(*index, Definition::Content(content));
					self.walk(content);
				}
				Node::TabStop(_) | Node::Variable(_) => {}
			}
		}
	}

	fn define(&mut self, index: IndexId, definition: Definition<'a>) {
		let slot = &mut self.content[index.idx()];
		if slot.is_none() {
			*slot = Some(definition);
		}
	}
}

/// Values of every key in a snippet, indexed by [`IndexId`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
	values: Vec<Composed>,
	choices: Vec<Option<Vec<String>>>,
}

impl Resolution {
	/// Resolved value of `id`, or `None` if `id` belongs to another snippet.
	pub fn value(&self, id: IndexId) -> Option<&str> {
		self.composed(id).map(|value| value.text.as_str())
	}

	/// Options of `id` if its defining occurrence is a choice.
	pub fn choices(&self, id: IndexId) -> Option<&[String]> {
		self.choices.get(id.idx())?.as_deref()
	}

	pub(crate) fn composed(&self, id: IndexId) -> Option<&Composed> {
		self.values.get(id.idx())
	}
}

/// Resolves every key of `snippet`.
///
/// `vars` is consulted once per recognized variable name and never for
/// unrecognized names, which default to their own name.
///
/// # Errors
///
/// Returns [`SnippetError::CyclicDependency`] if a key's value depends on
/// itself, directly or through other keys.
pub fn resolve<R>(snippet: &Snippet, vars: &R) -> Result<Resolution>
where
	R: SnippetVarResolver + ?Sized,
{
	let definitions = Definitions::collect(snippet);
	let mut resolver = Resolver {
		snippet,
		definitions,
		vars,
		slots: vec![Slot::Pending; snippet.indices.len()],
		stack: Vec::new(),
	};
	for (id, _) in snippet.indices.iter() {
		resolver.ensure(id)?;
	}

	let choices = resolver
		.definitions
		.content
		.iter()
		.map(|definition| match definition {
			Some(Definition::Choice(options)) => Some(options.to_vec()),
			_ => None,
		})
		.collect();
	let values = resolver
		.slots
		.into_iter()
		.map(|slot| match slot {
			Slot::Done(value) => value,
			Slot::Pending | Slot::InProgress => Composed::default(),
		})
		.collect();

	debug!(indices = snippet.indices.len(), "resolved snippet placeholders");
	Ok(Resolution { values, choices })
}

#[derive(Debug, Clone)]
enum Slot {
	Pending,
	InProgress,
	Done(Composed),
}

/// A key whose defining content is being resolved.
struct Frame<'a> {
	id: IndexId,
	nodes: &'a [Node],
	/// Next node of `nodes` whose reference still has to be resolved.
	next: usize,
}

struct Resolver<'a, R: ?Sized> {
	snippet: &'a Snippet,
	definitions: Definitions<'a>,
	vars: &'a R,
	slots: Vec<Slot>,
	/// Keys currently being resolved, outermost first.
	stack: Vec<Frame<'a>>,
}

impl<'a, R> Resolver<'a, R>
where
	R: SnippetVarResolver + ?Sized,
{
	/// Resolves `root` and everything its value depends on.
	fn ensure(&mut self, root: IndexId) -> Result<()> {
		if !matches!(self.slots[root.idx()], Slot::Pending) {
			return Ok(());
		}
		self.start(root);

		while let Some(frame) = self.stack.last_mut() {
			let nodes = frame.nodes;
			let Some(node) = nodes.get(frame.next) else {
				let id = frame.id;
				self.stack.pop();
				let value = self.compose(nodes);
				self.finish(id, value);
				continue;
			};
			frame.next += 1;

			let Some(index) = node.reference() else {
				continue;
			};
			match self.slots[index.idx()] {
				Slot::Done(_) => {}
				Slot::InProgress => return Err(self.cycle(index)),
				Slot::Pending => self.start(index),
			}
		}
		Ok(())
	}

	/// Resolves `id` outright or pushes a frame for its defining content.
	fn start(&mut self, id: IndexId) {
		let snippet = self.snippet;
		let key = snippet.indices.name(id);
		if is_known_variable(key)
			&& let Some(value) = self.vars.resolve_var(key)
		{
			self.finish(id, Composed::from_text(value));
			return;
		}

		match self.definitions.content[id.idx()] {
			Some(Definition::Content(nodes)) => {
				self.slots[id.idx()] = Slot::InProgress;
				self.stack.push(Frame { id, nodes, next: 0 });
			}
			Some(Definition::Choice(options)) => self.finish(id, Composed::from_text(options.first().cloned().unwrap_or_default())),
			None if is_known_variable(key) || key.starts_with(|c: char| c.is_ascii_digit()) => self.finish(id, Composed::default()),
			None => self.finish(id, Composed::from_text(key.to_string())),
		}
	}

	fn finish(&mut self, id: IndexId, value: Composed) {
		let value = match self.definitions.transforms[id.idx()] {
			Some(transform) => value.transformed(transform),
			None => value,
		};
		self.slots[id.idx()] = Slot::Done(value);
	}

	/// Builds a value from content whose references are all resolved.
	fn compose(&self, nodes: &[Node]) -> Composed {
		let mut out = Composed::default();
		for node in nodes {
			match node {
				Node::Text(text) => out.push_text(text),
				_ => {
					if let Some(index) = node.reference()
						&& let Slot::Done(value) = &self.slots[index.idx()]
					{
						out.push_value(index, value);
					}
				}
			}
		}
		out
	}

	fn cycle(&self, id: IndexId) -> SnippetError {
		let start = self.stack.iter().position(|frame| frame.id == id).unwrap_or(0);
		let chain = self.stack[start..]
			.iter()
			.map(|frame| frame.id)
			.chain(std::iter::once(id))
			.map(|entry| self.snippet.indices.name(entry).to_string())
			.collect();
		let index = self.snippet.indices.name(id).to_string();
		debug!(%index, "rejected cyclic snippet placeholder");
		SnippetError::CyclicDependency { index, chain }
	}
}
