//! # Snippet syntax
//!
//! Recursive-descent parser for the LSP snippet language, a superset of the
//! TextMate snippet grammar:
//!
//! ```text
//! any         = tabstop | placeholder | choice | variable | text
//! tabstop     = '$' int | '${' int '}' | '${' int transform '}'
//! placeholder = '${' int ':' any* '}'
//! choice      = '${' int '|' option (',' option)* '|}'
//! variable    = '$' var | '${' var '}' | '${' var ':' any* '}' | '${' var transform '}'
//! transform   = '/' regex '/' format '/' flags
//! var         = [_a-zA-Z] [_a-zA-Z0-9]*
//! int         = [0-9]+
//! ```
//!
//! Parsing never fails. A `${` construct that is unterminated, does not
//! match any form above, or is nested deeper than
//! [`SnippetOptions::max_depth`] is kept as literal text, from its `$` up to
//! the brace that balances it (or the end of input).

mod format;

use std::collections::HashMap;

use crate::options::SnippetOptions;
use crate::transform::Transform;


/// Interned placeholder key.
///
/// Numeric tabstops and variable names share one keyspace; each distinct
/// key in a snippet gets a dense id in order of first appearance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IndexId(u32);

impl IndexId {
	pub(crate) fn idx(self) -> usize {
		self.0 as usize
	}
}

/// Key table for the placeholders of one snippet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexTable {
	keys: Vec<String>,
	lookup: HashMap<String, IndexId>,
}

impl IndexTable {
	/// Returns the id for `key`, allocating one on first use.
	fn intern(&mut self, key: &str) -> IndexId {
		if let Some(&id) = self.lookup.get(key) {
			return id;
		}
		let id = IndexId(self.keys.len() as u32);
		self.keys.push(key.to_string());
		self.lookup.insert(key.to_string(), id);
		id
	}

	/// Forgets every key allocated after the table had `len` entries.
	fn truncate(&mut self, len: usize) {
		for key in self.keys.drain(len..) {
			self.lookup.remove(&key);
		}
	}

	/// Key of `id`, or `None` if `id` belongs to another snippet.
	pub fn key(&self, id: IndexId) -> Option<&str> {
		self.keys.get(id.idx()).map(String::as_str)
	}

	/// Key of an id allocated by this table.
	pub(crate) fn name(&self, id: IndexId) -> &str {
		&self.keys[id.idx()]
	}

	pub fn get(&self, key: &str) -> Option<IndexId> {
		self.lookup.get(key).copied()
	}

	pub fn len(&self) -> usize {
		self.keys.len()
	}

	pub fn is_empty(&self) -> bool {
		self.keys.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = (IndexId, &str)> {
		self.keys.iter().enumerate().map(|(i, key)| (IndexId(i as u32), key.as_str()))
	}
}

/// A parsed snippet: the node tree plus its placeholder keys.
#[derive(Debug, Clone, PartialEq)]
pub struct Snippet {
	pub nodes: Vec<Node>,
	pub indices: IndexTable,
}

impl Snippet {
	pub fn key(&self, id: IndexId) -> Option<&str> {
		self.indices.key(id)
	}
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
	Text(String),
	TabStop(TabStop),
	Choice(Choice),
	Variable(Variable),
}

impl Node {
	/// Placeholder referenced by this node.
	pub fn reference(&self) -> Option<IndexId> {
		match self {
			Node::Text(_) => None,
			Node::TabStop(tabstop) => Some(tabstop.index),
			Node::Choice(choice) => Some(choice.index),
			Node::Variable(var) => Some(var.index),
		}
	}

	/// Transform rewriting the referenced placeholder's value.
	pub fn transform(&self) -> Option<&Transform> {
		match self {
			Node::TabStop(tabstop) => tabstop.transform.as_ref(),
			Node::Variable(var) => var.transform.as_ref(),
			Node::Text(_) | Node::Choice(_) => None,
		}
	}
}

/// `$1`, `${1}`, `${1:content}` or `${1/re/fmt/flags}`.
#[derive(Debug, Clone, PartialEq)]
pub struct TabStop {
	pub index: IndexId,
	/// Placeholder content, present for the `${1:…}` form.
	pub content: Option<Vec<Node>>,
	pub transform: Option<Transform>,
}

/// `${1|one,two|}`.
#[derive(Debug, Clone, PartialEq)]
pub struct Choice {
	pub index: IndexId,
	pub options: Vec<String>,
}

/// `$NAME`, `${NAME}`, `${NAME:default}` or `${NAME/re/fmt/flags}`.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
	pub index: IndexId,
	pub name: String,
	pub content: Option<Vec<Node>>,
	pub transform: Option<Transform>,
}

/// Snippet parser configured with transform limits.
#[derive(Debug, Clone, Copy, Default)]
pub struct SnippetParser {
	options: SnippetOptions,
}

impl SnippetParser {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_options(options: SnippetOptions) -> Self {
		Self { options }
	}

	pub fn options(&self) -> &SnippetOptions {
		&self.options
	}

	/// Parses `source` into a node tree. Never fails; malformed constructs
	/// become literal text.
	pub fn parse(&self, source: &str) -> Snippet {
		let mut parser = Parser::new(source, &self.options);
		let nodes = parser.parse_top_level();
		Snippet {
			nodes,
			indices: parser.indices,
		}
	}
}

/// Parses `source` with default options.
pub fn parse_snippet(source: &str) -> Snippet {
	SnippetParser::new().parse(source)
}

/// Escapes `text` so that it parses back to itself as a single literal.
pub fn escape_literal(text: &str) -> String {
	let mut out = String::with_capacity(text.len());
	for ch in text.chars() {
		if matches!(ch, '\\' | '$') {
			out.push('\\');
		}
		out.push(ch);
	}
	out
}

/// Backslash escape dialect of the text being scanned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Escapes {
	/// Top-level text and placeholder/variable content.
	Content,
	/// Options between the bars of a choice.
	ChoiceOption,
}

impl Escapes {
	fn escapable(self, ch: char) -> bool {
		match self {
			Escapes::Content => matches!(ch, '\\' | '$' | '}'),
			Escapes::ChoiceOption => matches!(ch, '\\' | ',' | '|'),
		}
	}
}

struct Parser<'a> {
	source: &'a str,
	/// Byte offset of the next unread character.
	pos: usize,
	options: &'a SnippetOptions,
	indices: IndexTable,
	/// Number of `${` constructs currently open.
	depth: usize,
}

impl<'a> Parser<'a> {
	fn new(source: &'a str, options: &'a SnippetOptions) -> Self {
		Self {
			source,
			pos: 0,
			options,
			indices: IndexTable::default(),
			depth: 0,
		}
	}

	/// Runs `parse` one nesting level deeper, failing past the depth limit.
	fn nested<T>(&mut self, parse: impl FnOnce(&mut Self) -> Option<T>) -> Option<T> {
		if self.depth >= self.options.max_depth {
			tracing::trace!(depth = self.depth, "snippet nesting limit reached");
			return None;
		}
		self.depth += 1;
		let parsed = parse(self);
		self.depth -= 1;
		parsed
	}

	fn rest(&self) -> &'a str {
		&self.source[self.pos..]
	}

	fn peek(&self) -> Option<char> {
		self.rest().chars().next()
	}

	fn bump(&mut self) -> Option<char> {
		let ch = self.peek()?;
		self.pos += ch.len_utf8();
		Some(ch)
	}

	fn eat(&mut self, expected: char) -> bool {
		if self.peek() == Some(expected) {
			self.pos += expected.len_utf8();
			true
		} else {
			false
		}
	}

	fn take_while(&mut self, predicate: impl Fn(char) -> bool) -> &'a str {
		let start = self.pos;
		while let Some(ch) = self.peek() {
			if !predicate(ch) {
				break;
			}
			self.pos += ch.len_utf8();
		}
		&self.source[start..self.pos]
	}

	fn parse_top_level(&mut self) -> Vec<Node> {
		let mut nodes = Vec::new();
		let mut text = String::new();
		while let Some(ch) = self.peek() {
			match ch {
				'\\' => {
					self.bump();
					self.push_escaped(&mut text, Escapes::Content);
				}
				'$' => self.push_dollar(&mut nodes, &mut text),
				_ => {
					text.push_str(self.take_while(|c| c != '\\' && c != '$'));
				}
			}
		}
		flush_text(&mut nodes, &mut text);
		nodes
	}

	/// Parses placeholder content up to and including its closing `}`.
	///
	/// Returns `None` if the input ends first.
	fn parse_content(&mut self) -> Option<Vec<Node>> {
		let mut nodes = Vec::new();
		let mut text = String::new();
		loop {
			match self.peek()? {
				'}' => {
					self.bump();
					flush_text(&mut nodes, &mut text);
					return Some(nodes);
				}
				'\\' => {
					self.bump();
					self.push_escaped(&mut text, Escapes::Content);
				}
				'$' => self.push_dollar(&mut nodes, &mut text),
				_ => {
					text.push_str(self.take_while(|c| !matches!(c, '\\' | '$' | '}')));
				}
			}
		}
	}

	/// Handles the character after a consumed backslash.
	///
	/// Unrecognized escapes keep the backslash and the character verbatim.
	fn push_escaped(&mut self, text: &mut String, escapes: Escapes) {
		match self.bump() {
			Some(ch) if escapes.escapable(ch) => text.push(ch),
			Some(ch) => {
				text.push('\\');
				text.push(ch);
			}
			None => text.push('\\'),
		}
	}

	fn push_dollar(&mut self, nodes: &mut Vec<Node>, text: &mut String) {
		match self.parse_dollar() {
			Node::Text(literal) => text.push_str(&literal),
			node => {
				flush_text(nodes, text);
				nodes.push(node);
			}
		}
	}

	/// Parses a construct starting at `$`.
	fn parse_dollar(&mut self) -> Node {
		let start = self.pos;
		self.bump();
		match self.peek() {
			Some(ch) if ch.is_ascii_digit() => {
				let index = self.intern_digits();
				Node::TabStop(TabStop {
					index,
					content: None,
					transform: None,
				})
			}
			Some(ch) if is_var_start(ch) => {
				let name = self.take_while(is_var_char);
				Node::Variable(Variable {
					index: self.indices.intern(name),
					name: name.to_string(),
					content: None,
					transform: None,
				})
			}
			Some('{') => {
				self.bump();
				let interned = self.indices.len();
				match self.nested(Self::parse_braced) {
					Some(node) => node,
					None => {
						self.indices.truncate(interned);
						self.pos = start;
						self.recover_span()
					}
				}
			}
			_ => Node::Text("$".to_string()),
		}
	}

	/// Parses the body of a `${…}` construct after the opening brace.
	fn parse_braced(&mut self) -> Option<Node> {
		match self.peek()? {
			ch if ch.is_ascii_digit() => {
				let index = self.intern_digits();
				match self.bump()? {
					'}' => Some(Node::TabStop(TabStop {
						index,
						content: None,
						transform: None,
					})),
					':' => Some(Node::TabStop(TabStop {
						index,
						content: Some(self.parse_content()?),
						transform: None,
					})),
					'|' => Some(Node::Choice(Choice {
						index,
						options: self.parse_choice_options()?,
					})),
					'/' => Some(Node::TabStop(TabStop {
						index,
						content: None,
						transform: Some(self.parse_transform()?),
					})),
					_ => None,
				}
			}
			ch if is_var_start(ch) => {
				let name = self.take_while(is_var_char);
				let index = self.indices.intern(name);
				let (content, transform) = match self.bump()? {
					'}' => (None, None),
					':' => (Some(self.parse_content()?), None),
					'/' => (None, Some(self.parse_transform()?)),
					_ => return None,
				};
				Some(Node::Variable(Variable {
					index,
					name: name.to_string(),
					content,
					transform,
				}))
			}
			_ => None,
		}
	}

	fn parse_choice_options(&mut self) -> Option<Vec<String>> {
		let mut options = Vec::new();
		let mut current = String::new();
		loop {
			match self.bump()? {
				'\\' => self.push_escaped(&mut current, Escapes::ChoiceOption),
				',' => options.push(std::mem::take(&mut current)),
				'|' => {
					if !self.eat('}') {
						return None;
					}
					options.push(current);
					return Some(options);
				}
				ch => current.push(ch),
			}
		}
	}

	/// Parses `regex/format/flags}` after the first slash.
	fn parse_transform(&mut self) -> Option<Transform> {
		let start = self.pos;
		let pattern = self.parse_pattern()?;
		let format = self.parse_format()?;
		let flags = self.parse_flags()?;
		match Transform::new(&pattern, format, &flags, self.options) {
			Ok(transform) => Some(transform),
			Err(error) => {
				tracing::trace!(source = &self.source[start..self.pos], %error, "malformed snippet transform");
				None
			}
		}
	}

	fn parse_pattern(&mut self) -> Option<String> {
		let mut pattern = String::new();
		loop {
			match self.bump()? {
				'/' => return Some(pattern),
				'\\' => {
					if !self.eat('/') {
						pattern.push('\\');
						pattern.push(self.bump()?);
						continue;
					}
					pattern.push('/');
				}
				ch => pattern.push(ch),
			}
		}
	}

	fn parse_flags(&mut self) -> Option<String> {
		let mut flags = String::new();
		loop {
			match self.bump()? {
				'}' => return Some(flags),
				ch => flags.push(ch),
			}
		}
	}

	fn intern_digits(&mut self) -> IndexId {
		let digits = self.take_while(|c| c.is_ascii_digit());
		let key = match digits.trim_start_matches('0') {
			"" => "0",
			trimmed => trimmed,
		};
		self.indices.intern(key)
	}

	/// Consumes a failed `${` construct as raw text.
	///
	/// The span ends at the `}` balancing the opening brace, counting nested
	/// `${` openers and skipping escaped characters, or at end of input.
	fn recover_span(&mut self) -> Node {
		let start = self.pos;
		self.bump();
		self.bump();
		let mut depth = 1usize;
		while let Some(ch) = self.bump() {
			match ch {
				'\\' => {
					self.bump();
				}
				'$' if self.peek() == Some('{') => {
					self.bump();
					depth += 1;
				}
				'}' => {
					depth -= 1;
					if depth == 0 {
						break;
					}
				}
				_ => {}
			}
		}
		let span = &self.source[start..self.pos];
		tracing::trace!(span, "snippet construct kept as literal text");
		Node::Text(span.to_string())
	}
}

fn flush_text(nodes: &mut Vec<Node>, text: &mut String) {
	if text.is_empty() {
		return;
	}
	match nodes.last_mut() {
		Some(Node::Text(prev)) => prev.push_str(text),
		_ => nodes.push(Node::Text(text.clone())),
	}
	text.clear();
}

fn is_var_start(ch: char) -> bool {
	ch.is_ascii_alphabetic() || ch == '_'
}

fn is_var_char(ch: char) -> bool {
	ch.is_ascii_alphanumeric() || ch == '_'
}
