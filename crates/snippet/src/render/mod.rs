use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use crate::resolve::{Composed, Link, Resolution};
use crate::syntax::{Node, Snippet};


/// Final text of an expanded snippet and its linked regions.
///
/// Offsets count chars of `text`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Expansion {
	pub text: String,
	/// Start offsets at which each key's value is displayed, including
	/// occurrences nested inside another key's value.
	pub regions: BTreeMap<String, Vec<usize>>,
	/// Resolved value of every key in the snippet.
	pub values: BTreeMap<String, String>,
	/// Options of every key defined by a choice.
	pub choices: BTreeMap<String, Vec<String>>,
}

impl Expansion {
	/// Offsets at which `key` is displayed; empty if it never is.
	pub fn regions_of(&self, key: &str) -> &[usize] {
		self.regions.get(key).map(Vec::as_slice).unwrap_or_default()
	}

	pub fn value(&self, key: &str) -> Option<&str> {
		self.values.get(key).map(String::as_str)
	}
}

/// Flattens `snippet` into text using the values in `resolution`.
///
/// Every reference displays its key's resolved value, never the local
/// content of the occurrence. `resolution` is expected to come from
/// resolving `snippet`; keys it has no value for render as empty.
pub fn render(snippet: &Snippet, resolution: &Resolution) -> Expansion {
	let empty = Composed::default();
	let mut out = Composed::default();
	for node in &snippet.nodes {
		match node {
			Node::Text(text) => out.push_text(text),
			_ => {
				if let Some(index) = node.reference() {
					out.push_value(index, resolution.composed(index).unwrap_or(&empty));
				}
			}
		}
	}

	let mut values = BTreeMap::new();
	let mut choices = BTreeMap::new();
	for (id, key) in snippet.indices.iter() {
		if let Some(value) = resolution.value(id) {
			values.insert(key.to_string(), value.to_string());
		}
		if let Some(options) = resolution.choices(id) {
			choices.insert(key.to_string(), options.to_vec());
		}
	}

	Expansion {
		regions: regions(snippet, resolution, &out.links),
		text: out.text,
		values,
		choices,
	}
}

/// Expands direct links into every displayed occurrence, depth-first in
/// text order.
///
/// A key displayed at an offset always shows the same nested keys, so each
/// `(offset, key)` pair is expanded once.
fn regions(snippet: &Snippet, resolution: &Resolution, links: &[Link]) -> BTreeMap<String, Vec<usize>> {
	let mut regions: BTreeMap<String, Vec<usize>> = BTreeMap::new();
	let mut seen = HashSet::new();
	let mut pending: Vec<Link> = links.iter().rev().copied().collect();

	while let Some(link) = pending.pop() {
		if !seen.insert(link) {
			continue;
		}
		let Some(key) = snippet.key(link.index) else {
			continue;
		};
		regions.entry(key.to_string()).or_default().push(link.offset);

		if let Some(value) = resolution.composed(link.index) {
			pending.extend(value.links.iter().rev().map(|nested| Link {
				offset: link.offset + nested.offset,
				index: nested.index,
			}));
		}
	}
	regions
}
