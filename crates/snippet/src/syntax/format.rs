//! Format strings of snippet transforms.
//!
//! ```text
//! format = (text | '$' int | '${' int '}' | '${' int ':' modifier '}')*
//! modifier = '/' name | '+' format | '-' format | '?' format ':' format | format
//! ```

use super::Parser;
use crate::transform::{CaseModifier, FormatItem};

impl Parser<'_> {
	/// Parses the format section of a transform up to its closing `/`.
	pub(super) fn parse_format(&mut self) -> Option<Vec<FormatItem>> {
		self.parse_format_until(&['/']).map(|(items, _)| items)
	}

	/// Parses format items until one of `stops` is consumed.
	///
	/// Returns the items and the stop character that ended them, or `None`
	/// if the input ends first or a `${…}` item is malformed.
	fn parse_format_until(&mut self, stops: &[char]) -> Option<(Vec<FormatItem>, char)> {
		let mut items = Vec::new();
		let mut text = String::new();
		loop {
			match self.bump()? {
				ch if stops.contains(&ch) => {
					flush_text(&mut items, &mut text);
					return Some((items, ch));
				}
				'\\' => match self.peek() {
					Some(ch) if matches!(ch, '$' | '\\' | '/' | '}' | ':') => {
						self.bump();
						text.push(ch);
					}
					_ => text.push('\\'),
				},
				'$' => match self.peek() {
					Some(ch) if ch.is_ascii_digit() => {
						flush_text(&mut items, &mut text);
						items.push(FormatItem::Group(self.parse_group()?));
					}
					Some('{') => {
						self.bump();
						flush_text(&mut items, &mut text);
						items.push(self.nested(Self::parse_format_block)?);
					}
					_ => text.push('$'),
				},
				ch => text.push(ch),
			}
		}
	}

	/// Parses a `${…}` format item after the opening brace.
	fn parse_format_block(&mut self) -> Option<FormatItem> {
		if !self.peek()?.is_ascii_digit() {
			return None;
		}
		let group = self.parse_group()?;
		match self.bump()? {
			'}' => Some(FormatItem::Group(group)),
			':' => match self.peek()? {
				'/' => {
					self.bump();
					let name = self.take_while(|c| c != '}');
					if !self.eat('}') {
						return None;
					}
					match CaseModifier::from_name(name) {
						Some(modifier) => Some(FormatItem::Case(group, modifier)),
						None => {
							tracing::trace!(modifier = name, "unknown snippet case modifier");
							Some(FormatItem::Group(group))
						}
					}
				}
				'+' => {
					self.bump();
					let (matched, _) = self.parse_format_until(&['}'])?;
					Some(FormatItem::Conditional {
						group,
						matched,
						unmatched: Vec::new(),
					})
				}
				'?' => {
					self.bump();
					let (matched, _) = self.parse_format_until(&[':'])?;
					let (unmatched, _) = self.parse_format_until(&['}'])?;
					Some(FormatItem::Conditional { group, matched, unmatched })
				}
				ch => {
					if ch == '-' {
						self.bump();
					}
					let (unmatched, _) = self.parse_format_until(&['}'])?;
					Some(FormatItem::Conditional {
						group,
						matched: vec![FormatItem::Group(group)],
						unmatched,
					})
				}
			},
			_ => None,
		}
	}

	fn parse_group(&mut self) -> Option<usize> {
		self.take_while(|c| c.is_ascii_digit()).parse().ok()
	}
}

fn flush_text(items: &mut Vec<FormatItem>, text: &mut String) {
	if !text.is_empty() {
		items.push(FormatItem::Text(std::mem::take(text)));
	}
}
