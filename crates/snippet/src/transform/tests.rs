use rstest::rstest;

use super::*;
use crate::syntax::{Node, parse_snippet};

/// Parses `${VAR/<transform>}` and returns the compiled transform.
fn transform(body: &str) -> Transform {
	let source = format!("${{VAR/{body}}}");
	let snippet = parse_snippet(&source);
	match snippet.nodes.as_slice() {
		[Node::Variable(var)] => var.transform.clone().unwrap_or_else(|| panic!("no transform in {source}")),
		nodes => panic!("expected a transformed variable for {source}, got {nodes:?}"),
	}
}

#[rstest]
#[case("//", "foo", "foo")]
#[case("(.*)/$1_x/", "foo", "foo_x")]
#[case("o/0/", "foo", "f0o")]
#[case("o/0/g", "foo", "f00")]
#[case("O/0/gi", "fOo", "f00")]
#[case("O/0/g", "foo", "foo")]
#[case("x/y/", "foo", "foo")]
#[case("^/> /gm", "a\nb", "> a\n> b")]
#[case("a.b/X/s", "a\nb", "X")]
#[case("(\\w+)\\.(\\w+)/$2.$1/", "file.rs", "rs.file")]
#[case("(.*)/${1}${1}/", "ab", "abab")]
#[case("(.*)/[$0]/", "ab", "[ab]")]
#[case("b/\\$/", "abc", "a$c")]
#[case("/-/g", "ab", "-a-b-")]
fn substitutes(#[case] body: &str, #[case] input: &str, #[case] expected: &str) {
	assert_eq!(transform(body).apply(input), expected);
}

#[rstest]
#[case("(.*)/${1:/upcase}/", "foo Bar", "FOO BAR")]
#[case("(.*)/${1:/downcase}/", "Foo BAR", "foo bar")]
#[case("(.*)/${1:/capitalize}/", "foo bar", "Foo bar")]
#[case("(.*)/${1:/pascalcase}/", "foo_bar-baz", "FooBarBaz")]
#[case("(.*)/${1:/camelcase}/", "Foo_bar-baz", "fooBarBaz")]
#[case("(.*)/${1:/nonsense}/", "Foo", "Foo")]
#[case("(\\w)(\\w*)/${1:/upcase}$2/g", "ab cd", "Ab Cd")]
fn applies_case_modifiers(#[case] body: &str, #[case] input: &str, #[case] expected: &str) {
	assert_eq!(transform(body).apply(input), expected);
}

#[rstest]
#[case("(a)?b/${1:+yes}/", "ab", "yes")]
#[case("(a)?b/${1:+yes}/", "b", "")]
#[case("(a)?b/${1:-no}/", "ab", "a")]
#[case("(a)?b/${1:-no}/", "b", "no")]
#[case("(a)?b/${1:no}/", "b", "no")]
#[case("(a)?b/${1:?yes:no}/", "ab", "yes")]
#[case("(a)?b/${1:?yes:no}/", "b", "no")]
#[case("(a)?(b)/${1:+<$2\\}>}/", "ab", "<b}>")]
#[case("(a)?(b)/${1:?$2:-$2}/", "b", "-b")]
fn evaluates_conditionals(#[case] body: &str, #[case] input: &str, #[case] expected: &str) {
	assert_eq!(transform(body).apply(input), expected);
}

#[test]
fn unmatched_group_expands_to_nothing() {
	assert_eq!(transform("(a)?b/[$1]/").apply("b"), "[]");
}

#[test]
fn rejects_unknown_flags() {
	let err = Transform::new("a", Vec::new(), "gq", &SnippetOptions::default()).unwrap_err();
	assert!(matches!(err, TransformError::UnknownFlag('q')));
}

#[test]
fn accepts_noop_flags() {
	assert!(Transform::new("a", Vec::new(), "uy", &SnippetOptions::default()).is_ok());
}

#[test]
fn rejects_missing_groups() {
	let format = vec![FormatItem::Conditional {
		group: 1,
		matched: vec![FormatItem::Group(3)],
		unmatched: Vec::new(),
	}];
	let err = Transform::new("(a)(b)", format, "", &SnippetOptions::default()).unwrap_err();
	assert!(matches!(err, TransformError::MissingGroup { group: 3, available: 2 }));
}

#[test]
fn rejects_invalid_regex() {
	let err = Transform::new("(", Vec::new(), "", &SnippetOptions::default()).unwrap_err();
	assert!(matches!(err, TransformError::Regex(_)));
}

#[test]
fn respects_regex_size_limit() {
	let options = SnippetOptions {
		regex_size_limit: 16,
		..SnippetOptions::default()
	};
	let err = Transform::new("\\w{100}", Vec::new(), "", &options).unwrap_err();
	assert!(matches!(err, TransformError::Regex(_)));
}

#[test]
fn case_modifier_names() {
	assert_eq!(CaseModifier::from_name("upcase"), Some(CaseModifier::Upcase));
	assert_eq!(CaseModifier::from_name("pascalcase"), Some(CaseModifier::PascalCase));
	assert_eq!(CaseModifier::from_name("Upcase"), None);
	assert_eq!(CaseModifier::Capitalize.apply(""), "");
	assert_eq!(CaseModifier::CamelCase.apply("--"), "");
}
