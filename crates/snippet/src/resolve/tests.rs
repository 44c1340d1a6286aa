use std::cell::RefCell;

use pretty_assertions::assert_eq;
use rstest::rstest;

use super::*;
use crate::syntax::parse_snippet;
use crate::vars::NoVars;

fn value_of(resolution: &Resolution, snippet: &Snippet, key: &str) -> String {
	let id = snippet.indices.get(key).unwrap_or_else(|| panic!("missing key {key}"));
	resolution.value(id).unwrap_or_else(|| panic!("no value for {key}")).to_string()
}

#[rstest]
#[case("${1:$1}", "1")]
#[case("${1:a $1}", "1")]
#[case("${1:$2} ${2:$1}", "1")]
#[case("${1:$2} ${2:$1} ${1:a}", "1")]
#[case("${1:${2:$1}}", "1")]
#[case("${1:x ${2:y ${3:$1}}}", "1")]
#[case("${FOO:$FOO}", "FOO")]
#[case("${FOO:$1} ${1:$FOO}", "FOO")]
#[case("${1:${1:a}}", "1")]
#[case("${1:${1|a,b|}}", "1")]
fn rejects_cycles(#[case] source: &str, #[case] index: &str) {
	let snippet = parse_snippet(source);
	let err = resolve(&snippet, &NoVars).unwrap_err();
	let SnippetError::CyclicDependency { index: at, .. } = err;
	assert_eq!(at, index);
}

#[test]
fn cycle_error_reports_chain() {
	let snippet = parse_snippet("${1:${2:${3:$1}}}");
	let err = resolve(&snippet, &NoVars).unwrap_err();
	assert_eq!(
		err,
		SnippetError::CyclicDependency {
			index: "1".to_string(),
			chain: vec!["1".to_string(), "2".to_string(), "3".to_string(), "1".to_string()],
		}
	);
	assert_eq!(err.to_string(), "cyclic placeholder dependency at '1': 1 -> 2 -> 3 -> 1");
}

#[test]
fn later_definition_does_not_rescue_cycle() {
	let snippet = parse_snippet("${2:$1} ${1:$2} ${1:a} ${2:b}");
	assert!(resolve(&snippet, &NoVars).is_err());
}

#[test]
fn mirror_inside_other_key_is_not_a_cycle() {
	let snippet = parse_snippet("${1:a} ${2:$1 $1}");
	let resolution = resolve(&snippet, &NoVars).unwrap();
	assert_eq!(value_of(&resolution, &snippet, "2"), "a a");
}

#[test]
fn first_definition_wins() {
	let snippet = parse_snippet("$3 ${3:a} ${3:b}");
	let resolution = resolve(&snippet, &NoVars).unwrap();
	assert_eq!(value_of(&resolution, &snippet, "3"), "a");
}

#[test]
fn discarded_definitions_still_define_nested_keys() {
	let snippet = parse_snippet("${1:a} ${1:${2:b} ${3:c}}");
	let resolution = resolve(&snippet, &NoVars).unwrap();
	assert_eq!(value_of(&resolution, &snippet, "1"), "a");
	assert_eq!(value_of(&resolution, &snippet, "2"), "b");
	assert_eq!(value_of(&resolution, &snippet, "3"), "c");
}

#[test]
fn nested_occurrence_uses_canonical_value() {
	let snippet = parse_snippet("${2:z} ${1:x${2:y}}");
	let resolution = resolve(&snippet, &NoVars).unwrap();
	assert_eq!(value_of(&resolution, &snippet, "1"), "xz");
}

#[test]
fn composed_values_link_directly_substituted_keys() {
	let snippet = parse_snippet("${1:ab${2:c${3:d}}e}");
	let resolution = resolve(&snippet, &NoVars).unwrap();
	let one = snippet.indices.get("1").unwrap();
	let two = snippet.indices.get("2").unwrap();
	let three = snippet.indices.get("3").unwrap();

	let composed = resolution.composed(one).unwrap();
	assert_eq!(composed.text, "abcde");
	assert_eq!(composed.len, 5);
	assert_eq!(composed.links, vec![Link { offset: 2, index: two }]);
	assert_eq!(resolution.composed(two).unwrap().links, vec![Link { offset: 1, index: three }]);
}

#[test]
fn foreign_ids_have_no_value() {
	let small = parse_snippet("$1");
	let large = parse_snippet("$1 $2 ${3|a|}");
	let resolution = resolve(&small, &NoVars).unwrap();
	let three = large.indices.get("3").unwrap();
	assert_eq!(resolution.value(three), None);
	assert_eq!(resolution.choices(three), None);
}

#[rstest]
#[case("$1", "1", "")]
#[case("${1}", "1", "")]
#[case("${1:}", "1", "")]
#[case("${1|a,b|}", "1", "a")]
#[case("$foo", "foo", "foo")]
#[case("${foo}", "foo", "foo")]
#[case("${foo:}", "foo", "")]
#[case("$TM_SELECTED_TEXT", "TM_SELECTED_TEXT", "")]
#[case("${TM_SELECTED_TEXT:sel}", "TM_SELECTED_TEXT", "sel")]
#[case("$TM_SELECTED_TEXT ${TM_SELECTED_TEXT:sel}", "TM_SELECTED_TEXT", "sel")]
fn defaults_without_resolver_values(#[case] source: &str, #[case] key: &str, #[case] expected: &str) {
	let snippet = parse_snippet(source);
	let resolution = resolve(&snippet, &NoVars).unwrap();
	assert_eq!(value_of(&resolution, &snippet, key), expected);
}

#[test]
fn resolver_is_called_once_per_known_name() {
	let calls = RefCell::new(Vec::new());
	let vars = |name: &str| {
		calls.borrow_mut().push(name.to_string());
		Some(format!("<{name}>"))
	};
	let snippet = parse_snippet("$TM_FILENAME ${TM_FILENAME} $custom ${TM_LINE_NUMBER:1} $TM_FILENAME");
	let resolution = resolve(&snippet, &vars).unwrap();

	assert_eq!(value_of(&resolution, &snippet, "TM_FILENAME"), "<TM_FILENAME>");
	assert_eq!(value_of(&resolution, &snippet, "custom"), "custom");
	assert_eq!(*calls.borrow(), vec!["TM_FILENAME".to_string(), "TM_LINE_NUMBER".to_string()]);
}

#[test]
fn resolved_variable_skips_default_content() {
	let vars = |name: &str| (name == "TM_FILENAME").then(|| "file".to_string());
	let snippet = parse_snippet("${TM_FILENAME:${1:$TM_FILENAME}}");
	let resolution = resolve(&snippet, &vars).unwrap();
	assert_eq!(value_of(&resolution, &snippet, "TM_FILENAME"), "file");
	assert_eq!(value_of(&resolution, &snippet, "1"), "file");
}

#[test]
fn unresolved_variable_default_can_cycle() {
	let snippet = parse_snippet("${TM_FILENAME:${1:$TM_FILENAME}}");
	assert!(resolve(&snippet, &NoVars).is_err());
}

#[test]
fn choices_come_from_the_defining_occurrence() {
	let snippet = parse_snippet("${1|a,b|} ${1|c,d|} ${2:x} ${2|e|}");
	let resolution = resolve(&snippet, &NoVars).unwrap();
	let one = snippet.indices.get("1").unwrap();
	let two = snippet.indices.get("2").unwrap();
	assert_eq!(resolution.choices(one), Some(&["a".to_string(), "b".to_string()][..]));
	assert_eq!(resolution.choices(two), None);
}

#[test]
fn transform_rewrites_the_resolved_value() {
	let vars = |name: &str| (name == "TM_FILENAME_BASE").then(|| "foo".to_string());
	let snippet = parse_snippet("$TM_FILENAME_BASE ${TM_FILENAME_BASE/(.*)/${1:/upcase}/} ${1:<$TM_FILENAME_BASE>}");
	let resolution = resolve(&snippet, &vars).unwrap();
	assert_eq!(value_of(&resolution, &snippet, "TM_FILENAME_BASE"), "FOO");
	assert_eq!(value_of(&resolution, &snippet, "1"), "<FOO>");
}

#[test]
fn first_transform_wins() {
	let snippet = parse_snippet("${1:ab} ${1/a/x/} ${1/b/y/}");
	let resolution = resolve(&snippet, &NoVars).unwrap();
	assert_eq!(value_of(&resolution, &snippet, "1"), "xb");
}

#[rstest]
#[case("${abc/b/X/}", "abc", "aXc")]
#[case("${abc:def} ${abc/e/E/}", "abc", "dEf")]
#[case("${TM_SELECTED_TEXT/^$/empty/}", "TM_SELECTED_TEXT", "empty")]
#[case("${TM_SELECTED_TEXT:sel} ${TM_SELECTED_TEXT/s/S/}", "TM_SELECTED_TEXT", "Sel")]
#[case("${1|one,two|} ${1/o/0/g}", "1", "0ne")]
fn transform_applies_to_every_value_source(#[case] source: &str, #[case] key: &str, #[case] expected: &str) {
	let snippet = parse_snippet(source);
	let resolution = resolve(&snippet, &NoVars).unwrap();
	assert_eq!(value_of(&resolution, &snippet, key), expected);
}

#[test]
fn transformed_value_is_opaque() {
	let snippet = parse_snippet("${1:a${2:b}} ${1/(.*)/<$1>/}");
	let resolution = resolve(&snippet, &NoVars).unwrap();
	let one = snippet.indices.get("1").unwrap();
	assert_eq!(resolution.value(one), Some("<ab>"));
	assert!(resolution.composed(one).unwrap().links.is_empty());
}

fn chain(len: usize, last: &str) -> String {
	let mut source: String = (1..len).map(|i| format!("${{{i}:${}}}", i + 1)).collect();
	source.push_str(&format!("${{{len}:{last}}}"));
	source
}

#[test]
fn long_dependency_chain_resolves() {
	let snippet = parse_snippet(&chain(20_000, "end"));
	let resolution = resolve(&snippet, &NoVars).unwrap();
	assert_eq!(value_of(&resolution, &snippet, "1"), "end");
	assert_eq!(value_of(&resolution, &snippet, "19999"), "end");
}

#[test]
fn long_dependency_cycle_is_rejected() {
	let snippet = parse_snippet(&chain(20_000, "$1"));
	let SnippetError::CyclicDependency { index, chain } = resolve(&snippet, &NoVars).unwrap_err();
	assert_eq!(index, "1");
	assert_eq!(chain.len(), 20_001);
	assert_eq!(chain.first().map(String::as_str), Some("1"));
	assert_eq!(chain.last().map(String::as_str), Some("1"));
}
