//! A docopt usage-string grammar engine.
//!
//! Given a free-form help text containing a `usage:` section (and optionally one or more
//! `options:` sections), [`apply`] parses that text into a pattern grammar, matches a concrete
//! argument vector against it, and returns a map from option/argument/command names to their
//! resolved values.

use std::collections::BTreeMap;

mod argv;
mod cursor;
mod error;
mod longshort;
mod matcher;
mod normalize;
mod options;
mod parser;
mod pattern;
mod sections;
mod tokenizer;
mod value;

pub use error::DocoptError;
pub use pattern::ShortLong;
pub use value::Value;

use argv::parse_argv;
use normalize::{normalize, Normalized};
use options::parse_defaults;
use parser::parse_pattern;
use pattern::{Leaf, LeafMatch};
use sections::{formal_usage, options_sections, usage_section};

/// Parse `doc` and match `argv` against its usage pattern (§2, §5.7).
///
/// `help` and `version` enable the `--help`/`--version` short-circuit: when set and the
/// corresponding flag is present in `argv`, this returns `Err(DocoptError::exit(..))` carrying
/// `doc` or `version` as the payload rather than a match result. This crate never calls
/// `std::process::exit` — callers that want that behavior inspect
/// [`DocoptError::exit_request`] themselves.
pub fn apply(
    doc: &str,
    argv: &[String],
    help: bool,
    version: Option<&str>,
    options_first: bool,
) -> Result<BTreeMap<String, Value>, DocoptError> {
    let usage = usage_section(doc)?;
    let formal = formal_usage(&usage);
    let mut options = parse_defaults(&options_sections(doc));

    let tree = parse_pattern(&formal, &mut options)?;
    // Snapshot here: `options` is about to be mutated further by argv-discovered flags (e.g. an
    // unrecognized `--bogus` on the command line), but `[options]` shortcuts must only ever be
    // filled from what the doc itself declares (pattern + `options:` section), never from ad-hoc
    // options synthesized while reading argv.
    let doc_options = options.clone();
    let parsed_argv = parse_argv(argv, &mut options, options_first)?;

    if help && flag_present(&parsed_argv, Some('h'), Some("help")) {
        return Err(DocoptError::exit(doc.to_string()));
    }
    if let Some(v) = version {
        if flag_present(&parsed_argv, None, Some("version")) {
            return Err(DocoptError::exit(v.to_string()));
        }
    }

    let normalized = normalize(tree, &doc_options);
    let (ok, left, collected) = matcher::match_all(&normalized.tree, parsed_argv, &normalized.defaults);
    if !ok || !left.is_empty() {
        return Err(DocoptError::input(usage));
    }

    let mut result = BTreeMap::new();
    for (leaf, default) in normalized.canonical.iter().zip(&normalized.defaults) {
        result.insert(leaf.name(), default.clone());
    }
    for (id, value) in collected {
        result.insert(normalized.canonical[id.0].name(), value);
    }
    Ok(result)
}

fn flag_present(argv: &[LeafMatch], short: Option<char>, long: Option<&str>) -> bool {
    argv.iter().any(|lm| {
        let names_match = match &lm.leaf {
            Leaf::Option { name, .. } => {
                (short.is_some() && name.short() == short) || (long.is_some() && name.long() == long)
            }
            Leaf::Argument { .. } | Leaf::Command { .. } => false,
        };
        names_match && lm.value.is_truthy()
    })
}

/// Parse `doc`'s `usage:`/`options:` sections into a normalized tree, without touching argv.
/// Shared by [`get_nodes`] and [`generate_code`], the two peripheral entry points that only need
/// the discovered leaves, not a match result.
fn build_tree(doc: &str) -> Result<Normalized, DocoptError> {
    let usage = usage_section(doc)?;
    let formal = formal_usage(&usage);
    let mut options = parse_defaults(&options_sections(doc));
    let tree = parse_pattern(&formal, &mut options)?;
    Ok(normalize(tree, &options))
}

/// One leaf discovered in `doc`'s usage grammar, classified by the shape of value it produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Argument { name: String, kind: ValueKind },
    Command { name: String, kind: ValueKind },
    Option { name: String, kind: ValueKind },
}

/// The shape of value a [`Node`] resolves to once matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Bool,
    List,
    Str,
}

fn value_kind(default: &Value) -> ValueKind {
    match default {
        Value::List(_) => ValueKind::List,
        Value::Bool(_) | Value::Int(_) => ValueKind::Bool,
        Value::Str(_) | Value::Null => ValueKind::Str,
    }
}

/// Walk `doc`'s fixed (normalized) tree and return every leaf it discovers, in first-occurrence
/// order. Peripheral: useful for tooling that wants to introspect a usage grammar without running
/// it against argv.
pub fn get_nodes(doc: &str) -> Result<Vec<Node>, DocoptError> {
    let normalized = build_tree(doc)?;
    Ok(normalized
        .canonical
        .iter()
        .zip(&normalized.defaults)
        .map(|(leaf, default)| {
            let kind = value_kind(default);
            match leaf {
                Leaf::Argument { name } => Node::Argument { name: name.clone(), kind },
                Leaf::Command { name } => Node::Command { name: name.clone(), kind },
                Leaf::Option { name, .. } => Node::Option { name: name.canonical_name(), kind },
            }
        })
        .collect())
}

/// Emit Rust struct-field-style accessor stubs for every option/argument/command `doc` declares.
/// Peripheral: a thin renderer over [`get_nodes`], not part of the grammar engine proper.
pub fn generate_code(doc: &str) -> Result<String, DocoptError> {
    let nodes = get_nodes(doc)?;
    let mut out = String::from("pub struct Args {\n");
    for node in &nodes {
        let (name, kind) = match node {
            Node::Argument { name, kind } | Node::Command { name, kind } | Node::Option { name, kind } => {
                (name, kind)
            }
        };
        let field = sanitize_identifier(name);
        let ty = match kind {
            ValueKind::List => "Vec<String>",
            ValueKind::Bool => "bool",
            ValueKind::Str => "Option<String>",
        };
        out.push_str(&format!("    pub {field}: {ty},\n"));
    }
    out.push_str("}\n");
    Ok(out)
}

fn sanitize_identifier(name: &str) -> String {
    let mut out = String::new();
    for c in name.chars() {
        if c.is_alphanumeric() {
            out.extend(c.to_lowercase());
        } else if !out.is_empty() && !out.ends_with('_') {
            out.push('_');
        }
    }
    let trimmed = out.trim_matches('_');
    if trimmed.is_empty() {
        "field".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(xs: &[&str]) -> Vec<String> {
        xs.iter().map(|x| x.to_string()).collect()
    }

    const NAVAL: &str = "\
Naval Fate.

Usage:
  naval_fate.py ship new <name>...
  naval_fate.py ship <name> move <x> <y> [--speed=<kn>]
  naval_fate.py ship shoot <x> <y>
  naval_fate.py mine (set|remove) <x> <y> [--moored|--drifting]
  naval_fate.py -h | --help
  naval_fate.py --version

Options:
  -h --help     Show this screen.
  --version     Show version.
  --speed=<kn>  Speed in knots [default: 10].
  --moored      Moored (anchored) mine.
  --drifting    Drifting mine.
";

    #[test]
    fn matches_ship_new_with_repeating_argument() {
        let result = apply(NAVAL, &s(&["ship", "new", "Guardian"]), true, None, false).unwrap();
        assert_eq!(result["ship"], Value::Bool(true));
        assert_eq!(result["new"], Value::Bool(true));
        assert_eq!(result["<name>"], Value::List(vec![Value::Str("Guardian".into())]));
    }

    #[test]
    fn matches_move_with_default_speed() {
        let result = apply(NAVAL, &s(&["ship", "Guardian", "move", "1", "2"]), true, None, false).unwrap();
        assert_eq!(result["<x>"], Value::Str("1".to_string()));
        assert_eq!(result["<y>"], Value::Str("2".to_string()));
        assert_eq!(result["--speed"], Value::Str("10".to_string()));
    }

    #[test]
    fn matches_mine_either_branch() {
        let result = apply(NAVAL, &s(&["mine", "set", "1", "2", "--drifting"]), true, None, false).unwrap();
        assert_eq!(result["set"], Value::Bool(true));
        assert_eq!(result["remove"], Value::Bool(false));
        assert_eq!(result["--drifting"], Value::Bool(true));
    }

    #[test]
    fn help_flag_short_circuits_with_doc_as_payload() {
        let err = apply(NAVAL, &s(&["--help"]), true, None, false).unwrap_err();
        assert_eq!(err.exit_request(), Some((NAVAL, 0)));
    }

    #[test]
    fn version_flag_short_circuits_with_version_payload() {
        let err = apply(NAVAL, &s(&["--version"]), true, Some("2.0"), false).unwrap_err();
        assert_eq!(err.exit_request(), Some(("2.0", 0)));
    }

    #[test]
    fn unmatched_argv_is_an_input_error() {
        let err = apply(NAVAL, &s(&["fly"]), true, None, false).unwrap_err();
        assert!(!err.is_exit_requested());
        assert!(err.unwrap_input().contains("Usage"));
    }

    #[test]
    fn get_nodes_discovers_every_leaf_kind() {
        let nodes = get_nodes(NAVAL).unwrap();
        assert!(nodes.contains(&Node::Command { name: "ship".to_string(), kind: ValueKind::Bool }));
        assert!(nodes.contains(&Node::Argument { name: "<name>".to_string(), kind: ValueKind::List }));
        assert!(nodes.iter().any(|n| matches!(n, Node::Option { name, .. } if name == "--speed")));
    }

    #[test]
    fn generate_code_renders_a_struct_stub() {
        let code = generate_code(NAVAL).unwrap();
        assert!(code.starts_with("pub struct Args {"));
        assert!(code.contains("pub speed: Option<String>,"));
    }

    #[test]
    fn options_shortcut_never_absorbs_an_argv_discovered_flag() {
        let doc = "Usage: prog [options]\n\nOptions:\n  -v  verbose\n";
        let err = apply(doc, &s(&["--bogus"]), false, None, false).unwrap_err();
        assert!(!err.is_exit_requested());
        err.unwrap_input();
    }
}
