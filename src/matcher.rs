use std::collections::HashMap;

use crate::pattern::{Leaf, LeafId, LeafMatch, Pattern};
use crate::value::Value;

/// Accumulator of matched leaves, keyed by [`LeafId`] rather than aliased through shared
/// references — see the design notes on resolving the original's mutable-leaf-identity model.
pub(crate) type Accumulator = HashMap<LeafId, Value>;

/// Run the top-level match: success iff the tree matched *and* every argv leaf was consumed.
pub(crate) fn match_all(tree: &Pattern, left: Vec<LeafMatch>, defaults: &[Value]) -> (bool, Vec<LeafMatch>, Accumulator) {
    let (matched, left, collected) = try_match(tree, left, Accumulator::new(), defaults);
    (matched && left.is_empty(), left, collected)
}

/// Each node's match is a pure function `(left, collected) -> (matched, left', collected')`.
/// Branches thread owned `Vec`/`HashMap` values through recursive calls instead of mutating a
/// shared accumulator in place, so a failed alternative can be discarded wholesale by simply not
/// using its returned state — there is no separate "undo" step.
fn try_match(
    pattern: &Pattern,
    left: Vec<LeafMatch>,
    collected: Accumulator,
    defaults: &[Value],
) -> (bool, Vec<LeafMatch>, Accumulator) {
    match pattern {
        Pattern::Leaf { id, leaf } => match single_match(leaf, &left) {
            Some(idx) => {
                let mut left = left;
                let m = left.remove(idx);
                let mut collected = collected;
                if let Some(id) = id {
                    // A Command's argv occurrence is just the literal word it matched against;
                    // the value it contributes is "present", not that word.
                    let incoming = match leaf {
                        Leaf::Command { .. } => Value::Bool(true),
                        Leaf::Argument { .. } | Leaf::Option { .. } => m.value,
                    };
                    let current = collected.get(id).cloned().unwrap_or_else(|| defaults[id.0].clone());
                    collected.insert(*id, current.accumulate(incoming));
                }
                (true, left, collected)
            }
            None => (false, left, collected),
        },

        Pattern::Required(children) => {
            let mut cur_left = left.clone();
            let mut cur_collected = collected.clone();
            for child in children {
                let (ok, new_left, new_collected) = try_match(child, cur_left, cur_collected, defaults);
                if !ok {
                    return (false, left, collected);
                }
                cur_left = new_left;
                cur_collected = new_collected;
            }
            (true, cur_left, cur_collected)
        }

        Pattern::Optional(children) | Pattern::OptionsShortcut(children) => {
            let mut cur_left = left;
            let mut cur_collected = collected;
            for child in children {
                let (ok, new_left, new_collected) =
                    try_match(child, cur_left.clone(), cur_collected.clone(), defaults);
                if ok {
                    cur_left = new_left;
                    cur_collected = new_collected;
                }
            }
            (true, cur_left, cur_collected)
        }

        Pattern::Either(children) => {
            let mut best: Option<(Vec<LeafMatch>, Accumulator)> = None;
            for child in children {
                let (ok, new_left, new_collected) = try_match(child, left.clone(), collected.clone(), defaults);
                if ok {
                    let is_better = match &best {
                        None => true,
                        Some((best_left, _)) => new_left.len() < best_left.len(),
                    };
                    if is_better {
                        best = Some((new_left, new_collected));
                    }
                }
            }
            match best {
                Some((l, c)) => (true, l, c),
                None => (false, left, collected),
            }
        }

        Pattern::OneOrMore(child) => {
            let mut cur_left = left.clone();
            let mut cur_collected = collected.clone();
            let mut times = 0usize;
            loop {
                let (ok, new_left, new_collected) =
                    try_match(child, cur_left.clone(), cur_collected.clone(), defaults);
                if !ok {
                    break;
                }
                times += 1;
                let progressed = new_left.len() != cur_left.len();
                cur_left = new_left;
                cur_collected = new_collected;
                if !progressed {
                    break;
                }
            }
            if times >= 1 {
                (true, cur_left, cur_collected)
            } else {
                (false, left, collected)
            }
        }
    }
}

fn single_match(leaf: &Leaf, left: &[LeafMatch]) -> Option<usize> {
    match leaf {
        Leaf::Argument { .. } => left.iter().position(|lm| matches!(lm.leaf, Leaf::Argument { .. })),
        Leaf::Command { name } => {
            let idx = left.iter().position(|lm| matches!(lm.leaf, Leaf::Argument { .. }))?;
            if left[idx].value.to_string() == *name {
                Some(idx)
            } else {
                None
            }
        }
        Leaf::Option { name, .. } => left.iter().position(|lm| match &lm.leaf {
            Leaf::Option { name: other, .. } => other.canonical_name() == name.canonical_name(),
            Leaf::Argument { .. } | Leaf::Command { .. } => false,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize;
    use crate::options::OptionDesc;
    use crate::parser::parse_pattern;
    use crate::value::Value;

    fn leaf_match_word(word: &str) -> LeafMatch {
        LeafMatch {
            leaf: Leaf::Argument { name: String::new() },
            value: Value::Str(word.to_string()),
        }
    }

    #[test]
    fn either_tie_break_picks_first_alternative_on_tie() {
        let mut options = Vec::new();
        let tree = parse_pattern("( a | b )", &mut options).unwrap();
        let normalized = normalize(tree, &options);
        let left = vec![leaf_match_word("a")];
        let (ok, rest, _) = match_all(&normalized.tree, left, &normalized.defaults);
        assert!(ok);
        assert!(rest.is_empty());
    }

    #[test]
    fn one_or_more_terminates_when_no_progress() {
        let mut options = Vec::new();
        let tree = parse_pattern("( <x>... )", &mut options).unwrap();
        let normalized = normalize(tree, &options);
        let left = vec![leaf_match_word("a"), leaf_match_word("b"), leaf_match_word("c")];
        let (ok, rest, collected) = match_all(&normalized.tree, left, &normalized.defaults);
        assert!(ok);
        assert!(rest.is_empty());
        assert_eq!(collected.len(), 1);
    }

    #[test]
    fn required_failure_rolls_back_entirely() {
        let mut options = Vec::new();
        let tree = parse_pattern("( a b )", &mut options).unwrap();
        let normalized = normalize(tree, &options);
        let left = vec![leaf_match_word("a")];
        let (ok, rest, collected) = match_all(&normalized.tree, left, &normalized.defaults);
        assert!(!ok);
        assert_eq!(rest.len(), 1);
        assert!(collected.is_empty());
    }

    #[test]
    fn command_stops_at_first_argument_without_lookahead() {
        let mut options = Vec::new();
        let tree = parse_pattern("( ship )", &mut options).unwrap();
        let normalized = normalize(tree, &options);
        let left = vec![leaf_match_word("mine"), leaf_match_word("ship")];
        let (ok, rest, _) = match_all(&normalized.tree, left, &normalized.defaults);
        assert!(!ok);
        assert_eq!(rest.len(), 2);
    }

    fn leaf_match_flag(desc: &OptionDesc) -> LeafMatch {
        LeafMatch {
            leaf: Leaf::Option {
                name: desc.short_long(),
                arg_count: desc.arg_count,
                default: desc.default.clone(),
            },
            value: Value::Bool(true),
        }
    }

    #[test]
    fn repeating_option_flag_increments_a_counter() {
        let mut options = vec![OptionDesc {
            short: Some('v'),
            long: None,
            arg_count: 0,
            default: Value::Bool(false),
        }];
        let tree = parse_pattern("( -v -v -v )", &mut options).unwrap();
        let normalized = normalize(tree, &options);
        let flag = leaf_match_flag(&options[0]);
        let left = vec![flag.clone(), flag.clone(), flag];
        let (ok, rest, collected) = match_all(&normalized.tree, left, &normalized.defaults);
        assert!(ok);
        assert!(rest.is_empty());
        assert_eq!(collected.len(), 1);
        assert_eq!(*collected.values().next().unwrap(), Value::Int(3));
    }
}
