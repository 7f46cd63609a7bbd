use std::collections::{HashMap, HashSet, VecDeque};

use crate::options::OptionDesc;
use crate::pattern::{Leaf, LeafId, Pattern};

/// The fully normalized tree plus the side-tables the matcher and result assembler need: the
/// canonical leaf for each [`LeafId`] and its (possibly repeating-argument-adjusted) default
/// value. Leaves are looked up by id rather than by shared reference — see the design notes on
/// resolving aliasing without `Rc<RefCell<_>>`.
pub(crate) struct Normalized {
    pub(crate) tree: Pattern,
    pub(crate) canonical: Vec<Leaf>,
    pub(crate) defaults: Vec<crate::value::Value>,
}

/// Run the full normalization pipeline (§5.5): fill in `[options]` shortcuts, assign leaf
/// identities, then fix up the initial values of repeating arguments.
pub(crate) fn normalize(mut tree: Pattern, doc_options: &[OptionDesc]) -> Normalized {
    fill_options_shortcuts(&mut tree, doc_options);
    let canonical = fix_identities(&mut tree);
    let mut defaults: Vec<_> = canonical.iter().map(Leaf::default_value).collect();
    fix_repeating_arguments(&tree, &canonical, &mut defaults);
    Normalized { tree, canonical, defaults }
}

/// Populate every [`Pattern::OptionsShortcut`] with the options from `options:` that are not
/// already named elsewhere in the pattern (by canonical name).
fn fill_options_shortcuts(tree: &mut Pattern, doc_options: &[OptionDesc]) {
    let mut present = HashSet::new();
    tree.for_each_leaf(&mut |leaf, _| {
        if let Leaf::Option { name, .. } = leaf {
            present.insert(name.canonical_name());
        }
    });
    fill_rec(tree, doc_options, &present);
}

fn fill_rec(node: &mut Pattern, doc_options: &[OptionDesc], present: &HashSet<String>) {
    match node {
        Pattern::OptionsShortcut(children) => {
            for od in doc_options {
                let name = od.short_long();
                if !present.contains(&name.canonical_name()) {
                    children.push(Pattern::leaf(Leaf::Option {
                        name,
                        arg_count: od.arg_count,
                        default: od.default.clone(),
                    }));
                }
            }
        }
        Pattern::Required(xs) | Pattern::Optional(xs) | Pattern::Either(xs) => {
            for x in xs {
                fill_rec(x, doc_options, present);
            }
        }
        Pattern::OneOrMore(x) => fill_rec(x, doc_options, present),
        Pattern::Leaf { .. } => {}
    }
}

/// Assign a stable [`LeafId`] to every leaf, shared by every structurally-equal occurrence, and
/// return the canonical leaf for each id in first-occurrence order.
fn fix_identities(tree: &mut Pattern) -> Vec<Leaf> {
    let mut canonical: Vec<Leaf> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    tree.for_each_leaf_mut(&mut |leaf, id_slot| {
        let key = leaf.identity_key();
        let idx = *index.entry(key).or_insert_with(|| {
            canonical.push(leaf.clone());
            canonical.len() - 1
        });
        *id_slot = Some(LeafId(idx));
    });
    canonical
}

/// `Transform(pattern) -> Either<Required<leaves...>>` (§5.5): iteratively expand non-leaf
/// children until every remaining group is leaves only. `Either` fans out into one group per
/// alternative; `OneOrMore`'s single child is duplicated once; the other branch kinds flatten
/// inline.
pub(crate) fn transform(pattern: &Pattern) -> Pattern {
    let mut groups: VecDeque<Vec<Pattern>> = VecDeque::new();
    groups.push_back(vec![pattern.clone()]);
    let mut alternatives: Vec<Vec<Pattern>> = Vec::new();

    while let Some(mut children) = groups.pop_front() {
        match children.iter().position(|p| !matches!(p, Pattern::Leaf { .. })) {
            Some(idx) => {
                let branch = children.remove(idx);
                match branch {
                    Pattern::Either(alts) => {
                        for alt in alts {
                            let mut group = vec![alt];
                            group.extend(children.clone());
                            groups.push_back(group);
                        }
                    }
                    Pattern::OneOrMore(inner) => {
                        let mut group = vec![(*inner).clone(), (*inner).clone()];
                        group.extend(children);
                        groups.push_back(group);
                    }
                    Pattern::Required(xs) | Pattern::Optional(xs) | Pattern::OptionsShortcut(xs) => {
                        let mut group = xs;
                        group.extend(children);
                        groups.push_back(group);
                    }
                    Pattern::Leaf { .. } => unreachable!("position() only finds non-leaves"),
                }
            }
            None => alternatives.push(children),
        }
    }

    Pattern::Either(alternatives.into_iter().map(Pattern::Required).collect())
}

/// For every alternative produced by [`transform`], find leaves that occur more than once and
/// rewrite their initial value in `defaults` (keyed by id, so the rewrite is visible at every
/// occurrence that shares the id).
fn fix_repeating_arguments(tree: &Pattern, canonical: &[Leaf], defaults: &mut [crate::value::Value]) {
    let either = transform(tree);
    let alternatives = match either {
        Pattern::Either(xs) => xs,
        _ => unreachable!("transform always returns an Either"),
    };

    for alt in alternatives {
        let leaves = match alt {
            Pattern::Required(xs) => xs,
            _ => unreachable!("transform's alternatives are always Required"),
        };
        let mut counts: HashMap<LeafId, usize> = HashMap::new();
        for leaf in &leaves {
            if let Pattern::Leaf { id: Some(id), .. } = leaf {
                *counts.entry(*id).or_insert(0) += 1;
            }
        }
        for (id, count) in counts {
            if count > 1 {
                let leaf = &canonical[id.0];
                let current = std::mem::take(&mut defaults[id.0]);
                defaults[id.0] = repeating_initial(leaf, current);
            }
        }
    }
}

fn repeating_initial(leaf: &Leaf, current: crate::value::Value) -> crate::value::Value {
    use crate::value::Value;
    match leaf {
        Leaf::Command { .. } => Value::Int(0),
        Leaf::Option { arg_count: 0, .. } => Value::Int(0),
        Leaf::Argument { .. } | Leaf::Option { .. } => current.into_repeating_initial(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::OptionDesc;
    use crate::parser::parse_pattern;
    use crate::value::Value;

    #[test]
    fn fix_identities_shares_leaf_ids_for_equal_leaves() {
        let mut options = Vec::new();
        let mut tree = parse_pattern("( -v -v )", &mut options).unwrap();
        let canonical = fix_identities(&mut tree);
        assert_eq!(canonical.len(), 1);
        let ids = collect_leaf_ids(&tree);
        assert_eq!(ids, vec![LeafId(0), LeafId(0)]);
    }

    fn collect_leaf_ids(p: &Pattern) -> Vec<LeafId> {
        let mut out = Vec::new();
        p.for_each_leaf(&mut |_, id| out.push(id.unwrap()));
        out
    }

    #[test]
    fn transform_distributes_either_and_duplicates_one_or_more() {
        let mut options = Vec::new();
        let tree = parse_pattern("( a... | b )", &mut options).unwrap();
        let either = transform(&tree);
        match either {
            Pattern::Either(alts) => {
                assert_eq!(alts.len(), 2);
                for alt in &alts {
                    assert!(matches!(alt, Pattern::Required(_)));
                }
            }
            _ => panic!("expected Either"),
        }
    }

    #[test]
    fn repeating_argument_gets_list_initial_value() {
        let mut options = Vec::new();
        let tree = parse_pattern("( ship new <name>... )", &mut options).unwrap();
        let normalized = normalize(tree, &options);
        let idx = normalized
            .canonical
            .iter()
            .position(|l| matches!(l, Leaf::Argument { name } if name == "<name>"))
            .unwrap();
        assert_eq!(normalized.defaults[idx], Value::List(Vec::new()));
    }

    #[test]
    fn non_repeating_argument_stays_null() {
        let mut options = Vec::new();
        let tree = parse_pattern("( <x> <y> )", &mut options).unwrap();
        let normalized = normalize(tree, &options);
        for (leaf, default) in normalized.canonical.iter().zip(&normalized.defaults) {
            if matches!(leaf, Leaf::Argument { .. }) {
                assert_eq!(*default, Value::Null);
            }
        }
    }

    #[test]
    fn options_shortcut_fills_with_undeclared_options() {
        let mut options = vec![OptionDesc {
            short: Some('v'),
            long: Some("verbose".into()),
            arg_count: 0,
            default: Value::Bool(false),
        }];
        let tree = parse_pattern("( [options] )", &mut options).unwrap();
        let mut tree = tree;
        fill_options_shortcuts(&mut tree, &options);
        let mut found = false;
        tree.for_each_leaf(&mut |leaf, _| {
            if let Leaf::Option { name, .. } = leaf {
                if name.canonical_name() == "--verbose" {
                    found = true;
                }
            }
        });
        assert!(found);
    }
}
