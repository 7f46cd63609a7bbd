use std::fmt;

use crate::value::Value;

/// Stable identity assigned to a leaf by [`crate::normalize::fix_identities`].
///
/// Structurally-equal leaves (same kind, name and fixed fields) share a `LeafId`; the matcher
/// threads an accumulator keyed by `LeafId` instead of aliasing through shared references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LeafId(pub(crate) usize);

/// Short and/or long name of an `Option` leaf. At least one of the two is always present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShortLong {
    Short(char),
    Long(String),
    ShortLong(char, String),
}

impl ShortLong {
    #[must_use]
    pub fn short(&self) -> Option<char> {
        match self {
            ShortLong::Short(s) | ShortLong::ShortLong(s, _) => Some(*s),
            ShortLong::Long(_) => None,
        }
    }

    #[must_use]
    pub fn long(&self) -> Option<&str> {
        match self {
            ShortLong::Long(l) | ShortLong::ShortLong(_, l) => Some(l.as_str()),
            ShortLong::Short(_) => None,
        }
    }

    /// The `Name` returned by a leaf: the long name if present, otherwise the short.
    #[must_use]
    pub fn canonical_name(&self) -> String {
        match self {
            ShortLong::Short(s) => format!("-{s}"),
            ShortLong::Long(l) | ShortLong::ShortLong(_, l) => format!("--{l}"),
        }
    }
}

impl fmt::Display for ShortLong {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical_name())
    }
}

/// A leaf of the pattern tree: `Argument`, `Command`, or `Option`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Leaf {
    /// Positional value, `<name>` or `ALLCAPS`.
    Argument { name: String },
    /// Literal token, a subtype of `Argument` distinguished by matching a fixed word.
    Command { name: String },
    /// `-s` and/or `--long`, with an argument count of 0 or 1.
    Option {
        name: ShortLong,
        arg_count: u8,
        default: Value,
    },
}

impl Leaf {
    /// The structural key used to decide whether two leaves are "the same" leaf for the
    /// purposes of identity-sharing: kind, name, and the fields that are fixed at parse time
    /// (never the mutable accumulated value).
    #[must_use]
    pub(crate) fn identity_key(&self) -> String {
        match self {
            Leaf::Argument { name } => format!("arg:{name}"),
            Leaf::Command { name } => format!("cmd:{name}"),
            Leaf::Option { name, arg_count, .. } => format!("opt:{name}:{arg_count}"),
        }
    }

    #[must_use]
    pub fn name(&self) -> String {
        match self {
            Leaf::Argument { name } | Leaf::Command { name } => name.clone(),
            Leaf::Option { name, .. } => name.canonical_name(),
        }
    }

    /// The value a freshly-created leaf starts out with, before any repeating-argument fixup.
    #[must_use]
    pub(crate) fn default_value(&self) -> Value {
        match self {
            Leaf::Argument { .. } => Value::Null,
            Leaf::Command { .. } => Value::Bool(false),
            Leaf::Option { arg_count: 0, .. } => Value::Bool(false),
            Leaf::Option { default, .. } => default.clone(),
        }
    }
}

impl fmt::Display for Leaf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Leaf::Argument { name } => write!(f, "{name}"),
            Leaf::Command { name } => write!(f, "{name}"),
            Leaf::Option { name, .. } => write!(f, "{name}"),
        }
    }
}

/// The pattern tree: either a leaf, tagged with its resolved [`LeafId`] once normalized, or a
/// branch over an ordered list of children.
///
/// A single closed enum with one `match` per operation — the variant set (seven variants) does
/// not grow, so a tagged union is the right shape rather than a trait-object hierarchy.
#[derive(Debug, Clone)]
pub enum Pattern {
    Leaf {
        id: Option<LeafId>,
        leaf: Leaf,
    },
    /// All children must match, in order.
    Required(Vec<Pattern>),
    /// Children match in order; the node always succeeds.
    Optional(Vec<Pattern>),
    /// Placeholder for every option in `options:` not already present in the usage pattern.
    /// Filled in after parsing, before matching.
    OptionsShortcut(Vec<Pattern>),
    /// Exactly one child must match; ties broken by the smallest `left` remainder.
    Either(Vec<Pattern>),
    /// The child must match one or more times.
    OneOrMore(Box<Pattern>),
}

impl Pattern {
    #[must_use]
    pub fn leaf(leaf: Leaf) -> Self {
        Pattern::Leaf { id: None, leaf }
    }

    /// Depth-first walk over every leaf reachable from this node, in source order.
    pub(crate) fn for_each_leaf<'a>(&'a self, f: &mut dyn FnMut(&'a Leaf, Option<LeafId>)) {
        match self {
            Pattern::Leaf { id, leaf } => f(leaf, *id),
            Pattern::Required(xs) | Pattern::Optional(xs) | Pattern::OptionsShortcut(xs) | Pattern::Either(xs) => {
                for x in xs {
                    x.for_each_leaf(f);
                }
            }
            Pattern::OneOrMore(x) => x.for_each_leaf(f),
        }
    }

    pub(crate) fn for_each_leaf_mut(&mut self, f: &mut dyn FnMut(&mut Leaf, &mut Option<LeafId>)) {
        match self {
            Pattern::Leaf { id, leaf } => f(leaf, id),
            Pattern::Required(xs) | Pattern::Optional(xs) | Pattern::OptionsShortcut(xs) | Pattern::Either(xs) => {
                for x in xs {
                    x.for_each_leaf_mut(f);
                }
            }
            Pattern::OneOrMore(x) => x.for_each_leaf_mut(f),
        }
    }
}

/// One token resolved from argv: a leaf descriptor plus the concrete value that was parsed
/// for it. This is the "flat list of leaf patterns" the argv parser emits (§5.4.3) and what the
/// matcher's `left` list is made of — distinct from the pattern tree, which holds leaves
/// without values until the matcher folds them into an [`crate::matcher::Accumulator`].
#[derive(Debug, Clone)]
pub(crate) struct LeafMatch {
    pub(crate) leaf: Leaf,
    pub(crate) value: Value,
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn go(xs: &[Pattern], sep: &str, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            for (ix, x) in xs.iter().enumerate() {
                if ix != 0 {
                    f.write_str(sep)?;
                }
                write!(f, "{x}")?;
            }
            Ok(())
        }

        match self {
            Pattern::Leaf { leaf, .. } => write!(f, "{leaf}"),
            Pattern::Required(xs) => {
                f.write_str("(")?;
                go(xs, " ", f)?;
                f.write_str(")")
            }
            Pattern::Optional(xs) | Pattern::OptionsShortcut(xs) => {
                f.write_str("[")?;
                go(xs, " ", f)?;
                f.write_str("]")
            }
            Pattern::Either(xs) => go(xs, " | ", f),
            Pattern::OneOrMore(x) => write!(f, "{x}..."),
        }
    }
}
