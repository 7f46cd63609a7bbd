use crate::cursor::Cursor;
use crate::error::DocoptError;
use crate::longshort::{resolve_long, resolve_shorts, Context};
use crate::options::OptionDesc;
use crate::pattern::{Leaf, LeafMatch, ShortLong};
use crate::value::Value;

/// Consume argv against the known `options`, emitting a flat list of leaf matches (§5.4.3).
///
/// ```text
/// while current != None:
///   if current == "--":                     remainder -> positional Arguments; stop
///   elif current starts with "--":           parse_long
///   elif current starts with "-" and != "-": parse_shorts
///   elif options_first:                      remainder -> positional Arguments; stop
///   else:                                    emit Argument(None, current); advance
/// ```
pub(crate) fn parse_argv(
    argv: &[String],
    options: &mut Vec<OptionDesc>,
    options_first: bool,
) -> Result<Vec<LeafMatch>, DocoptError> {
    let mut cursor = Cursor::new(argv.to_vec());
    let mut out = Vec::new();

    while let Some(tok) = cursor.current() {
        if tok == "--" {
            cursor.advance();
            for word in cursor.drain_rest() {
                out.push(positional(word));
            }
            break;
        } else if tok.starts_with("--") {
            let resolved = resolve_long(&mut cursor, options, Context::Argv)?;
            out.push(option_match(resolved.desc, resolved.value));
        } else if tok.starts_with('-') && tok != "-" {
            let resolved = resolve_shorts(&mut cursor, options, Context::Argv)?;
            for r in resolved {
                out.push(option_match(r.desc, r.value));
            }
        } else if options_first {
            for word in cursor.drain_rest() {
                out.push(positional(word));
            }
            break;
        } else {
            let word = cursor.advance().unwrap();
            out.push(positional(word));
        }
    }

    Ok(out)
}

fn positional(word: String) -> LeafMatch {
    LeafMatch {
        leaf: Leaf::Argument { name: String::new() },
        value: Value::Str(word),
    }
}

fn option_match(desc: OptionDesc, value: Option<String>) -> LeafMatch {
    let name: ShortLong = desc.short_long();
    let resolved_value = match value {
        Some(v) => Value::Str(v),
        None => Value::Bool(true),
    };
    LeafMatch {
        leaf: Leaf::Option {
            name,
            arg_count: desc.arg_count,
            default: desc.default,
        },
        value: resolved_value,
    }
}
