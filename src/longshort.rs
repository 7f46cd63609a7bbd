use crate::cursor::Cursor;
use crate::error::DocoptError;
use crate::options::{find_long, find_short, OptionDesc};
use crate::value::Value;

/// Whether we're resolving an option against the usage pattern or against argv. The two share
/// almost all of `resolve_long`/`resolve_shorts`'s logic (§5.4.1, §5.4.2); they differ only in
/// whether unique-prefix matching is allowed and which error category a failure maps to.
#[derive(Clone, Copy, PartialEq, Eq)]
pub(crate) enum Context {
    Pattern,
    Argv,
}

impl Context {
    fn error(self, msg: String) -> DocoptError {
        match self {
            Context::Pattern => DocoptError::language(msg),
            Context::Argv => DocoptError::input(msg),
        }
    }
}

/// The descriptor an occurrence resolved to, plus the value consumed for it (if any —
/// `None` means "no value was read for this occurrence", not "the value is null").
#[derive(Debug)]
pub(crate) struct Resolved {
    pub(crate) desc: OptionDesc,
    pub(crate) value: Option<String>,
}

/// Resolve a `--long` or `--long=value` token, creating a fresh descriptor if this is the first
/// time this long option has been seen.
pub(crate) fn resolve_long(
    cursor: &mut Cursor,
    options: &mut Vec<OptionDesc>,
    ctx: Context,
) -> Result<Resolved, DocoptError> {
    let token = cursor.advance().expect("caller already peeked current()");
    let rest = token.strip_prefix("--").unwrap_or(&token).to_string();
    let (long_name, mut value) = match rest.split_once('=') {
        Some((n, v)) => (n.to_string(), Some(v.to_string())),
        None => (rest, None),
    };

    let allow_prefix = ctx == Context::Argv;
    match find_long(options, &long_name, allow_prefix) {
        Err(candidates) => Err(ctx.error(format!(
            "--{long_name} is not a unique prefix: --{}?",
            candidates.join(", --")
        ))),
        Ok(Some(existing)) => {
            let desc = existing.clone();
            if desc.arg_count == 0 {
                if value.is_some() {
                    return Err(ctx.error(format!("--{} must not have an argument", desc.long.as_deref().unwrap_or(&long_name))));
                }
            } else if value.is_none() {
                match cursor.current() {
                    None | Some("--") => {
                        return Err(ctx.error(format!("--{long_name} requires argument")));
                    }
                    Some(_) => value = cursor.advance(),
                }
            }
            Ok(Resolved { desc, value })
        }
        Ok(None) => {
            let arg_count = u8::from(value.is_some());
            let desc = OptionDesc {
                short: None,
                long: Some(long_name),
                arg_count,
                default: if arg_count == 1 { Value::Null } else { Value::Bool(false) },
            };
            options.push(desc.clone());
            Ok(Resolved { desc, value })
        }
    }
}

/// Resolve a `-abc` short cluster, returning one `Resolved` per character consumed. Unlike
/// `resolve_long`, `=` has no special meaning here: if the last flag in the cluster takes an
/// argument, the remainder of the cluster is its value verbatim, `=` included (`-f=bar` binds
/// `value = "=bar"`, not `"bar"`) — upstream docopt never special-cases `=` for short options.
pub(crate) fn resolve_shorts(
    cursor: &mut Cursor,
    options: &mut Vec<OptionDesc>,
    ctx: Context,
) -> Result<Vec<Resolved>, DocoptError> {
    let token = cursor.advance().expect("caller already peeked current()");
    let rest = token.strip_prefix('-').unwrap_or(&token).to_string();
    let chars: Vec<char> = rest.chars().collect();

    let mut out = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        i += 1;

        let existing: Option<OptionDesc> = {
            let matches = find_short(options, c);
            if matches.len() > 1 {
                return Err(ctx.error(format!("-{c} is specified ambiguously {} times", matches.len())));
            }
            matches.first().map(|d| (*d).clone())
        };

        let mut value = None;
        let desc = match existing {
            Some(desc) if desc.arg_count == 1 => {
                if i < chars.len() {
                    value = Some(chars[i..].iter().collect());
                    i = chars.len();
                } else {
                    match cursor.current() {
                        None | Some("--") => return Err(ctx.error(format!("-{c} requires argument"))),
                        Some(_) => value = cursor.advance(),
                    }
                }
                desc
            }
            Some(desc) => desc,
            None => {
                let desc = OptionDesc {
                    short: Some(c),
                    long: None,
                    arg_count: 0,
                    default: Value::Bool(false),
                };
                options.push(desc.clone());
                desc
            }
        };
        out.push(Resolved { desc, value });
    }
    Ok(out)
}
