use crate::pattern::ShortLong;
use crate::value::Value;

/// A single `Option` descriptor read out of an `options:` section, before it's woven into the
/// pattern tree. Carries the name(s), how many arguments it expects, and its default value.
#[derive(Debug, Clone)]
pub(crate) struct OptionDesc {
    pub(crate) short: Option<char>,
    pub(crate) long: Option<String>,
    pub(crate) arg_count: u8,
    pub(crate) default: Value,
}

impl OptionDesc {
    #[must_use]
    pub(crate) fn short_long(&self) -> ShortLong {
        match (self.short, &self.long) {
            (Some(s), Some(l)) => ShortLong::ShortLong(s, l.clone()),
            (Some(s), None) => ShortLong::Short(s),
            (None, Some(l)) => ShortLong::Long(l.clone()),
            (None, None) => unreachable!("an option descriptor always has a short or long name"),
        }
    }

    fn matches_short(&self, c: char) -> bool {
        self.short == Some(c)
    }

    fn matches_long(&self, name: &str) -> bool {
        self.long.as_deref() == Some(name)
    }
}

/// Parse every `options:` section into a flat, deduplicated list of descriptors (§5.2).
///
/// Each chunk begins with a line starting with `-` (after a preceding newline or tab); the
/// chunk splits at the *first* two-space separator into the option spec and its description —
/// a single-space separator is, by design, mis-parsed, matching upstream docopt exactly.
#[must_use]
pub(crate) fn parse_defaults(sections: &[String]) -> Vec<OptionDesc> {
    let mut out = Vec::new();
    for section in sections {
        for chunk in split_option_chunks(section) {
            if let Some(desc) = parse_option_chunk(&chunk) {
                out.push(desc);
            }
        }
    }
    out
}

/// Split a section's body into chunks, each chunk beginning at a line that starts with `-`.
fn split_option_chunks(section: &str) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut started = false;

    for line in section.lines() {
        let trimmed_start = line.trim_start_matches([' ', '\t']);
        if trimmed_start.starts_with('-') {
            if started {
                chunks.push(std::mem::take(&mut current));
            }
            started = true;
            current.push_str(line.trim());
        } else if started {
            current.push(' ');
            current.push_str(line.trim());
        }
    }
    if started {
        chunks.push(current);
    }
    chunks
}

fn parse_option_chunk(chunk: &str) -> Option<OptionDesc> {
    let (options_part, description) = match chunk.split_once("  ") {
        Some((o, d)) => (o, d),
        None => (chunk, ""),
    };

    let mut short = None;
    let mut long = None;
    let mut takes_arg = false;

    for tok in options_part.split([' ', '\t', ',', '=']) {
        let tok = tok.trim();
        if tok.is_empty() {
            continue;
        }
        if let Some(rest) = tok.strip_prefix("--") {
            long = Some(rest.to_string());
        } else if let Some(rest) = tok.strip_prefix('-') {
            short = rest.chars().next();
        } else {
            takes_arg = true;
        }
    }

    if short.is_none() && long.is_none() {
        return None;
    }

    let (arg_count, default) = if takes_arg {
        (1, find_default(description).map_or(Value::Null, Value::Str))
    } else {
        (0, Value::Bool(false))
    };

    Some(OptionDesc {
        short,
        long,
        arg_count,
        default,
    })
}

/// Scan a description for a case-insensitive `[default: X]` marker.
fn find_default(description: &str) -> Option<String> {
    let lower = description.to_lowercase();
    let start = lower.find("[default:")?;
    let rest = &description[start + "[default:".len()..];
    let end = rest.find(']')?;
    Some(rest[..end].trim().to_string())
}

/// Look up a descriptor by long name (or, in argv context, by unique prefix).
pub(crate) fn find_long<'a>(
    options: &'a [OptionDesc],
    long_name: &str,
    allow_prefix: bool,
) -> Result<Option<&'a OptionDesc>, Vec<&'a str>> {
    if let Some(exact) = options.iter().find(|o| o.matches_long(long_name)) {
        return Ok(Some(exact));
    }
    if !allow_prefix {
        return Ok(None);
    }
    let matches: Vec<&str> = options
        .iter()
        .filter_map(|o| o.long.as_deref())
        .filter(|l| l.starts_with(long_name))
        .collect();
    match matches.len() {
        0 => Ok(None),
        1 => Ok(options.iter().find(|o| o.long.as_deref() == Some(matches[0]))),
        _ => Err(matches),
    }
}

/// Look up a descriptor by short name.
#[must_use]
pub(crate) fn find_short(options: &[OptionDesc], c: char) -> Vec<&OptionDesc> {
    options.iter().filter(|o| o.matches_short(c)).collect()
}
