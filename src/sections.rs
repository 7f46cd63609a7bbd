use crate::error::DocoptError;

/// Find every line whose content contains `name` (case-insensitive) and accrete following
/// lines while they start with whitespace. This is how `usage:` and `options:` blocks are
/// located in a free-form doc string.
#[must_use]
pub(crate) fn extract_sections(name: &str, doc: &str) -> Vec<String> {
    let lower_name = name.to_lowercase();
    let mut sections = Vec::new();
    let mut current: Option<String> = None;

    for line in doc.lines() {
        if line.to_lowercase().contains(&lower_name) {
            if let Some(s) = current.take() {
                sections.push(s.trim_end().to_string());
            }
            current = Some(line.to_string());
        } else if let Some(s) = current.as_mut() {
            if line.starts_with(' ') || line.starts_with('\t') {
                s.push('\n');
                s.push_str(line);
            } else {
                sections.push(s.trim_end().to_string());
                current = None;
            }
        }
    }
    if let Some(s) = current.take() {
        sections.push(s.trim_end().to_string());
    }
    sections
}

/// Locate the single `usage:` section, erroring if there is not exactly one.
pub(crate) fn usage_section(doc: &str) -> Result<String, DocoptError> {
    let sections = extract_sections("usage:", doc);
    match sections.len() {
        1 => Ok(sections.into_iter().next().unwrap()),
        0 => Err(DocoptError::language(
            "\"usage:\" (case-insensitive) not found.",
        )),
        _ => Err(DocoptError::language(
            "More than one \"usage:\" (case-insensitive) found.",
        )),
    }
}

/// Locate the `options:` sections, if any (there may legitimately be zero or more than one —
/// unlike `usage:` this is never an error).
#[must_use]
pub(crate) fn options_sections(doc: &str) -> Vec<String> {
    extract_sections("options:", doc)
}

/// Turn a `usage:` section into a single bracket-free expression: drop the marker up through
/// the colon, take the first remaining token as the program name, and replace every later
/// occurrence of that exact token with `) | (`, wrapping the whole thing in `( … )`. This is
/// how alternative usage lines collapse into an `Either` without dedicated syntax.
#[must_use]
pub(crate) fn formal_usage(section: &str) -> String {
    let after_colon = section.split_once(':').map_or(section, |(_, rest)| rest);
    let mut words = after_colon.split_whitespace();
    let prog = match words.next() {
        Some(p) => p,
        None => return "( )".to_string(),
    };

    let mut parts: Vec<&str> = vec!["("];
    for word in words {
        if word == prog {
            parts.push(")");
            parts.push("|");
            parts.push("(");
        } else {
            parts.push(word);
        }
    }
    parts.push(")");
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_single_usage_section() {
        let doc = "Usage:\n  prog [-v]\n\nOther text";
        let sections = extract_sections("usage:", doc);
        assert_eq!(sections, vec!["Usage:\n  prog [-v]".to_string()]);
    }

    #[test]
    fn rejects_zero_usage_sections() {
        let err = usage_section("no sections here at all").unwrap_err();
        assert!(err.unwrap_language().contains("not found"));
    }

    #[test]
    fn rejects_duplicate_usage_sections() {
        let doc = "usage: a\n\nusage: b";
        let err = usage_section(doc).unwrap_err();
        assert!(err.unwrap_language().contains("More than one"));
    }

    #[test]
    fn formal_usage_turns_alternatives_into_either() {
        let section = "usage: prog ship new <name>...\n       prog mine (set|remove) <x> <y>";
        let formal = formal_usage(section);
        assert_eq!(
            formal,
            "( ship new <name>... ) | ( mine (set|remove) <x> <y> )"
        );
    }
}
