use crate::cursor::Cursor;
use crate::error::DocoptError;
use crate::longshort::{resolve_long, resolve_shorts, Context};
use crate::options::OptionDesc;
use crate::pattern::{Leaf, Pattern};
use crate::tokenizer::tokenize_pattern;

/// Parse a formal usage expression (already run through [`crate::sections::formal_usage`]) into
/// a pattern tree (§5.4). `options` is the registry of options known so far; options mentioned
/// here for the first time are appended to it.
pub(crate) fn parse_pattern(formal: &str, options: &mut Vec<OptionDesc>) -> Result<Pattern, DocoptError> {
    let tokens = tokenize_pattern(formal);
    let mut cursor = Cursor::new(tokens);
    let result = parse_expr(&mut cursor, options)?;
    if let Some(tok) = cursor.current() {
        return Err(DocoptError::language(format!("unexpected '{tok}' in usage pattern")));
    }
    Ok(Pattern::Required(result))
}

/// `expr ::= seq ( '|' seq )*`
fn parse_expr(cursor: &mut Cursor, options: &mut Vec<OptionDesc>) -> Result<Vec<Pattern>, DocoptError> {
    let seq = parse_seq(cursor, options)?;
    if cursor.current() != Some("|") {
        return Ok(seq);
    }

    let mut alternatives = if seq.len() > 1 { vec![Pattern::Required(seq)] } else { seq };
    while cursor.current() == Some("|") {
        cursor.advance();
        let seq = parse_seq(cursor, options)?;
        if seq.len() > 1 {
            alternatives.push(Pattern::Required(seq));
        } else {
            alternatives.extend(seq);
        }
    }

    if alternatives.len() > 1 {
        Ok(vec![Pattern::Either(dedup_alternatives(alternatives))])
    } else {
        Ok(alternatives)
    }
}

/// `seq ::= ( atom [ '...' ] )*`
fn parse_seq(cursor: &mut Cursor, options: &mut Vec<OptionDesc>) -> Result<Vec<Pattern>, DocoptError> {
    let mut result = Vec::new();
    while let Some(tok) = cursor.current() {
        if tok == "]" || tok == ")" || tok == "|" {
            break;
        }
        let mut atom = parse_atom(cursor, options)?;
        if cursor.current() == Some("...") {
            cursor.advance();
            let child = if atom.len() == 1 { atom.remove(0) } else { Pattern::Required(atom) };
            atom = vec![Pattern::OneOrMore(Box::new(child))];
        }
        result.extend(atom);
    }
    Ok(result)
}

/// `atom ::= '(' expr ')' | '[' expr ']' | 'options' | long | shorts | argument | command`
fn parse_atom(cursor: &mut Cursor, options: &mut Vec<OptionDesc>) -> Result<Vec<Pattern>, DocoptError> {
    let tok = match cursor.current() {
        Some(t) => t.to_string(),
        None => return Err(DocoptError::language("unexpected end of usage pattern")),
    };

    if tok == "(" {
        cursor.advance();
        let inner = parse_expr(cursor, options)?;
        return match cursor.advance().as_deref() {
            Some(")") => Ok(vec![Pattern::Required(inner)]),
            _ => Err(DocoptError::language("unmatched '('")),
        };
    }
    if tok == "[" {
        cursor.advance();
        let inner = parse_expr(cursor, options)?;
        return match cursor.advance().as_deref() {
            Some("]") => Ok(vec![Pattern::Optional(inner)]),
            _ => Err(DocoptError::language("unmatched '['")),
        };
    }
    if tok == "options" {
        cursor.advance();
        return Ok(vec![Pattern::OptionsShortcut(Vec::new())]);
    }
    if tok.starts_with("--") && tok != "--" {
        let resolved = resolve_long(cursor, options, Context::Pattern)?;
        return Ok(vec![Pattern::leaf(Leaf::Option {
            name: resolved.desc.short_long(),
            arg_count: resolved.desc.arg_count,
            default: resolved.desc.default,
        })]);
    }
    if tok.starts_with('-') && tok != "-" && tok != "--" {
        let resolved = resolve_shorts(cursor, options, Context::Pattern)?;
        return Ok(resolved
            .into_iter()
            .map(|r| {
                Pattern::leaf(Leaf::Option {
                    name: r.desc.short_long(),
                    arg_count: r.desc.arg_count,
                    default: r.desc.default,
                })
            })
            .collect());
    }
    if is_argument_name(&tok) {
        cursor.advance();
        return Ok(vec![Pattern::leaf(Leaf::Argument { name: tok })]);
    }
    cursor.advance();
    Ok(vec![Pattern::leaf(Leaf::Command { name: tok })])
}

/// `<name>` or fully-uppercase (docopt's `token.isupper()`: at least one cased character, all
/// cased characters uppercase).
fn is_argument_name(tok: &str) -> bool {
    if tok.starts_with('<') && tok.ends_with('>') {
        return true;
    }
    let mut saw_letter = false;
    for c in tok.chars() {
        if c.is_alphabetic() {
            saw_letter = true;
            if !c.is_uppercase() {
                return false;
            }
        }
    }
    saw_letter
}

/// Deduplicate alternatives while preserving source order — `a | a | b` collapses to `a | b`.
fn dedup_alternatives(alternatives: Vec<Pattern>) -> Vec<Pattern> {
    let mut seen = Vec::new();
    let mut out = Vec::new();
    for alt in alternatives {
        let key = alt.to_string();
        if !seen.contains(&key) {
            seen.push(key);
            out.push(alt);
        }
    }
    out
}
