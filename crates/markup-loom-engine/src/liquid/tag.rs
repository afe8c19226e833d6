use crate::engine::CLOSER_DATA_PREFIX;
use crate::models::{Data, Value};

use super::lexical;

/// Data key holding the positional arguments of a tag.
pub const ARGS: &str = "args";
/// Set when the tag opens with `{%-`.
pub const TRIM_LEFT: &str = ":trim_left";
/// Set when the tag closes with `-%}`.
pub const TRIM_RIGHT: &str = ":trim_right";
/// The tag as written. Emitted again for as long as the data still matches it.
pub const SOURCE: &str = ":source";

/// Reads a whole `{% … %}` tag at the start of `text`: bytes consumed, tag
/// name and data, including [`SOURCE`] and the trim flags.
pub fn read_tag(text: &str) -> Option<(usize, String, Data)> {
    let caps = lexical::tag_block().captures(text)?;
    let (tag, mut data) = parse_tag(&caps[2])?;
    if !caps[1].is_empty() {
        data.insert(TRIM_LEFT.to_string(), Value::Bool(true));
    }
    if !caps[3].is_empty() {
        data.insert(TRIM_RIGHT.to_string(), Value::Bool(true));
    }
    data.insert(SOURCE.to_string(), Value::String(caps[0].to_string()));
    Some((caps[0].len(), tag, data))
}

/// Parses the inside of a `{% … %}` tag into its name and data.
///
/// Positional tokens are collected in order under [`ARGS`]; `key=value`
/// pairs are stored under their key. Quoted tokens become strings, booleans
/// and numbers that print back unchanged are typed, anything else
/// (identifiers, operators, filters, `007`) is kept as a bare symbol.
pub fn parse_tag(inner: &str) -> Option<(String, Data)> {
    let caps = lexical::tag_line().captures(inner)?;
    let tag = caps[1].to_string();
    let rest = caps.get(2).map_or("", |m| m.as_str());

    let mut data = Data::new();
    let mut args = Vec::new();
    for prop in lexical::prop().captures_iter(rest) {
        if let (Some(key), Some(value)) = (prop.get(1), prop.get(2)) {
            data.insert(key.as_str().to_string(), literal(value.as_str()));
        } else if let Some(token) = prop.get(3) {
            args.push(literal(token.as_str()));
        }
    }
    if !args.is_empty() {
        data.insert(ARGS.to_string(), Value::List(args));
    }
    Some((tag, data))
}

/// Writes a tag back.
///
/// A tag still carrying its [`SOURCE`] is written exactly as it was read,
/// unless its name or data changed since. Otherwise the canonical form is
/// `{% tag args… key=value… %}` with the trim flags honoured.
pub fn stringify_tag(tag: &str, data: &Data) -> String {
    if let Some(source) = data.get(SOURCE).and_then(Value::as_str) {
        let unchanged = read_tag(source).is_some_and(|(len, read, read_data)| {
            len == source.len() && read == tag && own_data(&read_data).eq(own_data(data))
        });
        if unchanged {
            return source.to_string();
        }
    }

    let trim = |key: &str| {
        if data.get(key).and_then(Value::as_bool) == Some(true) {
            "-"
        } else {
            ""
        }
    };
    let mut out = format!("{{%{} {tag}", trim(TRIM_LEFT));
    if let Some(Value::List(args)) = data.get(ARGS) {
        for arg in args {
            out.push(' ');
            out.push_str(&arg.to_string());
        }
    }
    for (key, value) in data.iter().filter(|(key, _)| is_keyword(key)) {
        out.push_str(&format!(" {key}={value}"));
    }
    out.push_str(&format!(" {}%}}", trim(TRIM_RIGHT)));
    out
}

/// Data describing the tag itself, without its source text or the data of
/// the closer kept alongside it.
fn own_data(data: &Data) -> impl Iterator<Item = (&String, &Value)> {
    data.iter()
        .filter(|(key, _)| key.as_str() != SOURCE && !key.starts_with(CLOSER_DATA_PREFIX))
}

/// Keys written as `key=value`. Identifiers never contain `:`, so keys with
/// one are bookkeeping.
fn is_keyword(key: &str) -> bool {
    key != ARGS && !key.contains(':')
}

fn literal(token: &str) -> Value {
    if lexical::quoted_line().is_match(token) {
        Value::String(unquote(token))
    } else if lexical::bool_line().is_match(token) {
        Value::Bool(token.eq_ignore_ascii_case("true"))
    } else if lexical::number_line().is_match(token) {
        token
            .parse()
            .map(Value::Number)
            .ok()
            .filter(|number| number.to_string() == token)
            .unwrap_or_else(|| Value::Symbol(token.to_string()))
    } else {
        Value::Symbol(token.to_string())
    }
}

fn unquote(token: &str) -> String {
    let body = &token[1..token.len() - 1];
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(escaped) = chars.next() {
                out.push(escaped);
            }
        } else {
            out.push(c);
        }
    }
    out
}
