//! `application/x-www-form-urlencoded` codec
//!
//! Decodes query strings and form bodies into nested [`Payload`]s
//! (`a[b][c]=v`, `list[]=v`) and flattens payloads back into the same
//! bracketed form.

use crate::payload::Payload;
use serde_json::Value;
use std::borrow::Cow;

/// Deepest bracket path kept by [`parse_str`]; deeper names are dropped
pub const MAX_NESTING: usize = 64;

/// Decode a form component (name or value) with minimal allocations
///
/// `+` becomes a space and percent-escapes are decoded. Malformed escapes
/// are kept literally and invalid UTF-8 is replaced.
pub fn decode_component(s: &str) -> Cow<'_, str> {
    // Fast path: no encoding at all
    if !s.contains('+') && !s.contains('%') {
        return Cow::Borrowed(s);
    }

    let with_spaces = if s.contains('+') {
        Cow::Owned(s.replace('+', " "))
    } else {
        Cow::Borrowed(s)
    };

    match urlencoding::decode(&with_spaces) {
        Ok(decoded) => Cow::Owned(decoded.into_owned()),
        Err(_) => {
            let bytes = urlencoding::decode_binary(with_spaces.as_bytes());
            Cow::Owned(String::from_utf8_lossy(&bytes).into_owned())
        }
    }
}

/// Parse URL-encoded text into a payload.
///
/// Bracketed names nest: `user[name]=bob` yields `{"user": {"name": "bob"}}`
/// and `tag[]=a&tag[]=b` yields `{"tag": {"0": "a", "1": "b"}}`. A later
/// assignment to the same name overwrites the earlier one. Names nested
/// more than [`MAX_NESTING`] levels deep are discarded.
pub fn parse_str(input: &str) -> Payload {
    let mut payload = Payload::new();

    for pair in input.split('&') {
        if pair.is_empty() {
            continue;
        }
        let (raw_name, raw_value) = pair.split_once('=').unwrap_or((pair, ""));
        let name = decode_component(raw_name);
        let value = Value::String(decode_component(raw_value).into_owned());

        if let Some((base, path)) = split_name(&name) {
            insert_path(&mut payload, base, &path, value);
        }
    }

    payload
}

/// Split `base[a][][b]` into `base` and its path segments (`None` = append).
///
/// Names whose brackets never close are returned whole with an empty path.
/// Names deeper than [`MAX_NESTING`] yield `None`.
fn split_name(name: &str) -> Option<(String, Vec<Option<String>>)> {
    let Some(open) = name.find('[') else {
        return (!name.is_empty()).then(|| (name.to_string(), Vec::new()));
    };
    let base = &name[..open];
    if base.is_empty() {
        return None;
    }

    let mut path = Vec::new();
    let mut rest = &name[open..];
    while let Some(inner) = rest.strip_prefix('[') {
        let Some(close) = inner.find(']') else {
            return Some((name.to_string(), Vec::new()));
        };
        if path.len() == MAX_NESTING {
            return None;
        }
        let segment = &inner[..close];
        path.push((!segment.is_empty()).then(|| segment.to_string()));
        rest = &inner[close + 1..];
    }

    Some((base.to_string(), path))
}

fn insert_path(map: &mut Payload, key: String, path: &[Option<String>], value: Value) {
    let Some((next, rest)) = path.split_first() else {
        map.insert(key, value);
        return;
    };

    let entry = map
        .entry(key)
        .or_insert_with(|| Value::Object(Payload::new()));
    if !entry.is_object() {
        *entry = Value::Object(Payload::new());
    }
    if let Value::Object(child) = entry {
        let child_key = match next {
            Some(k) => k.clone(),
            None => match next_index(child) {
                Some(index) => index.to_string(),
                None => return,
            },
        };
        insert_path(child, child_key, rest, value);
    }
}

/// One past the largest numeric key, 0 for none, `None` when that
/// would overflow.
fn next_index(map: &Payload) -> Option<u64> {
    match map.keys().filter_map(|k| k.parse::<u64>().ok()).max() {
        Some(largest) => largest.checked_add(1),
        None => Some(0),
    }
}

/// Encode a payload as a URL-encoded query string.
///
/// Nested values flatten to `outer[inner]` names, booleans encode as `1`/`0`
/// and nulls are omitted.
pub fn build_query(payload: &Payload) -> String {
    let mut pairs = Vec::new();
    for (key, value) in payload {
        flatten(key.clone(), value, &mut pairs);
    }

    pairs
        .iter()
        .map(|(name, value)| {
            format!("{}={}", urlencoding::encode(name), urlencoding::encode(value))
        })
        .collect::<Vec<_>>()
        .join("&")
}

fn flatten(name: String, value: &Value, out: &mut Vec<(String, String)>) {
    match value {
        Value::Null => {}
        Value::Bool(b) => out.push((name, if *b { "1" } else { "0" }.to_string())),
        Value::Number(n) => out.push((name, n.to_string())),
        Value::String(s) => out.push((name, s.clone())),
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                flatten(format!("{}[{}]", name, index), item, out);
            }
        }
        Value::Object(map) => {
            for (key, item) in map {
                flatten(format!("{}[{}]", name, key), item, out);
            }
        }
    }
}

/// Flatten a payload into raw name/value pairs.
///
/// The payload goes through [`build_query`] and is split back apart, so
/// names carry the bracket notation while both halves are plain text again.
pub fn form_pairs(payload: &Payload) -> Vec<(String, String)> {
    build_query(payload)
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
            (
                decode_component(name).into_owned(),
                decode_component(value).into_owned(),
            )
        })
        .collect()
}
