//! Splitting secrets out of documents and merging them back in.
//!
//! Both directions build a new tree; the caller's document is never
//! mutated.  Dotpaths walk objects only (array elements are not
//! addressable), and a dotpath that does not resolve is skipped, because
//! a document may be a partial instance of a richer schema.

use serde_json::{Map, Value};

use super::entry::{SecretEntry, SecretPath};
use crate::schema::Kind;

/// Split `document` into a disk-safe copy plus the extracted secrets.
///
/// For every path whose parent resolves to an object holding a non-null
/// leaf, the leaf becomes `null` in the returned document and its value
/// is recorded as an entry: strings verbatim, anything else as JSON text.
/// A leaf that is already `null` is a locked placeholder and yields no
/// entry.  Entries come back in the order of `paths`.
///
/// A path without a declared kind takes the kind of the leaf it found, so
/// `merge` of these entries restores the string `"42"` as a string.  Only
/// the text reaches a credential store: entries rebuilt from stored text
/// without a kind fall back to JSON parsing (see `merge`).
pub fn separate(document: &Value, paths: &[SecretPath]) -> (Value, Vec<SecretEntry>) {
    let split: Vec<Vec<&str>> = paths.iter().map(|p| p.dotpath.split('.').collect()).collect();
    let candidates: Vec<usize> = (0..paths.len()).collect();

    let mut found = Vec::new();
    let plain = strip(document, &split, &candidates, 0, &mut found);

    found.sort_by_key(|(idx, _, _)| *idx);
    let entries = found
        .into_iter()
        .map(|(idx, value, found_kind)| {
            let mut entry = paths[idx].to_entry(value);
            entry.kind = entry.kind.or(found_kind);
            entry
        })
        .collect();
    (plain, entries)
}

fn strip(
    value: &Value,
    split: &[Vec<&str>],
    candidates: &[usize],
    depth: usize,
    found: &mut Vec<(usize, String, Option<Kind>)>,
) -> Value {
    let Value::Object(map) = value else {
        return value.clone();
    };
    if candidates.is_empty() {
        return value.clone();
    }

    let mut out = Map::with_capacity(map.len());
    for (key, child) in map {
        let here: Vec<usize> = candidates
            .iter()
            .copied()
            .filter(|&i| split[i].get(depth).is_some_and(|seg| *seg == key.as_str()))
            .collect();

        let leaf = here.iter().copied().find(|&i| split[i].len() == depth + 1);
        let stripped = match leaf {
            Some(idx) => {
                if !child.is_null() {
                    found.push((idx, to_text(child), kind_of(child)));
                }
                Value::Null
            }
            None => strip(child, split, &here, depth + 1, found),
        };
        out.insert(key.clone(), stripped);
    }
    Value::Object(out)
}

fn kind_of(value: &Value) -> Option<Kind> {
    match value {
        Value::String(_) => Some(Kind::String),
        Value::Number(_) => Some(Kind::Number),
        Value::Bool(_) => Some(Kind::Boolean),
        _ => None,
    }
}

fn to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Inline secret values into `document` at their dotpaths.
///
/// An entry whose parent path does not resolve to an object is ignored.
/// Values are decoded by the entry's kind.  An entry without a kind is
/// read as JSON text when it parses, so an untyped string secret such as
/// `"42"` comes back as the number `42`; declare the kind to avoid that.
pub fn merge(mut document: Value, entries: &[SecretEntry]) -> Value {
    for entry in entries {
        let mut segments: Vec<&str> = entry.dotpath.split('.').collect();
        let Some(leaf) = segments.pop() else {
            continue;
        };
        if let Some(Value::Object(parent)) = descend(&mut document, &segments) {
            parent.insert(leaf.to_string(), from_text(&entry.value, entry.kind));
        }
    }
    document
}

fn descend<'a>(value: &'a mut Value, segments: &[&str]) -> Option<&'a mut Value> {
    segments.iter().try_fold(value, |current, seg| match current {
        Value::Object(map) => map.get_mut(*seg),
        _ => None,
    })
}

/// Turn a stored secret back into a document value.
///
/// A declared string kind is taken verbatim.  Otherwise JSON text becomes
/// the value it encodes and anything unparsable stays a string.
fn from_text(text: &str, kind: Option<Kind>) -> Value {
    if kind == Some(Kind::String) {
        return Value::String(text.to_string());
    }
    match serde_json::from_str::<Value>(text) {
        Ok(parsed) if kind.map_or(true, |k| k.matches(&parsed)) => parsed,
        _ => Value::String(text.to_string()),
    }
}

/// Overwrite the leaves at `paths` with `null`, zeroing string contents first.
pub(crate) fn scrub(document: &mut Value, paths: &[SecretPath]) {
    for path in paths {
        let segments: Vec<&str> = path.dotpath.split('.').collect();
        if let Some(leaf) = descend(document, &segments) {
            wipe(leaf);
        }
    }
}

fn wipe(value: &mut Value) {
    use zeroize::Zeroize;

    match value {
        Value::String(s) => s.zeroize(),
        Value::Array(items) => items.iter_mut().for_each(wipe),
        Value::Object(map) => map.values_mut().for_each(wipe),
        _ => {}
    }
    *value = Value::Null;
}
