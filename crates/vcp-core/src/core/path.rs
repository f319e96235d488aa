// crates/vcp-core/src/core/path.rs
// ============================================================================
// Module: VCP Path Accessor
// Description: Dot-delimited get/set over nested JSON maps.
// Purpose: Locate provider fields and write canonical fields by path.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! Paths are dot-delimited map keys (`call.call_id`). Reads never fail: a
//! missing segment or a non-map intermediate yields `None`, which callers
//! treat as "no rule output". Writes create intermediate maps and overwrite
//! the final segment (last writer wins, no merge).
//!
//! Invariants:
//! - `get(set(c, p, v), p) == Some(v)` for any non-empty path `p`.
//! - Only objects are traversed; arrays are treated as leaf values.
//!
//! Security posture: provider payloads are untrusted; traversal is bounded by
//! the number of path segments.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde_json::Map;
use serde_json::Value;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Separator between path segments.
pub const PATH_SEPARATOR: char = '.';

// ============================================================================
// SECTION: Accessors
// ============================================================================

/// Returns the value at `path`, or `None` when any segment is absent.
#[must_use]
pub fn get<'a>(container: &'a Value, path: &str) -> Option<&'a Value> {
    let mut cursor = container;
    for segment in path.split(PATH_SEPARATOR) {
        cursor = cursor.as_object()?.get(segment)?;
    }
    Some(cursor)
}

/// Writes `value` at `path`, creating intermediate maps as needed.
///
/// Non-map intermediates (and a non-map container) are replaced by empty
/// maps. The final segment is overwritten.
pub fn set(container: &mut Value, path: &str, value: Value) {
    let mut segments = path.split(PATH_SEPARATOR).peekable();
    let mut cursor = container;
    while let Some(segment) = segments.next() {
        if !cursor.is_object() {
            *cursor = Value::Object(Map::new());
        }
        let Value::Object(map) = cursor else {
            return;
        };
        if segments.peek().is_none() {
            map.insert(segment.to_string(), value);
            return;
        }
        cursor = map.entry(segment.to_string()).or_insert_with(|| Value::Object(Map::new()));
    }
}

/// Removes and returns the value at `path`, leaving parents in place.
pub fn remove(container: &mut Value, path: &str) -> Option<Value> {
    let (parent, leaf) = match path.rsplit_once(PATH_SEPARATOR) {
        Some((parent, leaf)) => (get_mut(container, parent)?, leaf),
        None => (container, path),
    };
    parent.as_object_mut()?.remove(leaf)
}

/// Returns a mutable reference to the value at `path`.
fn get_mut<'a>(container: &'a mut Value, path: &str) -> Option<&'a mut Value> {
    let mut cursor = container;
    for segment in path.split(PATH_SEPARATOR) {
        cursor = cursor.as_object_mut()?.get_mut(segment)?;
    }
    Some(cursor)
}

// ============================================================================
// SECTION: Flattening
// ============================================================================

/// Flattens nested maps into dot-joined keys.
///
/// Non-map values (including arrays) are emitted as leaves. Empty nested maps
/// are kept as leaves so their keys stay visible to keyword matching.
#[must_use]
pub fn flatten(value: &Value) -> BTreeMap<String, Value> {
    let mut out = BTreeMap::new();
    if let Value::Object(map) = value {
        flatten_into(map, None, &mut out);
    }
    out
}

/// Recursive helper for [`flatten`].
fn flatten_into(map: &Map<String, Value>, prefix: Option<&str>, out: &mut BTreeMap<String, Value>) {
    for (key, value) in map {
        let joined = prefix.map_or_else(|| key.clone(), |prefix| format!("{prefix}.{key}"));
        match value {
            Value::Object(inner) if !inner.is_empty() => flatten_into(inner, Some(&joined), out),
            _ => {
                out.insert(joined, value.clone());
            }
        }
    }
}

// ============================================================================
// SECTION: Unit Tests
// ============================================================================
