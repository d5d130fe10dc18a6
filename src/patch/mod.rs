// Structural patch engine for nested device data

use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;


/// Separator between segments of a dotted patch key (`"a.b.c"`)
pub const PATH_SEPARATOR: char = '.';

/// Why a single sub-path of a patch could not be applied
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatchFailure {
    /// Intermediate field named by a dotted key does not exist
    #[error("missing field")]
    MissingField,
    /// Intermediate value exists but is a scalar
    #[error("parent is not an object or array")]
    NotStructured,
    /// A sequence patch targets a field that exists but is not an array
    #[error("existing value is not an array")]
    NotAnArray,
    /// Path segment into an array is not a number
    #[error("'{0}' is not an array index")]
    InvalidIndex(String),
    /// Positional element has no counterpart in the existing array
    #[error("index {0} is out of range")]
    IndexOutOfRange(usize),
}

/// A sub-path that failed, dot-joined from the patch root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedPath {
    pub path: String,
    pub reason: PatchFailure,
}

impl fmt::Display for FailedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "<root>: {}", self.reason)
        } else {
            write!(f, "{}: {}", self.path, self.reason)
        }
    }
}

/// Result of overlaying a patch
///
/// Successful sub-paths stay applied even when others fail; there is no
/// rollback. `failed` lists every sub-path that was rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatchOutcome {
    failed: Vec<FailedPath>,
}

impl PatchOutcome {
    /// True when every key and element of the patch was applied
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn failed(&self) -> &[FailedPath] {
        &self.failed
    }

    pub fn failed_paths(&self) -> Vec<&str> {
        self.failed.iter().map(|f| f.path.as_str()).collect()
    }

    fn fail(&mut self, path: String, reason: PatchFailure) {
        self.failed.push(FailedPath { path, reason });
    }
}

/// Overlay `patch` onto `target` in place.
///
/// Keys are plain field names or dotted paths. A dotted key walks existing
/// objects (and arrays, by numeric segment) and never creates intermediate
/// structure. A plain key replaces the field wholesale, except when both the
/// existing field and the patch value are arrays: then the patch is applied
/// positionally, merging objects element by element and leaving trailing
/// elements untouched.
///
/// # Examples
///
/// ```
/// use panel_bridge::patch::apply_patch;
/// use serde_json::json;
///
/// let mut data = json!({"a": {"b": 2, "c": 3}});
/// let patch = json!({"a.b": 1});
/// let outcome = apply_patch(&mut data, patch.as_object().unwrap());
///
/// assert!(outcome.is_complete());
/// assert_eq!(data, json!({"a": {"b": 1, "c": 3}}));
/// ```
pub fn apply_patch(target: &mut Value, patch: &Map<String, Value>) -> PatchOutcome {
    let mut outcome = PatchOutcome::default();
    match target {
        Value::Object(fields) => patch_fields(fields, patch, "", &mut outcome),
        _ => outcome.fail(String::new(), PatchFailure::NotStructured),
    }
    outcome
}

/// Read the value at a dotted path, descending through objects and arrays
pub fn read_path<'a>(target: &'a Value, path: &str) -> Option<&'a Value> {
    path.split(PATH_SEPARATOR)
        .try_fold(target, |node, segment| match node {
            Value::Object(fields) => fields.get(segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        })
}

fn join(prefix: &str, segment: &str) -> String {
    if prefix.is_empty() {
        segment.to_string()
    } else {
        format!("{}{}{}", prefix, PATH_SEPARATOR, segment)
    }
}

fn patch_fields(
    target: &mut Map<String, Value>,
    patch: &Map<String, Value>,
    prefix: &str,
    outcome: &mut PatchOutcome,
) {
    for (key, value) in patch {
        patch_key(target, key, value, prefix, outcome);
    }
}

fn patch_key(
    target: &mut Map<String, Value>,
    key: &str,
    value: &Value,
    prefix: &str,
    outcome: &mut PatchOutcome,
) {
    match key.split_once(PATH_SEPARATOR) {
        Some((head, rest)) => {
            let here = join(prefix, head);
            match target.get_mut(head) {
                Some(child) => descend(child, rest, value, &here, outcome),
                None => outcome.fail(here, PatchFailure::MissingField),
            }
        }
        None => assign_field(target, key, value, &join(prefix, key), outcome),
    }
}

fn descend(node: &mut Value, key: &str, value: &Value, here: &str, outcome: &mut PatchOutcome) {
    match node {
        Value::Object(fields) => patch_key(fields, key, value, here, outcome),
        Value::Array(items) => patch_index(items, key, value, here, outcome),
        _ => outcome.fail(here.to_string(), PatchFailure::NotStructured),
    }
}

fn patch_index(
    items: &mut [Value],
    key: &str,
    value: &Value,
    prefix: &str,
    outcome: &mut PatchOutcome,
) {
    let (segment, rest) = match key.split_once(PATH_SEPARATOR) {
        Some((segment, rest)) => (segment, Some(rest)),
        None => (key, None),
    };
    let here = join(prefix, segment);

    let index = match segment.parse::<usize>() {
        Ok(index) => index,
        Err(_) => return outcome.fail(here, PatchFailure::InvalidIndex(segment.to_string())),
    };

    match (items.get_mut(index), rest) {
        (Some(slot), Some(rest)) => descend(slot, rest, value, &here, outcome),
        (Some(slot), None) => overlay(slot, value, &here, outcome),
        (None, _) => outcome.fail(here, PatchFailure::IndexOutOfRange(index)),
    }
}

fn assign_field(
    target: &mut Map<String, Value>,
    key: &str,
    value: &Value,
    here: &str,
    outcome: &mut PatchOutcome,
) {
    if let Value::Array(values) = value {
        match target.get_mut(key) {
            Some(Value::Array(existing)) => return patch_array(existing, values, here, outcome),
            Some(Value::Null) | None => {}
            Some(_) => return outcome.fail(here.to_string(), PatchFailure::NotAnArray),
        }
    }
    target.insert(key.to_string(), value.clone());
}

fn patch_array(existing: &mut [Value], values: &[Value], prefix: &str, outcome: &mut PatchOutcome) {
    for (index, value) in values.iter().enumerate() {
        let here = join(prefix, &index.to_string());
        match existing.get_mut(index) {
            Some(slot) => overlay(slot, value, &here, outcome),
            None => outcome.fail(here, PatchFailure::IndexOutOfRange(index)),
        }
    }
}

/// Positional element update: structured onto structured recurses,
/// anything else replaces the element.
fn overlay(slot: &mut Value, value: &Value, here: &str, outcome: &mut PatchOutcome) {
    match (slot, value) {
        (Value::Object(target), Value::Object(fields)) => patch_fields(target, fields, here, outcome),
        (Value::Array(target), Value::Array(values)) => patch_array(target, values, here, outcome),
        (slot, value) => *slot = value.clone(),
    }
}
