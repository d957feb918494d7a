//! Course integrity checks and fingerprints.
//!
//! A client echoes the course it played back to the verifier. The verifier
//! regenerates the course from the seed and compares the two documents
//! structurally, reporting the first JSON pointer where they disagree.

use std::hash::Hasher;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use twox_hash::XxHash64;

/// The supplied course differs from the regenerated one.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("course differs at `{path}`: {detail}")]
pub struct CourseMismatch {
    /// JSON pointer to the first difference; empty for the document root.
    pub path: String,
    pub detail: String,
}

/// Compare supplied course text against the expected document.
///
/// # Errors
///
/// Returns [`CourseMismatch`] when the text is not JSON or any value differs.
pub fn check_integrity(expected: &Value, supplied: &str) -> Result<(), CourseMismatch> {
    let supplied: Value = serde_json::from_str(supplied).map_err(|err| CourseMismatch {
        path: String::new(),
        detail: format!("course is not valid JSON: {err}"),
    })?;
    match first_difference(expected, &supplied) {
        Some((path, detail)) => Err(CourseMismatch { path, detail }),
        None => Ok(()),
    }
}

/// Locate the first structural difference between two JSON documents.
///
/// Objects are walked in key order and arrays by index.
#[must_use]
pub fn first_difference(expected: &Value, supplied: &Value) -> Option<(String, String)> {
    let mut path = String::new();
    diff_at(expected, supplied, &mut path).map(|detail| (path, detail))
}

fn diff_at(expected: &Value, supplied: &Value, path: &mut String) -> Option<String> {
    match (expected, supplied) {
        (Value::Object(want), Value::Object(got)) => {
            let mut keys: Vec<&String> = want.keys().chain(got.keys()).collect();
            keys.sort_unstable();
            keys.dedup();
            for key in keys {
                let mark = path.len();
                push_token(path, key);
                match (want.get(key), got.get(key)) {
                    (Some(w), Some(g)) => {
                        if let Some(detail) = diff_at(w, g, path) {
                            return Some(detail);
                        }
                    }
                    (Some(_), None) => return Some("field missing".to_string()),
                    (None, _) => return Some("unexpected field".to_string()),
                }
                path.truncate(mark);
            }
            None
        }
        (Value::Array(want), Value::Array(got)) => {
            for (index, (w, g)) in want.iter().zip(got).enumerate() {
                let mark = path.len();
                push_token(path, &index.to_string());
                if let Some(detail) = diff_at(w, g, path) {
                    return Some(detail);
                }
                path.truncate(mark);
            }
            if want.len() == got.len() {
                None
            } else {
                Some(format!("expected {} entries, found {}", want.len(), got.len()))
            }
        }
        (want, got) if want == got => None,
        (want, got) => Some(format!("expected {want}, found {got}")),
    }
}

fn push_token(path: &mut String, token: &str) {
    path.push('/');
    for ch in token.chars() {
        match ch {
            '~' => path.push_str("~0"),
            '/' => path.push_str("~1"),
            other => path.push(other),
        }
    }
}

/// Stable 64-bit fingerprint of a course's canonical JSON encoding.
///
/// # Errors
///
/// Returns a serialization error if the course cannot be encoded.
pub fn fingerprint<C: Serialize>(course: &C) -> Result<u64, serde_json::Error> {
    let bytes = serde_json::to_vec(course)?;
    let mut hasher = XxHash64::with_seed(0);
    hasher.write(&bytes);
    Ok(hasher.finish())
}
