//! In-process metadata filter evaluation for local vector indexes.
//!
//! Filters are JSON documents of field predicates. A bare scalar is an
//! equality test; an object value holds comparison operators:
//!
//! ```json
//! { "tag": "x", "score": { "$gte": 10 } }
//! ```
//!
//! Supported operators: `$gt`, `$gte`, `$lt`, `$lte`, `$ne`. Anything else
//! is a `FilterUnsupported` error so a caller never receives silently
//! unfiltered results.

use serde_json::Value;

use crate::domain::errors::{StorageError, StorageResult};

/// Evaluate a filter document against record metadata.
pub fn matches_filter(backend: &'static str, metadata: &Value, filter: &Value) -> StorageResult<bool> {
    let Some(predicates) = filter.as_object() else {
        return Err(StorageError::FilterUnsupported {
            backend,
            detail: "filter must be a JSON object of field predicates".to_string(),
        });
    };

    for (field, expected) in predicates {
        let actual = metadata.get(field);
        match expected {
            Value::Object(ops) => {
                for (op, operand) in ops {
                    if !apply_operator(backend, op, actual, operand)? {
                        return Ok(false);
                    }
                }
            }
            // Bare value: equality, missing field never matches
            _ => {
                if actual != Some(expected) {
                    return Ok(false);
                }
            }
        }
    }

    Ok(true)
}

fn apply_operator(
    backend: &'static str,
    op: &str,
    actual: Option<&Value>,
    operand: &Value,
) -> StorageResult<bool> {
    match op {
        "$ne" => Ok(actual != Some(operand)),
        "$gt" | "$gte" | "$lt" | "$lte" => {
            let (Some(a), Some(b)) = (actual.and_then(Value::as_f64), operand.as_f64()) else {
                // Missing or non-numeric field fails the comparison
                return Ok(false);
            };
            Ok(match op {
                "$gt" => a > b,
                "$gte" => a >= b,
                "$lt" => a < b,
                _ => a <= b,
            })
        }
        other => Err(StorageError::FilterUnsupported {
            backend,
            detail: format!("unsupported operator: {}", other),
        }),
    }
}
