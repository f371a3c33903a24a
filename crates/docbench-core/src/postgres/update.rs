//! Logical update operators applied to a JSONB payload.
//!
//! The relational backend rewrites payloads document-by-document inside a
//! row-locked transaction (see [`super::PostgresAdapter`]); this module holds
//! the pure operator application shared by `update_one` and `update_many`.

use serde_json::Value;

use crate::document::{Document, UpdateSpec};
use crate::error::AdapterError;
use crate::normalize::strip_reserved;
use crate::Result;

const UPDATE_OPERATORS: [&str; 3] = ["$set", "$push", "$pull"];

/// True when the update document uses operator syntax.
fn has_operators(update: &UpdateSpec) -> bool {
    UPDATE_OPERATORS.iter().any(|op| update.contains_key(*op))
}

fn operand_object<'a>(op: &str, operand: &'a Value) -> Result<&'a Document> {
    operand.as_object().ok_or_else(|| {
        AdapterError::Translation(format!("{} requires an object operand", op))
    })
}

/// Apply a logical update to a payload, in place.
///
/// `$set` merges top-level keys; `$push` appends to an array field, creating
/// it when absent; `$pull` removes array elements deep-equal to the operand.
/// An update without any operator merges wholesale, as a direct `$set`.
/// Reserved identity/timestamp keys are stripped afterwards so they never
/// enter the stored payload.
pub fn apply_update(payload: &mut Document, update: &UpdateSpec) -> Result<()> {
    if !has_operators(update) {
        for (field, value) in update {
            payload.insert(field.clone(), value.clone());
        }
        strip_reserved(payload);
        return Ok(());
    }

    for (op, operand) in update {
        match op.as_str() {
            "$set" => {
                for (field, value) in operand_object(op, operand)? {
                    payload.insert(field.clone(), value.clone());
                }
            }
            "$push" => {
                for (field, value) in operand_object(op, operand)? {
                    match payload.get_mut(field) {
                        Some(Value::Array(items)) => items.push(value.clone()),
                        Some(_) => {
                            return Err(AdapterError::Translation(format!(
                                "cannot $push to non-array field '{}'",
                                field
                            )))
                        }
                        None => {
                            payload
                                .insert(field.clone(), Value::Array(vec![value.clone()]));
                        }
                    }
                }
            }
            "$pull" => {
                for (field, value) in operand_object(op, operand)? {
                    if let Some(Value::Array(items)) = payload.get_mut(field) {
                        items.retain(|item| item != value);
                    }
                }
            }
            other => {
                return Err(AdapterError::Translation(format!(
                    "unsupported update operator '{}'",
                    other
                )))
            }
        }
    }

    strip_reserved(payload);
    Ok(())
}
