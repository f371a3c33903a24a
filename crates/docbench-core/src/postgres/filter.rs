//! Logical filter to SQL translation.
//!
//! Compiles a Mongo-style filter into a parameterized predicate over the
//! default table layout (`id` column + `data` JSONB payload). Every value
//! travels as a bind parameter; nothing caller-supplied is interpolated into
//! the SQL text except payload field names, which are quoted as JSON path
//! literals with embedded quotes doubled.

use serde_json::{Map, Value};

use crate::document::{Filter, QueryOptions, SortDirection};
use crate::error::AdapterError;
use crate::normalize::ID_FIELD;
use crate::Result;

/// A typed bind value for the translated query.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Json(Value),
}

/// Quote a payload field name as a SQL string literal for a JSON path.
fn quote_json_key(field: &str) -> String {
    format!("'{}'", field.replace('\'', "''"))
}

/// Single-field JSON object used as a containment operand.
fn containment(field: &str, value: &Value) -> Value {
    let mut object = Map::new();
    object.insert(field.to_string(), value.clone());
    Value::Object(object)
}

/// Next placeholder for the accumulated parameter list.
fn placeholder(params: &[SqlParam]) -> String {
    format!("${}", params.len() + 1)
}

/// Convert an identity value into its bind parameter.
///
/// The relational identity is a synthetic integer; a numeric string (an id
/// that round-tripped through JSON) is accepted too.
pub fn id_param(value: &Value) -> Result<SqlParam> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .map(SqlParam::Int)
            .ok_or_else(|| AdapterError::Translation(format!("invalid identity value {}", n))),
        Value::String(s) => s
            .parse::<i64>()
            .map(SqlParam::Int)
            .map_err(|_| AdapterError::Translation(format!("invalid identity value '{}'", s))),
        other => Err(AdapterError::Translation(format!(
            "invalid identity value {}",
            other
        ))),
    }
}

/// Scalar comparison operand for a range operator.
fn range_param(value: &Value) -> SqlParam {
    match value {
        Value::Number(n) => match n.as_i64() {
            Some(i) => SqlParam::Int(i),
            None => SqlParam::Float(n.as_f64().unwrap_or(f64::NAN)),
        },
        // Non-numeric operands are passed through; whether the cast succeeds
        // is backend-defined (documented limitation).
        Value::String(s) => SqlParam::Text(s.clone()),
        Value::Bool(b) => SqlParam::Bool(*b),
        other => SqlParam::Text(other.to_string()),
    }
}

/// Text form of a `$in` member, matching `data->>'field'` extraction.
fn in_member_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// True when the condition is an operator mapping rather than a literal.
fn is_operator_map(condition: &Value) -> Option<&Map<String, Value>> {
    match condition {
        Value::Object(map) if map.keys().any(|k| k.starts_with('$')) => Some(map),
        _ => None,
    }
}

/// Compile conditions on the identity column.
fn compile_id_condition(
    condition: &Value,
    conditions: &mut Vec<String>,
    params: &mut Vec<SqlParam>,
) -> Result<()> {
    let Some(operators) = is_operator_map(condition) else {
        conditions.push(format!("id = {}", placeholder(params)));
        params.push(id_param(condition)?);
        return Ok(());
    };

    for (op, operand) in operators {
        match op.as_str() {
            "$eq" => {
                conditions.push(format!("id = {}", placeholder(params)));
                params.push(id_param(operand)?);
            }
            "$gt" | "$gte" | "$lt" | "$lte" => {
                conditions.push(format!("id {} {}", sql_comparison(op), placeholder(params)));
                params.push(id_param(operand)?);
            }
            "$in" => match operand {
                Value::Array(values) if values.is_empty() => conditions.push("FALSE".to_string()),
                Value::Array(values) => {
                    let mut placeholders = Vec::with_capacity(values.len());
                    for value in values {
                        placeholders.push(placeholder(params));
                        params.push(id_param(value)?);
                    }
                    conditions.push(format!("id IN ({})", placeholders.join(", ")));
                }
                other => {
                    tracing::warn!(operand = %other, "ignoring $in on _id with non-array operand");
                }
            },
            other => {
                return Err(AdapterError::Translation(format!(
                    "unsupported operator '{}' on {}",
                    other, ID_FIELD
                )))
            }
        }
    }
    Ok(())
}

fn sql_comparison(op: &str) -> &'static str {
    match op {
        "$gt" => ">",
        "$gte" => ">=",
        "$lt" => "<",
        "$lte" => "<=",
        _ => unreachable!("caller matched the operator"),
    }
}

/// Compile an operator mapping on a payload field.
fn compile_operators(
    field: &str,
    operators: &Map<String, Value>,
    conditions: &mut Vec<String>,
    params: &mut Vec<SqlParam>,
) -> Result<()> {
    for (op, operand) in operators {
        match op.as_str() {
            "$eq" => {
                conditions.push(format!("data @> {}::jsonb", placeholder(params)));
                params.push(SqlParam::Json(containment(field, operand)));
            }
            "$gt" | "$gte" | "$lt" | "$lte" => {
                conditions.push(format!(
                    "(data->>{})::numeric {} {}",
                    quote_json_key(field),
                    sql_comparison(op),
                    placeholder(params)
                ));
                params.push(range_param(operand));
            }
            "$in" => match operand {
                Value::Array(values) if values.is_empty() => conditions.push("FALSE".to_string()),
                Value::Array(values) => {
                    let mut placeholders = Vec::with_capacity(values.len());
                    for value in values {
                        placeholders.push(placeholder(params));
                        params.push(SqlParam::Text(in_member_text(value)));
                    }
                    conditions.push(format!(
                        "data->>{} IN ({})",
                        quote_json_key(field),
                        placeholders.join(", ")
                    ));
                }
                other => {
                    // Preserved source behavior: a non-array operand yields no
                    // predicate for this key, which widens the match.
                    tracing::warn!(
                        field,
                        operand = %other,
                        "ignoring $in with non-array operand; key contributes no predicate"
                    );
                }
            },
            other => {
                return Err(AdapterError::Translation(format!(
                    "unsupported operator '{}' on field '{}'",
                    other, field
                )))
            }
        }
    }
    Ok(())
}

/// Compile a logical filter into a `WHERE` clause.
///
/// Returns an empty string for an empty filter (match all). Bind parameters
/// are appended to `params`; placeholders continue from its current length.
pub fn where_clause(filter: &Filter, params: &mut Vec<SqlParam>) -> Result<String> {
    let mut conditions = Vec::new();

    for (field, condition) in filter {
        if field == ID_FIELD {
            compile_id_condition(condition, &mut conditions, params)?;
        } else if let Some(operators) = is_operator_map(condition) {
            compile_operators(field, operators, &mut conditions, params)?;
        } else {
            // Implicit equality compiles to JSONB containment so numeric and
            // boolean values keep their types.
            conditions.push(format!("data @> {}::jsonb", placeholder(params)));
            params.push(SqlParam::Json(containment(field, condition)));
        }
    }

    if conditions.is_empty() {
        Ok(String::new())
    } else {
        Ok(format!(" WHERE {}", conditions.join(" AND ")))
    }
}

/// Compile sort/limit/skip options into `ORDER BY`/`LIMIT`/`OFFSET` clauses.
pub fn options_clause(options: &QueryOptions, params: &mut Vec<SqlParam>) -> String {
    let mut clause = String::new();

    if !options.sort.is_empty() {
        let terms: Vec<String> = options
            .sort
            .iter()
            .map(|(field, direction)| {
                let expression = if field == ID_FIELD {
                    "id".to_string()
                } else {
                    format!("data->>{}", quote_json_key(field))
                };
                match direction {
                    SortDirection::Ascending => expression,
                    SortDirection::Descending => format!("{} DESC", expression),
                }
            })
            .collect();
        clause.push_str(&format!(" ORDER BY {}", terms.join(", ")));
    }

    if let Some(limit) = options.limit {
        clause.push_str(&format!(" LIMIT {}", placeholder(params)));
        params.push(SqlParam::Int(limit as i64));
    }

    if let Some(skip) = options.skip {
        clause.push_str(&format!(" OFFSET {}", placeholder(params)));
        params.push(SqlParam::Int(skip as i64));
    }

    clause
}
