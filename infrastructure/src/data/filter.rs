//! Filter evaluation for the in-memory store.
//!
//! Supports field equality (arrays match when they contain the value),
//! dotted paths, and the operators `$eq $ne $gt $gte $lt $lte $in $nin`.

use std::cmp::Ordering;

use kowalski_application::{Document, StoreError};
use serde_json::Value;

/// Whether `doc` satisfies every condition in `filter`.
pub(crate) fn matches(doc: &Document, filter: &Document) -> Result<bool, StoreError> {
    for (field, condition) in filter {
        if field.starts_with('$') {
            return Err(StoreError::Query(format!(
                "unsupported top-level operator {}",
                field
            )));
        }
        let actual = lookup(doc, field);
        if !satisfies(actual, condition)? {
            return Ok(false);
        }
    }
    Ok(true)
}

fn lookup<'a>(doc: &'a Document, path: &str) -> Option<&'a Value> {
    let mut parts = path.split('.');
    let mut current = doc.get(parts.next()?)?;
    for part in parts {
        current = current.as_object()?.get(part)?;
    }
    Some(current)
}

fn is_operator_object(condition: &Value) -> bool {
    condition
        .as_object()
        .is_some_and(|o| !o.is_empty() && o.keys().all(|k| k.starts_with('$')))
}

fn satisfies(actual: Option<&Value>, condition: &Value) -> Result<bool, StoreError> {
    let Some(operators) = condition.as_object().filter(|_| is_operator_object(condition)) else {
        return Ok(equals(actual, condition));
    };

    for (op, operand) in operators {
        let ok = match op.as_str() {
            "$eq" => equals(actual, operand),
            "$ne" => !equals(actual, operand),
            "$gt" => compare(actual, operand) == Some(Ordering::Greater),
            "$gte" => matches!(
                compare(actual, operand),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            "$lt" => compare(actual, operand) == Some(Ordering::Less),
            "$lte" => matches!(
                compare(actual, operand),
                Some(Ordering::Less | Ordering::Equal)
            ),
            "$in" => in_list(actual, operand, op)?,
            "$nin" => !in_list(actual, operand, op)?,
            other => {
                return Err(StoreError::Query(format!("unsupported operator {}", other)));
            }
        };
        if !ok {
            return Ok(false);
        }
    }
    Ok(true)
}

fn equals(actual: Option<&Value>, expected: &Value) -> bool {
    match actual {
        None => expected.is_null(),
        Some(Value::Array(items)) if !expected.is_array() => {
            items.iter().any(|item| same(item, expected))
        }
        Some(value) => same(value, expected),
    }
}

/// Numbers compare by value, so `1` equals `1.0`.
fn same(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

fn compare(actual: Option<&Value>, operand: &Value) -> Option<Ordering> {
    match (actual?, operand) {
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

fn in_list(actual: Option<&Value>, operand: &Value, op: &str) -> Result<bool, StoreError> {
    let candidates = operand
        .as_array()
        .ok_or_else(|| StoreError::Query(format!("{} needs an array", op)))?;
    Ok(candidates.iter().any(|c| equals(actual, c)))
}
