use serde_json::Value;
use std::cmp::Ordering;

use crate::model::{CompareOp, Condition, Document, Filter, SortKey};

/// Evaluates filters and sort keys against documents held in memory.
pub struct DocumentFilterEvaluator;

impl DocumentFilterEvaluator {
    pub fn matches(document: &Document, filter: &Filter) -> bool {
        filter
            .iter()
            .all(|(field, condition)| Self::evaluate_condition(lookup(document, field), condition))
    }

    fn evaluate_condition(value: Option<&Value>, condition: &Condition) -> bool {
        let Some(value) = value else {
            return false;
        };

        match condition {
            Condition::Equals(expected) => {
                loose_eq(value, expected) || any_element(value, |item| loose_eq(item, expected))
            }
            Condition::Compare(ops) => ops
                .iter()
                .all(|(op, operand)| Self::evaluate_comparison(value, *op, operand)),
            Condition::Prefix(prefix) => {
                let check = |item: &Value| match item {
                    Value::String(s) => s.to_lowercase().starts_with(prefix.as_str()),
                    _ => false,
                };
                check(value) || any_element(value, check)
            }
            Condition::Within(sphere) => point_of(value)
                .map(|[longitude, latitude]| sphere.contains(longitude, latitude))
                .unwrap_or(false),
        }
    }

    fn evaluate_comparison(value: &Value, op: CompareOp, operand: &Value) -> bool {
        let check = |item: &Value| match op {
            CompareOp::In => match operand {
                Value::Array(candidates) => candidates.iter().any(|c| loose_eq(item, c)),
                single => loose_eq(item, single),
            },
            CompareOp::Gt => compare_loose(item, operand) == Some(Ordering::Greater),
            CompareOp::Gte => matches!(
                compare_loose(item, operand),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            CompareOp::Lt => compare_loose(item, operand) == Some(Ordering::Less),
            CompareOp::Lte => matches!(
                compare_loose(item, operand),
                Some(Ordering::Less | Ordering::Equal)
            ),
        };
        check(value) || any_element(value, check)
    }

    /// Order two documents by the given keys, first key first.
    pub fn compare_documents(a: &Document, b: &Document, keys: &[SortKey]) -> Ordering {
        for key in keys {
            let ordering = sort_order(lookup(a, &key.field), lookup(b, &key.field));
            let ordering = if key.descending { ordering.reverse() } else { ordering };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }
}

/// Resolve a dotted path such as `location.city`.
pub fn lookup<'a>(document: &'a Document, path: &str) -> Option<&'a Value> {
    let mut parts = path.split('.');
    let mut current = document.get(parts.next()?)?;
    for part in parts {
        current = current.as_object()?.get(part)?;
    }
    Some(current)
}

/// `[longitude, latitude]` of a GeoJSON point value.
fn point_of(value: &Value) -> Option<[f64; 2]> {
    let coordinates = value.get("coordinates")?.as_array()?;
    match coordinates.as_slice() {
        [longitude, latitude] => Some([longitude.as_f64()?, latitude.as_f64()?]),
        _ => None,
    }
}

fn any_element(value: &Value, check: impl Fn(&Value) -> bool) -> bool {
    match value {
        Value::Array(items) => items.iter().any(check),
        _ => false,
    }
}

/// Equality tolerant of query values arriving as text.
fn loose_eq(stored: &Value, expected: &Value) -> bool {
    match (stored, expected) {
        (Value::Number(n), Value::String(s)) => match (n.as_f64(), s.trim().parse::<f64>()) {
            (Some(a), Ok(b)) => a == b,
            _ => false,
        },
        (Value::Bool(b), Value::String(s)) => s.parse::<bool>().map(|p| p == *b).unwrap_or(false),
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        _ => stored == expected,
    }
}

/// Numeric when both sides read as numbers, lexicographic for two strings,
/// otherwise not comparable.
fn compare_loose(stored: &Value, operand: &Value) -> Option<Ordering> {
    match (as_number(stored), as_number(operand)) {
        (Some(a), Some(b)) => a.partial_cmp(&b),
        _ => match (stored, operand) {
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            _ => None,
        },
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

fn type_rank(value: Option<&Value>) -> u8 {
    match value {
        None | Some(Value::Null) => 0,
        Some(Value::Number(_)) => 1,
        Some(Value::String(_)) => 2,
        Some(Value::Object(_)) => 3,
        Some(Value::Array(_)) => 4,
        Some(Value::Bool(_)) => 5,
    }
}

/// Total order across JSON types: missing/null, numbers, strings, objects,
/// arrays, booleans.
fn sort_order(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(Value::Array(x)), Some(Value::Array(y))) => {
            for (left, right) in x.iter().zip(y.iter()) {
                let ordering = sort_order(Some(left), Some(right));
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            x.len().cmp(&y.len())
        }
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}
