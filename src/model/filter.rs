use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

use crate::model::{Document, Sphere, ID_FIELD};

/// Comparison tokens accepted inside a field's bracket map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CompareOp {
    Gt,
    Gte,
    Lt,
    Lte,
    In,
}

impl CompareOp {
    /// Exact, whole-token match only.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "gt" => Some(CompareOp::Gt),
            "gte" => Some(CompareOp::Gte),
            "lt" => Some(CompareOp::Lt),
            "lte" => Some(CompareOp::Lte),
            "in" => Some(CompareOp::In),
            _ => None,
        }
    }

    /// Operator-prefixed form understood by the store.
    pub fn operator(&self) -> &'static str {
        match self {
            CompareOp::Gt => "$gt",
            CompareOp::Gte => "$gte",
            CompareOp::Lt => "$lt",
            CompareOp::Lte => "$lte",
            CompareOp::In => "$in",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Literal equality. Against an array field, matches when any element is equal.
    Equals(Value),
    /// All comparisons must hold.
    Compare(Vec<(CompareOp, Value)>),
    /// Case-insensitive "starts with"; the prefix is stored lowercased.
    Prefix(String),
    /// GeoJSON point field lying inside the spherical cap.
    Within(Sphere),
}

/// Conjunction of per-field conditions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: BTreeMap<String, Condition>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, field: impl Into<String>, condition: Condition) -> Self {
        self.conditions.insert(field.into(), condition);
        self
    }

    pub fn eq(field: impl Into<String>, value: Value) -> Self {
        Self::new().with(field, Condition::Equals(value))
    }

    pub fn get(&self, field: &str) -> Option<&Condition> {
        self.conditions.get(field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Condition)> {
        self.conditions.iter().map(|(field, cond)| (field.as_str(), cond))
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }
}

impl Serialize for Filter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.conditions.len()))?;
        for (field, condition) in &self.conditions {
            match condition {
                Condition::Equals(value) => map.serialize_entry(field, value)?,
                Condition::Compare(ops) => {
                    let ops: Map<String, Value> = ops
                        .iter()
                        .map(|(op, value)| (op.operator().to_string(), value.clone()))
                        .collect();
                    map.serialize_entry(field, &ops)?;
                }
                Condition::Prefix(prefix) => {
                    let mut regex = Map::new();
                    regex.insert("$prefix".to_string(), Value::String(prefix.clone()));
                    regex.insert("$options".to_string(), Value::String("i".to_string()));
                    map.serialize_entry(field, &regex)?;
                }
                Condition::Within(sphere) => {
                    let within = serde_json::json!({
                        "$geoWithin": { "$centerSphere": [sphere.center, sphere.radius] }
                    });
                    map.serialize_entry(field, &within)?;
                }
            }
        }
        map.end()
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(self) {
            Ok(json) => f.write_str(&json),
            Err(_) => f.write_str("<unprintable filter>"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub field: String,
    pub descending: bool,
}

impl SortKey {
    pub fn asc(field: impl Into<String>) -> Self {
        Self { field: field.into(), descending: false }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self { field: field.into(), descending: true }
    }

    /// `-field` sorts descending, `field` or `+field` ascending.
    pub fn parse_list(raw: &str) -> Vec<SortKey> {
        raw.split(',')
            .map(str::trim)
            .filter_map(|part| {
                let (field, descending) = match part.strip_prefix('-') {
                    Some(field) => (field, true),
                    None => (part.strip_prefix('+').unwrap_or(part), false),
                };
                (!field.is_empty()).then(|| SortKey { field: field.to_string(), descending })
            })
            .collect()
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.descending {
            write!(f, "-{}", self.field)
        } else {
            f.write_str(&self.field)
        }
    }
}

/// Field selection applied to every returned document. `_id` is always kept
/// by an inclusion projection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Projection {
    Include(Vec<String>),
    Exclude(Vec<String>),
}

impl Projection {
    /// `a,b` includes, `-a,-b` excludes. Mixed lists include the plain fields.
    pub fn parse(raw: &str) -> Option<Self> {
        let parts: Vec<&str> = raw.split(',').map(str::trim).filter(|p| !p.is_empty()).collect();
        if parts.is_empty() {
            return None;
        }

        if parts.iter().all(|p| p.starts_with('-')) {
            let fields: Vec<String> = parts
                .iter()
                .map(|p| p.trim_start_matches('-').to_string())
                .filter(|p| !p.is_empty())
                .collect();
            return (!fields.is_empty()).then_some(Projection::Exclude(fields));
        }

        Some(Projection::Include(
            parts
                .iter()
                .filter(|p| !p.starts_with('-'))
                .map(|p| p.trim_start_matches('+').to_string())
                .collect(),
        ))
    }

    pub fn include<I, T>(fields: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Projection::Include(fields.into_iter().map(Into::into).collect())
    }

    pub fn apply(&self, document: &Document) -> Document {
        match self {
            Projection::Include(fields) => document
                .iter()
                .filter(|(key, _)| key.as_str() == ID_FIELD || fields.iter().any(|f| f == *key))
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
            Projection::Exclude(fields) => document
                .iter()
                .filter(|(key, _)| !fields.iter().any(|f| f == *key))
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
        }
    }
}

/// Describes how to inline related documents into a result.
///
/// A forward relation replaces the id stored at `local_field` with the
/// referenced document. A virtual relation (`many`) collects every document
/// of `collection` whose `foreign_field` equals this document's `local_field`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Relation {
    pub path: &'static str,
    pub collection: &'static str,
    pub local_field: &'static str,
    pub foreign_field: &'static str,
    pub select: &'static [&'static str],
    pub many: bool,
}

impl Relation {
    pub const fn reference(path: &'static str, collection: &'static str, select: &'static [&'static str]) -> Self {
        Self {
            path,
            collection,
            local_field: path,
            foreign_field: ID_FIELD,
            select,
            many: false,
        }
    }

    pub const fn virtual_many(path: &'static str, collection: &'static str, foreign_field: &'static str) -> Self {
        Self {
            path,
            collection,
            local_field: ID_FIELD,
            foreign_field,
            select: &[],
            many: true,
        }
    }

    pub fn projection(&self) -> Option<Projection> {
        (!self.select.is_empty()).then(|| Projection::include(self.select.iter().copied()))
    }
}

/// Immutable description of a read. Every builder step returns a new value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindQuery {
    pub filter: Filter,
    pub projection: Option<Projection>,
    pub sort: Vec<SortKey>,
    pub skip: u64,
    pub limit: Option<u64>,
    pub populate: Vec<Relation>,
}

impl FindQuery {
    pub fn new(filter: Filter) -> Self {
        Self { filter, ..Self::default() }
    }

    #[must_use]
    pub fn select(self, projection: Option<Projection>) -> Self {
        Self { projection, ..self }
    }

    #[must_use]
    pub fn sort(self, sort: Vec<SortKey>) -> Self {
        Self { sort, ..self }
    }

    #[must_use]
    pub fn skip(self, skip: u64) -> Self {
        Self { skip, ..self }
    }

    #[must_use]
    pub fn limit(self, limit: u64) -> Self {
        Self { limit: Some(limit), ..self }
    }

    #[must_use]
    pub fn populate(self, populate: Vec<Relation>) -> Self {
        Self { populate, ..self }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_operator_tokens_are_exact() {
        assert_eq!(CompareOp::from_token("gte"), Some(CompareOp::Gte));
        assert_eq!(CompareOp::from_token("in"), Some(CompareOp::In));
        assert_eq!(CompareOp::from_token("ingredient"), None);
        assert_eq!(CompareOp::from_token("GT"), None);
        assert_eq!(CompareOp::from_token("$gt"), None);
    }

    #[test]
    fn test_filter_serializes_operator_form() {
        let filter = Filter::new()
            .with("averageCost", Condition::Compare(vec![(CompareOp::Lte, json!("10000"))]))
            .with("housing", Condition::Equals(json!("true")))
            .with("name", Condition::Prefix("dev".to_string()));

        assert_eq!(
            serde_json::to_value(&filter).unwrap(),
            json!({
                "averageCost": {"$lte": "10000"},
                "housing": "true",
                "name": {"$prefix": "dev", "$options": "i"}
            })
        );
    }

    #[test]
    fn test_within_serializes_center_sphere() {
        let sphere = Sphere { center: [-71.1, 42.35], radius: 0.5 };
        let filter = Filter::new().with("location", Condition::Within(sphere));

        assert_eq!(
            serde_json::to_value(&filter).unwrap(),
            json!({"location": {"$geoWithin": {"$centerSphere": [[-71.1, 42.35], 0.5]}}})
        );
    }

    #[test]
    fn test_sort_parse() {
        let keys = SortKey::parse_list("name,-averageCost, ,+createdAt");
        assert_eq!(
            keys,
            vec![SortKey::asc("name"), SortKey::desc("averageCost"), SortKey::asc("createdAt")]
        );
        assert!(SortKey::parse_list("").is_empty());
        assert_eq!(keys[1].to_string(), "-averageCost");
    }

    #[test]
    fn test_projection_include_keeps_id() {
        let doc = json!({"_id": "1", "name": "A", "description": "B", "housing": true});
        let doc = doc.as_object().unwrap();

        let projected = Projection::parse("name,housing").unwrap().apply(doc);
        assert_eq!(Value::Object(projected), json!({"_id": "1", "name": "A", "housing": true}));
    }

    #[test]
    fn test_projection_exclude() {
        let doc = json!({"_id": "1", "name": "A", "description": "B"});
        let doc = doc.as_object().unwrap();

        let projected = Projection::parse("-description").unwrap().apply(doc);
        assert_eq!(Value::Object(projected), json!({"_id": "1", "name": "A"}));
    }

    #[test]
    fn test_projection_empty_is_none() {
        assert_eq!(Projection::parse(""), None);
        assert_eq!(Projection::parse(" , "), None);
        assert_eq!(Projection::parse("-"), None);
    }

    #[test]
    fn test_find_query_builder_returns_new_values() {
        let base = FindQuery::new(Filter::eq("housing", json!("true")));
        let paged = base.clone().skip(10).limit(5);

        assert_eq!(base.skip, 0);
        assert_eq!(base.limit, None);
        assert_eq!(paged.skip, 10);
        assert_eq!(paged.limit, Some(5));
        assert_eq!(paged.filter, base.filter);
    }
}
