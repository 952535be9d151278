use serde_json::Value;
use std::collections::BTreeMap;

/// A single query-string value after bracket notation has been folded in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryValue {
    Text(String),
    List(Vec<String>),
    Map(BTreeMap<String, QueryValue>),
}

impl QueryValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            QueryValue::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            QueryValue::Text(text) => Value::String(text.clone()),
            QueryValue::List(items) => {
                Value::Array(items.iter().cloned().map(Value::String).collect())
            }
            QueryValue::Map(map) => Value::Object(
                map.iter()
                    .map(|(key, value)| (key.clone(), value.to_json()))
                    .collect(),
            ),
        }
    }

    fn push(&mut self, text: String) {
        match self {
            QueryValue::Text(existing) => {
                *self = QueryValue::List(vec![std::mem::take(existing), text]);
            }
            QueryValue::List(items) => items.push(text),
            QueryValue::Map(_) => *self = QueryValue::Text(text),
        }
    }
}

/// Raw, untrusted request parameters keyed by top-level name.
///
/// Built from decoded `key=value` pairs. `averageCost[lte]=100` becomes
/// `averageCost -> {lte: "100"}`. A repeated top-level key keeps its last
/// value; a repeated nested key (or one ending in `[]`) collects a list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryRequest {
    params: BTreeMap<String, QueryValue>,
}

impl QueryRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut request = Self::new();
        for (key, value) in pairs {
            request.insert_raw(key.as_ref(), value.into());
        }
        request
    }

    pub fn get(&self, key: &str) -> Option<&QueryValue> {
        self.params.get(key)
    }

    /// Text value of a parameter; nested or list values read as absent.
    pub fn text(&self, key: &str) -> Option<&str> {
        self.params.get(key).and_then(QueryValue::as_text)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.params.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.params.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &QueryValue)> {
        self.params.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Copy of this request without the given keys.
    pub fn without(&self, keys: &[&str]) -> Self {
        Self {
            params: self
                .params
                .iter()
                .filter(|(key, _)| !keys.contains(&key.as_str()))
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
        }
    }

    fn insert_raw(&mut self, raw_key: &str, value: String) {
        let (root, path) = split_brackets(raw_key);
        if root.is_empty() {
            return;
        }

        if path.is_empty() {
            self.params.insert(root.to_string(), QueryValue::Text(value));
            return;
        }

        let slot = self
            .params
            .entry(root.to_string())
            .or_insert_with(|| QueryValue::Map(BTreeMap::new()));
        insert_nested(slot, &path, value);
    }
}

fn insert_nested(slot: &mut QueryValue, path: &[&str], value: String) {
    let Some((head, rest)) = path.split_first() else {
        slot.push(value);
        return;
    };

    if head.is_empty() {
        match slot {
            QueryValue::List(items) => items.push(value),
            QueryValue::Text(existing) => {
                *slot = QueryValue::List(vec![std::mem::take(existing), value]);
            }
            QueryValue::Map(map) if map.is_empty() => *slot = QueryValue::List(vec![value]),
            QueryValue::Map(_) => {}
        }
        return;
    }

    if !matches!(slot, QueryValue::Map(_)) {
        *slot = QueryValue::Map(BTreeMap::new());
    }
    let QueryValue::Map(map) = slot else {
        return;
    };

    match map.get_mut(*head) {
        Some(child) => insert_nested(child, rest, value),
        None if rest.is_empty() => {
            map.insert(head.to_string(), QueryValue::Text(value));
        }
        None if rest == [""] => {
            map.insert(head.to_string(), QueryValue::List(vec![value]));
        }
        None => {
            let mut child = QueryValue::Map(BTreeMap::new());
            insert_nested(&mut child, rest, value);
            map.insert(head.to_string(), child);
        }
    }
}

/// `a[b][c]` -> (`a`, [`b`, `c`]). Unbalanced brackets keep the raw key.
fn split_brackets(raw: &str) -> (&str, Vec<&str>) {
    let Some(open) = raw.find('[') else {
        return (raw, Vec::new());
    };
    if open == 0 || !raw.ends_with(']') {
        return (raw, Vec::new());
    }

    let root = &raw[..open];
    let mut path = Vec::new();
    let mut rest = &raw[open..];
    while let Some(stripped) = rest.strip_prefix('[') {
        let Some(close) = stripped.find(']') else {
            return (raw, Vec::new());
        };
        path.push(&stripped[..close]);
        rest = &stripped[close + 1..];
    }

    if rest.is_empty() {
        (root, path)
    } else {
        (raw, Vec::new())
    }
}
