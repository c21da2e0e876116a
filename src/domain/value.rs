//! Configuration values
//!
//! Settings stored in the configuration registry are arbitrary nested trees.
//! `Value` keeps them typed enough to merge and inspect, and round-trips
//! through serde so settings can come straight from TOML files.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Mapping of setting name to value. Keys iterate in sorted order.
pub type Map = BTreeMap<String, Value>;

/// A dynamically typed configuration value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    List(Vec<Value>),
    Map(Map),
}

impl Value {
    /// Empty map value.
    pub fn map() -> Self {
        Value::Map(Map::new())
    }

    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_map_mut(&mut self) -> Option<&mut Map> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Float view; integers widen.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Child of a map value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_map().and_then(|map| map.get(key))
    }

    /// Walk a dotted path through nested maps, e.g. `"db.pool.size"`.
    pub fn lookup(&self, path: &str) -> Option<&Value> {
        path.split('.').try_fold(self, |current, key| current.get(key))
    }

    /// Short name of the variant, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Map(_) => "map",
        }
    }
}

/// Build a [`Map`] from key/value pairs.
pub fn settings<I, K, V>(entries: I) -> Map
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Value>,
{
    entries
        .into_iter()
        .map(|(key, value)| (key.into(), value.into()))
        .collect()
}

/// Merge `defaults` beneath `existing`.
///
/// Existing values win on conflict. When both sides hold a map under the
/// same key the merge recurses; any other pairing keeps the existing value
/// and discards the default. Defaults for keys the existing settings lack
/// are adopted wholesale, nested maps included. Lists are leaves.
pub fn merge_recessive(defaults: Map, existing: Map) -> Map {
    let mut merged = defaults;
    for (key, value) in existing {
        let combined = match (merged.remove(&key), value) {
            (Some(Value::Map(default_map)), Value::Map(existing_map)) => {
                Value::Map(merge_recessive(default_map, existing_map))
            }
            (_, value) => value,
        };
        merged.insert(key, combined);
    }
    merged
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Integer(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<Map> for Value {
    fn from(map: Map) -> Self {
        Value::Map(map)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Value {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Value::Map(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map_of(value: Value) -> Map {
        match value {
            Value::Map(map) => map,
            other => panic!("expected map, got {}", other.type_name()),
        }
    }

    #[test]
    fn given_nested_defaults_when_merging_then_existing_leaves_win() {
        let existing = map_of(Value::from_iter([("a", Value::from_iter([("x", 1)]))]));
        let defaults = map_of(Value::from_iter([
            ("a", Value::from_iter([("x", 2), ("y", 3)])),
            ("b", Value::from(4)),
        ]));

        let merged = merge_recessive(defaults, existing);

        let expected = map_of(Value::from_iter([
            ("a", Value::from_iter([("x", 1), ("y", 3)])),
            ("b", Value::from(4)),
        ]));
        assert_eq!(merged, expected);
    }

    #[test]
    fn given_same_defaults_twice_when_merging_then_result_is_stable() {
        let existing = map_of(Value::from_iter([("port", 8080)]));
        let defaults = map_of(Value::from_iter([("port", 80), ("host", 1)]));

        let once = merge_recessive(defaults.clone(), existing);
        let twice = merge_recessive(defaults, once.clone());

        assert_eq!(once, twice);
    }

    #[test]
    fn given_list_values_when_merging_then_existing_list_replaces_default() {
        let existing = map_of(Value::from_iter([(
            "hosts",
            Value::List(vec!["a".into()]),
        )]));
        let defaults = map_of(Value::from_iter([(
            "hosts",
            Value::List(vec!["x".into(), "y".into()]),
        )]));

        let merged = merge_recessive(defaults, existing);

        assert_eq!(merged["hosts"], Value::List(vec!["a".into()]));
    }

    #[test]
    fn given_scalar_existing_over_map_default_when_merging_then_scalar_wins() {
        let existing = map_of(Value::from_iter([("db", "sqlite")]));
        let defaults = map_of(Value::from_iter([(
            "db",
            Value::from_iter([("pool", 4)]),
        )]));

        let merged = merge_recessive(defaults, existing);

        assert_eq!(merged["db"], Value::from("sqlite"));
    }

    #[test]
    fn given_keys_only_in_existing_when_merging_then_they_are_kept() {
        let existing = map_of(Value::from_iter([("custom", true)]));
        let merged = merge_recessive(Map::new(), existing);
        assert_eq!(merged["custom"], Value::Bool(true));
    }

    #[test]
    fn given_toml_document_when_deserializing_then_builds_nested_value() {
        let value: Value = toml::from_str(
            r#"
name = "svc"
ratio = 0.5
[limits]
max = 10
tags = ["a", "b"]
"#,
        )
        .expect("parse toml");

        assert_eq!(value.lookup("limits.max").and_then(Value::as_i64), Some(10));
        assert_eq!(value.get("name").and_then(Value::as_str), Some("svc"));
        assert_eq!(value.get("ratio").and_then(Value::as_f64), Some(0.5));
        assert_eq!(
            value.lookup("limits.tags").and_then(Value::as_list).map(<[Value]>::len),
            Some(2)
        );
    }

    #[test]
    fn given_missing_path_when_lookup_then_none() {
        let value = Value::from_iter([("a", Value::from_iter([("b", 1)]))]);
        assert!(value.lookup("a.c").is_none());
        assert!(value.lookup("a.b.c").is_none());
    }
}
