//! The ordered result namespace.
//!
//! Only keys an action actually assigned are populated, so "never
//! supplied" stays distinguishable from "supplied the default value".

use indexmap::IndexMap;
use serde::Serialize;

/// A parsed argument value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Str(String),
    List(Vec<Value>),
}

impl Value {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

/// Key/value results of one parse, in assignment order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Namespace {
    #[serde(flatten)]
    values: IndexMap<String, Value>,
}

impl Namespace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Whether the key was assigned at all during the parse.
    pub fn is_set(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.values.insert(key.into(), value);
    }

    /// Extend the list stored under `key`, creating it if unset.
    ///
    /// A scalar `value` is pushed as one element; a list is appended
    /// element-wise, matching repeated `--opt a --opt b` invocations.
    pub fn append(&mut self, key: impl Into<String>, value: Value) {
        let slot = self
            .values
            .entry(key.into())
            .or_insert_with(|| Value::List(Vec::new()));
        if !matches!(slot, Value::List(_)) {
            let prev = std::mem::replace(slot, Value::List(Vec::new()));
            if let Value::List(items) = slot {
                items.push(prev);
            }
        }
        if let Value::List(items) = slot {
            match value {
                Value::List(more) => items.extend(more),
                scalar => items.push(scalar),
            }
        }
    }

    /// Merge another namespace in; `other`'s keys win on collision.
    pub fn merge(&mut self, other: Namespace) {
        for (k, v) in other.values {
            self.values.insert(k, v);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_differs_from_assigned_default() {
        let mut ns = Namespace::new();
        assert!(!ns.is_set("quiet"));
        ns.insert("quiet", Value::Bool(false));
        assert!(ns.is_set("quiet"));
        assert_eq!(ns.get("quiet"), Some(&Value::Bool(false)));
    }

    #[test]
    fn append_extends_lists_elementwise() {
        let mut ns = Namespace::new();
        ns.append("cc", Value::Str("a".into()));
        ns.append(
            "cc",
            Value::List(vec![Value::Str("b".into()), Value::Str("c".into())]),
        );
        assert_eq!(
            ns.get("cc").and_then(Value::as_list).map(<[Value]>::len),
            Some(3)
        );
    }

    #[test]
    fn append_promotes_existing_scalar() {
        let mut ns = Namespace::new();
        ns.insert("cc", Value::Str("a".into()));
        ns.append("cc", Value::Str("b".into()));
        assert_eq!(
            ns.get("cc"),
            Some(&Value::List(vec![
                Value::Str("a".into()),
                Value::Str("b".into())
            ]))
        );
    }

    #[test]
    fn merge_overwrites_on_collision() {
        let mut a = Namespace::new();
        a.insert("service", Value::Str("bugzilla".into()));
        let mut b = Namespace::new();
        b.insert("service", Value::Str("jira".into()));
        a.merge(b);
        assert_eq!(
            a.get("service").and_then(Value::as_str),
            Some("jira")
        );
    }
}
