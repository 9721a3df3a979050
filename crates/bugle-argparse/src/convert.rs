//! Built-in value converters.
//!
//! Converters are plain functions registered by string key on the
//! [`Parser`](crate::Parser); option and positional definitions refer
//! to them by key. This replaces dynamic lookup of user-supplied
//! filter code with an explicit registration interface: only
//! statically known callables, registered before parsing begins, are
//! ever invoked.

use crate::namespace::Value;

/// Converts one raw token into a typed value, or explains why it can't.
pub type Convert = fn(&str) -> Result<Value, String>;

/// Keys of the converters every parser starts with.
pub const BUILTIN_CONVERTERS: &[(&str, Convert)] = &[
    ("int", int),
    ("string_list", string_list),
    ("ids", ids),
    ("id_list", id_list),
];

/// A plain integer.
pub fn int(raw: &str) -> Result<Value, String> {
    raw.parse::<i64>()
        .map(Value::Int)
        .map_err(|_| format!("invalid integer value: {raw}"))
}

/// Comma-separated strings; empty segments are dropped.
pub fn string_list(raw: &str) -> Result<Value, String> {
    Ok(Value::List(
        raw.split(',')
            .filter(|item| !item.is_empty())
            .map(Value::from)
            .collect(),
    ))
}

fn parse_id(item: &str) -> Result<i64, String> {
    item.parse::<i64>().map_err(|_| {
        if item == "-" {
            "'-' is only valid when piping data in".to_string()
        } else {
            format!("invalid ID value: {item}")
        }
    })
}

/// A single numeric ID.
pub fn ids(raw: &str) -> Result<Value, String> {
    parse_id(raw).map(Value::Int)
}

/// Comma-separated numeric IDs.
pub fn id_list(raw: &str) -> Result<Value, String> {
    raw.split(',')
        .map(|item| parse_id(item).map(Value::Int))
        .collect::<Result<Vec<_>, _>>()
        .map(Value::List)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_parses_or_explains() {
        assert_eq!(int("42").unwrap(), Value::Int(42));
        assert!(int("many").unwrap_err().contains("invalid integer"));
    }

    #[test]
    fn string_list_drops_empty_segments() {
        assert_eq!(
            string_list("a,,b,").unwrap(),
            Value::List(vec![Value::Str("a".into()), Value::Str("b".into())])
        );
    }

    #[test]
    fn ids_rejects_placeholder_with_piping_hint() {
        let err = ids("-").unwrap_err();
        assert_eq!(err, "'-' is only valid when piping data in");
    }

    #[test]
    fn ids_rejects_garbage() {
        let err = ids("twelve").unwrap_err();
        assert!(err.contains("invalid ID value"), "unexpected: {err}");
    }

    #[test]
    fn id_list_parses_all_or_fails() {
        assert_eq!(
            id_list("1,2,3").unwrap(),
            Value::List(vec![Value::Int(1), Value::Int(2), Value::Int(3)])
        );
        assert!(id_list("1,x").is_err());
    }
}
