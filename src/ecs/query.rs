//! Flattening of request bodies into ECS RPC query parameters.
//!
//! The RPC style API takes every field as a flat query parameter. Nested
//! structures are addressed with dotted keys and lists with 1-based indices,
//! so a data disk size becomes `DataDisk.1.Size`.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

/// Serializes `value` and flattens it into RPC query parameters.
///
/// `null` values are omitted so optional fields left unset never reach the
/// wire.
///
/// # Errors
///
/// Returns the serializer error when `value` cannot be represented as JSON.
pub fn flatten_query<T: Serialize>(value: &T) -> Result<BTreeMap<String, String>, serde_json::Error> {
    let mut params = BTreeMap::new();
    flatten_into(&mut params, None, serde_json::to_value(value)?);
    Ok(params)
}

fn flatten_into(params: &mut BTreeMap<String, String>, prefix: Option<&str>, value: Value) {
    match value {
        Value::Null => {}
        Value::Bool(flag) => insert(params, prefix, flag.to_string()),
        Value::Number(number) => insert(params, prefix, number.to_string()),
        Value::String(text) => insert(params, prefix, text),
        Value::Array(items) => {
            for (position, item) in (1_usize..).zip(items) {
                let key = join(prefix, &position.to_string());
                flatten_into(params, Some(&key), item);
            }
        }
        Value::Object(fields) => {
            for (name, field) in fields {
                let key = join(prefix, &name);
                flatten_into(params, Some(&key), field);
            }
        }
    }
}

fn insert(params: &mut BTreeMap<String, String>, key: Option<&str>, value: String) {
    if let Some(name) = key {
        params.insert(name.to_owned(), value);
    }
}

fn join(prefix: Option<&str>, segment: &str) -> String {
    prefix.map_or_else(|| segment.to_owned(), |head| format!("{head}.{segment}"))
}
