//! Lenient deserializers for API payloads.
//!
//! The HR API is not consistent about scalar types: the same field may arrive
//! as `"E01"`, `101`, `null` or be missing altogether.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Accept a string, number, bool or null and yield a string (null → "").
pub fn string_lenient<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(other) => other.to_string(),
    })
}

/// Accept a number or a numeric string for an id.
pub fn id_lenient<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match value {
        Value::Number(n) => n
            .as_i64()
            .ok_or_else(|| serde::de::Error::custom(format!("id out of range: {n}"))),
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| serde::de::Error::custom(format!("invalid id: {s:?}"))),
        other => Err(serde::de::Error::custom(format!("invalid id: {other}"))),
    }
}

/// Accept `true`/`false`, `1`/`0` or their string forms.
pub fn bool_lenient<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match &value {
        Value::Bool(b) => Ok(*b),
        Value::Number(n) => Ok(n.as_i64().is_some_and(|v| v != 0)),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Ok(true),
            "false" | "0" | "" => Ok(false),
            _ => Err(serde::de::Error::custom(format!("invalid flag: {s:?}"))),
        },
        Value::Null => Ok(false),
        other => Err(serde::de::Error::custom(format!("invalid flag: {other}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Row {
        #[serde(default, deserialize_with = "string_lenient")]
        code: String,
        #[serde(deserialize_with = "id_lenient")]
        id: i64,
    }

    #[test]
    fn test_number_and_string_forms() {
        let a: Row = serde_json::from_str(r#"{"code": 101, "id": "7"}"#).unwrap();
        assert_eq!(a.code, "101");
        assert_eq!(a.id, 7);

        let b: Row = serde_json::from_str(r#"{"code": null, "id": 3}"#).unwrap();
        assert_eq!(b.code, "");

        let c: Row = serde_json::from_str(r#"{"id": 3}"#).unwrap();
        assert_eq!(c.code, "");
    }

    #[derive(Deserialize)]
    struct Flag {
        #[serde(deserialize_with = "bool_lenient")]
        ok: bool,
    }

    #[test]
    fn test_flag_forms() {
        for (raw, expected) in [("true", true), ("1", true), ("\"1\"", true), ("0", false), ("\"false\"", false)] {
            let flag: Flag = serde_json::from_str(&format!(r#"{{"ok": {raw}}}"#)).unwrap();
            assert_eq!(flag.ok, expected, "raw {raw}");
        }
    }

    #[test]
    fn test_bad_id_rejected() {
        assert!(serde_json::from_str::<Row>(r#"{"id": "abc"}"#).is_err());
    }
}
