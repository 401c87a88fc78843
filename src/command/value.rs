// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Payload coercion helpers.

use serde_json::Value;

/// Interprets a message payload as a boolean.
///
/// Accepts JSON booleans, numbers (non-zero is `true`) and the strings
/// `true/false`, `on/off`, `yes/no`, `1/0` in any case.
pub(crate) fn coerce_bool(payload: &Value) -> Option<bool> {
    match payload {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|v| v.abs() > f64::EPSILON),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "on" | "yes" | "1" => Some(true),
            "false" | "off" | "no" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Interprets a message payload as a source identifier.
pub(crate) fn coerce_source_id(payload: &Value) -> Option<String> {
    match payload {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn booleans_pass_through() {
        assert_eq!(coerce_bool(&json!(true)), Some(true));
        assert_eq!(coerce_bool(&json!(false)), Some(false));
    }

    #[test]
    fn numbers_are_truthy_when_non_zero() {
        assert_eq!(coerce_bool(&json!(1)), Some(true));
        assert_eq!(coerce_bool(&json!(0)), Some(false));
        assert_eq!(coerce_bool(&json!(0.5)), Some(true));
    }

    #[test]
    fn strings_are_case_insensitive() {
        assert_eq!(coerce_bool(&json!("ON")), Some(true));
        assert_eq!(coerce_bool(&json!(" off ")), Some(false));
        assert_eq!(coerce_bool(&json!("True")), Some(true));
        assert_eq!(coerce_bool(&json!("maybe")), None);
    }

    #[test]
    fn other_types_are_rejected() {
        assert_eq!(coerce_bool(&Value::Null), None);
        assert_eq!(coerce_bool(&json!([true])), None);
    }

    #[test]
    fn source_id_accepts_strings_and_numbers() {
        assert_eq!(coerce_source_id(&json!("hdmi1")), Some("hdmi1".to_string()));
        assert_eq!(coerce_source_id(&json!(3)), Some("3".to_string()));
        assert_eq!(coerce_source_id(&json!("")), None);
        assert_eq!(coerce_source_id(&Value::Null), None);
    }
}
