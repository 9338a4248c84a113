// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of FluxION.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.
//
// For commercial licensing, please contact: info@solare.cz

//! Helpers for the loosely typed Deye Cloud response envelope
//!
//! Different API deployments report success differently: `"code": "0"`,
//! `"code": "1000000"`, `"code": 1000000` or `"success": true`. Any one of them is
//! enough.

use serde_json::Value;

const SUCCESS_CODES: [&str; 2] = ["0", "1000000"];
const SUCCESS_CODE_NUMERIC: i64 = 1_000_000;

/// Whether the vendor reported the call as successful
pub fn is_success(body: &Value) -> bool {
    let code_ok = if let Some(code) = body.get("code").and_then(Value::as_str) {
        SUCCESS_CODES.contains(&code)
    } else {
        body.get("code").and_then(Value::as_i64) == Some(SUCCESS_CODE_NUMERIC)
    };

    code_ok || body.get("success").and_then(Value::as_bool) == Some(true)
}

/// Vendor result code rendered as text, for logs and error messages
pub fn result_code(body: &Value) -> String {
    match body.get("code") {
        Some(Value::String(code)) => code.clone(),
        Some(Value::Null) | None => "none".to_owned(),
        Some(other) => other.to_string(),
    }
}

/// Human-readable vendor message (`msg` or `message`)
pub fn vendor_message(body: &Value) -> String {
    ["msg", "message"]
        .iter()
        .find_map(|key| body.get(*key).and_then(Value::as_str))
        .unwrap_or("no message")
        .to_owned()
}

/// Value at a dotted path such as `data.access_token`
pub fn value_at<'a>(body: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(body, |node, key| node.get(key))
        .filter(|value| !value.is_null())
}

/// First non-null value found at any of the dotted paths, in order
pub fn first_present<'a>(body: &'a Value, paths: &[&str]) -> Option<&'a Value> {
    paths.iter().find_map(|path| value_at(body, path))
}

/// Numeric reading of a JSON value; the vendor sends numbers, floats and numeric strings
pub fn as_number(value: &Value) -> Option<f64> {
    let number = if let Some(text) = value.as_str() {
        text.trim().parse::<f64>().ok()
    } else {
        value.as_f64()
    };
    number.filter(|n| n.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_sentinels() {
        assert!(is_success(&json!({"code": "0"})));
        assert!(is_success(&json!({"code": "1000000"})));
        assert!(is_success(&json!({"code": 1000000})));
        assert!(is_success(&json!({"code": "2101019", "success": true})));
    }

    #[test]
    fn test_failure_responses() {
        assert!(!is_success(&json!({})));
        assert!(!is_success(&json!({"code": "2101019", "success": false})));
        assert!(!is_success(&json!({"code": 0})));
        assert!(!is_success(&json!({"success": "true"})));
        assert!(!is_success(&json!(["code", "0"])));
    }

    #[test]
    fn test_result_code_and_message() {
        assert_eq!(result_code(&json!({"code": "2101006"})), "2101006");
        assert_eq!(result_code(&json!({"code": 1000000})), "1000000");
        assert_eq!(result_code(&json!({})), "none");
        assert_eq!(vendor_message(&json!({"msg": "auth failed"})), "auth failed");
        assert_eq!(vendor_message(&json!({"message": "nope"})), "nope");
        assert_eq!(vendor_message(&json!({})), "no message");
    }

    #[test]
    fn test_first_present_respects_order_and_skips_null() {
        let body = json!({
            "data": {"access_token": null},
            "accessToken": "top-level"
        });
        let found = first_present(&body, &["data.access_token", "accessToken"]);
        assert_eq!(found, Some(&json!("top-level")));

        let body = json!({"data": {"access_token": "nested"}, "accessToken": "top-level"});
        let found = first_present(&body, &["data.access_token", "accessToken"]);
        assert_eq!(found, Some(&json!("nested")));
    }

    #[test]
    fn test_as_number_coercion() {
        assert_eq!(as_number(&json!(85)), Some(85.0));
        assert_eq!(as_number(&json!(-120.7)), Some(-120.7));
        assert_eq!(as_number(&json!(" 42.5 ")), Some(42.5));
        assert_eq!(as_number(&json!("n/a")), None);
        assert_eq!(as_number(&json!(true)), None);
        assert_eq!(as_number(&json!({"value": 1})), None);
    }
}
