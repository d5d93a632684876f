use serde_json::Value;

/// Normalize the two response shapes the backend has used over time.
///
/// Newer endpoints wrap their payload as `{ "success": bool, "data": ... }`;
/// older ones return the payload directly. Enveloped bodies yield `data`
/// (or the whole body when `data` is absent or null), everything else is
/// returned untouched.
pub fn unwrap(body: Value) -> Value {
    match body {
        Value::Object(mut map) if map.contains_key("success") => match map.remove("data") {
            Some(data) if !data.is_null() => data,
            data => {
                if let Some(data) = data {
                    map.insert("data".to_string(), data);
                }
                Value::Object(map)
            }
        },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_enveloped_body_yields_data() {
        let body = json!({"success": true, "data": {"user": {"id": "u1"}}});
        assert_eq!(unwrap(body), json!({"user": {"id": "u1"}}));
    }

    #[test]
    fn test_failed_envelope_still_yields_data() {
        let body = json!({"success": false, "data": [1, 2]});
        assert_eq!(unwrap(body), json!([1, 2]));
    }

    #[test]
    fn test_envelope_without_data_is_returned_whole() {
        let body = json!({"success": true, "message": "ok"});
        assert_eq!(unwrap(body.clone()), body);

        let body = json!({"success": true, "data": null});
        assert_eq!(unwrap(body.clone()), body);
    }

    #[test]
    fn test_plain_body_untouched() {
        let body = json!({"user": {"id": "u1"}});
        assert_eq!(unwrap(body.clone()), body);
        assert_eq!(unwrap(Value::Null), Value::Null);
        assert_eq!(unwrap(json!([1])), json!([1]));
    }
}
