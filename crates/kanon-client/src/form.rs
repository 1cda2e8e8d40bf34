//! `application/x-www-form-urlencoded` encoding of JSON objects.

use kanon_core::ParseError;
use serde_json::Value;

/// Encodes a JSON object as a form body.
///
/// Strings, numbers and booleans become `key=value`; `null` fields are
/// skipped; arrays repeat the key; nested objects are sent as JSON text.
///
/// # Errors
///
/// Returns a [`ParseError`] if `value` is not an object.
pub fn encode_form(value: &Value) -> Result<String, ParseError> {
    let Value::Object(map) = value else {
        return Err(ParseError::shape(
            "form body must be a JSON object",
            value.to_string(),
        ));
    };

    Ok(encode_fields(map.iter().map(|(k, v)| (k.as_str(), v))))
}

/// Encodes `(key, value)` pairs in the order given.
pub fn encode_fields<'a>(fields: impl IntoIterator<Item = (&'a str, &'a Value)>) -> String {
    let mut pairs = Vec::new();
    for (key, field) in fields {
        match field {
            Value::Null => {}
            Value::Array(items) => {
                for item in items.iter().filter(|i| !i.is_null()) {
                    pairs.push(pair(key, item));
                }
            }
            other => pairs.push(pair(key, other)),
        }
    }
    pairs.join("&")
}

fn pair(key: &str, value: &Value) -> String {
    let text = match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    format!(
        "{}={}",
        urlencoding::encode(key),
        urlencoding::encode(&text)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_encode_scalars() {
        let body = json!({"email": "eve.holt@reqres.in", "password": "city slicka", "age": 30});
        assert_eq!(
            encode_form(&body).unwrap(),
            "age=30&email=eve.holt%40reqres.in&password=city%20slicka"
        );
    }

    #[test]
    fn test_encode_skips_null_and_repeats_arrays() {
        let body = json!({"tag": ["a", null, "b"], "missing": null});
        assert_eq!(encode_form(&body).unwrap(), "tag=a&tag=b");
    }

    #[test]
    fn test_encode_fields_keeps_order() {
        let name = json!("morpheus");
        let job = json!("zion resident");
        assert_eq!(
            encode_fields([("name", &name), ("job", &job)]),
            "name=morpheus&job=zion%20resident"
        );
    }

    #[test]
    fn test_encode_rejects_non_object() {
        assert!(encode_form(&json!([1, 2])).is_err());
    }
}
