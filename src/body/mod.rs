//! Request body parsing, field path resolution, and credential validation.
//!
//! Login bodies arrive as JSON or form-urlencoded payloads; both are lifted
//! into a single [`serde_json::Value`] shape so the configured field paths
//! resolve the same way regardless of encoding. Path resolution and
//! validation are total: malformed paths, absent fields, and unparseable
//! bodies are normal negative results, never errors.

use serde_json::Value;

use crate::config::CredentialsConfig;

/// Content types the gate knows how to parse. Anything else yields no body.
const CONTENT_TYPE_JSON: &str = "application/json";
const CONTENT_TYPE_FORM: &str = "application/x-www-form-urlencoded";

/// Parse a request body according to its declared content type.
///
/// JSON bodies are parsed directly. Form-urlencoded bodies are decoded into
/// key/value pairs and re-mapped into a flat JSON object, so the configured
/// field paths resolve against them unchanged. Unsupported or absent content
/// types, and parse failures, return `None`.
pub fn parse(content_type: Option<&str>, bytes: &[u8]) -> Option<Value> {
    // "application/json; charset=utf-8" → "application/json"
    let media_type = content_type?
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    match media_type.as_str() {
        CONTENT_TYPE_JSON => serde_json::from_slice(bytes).ok(),
        CONTENT_TYPE_FORM => {
            let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(bytes).ok()?;
            let mut map = serde_json::Map::new();
            for (key, value) in pairs {
                map.insert(key, Value::String(value));
            }
            Some(Value::Object(map))
        }
        _ => None,
    }
}

/// One step of a field path: an object key or an array index.
#[derive(Debug, PartialEq, Eq)]
enum Segment {
    Key(String),
    Index(usize),
}

/// Split a dotted/bracketed path into ordered segments.
///
/// `"login.users[0].name"` → `[Key("login"), Key("users"), Index(0), Key("name")]`.
/// Returns `None` for malformed paths (unclosed or non-numeric brackets,
/// empty path), which callers treat as "field absent".
fn segments(path: &str) -> Option<Vec<Segment>> {
    if path.is_empty() {
        return None;
    }

    let mut segments = Vec::new();
    for part in path.split('.') {
        let (key, mut rest) = match part.find('[') {
            Some(pos) => (&part[..pos], &part[pos..]),
            None => (part, ""),
        };
        if key.is_empty() && rest.is_empty() {
            // ".." or a trailing dot
            return None;
        }
        if !key.is_empty() {
            segments.push(Segment::Key(key.to_string()));
        }
        while !rest.is_empty() {
            let inner = rest.strip_prefix('[')?;
            let close = inner.find(']')?;
            let index: usize = inner[..close].parse().ok()?;
            segments.push(Segment::Index(index));
            rest = &inner[close + 1..];
        }
    }
    Some(segments)
}

/// Resolve a field path against a parsed body.
///
/// Walks the structure one segment at a time: objects descend by key, arrays
/// by numeric index. Any mismatch short-circuits to `None`.
pub fn resolve<'a>(body: &'a Value, path: &str) -> Option<&'a Value> {
    let segments = segments(path)?;
    let mut current = body;
    for segment in &segments {
        current = match (segment, current) {
            (Segment::Key(key), Value::Object(map)) => map.get(key)?,
            (Segment::Index(index), Value::Array(items)) => items.get(*index)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Test whether a field path resolves to a value.
pub fn exists(body: &Value, path: &str) -> bool {
    resolve(body, path).is_some()
}

/// Length of a resolved value, where one is defined.
///
/// Strings count characters, arrays count elements. Other types have no
/// length; they pass the validator's length check and are rejected later by
/// the normalizer as a fingerprint failure.
fn value_len(value: &Value) -> Option<usize> {
    match value {
        Value::String(s) => Some(s.chars().count()),
        Value::Array(items) => Some(items.len()),
        _ => None,
    }
}

/// Check that a parsed body contains usable username and password values.
///
/// False when the body is absent or not an object, when either configured
/// path does not resolve, or when a resolved value falls below its
/// configured minimum length. Never errors.
pub fn is_valid(body: Option<&Value>, fields: &CredentialsConfig) -> bool {
    let Some(body) = body else {
        return false;
    };
    if !body.is_object() {
        return false;
    }

    let Some(username) = resolve(body, &fields.username_path) else {
        return false;
    };
    let Some(password) = resolve(body, &fields.password_path) else {
        return false;
    };

    if let Some(len) = value_len(username) {
        if len < fields.min_username_len {
            return false;
        }
    }
    if let Some(len) = value_len(password) {
        if len < fields.min_password_len {
            return false;
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields() -> CredentialsConfig {
        CredentialsConfig {
            username_path: "username".to_string(),
            password_path: "password".to_string(),
            min_username_len: 2,
            min_password_len: 3,
        }
    }

    #[test]
    fn parse_json_body() {
        let body = parse(
            Some("application/json"),
            br#"{"username":"test","password":"secret123"}"#,
        )
        .unwrap();
        assert_eq!(body["username"], "test");
    }

    #[test]
    fn parse_json_with_charset_parameter() {
        let body = parse(
            Some("application/json; charset=utf-8"),
            br#"{"username":"test"}"#,
        );
        assert!(body.is_some());
    }

    #[test]
    fn parse_form_body_maps_to_object() {
        let body = parse(
            Some("application/x-www-form-urlencoded"),
            b"username=test%40test.nl&password=secret123",
        )
        .unwrap();
        assert_eq!(body["username"], "test@test.nl");
        assert_eq!(body["password"], "secret123");
    }

    #[test]
    fn parse_unsupported_content_type_yields_none() {
        assert!(parse(Some("text/plain"), b"username=test").is_none());
        assert!(parse(None, b"{}").is_none());
    }

    #[test]
    fn parse_malformed_json_yields_none() {
        assert!(parse(Some("application/json"), b"{not json").is_none());
    }

    #[test]
    fn resolve_top_level_key() {
        let body = json!({"username": "test"});
        assert_eq!(resolve(&body, "username"), Some(&json!("test")));
    }

    #[test]
    fn resolve_nested_path() {
        let body = json!({"login": {"user": {"name": "test"}}});
        assert_eq!(resolve(&body, "login.user.name"), Some(&json!("test")));
    }

    #[test]
    fn resolve_array_index() {
        let body = json!({"users": [{"name": "first"}, {"name": "second"}]});
        assert_eq!(resolve(&body, "users[1].name"), Some(&json!("second")));
    }

    #[test]
    fn resolve_double_index() {
        let body = json!({"matrix": [[1, 2], [3, 4]]});
        assert_eq!(resolve(&body, "matrix[1][0]"), Some(&json!(3)));
    }

    #[test]
    fn resolve_absent_key_is_none() {
        let body = json!({"username": "test"});
        assert_eq!(resolve(&body, "password"), None);
        assert_eq!(resolve(&body, "username.nested"), None);
    }

    #[test]
    fn resolve_out_of_range_index_is_none() {
        let body = json!({"users": ["only"]});
        assert_eq!(resolve(&body, "users[3]"), None);
    }

    #[test]
    fn resolve_malformed_path_is_none() {
        let body = json!({"users": ["only"]});
        assert_eq!(resolve(&body, "users[x]"), None);
        assert_eq!(resolve(&body, "users[0"), None);
        assert_eq!(resolve(&body, ""), None);
        assert_eq!(resolve(&body, "users..name"), None);
    }

    #[test]
    fn exists_matches_resolve() {
        let body = json!({"a": {"b": null}});
        // null is a present value, not an absent field
        assert!(exists(&body, "a.b"));
        assert!(!exists(&body, "a.c"));
    }

    #[test]
    fn valid_body_passes() {
        let body = json!({"username": "test@test.nl", "password": "secret123"});
        assert!(is_valid(Some(&body), &fields()));
    }

    #[test]
    fn absent_body_fails() {
        assert!(!is_valid(None, &fields()));
    }

    #[test]
    fn non_object_body_fails() {
        assert!(!is_valid(Some(&json!("just a string")), &fields()));
        assert!(!is_valid(Some(&json!([1, 2, 3])), &fields()));
    }

    #[test]
    fn missing_field_fails() {
        let body = json!({"username": "test@test.nl"});
        assert!(!is_valid(Some(&body), &fields()));
    }

    #[test]
    fn short_username_fails() {
        let body = json!({"username": "a", "password": "secret123"});
        assert!(!is_valid(Some(&body), &fields()));
    }

    #[test]
    fn short_password_fails() {
        let body = json!({"username": "test", "password": "bb"});
        assert!(!is_valid(Some(&body), &fields()));
    }

    #[test]
    fn boundary_lengths_pass() {
        let body = json!({"username": "ab", "password": "abc"});
        assert!(is_valid(Some(&body), &fields()));
    }

    #[test]
    fn non_string_values_defer_to_normalizer() {
        // A numeric password has no length; the validator lets it through and
        // the normalizer rejects it as a fingerprint failure.
        let body = json!({"username": "test", "password": 12345});
        assert!(is_valid(Some(&body), &fields()));
    }

    #[test]
    fn nested_configured_paths() {
        let fields = CredentialsConfig {
            username_path: "login.username".to_string(),
            password_path: "login.password".to_string(),
            min_username_len: 2,
            min_password_len: 3,
        };
        let body = json!({"login": {"username": "test", "password": "secret123"}});
        assert!(is_valid(Some(&body), &fields));
    }
}
