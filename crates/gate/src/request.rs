//! Transport-neutral view of an incoming request.
//!
//! The gate reads only two things from a request: whether its body is
//! structured, and named string fields of that body. Any transport adapter
//! can provide these through [`RawRequest`]; [`JsonBody`] is the adapter for
//! HTTP requests carrying JSON.

use http::{HeaderValue, header};
use serde_json::{Map, Value};

/// Body field carrying the caller's credential.
pub const CREDENTIAL_FIELD: &str = "auth_token";

/// Body field carrying the caller's free-text input.
pub const PROMPT_FIELD: &str = "prompt";

/// Capability the gate needs from a request.
pub trait RawRequest {
    /// Whether the body is present and parsed as the expected key-value payload.
    fn is_structured_body(&self) -> bool;

    /// A string field of the body, or `None` if absent.
    fn field(&self, name: &str) -> Option<&str>;

    /// The credential, or `""` when missing or when the body is unstructured.
    fn credential(&self) -> &str {
        structured_field(self, CREDENTIAL_FIELD)
    }

    /// The prompt, or `""` when missing or when the body is unstructured.
    fn prompt(&self) -> &str {
        structured_field(self, PROMPT_FIELD)
    }
}

fn structured_field<'a, R: RawRequest + ?Sized>(request: &'a R, name: &str) -> &'a str {
    if !request.is_structured_body() {
        return "";
    }
    request.field(name).unwrap_or_default()
}

/// A request body that may or may not be a JSON object.
#[derive(Debug, Default, Clone)]
pub struct JsonBody {
    object: Option<Map<String, Value>>,
}

impl JsonBody {
    /// Interpret `bytes` given the request's `Content-Type`.
    ///
    /// The body is structured only when the content type is JSON and the
    /// bytes parse as a JSON object. Anything else yields an unstructured
    /// body rather than an error.
    pub fn from_parts(content_type: Option<&HeaderValue>, bytes: &[u8]) -> Self {
        if !content_type.is_some_and(is_json_content_type) {
            return Self::default();
        }
        let object = match serde_json::from_slice::<Value>(bytes) {
            Ok(Value::Object(object)) => Some(object),
            _ => None,
        };
        Self { object }
    }

    /// Read the content type from request headers and interpret `bytes`.
    pub fn from_headers(headers: &http::HeaderMap, bytes: &[u8]) -> Self {
        Self::from_parts(headers.get(header::CONTENT_TYPE), bytes)
    }
}

impl From<Value> for JsonBody {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(object) => Self {
                object: Some(object),
            },
            _ => Self::default(),
        }
    }
}

impl RawRequest for JsonBody {
    fn is_structured_body(&self) -> bool {
        self.object.is_some()
    }

    // Non-string values are treated as absent.
    fn field(&self, name: &str) -> Option<&str> {
        self.object.as_ref()?.get(name)?.as_str()
    }
}

/// `application/json` or `application/<anything>+json`, ignoring parameters.
fn is_json_content_type(value: &HeaderValue) -> bool {
    let Some(mime) = value
        .to_str()
        .ok()
        .and_then(|value| value.parse::<mime::Mime>().ok())
    else {
        return false;
    };
    mime.type_() == "application"
        && (mime.subtype() == "json" || mime.suffix().is_some_and(|name| name == "json"))
}

#[cfg(test)]
mod tests {
    use crate::request::{JsonBody, RawRequest};
    use http::HeaderValue;
    use serde_json::json;

    fn json_header() -> HeaderValue {
        HeaderValue::from_static("application/json")
    }

    #[test]
    fn reads_string_fields() {
        let body = JsonBody::from_parts(
            Some(&json_header()),
            br#"{"auth_token": "admin_token", "prompt": "hi"}"#,
        );
        assert!(body.is_structured_body());
        assert_eq!(body.credential(), "admin_token");
        assert_eq!(body.prompt(), "hi");
    }

    #[test]
    fn missing_fields_are_empty() {
        let body = JsonBody::from_parts(Some(&json_header()), b"{}");
        assert!(body.is_structured_body());
        assert_eq!(body.field("auth_token"), None);
        assert_eq!(body.credential(), "");
        assert_eq!(body.prompt(), "");
    }

    #[test]
    fn non_string_fields_are_absent() {
        let body = JsonBody::from(json!({"auth_token": 7, "prompt": ["a"]}));
        assert_eq!(body.field("auth_token"), None);
        assert_eq!(body.prompt(), "");
    }

    #[test]
    fn invalid_json_is_unstructured() {
        let body = JsonBody::from_parts(Some(&json_header()), b"{not json");
        assert!(!body.is_structured_body());
        assert_eq!(body.credential(), "");
    }

    #[test]
    fn non_object_json_is_unstructured() {
        let body = JsonBody::from_parts(Some(&json_header()), br#"["auth_token"]"#);
        assert!(!body.is_structured_body());
    }

    #[test]
    fn requires_json_content_type() {
        let bytes = br#"{"auth_token": "admin_token"}"#;
        assert!(!JsonBody::from_parts(None, bytes).is_structured_body());

        let text = HeaderValue::from_static("text/plain");
        assert!(!JsonBody::from_parts(Some(&text), bytes).is_structured_body());

        let charset = HeaderValue::from_static("Application/JSON; charset=utf-8");
        assert!(JsonBody::from_parts(Some(&charset), bytes).is_structured_body());

        let suffix = HeaderValue::from_static("application/vnd.api+json");
        assert!(JsonBody::from_parts(Some(&suffix), bytes).is_structured_body());

        let text_json = HeaderValue::from_static("text/json");
        assert!(!JsonBody::from_parts(Some(&text_json), bytes).is_structured_body());

        let garbage = HeaderValue::from_static("json");
        assert!(!JsonBody::from_parts(Some(&garbage), bytes).is_structured_body());
    }

    #[test]
    fn empty_body_is_unstructured() {
        assert!(!JsonBody::from_parts(Some(&json_header()), b"").is_structured_body());
    }
}
