//! Request body normalization.

use crate::{Error, Result};
use reqwest::multipart::Form;

/// A request payload as supplied by the caller.
#[derive(Debug)]
pub enum Payload {
    /// A structured value, sent as JSON text.
    Json(serde_json::Value),
    /// A pre-built multipart form, sent as-is.
    Form(Form),
}

impl From<serde_json::Value> for Payload {
    fn from(value: serde_json::Value) -> Self {
        Payload::Json(value)
    }
}

impl From<Form> for Payload {
    fn from(form: Form) -> Self {
        Payload::Form(form)
    }
}

/// The literal body placed on the wire.
#[derive(Debug)]
pub enum Body {
    /// JSON text.
    Text(String),
    /// A multipart form; the transport encodes it and sets the boundary.
    Form(Form),
}

/// Turns a payload into the body to send.
///
/// Forms pass through untouched; structured values become their JSON text.
///
/// # Examples
///
/// ```
/// use valfetch::body::{normalize_body, Body, Payload};
///
/// let body = normalize_body(Payload::Json(serde_json::json!({ "foo": "bar" })))?;
/// assert!(matches!(body, Body::Text(ref text) if text == r#"{"foo":"bar"}"#));
/// # Ok::<(), valfetch::Error>(())
/// ```
pub fn normalize_body(payload: Payload) -> Result<Body> {
    match payload {
        Payload::Form(form) => Ok(Body::Form(form)),
        Payload::Json(value) => serde_json::to_string(&value)
            .map(Body::Text)
            .map_err(|e| Error::SerializationFailed(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn form_passes_through() {
        let form = Form::new().text("username", "Groucho");
        let boundary = form.boundary().to_string();

        match normalize_body(Payload::Form(form)).unwrap() {
            Body::Form(form) => assert_eq!(form.boundary(), boundary),
            other => panic!("Expected form body, got {:?}", other),
        }
    }

    #[test]
    fn structured_value_becomes_json_text() {
        let value = json!({ "foo": "unicorns", "bar": "peas" });
        let expected = serde_json::to_string(&value).unwrap();

        match normalize_body(value.into()).unwrap() {
            Body::Text(text) => {
                assert_eq!(text, expected);
                let back: serde_json::Value = serde_json::from_str(&text).unwrap();
                assert_eq!(back, json!({ "foo": "unicorns", "bar": "peas" }));
            }
            other => panic!("Expected text body, got {:?}", other),
        }
    }

    #[test]
    fn scalars_and_arrays_are_serialized_too() {
        for value in [json!(null), json!(42), json!("text"), json!([1, "two", false])] {
            let expected = value.to_string();
            match normalize_body(Payload::Json(value)).unwrap() {
                Body::Text(text) => assert_eq!(text, expected),
                other => panic!("Expected text body, got {:?}", other),
            }
        }
    }
}
