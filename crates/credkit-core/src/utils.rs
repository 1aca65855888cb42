//! Utils module.
use serde::Serialize;
use serde_json::{Map, Value};

/// Serializes a value that must be a JSON object into its map.
pub fn to_object<T: Serialize + ?Sized>(value: &T) -> Result<Map<String, Value>, serde_json::Error> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(<serde_json::Error as serde::ser::Error>::custom(format!(
            "expected a JSON object, found: {other}"
        ))),
    }
}

/// Strips any DID-URL parameters, query and fragment, returning the bare DID.
///
/// Long-form DIDs that carry their initial state as a `;` parameter or a query parameter reduce
/// to their short form.
pub fn normalize_did(did_url: &str) -> &str {
    let end = did_url.find([';', '?', '#']).unwrap_or(did_url.len());
    &did_url[..end]
}

/// Returns `true` if `uri` parses as an absolute URI (it has a scheme).
pub fn is_absolute_uri(uri: &str) -> bool {
    url::Url::parse(uri).is_ok()
}

/// Resolves a possibly relative `#fragment` reference against a base document id.
pub fn resolve_reference(base_id: &str, reference: &str) -> String {
    if reference.starts_with('#') {
        format!("{}{}", normalize_did(base_id), reference)
    } else {
        reference.to_string()
    }
}
