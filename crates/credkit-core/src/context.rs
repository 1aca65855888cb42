//! Assembly of `@context` and `type` lists around a mandatory base value.
use crate::one_or_many::OneOrMany;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A JSON-LD context entry: a URI or an inline context object.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum Context {
    URI(String),
    Object(Map<String, Value>),
}

impl From<&str> for Context {
    fn from(uri: &str) -> Self {
        Context::URI(uri.to_string())
    }
}

/// Returns `[base, ...items]` where `items` keeps the caller's ordering with every exact copy of
/// `base` removed. Items are not deduplicated against each other.
pub fn assemble<T: PartialEq>(base: T, items: Option<OneOrMany<T>>) -> Vec<T> {
    let mut assembled = vec![base];
    if let Some(items) = items {
        for item in items {
            if item != assembled[0] {
                assembled.push(item);
            }
        }
    }
    assembled
}

/// Assembles a context list with the base credentials context first.
pub fn assemble_context(context: Option<OneOrMany<Context>>) -> Vec<Context> {
    assemble(Context::from(crate::BASE_CONTEXT), context)
}

/// Assembles a type list with `base_type` first.
pub fn assemble_type(base_type: &str, type_: Option<OneOrMany<String>>) -> Vec<String> {
    assemble(base_type.to_string(), type_)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BASE_CONTEXT, CREDENTIAL_TYPE};
    use serde_json::json;

    #[test]
    fn test_assemble_absent() {
        assert_eq!(assemble_type(CREDENTIAL_TYPE, None), vec![CREDENTIAL_TYPE]);
        assert_eq!(assemble_context(None), vec![Context::from(BASE_CONTEXT)]);
    }

    #[test]
    fn test_assemble_scalar() {
        let assembled = assemble_type(CREDENTIAL_TYPE, Some("CustomCredential".to_string().into()));
        assert_eq!(assembled, vec![CREDENTIAL_TYPE, "CustomCredential"]);
    }

    #[test]
    fn test_assemble_does_not_duplicate_base() {
        let type_ = OneOrMany::Many(vec![
            CREDENTIAL_TYPE.to_string(),
            "CustomCredential".to_string(),
        ]);
        assert_eq!(
            assemble_type(CREDENTIAL_TYPE, Some(type_)),
            vec![CREDENTIAL_TYPE, "CustomCredential"]
        );
    }

    #[test]
    fn test_assemble_is_idempotent() {
        let without_base = OneOrMany::Many(vec![
            Context::from("https://schema.org/"),
            Context::Object(json!({"ex": "https://example.com/#"}).as_object().unwrap().clone()),
        ]);
        let mut with_base_items = vec![Context::from(BASE_CONTEXT)];
        with_base_items.extend(without_base.clone());
        let once = assemble_context(Some(without_base));
        let again = assemble_context(Some(OneOrMany::Many(with_base_items)));
        assert_eq!(once, again);
        assert_eq!(assemble_context(Some(OneOrMany::Many(once.clone()))), once);
    }

    #[test]
    fn test_assemble_keeps_caller_duplicates() {
        let type_ = OneOrMany::Many(vec!["A".to_string(), "A".to_string(), "B".to_string()]);
        assert_eq!(
            assemble_type(CREDENTIAL_TYPE, Some(type_)),
            vec![CREDENTIAL_TYPE, "A", "A", "B"]
        );
    }
}
