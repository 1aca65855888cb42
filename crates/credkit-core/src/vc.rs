//! Verifiable credential data model: skeleton, unsigned and signed stages.
use crate::context::Context;
use crate::one_or_many::{deserialize_vec, OneOrMany};
use crate::purpose::ProofPurposeTerm;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Claims about a subject. `@type` is required.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Thing {
    #[serde(rename = "@type")]
    pub type_: OneOrMany<String>,
    #[serde(flatten)]
    pub property_set: Map<String, Value>,
}

impl Thing {
    pub fn new(type_: &str) -> Self {
        Self {
            type_: OneOrMany::One(type_.to_string()),
            property_set: Map::new(),
        }
    }

    /// Adds a property, returning the thing.
    pub fn with_property(mut self, key: &str, value: Value) -> Self {
        self.property_set.insert(key.to_string(), value);
        self
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CredentialSubject {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub data: Thing,
}

/// Reference to the holder a credential is issued to or a presentation is made by.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Holder {
    pub id: String,
}

/// Pointer to an out-of-band revocation registry entry.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Revocation {
    pub id: String,
}

/// A proof attached to a credential or presentation.
///
/// Exactly one of `jws` and `proof_value` is populated.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Proof {
    #[serde(rename = "type")]
    pub type_: String,
    pub created: DateTime<Utc>,
    pub proof_purpose: ProofPurposeTerm,
    pub verification_method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jws: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proof_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub challenge: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(flatten)]
    pub property_set: Map<String, Value>,
}

/// The pre-dated core of a credential.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Skeleton {
    #[serde(rename = "@context", deserialize_with = "deserialize_vec")]
    pub context: Vec<Context>,
    pub id: String,
    #[serde(rename = "type", deserialize_with = "deserialize_vec")]
    pub type_: Vec<String>,
    pub holder: Holder,
    pub credential_subject: OneOrMany<CredentialSubject>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UnsignedCredential {
    #[serde(flatten)]
    pub skeleton: Skeleton,
    pub issuance_date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revocation: Option<Revocation>,
}

/// A signed verifiable credential.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Credential {
    #[serde(flatten)]
    pub unsigned: UnsignedCredential,
    pub issuer: String,
    pub proof: Proof,
}

impl Credential {
    pub fn id(&self) -> &str {
        &self.unsigned.skeleton.id
    }

    pub fn holder(&self) -> &str {
        &self.unsigned.skeleton.holder.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::TEST_SIGNED_CREDENTIAL;
    use crate::{BASE_CONTEXT, CREDENTIAL_TYPE};

    #[test]
    fn test_deserialize_signed_credential() -> Result<(), Box<dyn std::error::Error>> {
        let vc: Credential = serde_json::from_str(TEST_SIGNED_CREDENTIAL)?;
        assert_eq!(vc.id(), "urn:uuid:4b7a9c1e-3f2d-4e8a-9b6c-1d2e3f4a5b6c");
        assert_eq!(vc.holder(), "did:example:holder");
        assert_eq!(vc.issuer, "did:example:issuer");
        assert_eq!(vc.unsigned.skeleton.context[0], Context::from(BASE_CONTEXT));
        assert_eq!(vc.unsigned.skeleton.type_[0], CREDENTIAL_TYPE);
        assert_eq!(vc.proof.proof_purpose, ProofPurposeTerm::AssertionMethod);
        assert!(vc.proof.jws.is_some());
        assert!(vc.proof.proof_value.is_none());
        assert!(vc.unsigned.revocation.is_none());
        Ok(())
    }

    #[test]
    fn test_serialize_omits_absent_optionals() -> Result<(), Box<dyn std::error::Error>> {
        let vc: Credential = serde_json::from_str(TEST_SIGNED_CREDENTIAL)?;
        let value = serde_json::to_value(&vc.unsigned)?;
        assert!(value.get("expirationDate").is_some());
        assert!(value.get("revocation").is_none());
        assert!(value.get("proof").is_none());
        Ok(())
    }

    #[test]
    fn test_single_context_string() -> Result<(), Box<dyn std::error::Error>> {
        let mut value: Value = serde_json::from_str(TEST_SIGNED_CREDENTIAL)?;
        value["@context"] = Value::from(BASE_CONTEXT);
        let vc: Credential = serde_json::from_value(value)?;
        assert_eq!(vc.unsigned.skeleton.context, vec![Context::from(BASE_CONTEXT)]);
        Ok(())
    }
}
