//! Verifiable presentation data model.
use crate::context::Context;
use crate::one_or_many::deserialize_vec;
use crate::vc::{Holder, Proof};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Maps one submitted credential to an input descriptor of a presentation definition.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Descriptor {
    pub id: String,
    pub format: String,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_nested: Option<Box<Descriptor>>,
}

/// Routes the credentials of a presentation to the descriptors they satisfy.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct PresentationSubmission {
    pub id: String,
    pub definition_id: String,
    pub descriptor_map: Vec<Descriptor>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UnsignedPresentation {
    #[serde(rename = "@context", deserialize_with = "deserialize_vec")]
    pub context: Vec<Context>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type", deserialize_with = "deserialize_vec")]
    pub type_: Vec<String>,
    pub holder: Holder,
    /// Embedded credentials in the exact form they were signed, so their proofs still verify.
    pub verifiable_credential: Vec<Map<String, Value>>,
    #[serde(
        rename = "presentation_submission",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub presentation_submission: Option<PresentationSubmission>,
}

/// A signed verifiable presentation.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Presentation {
    #[serde(flatten)]
    pub unsigned: UnsignedPresentation,
    pub proof: Proof,
}

impl Presentation {
    pub fn holder(&self) -> &str {
        &self.unsigned.holder.id
    }

    pub fn credentials(&self) -> &[Map<String, Value>] {
        &self.unsigned.verifiable_credential
    }
}
