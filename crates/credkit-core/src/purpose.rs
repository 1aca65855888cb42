//! Proof purposes: the declared intent of a proof and the checks that bind a proof to it.
use crate::utils::{normalize_did, resolve_reference};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;

/// An error relating to a proof purpose.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum PurposeError {
    /// Authentication proofs must be bound to a challenge.
    #[error("A challenge is required for an authentication proof purpose.")]
    MissingChallenge,
    /// An option had an unexpected JSON type.
    #[error("Proof purpose option \"{0}\" must be a string.")]
    InvalidOption(String),
    /// The proof declares a different purpose.
    #[error("The proof purpose \"{found}\" does not match the expected \"{expected}\".")]
    MismatchedPurpose {
        expected: ProofPurposeTerm,
        found: String,
    },
    /// The proof challenge does not match the expected challenge.
    #[error("The challenge is not as expected.")]
    MismatchedChallenge,
    /// The proof domain does not match the expected domain.
    #[error("The domain is not as expected.")]
    MismatchedDomain,
    /// The verification method belongs to a different controller.
    #[error("The controller \"{found}\" does not match the expected \"{expected}\".")]
    MismatchedController { expected: String, found: String },
    /// The verification method is not listed under the purpose's relationship.
    #[error("Verification method \"{0}\" is not authorized by its controller for proof purpose \"{1}\".")]
    UnauthorizedVerificationMethod(String, ProofPurposeTerm),
}

/// The proof purpose terms this system issues and accepts.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum ProofPurposeTerm {
    /// Issuance: the issuer asserts the credential.
    AssertionMethod,
    /// Presentation: the holder authenticates against a challenge and domain.
    Authentication,
}

impl ProofPurposeTerm {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProofPurposeTerm::AssertionMethod => "assertionMethod",
            ProofPurposeTerm::Authentication => "authentication",
        }
    }
}

impl fmt::Display for ProofPurposeTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A proof purpose object passed to a suite when creating or verifying a proof.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProofPurpose {
    pub term: ProofPurposeTerm,
    /// Expected controller of the verification method, if the caller pins one.
    pub controller: Option<String>,
    pub challenge: Option<String>,
    pub domain: Option<String>,
}

fn string_option(options: &Map<String, Value>, key: &str) -> Result<Option<String>, PurposeError> {
    match options.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.to_owned())),
        Some(_) => Err(PurposeError::InvalidOption(key.to_string())),
    }
}

fn controller_option(options: &Map<String, Value>) -> Result<Option<String>, PurposeError> {
    match options.get("controller") {
        // A controller document may be supplied in place of its id.
        Some(Value::Object(doc)) => match doc.get("id") {
            Some(Value::String(id)) => Ok(Some(id.to_owned())),
            _ => Err(PurposeError::InvalidOption("controller".to_string())),
        },
        _ => string_option(options, "controller"),
    }
}

impl ProofPurpose {
    /// Builds an `assertionMethod` purpose. Options may pin an expected `controller`.
    pub fn assertion(options: &Map<String, Value>) -> Result<Self, PurposeError> {
        Ok(Self {
            term: ProofPurposeTerm::AssertionMethod,
            controller: controller_option(options)?,
            challenge: None,
            domain: None,
        })
    }

    /// Builds an `authentication` purpose. A `challenge` option is required, `domain` is optional.
    pub fn authentication(options: &Map<String, Value>) -> Result<Self, PurposeError> {
        let challenge = string_option(options, "challenge")?.ok_or(PurposeError::MissingChallenge)?;
        Ok(Self {
            term: ProofPurposeTerm::Authentication,
            controller: controller_option(options)?,
            challenge: Some(challenge),
            domain: string_option(options, "domain")?,
        })
    }

    /// Writes the purpose members into a proof under construction.
    pub fn update(&self, proof: &mut Map<String, Value>) {
        proof.insert("proofPurpose".to_string(), Value::from(self.term.as_str()));
        if let Some(challenge) = &self.challenge {
            proof.insert("challenge".to_string(), Value::from(challenge.as_str()));
        }
        if let Some(domain) = &self.domain {
            proof.insert("domain".to_string(), Value::from(domain.as_str()));
        }
    }

    /// Returns `true` if the proof declares this purpose's term.
    pub fn matches(&self, proof: &Map<String, Value>) -> bool {
        proof.get("proofPurpose").and_then(Value::as_str) == Some(self.term.as_str())
    }

    /// Checks that `proof` was created for this purpose by a verification method its controller
    /// authorises for the purpose term.
    ///
    /// `controller_document` is the DID document of the verification method's controller.
    pub fn validate(
        &self,
        proof: &Map<String, Value>,
        verification_method: &str,
        controller_document: &Value,
    ) -> Result<(), PurposeError> {
        if !self.matches(proof) {
            return Err(PurposeError::MismatchedPurpose {
                expected: self.term,
                found: proof
                    .get("proofPurpose")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
            });
        }
        if let Some(expected) = &self.challenge {
            if proof.get("challenge").and_then(Value::as_str) != Some(expected.as_str()) {
                return Err(PurposeError::MismatchedChallenge);
            }
        }
        if let Some(expected) = &self.domain {
            if proof.get("domain").and_then(Value::as_str) != Some(expected.as_str()) {
                return Err(PurposeError::MismatchedDomain);
            }
        }

        let controller_id = controller_document
            .get("id")
            .and_then(Value::as_str)
            .unwrap_or_default();
        if let Some(expected) = &self.controller {
            if normalize_did(expected) != normalize_did(controller_id) {
                return Err(PurposeError::MismatchedController {
                    expected: expected.to_owned(),
                    found: controller_id.to_string(),
                });
            }
        }

        let authorized = controller_document
            .get(self.term.as_str())
            .and_then(Value::as_array)
            .map(|entries| {
                entries.iter().any(|entry| {
                    let reference = match entry {
                        Value::String(reference) => Some(reference.as_str()),
                        Value::Object(method) => method.get("id").and_then(Value::as_str),
                        _ => None,
                    };
                    reference.map(|r| resolve_reference(controller_id, r))
                        == Some(resolve_reference(controller_id, verification_method))
                })
            })
            .unwrap_or(false);
        if !authorized {
            return Err(PurposeError::UnauthorizedVerificationMethod(
                verification_method.to_string(),
                self.term,
            ));
        }
        Ok(())
    }
}
