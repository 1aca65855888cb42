//! Signature suite interfaces.
//!
//! A suite performs canonicalization-aware signing and verification for one cryptographic scheme.
//! Suites, and the resolvers that produce them, are supplied by the caller: this crate never
//! constructs key material or signatures itself.
use crate::loader::{DocumentLoader, LoaderError};
use crate::purpose::{ProofPurpose, ProofPurposeTerm, PurposeError};
use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

/// An error relating to a signature suite or its resolution.
#[derive(Error, Debug)]
pub enum SuiteError {
    /// The canonicalizer met a term that no `@context` entry defines.
    #[error("The property \"{0}\" is not defined in any @context.")]
    UndefinedTerm(String),
    /// No suite exists for the proof type.
    #[error("Unsupported proof type: {0}")]
    UnsupportedProofType(String),
    /// Key material could not be used.
    #[error("Invalid key: {0}")]
    InvalidKey(String),
    /// Verification method could not be resolved.
    #[error("Verification method not found: {0}")]
    VerificationMethodNotFound(String),
    /// Wrapped document loader error.
    #[error("A wrapped document loader error: {0}")]
    Loader(LoaderError),
    /// Wrapped proof purpose error.
    #[error("A wrapped proof purpose error: {0}")]
    Purpose(PurposeError),
    /// Wrapped serialization error.
    #[error("A wrapped serialization error: {0}")]
    Serialization(serde_json::Error),
    /// Any other suite failure.
    #[error("{0}")]
    Other(String),
}

impl From<LoaderError> for SuiteError {
    fn from(err: LoaderError) -> Self {
        SuiteError::Loader(err)
    }
}

impl From<PurposeError> for SuiteError {
    fn from(err: PurposeError) -> Self {
        SuiteError::Purpose(err)
    }
}

impl From<serde_json::Error> for SuiteError {
    fn from(err: serde_json::Error) -> Self {
        SuiteError::Serialization(err)
    }
}

/// Outcome of a suite verification that ran to completion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuiteVerification {
    pub verified: bool,
    pub errors: Vec<String>,
}

impl SuiteVerification {
    pub fn verified() -> Self {
        Self {
            verified: true,
            errors: vec![],
        }
    }

    pub fn failed(error: &str) -> Self {
        Self {
            verified: false,
            errors: vec![error.to_string()],
        }
    }
}

/// A signature suite instance.
#[async_trait]
pub trait Suite: Send + Sync {
    /// Creates a proof over `document` for `purpose`, returning the document with its `proof`.
    async fn sign(
        &self,
        document: Map<String, Value>,
        purpose: &ProofPurpose,
        loader: &dyn DocumentLoader,
    ) -> Result<Map<String, Value>, SuiteError>;

    /// Verifies the `proof` embedded in `document` against `purpose`.
    async fn verify(
        &self,
        document: &Map<String, Value>,
        purpose: &ProofPurpose,
        loader: &dyn DocumentLoader,
    ) -> Result<SuiteVerification, SuiteError>;
}

/// Parameters for obtaining a signing suite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignSuiteOptions {
    pub controller: String,
    pub key_id: String,
    pub private_key: String,
    pub public_key: Option<String>,
}

/// Parameters for obtaining a verification suite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifySuiteOptions {
    pub verification_method: String,
    pub controller: String,
    pub proof_type: String,
}

/// Parameters for obtaining proof purpose options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProofPurposeRequest {
    Sign {
        controller: String,
        key_id: String,
    },
    Verify {
        verification_method: String,
        controller: String,
        proof_purpose: ProofPurposeTerm,
    },
}

/// Resolves a suite capable of signing with the given key.
#[async_trait]
pub trait GetSignSuite: Send + Sync {
    async fn sign_suite(&self, options: SignSuiteOptions) -> Result<Box<dyn Suite>, SuiteError>;
}

/// Resolves a suite capable of verifying a proof made by the given verification method.
#[async_trait]
pub trait GetVerifySuite: Send + Sync {
    async fn verify_suite(&self, options: VerifySuiteOptions)
        -> Result<Box<dyn Suite>, SuiteError>;
}

/// Provides options (controller, challenge, domain) for building a proof purpose.
#[async_trait]
pub trait GetProofPurposeOptions: Send + Sync {
    async fn proof_purpose_options(
        &self,
        request: ProofPurposeRequest,
    ) -> Result<Map<String, Value>, SuiteError>;
}

/// Proof purpose options fixed up front, such as a verifier's challenge and domain.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StaticProofPurposeOptions(pub Map<String, Value>);

impl StaticProofPurposeOptions {
    /// Options binding a presentation proof to `challenge` and `domain`.
    pub fn challenge_and_domain(challenge: &str, domain: &str) -> Self {
        let mut options = Map::new();
        options.insert("challenge".to_string(), Value::from(challenge));
        options.insert("domain".to_string(), Value::from(domain));
        Self(options)
    }
}

#[async_trait]
impl GetProofPurposeOptions for StaticProofPurposeOptions {
    async fn proof_purpose_options(
        &self,
        _request: ProofPurposeRequest,
    ) -> Result<Map<String, Value>, SuiteError> {
        Ok(self.0.clone())
    }
}
