//! Verification of signed presentations, their embedded credentials and holder binding.
use crate::loader::DocumentLoader;
use crate::purpose::ProofPurposeTerm;
use crate::suite::{GetProofPurposeOptions, GetVerifySuite};
use crate::utils::normalize_did;
use crate::validation::{
    all_of, gen_validate_fn, is_absolute_uri, is_array_of_or_empty, is_non_empty_string,
    is_undefined_or, nested, Check, FieldValidator, ValidateFn, ValidationResult, Validator,
    ValidatorError,
};
use crate::vc_validator::{
    context_rule, holder_schema, proof_schema, type_rules, CredentialValidator, ProofVerifier,
};
use crate::vp::Presentation;
use crate::PRESENTATION_TYPE;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::{stream, StreamExt};
use log::debug;
use serde_json::Value;
use std::sync::Arc;

/// Default number of embedded credentials verified at once.
pub const DEFAULT_CONCURRENCY_LIMIT: usize = 5;

fn holder_of(record: &Value) -> Option<&str> {
    record
        .get("holder")
        .and_then(|holder| holder.get("id"))
        .and_then(Value::as_str)
}

/// Validates each embedded credential, at most `limit` at a time.
struct EmbeddedCredentials {
    validator: CredentialValidator,
    limit: usize,
}

#[async_trait]
impl Validator for EmbeddedCredentials {
    async fn validate(&self, value: Option<&Value>, record: &Value) -> Result<Check, ValidatorError> {
        let credentials = match value {
            Some(Value::Array(credentials)) if !credentials.is_empty() => credentials,
            Some(Value::Array(_)) => return Ok(Check::invalid("Expected a non-empty array")),
            _ => return Ok(Check::invalid("Expected an array")),
        };
        let pending: Vec<_> = credentials
            .iter()
            .map(|credential| Validator::validate(&self.validator, Some(credential), record))
            .collect();
        let checks: Vec<Result<Check, ValidatorError>> = stream::iter(pending)
            .buffered(self.limit.max(1))
            .collect()
            .await;

        let mut messages = vec![];
        for (index, check) in checks.into_iter().enumerate() {
            match check {
                Ok(Check::Valid) => {}
                Ok(Check::Invalid { message }) => messages.push(format!("[{index}] {message}")),
                Err(err) => messages.push(format!("[{index}] {err}")),
            }
        }
        if messages.is_empty() {
            Ok(Check::Valid)
        } else {
            Ok(Check::invalid(messages.join("\n")))
        }
    }
}

/// Every embedded credential is held by the presentation's holder, compared as bare DIDs.
struct HolderBinding;

#[async_trait]
impl Validator for HolderBinding {
    async fn validate(&self, value: Option<&Value>, record: &Value) -> Result<Check, ValidatorError> {
        let (credentials, holder) = match (value, holder_of(record)) {
            (Some(Value::Array(credentials)), Some(holder)) => (credentials, normalize_did(holder)),
            // Shapes are checked by the structural rules.
            _ => return Ok(Check::Valid),
        };
        let messages: Vec<String> = credentials
            .iter()
            .filter(|credential| {
                holder_of(credential).map_or(false, |id| normalize_did(id) != holder)
            })
            .map(|credential| {
                format!(
                    "Credential {} has a different holder than the VP",
                    credential
                        .get("id")
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                )
            })
            .collect();
        if messages.is_empty() {
            Ok(Check::Valid)
        } else {
            Ok(Check::invalid(messages.join("\n")))
        }
    }
}

struct Descriptor;

#[async_trait]
impl Validator for Descriptor {
    async fn validate(&self, value: Option<&Value>, record: &Value) -> Result<Check, ValidatorError> {
        let schema = descriptor_schema();
        <ValidateFn as Validator>::validate(&schema, value, record).await
    }
}

fn descriptor_schema() -> ValidateFn {
    gen_validate_fn(vec![
        ("id", vec![is_non_empty_string()]),
        ("format", vec![is_non_empty_string()]),
        ("path", vec![is_non_empty_string()]),
        ("path_nested", vec![is_undefined_or(Arc::new(Descriptor))]),
    ])
}

fn submission_schema() -> ValidateFn {
    gen_validate_fn(vec![
        ("id", vec![is_non_empty_string()]),
        ("definition_id", vec![is_non_empty_string()]),
        ("descriptor_map", vec![is_array_of_or_empty(Arc::new(Descriptor))]),
    ])
}

/// Validates signed presentations.
pub struct PresentationValidator {
    loader: Arc<dyn DocumentLoader>,
    get_verify_suite: Arc<dyn GetVerifySuite>,
    get_proof_purpose_options: Option<Arc<dyn GetProofPurposeOptions>>,
    challenge: Option<String>,
    domain: Option<String>,
    now: Option<DateTime<Utc>>,
    concurrency_limit: usize,
}

impl PresentationValidator {
    pub fn new(loader: Arc<dyn DocumentLoader>, get_verify_suite: Arc<dyn GetVerifySuite>) -> Self {
        Self {
            loader,
            get_verify_suite,
            get_proof_purpose_options: None,
            challenge: None,
            domain: None,
            now: None,
            concurrency_limit: DEFAULT_CONCURRENCY_LIMIT,
        }
    }

    /// Supplies options for the proof purposes of the presentation and its credentials.
    pub fn with_proof_purpose_options(
        mut self,
        get_proof_purpose_options: Arc<dyn GetProofPurposeOptions>,
    ) -> Self {
        self.get_proof_purpose_options = Some(get_proof_purpose_options);
        self
    }

    /// Requires the presentation proof to carry `challenge`, instead of trusting its own.
    pub fn with_challenge(mut self, challenge: &str) -> Self {
        self.challenge = Some(challenge.to_string());
        self
    }

    /// Requires the presentation proof to carry `domain`, instead of trusting its own.
    pub fn with_domain(mut self, domain: &str) -> Self {
        self.domain = Some(domain.to_string());
        self
    }

    /// Fixes the time credential expiry is checked against.
    pub fn with_now(mut self, now: DateTime<Utc>) -> Self {
        self.now = Some(now);
        self
    }

    pub fn with_concurrency_limit(mut self, concurrency_limit: usize) -> Self {
        self.concurrency_limit = concurrency_limit;
        self
    }

    fn credential_validator(&self) -> CredentialValidator {
        let mut validator = CredentialValidator::new(self.loader.clone(), self.get_verify_suite.clone());
        if let Some(provider) = &self.get_proof_purpose_options {
            validator = validator.with_proof_purpose_options(provider.clone());
        }
        match self.now {
            Some(now) => validator.with_now(now),
            None => validator,
        }
    }

    fn validate_fn(&self) -> ValidateFn {
        let verifier = ProofVerifier {
            loader: self.loader.clone(),
            get_verify_suite: self.get_verify_suite.clone(),
            get_proof_purpose_options: self.get_proof_purpose_options.clone(),
            term: ProofPurposeTerm::Authentication,
            controller: holder_of,
            challenge: self.challenge.clone(),
            domain: self.domain.clone(),
        };
        let credentials = EmbeddedCredentials {
            validator: self.credential_validator(),
            limit: self.concurrency_limit,
        };
        gen_validate_fn(vec![
            ("@context", vec![context_rule()]),
            ("id", vec![is_undefined_or(is_absolute_uri())]),
            ("type", type_rules(PRESENTATION_TYPE)),
            ("holder", vec![nested(holder_schema())]),
            (
                "verifiableCredential",
                vec![
                    Arc::new(credentials) as FieldValidator,
                    Arc::new(HolderBinding),
                ],
            ),
            (
                "presentation_submission",
                vec![is_undefined_or(nested(submission_schema()))],
            ),
            (
                "proof",
                vec![all_of(vec![
                    nested(proof_schema(ProofPurposeTerm::Authentication)),
                    Arc::new(verifier) as FieldValidator,
                ])],
            ),
        ])
    }

    /// Validates `data` as a signed presentation.
    pub async fn validate(&self, data: &Value) -> ValidationResult<Presentation> {
        debug!(
            "Validating presentation by {}",
            holder_of(data).unwrap_or_default()
        );
        self.validate_fn().validate(data).await.parse("presentation")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::TEST_SIGNED_PRESENTATION;
    use crate::loader::StaticDocumentLoader;
    use crate::purpose::ProofPurpose;
    use crate::suite::{Suite, SuiteError, SuiteVerification, VerifySuiteOptions};
    use crate::validation::{ErrorConfig, ErrorKind};
    use crate::vc_validator::tests::{SubjectSuite, SubjectSuiteProvider};
    use chrono::TimeZone;
    use serde_json::{json, Map};

    fn presentation() -> Value {
        serde_json::from_str(TEST_SIGNED_PRESENTATION).unwrap()
    }

    fn validator() -> PresentationValidator {
        let suite = SubjectSuite {
            signed: vec![presentation()["verifiableCredential"][0]["credentialSubject"].clone()],
        };
        PresentationValidator::new(
            Arc::new(StaticDocumentLoader::new()),
            Arc::new(SubjectSuiteProvider(suite)),
        )
        .with_now(Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap())
    }

    /// Verifies only proofs whose purpose binds the expected challenge and domain.
    struct BoundPurposeSuite;

    #[async_trait]
    impl Suite for BoundPurposeSuite {
        async fn sign(
            &self,
            document: Map<String, Value>,
            _purpose: &ProofPurpose,
            _loader: &dyn DocumentLoader,
        ) -> Result<Map<String, Value>, SuiteError> {
            Ok(document)
        }

        async fn verify(
            &self,
            document: &Map<String, Value>,
            purpose: &ProofPurpose,
            _loader: &dyn DocumentLoader,
        ) -> Result<SuiteVerification, SuiteError> {
            let proof = document
                .get("proof")
                .and_then(Value::as_object)
                .cloned()
                .unwrap_or_default();
            let bound = |key: &str, expected: &Option<String>| match expected {
                Some(expected) => proof.get(key).and_then(Value::as_str) == Some(expected.as_str()),
                None => true,
            };
            if bound("challenge", &purpose.challenge) && bound("domain", &purpose.domain) {
                Ok(SuiteVerification::verified())
            } else {
                Ok(SuiteVerification::failed("The challenge or domain is not as expected."))
            }
        }
    }

    struct BoundPurposeSuiteProvider;

    #[async_trait]
    impl GetVerifySuite for BoundPurposeSuiteProvider {
        async fn verify_suite(
            &self,
            _options: VerifySuiteOptions,
        ) -> Result<Box<dyn Suite>, SuiteError> {
            Ok(Box::new(BoundPurposeSuite))
        }
    }

    #[tokio::test]
    async fn test_valid_presentation() {
        match validator().validate(&presentation()).await {
            ValidationResult::Valid { data } => {
                assert_eq!(data.holder(), "did:example:holder");
                assert_eq!(data.credentials().len(), 1);
            }
            ValidationResult::Invalid { errors } => panic!("unexpected errors: {errors:?}"),
        }
    }

    #[tokio::test]
    async fn test_different_holder() {
        let mut vp = presentation();
        vp["holder"]["id"] = json!("did:example:other");
        vp["proof"]["verificationMethod"] = json!("did:example:other#key-1");
        let result = validator().validate(&vp).await;
        assert_eq!(
            result.errors(),
            &[ErrorConfig::invalid_param(
                "verifiableCredential",
                "Credential urn:uuid:4b7a9c1e-3f2d-4e8a-9b6c-1d2e3f4a5b6c has a different holder than the VP"
            )]
        );
    }

    #[tokio::test]
    async fn test_long_form_holder() {
        let mut vp = presentation();
        vp["holder"]["id"] = json!("did:ion:EiAbc?-ion-initial-state=eyJkZWx0YSI6e319");
        vp["verifiableCredential"][0]["holder"]["id"] = json!("did:ion:EiAbc");
        vp["verifiableCredential"][0]["credentialSubject"]["id"] = json!("did:ion:EiAbc");
        let suite = SubjectSuite {
            signed: vec![vp["verifiableCredential"][0]["credentialSubject"].clone()],
        };
        let validator = PresentationValidator::new(
            Arc::new(StaticDocumentLoader::new()),
            Arc::new(SubjectSuiteProvider(suite)),
        )
        .with_now(Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap());
        assert!(validator.validate(&vp).await.is_valid());

        // Initial state carried as a DID parameter.
        vp["holder"]["id"] = json!("did:ion:EiAbc;ion:initial-state=eyJkZWx0YSI6e319");
        assert!(validator.validate(&vp).await.is_valid());
    }

    #[tokio::test]
    async fn test_invalid_embedded_credential() {
        let mut vp = presentation();
        vp["verifiableCredential"][0]["issuer"] = json!("");
        let result = validator().validate(&vp).await;
        assert_eq!(result.errors().len(), 1);
        assert_eq!(result.errors()[0].key, "verifiableCredential");
        assert_eq!(
            result.errors()[0].message,
            "[0] issuer: Expected non empty string\nissuer: Expected to start with \"did:\""
        );
    }

    #[tokio::test]
    async fn test_tampered_embedded_credential() {
        let mut vp = presentation();
        vp["verifiableCredential"][0]["credentialSubject"]["data"]["familyName"] = json!("Roe");
        let result = validator().validate(&vp).await;
        assert_eq!(
            result.errors(),
            &[ErrorConfig::invalid_param(
                "verifiableCredential",
                "[0] proof: Invalid credential proof:\nInvalid signature."
            )]
        );
    }

    #[tokio::test]
    async fn test_proof_rules() {
        let mut vp = presentation();
        vp["proof"]["proofPurpose"] = json!("assertionMethod");
        let result = validator().validate(&vp).await;
        assert_eq!(
            result.errors(),
            &[ErrorConfig::invalid_param(
                "proof",
                "proofPurpose: Expected one of: \"authentication\""
            )]
        );

        let mut vp = presentation();
        vp["proof"].as_object_mut().unwrap().remove("challenge");
        vp["proof"]["domain"] = json!("");
        let result = validator().validate(&vp).await;
        assert_eq!(
            result.errors(),
            &[ErrorConfig::invalid_param(
                "proof",
                "challenge: Expected non empty string\ndomain: Expected non empty string"
            )]
        );
    }

    #[tokio::test]
    async fn test_challenge_override() {
        let validator = |challenge: &str| {
            PresentationValidator::new(
                Arc::new(StaticDocumentLoader::new()),
                Arc::new(BoundPurposeSuiteProvider),
            )
            .with_now(Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap())
            .with_challenge(challenge)
            .with_domain("verifier.example.com")
        };
        assert!(validator("challenge-123")
            .validate(&presentation())
            .await
            .is_valid());

        let result = validator("challenge-456").validate(&presentation()).await;
        assert_eq!(
            result.errors(),
            &[ErrorConfig::invalid_param(
                "proof",
                "Invalid presentation proof:\nThe challenge or domain is not as expected."
            )]
        );
    }

    #[tokio::test]
    async fn test_structural_rules() {
        let mut vp = presentation();
        vp["id"] = json!("presentation-1");
        vp["type"] = json!(["VerifiableCredential"]);
        vp["presentation_submission"]["descriptor_map"][0]["path"] = json!("");
        let result = validator().validate(&vp).await;
        let keys: Vec<&str> = result.errors().iter().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, vec!["id", "type", "presentation_submission"]);
        assert_eq!(
            result.errors()[2].message,
            "descriptor_map: [0] path: Expected non empty string"
        );
        assert!(result
            .errors()
            .iter()
            .all(|e| e.kind == ErrorKind::InvalidParam));

        let mut vp = presentation();
        vp["verifiableCredential"] = json!([]);
        let result = validator().validate(&vp).await;
        assert_eq!(
            result.errors(),
            &[ErrorConfig::invalid_param(
                "verifiableCredential",
                "Expected a non-empty array"
            )]
        );
    }

    #[tokio::test]
    async fn test_concurrency_limit_preserves_order() {
        let mut vp = presentation();
        let credential = vp["verifiableCredential"][0].clone();
        let mut expired = credential.clone();
        expired["expirationDate"] = json!("2024-01-02T00:00:00Z");
        vp["verifiableCredential"] = json!([credential.clone(), expired, credential]);
        let result = validator().with_concurrency_limit(1).validate(&vp).await;
        assert_eq!(
            result.errors(),
            &[ErrorConfig::invalid_param(
                "verifiableCredential",
                "[1] expirationDate: Credential is expired: urn:uuid:4b7a9c1e-3f2d-4e8a-9b6c-1d2e3f4a5b6c"
            )]
        );
    }
}
