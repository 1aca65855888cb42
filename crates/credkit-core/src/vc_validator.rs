//! Verification of signed credentials: field rules plus proof verification.
use crate::loader::DocumentLoader;
use crate::purpose::{ProofPurpose, ProofPurposeTerm};
use crate::suite::{GetProofPurposeOptions, GetVerifySuite, ProofPurposeRequest, VerifySuiteOptions};
use crate::validation::{
    all_of, check, gen_validate_fn, is_absolute_uri, is_array_including, is_array_of,
    is_date_time, is_enum, is_non_empty_string, is_one_of, is_one_or_many_of, is_type_of,
    is_undefined_or, join_errors, nested, starts_with, Check, FieldValidator, JsonType,
    ValidateFn, ValidationResult, Validator, ValidatorError,
};
use crate::vc::Credential;
use crate::{CREDENTIAL_TYPE, DID_PREFIX};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::debug;
use serde_json::{json, Map, Value};
use std::sync::Arc;

/// `@context`: a non-empty string or an inline context object, or a non-empty array of such.
pub(crate) fn context_rule() -> FieldValidator {
    is_one_or_many_of(is_one_of(vec![
        is_non_empty_string(),
        is_type_of(&[JsonType::Object]),
    ]))
}

/// `type`: a non-empty array of non-empty strings including `required`.
pub(crate) fn type_rules(required: &str) -> Vec<FieldValidator> {
    vec![
        is_array_of(is_non_empty_string()),
        is_array_including(json!(required)),
    ]
}

pub(crate) fn did_rules() -> Vec<FieldValidator> {
    vec![is_non_empty_string(), starts_with(DID_PREFIX)]
}

pub(crate) fn holder_schema() -> ValidateFn {
    gen_validate_fn(vec![("id", did_rules())])
}

fn subject_schema() -> ValidateFn {
    let thing = gen_validate_fn(vec![(
        "@type",
        vec![is_one_or_many_of(is_non_empty_string())],
    )]);
    gen_validate_fn(vec![
        ("id", vec![is_undefined_or(starts_with(DID_PREFIX))]),
        ("data", vec![nested(thing)]),
    ])
}

fn revocation_schema() -> ValidateFn {
    gen_validate_fn(vec![("id", vec![is_non_empty_string()])])
}

/// Exactly one of `jws` and `proofValue` is present.
fn signature_presence() -> FieldValidator {
    check(|_, proof| match (proof.get("jws"), proof.get("proofValue")) {
        (Some(_), None) | (None, Some(_)) => Check::Valid,
        _ => Check::invalid("Expected exactly one of \"jws\" and \"proofValue\""),
    })
}

/// Structural rules for a proof of the given purpose.
pub(crate) fn proof_schema(term: ProofPurposeTerm) -> ValidateFn {
    let mut fields = vec![
        ("type", vec![is_non_empty_string()]),
        ("created", vec![is_non_empty_string(), is_date_time()]),
        ("proofPurpose", vec![is_enum(vec![json!(term.as_str())])]),
        ("verificationMethod", did_rules()),
        (
            "jws",
            vec![signature_presence(), is_undefined_or(is_non_empty_string())],
        ),
        ("proofValue", vec![is_undefined_or(is_non_empty_string())]),
    ];
    if term == ProofPurposeTerm::Authentication {
        fields.push(("challenge", vec![is_non_empty_string()]));
        fields.push(("domain", vec![is_non_empty_string()]));
    }
    gen_validate_fn(fields)
}

fn not_expired(now: DateTime<Utc>) -> FieldValidator {
    check(move |value, record| {
        let expiration_date = match value
            .and_then(Value::as_str)
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        {
            Some(date) => date.with_timezone(&Utc),
            // Presence and format have their own rules.
            None => return Check::Valid,
        };
        if expiration_date < now {
            let id = record.get("id").and_then(Value::as_str).unwrap_or_default();
            Check::invalid(format!("Credential is expired: {id}"))
        } else {
            Check::Valid
        }
    })
}

fn proof_error(err: impl std::fmt::Display) -> ValidatorError {
    ValidatorError(format!("Error while validating proof: {err}"))
}

/// Verifies the proof of the whole record through a caller-resolved suite.
pub(crate) struct ProofVerifier {
    pub(crate) loader: Arc<dyn DocumentLoader>,
    pub(crate) get_verify_suite: Arc<dyn GetVerifySuite>,
    pub(crate) get_proof_purpose_options: Option<Arc<dyn GetProofPurposeOptions>>,
    pub(crate) term: ProofPurposeTerm,
    /// Reads the expected controller (issuer or holder) from the record.
    pub(crate) controller: fn(&Value) -> Option<&str>,
    pub(crate) challenge: Option<String>,
    pub(crate) domain: Option<String>,
}

impl ProofVerifier {
    fn label(&self) -> &'static str {
        match self.term {
            ProofPurposeTerm::AssertionMethod => "credential",
            ProofPurposeTerm::Authentication => "presentation",
        }
    }

    fn purpose(
        &self,
        mut options: Map<String, Value>,
        controller: &str,
        proof: &Map<String, Value>,
    ) -> Result<ProofPurpose, ValidatorError> {
        if !controller.is_empty() {
            options
                .entry("controller")
                .or_insert_with(|| Value::from(controller));
        }
        let purpose = match self.term {
            ProofPurposeTerm::AssertionMethod => ProofPurpose::assertion(&options),
            ProofPurposeTerm::Authentication => {
                for (key, expected) in [("challenge", &self.challenge), ("domain", &self.domain)] {
                    match expected {
                        Some(expected) => {
                            options.insert(key.to_string(), Value::from(expected.as_str()));
                        }
                        None => {
                            if !options.contains_key(key) {
                                if let Some(value) = proof.get(key) {
                                    options.insert(key.to_string(), value.clone());
                                }
                            }
                        }
                    }
                }
                ProofPurpose::authentication(&options)
            }
        };
        purpose.map_err(proof_error)
    }
}

#[async_trait]
impl Validator for ProofVerifier {
    async fn validate(&self, value: Option<&Value>, record: &Value) -> Result<Check, ValidatorError> {
        let (proof, document) = match (value, record) {
            (Some(Value::Object(proof)), Value::Object(document)) => (proof, document),
            _ => return Ok(Check::invalid("Expected an object")),
        };
        let verification_method = proof
            .get("verificationMethod")
            .and_then(Value::as_str)
            .unwrap_or_default();
        let proof_type = proof.get("type").and_then(Value::as_str).unwrap_or_default();
        let controller = (self.controller)(record).unwrap_or_default();
        debug!(
            "Verifying {} proof by {} ({})",
            self.label(),
            verification_method,
            proof_type
        );

        let suite = self
            .get_verify_suite
            .verify_suite(VerifySuiteOptions {
                verification_method: verification_method.to_string(),
                controller: controller.to_string(),
                proof_type: proof_type.to_string(),
            })
            .await
            .map_err(proof_error)?;
        let options = match &self.get_proof_purpose_options {
            Some(provider) => provider
                .proof_purpose_options(ProofPurposeRequest::Verify {
                    verification_method: verification_method.to_string(),
                    controller: controller.to_string(),
                    proof_purpose: self.term,
                })
                .await
                .map_err(proof_error)?,
            None => Map::new(),
        };
        let purpose = self.purpose(options, controller, proof)?;

        let errors = match suite.verify(document, &purpose, self.loader.as_ref()).await {
            Ok(result) if result.verified => return Ok(Check::Valid),
            Ok(result) => result.errors,
            Err(err) => vec![err.to_string()],
        };
        Ok(Check::invalid(format!(
            "Invalid {} proof:\n{}",
            self.label(),
            errors.join("\n")
        )))
    }
}

fn issuer_of(record: &Value) -> Option<&str> {
    record.get("issuer").and_then(Value::as_str)
}

/// Validates signed credentials.
#[derive(Clone)]
pub struct CredentialValidator {
    loader: Arc<dyn DocumentLoader>,
    get_verify_suite: Arc<dyn GetVerifySuite>,
    get_proof_purpose_options: Option<Arc<dyn GetProofPurposeOptions>>,
    now: Option<DateTime<Utc>>,
}

impl CredentialValidator {
    pub fn new(loader: Arc<dyn DocumentLoader>, get_verify_suite: Arc<dyn GetVerifySuite>) -> Self {
        Self {
            loader,
            get_verify_suite,
            get_proof_purpose_options: None,
            now: None,
        }
    }

    /// Supplies options for the `assertionMethod` proof purpose.
    pub fn with_proof_purpose_options(
        mut self,
        get_proof_purpose_options: Arc<dyn GetProofPurposeOptions>,
    ) -> Self {
        self.get_proof_purpose_options = Some(get_proof_purpose_options);
        self
    }

    /// Fixes the time expiry is checked against (the current time by default).
    pub fn with_now(mut self, now: DateTime<Utc>) -> Self {
        self.now = Some(now);
        self
    }

    fn validate_fn(&self) -> ValidateFn {
        let now = self.now.unwrap_or_else(Utc::now);
        let verifier = ProofVerifier {
            loader: self.loader.clone(),
            get_verify_suite: self.get_verify_suite.clone(),
            get_proof_purpose_options: self.get_proof_purpose_options.clone(),
            term: ProofPurposeTerm::AssertionMethod,
            controller: issuer_of,
            challenge: None,
            domain: None,
        };
        gen_validate_fn(vec![
            ("@context", vec![context_rule()]),
            ("id", vec![is_non_empty_string(), is_absolute_uri()]),
            ("type", type_rules(CREDENTIAL_TYPE)),
            ("holder", vec![nested(holder_schema())]),
            ("issuer", did_rules()),
            ("issuanceDate", vec![is_non_empty_string(), is_date_time()]),
            (
                "expirationDate",
                vec![
                    is_undefined_or(is_non_empty_string()),
                    is_undefined_or(is_date_time()),
                    not_expired(now),
                ],
            ),
            ("credentialSubject", vec![is_one_or_many_of(nested(subject_schema()))]),
            ("revocation", vec![is_undefined_or(nested(revocation_schema()))]),
            (
                "proof",
                vec![all_of(vec![
                    nested(proof_schema(ProofPurposeTerm::AssertionMethod)),
                    Arc::new(verifier) as FieldValidator,
                ])],
            ),
        ])
    }

    /// Validates `data` as a signed credential.
    pub async fn validate(&self, data: &Value) -> ValidationResult<Credential> {
        debug!(
            "Validating credential {}",
            data.get("id").and_then(Value::as_str).unwrap_or_default()
        );
        self.validate_fn().validate(data).await.parse("credential")
    }
}

/// A credential validator nested in a larger record folds its errors into one message.
#[async_trait]
impl Validator for CredentialValidator {
    async fn validate(&self, value: Option<&Value>, _record: &Value) -> Result<Check, ValidatorError> {
        let value = match value {
            Some(value @ Value::Object(_)) => value,
            _ => return Ok(Check::invalid("Expected an object")),
        };
        Ok(match CredentialValidator::validate(self, value).await {
            ValidationResult::Valid { .. } => Check::Valid,
            ValidationResult::Invalid { errors } => Check::invalid(join_errors(&errors)),
        })
    }
}
