//! The `EcdsaSecp256k1Signature2019` suite and its provider.
use crate::jws::{detached_sign, detached_verify, JwsError};
use crate::key::{signing_key, verifying_key};
use crate::PROOF_TYPE;
use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use credkit_core::loader::DocumentLoader;
use credkit_core::purpose::ProofPurpose;
use credkit_core::suite::{
    GetSignSuite, GetVerifySuite, SignSuiteOptions, Suite, SuiteError, SuiteVerification,
    VerifySuiteOptions,
};
use credkit_core::utils::{normalize_did, resolve_reference};
use k256::ecdsa::SigningKey;
use log::debug;
use serde_json::{Map, Value};

impl From<JwsError> for SuiteError {
    fn from(err: JwsError) -> Self {
        SuiteError::Other(err.to_string())
    }
}

/// Canonical signing payload: the document without its proof, then the proof without its JWS.
fn payload(
    document: &Map<String, Value>,
    proof: &Map<String, Value>,
) -> Result<Vec<u8>, SuiteError> {
    let mut document = document.clone();
    document.remove("proof");
    let mut proof = proof.clone();
    proof.remove("jws");
    let mut payload = serde_jcs::to_vec(&document)?;
    payload.extend(serde_jcs::to_vec(&proof)?);
    Ok(payload)
}

/// Finds the verification method `id` in a controller document.
fn find_verification_method<'a>(
    controller_document: &'a Value,
    id: &str,
) -> Result<&'a Map<String, Value>, SuiteError> {
    let controller_id = controller_document
        .get("id")
        .and_then(Value::as_str)
        .unwrap_or_default();
    controller_document
        .get("verificationMethod")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_object)
        .find(|method| {
            method
                .get("id")
                .and_then(Value::as_str)
                .map(|method_id| resolve_reference(controller_id, method_id))
                == Some(resolve_reference(controller_id, id))
        })
        .ok_or_else(|| SuiteError::VerificationMethodNotFound(id.to_string()))
}

/// Signs and verifies `EcdsaSecp256k1Signature2019` proofs.
pub struct JcsSuite {
    signer: Option<(SigningKey, String)>,
}

impl JcsSuite {
    /// A suite that signs with `key` as verification method `key_id`.
    pub fn signer(key: SigningKey, key_id: &str) -> Self {
        Self {
            signer: Some((key, key_id.to_string())),
        }
    }

    /// A suite that only verifies.
    pub fn verifier() -> Self {
        Self { signer: None }
    }
}

#[async_trait]
impl Suite for JcsSuite {
    async fn sign(
        &self,
        mut document: Map<String, Value>,
        purpose: &ProofPurpose,
        _loader: &dyn DocumentLoader,
    ) -> Result<Map<String, Value>, SuiteError> {
        let (key, key_id) = self
            .signer
            .as_ref()
            .ok_or_else(|| SuiteError::InvalidKey("No signing key.".to_string()))?;
        let mut proof = Map::new();
        proof.insert("type".to_string(), Value::from(PROOF_TYPE));
        proof.insert(
            "created".to_string(),
            Value::from(Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)),
        );
        proof.insert("verificationMethod".to_string(), Value::from(key_id.as_str()));
        purpose.update(&mut proof);

        let jws = detached_sign(&payload(&document, &proof)?, key)?;
        proof.insert("jws".to_string(), Value::from(jws));
        document.insert("proof".to_string(), Value::Object(proof));
        Ok(document)
    }

    async fn verify(
        &self,
        document: &Map<String, Value>,
        purpose: &ProofPurpose,
        loader: &dyn DocumentLoader,
    ) -> Result<SuiteVerification, SuiteError> {
        let proof = match document.get("proof").and_then(Value::as_object) {
            Some(proof) => proof,
            None => return Ok(SuiteVerification::failed("Missing proof.")),
        };
        let jws = match proof.get("jws").and_then(Value::as_str) {
            Some(jws) => jws,
            None => return Ok(SuiteVerification::failed("Missing jws.")),
        };
        let verification_method = proof
            .get("verificationMethod")
            .and_then(Value::as_str)
            .unwrap_or_default();
        debug!("Loading controller document for {verification_method}");
        let controller_document = loader.load(normalize_did(verification_method)).await?.document;
        let method = find_verification_method(&controller_document, verification_method)?;

        if let Err(err) = purpose.validate(proof, verification_method, &controller_document) {
            return Ok(SuiteVerification::failed(&err.to_string()));
        }

        let public_key = method
            .get("publicKeyHex")
            .and_then(Value::as_str)
            .ok_or_else(|| SuiteError::InvalidKey("Missing publicKeyHex.".to_string()))?;
        if detached_verify(jws, &payload(document, proof)?, &verifying_key(public_key)?)? {
            Ok(SuiteVerification::verified())
        } else {
            Ok(SuiteVerification::failed("Invalid signature."))
        }
    }
}

/// Resolves [`JcsSuite`]s for signing and verification.
#[derive(Debug, Clone, Copy, Default)]
pub struct JcsSuiteProvider;

#[async_trait]
impl GetSignSuite for JcsSuiteProvider {
    async fn sign_suite(&self, options: SignSuiteOptions) -> Result<Box<dyn Suite>, SuiteError> {
        let key = signing_key(&options.private_key)?;
        Ok(Box::new(JcsSuite::signer(key, &options.key_id)))
    }
}

#[async_trait]
impl GetVerifySuite for JcsSuiteProvider {
    async fn verify_suite(
        &self,
        options: VerifySuiteOptions,
    ) -> Result<Box<dyn Suite>, SuiteError> {
        if options.proof_type != PROOF_TYPE {
            return Err(SuiteError::UnsupportedProofType(options.proof_type));
        }
        Ok(Box::new(JcsSuite::verifier()))
    }
}
