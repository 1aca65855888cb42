use crate::config::api_config;
use crate::errors::CredkitAPIError;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use credkit_core::context::Context;
use credkit_core::holder;
use credkit_core::issuer;
use credkit_core::loader::DocumentLoader;
use credkit_core::one_or_many::OneOrMany;
use credkit_core::subject::{Signer, Subject};
use credkit_core::suite::{
    GetProofPurposeOptions, GetSignSuite, GetVerifySuite, StaticProofPurposeOptions,
};
use credkit_core::validation::ValidationResult;
use credkit_core::vc::{Credential, CredentialSubject, Revocation};
use credkit_core::vc_validator::CredentialValidator;
use credkit_core::vp::{Presentation, PresentationSubmission};
use credkit_core::vp_validator::PresentationValidator;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;

/// The caller-supplied content of a credential to issue.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CredentialRequest {
    pub id: String,
    pub credential_subject: OneOrMany<CredentialSubject>,
    pub holder: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_: Option<OneOrMany<String>>,
    #[serde(rename = "@context", default, skip_serializing_if = "Option::is_none")]
    pub context: Option<OneOrMany<Context>>,
    pub issuance_date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revocation: Option<Revocation>,
}

/// API for credential functionality.
#[async_trait]
pub trait CredkitVCAPI {
    /// Issues a credential: builds its skeleton, dates it and signs it as `issuer`.
    ///
    /// Without an expiration date, the configured default validity period (if any) applies.
    async fn issue(
        request: CredentialRequest,
        issuer: &Signer,
        loader: &dyn DocumentLoader,
        get_sign_suite: &dyn GetSignSuite,
        get_proof_purpose_options: Option<&dyn GetProofPurposeOptions>,
    ) -> Result<Credential, CredkitAPIError> {
        let skeleton = issuer::build_skeleton(
            &request.id,
            request.credential_subject,
            &request.holder,
            request.type_,
            request.context,
        );
        debug!("Built skeleton for credential {}", skeleton.id);
        let expiration_date = request.expiration_date.or_else(|| {
            api_config()
                .core
                .default_validity_days
                .map(|days| request.issuance_date + Duration::days(days.into()))
        });
        let unsigned = issuer::build_unsigned(
            skeleton,
            request.issuance_date,
            expiration_date,
            request.revocation,
        );
        debug!("Built unsigned credential {}", unsigned.skeleton.id);
        let credential = issuer::build_signed(
            unsigned,
            issuer,
            loader,
            get_sign_suite,
            get_proof_purpose_options,
        )
        .await?;
        info!("Issued credential {} as {}", credential.id(), issuer.did());
        Ok(credential)
    }

    /// Verifies a credential, returning it typed if every rule and its proof hold.
    async fn verify_credential(
        credential: &Value,
        loader: Arc<dyn DocumentLoader>,
        get_verify_suite: Arc<dyn GetVerifySuite>,
    ) -> Result<Credential, CredkitAPIError> {
        match CredentialValidator::new(loader, get_verify_suite)
            .validate(credential)
            .await
        {
            ValidationResult::Valid { data } => Ok(data),
            ValidationResult::Invalid { errors } => Err(CredkitAPIError::InvalidCredential(errors)),
        }
    }
}

/// API for presentation functionality.
#[async_trait]
pub trait CredkitVPAPI {
    /// Presents credentials as `holder`, binding the proof to a verifier's challenge and domain.
    ///
    /// `credentials` are the signed credential objects as received; they are embedded unchanged.
    #[allow(clippy::too_many_arguments)]
    async fn present(
        credentials: Vec<Map<String, Value>>,
        holder: &Signer,
        id: Option<&str>,
        presentation_submission: Option<PresentationSubmission>,
        challenge: &str,
        domain: &str,
        loader: &dyn DocumentLoader,
        get_sign_suite: &dyn GetSignSuite,
    ) -> Result<Presentation, CredkitAPIError> {
        let built = holder::build_unsigned(
            credentials,
            holder.did(),
            None,
            None,
            id,
            presentation_submission,
        );
        for warning in &built.warnings {
            warn!("{warning}");
        }
        let presentation = holder::build_signed(
            built.presentation,
            holder,
            loader,
            get_sign_suite,
            &StaticProofPurposeOptions::challenge_and_domain(challenge, domain),
        )
        .await?;
        info!("Signed presentation as {}", holder.did());
        Ok(presentation)
    }

    /// Verifies a presentation and every credential it embeds.
    ///
    /// `domain` falls back to the configured verifier domain; without either, the presentation's
    /// own challenge and domain are trusted.
    async fn verify_presentation(
        presentation: &Value,
        challenge: Option<&str>,
        domain: Option<&str>,
        loader: Arc<dyn DocumentLoader>,
        get_verify_suite: Arc<dyn GetVerifySuite>,
    ) -> Result<Presentation, CredkitAPIError> {
        let config = &api_config().verifier;
        let mut validator = PresentationValidator::new(loader, get_verify_suite)
            .with_concurrency_limit(config.concurrency_limit);
        if let Some(challenge) = challenge {
            validator = validator.with_challenge(challenge);
        }
        if let Some(domain) = domain.or(config.domain.as_deref()) {
            validator = validator.with_domain(domain);
        }
        match validator.validate(presentation).await {
            ValidationResult::Valid { data } => Ok(data),
            ValidationResult::Invalid { errors } => {
                Err(CredkitAPIError::InvalidPresentation(errors))
            }
        }
    }
}
