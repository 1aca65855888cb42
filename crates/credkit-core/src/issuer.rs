//! Credential issuance: skeleton, unsigned and signed stages.
use crate::context::{assemble_context, assemble_type, Context};
use crate::loader::DocumentLoader;
use crate::one_or_many::OneOrMany;
use crate::purpose::{ProofPurpose, PurposeError};
use crate::subject::{Signer, Subject};
use crate::suite::{GetProofPurposeOptions, GetSignSuite, ProofPurposeRequest, SuiteError};
use crate::utils::to_object;
use crate::vc::{Credential, CredentialSubject, Holder, Revocation, Skeleton, UnsignedCredential};
use crate::CREDENTIAL_TYPE;
use chrono::{DateTime, Utc};
use log::debug;
use serde_json::{Map, Value};
use thiserror::Error;

/// An error relating to credential issuance.
#[derive(Error, Debug)]
pub enum IssuerError {
    /// The suite met a term that no `@context` of the credential defines.
    #[error("The property \"{0}\" is not defined by any @context of the credential. Register the term in a context (a registered context URI or an inline context object) before signing.")]
    UnregisteredTerm(String),
    /// Wrapped error for a suite error.
    #[error("A wrapped variant for a suite error: {0}")]
    Suite(SuiteError),
    /// Wrapped error for a proof purpose error.
    #[error("A wrapped variant for a proof purpose error: {0}")]
    Purpose(PurposeError),
    /// Wrapped error for a serialization error.
    #[error("A wrapped variant for a serialization error: {0}")]
    Serialization(serde_json::Error),
}

impl From<SuiteError> for IssuerError {
    fn from(err: SuiteError) -> Self {
        match err {
            SuiteError::UndefinedTerm(term) => IssuerError::UnregisteredTerm(term),
            err => IssuerError::Suite(err),
        }
    }
}

impl From<PurposeError> for IssuerError {
    fn from(err: PurposeError) -> Self {
        IssuerError::Purpose(err)
    }
}

impl From<serde_json::Error> for IssuerError {
    fn from(err: serde_json::Error) -> Self {
        IssuerError::Serialization(err)
    }
}

/// Builds the skeleton of a credential issued to `holder`.
///
/// `type_` and `context` are prefixed with `VerifiableCredential` and the base credentials context.
pub fn build_skeleton(
    id: &str,
    credential_subject: OneOrMany<CredentialSubject>,
    holder: &str,
    type_: Option<OneOrMany<String>>,
    context: Option<OneOrMany<Context>>,
) -> Skeleton {
    Skeleton {
        context: assemble_context(context),
        id: id.to_string(),
        type_: assemble_type(CREDENTIAL_TYPE, type_),
        holder: Holder {
            id: holder.to_string(),
        },
        credential_subject,
    }
}

/// Dates a skeleton, optionally attaching an expiry and a revocation pointer.
pub fn build_unsigned(
    skeleton: Skeleton,
    issuance_date: DateTime<Utc>,
    expiration_date: Option<DateTime<Utc>>,
    revocation: Option<Revocation>,
) -> UnsignedCredential {
    UnsignedCredential {
        skeleton,
        issuance_date,
        expiration_date,
        revocation,
    }
}

/// Signs a credential as `issuer`, attaching a single `assertionMethod` proof.
pub async fn build_signed(
    unsigned: UnsignedCredential,
    issuer: &Signer,
    loader: &dyn DocumentLoader,
    get_sign_suite: &dyn GetSignSuite,
    get_proof_purpose_options: Option<&dyn GetProofPurposeOptions>,
) -> Result<Credential, IssuerError> {
    debug!(
        "Signing credential {} as {} with key {}",
        unsigned.skeleton.id,
        issuer.did(),
        issuer.key_id()
    );
    let suite = get_sign_suite
        .sign_suite(issuer.sign_suite_options())
        .await?;

    let options = match get_proof_purpose_options {
        Some(provider) => {
            provider
                .proof_purpose_options(ProofPurposeRequest::Sign {
                    controller: issuer.did().to_string(),
                    key_id: issuer.key_id().to_string(),
                })
                .await?
        }
        None => Map::new(),
    };
    let purpose = ProofPurpose::assertion(&options)?;

    let mut document = to_object(&unsigned)?;
    document.insert("issuer".to_string(), Value::from(issuer.did()));

    let signed = suite.sign(document.clone(), &purpose, loader).await?;
    document.extend(signed);
    Ok(serde_json::from_value(Value::Object(document))?)
}
