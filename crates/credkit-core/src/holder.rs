//! Presentation of credentials by a holder: unsigned and signed stages.
use crate::context::{assemble_context, assemble_type, Context};
use crate::loader::DocumentLoader;
use crate::one_or_many::OneOrMany;
use crate::purpose::{ProofPurpose, PurposeError};
use crate::subject::{Signer, Subject};
use crate::suite::{GetProofPurposeOptions, GetSignSuite, ProofPurposeRequest, SuiteError};
use crate::utils::{is_absolute_uri, to_object};
use crate::vc::Holder;
use crate::vp::{Presentation, PresentationSubmission, UnsignedPresentation};
use crate::PRESENTATION_TYPE;
use log::debug;
use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;

/// An error relating to a holder signing a presentation.
#[derive(Error, Debug)]
pub enum HolderError {
    /// The suite met a term that no `@context` of the presentation defines.
    #[error("The property \"{0}\" is not defined by any @context of the presentation. Register the term in a context (a registered context URI or an inline context object) before signing.")]
    UnregisteredTerm(String),
    /// Presentation proofs must be bound to a domain.
    #[error("A domain is required to sign a presentation.")]
    MissingDomain,
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

impl From<SuiteError> for HolderError {
    fn from(err: SuiteError) -> Self {
        match err {
            SuiteError::UndefinedTerm(term) => HolderError::UnregisteredTerm(term),
            err => HolderError::Suite(err),
        }
    }
}

impl From<PurposeError> for HolderError {
    fn from(err: PurposeError) -> Self {
        HolderError::Purpose(err)
    }
}

impl From<serde_json::Error> for HolderError {
    fn from(err: serde_json::Error) -> Self {
        HolderError::Serialization(err)
    }
}

/// A non-fatal finding while building a presentation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresentationWarning {
    /// Without an `id`, top-level non-object properties of the presentation are malleable.
    MissingId,
    /// The provided `id` is not an absolute URI.
    IdNotAbsoluteUri(String),
}

impl fmt::Display for PresentationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PresentationWarning::MissingId => write!(
                f,
                "Presentation has no id: its top-level non-object properties are malleable."
            ),
            PresentationWarning::IdNotAbsoluteUri(id) => {
                write!(f, "Presentation id \"{id}\" is not an absolute URI.")
            }
        }
    }
}

/// An unsigned presentation and the warnings raised while building it.
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltPresentation {
    pub presentation: UnsignedPresentation,
    pub warnings: Vec<PresentationWarning>,
}

/// Builds an unsigned presentation of `credentials` by `holder`.
///
/// Credentials are embedded untouched, as signed by their issuers.
pub fn build_unsigned(
    credentials: Vec<Map<String, Value>>,
    holder: &str,
    type_: Option<OneOrMany<String>>,
    context: Option<OneOrMany<Context>>,
    id: Option<&str>,
    presentation_submission: Option<PresentationSubmission>,
) -> BuiltPresentation {
    let mut warnings = vec![];
    match id {
        None => warnings.push(PresentationWarning::MissingId),
        Some(id) if !is_absolute_uri(id) => {
            warnings.push(PresentationWarning::IdNotAbsoluteUri(id.to_string()))
        }
        Some(_) => {}
    }
    for warning in &warnings {
        debug!("{warning}");
    }

    BuiltPresentation {
        presentation: UnsignedPresentation {
            context: assemble_context(context),
            id: id.map(str::to_string),
            type_: assemble_type(PRESENTATION_TYPE, type_),
            holder: Holder {
                id: holder.to_string(),
            },
            verifiable_credential: credentials,
            presentation_submission,
        },
        warnings,
    }
}

/// Signs a presentation as `holder`, attaching an `authentication` proof bound to the challenge
/// and domain supplied by `get_proof_purpose_options`.
pub async fn build_signed(
    unsigned: UnsignedPresentation,
    holder: &Signer,
    loader: &dyn DocumentLoader,
    get_sign_suite: &dyn GetSignSuite,
    get_proof_purpose_options: &dyn GetProofPurposeOptions,
) -> Result<Presentation, HolderError> {
    debug!(
        "Signing presentation of {} credential(s) as {}",
        unsigned.verifiable_credential.len(),
        holder.did()
    );
    let suite = get_sign_suite
        .sign_suite(holder.sign_suite_options())
        .await?;
    let options = get_proof_purpose_options
        .proof_purpose_options(ProofPurposeRequest::Sign {
            controller: holder.did().to_string(),
            key_id: holder.key_id().to_string(),
        })
        .await?;
    let purpose = ProofPurpose::authentication(&options)?;
    if purpose.domain.is_none() {
        return Err(HolderError::MissingDomain);
    }

    let mut document = to_object(&unsigned)?;
    let signed = suite.sign(document.clone(), &purpose, loader).await?;
    document.extend(signed);
    Ok(serde_json::from_value(Value::Object(document))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::TEST_SIGNED_CREDENTIAL;
    use crate::loader::StaticDocumentLoader;
    use crate::purpose::ProofPurposeTerm;
    use crate::suite::{
        SignSuiteOptions, StaticProofPurposeOptions, Suite, SuiteVerification,
    };
    use crate::{BASE_CONTEXT, PRESENTATION_TYPE};
    use async_trait::async_trait;
    use serde_json::json;

    struct EchoPurposeSuite;

    #[async_trait]
    impl Suite for EchoPurposeSuite {
        async fn sign(
            &self,
            mut document: Map<String, Value>,
            purpose: &ProofPurpose,
            _loader: &dyn DocumentLoader,
        ) -> Result<Map<String, Value>, SuiteError> {
            let mut proof = json!({
                "type": "TestSignature",
                "created": "2024-01-02T00:00:00Z",
                "verificationMethod": "did:example:holder#key-1",
                "jws": "header..signature"
            })
            .as_object()
            .cloned()
            .unwrap_or_default();
            purpose.update(&mut proof);
            document.insert("proof".to_string(), Value::Object(proof));
            Ok(document)
        }

        async fn verify(
            &self,
            _document: &Map<String, Value>,
            _purpose: &ProofPurpose,
            _loader: &dyn DocumentLoader,
        ) -> Result<SuiteVerification, SuiteError> {
            Ok(SuiteVerification::verified())
        }
    }

    struct EchoPurposeSuiteProvider;

    #[async_trait]
    impl GetSignSuite for EchoPurposeSuiteProvider {
        async fn sign_suite(
            &self,
            _options: SignSuiteOptions,
        ) -> Result<Box<dyn Suite>, SuiteError> {
            Ok(Box::new(EchoPurposeSuite))
        }
    }

    fn credential() -> Map<String, Value> {
        serde_json::from_str(TEST_SIGNED_CREDENTIAL).unwrap()
    }

    fn holder() -> Signer {
        Signer::new("did:example:holder", "did:example:holder#key-1", "00")
    }

    #[test]
    fn test_build_unsigned() {
        let built = build_unsigned(
            vec![credential()],
            "did:example:holder",
            Some(OneOrMany::One(PRESENTATION_TYPE.to_string())),
            None,
            Some("urn:uuid:0e3b5a7c-2d4f-4a6b-8c9d-7e6f5a4b3c2d"),
            None,
        );
        assert!(built.warnings.is_empty());
        let vp = built.presentation;
        assert_eq!(vp.type_, vec![PRESENTATION_TYPE]);
        assert_eq!(vp.context, vec![Context::from(BASE_CONTEXT)]);
        assert_eq!(vp.verifiable_credential, vec![credential()]);
        assert_eq!(vp.holder.id, "did:example:holder");
    }

    #[test]
    fn test_build_unsigned_warnings() {
        let built = build_unsigned(vec![credential()], "did:example:holder", None, None, None, None);
        assert_eq!(built.warnings, vec![PresentationWarning::MissingId]);
        assert!(built.presentation.id.is_none());

        let built = build_unsigned(
            vec![credential()],
            "did:example:holder",
            None,
            None,
            Some("presentation-1"),
            None,
        );
        assert_eq!(
            built.warnings,
            vec![PresentationWarning::IdNotAbsoluteUri("presentation-1".to_string())]
        );
        assert_eq!(built.presentation.id.as_deref(), Some("presentation-1"));
    }

    #[tokio::test]
    async fn test_build_signed() -> Result<(), Box<dyn std::error::Error>> {
        let unsigned = build_unsigned(
            vec![credential()],
            "did:example:holder",
            None,
            None,
            Some("urn:uuid:0e3b5a7c-2d4f-4a6b-8c9d-7e6f5a4b3c2d"),
            None,
        )
        .presentation;
        let vp = build_signed(
            unsigned.clone(),
            &holder(),
            &StaticDocumentLoader::new(),
            &EchoPurposeSuiteProvider,
            &StaticProofPurposeOptions::challenge_and_domain("c-1", "verifier.example.com"),
        )
        .await?;
        assert_eq!(vp.unsigned, unsigned);
        assert_eq!(vp.proof.proof_purpose, ProofPurposeTerm::Authentication);
        assert_eq!(vp.proof.challenge.as_deref(), Some("c-1"));
        assert_eq!(vp.proof.domain.as_deref(), Some("verifier.example.com"));
        Ok(())
    }

    #[tokio::test]
    async fn test_build_signed_requires_challenge_and_domain() {
        let unsigned =
            build_unsigned(vec![credential()], "did:example:holder", None, None, None, None)
                .presentation;
        let result = build_signed(
            unsigned.clone(),
            &holder(),
            &StaticDocumentLoader::new(),
            &EchoPurposeSuiteProvider,
            &StaticProofPurposeOptions::default(),
        )
        .await;
        assert!(matches!(
            result,
            Err(HolderError::Purpose(PurposeError::MissingChallenge))
        ));

        let mut options = Map::new();
        options.insert("challenge".to_string(), json!("c-1"));
        let result = build_signed(
            unsigned,
            &holder(),
            &StaticDocumentLoader::new(),
            &EchoPurposeSuiteProvider,
            &StaticProofPurposeOptions(options),
        )
        .await;
        assert!(matches!(result, Err(HolderError::MissingDomain)));
    }
}
