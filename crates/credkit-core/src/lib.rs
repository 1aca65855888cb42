//! Core types and logic for the verifiable credential lifecycle (suite independent).
pub mod context;
#[cfg(test)]
pub(crate) mod data;
pub mod holder;
pub mod issuer;
pub mod loader;
pub mod one_or_many;
pub mod purpose;
pub mod subject;
pub mod suite;
pub mod utils;
pub mod validation;
pub mod vc;
pub mod vc_validator;
pub mod vp;
pub mod vp_validator;

/// The canonical base context, always the first `@context` entry of a credential or presentation.
pub const BASE_CONTEXT: &str = "https://www.w3.org/2018/credentials/v1";

/// The mandatory first entry of a credential `type` array.
pub const CREDENTIAL_TYPE: &str = "VerifiableCredential";

/// The mandatory first entry of a presentation `type` array.
pub const PRESENTATION_TYPE: &str = "VerifiablePresentation";

/// Prefix shared by every DID.
pub const DID_PREFIX: &str = "did:";
