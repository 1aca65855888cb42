//! Error type and conversions.
use credkit_core::holder::HolderError;
use credkit_core::issuer::IssuerError;
use credkit_core::validation::{join_errors, ErrorConfig};
use thiserror::Error;

/// Credkit API error type.
#[derive(Error, Debug)]
pub enum CredkitAPIError {
    /// Issuing a credential failed.
    #[error("Credkit issuer error: {0}")]
    IssuerError(IssuerError),
    /// Signing a presentation failed.
    #[error("Credkit holder error: {0}")]
    HolderError(HolderError),
    /// The credential failed validation.
    #[error("Invalid credential:\n{}", join_errors(.0))]
    InvalidCredential(Vec<ErrorConfig>),
    /// The presentation failed validation.
    #[error("Invalid presentation:\n{}", join_errors(.0))]
    InvalidPresentation(Vec<ErrorConfig>),
}

impl From<IssuerError> for CredkitAPIError {
    fn from(err: IssuerError) -> Self {
        CredkitAPIError::IssuerError(err)
    }
}

impl From<HolderError> for CredkitAPIError {
    fn from(err: HolderError) -> Self {
        CredkitAPIError::HolderError(err)
    }
}

impl CredkitAPIError {
    /// The validation errors of an invalid credential or presentation.
    pub fn validation_errors(&self) -> &[ErrorConfig] {
        match self {
            CredkitAPIError::InvalidCredential(errors)
            | CredkitAPIError::InvalidPresentation(errors) => errors,
            _ => &[],
        }
    }
}
