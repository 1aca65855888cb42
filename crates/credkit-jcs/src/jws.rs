//! Detached JWS with unencoded payload (RFC 7797) using ES256K.
use k256::ecdsa::signature::{Signer, Verifier};
use k256::ecdsa::{Signature, SigningKey, VerifyingKey};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The only algorithm this suite signs with.
pub const ALGORITHM: &str = "ES256K";

/// An error relating to a detached JWS.
#[derive(Error, Debug)]
pub enum JwsError {
    /// The JWS is not of the form `<header>..<signature>`.
    #[error("Invalid detached JWS.")]
    InvalidJws,
    /// The header is not the expected unencoded-payload ES256K header.
    #[error("Unsupported JWS header: {0}")]
    UnsupportedHeader(String),
    /// Wrapped base64 error.
    #[error("A wrapped base64 error: {0}")]
    Base64(base64::DecodeError),
    /// Wrapped serialization error.
    #[error("A wrapped serialization error: {0}")]
    Serialization(serde_json::Error),
    /// Wrapped signature error.
    #[error("A wrapped signature error: {0}")]
    Signature(k256::ecdsa::Error),
}

impl From<base64::DecodeError> for JwsError {
    fn from(err: base64::DecodeError) -> Self {
        JwsError::Base64(err)
    }
}

impl From<serde_json::Error> for JwsError {
    fn from(err: serde_json::Error) -> Self {
        JwsError::Serialization(err)
    }
}

impl From<k256::ecdsa::Error> for JwsError {
    fn from(err: k256::ecdsa::Error) -> Self {
        JwsError::Signature(err)
    }
}

/// JOSE header of a detached JWS over an unencoded payload.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Header {
    #[serde(rename = "alg")]
    pub algorithm: String,
    #[serde(rename = "b64")]
    pub base64url_encode_payload: bool,
    #[serde(rename = "crit")]
    pub critical: Vec<String>,
}

impl Default for Header {
    fn default() -> Self {
        Self {
            algorithm: ALGORITHM.to_string(),
            base64url_encode_payload: false,
            critical: vec!["b64".to_string()],
        }
    }
}

fn encode_header(header: &Header) -> Result<String, JwsError> {
    let json = serde_json::to_string(header)?;
    Ok(base64::encode_config(json, base64::URL_SAFE_NO_PAD))
}

fn signing_input(header_b64: &str, payload: &[u8]) -> Vec<u8> {
    [header_b64.as_bytes(), b".", payload].concat()
}

/// Signs `payload`, returning `<header>..<signature>`.
pub fn detached_sign(payload: &[u8], key: &SigningKey) -> Result<String, JwsError> {
    let header_b64 = encode_header(&Header::default())?;
    let signature: Signature = key.try_sign(&signing_input(&header_b64, payload))?;
    let signature_b64 = base64::encode_config(signature.to_bytes(), base64::URL_SAFE_NO_PAD);
    Ok(header_b64 + ".." + &signature_b64)
}

/// Splits a detached JWS into its header and signature parts.
pub fn split_detached(jws: &str) -> Result<(&str, &str), JwsError> {
    let mut parts = jws.splitn(3, '.');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(header), Some(""), Some(signature)) if !signature.contains('.') => {
            Ok((header, signature))
        }
        _ => Err(JwsError::InvalidJws),
    }
}

/// Returns `Ok(false)` if the signature does not match `payload`; malformed JWS are errors.
pub fn detached_verify(jws: &str, payload: &[u8], key: &VerifyingKey) -> Result<bool, JwsError> {
    let (header_b64, signature_b64) = split_detached(jws)?;
    let header: Header =
        serde_json::from_slice(&base64::decode_config(header_b64, base64::URL_SAFE_NO_PAD)?)?;
    if header != Header::default() {
        return Err(JwsError::UnsupportedHeader(serde_json::to_string(&header)?));
    }
    let signature =
        Signature::from_slice(&base64::decode_config(signature_b64, base64::URL_SAFE_NO_PAD)?)?;
    Ok(key
        .verify(&signing_input(header_b64, payload), &signature)
        .is_ok())
}
