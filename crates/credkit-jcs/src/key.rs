//! Hex encoded secp256k1 keys and the DID documents that publish them.
use crate::VERIFICATION_METHOD_TYPE;
use credkit_core::suite::SuiteError;
use k256::ecdsa::{SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use serde_json::{json, Value};

/// Parses a hex encoded 32-byte private scalar.
pub fn signing_key(private_key_hex: &str) -> Result<SigningKey, SuiteError> {
    let bytes = hex::decode(private_key_hex).map_err(|e| SuiteError::InvalidKey(e.to_string()))?;
    SigningKey::from_slice(&bytes).map_err(|e| SuiteError::InvalidKey(e.to_string()))
}

/// Parses a hex encoded SEC1 public key.
pub fn verifying_key(public_key_hex: &str) -> Result<VerifyingKey, SuiteError> {
    let bytes = hex::decode(public_key_hex).map_err(|e| SuiteError::InvalidKey(e.to_string()))?;
    VerifyingKey::from_sec1_bytes(&bytes).map_err(|e| SuiteError::InvalidKey(e.to_string()))
}

/// Returns the hex encoded compressed public key for a hex encoded private key.
pub fn public_key_hex(private_key_hex: &str) -> Result<String, SuiteError> {
    let key = signing_key(private_key_hex)?;
    Ok(hex::encode(key.verifying_key().to_encoded_point(true).as_bytes()))
}

/// Generates a new hex encoded private key.
pub fn generate_private_key() -> String {
    hex::encode(SigningKey::random(&mut OsRng).to_bytes())
}

/// A minimal DID document publishing one key for both assertion and authentication.
pub fn did_document(did: &str, fragment: &str, public_key_hex: &str) -> Value {
    let key_id = format!("{did}#{fragment}");
    json!({
        "@context": ["https://www.w3.org/ns/did/v1"],
        "id": did,
        "verificationMethod": [{
            "id": key_id,
            "type": VERIFICATION_METHOD_TYPE,
            "controller": did,
            "publicKeyHex": public_key_hex
        }],
        "assertionMethod": [format!("#{fragment}")],
        "authentication": [key_id]
    })
}
