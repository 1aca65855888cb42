//! Signing subjects (issuers and presenting holders).
use crate::suite::SignSuiteOptions;

/// Trait for common DID subject functionality.
pub trait Subject {
    /// Returns the subject's DID as a string slice.
    fn did(&self) -> &str;
}

/// A DID subject together with the key it signs with.
///
/// Key material is opaque here and is handed to the caller's suite resolver unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signer {
    did: String,
    key_id: String,
    private_key: String,
    public_key: Option<String>,
}

impl Signer {
    /// Constructs a new signer. `key_id` is the full verification method id (DID URL).
    pub fn new(did: &str, key_id: &str, private_key: &str) -> Self {
        Self {
            did: did.to_owned(),
            key_id: key_id.to_owned(),
            private_key: private_key.to_owned(),
            public_key: None,
        }
    }

    /// Sets the public key, returning the signer.
    pub fn with_public_key(mut self, public_key: &str) -> Self {
        self.public_key = Some(public_key.to_owned());
        self
    }

    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    /// Options for resolving a signing suite for this signer's key.
    pub fn sign_suite_options(&self) -> SignSuiteOptions {
        SignSuiteOptions {
            controller: self.did.clone(),
            key_id: self.key_id.clone(),
            private_key: self.private_key.clone(),
            public_key: self.public_key.clone(),
        }
    }
}

impl Subject for Signer {
    fn did(&self) -> &str {
        &self.did
    }
}
