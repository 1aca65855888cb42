//! Reference `EcdsaSecp256k1Signature2019` suite over JSON Canonicalization Scheme input.
pub mod jws;
pub mod key;
pub mod suite;

pub use suite::{JcsSuite, JcsSuiteProvider};

/// The proof type produced and verified by this suite.
pub const PROOF_TYPE: &str = "EcdsaSecp256k1Signature2019";

/// The verification method type carrying a hex encoded secp256k1 public key.
pub const VERIFICATION_METHOD_TYPE: &str = "EcdsaSecp256k1VerificationKey2019";
