//! Credkit library: issuance, presentation and validation of verifiable credentials.
pub use credkit_api as api;
pub use credkit_core as core;
pub use credkit_jcs as jcs;
