//! API for credential issuance, presentation and verification.
pub mod api;
pub mod config;
pub mod errors;
use crate::api::{CredkitVCAPI, CredkitVPAPI};

/// A type for implementing the API traits on.
pub struct CredkitAPI;

impl CredkitVCAPI for CredkitAPI {}
impl CredkitVPAPI for CredkitAPI {}
