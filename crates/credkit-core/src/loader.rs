//! Document loader interface and an in-memory implementation.
use crate::utils::normalize_did;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

/// An error relating to document loading.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoaderError {
    /// No document is available for the URI.
    #[error("Document not found: {0}")]
    NotFound(String),
    /// The loader failed for another reason (transport, parsing, policy).
    #[error("Failed to load document {0}: {1}")]
    Failed(String, String),
}

/// A loaded JSON-LD context or document.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RemoteDocument {
    pub context_url: Option<String>,
    pub document: Value,
    pub document_url: String,
}

/// Resolves a URI (context URL, DID or DID URL) to a document.
#[async_trait]
pub trait DocumentLoader: Send + Sync {
    /// Loads the document identified by `uri`.
    async fn load(&self, uri: &str) -> Result<RemoteDocument, LoaderError>;
}

/// A loader over a fixed set of documents, for pinned contexts and known DID documents.
///
/// DID URLs fall back to the document registered for their bare DID.
#[derive(Debug, Clone, Default)]
pub struct StaticDocumentLoader {
    documents: HashMap<String, Value>,
}

impl StaticDocumentLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `document` under `uri`, returning the loader.
    pub fn with_document(mut self, uri: &str, document: Value) -> Self {
        self.insert(uri, document);
        self
    }

    /// Registers `document` under `uri`, replacing any previous entry.
    pub fn insert(&mut self, uri: &str, document: Value) {
        self.documents.insert(uri.to_string(), document);
    }
}

#[async_trait]
impl DocumentLoader for StaticDocumentLoader {
    async fn load(&self, uri: &str) -> Result<RemoteDocument, LoaderError> {
        let document = self
            .documents
            .get(uri)
            .or_else(|| self.documents.get(normalize_did(uri)))
            .ok_or_else(|| LoaderError::NotFound(uri.to_string()))?;
        Ok(RemoteDocument {
            context_url: None,
            document: document.clone(),
            document_url: uri.to_string(),
        })
    }
}
