//! The provider trait every generative backend implements.

use std::path::Path;

use async_trait::async_trait;

use crate::types::{GenerationError, RemoteFile};

/// One piece of a multimodal prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Part {
    Text(String),
    /// Bytes sent inline with the request (images).
    InlineData { mime_type: String, data: Vec<u8> },
    /// A file previously uploaded to the provider (videos).
    FileData { mime_type: String, file_uri: String },
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Part::Text(text.into())
    }
}

/// A generative model provider with a file store for large media.
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Single-shot generation; returns the response text, trimmed.
    async fn generate(&self, model: &str, parts: Vec<Part>) -> Result<String, GenerationError>;

    /// Upload a local file; the returned file is usually still processing.
    async fn upload_file(
        &self,
        path: &Path,
        mime_type: &str,
        display_name: &str,
    ) -> Result<RemoteFile, GenerationError>;

    /// Current metadata (including processing state) of an uploaded file.
    async fn get_file(&self, name: &str) -> Result<RemoteFile, GenerationError>;

    async fn delete_file(&self, name: &str) -> Result<(), GenerationError>;
}
