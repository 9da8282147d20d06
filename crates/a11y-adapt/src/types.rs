//! Shared data types and error enums.

use serde::{Deserialize, Serialize};

/// Which text a video ingestion run asks the provider for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VideoTask {
    /// Verbatim speech, or bracketed sound descriptions when nothing is said.
    Transcription,
    /// Narration of visual information for blind viewers.
    AudioDescription,
}

impl VideoTask {
    pub fn label(self) -> &'static str {
        match self {
            VideoTask::Transcription => "transcription",
            VideoTask::AudioDescription => "audio description",
        }
    }
}

/// Processing state of a file held by the generative provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FileState {
    Processing,
    Active,
    Failed,
    #[serde(other)]
    StateUnspecified,
}

/// A file uploaded to the generative provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteFile {
    /// Provider-assigned identity, e.g. `files/abc123`.
    pub name: String,
    #[serde(default)]
    pub uri: String,
    #[serde(default)]
    pub mime_type: String,
    #[serde(default = "unspecified_state")]
    pub state: FileState,
}

fn unspecified_state() -> FileState {
    FileState::StateUnspecified
}

/// Errors that escape the engine to its caller.
///
/// Provider and network failures never appear here: the task client maps
/// them to fallback text.
#[derive(thiserror::Error, Debug)]
pub enum AdaptError {
    #[error("Unknown profile: {0}")]
    UnknownProfile(String),

    #[error("Invalid configuration for profile '{profile}': {message}")]
    InvalidConfig { profile: String, message: String },

    #[error("Missing credential: {0}")]
    MissingCredential(&'static str),

    #[error("Serialization error: {0}")]
    Serialize(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AdaptError {
    /// True when the caller sent a request the engine cannot act on.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            AdaptError::UnknownProfile(_) | AdaptError::InvalidConfig { .. }
        )
    }
}

/// Convenience result type.
pub type AdaptResult<T> = Result<T, AdaptError>;

/// Failures talking to the generative provider.
#[derive(thiserror::Error, Debug)]
pub enum GenerationError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Provider returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed provider response: {0}")]
    Malformed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures fetching remote media.
#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("GET {url} returned status {status}")]
    Status { url: String, status: u16 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Why a single generative task fell back.
#[derive(thiserror::Error, Debug)]
pub enum TaskError {
    #[error("Fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("Generation failed: {0}")]
    Generation(#[from] GenerationError),
}

/// Why a video ingestion run ended in the failed state.
#[derive(thiserror::Error, Debug)]
pub enum IngestionError {
    #[error("Download failed: {0}")]
    Download(#[from] FetchError),

    #[error("Upload failed: {0}")]
    Upload(GenerationError),

    #[error("Status poll failed: {0}")]
    Poll(GenerationError),

    #[error("Provider finished processing in state {0:?}")]
    NotActive(FileState),

    #[error("Asset still processing after {attempts} polls")]
    PollTimeout { attempts: u32 },

    #[error("Generation failed: {0}")]
    Generation(GenerationError),
}
