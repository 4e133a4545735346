use std::path::PathBuf;
use thiserror::Error;

/// Failures of the transcript collaborator. Recovered per input by the batch fetch.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AcquisitionError {
    #[error("No video id found in {input}")]
    InvalidIdentifier { input: String },

    #[error("Video {video_id} not found")]
    NotFound { video_id: String },

    #[error("Transcripts are disabled for {video_id}")]
    TranscriptsDisabled { video_id: String },

    #[error("Transcript unavailable for {video_id}: {reason}")]
    Unavailable { video_id: String, reason: String },

    #[error("Fetching {video_id} timed out after {seconds}s")]
    TimedOut { video_id: String, seconds: u64 },
}

/// Failures of the LLM collaborator. Transport and parse failures stay distinct.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EnrichmentError {
    #[error("LLM unavailable: {reason}")]
    LlmUnavailable { reason: String },

    #[error("Malformed LLM response: {reason}")]
    MalformedResponse { reason: String },

    #[error("LLM call timed out after {seconds}s")]
    TimedOut { seconds: u64 },
}

impl From<reqwest::Error> for EnrichmentError {
    fn from(err: reqwest::Error) -> Self {
        EnrichmentError::LlmUnavailable {
            reason: err.to_string(),
        }
    }
}

/// Startup failures. Never retried.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing API key: {env_var} environment variable is not set for {provider_name}")]
    MissingApiKey {
        provider_name: String,
        env_var: String,
    },

    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("Cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum ParlanceError {
    #[error(transparent)]
    Acquisition(#[from] AcquisitionError),

    #[error(transparent)]
    Enrichment(#[from] EnrichmentError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, ParlanceError>;
