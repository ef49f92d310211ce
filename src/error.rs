use std::path::PathBuf;
use thiserror::Error;

use crate::models::ConfigError;

/// Main error type for fixpls
#[derive(Error, Debug)]
pub enum FixplsError {
    #[error("{0}")]
    Usage(String),

    #[error("Uncommitted changes in the working tree. Commit or stash them first (or pass --allow-dirty):\n{0}")]
    DirtyWorkingTree(String),

    #[error("No API key found. Run `fixpls login` or set FIXPLS_API_KEY / OPENAI_API_KEY")]
    MissingCredential,

    #[error("Unsupported tool '{tool}'. Supported tools: {supported}")]
    UnsupportedTool { tool: String, supported: String },

    #[error("Completion error: {0}")]
    Completion(#[from] CompletionError),

    #[error("Command still failing after {attempts} attempts (last exit code {code})")]
    ExhaustedRetries { attempts: usize, code: i32 },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Credential error: {0}")]
    Credential(#[from] CredentialError),

    #[error("Failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Input error: {0}")]
    Prompt(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl FixplsError {
    /// Process exit code to report for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            FixplsError::ExhaustedRetries { code, .. } => {
                if (1..=255).contains(code) {
                    *code
                } else {
                    1
                }
            }
            _ => 1,
        }
    }
}

/// Errors related to the completion service
#[derive(Error, Debug)]
pub enum CompletionError {
    #[error("Connection refused: {0}")]
    ConnectionRefused(String),

    #[error("Request timeout after {0} seconds")]
    Timeout(u64),

    #[error("HTTP error: {status} - {message}")]
    HttpError { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("Completion returned no content")]
    EmptyCompletion,

    #[error("Request failed: {0}")]
    RequestFailed(String),
}

impl From<reqwest::Error> for CompletionError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            CompletionError::Timeout(0)
        } else if err.is_connect() {
            CompletionError::ConnectionRefused(err.to_string())
        } else if let Some(status) = err.status() {
            CompletionError::HttpError {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else if err.is_decode() {
            CompletionError::ParseError(err.to_string())
        } else {
            CompletionError::RequestFailed(err.to_string())
        }
    }
}

/// Errors related to the stored credential
#[derive(Error, Debug)]
pub enum CredentialError {
    #[error("Could not determine a per-user data directory")]
    NoDataDir,

    #[error("Failed to read credential file {0}: {1}")]
    ReadError(PathBuf, std::io::Error),

    #[error("Failed to write credential file {0}: {1}")]
    WriteError(PathBuf, std::io::Error),

    #[error("API key must not be empty")]
    Empty,
}

pub type Result<T> = std::result::Result<T, FixplsError>;
