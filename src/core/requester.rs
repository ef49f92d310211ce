//! Turning diagnostics into replacement text via the completion service.

use futures::stream::{self, StreamExt};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::core::completion::CompletionService;
use crate::core::prompts::{assemble_fix_prompt, SYSTEM_PROMPT_FIX};
use crate::core::window::ContextWindower;
use crate::error::CompletionError;
use crate::models::{ContextWindow, Diagnostic, Replacement};

/// Why a single diagnostic produced no replacement
#[derive(Error, Debug)]
pub enum FixFailure {
    #[error("file does not exist: {0}")]
    FileMissing(PathBuf),

    #[error("could not read {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("completion service error: {0}")]
    Service(#[from] CompletionError),
}

/// Requests fixes from the completion service, one request per diagnostic
pub struct FixRequester<'a> {
    service: &'a dyn CompletionService,
    windower: ContextWindower,
    /// Maximum in-flight requests (0 = unlimited)
    max_concurrent: usize,
}

impl<'a> FixRequester<'a> {
    pub fn new(service: &'a dyn CompletionService, windower: ContextWindower) -> Self {
        Self {
            service,
            windower,
            max_concurrent: 0,
        }
    }

    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent;
        self
    }

    /// Request a replacement for an already computed window
    pub async fn request_window(
        &self,
        path: &Path,
        window: &ContextWindow,
        instruction: &str,
    ) -> Result<Replacement, FixFailure> {
        let prompt = assemble_fix_prompt(instruction, window);
        let response = self.service.complete(SYSTEM_PROMPT_FIX, &prompt).await?;
        let text = strip_code_fences(&response);
        if text.trim().is_empty() {
            return Err(FixFailure::Service(CompletionError::EmptyCompletion));
        }

        Ok(Replacement {
            abs_file_path: path.to_path_buf(),
            text,
            start: window.start,
            end: window.end,
        })
    }

    /// Window the diagnostic's file and request a replacement for it
    pub async fn request(&self, diagnostic: &Diagnostic) -> Result<Replacement, FixFailure> {
        let path = &diagnostic.abs_file_path;
        if !path.is_file() {
            return Err(FixFailure::FileMissing(path.clone()));
        }

        let file_text = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| FixFailure::Unreadable { path: path.clone(), source })?;

        let window = self.windower.window(&file_text, diagnostic.line_index());
        debug!(
            "Window for {}: lines {}..{} ({})",
            diagnostic.location(),
            window.start,
            window.end,
            if window.whole_file { "whole file" } else { "partial" }
        );

        self.request_window(path, &window, &diagnostic.instruction).await
    }

    /// Request fixes for all diagnostics concurrently.
    ///
    /// Failures are logged and skipped. Successful replacements come back in
    /// diagnostic order regardless of completion order.
    pub async fn request_all(&self, diagnostics: &[Diagnostic]) -> Vec<Replacement> {
        let requests = diagnostics.iter().map(|diagnostic| async move {
            (diagnostic, self.request(diagnostic).await)
        });

        let results: Vec<_> = if self.max_concurrent == 0 {
            futures::future::join_all(requests).await
        } else {
            stream::iter(requests).buffered(self.max_concurrent).collect().await
        };

        let mut replacements = Vec::new();
        for (diagnostic, result) in results {
            match result {
                Ok(replacement) => {
                    info!("Got fix for {}", diagnostic.location());
                    replacements.push(replacement);
                }
                Err(FixFailure::FileMissing(path)) => {
                    warn!("Skipping {}: file no longer exists ({})", diagnostic.location(), path.display());
                }
                Err(e) => {
                    warn!("Skipping {}: {}", diagnostic.location(), e);
                }
            }
        }
        replacements
    }
}

/// Remove a markdown fence wrapping the whole reply, keeping indentation
pub fn strip_code_fences(response: &str) -> String {
    static FENCE_RE: OnceLock<Regex> = OnceLock::new();
    let re = FENCE_RE.get_or_init(|| Regex::new(r"(?s)^\s*```[\w+-]*[ \t]*\r?\n(.*?)\r?\n?```\s*$").unwrap());

    match re.captures(response).and_then(|caps| caps.get(1)) {
        Some(inner) => {
            debug!("Stripped code fence from completion");
            inner.as_str().trim_end().to_string()
        }
        None => response.trim_end().to_string(),
    }
}
