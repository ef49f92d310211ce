//! Common test utilities
#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tempfile::TempDir;

use fixpls::core::{CommandOutput, CommandRunner, CompletionService, CredentialStore};
use fixpls::error::{CompletionError, CredentialError, FixplsError};

/// Create an empty project directory
pub fn create_test_project() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let project_root = temp_dir.path().to_path_buf();
    (temp_dir, project_root)
}

/// Write a source file relative to the project root
pub fn write_source(project_root: &Path, relative: &str, content: &str) -> PathBuf {
    let path = project_root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create source dir");
    }
    fs::write(&path, content).expect("Failed to write source file");
    path
}

/// One line of plain `tsc` output
pub fn tsc_error(relative: &str, line: usize, code: u32, message: &str) -> String {
    format!("{}({},1): error TS{}: {}\n", relative, line, code, message)
}

type Hook = Box<dyn Fn(usize) + Send + Sync>;

/// Command runner replaying scripted (exit code, output) pairs.
///
/// Once the script runs out every further run fails with code 1 and no output.
pub struct ScriptedRunner {
    runs: Mutex<VecDeque<(i32, String)>>,
    calls: AtomicUsize,
    before_run: Option<Hook>,
}

impl ScriptedRunner {
    pub fn new(runs: Vec<(i32, String)>) -> Self {
        Self {
            runs: Mutex::new(runs.into()),
            calls: AtomicUsize::new(0),
            before_run: None,
        }
    }

    /// Call `hook` with the zero-based run number before each run
    pub fn with_hook(mut self, hook: impl Fn(usize) + Send + Sync + 'static) -> Self {
        self.before_run = Some(Box::new(hook));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn run(&self, _command: &str, _args: &[String]) -> Result<CommandOutput, FixplsError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(hook) = &self.before_run {
            hook(n);
        }
        let (code, output) = self
            .runs
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or((1, String::new()));
        Ok(CommandOutput { code, output })
    }
}

/// Completion service that always answers with the same text
pub struct FixedCompletion {
    reply: String,
    requests: AtomicUsize,
}

impl FixedCompletion {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            requests: AtomicUsize::new(0),
        }
    }

    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionService for FixedCompletion {
    async fn complete(&self, _system_prompt: &str, _prompt: &str) -> Result<String, CompletionError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        Ok(self.reply.clone())
    }
}

/// Credential store that fails the test if it is ever consulted
pub struct UntouchableStore;

impl CredentialStore for UntouchableStore {
    fn load(&self) -> Result<Option<String>, CredentialError> {
        panic!("credential store must not be consulted");
    }

    fn store(&self, _key: &str) -> Result<(), CredentialError> {
        panic!("credential store must not be written");
    }

    fn clear(&self) -> Result<bool, CredentialError> {
        panic!("credential store must not be cleared");
    }
}
