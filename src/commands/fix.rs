use std::path::Path;
use tracing::{info, warn};

use crate::commands::invocation::{parse_invocation, Invocation};
use crate::core::{
    fixer_for_command, load_config, resolve_api_key, working_tree_status, CommandRunner,
    CompletionClient, CompletionService, CredentialStore, RepairLoop, ProcessRunner, ToolFixer,
    TreeStatus,
};
use crate::error::{CredentialError, FixplsError};
use crate::models::{Config, ConfigOverrides, RepairOutcome};

/// Everything checked and loaded before the wrapped command runs
pub struct Preflight {
    pub config: Config,
    pub fixer: &'static dyn ToolFixer,
    pub api_key: String,
}

/// Run the precondition checks in order: tool, working tree, credential.
///
/// The credential store is only opened once the earlier checks pass. Nothing
/// is executed or written here; any failure is fatal.
pub fn check_preconditions<S, O, F>(
    project_root: &Path,
    invocation: &Invocation,
    overrides: ConfigOverrides,
    open_store: O,
    env: F,
) -> Result<Preflight, FixplsError>
where
    S: CredentialStore,
    O: FnOnce() -> Result<S, CredentialError>,
    F: Fn(&str) -> Option<String>,
{
    let fixer = fixer_for_command(&invocation.command, &invocation.args)?;
    let config = load_config(project_root, overrides)?;

    if config.behavior.require_clean_tree {
        match working_tree_status(project_root) {
            TreeStatus::Clean => {}
            TreeStatus::Dirty(changes) => return Err(FixplsError::DirtyWorkingTree(changes)),
            TreeStatus::NotARepo => {
                warn!(
                    "{} is not inside a git work tree; edits cannot be reviewed with git",
                    project_root.display()
                );
            }
        }
    }

    let store = open_store()?;
    let api_key = resolve_api_key(&store, env)?;

    Ok(Preflight {
        config,
        fixer,
        api_key,
    })
}

/// Run the repair loop with the given collaborators
pub async fn repair_with(
    runner: &dyn CommandRunner,
    service: &dyn CompletionService,
    fixer: &dyn ToolFixer,
    config: &Config,
    project_root: &Path,
    invocation: &Invocation,
) -> Result<RepairOutcome, FixplsError> {
    let repair = RepairLoop::new(runner, service, fixer, config.repair.clone(), project_root);
    let session = repair.run(&invocation.command, &invocation.args).await?;

    match session.outcome() {
        Some(RepairOutcome::Exhausted { attempts, code }) => {
            Err(FixplsError::ExhaustedRetries { attempts, code })
        }
        Some(outcome) => Ok(outcome),
        None => Err(FixplsError::ExhaustedRetries {
            attempts: session.iteration,
            code: session.last_exit_code.unwrap_or(1),
        }),
    }
}

/// `fixpls -- <command> [args...]`
///
/// `wrapped` is everything after the `--` separator, or None without one.
pub async fn run_repair<S, O>(
    project_root: &Path,
    wrapped: Option<Vec<String>>,
    overrides: ConfigOverrides,
    open_store: O,
) -> Result<RepairOutcome, FixplsError>
where
    S: CredentialStore,
    O: FnOnce() -> Result<S, CredentialError>,
{
    let invocation = parse_invocation(wrapped)?;
    let preflight = check_preconditions(project_root, &invocation, overrides, open_store, |var| {
        std::env::var(var).ok()
    })?;

    info!(
        "Repairing `{}` with the {} fixer using {}",
        invocation.display(),
        preflight.fixer.name(),
        preflight.config.completion.model
    );

    let service = CompletionClient::new(preflight.config.completion.clone(), preflight.api_key)?;
    let runner = ProcessRunner::new(project_root.to_path_buf());

    let outcome = repair_with(
        &runner,
        &service,
        preflight.fixer,
        &preflight.config,
        project_root,
        &invocation,
    )
    .await?;

    println!(
        "`{}` passed after {} attempt(s)",
        invocation.display(),
        outcome.attempts()
    );
    Ok(outcome)
}
