//! The repair loop: run the wrapped command, patch what it reports, repeat.

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::core::completion::CompletionService;
use crate::core::fixers::ToolFixer;
use crate::core::patch::PatchApplier;
use crate::core::process::CommandRunner;
use crate::core::requester::FixRequester;
use crate::core::window::ContextWindower;
use crate::error::FixplsError;
use crate::models::{RepairConfig, RepairSession, RepairState};

/// Orchestrates repeated runs of one command until it passes or the cap is hit
pub struct RepairLoop<'a> {
    runner: &'a dyn CommandRunner,
    service: &'a dyn CompletionService,
    fixer: &'a dyn ToolFixer,
    config: RepairConfig,
    project_root: PathBuf,
    applier: PatchApplier,
}

impl<'a> RepairLoop<'a> {
    pub fn new(
        runner: &'a dyn CommandRunner,
        service: &'a dyn CompletionService,
        fixer: &'a dyn ToolFixer,
        config: RepairConfig,
        project_root: &Path,
    ) -> Self {
        Self {
            runner,
            service,
            fixer,
            config,
            project_root: project_root.to_path_buf(),
            applier: PatchApplier::new(),
        }
    }

    /// Run until the command exits 0 or `max_iterations` executions have failed.
    ///
    /// Only a failure to start the command is an error; every per-diagnostic
    /// problem is logged and skipped.
    pub async fn run(&self, command: &str, args: &[String]) -> Result<RepairSession, FixplsError> {
        let mut session = RepairSession::new(self.config.max_iterations);
        let requester = FixRequester::new(self.service, ContextWindower::from_config(&self.config))
            .with_max_concurrent(self.config.max_concurrent_requests);

        loop {
            info!(
                "Attempt {}/{}: {} {}",
                session.iteration + 1,
                session.max_iterations,
                command,
                args.join(" ")
            );

            let result = self.runner.run(command, args).await?;

            match session.record_run(result.code) {
                RepairState::Success => {
                    info!("`{}` passed", command);
                    break;
                }
                RepairState::Exhausted => {
                    warn!(
                        "`{}` still failing after {} attempts (exit code {})",
                        command, session.iteration, result.code
                    );
                    break;
                }
                RepairState::Running => {}
            }

            let diagnostics = self.fixer.parse(&result.output, &self.project_root);
            info!(
                "`{}` exited with code {}; {} {} diagnostic(s) found",
                command,
                result.code,
                diagnostics.len(),
                self.fixer.name()
            );
            if diagnostics.is_empty() {
                debug!("Nothing to patch; re-running");
            }

            let replacements = requester.request_all(&diagnostics).await;
            let report = self.applier.apply(replacements);
            session.record_patch_round(report.written.len());

            info!(
                "Patch round {}: {} file(s) written, {} skipped",
                session.patch_rounds,
                report.written.len(),
                report.skipped.len()
            );
        }

        info!(
            "Finished after {} execution(s), {} patch round(s), {} file(s) patched in {}s",
            session.iteration,
            session.patch_rounds,
            session.files_patched,
            session.elapsed_secs()
        );

        Ok(session)
    }
}
