//! Integration tests for the repair loop

use std::fs;

use fixpls::commands::{repair_with, run_repair, Invocation};
use fixpls::core::{FileCredentialStore, RepairLoop, TscFixer};
use fixpls::error::{CredentialError, FixplsError};
use fixpls::models::{Config, ConfigOverrides, RepairConfig, RepairOutcome};

mod common;

use common::{
    create_test_project, tsc_error, write_source, FixedCompletion, ScriptedRunner,
    UntouchableStore,
};

fn tsc() -> Invocation {
    Invocation {
        command: "tsc".to_string(),
        args: vec!["--noEmit".to_string()],
    }
}

#[tokio::test]
async fn test_fails_twice_then_succeeds() {
    let (_temp_dir, project_root) = create_test_project();
    let source = write_source(&project_root, "src/index.ts", "const a: number = 'x';\n");

    let failing = tsc_error("src/index.ts", 1, 2322, "Type 'string' is not assignable to type 'number'.");
    let runner = ScriptedRunner::new(vec![(2, failing.clone()), (2, failing), (0, String::new())]);
    let service = FixedCompletion::new("const a: number = 1;");

    let repair = RepairLoop::new(&runner, &service, &TscFixer, RepairConfig::default(), &project_root);
    let session = repair.run("tsc", &[]).await.unwrap();

    assert_eq!(runner.calls(), 3);
    assert_eq!(session.patch_rounds, 2);
    assert_eq!(session.outcome(), Some(RepairOutcome::Success { attempts: 3 }));
    assert_eq!(service.requests(), 2);
    assert_eq!(fs::read_to_string(source).unwrap(), "const a: number = 1;\n");
}

#[tokio::test]
async fn test_always_failing_command_is_exhausted_after_five_runs() {
    let (_temp_dir, project_root) = create_test_project();
    write_source(&project_root, "a.ts", "let x = y;\n");

    let failing = tsc_error("a.ts", 1, 2304, "Cannot find name 'y'.");
    let runner = ScriptedRunner::new(vec![(2, failing); 10]);
    let service = FixedCompletion::new("let x = y;");

    let result = repair_with(&runner, &service, &TscFixer, &Config::default(), &project_root, &tsc()).await;

    assert_eq!(runner.calls(), 5);
    match result {
        Err(e @ FixplsError::ExhaustedRetries { attempts: 5, code: 2 }) => assert_eq!(e.exit_code(), 2),
        other => panic!("Expected ExhaustedRetries, got {:?}", other),
    }
}

#[tokio::test]
async fn test_success_on_first_run_makes_no_requests() {
    let (_temp_dir, project_root) = create_test_project();
    let runner = ScriptedRunner::new(vec![(0, String::new())]);
    let service = FixedCompletion::new("unused");

    let outcome = repair_with(&runner, &service, &TscFixer, &Config::default(), &project_root, &tsc())
        .await
        .unwrap();

    assert_eq!(outcome, RepairOutcome::Success { attempts: 1 });
    assert_eq!(runner.calls(), 1);
    assert_eq!(service.requests(), 0);
}

#[tokio::test]
async fn test_file_deleted_mid_run_is_skipped() {
    let (_temp_dir, project_root) = create_test_project();
    let doomed = write_source(&project_root, "gone.ts", "let x = y;\n");

    let failing = tsc_error("gone.ts", 1, 2304, "Cannot find name 'y'.");
    let runner = ScriptedRunner::new(vec![(2, failing), (0, String::new())]).with_hook({
        let doomed = doomed.clone();
        move |run| {
            if run == 0 {
                let _ = fs::remove_file(&doomed);
            }
        }
    });
    let service = FixedCompletion::new("let x = 1;");

    let repair = RepairLoop::new(&runner, &service, &TscFixer, RepairConfig::default(), &project_root);
    let session = repair.run("tsc", &[]).await.unwrap();

    assert_eq!(runner.calls(), 2);
    assert_eq!(session.patch_rounds, 1);
    assert_eq!(session.files_patched, 0);
    assert_eq!(service.requests(), 0);
    assert!(!doomed.exists());
    assert_eq!(session.outcome(), Some(RepairOutcome::Success { attempts: 2 }));
}

#[tokio::test]
async fn test_one_patch_per_file_per_iteration() {
    let (_temp_dir, project_root) = create_test_project();
    let a = write_source(&project_root, "a.ts", "a0\na1\na2\n");
    let b = write_source(&project_root, "b.ts", "b0\nb1\n");

    let mut failing = tsc_error("a.ts", 1, 1005, "';' expected.");
    failing.push_str(&tsc_error("a.ts", 3, 1005, "';' expected."));
    failing.push_str(&tsc_error("b.ts", 2, 1005, "';' expected."));
    let runner = ScriptedRunner::new(vec![(2, failing), (0, String::new())]);
    let service = FixedCompletion::new("fixed");

    let repair = RepairLoop::new(&runner, &service, &TscFixer, RepairConfig::default(), &project_root);
    let session = repair.run("tsc", &[]).await.unwrap();

    // Every diagnostic gets a request, but only one write lands per file
    assert_eq!(service.requests(), 3);
    assert_eq!(session.files_patched, 2);
    assert_eq!(fs::read_to_string(a).unwrap(), "fixed\n\n\n");
    assert_eq!(fs::read_to_string(b).unwrap(), "fixed\n\n");
}

#[tokio::test]
async fn test_missing_separator_reported_before_credential_check() {
    let (_temp_dir, project_root) = create_test_project();

    let result = run_repair(&project_root, None, ConfigOverrides::default(), || Ok(UntouchableStore)).await;

    match result {
        Err(e @ FixplsError::Usage(_)) => assert_eq!(e.exit_code(), 1),
        other => panic!("Expected usage error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_unsupported_tool_reported_before_credential_check() {
    let (_temp_dir, project_root) = create_test_project();

    let wrapped = Some(vec!["make".to_string(), "all".to_string()]);
    let result = run_repair(&project_root, wrapped, ConfigOverrides::default(), || Ok(UntouchableStore)).await;

    match result {
        Err(FixplsError::UnsupportedTool { tool, supported }) => {
            assert_eq!(tool, "make");
            assert!(supported.contains("tsc"));
        }
        other => panic!("Expected UnsupportedTool, got {:?}", other),
    }
}

#[tokio::test]
async fn test_missing_separator_reported_even_without_data_dir() {
    let (_temp_dir, project_root) = create_test_project();
    let no_data_dir = || -> Result<FileCredentialStore, CredentialError> { Err(CredentialError::NoDataDir) };

    let result = run_repair(&project_root, None, ConfigOverrides::default(), no_data_dir).await;

    assert!(matches!(result, Err(FixplsError::Usage(_))));
}
