use chrono::{DateTime, Utc};
use serde::Serialize;

/// State of the repair loop
///
/// Precondition failures never create a session, so they have no state here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RepairState {
    /// Wrapped command is being run and patched
    Running,
    /// Wrapped command exited 0
    Success,
    /// Iteration cap reached while the command still fails
    Exhausted,
}

impl RepairState {
    /// Check if the loop has stopped
    pub fn is_terminal(&self) -> bool {
        matches!(self, RepairState::Success | RepairState::Exhausted)
    }
}

/// State of one full run of the repair loop
#[derive(Debug, Clone, Serialize)]
pub struct RepairSession {
    pub state: RepairState,
    /// Executions of the wrapped command so far
    pub iteration: usize,
    pub max_iterations: usize,
    pub started_at: DateTime<Utc>,
    pub last_exit_code: Option<i32>,
    /// Iterations that went through the fix/patch phase
    pub patch_rounds: usize,
    /// Files rewritten across all rounds
    pub files_patched: usize,
}

impl RepairSession {
    pub fn new(max_iterations: usize) -> Self {
        Self {
            state: RepairState::Running,
            iteration: 0,
            max_iterations,
            started_at: Utc::now(),
            last_exit_code: None,
            patch_rounds: 0,
            files_patched: 0,
        }
    }

    /// Record one execution of the wrapped command and move to the next state
    pub fn record_run(&mut self, code: i32) -> RepairState {
        self.iteration += 1;
        self.last_exit_code = Some(code);
        self.state = if code == 0 {
            RepairState::Success
        } else if self.iteration >= self.max_iterations {
            RepairState::Exhausted
        } else {
            RepairState::Running
        };
        self.state
    }

    /// Record a completed fix/patch phase
    pub fn record_patch_round(&mut self, files_written: usize) {
        self.patch_rounds += 1;
        self.files_patched += files_written;
    }

    /// Seconds since the session started
    pub fn elapsed_secs(&self) -> i64 {
        (Utc::now() - self.started_at).num_seconds()
    }

    /// Final outcome, once the session has stopped
    pub fn outcome(&self) -> Option<RepairOutcome> {
        match self.state {
            RepairState::Running => None,
            RepairState::Success => Some(RepairOutcome::Success {
                attempts: self.iteration,
            }),
            RepairState::Exhausted => Some(RepairOutcome::Exhausted {
                attempts: self.iteration,
                code: self.last_exit_code.unwrap_or(1),
            }),
        }
    }
}

/// How a repair session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepairOutcome {
    Success { attempts: usize },
    Exhausted { attempts: usize, code: i32 },
}

impl RepairOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RepairOutcome::Success { .. })
    }

    pub fn attempts(&self) -> usize {
        match self {
            RepairOutcome::Success { attempts } | RepairOutcome::Exhausted { attempts, .. } => {
                *attempts
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_is_running() {
        let session = RepairSession::new(5);
        assert_eq!(session.state, RepairState::Running);
        assert_eq!(session.iteration, 0);
        assert!(session.last_exit_code.is_none());
        assert!(!session.state.is_terminal());
    }

    #[test]
    fn test_success_on_zero_exit() {
        let mut session = RepairSession::new(5);
        assert_eq!(session.record_run(1), RepairState::Running);
        assert_eq!(session.record_run(0), RepairState::Success);
        assert_eq!(session.iteration, 2);
        assert_eq!(session.last_exit_code, Some(0));
    }

    #[test]
    fn test_exhausted_at_cap() {
        let mut session = RepairSession::new(3);
        assert_eq!(session.record_run(2), RepairState::Running);
        assert_eq!(session.record_run(2), RepairState::Running);
        assert_eq!(session.record_run(2), RepairState::Exhausted);
        assert!(session.state.is_terminal());
    }

    #[test]
    fn test_success_on_last_attempt_wins_over_exhaustion() {
        let mut session = RepairSession::new(1);
        assert_eq!(session.record_run(0), RepairState::Success);
    }

    #[test]
    fn test_patch_rounds_accumulate() {
        let mut session = RepairSession::new(5);
        session.record_patch_round(2);
        session.record_patch_round(0);
        assert_eq!(session.patch_rounds, 2);
        assert_eq!(session.files_patched, 2);
    }

    #[test]
    fn test_session_outcome() {
        let mut session = RepairSession::new(2);
        assert!(session.outcome().is_none());
        session.record_run(2);
        assert!(session.outcome().is_none());
        session.record_run(2);
        assert_eq!(
            session.outcome(),
            Some(RepairOutcome::Exhausted { attempts: 2, code: 2 })
        );
    }

    #[test]
    fn test_outcome_attempts() {
        assert_eq!(RepairOutcome::Success { attempts: 3 }.attempts(), 3);
        let exhausted = RepairOutcome::Exhausted { attempts: 5, code: 2 };
        assert_eq!(exhausted.attempts(), 5);
        assert!(!exhausted.is_success());
    }
}
