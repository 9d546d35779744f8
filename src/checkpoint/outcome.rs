//! Outcome classification.
//!
//! A response maps to exactly one `Decision`; the caller-facing predicates
//! read that variant, so at most one terminal predicate holds for any
//! response.
//!
//! ```text
//! success  status            outcome    → Decision
//! true     PENDING|BLOCKED   *          → Running
//! true     *                 DENIED     → Denied
//! true     COMPLETE          APPROVED   → Allowed
//! true     COMPLETE          PENDING    → Undecided
//! false    isTimeout set                → TimedOut
//! false    FAILED/ERROR or errors       → Errored
//! anything else                         → Indeterminate
//! ```

use std::fmt;

use crate::checkpoint::types::{CheckpointResponse, VerificationOutcome, VerificationStatus};

/// Semantic classification of a checkpoint response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Decision {
    /// Still being evaluated, or blocked on external input.
    Running,
    Allowed,
    Denied,
    /// Evaluation finished without reaching a decision.
    Undecided,
    /// The API (or the engine) reported an error.
    Errored,
    /// Polling gave up after repeated failures.
    TimedOut,
    /// Shape not covered by the table above.
    Indeterminate,
}

impl Decision {
    pub fn of(response: &CheckpointResponse) -> Self {
        use VerificationOutcome as O;
        use VerificationStatus as S;

        if response.success {
            let Some(verification) = &response.verification else {
                return Decision::Indeterminate;
            };
            return match (verification.status, verification.outcome) {
                // Running wins over DENIED so is_running stays exclusive of terminal predicates.
                (S::Pending | S::Blocked, _) => Decision::Running,
                (_, O::Denied) => Decision::Denied,
                (S::Complete, O::Approved) => Decision::Allowed,
                (S::Complete, O::Pending) => Decision::Undecided,
                _ => Decision::Indeterminate,
            };
        }

        if response.is_timeout {
            Decision::TimedOut
        } else if reports_error(response) {
            Decision::Errored
        } else {
            Decision::Indeterminate
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Running => "running",
            Decision::Allowed => "allowed",
            Decision::Denied => "denied",
            Decision::Undecided => "undecided",
            Decision::Errored => "errored",
            Decision::TimedOut => "timed_out",
            Decision::Indeterminate => "indeterminate",
        }
    }

    /// True once no further polling can change the result.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Decision::Running | Decision::Indeterminate)
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn reports_error(response: &CheckpointResponse) -> bool {
    let failed = matches!(
        (response.status(), response.outcome()),
        (Some(VerificationStatus::Failed), Some(VerificationOutcome::Error))
    );
    failed || !response.errors.is_empty()
}

impl CheckpointResponse {
    pub fn decision(&self) -> Decision {
        Decision::of(self)
    }

    pub fn is_running(&self) -> bool {
        self.decision() == Decision::Running
    }

    pub fn is_allowed(&self) -> bool {
        self.decision() == Decision::Allowed
    }

    pub fn is_denied(&self) -> bool {
        self.decision() == Decision::Denied
    }

    pub fn is_undecided(&self) -> bool {
        self.decision() == Decision::Undecided
    }

    /// Errored responses, and timeouts that carry an error entry.
    pub fn has_error(&self) -> bool {
        match self.decision() {
            Decision::Errored => true,
            Decision::TimedOut => reports_error(self),
            _ => false,
        }
    }

    pub fn is_timed_out(&self) -> bool {
        self.decision() == Decision::TimedOut
    }
}
