//! Consultation submission pipeline.
//!
//! ```text
//! Idle → Validating → CheckingInteractions → Persisting → DerivingInvoice
//!          │                 │                   │        → SchedulingFollowUp
//!          ▼                 ▼                   ▼        → Notifying → Succeeded
//!     Aborted(validation) Aborted(interaction) Failed
//! ```
//!
//! Validation and interaction aborts happen before any I/O. Once the
//! consultation record exists the submission succeeds; invoice and follow-up
//! failures are reported as degraded steps and notification failures are
//! only logged.

mod memory;
mod orchestrator;
mod store;

pub use memory::*;
pub use orchestrator::*;
pub use store::*;

use std::fmt;

use thiserror::Error;

use crate::validation::{InteractionFinding, ValidationErrors};

/// Why a submission stopped before persisting anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortReason {
    Validation,
    Interaction,
}

impl AbortReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            AbortReason::Validation => "validation",
            AbortReason::Interaction => "interaction",
        }
    }
}

/// Orchestrator state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionState {
    Idle,
    Validating,
    CheckingInteractions,
    Persisting,
    DerivingInvoice,
    SchedulingFollowUp,
    Notifying,
    Succeeded,
    Aborted(AbortReason),
    Failed(String),
}

impl SubmissionState {
    /// Whether `next` is a legal successor of this state.
    pub fn can_transition_to(&self, next: &SubmissionState) -> bool {
        use SubmissionState::*;
        matches!(
            (self, next),
            (Idle | Succeeded | Aborted(_) | Failed(_), Validating)
                | (Validating, CheckingInteractions)
                | (Validating, Aborted(AbortReason::Validation))
                | (CheckingInteractions, Persisting)
                | (CheckingInteractions, Aborted(AbortReason::Interaction))
                | (Persisting, DerivingInvoice)
                | (DerivingInvoice, SchedulingFollowUp)
                | (SchedulingFollowUp, Notifying)
                | (Notifying, Succeeded)
                | (Persisting | DerivingInvoice | SchedulingFollowUp | Notifying, Failed(_))
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SubmissionState::Succeeded | SubmissionState::Aborted(_) | SubmissionState::Failed(_)
        )
    }
}

impl fmt::Display for SubmissionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmissionState::Idle => write!(f, "idle"),
            SubmissionState::Validating => write!(f, "validating"),
            SubmissionState::CheckingInteractions => write!(f, "checking_interactions"),
            SubmissionState::Persisting => write!(f, "persisting"),
            SubmissionState::DerivingInvoice => write!(f, "deriving_invoice"),
            SubmissionState::SchedulingFollowUp => write!(f, "scheduling_follow_up"),
            SubmissionState::Notifying => write!(f, "notifying"),
            SubmissionState::Succeeded => write!(f, "succeeded"),
            SubmissionState::Aborted(reason) => write!(f, "aborted({})", reason.as_str()),
            SubmissionState::Failed(message) => write!(f, "failed({})", message),
        }
    }
}

/// Pipeline step, for the per-step trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionStep {
    Validation,
    InteractionCheck,
    Consultation,
    Invoice,
    FollowUp,
    Notification,
}

impl SubmissionStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionStep::Validation => "validation",
            SubmissionStep::InteractionCheck => "interaction_check",
            SubmissionStep::Consultation => "consultation",
            SubmissionStep::Invoice => "invoice",
            SubmissionStep::FollowUp => "follow_up",
            SubmissionStep::Notification => "notification",
        }
    }
}

/// What happened at a step.
#[derive(Debug, Clone, PartialEq)]
pub enum StepStatus {
    Completed,
    Skipped(String),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct StepRecord {
    pub step: SubmissionStep,
    pub status: StepStatus,
}

/// A non-essential step that failed after the consultation was saved.
#[derive(Debug, Clone, PartialEq)]
pub struct DegradedStep {
    pub step: SubmissionStep,
    pub error: String,
}

impl DegradedStep {
    /// Informational message for the clinician.
    pub fn user_message(&self) -> String {
        match self.step {
            SubmissionStep::Invoice => {
                "Consultation saved, but the invoice could not be created.".to_string()
            }
            SubmissionStep::FollowUp => {
                "Consultation saved, but the follow-up could not be scheduled.".to_string()
            }
            step => format!("Consultation saved, but the {} step failed.", step.as_str()),
        }
    }
}

/// Result of the best-effort notification step.
#[derive(Debug, Clone, PartialEq)]
pub enum NotificationStatus {
    Sent { failed_channels: Vec<String> },
    Failed(String),
    Skipped,
}

/// A successful submission.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionReceipt {
    pub consultation_id: String,
    pub invoice_id: Option<String>,
    pub follow_up_id: Option<String>,
    /// Findings below blocking severity
    pub warnings: Vec<InteractionFinding>,
    pub degraded: Vec<DegradedStep>,
    pub notification: NotificationStatus,
    pub steps: Vec<StepRecord>,
}

impl SubmissionReceipt {
    /// Whether every non-essential step also succeeded.
    pub fn is_complete(&self) -> bool {
        self.degraded.is_empty()
    }
}

/// Submission errors. In every case nothing was committed.
#[derive(Error, Debug)]
pub enum SubmissionError {
    #[error("Validation failed: {} field(s) invalid", .0.len())]
    Validation(ValidationErrors),

    #[error("Blocked by interaction check: {message}")]
    SafetyBlock {
        message: String,
        findings: Vec<InteractionFinding>,
    },

    #[error("Failed to create consultation: {0}")]
    Persistence(#[from] StoreError),
}

impl SubmissionError {
    pub fn abort_reason(&self) -> Option<AbortReason> {
        match self {
            SubmissionError::Validation(_) => Some(AbortReason::Validation),
            SubmissionError::SafetyBlock { .. } => Some(AbortReason::Interaction),
            SubmissionError::Persistence(_) => None,
        }
    }

    /// Message for the clinician.
    pub fn user_message(&self) -> String {
        match self {
            SubmissionError::Validation(_) => {
                "Please complete the highlighted fields before submitting.".to_string()
            }
            SubmissionError::SafetyBlock { message, .. } => message.clone(),
            SubmissionError::Persistence(_) => {
                "Failed to save the consultation. Please try again.".to_string()
            }
        }
    }
}
