//! Step-by-step consultation submission.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use consult_orders_notify::{NotificationDispatcher, NotificationRequest};

use super::store::{ConsultationStore, NewFollowUp, NewInvoice, StoreResult};
use super::{
    AbortReason, DegradedStep, NotificationStatus, StepRecord, StepStatus, SubmissionError,
    SubmissionReceipt, SubmissionState, SubmissionStep,
};
use crate::config::OrdersConfig;
use crate::models::{
    ConsultationDraft, FollowUpPeriod, FollowUpSchedule, Invoice, InvoiceItem, InvoiceStatus,
    PaymentStatus,
};
use crate::validation::{validate, InteractionChecker};

/// Shared view of whether a submission is running.
///
/// Clones observe the same flag, so a UI can poll it without touching the
/// orchestrator.
#[derive(Debug, Clone, Default)]
pub struct SubmissionFlag(Arc<AtomicBool>);

impl SubmissionFlag {
    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    fn raise(&self) -> InFlight {
        self.0.store(true, Ordering::Release);
        InFlight(self.clone())
    }
}

/// Lowers the flag when the submission returns or its future is dropped.
struct InFlight(SubmissionFlag);

impl Drop for InFlight {
    fn drop(&mut self) {
        (self.0).0.store(false, Ordering::Release);
    }
}

/// Drives a draft through validation, interaction checks and persistence.
///
/// `submit` takes `&mut self`, so one orchestrator runs at most one
/// submission at a time. Steps run strictly in order; nothing is retried or
/// rolled back.
pub struct SubmissionOrchestrator {
    store: Arc<dyn ConsultationStore>,
    dispatcher: Arc<dyn NotificationDispatcher>,
    checker: InteractionChecker,
    config: OrdersConfig,
    state: SubmissionState,
    submitting: SubmissionFlag,
}

impl SubmissionOrchestrator {
    /// Create an orchestrator with the default interaction rules.
    pub fn new(
        store: Arc<dyn ConsultationStore>,
        dispatcher: Arc<dyn NotificationDispatcher>,
        config: OrdersConfig,
    ) -> Self {
        Self {
            store,
            dispatcher,
            checker: InteractionChecker::default(),
            config,
            state: SubmissionState::Idle,
            submitting: SubmissionFlag::default(),
        }
    }

    /// Replace the interaction rule set.
    pub fn with_checker(mut self, checker: InteractionChecker) -> Self {
        self.checker = checker;
        self
    }

    /// State reached by the last (or current) submission.
    pub fn state(&self) -> &SubmissionState {
        &self.state
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.is_set()
    }

    /// Handle on the in-flight flag for observers on other threads.
    pub fn submission_flag(&self) -> SubmissionFlag {
        self.submitting.clone()
    }

    pub fn config(&self) -> &OrdersConfig {
        &self.config
    }

    /// Submit a draft.
    ///
    /// Returns `Ok` whenever the consultation record was created, even if
    /// invoicing, follow-up scheduling or notification failed; those are
    /// reported on the receipt.
    pub async fn submit(
        &mut self,
        draft: &ConsultationDraft,
    ) -> Result<SubmissionReceipt, SubmissionError> {
        let _in_flight = self.submitting.raise();
        self.run(draft).await
    }

    async fn run(
        &mut self,
        draft: &ConsultationDraft,
    ) -> Result<SubmissionReceipt, SubmissionError> {
        let mut steps = Vec::new();
        let mut degraded = Vec::new();

        // Validating
        self.transition(SubmissionState::Validating);
        let report = validate(draft);
        if !report.is_valid {
            tracing::info!(errors = report.errors.len(), "submission aborted by validation");
            self.transition(SubmissionState::Aborted(AbortReason::Validation));
            return Err(SubmissionError::Validation(report.errors));
        }
        steps.push(record(SubmissionStep::Validation, StepStatus::Completed));

        // CheckingInteractions
        self.transition(SubmissionState::CheckingInteractions);
        let findings = self
            .checker
            .check(&draft.medications, &draft.notes.contraindications);
        let blocking = findings
            .iter()
            .find(|f| f.severity.is_blocking())
            .map(|f| (f.rule_id.clone(), f.message.clone()));
        if let Some((rule_id, message)) = blocking {
            tracing::warn!(rule = %rule_id, "submission blocked by interaction check");
            self.transition(SubmissionState::Aborted(AbortReason::Interaction));
            return Err(SubmissionError::SafetyBlock { message, findings });
        }
        steps.push(record(SubmissionStep::InteractionCheck, StepStatus::Completed));

        // Persisting
        self.transition(SubmissionState::Persisting);
        let consultation = match self.store.create_consultation(draft).await {
            Ok(consultation) => consultation,
            Err(e) => {
                tracing::error!(error = %e, "consultation creation failed");
                self.transition(SubmissionState::Failed(e.to_string()));
                return Err(SubmissionError::Persistence(e));
            }
        };
        tracing::info!(consultation_id = %consultation.id, "consultation created");
        steps.push(record(SubmissionStep::Consultation, StepStatus::Completed));

        // DerivingInvoice
        self.transition(SubmissionState::DerivingInvoice);
        let invoice_id = match draft.patient_id.as_deref() {
            None => {
                steps.push(record(SubmissionStep::Invoice, skipped("no patient on draft")));
                None
            }
            Some(patient_id) => match self.create_invoice(patient_id, &consultation.id, draft).await {
                Ok(invoice) => {
                    tracing::info!(invoice_id = %invoice.id, amount = invoice.total(), "invoice created");
                    steps.push(record(SubmissionStep::Invoice, StepStatus::Completed));
                    Some(invoice.id)
                }
                Err(e) => {
                    tracing::warn!(error = %e, consultation_id = %consultation.id, "invoice creation failed");
                    degrade(&mut steps, &mut degraded, SubmissionStep::Invoice, e.to_string());
                    None
                }
            },
        };

        // SchedulingFollowUp
        self.transition(SubmissionState::SchedulingFollowUp);
        let follow_up_id = match (draft.patient_id.as_deref(), draft.follow_up_template()) {
            (Some(patient_id), Some(template_id)) => {
                match self
                    .schedule_follow_up(patient_id, &consultation.id, template_id, draft, invoice_id.clone())
                    .await
                {
                    Ok(schedule) => {
                        tracing::info!(follow_up_id = %schedule.id, "follow-up scheduled");
                        steps.push(record(SubmissionStep::FollowUp, StepStatus::Completed));
                        Some(schedule.id)
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, consultation_id = %consultation.id, "follow-up scheduling failed");
                        degrade(&mut steps, &mut degraded, SubmissionStep::FollowUp, e.to_string());
                        None
                    }
                }
            }
            (None, _) => {
                steps.push(record(SubmissionStep::FollowUp, skipped("no patient on draft")));
                None
            }
            (_, None) => {
                steps.push(record(SubmissionStep::FollowUp, skipped("no follow-up template")));
                None
            }
        };

        // Notifying
        self.transition(SubmissionState::Notifying);
        let notification = match draft.patient_id.as_deref() {
            Some(patient_id) => self.notify(patient_id, &consultation.id, draft).await,
            None => NotificationStatus::Skipped,
        };
        let notification_step = match &notification {
            NotificationStatus::Sent { failed_channels } if failed_channels.is_empty() => {
                StepStatus::Completed
            }
            NotificationStatus::Sent { failed_channels } => {
                StepStatus::Failed(format!("failed channels: {}", failed_channels.join(", ")))
            }
            NotificationStatus::Failed(message) => StepStatus::Failed(message.clone()),
            NotificationStatus::Skipped => skipped("no patient on draft"),
        };
        steps.push(record(SubmissionStep::Notification, notification_step));

        self.transition(SubmissionState::Succeeded);
        tracing::info!(
            consultation_id = %consultation.id,
            degraded = degraded.len(),
            "submission complete"
        );

        Ok(SubmissionReceipt {
            consultation_id: consultation.id,
            invoice_id,
            follow_up_id,
            warnings: findings,
            degraded,
            notification,
            steps,
        })
    }

    async fn create_invoice(
        &self,
        patient_id: &str,
        consultation_id: &str,
        draft: &ConsultationDraft,
    ) -> StoreResult<Invoice> {
        let period = draft
            .follow_up
            .as_ref()
            .map(|f| f.period.as_str())
            .unwrap_or(FollowUpPeriod::Custom.code());
        let amount = self.config.pricing.price_for_follow_up(period);

        let request = NewInvoice {
            patient_id: patient_id.to_string(),
            consultation_id: consultation_id.to_string(),
            items: vec![InvoiceItem {
                description: invoice_description(draft),
                amount,
            }],
            currency: self.config.currency.clone(),
            status: InvoiceStatus::Pending,
            due_date: due_date(self.config.invoice_due_days),
        };

        self.store.create_invoice(&request).await
    }

    async fn schedule_follow_up(
        &self,
        patient_id: &str,
        consultation_id: &str,
        template_id: &str,
        draft: &ConsultationDraft,
        invoice_id: Option<String>,
    ) -> StoreResult<FollowUpSchedule> {
        let payment_status = if invoice_id.is_some() {
            PaymentStatus::Pending
        } else {
            PaymentStatus::Unbilled
        };

        let request = NewFollowUp {
            patient_id: patient_id.to_string(),
            consultation_id: consultation_id.to_string(),
            template_id: template_id.to_string(),
            period: draft
                .follow_up
                .as_ref()
                .map(|f| f.period.clone())
                .unwrap_or_default(),
            payment_status,
            invoice_id,
        };

        self.store.schedule_follow_up(&request).await
    }

    async fn notify(
        &self,
        patient_id: &str,
        consultation_id: &str,
        draft: &ConsultationDraft,
    ) -> NotificationStatus {
        let request = NotificationRequest {
            patient_id: patient_id.to_string(),
            note_id: consultation_id.to_string(),
            template_id: self
                .config
                .notification_templates
                .template_for(draft.service_id())
                .to_string(),
        };

        match self.dispatcher.notify_patient(&request).await {
            Ok(report) => {
                if !report.success {
                    tracing::warn!(template = %request.template_id, "patient notification not delivered on any channel");
                    return NotificationStatus::Failed("not delivered on any channel".into());
                }
                let failed_channels: Vec<String> =
                    report.failed_channels().into_iter().map(str::to_string).collect();
                if !failed_channels.is_empty() {
                    tracing::warn!(channels = ?failed_channels, "patient notification failed on some channels");
                }
                NotificationStatus::Sent { failed_channels }
            }
            Err(e) => {
                tracing::warn!(error = %e, "patient notification failed");
                NotificationStatus::Failed(e.to_string())
            }
        }
    }

    fn transition(&mut self, next: SubmissionState) {
        debug_assert!(
            self.state.can_transition_to(&next),
            "illegal submission transition {} -> {}",
            self.state,
            next
        );
        tracing::debug!(from = %self.state, to = %next, "submission state");
        self.state = next;
    }
}

fn record(step: SubmissionStep, status: StepStatus) -> StepRecord {
    StepRecord { step, status }
}

fn skipped(reason: &str) -> StepStatus {
    StepStatus::Skipped(reason.to_string())
}

fn degrade(
    steps: &mut Vec<StepRecord>,
    degraded: &mut Vec<DegradedStep>,
    step: SubmissionStep,
    error: String,
) {
    steps.push(record(step, StepStatus::Failed(error.clone())));
    degraded.push(DegradedStep { step, error });
}

fn invoice_description(draft: &ConsultationDraft) -> String {
    let follow_up = draft
        .follow_up
        .as_ref()
        .map(|f| {
            if f.display_text.trim().is_empty() {
                f.period.clone()
            } else {
                f.display_text.clone()
            }
        })
        .unwrap_or_else(|| FollowUpPeriod::Custom.code().to_string());

    match &draft.service {
        Some(service) => format!("{} consultation, follow-up: {}", service.name, follow_up),
        None => format!("Consultation, follow-up: {}", follow_up),
    }
}

fn due_date(days: u32) -> String {
    (chrono::Utc::now() + chrono::Duration::days(i64::from(days)))
        .format("%Y-%m-%d")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FollowUpChoice, ServiceRef};

    #[test]
    fn test_invoice_description() {
        let mut draft = ConsultationDraft::new();
        assert_eq!(invoice_description(&draft), "Consultation, follow-up: custom");

        draft.service = Some(ServiceRef {
            id: "ed".into(),
            name: "ED".into(),
        });
        draft.follow_up = Some(FollowUpChoice {
            period: "4w".into(),
            display_text: "".into(),
            template_id: None,
        });
        assert_eq!(invoice_description(&draft), "ED consultation, follow-up: 4w");
    }

    #[test]
    fn test_due_date_format() {
        let date = due_date(14);
        assert_eq!(date.len(), 10);
        assert!(chrono::NaiveDate::parse_from_str(&date, "%Y-%m-%d").is_ok());
    }
}
