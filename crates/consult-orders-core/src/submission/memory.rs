//! In-memory store.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use super::store::{ConsultationStore, NewFollowUp, NewInvoice, StoreError, StoreResult};
use crate::models::{ConsultationDraft, ConsultationRecord, FollowUpSchedule, Invoice};

/// Keeps records in memory. Each operation can be switched to fail, and
/// call counts are tracked, so callers' partial-failure handling can be
/// exercised.
#[derive(Default)]
pub struct InMemoryStore {
    consultations: Mutex<Vec<ConsultationRecord>>,
    invoices: Mutex<Vec<Invoice>>,
    follow_ups: Mutex<Vec<FollowUpSchedule>>,
    fail_consultations: AtomicBool,
    fail_invoices: AtomicBool,
    fail_follow_ups: AtomicBool,
    consultation_calls: AtomicUsize,
    invoice_calls: AtomicUsize,
    follow_up_calls: AtomicUsize,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_consultations(&self, fail: bool) {
        self.fail_consultations.store(fail, Ordering::SeqCst);
    }

    pub fn fail_invoices(&self, fail: bool) {
        self.fail_invoices.store(fail, Ordering::SeqCst);
    }

    pub fn fail_follow_ups(&self, fail: bool) {
        self.fail_follow_ups.store(fail, Ordering::SeqCst);
    }

    pub fn consultation_calls(&self) -> usize {
        self.consultation_calls.load(Ordering::SeqCst)
    }

    pub fn invoice_calls(&self) -> usize {
        self.invoice_calls.load(Ordering::SeqCst)
    }

    pub fn follow_up_calls(&self) -> usize {
        self.follow_up_calls.load(Ordering::SeqCst)
    }

    pub fn consultations(&self) -> Vec<ConsultationRecord> {
        self.consultations.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn invoices(&self) -> Vec<Invoice> {
        self.invoices.lock().map(|i| i.clone()).unwrap_or_default()
    }

    pub fn follow_ups(&self) -> Vec<FollowUpSchedule> {
        self.follow_ups.lock().map(|f| f.clone()).unwrap_or_default()
    }
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn lock_error<T>(_: std::sync::PoisonError<T>) -> StoreError {
    StoreError::Backend("lock poisoned".into())
}

#[async_trait]
impl ConsultationStore for InMemoryStore {
    async fn create_consultation(
        &self,
        draft: &ConsultationDraft,
    ) -> StoreResult<ConsultationRecord> {
        self.consultation_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_consultations.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("consultation store offline".into()));
        }

        let record = ConsultationRecord::from_draft(new_id(), draft);
        self.consultations.lock().map_err(lock_error)?.push(record.clone());
        Ok(record)
    }

    async fn create_invoice(&self, invoice: &NewInvoice) -> StoreResult<Invoice> {
        self.invoice_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_invoices.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("billing service offline".into()));
        }

        let created = Invoice {
            id: new_id(),
            patient_id: invoice.patient_id.clone(),
            consultation_id: invoice.consultation_id.clone(),
            items: invoice.items.clone(),
            currency: invoice.currency.clone(),
            status: invoice.status,
            due_date: invoice.due_date.clone(),
            created_at: chrono::Utc::now().to_rfc3339(),
        };
        self.invoices.lock().map_err(lock_error)?.push(created.clone());
        Ok(created)
    }

    async fn schedule_follow_up(&self, follow_up: &NewFollowUp) -> StoreResult<FollowUpSchedule> {
        self.follow_up_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_follow_ups.load(Ordering::SeqCst) {
            return Err(StoreError::Rejected("follow-up template not found".into()));
        }

        let created = FollowUpSchedule {
            id: new_id(),
            patient_id: follow_up.patient_id.clone(),
            consultation_id: follow_up.consultation_id.clone(),
            template_id: follow_up.template_id.clone(),
            period: follow_up.period.clone(),
            payment_status: follow_up.payment_status,
            invoice_id: follow_up.invoice_id.clone(),
            created_at: chrono::Utc::now().to_rfc3339(),
        };
        self.follow_ups.lock().map_err(lock_error)?.push(created.clone());
        Ok(created)
    }
}
