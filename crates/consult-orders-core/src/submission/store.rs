//! Persistence boundary for submissions.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{
    ConsultationDraft, ConsultationRecord, FollowUpSchedule, Invoice, InvoiceItem, InvoiceStatus,
    PaymentStatus,
};

/// Store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Request rejected: {0}")]
    Rejected(String),

    #[error("Backend error: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Invoice to be created for a consultation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewInvoice {
    pub patient_id: String,
    pub consultation_id: String,
    pub items: Vec<InvoiceItem>,
    pub currency: String,
    pub status: InvoiceStatus,
    /// Due date (YYYY-MM-DD)
    pub due_date: String,
}

/// Follow-up to be scheduled for a consultation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewFollowUp {
    pub patient_id: String,
    pub consultation_id: String,
    pub template_id: String,
    /// Period code
    pub period: String,
    pub payment_status: PaymentStatus,
    pub invoice_id: Option<String>,
}

/// Creates the records a submission produces. Ids are assigned by the
/// store; records are never modified afterwards.
#[async_trait]
pub trait ConsultationStore: Send + Sync {
    async fn create_consultation(&self, draft: &ConsultationDraft)
        -> StoreResult<ConsultationRecord>;

    async fn create_invoice(&self, invoice: &NewInvoice) -> StoreResult<Invoice>;

    async fn schedule_follow_up(&self, follow_up: &NewFollowUp) -> StoreResult<FollowUpSchedule>;
}
