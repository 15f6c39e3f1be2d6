//! SQLite-backed `ConsultationStore`.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use super::{Database, DbResult};
use crate::models::{ConsultationDraft, ConsultationRecord, FollowUpSchedule, Invoice};
use crate::submission::{ConsultationStore, NewFollowUp, NewInvoice, StoreError, StoreResult};

/// Persists submissions to a local SQLite database.
///
/// Each call holds the connection lock only for its own statement; a
/// submission's records are written by separate calls with no enclosing
/// transaction.
pub struct SqliteStore {
    db: Mutex<Database>,
}

impl SqliteStore {
    pub fn new(db: Database) -> Self {
        Self { db: Mutex::new(db) }
    }

    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        Ok(Self::new(Database::open(path)?))
    }

    pub fn open_in_memory() -> DbResult<Self> {
        Ok(Self::new(Database::open_in_memory()?))
    }

    /// Lock the underlying database for direct reads (exports, lookups).
    pub fn database(&self) -> StoreResult<MutexGuard<'_, Database>> {
        self.db
            .lock()
            .map_err(|e| StoreError::Backend(format!("Lock poisoned: {}", e)))
    }
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[async_trait]
impl ConsultationStore for SqliteStore {
    async fn create_consultation(
        &self,
        draft: &ConsultationDraft,
    ) -> StoreResult<ConsultationRecord> {
        let record = ConsultationRecord::from_draft(new_id(), draft);
        self.database()?.insert_consultation(&record)?;
        tracing::debug!(consultation_id = %record.id, "consultation row inserted");
        Ok(record)
    }

    async fn create_invoice(&self, invoice: &NewInvoice) -> StoreResult<Invoice> {
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
        self.database()?.insert_invoice(&created)?;
        tracing::debug!(invoice_id = %created.id, "invoice row inserted");
        Ok(created)
    }

    async fn schedule_follow_up(&self, follow_up: &NewFollowUp) -> StoreResult<FollowUpSchedule> {
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
        self.database()?.insert_follow_up(&created)?;
        tracing::debug!(follow_up_id = %created.id, "follow-up row inserted");
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{InvoiceItem, InvoiceStatus, PaymentStatus};

    #[tokio::test]
    async fn test_creates_linked_records() {
        let store = SqliteStore::open_in_memory().unwrap();
        let mut draft = ConsultationDraft::new();
        draft.patient_id = Some("patient-1".into());

        let consultation = store.create_consultation(&draft).await.unwrap();
        let invoice = store
            .create_invoice(&NewInvoice {
                patient_id: "patient-1".into(),
                consultation_id: consultation.id.clone(),
                items: vec![InvoiceItem {
                    description: "Consultation".into(),
                    amount: 7500,
                }],
                currency: "USD".into(),
                status: InvoiceStatus::Pending,
                due_date: "2026-02-01".into(),
            })
            .await
            .unwrap();
        let follow_up = store
            .schedule_follow_up(&NewFollowUp {
                patient_id: "patient-1".into(),
                consultation_id: consultation.id.clone(),
                template_id: "wm-2w".into(),
                period: "2w".into(),
                payment_status: PaymentStatus::Pending,
                invoice_id: Some(invoice.id.clone()),
            })
            .await
            .unwrap();

        let db = store.database().unwrap();
        assert_eq!(db.get_consultation(&consultation.id).unwrap(), Some(consultation));
        assert_eq!(db.get_invoice(&invoice.id).unwrap(), Some(invoice));
        assert_eq!(db.get_follow_up(&follow_up.id).unwrap(), Some(follow_up));
    }

    #[tokio::test]
    async fn test_orphan_invoice_is_rejected() {
        let store = SqliteStore::open_in_memory().unwrap();
        let result = store
            .create_invoice(&NewInvoice {
                patient_id: "patient-1".into(),
                consultation_id: "missing".into(),
                items: vec![],
                currency: "USD".into(),
                status: InvoiceStatus::Pending,
                due_date: "2026-02-01".into(),
            })
            .await;
        assert!(matches!(result, Err(StoreError::Rejected(_))));
    }
}
