//! Invoice database operations.

use rusqlite::{params, OptionalExtension};

use super::{Database, DbError, DbResult};
use crate::models::{Invoice, InvoiceStatus};

const SELECT_COLUMNS: &str = r#"
    SELECT id, patient_id, consultation_id, items, currency,
           status, due_date, created_at
    FROM invoices
"#;

impl Database {
    /// Insert an invoice. The consultation must already exist.
    pub fn insert_invoice(&self, invoice: &Invoice) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO invoices (
                id, patient_id, consultation_id, items, currency,
                status, due_date, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                invoice.id,
                invoice.patient_id,
                invoice.consultation_id,
                serde_json::to_string(&invoice.items)?,
                invoice.currency,
                invoice.status.as_str(),
                invoice.due_date,
                invoice.created_at,
            ],
        )?;
        Ok(())
    }

    /// Get an invoice by id.
    pub fn get_invoice(&self, id: &str) -> DbResult<Option<Invoice>> {
        self.conn
            .query_row(
                &format!("{} WHERE id = ?", SELECT_COLUMNS),
                [id],
                InvoiceRow::from_row,
            )
            .optional()?
            .map(|row| row.try_into())
            .transpose()
    }
}

/// Internal row representation.
struct InvoiceRow {
    id: String,
    patient_id: String,
    consultation_id: String,
    items: String,
    currency: String,
    status: String,
    due_date: String,
    created_at: String,
}

impl InvoiceRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            patient_id: row.get(1)?,
            consultation_id: row.get(2)?,
            items: row.get(3)?,
            currency: row.get(4)?,
            status: row.get(5)?,
            due_date: row.get(6)?,
            created_at: row.get(7)?,
        })
    }
}

impl TryFrom<InvoiceRow> for Invoice {
    type Error = DbError;

    fn try_from(row: InvoiceRow) -> Result<Self, Self::Error> {
        let status = InvoiceStatus::parse(&row.status)
            .ok_or_else(|| DbError::Constraint(format!("unknown invoice status '{}'", row.status)))?;

        Ok(Invoice {
            id: row.id,
            patient_id: row.patient_id,
            consultation_id: row.consultation_id,
            items: serde_json::from_str(&row.items)?,
            currency: row.currency,
            status,
            due_date: row.due_date,
            created_at: row.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ConsultationDraft, ConsultationRecord, InvoiceItem};

    fn setup() -> Database {
        let db = Database::open_in_memory().unwrap();
        let record = ConsultationRecord::from_draft("c1".into(), &ConsultationDraft::new());
        db.insert_consultation(&record).unwrap();
        db
    }

    fn make_invoice(id: &str) -> Invoice {
        Invoice {
            id: id.into(),
            patient_id: "patient-1".into(),
            consultation_id: "c1".into(),
            items: vec![InvoiceItem {
                description: "Weight Management consultation, follow-up: 4w".into(),
                amount: 12500,
            }],
            currency: "USD".into(),
            status: InvoiceStatus::Pending,
            due_date: "2026-02-01".into(),
            created_at: "2026-01-18T10:00:00+00:00".into(),
        }
    }

    #[test]
    fn test_insert_and_get_invoice() {
        let db = setup();
        let invoice = make_invoice("i1");
        db.insert_invoice(&invoice).unwrap();

        let loaded = db.get_invoice("i1").unwrap().unwrap();
        assert_eq!(loaded, invoice);
        assert_eq!(loaded.total(), 12500);
    }

    #[test]
    fn test_invoice_for_unknown_consultation_fails() {
        let db = setup();
        let mut invoice = make_invoice("i1");
        invoice.consultation_id = "missing".into();
        assert!(db.insert_invoice(&invoice).is_err());
    }
}
