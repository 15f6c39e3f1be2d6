//! Follow-up schedule database operations.

use rusqlite::{params, OptionalExtension};

use super::{Database, DbError, DbResult};
use crate::models::{FollowUpSchedule, PaymentStatus};

impl Database {
    /// Insert a follow-up schedule.
    pub fn insert_follow_up(&self, schedule: &FollowUpSchedule) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO follow_up_schedules (
                id, patient_id, consultation_id, template_id, period,
                payment_status, invoice_id, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                schedule.id,
                schedule.patient_id,
                schedule.consultation_id,
                schedule.template_id,
                schedule.period,
                schedule.payment_status.as_str(),
                schedule.invoice_id,
                schedule.created_at,
            ],
        )?;
        Ok(())
    }

    /// Get a follow-up schedule by id.
    pub fn get_follow_up(&self, id: &str) -> DbResult<Option<FollowUpSchedule>> {
        self.conn
            .query_row(
                r#"
                SELECT id, patient_id, consultation_id, template_id, period,
                       payment_status, invoice_id, created_at
                FROM follow_up_schedules
                WHERE id = ?
                "#,
                [id],
                FollowUpRow::from_row,
            )
            .optional()?
            .map(|row| row.try_into())
            .transpose()
    }

    /// List follow-ups scheduled for a consultation.
    pub fn list_follow_ups_for_consultation(
        &self,
        consultation_id: &str,
    ) -> DbResult<Vec<FollowUpSchedule>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, patient_id, consultation_id, template_id, period,
                   payment_status, invoice_id, created_at
            FROM follow_up_schedules
            WHERE consultation_id = ?
            ORDER BY created_at
            "#,
        )?;

        let rows = stmt.query_map([consultation_id], FollowUpRow::from_row)?;

        let mut schedules = Vec::new();
        for row in rows {
            schedules.push(row?.try_into()?);
        }
        Ok(schedules)
    }
}

/// Internal row representation.
struct FollowUpRow {
    id: String,
    patient_id: String,
    consultation_id: String,
    template_id: String,
    period: String,
    payment_status: String,
    invoice_id: Option<String>,
    created_at: String,
}

impl FollowUpRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            patient_id: row.get(1)?,
            consultation_id: row.get(2)?,
            template_id: row.get(3)?,
            period: row.get(4)?,
            payment_status: row.get(5)?,
            invoice_id: row.get(6)?,
            created_at: row.get(7)?,
        })
    }
}

impl TryFrom<FollowUpRow> for FollowUpSchedule {
    type Error = DbError;

    fn try_from(row: FollowUpRow) -> Result<Self, Self::Error> {
        let payment_status = PaymentStatus::parse(&row.payment_status).ok_or_else(|| {
            DbError::Constraint(format!("unknown payment status '{}'", row.payment_status))
        })?;

        Ok(FollowUpSchedule {
            id: row.id,
            patient_id: row.patient_id,
            consultation_id: row.consultation_id,
            template_id: row.template_id,
            period: row.period,
            payment_status,
            invoice_id: row.invoice_id,
            created_at: row.created_at,
        })
    }
}
