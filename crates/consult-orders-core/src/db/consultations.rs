//! Consultation database operations.

use rusqlite::{params, OptionalExtension};

use super::{Database, DbError, DbResult};
use crate::models::ConsultationRecord;

const SELECT_COLUMNS: &str = r#"
    SELECT id, patient_id, provider_id, service, notes,
           medications, follow_up, resource_ids, created_at
    FROM consultations
"#;

impl Database {
    /// Insert a consultation record.
    pub fn insert_consultation(&self, record: &ConsultationRecord) -> DbResult<()> {
        let service_json = record
            .service
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;
        let follow_up_json = record
            .follow_up
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        self.conn.execute(
            r#"
            INSERT INTO consultations (
                id, patient_id, provider_id, service, notes,
                medications, follow_up, resource_ids, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                record.id,
                record.patient_id,
                record.provider_id,
                service_json,
                serde_json::to_string(&record.notes)?,
                serde_json::to_string(&record.medications)?,
                follow_up_json,
                serde_json::to_string(&record.resource_ids)?,
                record.created_at,
            ],
        )?;
        Ok(())
    }

    /// Get a consultation by id.
    pub fn get_consultation(&self, id: &str) -> DbResult<Option<ConsultationRecord>> {
        self.conn
            .query_row(
                &format!("{} WHERE id = ?", SELECT_COLUMNS),
                [id],
                ConsultationRow::from_row,
            )
            .optional()?
            .map(|row| row.try_into())
            .transpose()
    }
}

/// Internal row representation.
struct ConsultationRow {
    id: String,
    patient_id: Option<String>,
    provider_id: Option<String>,
    service: Option<String>,
    notes: String,
    medications: String,
    follow_up: Option<String>,
    resource_ids: String,
    created_at: String,
}

impl ConsultationRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            patient_id: row.get(1)?,
            provider_id: row.get(2)?,
            service: row.get(3)?,
            notes: row.get(4)?,
            medications: row.get(5)?,
            follow_up: row.get(6)?,
            resource_ids: row.get(7)?,
            created_at: row.get(8)?,
        })
    }
}

impl TryFrom<ConsultationRow> for ConsultationRecord {
    type Error = DbError;

    fn try_from(row: ConsultationRow) -> Result<Self, Self::Error> {
        Ok(ConsultationRecord {
            id: row.id,
            patient_id: row.patient_id,
            provider_id: row.provider_id,
            service: row.service.map(|s| serde_json::from_str(&s)).transpose()?,
            notes: serde_json::from_str(&row.notes)?,
            medications: serde_json::from_str(&row.medications)?,
            follow_up: row.follow_up.map(|f| serde_json::from_str(&f)).transpose()?,
            resource_ids: serde_json::from_str(&row.resource_ids)?,
            created_at: row.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        ClinicalNotes, ConsultationDraft, FollowUpChoice, MedicationCategory, MedicationLineItem,
        ServiceRef,
    };

    fn make_record(id: &str) -> ConsultationRecord {
        let mut draft = ConsultationDraft::new();
        draft.patient_id = Some("patient-1".into());
        draft.provider_id = Some("provider-1".into());
        draft.service = Some(ServiceRef {
            id: "weight-management".into(),
            name: "Weight Management".into(),
        });
        draft.notes = ClinicalNotes {
            hpi: "Weight gain over 12 months".into(),
            ..Default::default()
        };
        draft.medications = vec![MedicationLineItem {
            id: "semaglutide".into(),
            name: "Semaglutide".into(),
            brand_name: Some("Ozempic".into()),
            dosage: Some("0.25mg".into()),
            frequency: Some("Once weekly".into()),
            approach: Some("Titration".into()),
            instructions: vec!["Inject subcutaneously".into()],
            category: MedicationCategory::WeightManagement,
            is_patient_preference: false,
        }];
        draft.follow_up = Some(FollowUpChoice {
            period: "4w".into(),
            display_text: "Follow up in 4 weeks".into(),
            template_id: Some("wm-4w".into()),
        });
        draft.resource_ids = vec!["glp1-guide".into()];
        ConsultationRecord::from_draft(id.to_string(), &draft)
    }

    #[test]
    fn test_insert_and_get_consultation() {
        let db = Database::open_in_memory().unwrap();
        let record = make_record("c1");

        db.insert_consultation(&record).unwrap();

        let loaded = db.get_consultation("c1").unwrap().unwrap();
        assert_eq!(loaded, record);
    }

    #[test]
    fn test_get_missing_consultation() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.get_consultation("nope").unwrap().is_none());
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let db = Database::open_in_memory().unwrap();
        let record = make_record("c1");
        db.insert_consultation(&record).unwrap();
        assert!(matches!(
            db.insert_consultation(&record),
            Err(DbError::Sqlite(_))
        ));
    }
}
