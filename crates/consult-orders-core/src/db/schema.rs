//! SQLite schema definition.

/// Database schema for submitted consultations and their billing records.
pub const SCHEMA: &str = r#"
-- Enable foreign keys
PRAGMA foreign_keys = ON;

-- ============================================================================
-- Consultations (Append-Only)
-- ============================================================================

CREATE TABLE IF NOT EXISTS consultations (
    id TEXT PRIMARY KEY,
    patient_id TEXT,
    provider_id TEXT,
    service TEXT,                                -- JSON object {id, name}
    notes TEXT NOT NULL DEFAULT '{}',            -- JSON ClinicalNotes
    medications TEXT NOT NULL DEFAULT '[]',      -- JSON array of MedicationLineItem
    follow_up TEXT,                              -- JSON FollowUpChoice
    resource_ids TEXT NOT NULL DEFAULT '[]',     -- JSON array of strings
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_consultations_patient ON consultations(patient_id);

-- ============================================================================
-- Invoices
-- ============================================================================

CREATE TABLE IF NOT EXISTS invoices (
    id TEXT PRIMARY KEY,
    patient_id TEXT NOT NULL,
    consultation_id TEXT NOT NULL REFERENCES consultations(id),
    items TEXT NOT NULL DEFAULT '[]',            -- JSON array of InvoiceItem
    currency TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'pending'
        CHECK (status IN ('pending', 'paid', 'void')),
    due_date TEXT NOT NULL,                      -- YYYY-MM-DD
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_invoices_consultation ON invoices(consultation_id);
CREATE INDEX IF NOT EXISTS idx_invoices_status ON invoices(status);

-- ============================================================================
-- Follow-up Schedules
-- ============================================================================

CREATE TABLE IF NOT EXISTS follow_up_schedules (
    id TEXT PRIMARY KEY,
    patient_id TEXT NOT NULL,
    consultation_id TEXT NOT NULL REFERENCES consultations(id),
    template_id TEXT NOT NULL,
    period TEXT NOT NULL,
    payment_status TEXT NOT NULL
        CHECK (payment_status IN ('pending', 'unbilled')),
    invoice_id TEXT REFERENCES invoices(id),
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_follow_ups_consultation ON follow_up_schedules(consultation_id);
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_schema_valid() {
        let conn = Connection::open_in_memory().unwrap();
        let result = conn.execute_batch(SCHEMA);
        assert!(result.is_ok(), "Schema should be valid SQL: {:?}", result);
    }

    #[test]
    fn test_invoice_requires_consultation() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();

        let result = conn.execute(
            "INSERT INTO invoices (id, patient_id, consultation_id, currency, due_date) VALUES ('i1', 'p1', 'missing', 'USD', '2026-01-01')",
            [],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_status_constraints() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();
        conn.execute("INSERT INTO consultations (id) VALUES ('c1')", [])
            .unwrap();

        let result = conn.execute(
            "INSERT INTO invoices (id, patient_id, consultation_id, currency, status, due_date) VALUES ('i1', 'p1', 'c1', 'USD', 'refunded', '2026-01-01')",
            [],
        );
        assert!(result.is_err());

        let result = conn.execute(
            "INSERT INTO follow_up_schedules (id, patient_id, consultation_id, template_id, period, payment_status) VALUES ('f1', 'p1', 'c1', 't', '4w', 'waived')",
            [],
        );
        assert!(result.is_err());

        let result = conn.execute(
            "INSERT INTO follow_up_schedules (id, patient_id, consultation_id, template_id, period, payment_status) VALUES ('f1', 'p1', 'c1', 't', '4w', 'unbilled')",
            [],
        );
        assert!(result.is_ok());
    }
}
