//! Submissions persisted to an on-disk SQLite database.

use std::sync::Arc;

use anyhow::Result;
use consult_orders_core::models::{ClinicalNotes, PaymentStatus};
use consult_orders_core::{
    build_catalog, Database, DraftAssembler, OrdersConfig, SelectionEngine, SqliteStore,
    SubmissionOrchestrator,
};
use consult_orders_notify::RecordingDispatcher;

fn ed_draft(engine: &SelectionEngine) -> consult_orders_core::ConsultationDraft {
    DraftAssembler::new()
        .patient("patient-7")
        .provider("provider-2")
        .service("ed", "ED")
        .notes(ClinicalNotes {
            hpi: "Intermittent ED, no cardiac history".into(),
            ..Default::default()
        })
        .follow_up("2w", "Follow up in 2 weeks", Some("ed-2w".into()))
        .assemble(engine)
}

#[tokio::test]
async fn test_submission_survives_reopen() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("orders.db");

    let receipt = {
        let store = Arc::new(SqliteStore::open(&path)?);
        let mut orchestrator = SubmissionOrchestrator::new(
            store,
            Arc::new(RecordingDispatcher::new()),
            OrdersConfig::default(),
        );
        let mut engine = SelectionEngine::new(build_catalog(Vec::new()));
        engine.toggle("sildenafil");
        orchestrator.submit(&ed_draft(&engine)).await?
    };

    let db = Database::open(&path)?;
    let consultation = db
        .get_consultation(&receipt.consultation_id)?
        .expect("consultation persisted");
    assert_eq!(consultation.patient_id.as_deref(), Some("patient-7"));
    assert_eq!(consultation.medications[0].id, "sildenafil");

    let invoice_id = receipt.invoice_id.expect("invoice created");
    let invoice = db.get_invoice(&invoice_id)?.expect("invoice persisted");
    assert_eq!(invoice.total(), 7500);

    let follow_ups = db.list_follow_ups_for_consultation(&receipt.consultation_id)?;
    assert_eq!(follow_ups.len(), 1);
    assert_eq!(follow_ups[0].payment_status, PaymentStatus::Pending);
    assert_eq!(follow_ups[0].invoice_id.as_deref(), Some(invoice_id.as_str()));
    Ok(())
}

#[tokio::test]
async fn test_configured_pricing_is_persisted() -> Result<()> {
    let config = OrdersConfig::from_json(
        r#"{"pricing": {"2w": 9900, "4w": 14900, "6w": 19900, "custom": 24900}, "currency": "CAD"}"#,
    )?;
    let store = Arc::new(SqliteStore::open_in_memory()?);
    let mut orchestrator =
        SubmissionOrchestrator::new(store.clone(), Arc::new(RecordingDispatcher::new()), config);

    let mut engine = SelectionEngine::new(build_catalog(Vec::new()));
    engine.toggle("tadalafil");
    let receipt = orchestrator.submit(&ed_draft(&engine)).await?;

    let db = store.database()?;
    let invoice = db
        .get_invoice(receipt.invoice_id.as_deref().unwrap_or_default())?
        .expect("invoice persisted");
    assert_eq!(invoice.total(), 9900);
    assert_eq!(invoice.currency, "CAD");
    Ok(())
}
