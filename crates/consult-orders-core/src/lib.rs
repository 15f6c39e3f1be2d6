//! Consult-Orders Core Library
//!
//! Composition, validation and submission of telehealth consultation orders.
//!
//! # Architecture
//!
//! ```text
//! Catalog ──► SelectionEngine ──► DraftAssembler ──► ConsultationDraft
//!  (seed +      (toggle, dosage,                            │
//!  overrides)    approach edits)                            ▼
//!                                               ┌───────────────────────┐
//!                                               │ SubmissionOrchestrator │
//!                                               │  1. validate           │
//!                                               │  2. interaction check  │
//!                                               │  3. consultation  ◄─── hard failure
//!                                               │  4. invoice       ◄─── degraded
//!                                               │  5. follow-up     ◄─── degraded
//!                                               │  6. notification  ◄─── logged only
//!                                               └───────────┬───────────┘
//!                                                           │
//!                                           ┌───────────────┴───────────────┐
//!                                           ▼                               ▼
//!                                   ConsultationStore             NotificationDispatcher
//!                                  (SQLite / in-memory)            (host callback)
//! ```
//!
//! # Core Principle
//!
//! **Nothing is written until the draft passes both gates.** Once the
//! consultation record exists the submission is reported as successful.
//!
//! # Modules
//!
//! - [`catalog`]: Medication catalog and fuzzy search
//! - [`selection`]: Selection engine and draft assembly
//! - [`validation`]: Structural validation and interaction checks
//! - [`pricing`]: Follow-up pricing table
//! - [`submission`]: Submission orchestrator and store boundary
//! - [`db`]: SQLite persistence adapter

pub mod catalog;
pub mod config;
pub mod db;
pub mod models;
pub mod pricing;
pub mod selection;
pub mod submission;
pub mod validation;

// Re-export commonly used types
pub use catalog::{build_catalog, Catalog};
pub use config::OrdersConfig;
pub use db::{Database, SqliteStore};
pub use models::{
    ConsultationDraft, ConsultationRecord, CustomMedication, FollowUpSchedule, Invoice,
    MedicationCatalogEntry, MedicationLineItem, MedicationSelection,
};
pub use pricing::PricingTable;
pub use selection::{DraftAssembler, SelectionEngine};
pub use submission::{
    ConsultationStore, InMemoryStore, SubmissionError, SubmissionFlag, SubmissionOrchestrator,
    SubmissionReceipt,
};
pub use validation::{validate, InteractionChecker, InteractionFinding, Severity};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use consult_orders_notify::{
    ChannelOutcome, NotificationDispatcher, NotificationReport, NotificationRequest, NotifyError,
    NotifyResult,
};

use models::{ClinicalNotes, MedicationCategory};

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum ConsultOrdersError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Safety block: {0}")]
    SafetyBlock(String),

    #[error("Persistence error: {0}")]
    PersistenceError(String),

    #[error("Submission in progress: {0}")]
    SubmissionInProgress(String),
}

impl From<db::DbError> for ConsultOrdersError {
    fn from(e: db::DbError) -> Self {
        ConsultOrdersError::DatabaseError(e.to_string())
    }
}

impl From<submission::StoreError> for ConsultOrdersError {
    fn from(e: submission::StoreError) -> Self {
        ConsultOrdersError::DatabaseError(e.to_string())
    }
}

impl From<config::ConfigError> for ConsultOrdersError {
    fn from(e: config::ConfigError) -> Self {
        ConsultOrdersError::ConfigError(e.to_string())
    }
}

impl From<SubmissionError> for ConsultOrdersError {
    fn from(e: SubmissionError) -> Self {
        match &e {
            SubmissionError::Validation(errors) => ConsultOrdersError::ValidationFailed(
                errors
                    .iter()
                    .map(|(key, message)| format!("{}: {}", key, message))
                    .collect::<Vec<_>>()
                    .join("; "),
            ),
            SubmissionError::SafetyBlock { message, .. } => {
                ConsultOrdersError::SafetyBlock(message.clone())
            }
            SubmissionError::Persistence(_) => ConsultOrdersError::PersistenceError(e.user_message()),
        }
    }
}

impl<T> From<std::sync::PoisonError<T>> for ConsultOrdersError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        ConsultOrdersError::DatabaseError(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Host Notification Callback
// =========================================================================

/// Patient notification, implemented by the host app.
#[uniffi::export(callback_interface)]
pub trait PatientNotifier: Send + Sync {
    /// Deliver a "plan ready" message. Returns one outcome per channel.
    fn notify_patient(
        &self,
        patient_id: String,
        note_id: String,
        template_id: String,
        body: String,
    ) -> Vec<FfiChannelOutcome>;
}

/// Adapts a host [`PatientNotifier`] to [`NotificationDispatcher`].
struct HostDispatcher {
    notifier: Box<dyn PatientNotifier>,
}

#[async_trait]
impl NotificationDispatcher for HostDispatcher {
    async fn notify_patient(&self, request: &NotificationRequest) -> NotifyResult<NotificationReport> {
        let body = consult_orders_notify::render_message(
            &request.template_id,
            &request.patient_id,
            &request.note_id,
        );
        let outcomes = self.notifier.notify_patient(
            request.patient_id.clone(),
            request.note_id.clone(),
            request.template_id.clone(),
            body,
        );
        if outcomes.is_empty() {
            return Err(NotifyError::Delivery("host reported no channels".into()));
        }

        let channels: BTreeMap<String, ChannelOutcome> = outcomes
            .into_iter()
            .map(|o| {
                let outcome = if o.delivered {
                    ChannelOutcome::delivered()
                } else {
                    ChannelOutcome::failed(o.error.unwrap_or_else(|| "delivery failed".into()))
                };
                (o.channel, outcome)
            })
            .collect();
        Ok(NotificationReport::from_channels(channels))
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open or create a session backed by a database at the given path.
///
/// `config_json` overrides pricing, templates, due days and currency; pass
/// `None` for defaults.
#[uniffi::export]
pub fn open_session(
    path: String,
    config_json: Option<String>,
    notifier: Box<dyn PatientNotifier>,
) -> Result<Arc<ConsultOrdersCore>, ConsultOrdersError> {
    let store = SqliteStore::open(&path)?;
    ConsultOrdersCore::build(store, config_json, notifier)
}

/// Create a session with an in-memory database (for testing).
#[uniffi::export]
pub fn open_session_in_memory(
    config_json: Option<String>,
    notifier: Box<dyn PatientNotifier>,
) -> Result<Arc<ConsultOrdersCore>, ConsultOrdersError> {
    let store = SqliteStore::open_in_memory()?;
    ConsultOrdersCore::build(store, config_json, notifier)
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe consultation session for FFI.
///
/// The orchestrator lock is held for a whole submission. Pricing and the
/// in-flight flag live outside it so the UI can read them meanwhile.
#[derive(uniffi::Object)]
pub struct ConsultOrdersCore {
    engine: Mutex<SelectionEngine>,
    pricing: PricingTable,
    submitting: SubmissionFlag,
    orchestrator: Mutex<SubmissionOrchestrator>,
}

impl ConsultOrdersCore {
    fn build(
        store: SqliteStore,
        config_json: Option<String>,
        notifier: Box<dyn PatientNotifier>,
    ) -> Result<Arc<Self>, ConsultOrdersError> {
        let config = match config_json {
            Some(json) => OrdersConfig::from_json(&json)?,
            None => OrdersConfig::default(),
        };
        let dispatcher: Arc<dyn NotificationDispatcher> = Arc::new(HostDispatcher { notifier });
        let orchestrator = SubmissionOrchestrator::new(Arc::new(store), dispatcher, config);

        Ok(Arc::new(Self {
            engine: Mutex::new(SelectionEngine::new(build_catalog(Vec::new()))),
            pricing: orchestrator.config().pricing,
            submitting: orchestrator.submission_flag(),
            orchestrator: Mutex::new(orchestrator),
        }))
    }
}

#[uniffi::export]
impl ConsultOrdersCore {
    // =========================================================================
    // Catalog Operations
    // =========================================================================

    /// All catalog entries, in catalog order.
    pub fn list_catalog(&self) -> Result<Vec<FfiCatalogEntry>, ConsultOrdersError> {
        let engine = self.engine.lock()?;
        Ok(engine.catalog().entries().iter().map(FfiCatalogEntry::from).collect())
    }

    /// Fuzzy search by name, brand or id.
    pub fn search_catalog(
        &self,
        query: String,
        limit: u32,
    ) -> Result<Vec<FfiCatalogEntry>, ConsultOrdersError> {
        let engine = self.engine.lock()?;
        let matches = engine.catalog().search(&query, limit as usize);
        Ok(matches.into_iter().map(|m| FfiCatalogEntry::from(m.entry)).collect())
    }

    // =========================================================================
    // Selection Operations
    // =========================================================================

    /// Toggle a medication. Returns whether it is now selected.
    pub fn toggle_medication(&self, medication_id: String) -> Result<bool, ConsultOrdersError> {
        let mut engine = self.engine.lock()?;
        if !engine.catalog().contains(&medication_id) {
            return Err(ConsultOrdersError::NotFound(medication_id));
        }
        Ok(engine.toggle(&medication_id))
    }

    /// Returns false when the edit was rejected.
    pub fn set_dosage(&self, medication_id: String, dosage: String) -> Result<bool, ConsultOrdersError> {
        Ok(self.engine.lock()?.set_dosage(&medication_id, &dosage))
    }

    pub fn set_frequency(
        &self,
        medication_id: String,
        frequency: String,
    ) -> Result<bool, ConsultOrdersError> {
        Ok(self.engine.lock()?.set_frequency(&medication_id, &frequency))
    }

    /// Returns false when the approach is not supported by the medication.
    pub fn set_approach(
        &self,
        medication_id: String,
        approach: String,
    ) -> Result<bool, ConsultOrdersError> {
        Ok(self.engine.lock()?.set_approach(&medication_id, &approach))
    }

    /// Instructions as newline-separated text.
    pub fn set_instructions(
        &self,
        medication_id: String,
        instructions: String,
    ) -> Result<bool, ConsultOrdersError> {
        Ok(self
            .engine
            .lock()?
            .set_instructions(&medication_id, instructions))
    }

    pub fn set_patient_preference(
        &self,
        medication_id: String,
        preferred: bool,
    ) -> Result<bool, ConsultOrdersError> {
        Ok(self
            .engine
            .lock()?
            .set_patient_preference(&medication_id, preferred))
    }

    /// Add a custom medication to the catalog and select it. Returns its id.
    pub fn add_custom_medication(
        &self,
        medication: FfiCustomMedication,
    ) -> Result<String, ConsultOrdersError> {
        if medication.name.trim().is_empty() {
            return Err(ConsultOrdersError::InvalidInput(
                "custom medication name cannot be empty".into(),
            ));
        }
        let mut engine = self.engine.lock()?;
        Ok(engine.add_custom_medication(medication.into()))
    }

    /// Selected medications as draft line items.
    pub fn selected_medications(&self) -> Result<Vec<FfiMedicationLine>, ConsultOrdersError> {
        let engine = self.engine.lock()?;
        Ok(engine
            .formatted_selections()
            .into_iter()
            .map(FfiMedicationLine::from)
            .collect())
    }

    pub fn clear_selections(&self) -> Result<(), ConsultOrdersError> {
        self.engine.lock()?.clear();
        Ok(())
    }

    // =========================================================================
    // Checks
    // =========================================================================

    /// Interaction findings for the current selections.
    pub fn check_interactions(
        &self,
        contraindications: String,
    ) -> Result<Vec<FfiInteractionFinding>, ConsultOrdersError> {
        let engine = self.engine.lock()?;
        let findings =
            validation::check_interactions(&engine.formatted_selections(), &contraindications);
        Ok(findings.into_iter().map(FfiInteractionFinding::from).collect())
    }

    /// Price in minor units for a follow-up period code.
    pub fn price_for_follow_up(&self, period: String) -> u64 {
        self.pricing.price_for_follow_up(&period)
    }

    /// Field errors for a draft built from the input and current selections.
    pub fn validate_draft(
        &self,
        input: FfiDraftInput,
    ) -> Result<Vec<FfiFieldError>, ConsultOrdersError> {
        let draft = self.assemble(input)?;
        let report = validate(&draft);
        Ok(report
            .errors
            .iter()
            .map(|(key, message)| FfiFieldError {
                field: key.to_string(),
                message: message.to_string(),
            })
            .collect())
    }

    // =========================================================================
    // Submission
    // =========================================================================

    /// Submit the consultation. Blocks until every step has run.
    pub fn submit_consultation(
        &self,
        input: FfiDraftInput,
    ) -> Result<FfiSubmissionReceipt, ConsultOrdersError> {
        let draft = self.assemble(input)?;

        let mut orchestrator = match self.orchestrator.try_lock() {
            Ok(guard) => guard,
            Err(std::sync::TryLockError::WouldBlock) => {
                return Err(ConsultOrdersError::SubmissionInProgress(
                    "a submission is already running".into(),
                ))
            }
            Err(std::sync::TryLockError::Poisoned(e)) => return Err(e.into()),
        };

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| ConsultOrdersError::PersistenceError(e.to_string()))?;
        let receipt = runtime.block_on(orchestrator.submit(&draft))?;

        Ok(receipt.into())
    }

    /// Whether a submission is currently running.
    pub fn is_submitting(&self) -> bool {
        self.submitting.is_set()
    }
}

impl ConsultOrdersCore {
    fn assemble(&self, input: FfiDraftInput) -> Result<ConsultationDraft, ConsultOrdersError> {
        let engine = self.engine.lock()?;
        let mut assembler = DraftAssembler::new()
            .notes(ClinicalNotes {
                hpi: input.hpi,
                pmh: input.pmh,
                contraindications: input.contraindications,
                assessment_plan: input.assessment_plan,
                patient_history: input.patient_history,
            })
            .resources(input.resource_ids);
        if let Some(patient_id) = input.patient_id {
            assembler = assembler.patient(patient_id);
        }
        if let Some(provider_id) = input.provider_id {
            assembler = assembler.provider(provider_id);
        }
        if let Some(service_id) = input.service_id {
            assembler = assembler.service(service_id, input.service_name.unwrap_or_default());
        }
        if let Some(period) = input.follow_up_period {
            assembler = assembler.follow_up(
                period,
                input.follow_up_display.unwrap_or_default(),
                input.follow_up_template,
            );
        }
        Ok(assembler.assemble(&engine))
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe catalog entry.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiCatalogEntry {
    pub id: String,
    pub name: String,
    pub brand_name: Option<String>,
    pub category: String,
    pub dosage_values: Vec<String>,
    pub dosage_labels: Vec<String>,
    pub default_dosage: Option<String>,
    pub frequency: String,
    pub default_approach: Option<String>,
    pub supported_approaches: Vec<String>,
    pub instructions: Vec<String>,
}

impl From<&MedicationCatalogEntry> for FfiCatalogEntry {
    fn from(entry: &MedicationCatalogEntry) -> Self {
        Self {
            id: entry.id.clone(),
            name: entry.name.clone(),
            brand_name: entry.brand_name.clone(),
            category: entry.category.as_str().to_string(),
            dosage_values: entry.dosage_options.iter().map(|o| o.value.clone()).collect(),
            dosage_labels: entry.dosage_options.iter().map(|o| o.label.clone()).collect(),
            default_dosage: entry.initial_dosage(),
            frequency: entry.frequency.clone(),
            default_approach: entry.initial_approach(),
            supported_approaches: entry.supported_approaches.clone(),
            instructions: entry.instructions.clone(),
        }
    }
}

/// FFI-safe custom medication input.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiCustomMedication {
    pub id: Option<String>,
    pub name: String,
    pub brand_name: Option<String>,
    pub category: Option<String>,
    pub dosages: Vec<String>,
    pub frequency: Option<String>,
    pub default_approach: Option<String>,
    pub supported_approaches: Vec<String>,
    pub instructions: Vec<String>,
}

impl From<FfiCustomMedication> for CustomMedication {
    fn from(med: FfiCustomMedication) -> Self {
        CustomMedication {
            id: med.id,
            name: med.name,
            brand_name: med.brand_name,
            category: med.category.as_deref().map(MedicationCategory::parse),
            dosages: med.dosages,
            frequency: med.frequency,
            default_approach: med.default_approach,
            supported_approaches: med.supported_approaches,
            instructions: med.instructions,
        }
    }
}

/// FFI-safe medication line.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiMedicationLine {
    pub id: String,
    pub name: String,
    pub brand_name: Option<String>,
    pub dosage: Option<String>,
    pub frequency: Option<String>,
    pub approach: Option<String>,
    pub instructions: Vec<String>,
    pub category: String,
    pub is_patient_preference: bool,
}

impl From<MedicationLineItem> for FfiMedicationLine {
    fn from(item: MedicationLineItem) -> Self {
        Self {
            id: item.id,
            name: item.name,
            brand_name: item.brand_name,
            dosage: item.dosage,
            frequency: item.frequency,
            approach: item.approach,
            instructions: item.instructions,
            category: item.category.as_str().to_string(),
            is_patient_preference: item.is_patient_preference,
        }
    }
}

/// FFI-safe interaction finding.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiInteractionFinding {
    pub rule_id: String,
    pub severity: String,
    pub message: String,
    pub blocking: bool,
}

impl From<InteractionFinding> for FfiInteractionFinding {
    fn from(finding: InteractionFinding) -> Self {
        Self {
            blocking: finding.severity.is_blocking(),
            rule_id: finding.rule_id,
            severity: finding.severity.as_str().to_string(),
            message: finding.message,
        }
    }
}

/// FFI-safe validation error.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiFieldError {
    pub field: String,
    pub message: String,
}

/// Consultation fields entered outside the medication picker.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiDraftInput {
    pub patient_id: Option<String>,
    pub provider_id: Option<String>,
    pub service_id: Option<String>,
    pub service_name: Option<String>,
    pub hpi: String,
    pub pmh: String,
    pub contraindications: String,
    pub assessment_plan: String,
    pub patient_history: String,
    pub follow_up_period: Option<String>,
    pub follow_up_display: Option<String>,
    pub follow_up_template: Option<String>,
    pub resource_ids: Vec<String>,
}

/// Per-channel delivery result reported by the host.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiChannelOutcome {
    pub channel: String,
    pub delivered: bool,
    pub error: Option<String>,
}

/// FFI-safe submission receipt.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiSubmissionReceipt {
    pub consultation_id: String,
    pub invoice_id: Option<String>,
    pub follow_up_id: Option<String>,
    pub warnings: Vec<FfiInteractionFinding>,
    /// Informational messages for steps that failed after saving
    pub degraded_messages: Vec<String>,
    pub notification_sent: bool,
}

impl From<SubmissionReceipt> for FfiSubmissionReceipt {
    fn from(receipt: SubmissionReceipt) -> Self {
        Self {
            degraded_messages: receipt.degraded.iter().map(|d| d.user_message()).collect(),
            notification_sent: matches!(
                receipt.notification,
                submission::NotificationStatus::Sent { .. }
            ),
            consultation_id: receipt.consultation_id,
            invoice_id: receipt.invoice_id,
            follow_up_id: receipt.follow_up_id,
            warnings: receipt
                .warnings
                .into_iter()
                .map(FfiInteractionFinding::from)
                .collect(),
        }
    }
}
