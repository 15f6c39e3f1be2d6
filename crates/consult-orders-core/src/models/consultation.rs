//! Consultation models: the transient draft and the records persisted from it.

use serde::{Deserialize, Serialize};

use super::selection::MedicationLineItem;

/// The service a consultation is billed under.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServiceRef {
    pub id: String,
    pub name: String,
}

/// Free-text clinical fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ClinicalNotes {
    /// History of present illness
    pub hpi: String,
    /// Past medical history
    pub pmh: String,
    /// Known contraindications (scanned by the interaction checker)
    pub contraindications: String,
    pub assessment_plan: String,
    pub patient_history: String,
}

/// Follow-up interval.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum FollowUpPeriod {
    #[serde(rename = "2w")]
    TwoWeeks,
    #[serde(rename = "4w")]
    FourWeeks,
    #[serde(rename = "6w")]
    SixWeeks,
    #[serde(rename = "custom")]
    Custom,
}

impl FollowUpPeriod {
    pub fn code(&self) -> &'static str {
        match self {
            FollowUpPeriod::TwoWeeks => "2w",
            FollowUpPeriod::FourWeeks => "4w",
            FollowUpPeriod::SixWeeks => "6w",
            FollowUpPeriod::Custom => "custom",
        }
    }

    /// Parse a period code. Unknown codes are treated as custom.
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_lowercase().as_str() {
            "2w" => FollowUpPeriod::TwoWeeks,
            "4w" => FollowUpPeriod::FourWeeks,
            "6w" => FollowUpPeriod::SixWeeks,
            _ => FollowUpPeriod::Custom,
        }
    }

    /// Length in days, if fixed.
    pub fn days(&self) -> Option<u32> {
        match self {
            FollowUpPeriod::TwoWeeks => Some(14),
            FollowUpPeriod::FourWeeks => Some(28),
            FollowUpPeriod::SixWeeks => Some(42),
            FollowUpPeriod::Custom => None,
        }
    }
}

/// The clinician's follow-up choice.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FollowUpChoice {
    /// Period code as entered ("2w", "4w", "6w", "custom")
    pub period: String,
    /// Display text (e.g., "Follow up in 4 weeks")
    pub display_text: String,
    /// Follow-up template to schedule, if any
    pub template_id: Option<String>,
}

impl FollowUpChoice {
    pub fn period_kind(&self) -> FollowUpPeriod {
        FollowUpPeriod::from_code(&self.period)
    }
}

/// A consultation draft (transient, assembled at submission time).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConsultationDraft {
    pub patient_id: Option<String>,
    pub provider_id: Option<String>,
    /// Primary service
    pub service: Option<ServiceRef>,
    pub notes: ClinicalNotes,
    /// Formatted medication lines, in selection order
    pub medications: Vec<MedicationLineItem>,
    pub follow_up: Option<FollowUpChoice>,
    /// Educational resources attached to the consultation
    pub resource_ids: Vec<String>,
    /// Creation timestamp
    pub created_at: String,
    /// Last update timestamp
    pub updated_at: String,
}

impl ConsultationDraft {
    /// Create an empty draft.
    pub fn new() -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            patient_id: None,
            provider_id: None,
            service: None,
            notes: ClinicalNotes::default(),
            medications: Vec::new(),
            follow_up: None,
            resource_ids: Vec::new(),
            created_at: now.clone(),
            updated_at: now,
        }
    }

    pub fn service_id(&self) -> Option<&str> {
        self.service.as_ref().map(|s| s.id.as_str())
    }

    pub fn follow_up_template(&self) -> Option<&str> {
        self.follow_up
            .as_ref()
            .and_then(|f| f.template_id.as_deref())
            .filter(|t| !t.trim().is_empty())
    }

    /// Touch the updated_at timestamp.
    pub fn touch(&mut self) {
        self.updated_at = chrono::Utc::now().to_rfc3339();
    }
}

impl Default for ConsultationDraft {
    fn default() -> Self {
        Self::new()
    }
}

/// A persisted consultation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConsultationRecord {
    /// Id assigned by the store
    pub id: String,
    pub patient_id: Option<String>,
    pub provider_id: Option<String>,
    pub service: Option<ServiceRef>,
    pub notes: ClinicalNotes,
    pub medications: Vec<MedicationLineItem>,
    pub follow_up: Option<FollowUpChoice>,
    pub resource_ids: Vec<String>,
    pub created_at: String,
}

impl ConsultationRecord {
    /// Materialize a draft under a store-assigned id.
    pub fn from_draft(id: String, draft: &ConsultationDraft) -> Self {
        Self {
            id,
            patient_id: draft.patient_id.clone(),
            provider_id: draft.provider_id.clone(),
            service: draft.service.clone(),
            notes: draft.notes.clone(),
            medications: draft.medications.clone(),
            follow_up: draft.follow_up.clone(),
            resource_ids: draft.resource_ids.clone(),
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Invoice status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    Pending,
    Paid,
    Void,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Pending => "pending",
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Void => "void",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(InvoiceStatus::Pending),
            "paid" => Some(InvoiceStatus::Paid),
            "void" => Some(InvoiceStatus::Void),
            _ => None,
        }
    }
}

/// A single billable line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InvoiceItem {
    pub description: String,
    /// Amount in minor currency units
    pub amount: u64,
}

/// A persisted invoice.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Invoice {
    pub id: String,
    pub patient_id: String,
    pub consultation_id: String,
    pub items: Vec<InvoiceItem>,
    pub currency: String,
    pub status: InvoiceStatus,
    /// Due date (YYYY-MM-DD)
    pub due_date: String,
    pub created_at: String,
}

impl Invoice {
    pub fn total(&self) -> u64 {
        self.items.iter().map(|i| i.amount).sum()
    }
}

/// Payment state carried on a follow-up schedule.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// An invoice was issued and awaits payment
    Pending,
    /// No invoice could be attached
    Unbilled,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Unbilled => "unbilled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(PaymentStatus::Pending),
            "unbilled" => Some(PaymentStatus::Unbilled),
            _ => None,
        }
    }
}

/// A persisted follow-up schedule.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FollowUpSchedule {
    pub id: String,
    pub patient_id: String,
    pub consultation_id: String,
    pub template_id: String,
    /// Period code
    pub period: String,
    pub payment_status: PaymentStatus,
    pub invoice_id: Option<String>,
    pub created_at: String,
}
