//! Notification message templates.
//!
//! Template ids are stable strings shared with the host application. Bodies
//! use `{note_id}` and `{patient_id}` placeholders.

/// Sent after a weight-management consultation.
pub const WEIGHT_MANAGEMENT_TEMPLATE: &str = "weight_management_plan_ready";

/// Sent after an ED consultation.
pub const ED_TEMPLATE: &str = "ed_plan_ready";

/// Sent after a primary-care consultation.
pub const PRIMARY_CARE_TEMPLATE: &str = "primary_care_plan_ready";

/// Sent after a mental-health consultation.
pub const MENTAL_HEALTH_TEMPLATE: &str = "mental_health_plan_ready";

/// Fallback for services without a dedicated template.
pub const DEFAULT_TEMPLATE: &str = "consultation_complete";

/// A message template with subject and body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageTemplate {
    pub id: &'static str,
    pub subject: &'static str,
    pub body: &'static str,
}

/// Built-in templates.
pub const TEMPLATES: &[MessageTemplate] = &[
    MessageTemplate {
        id: WEIGHT_MANAGEMENT_TEMPLATE,
        subject: "Your weight management plan is ready",
        body: "Your provider has finished your weight management consultation. \
               Review your treatment plan and dosing schedule in the app (ref {note_id}).",
    },
    MessageTemplate {
        id: ED_TEMPLATE,
        subject: "Your treatment plan is ready",
        body: "Your provider has reviewed your consultation and prepared a treatment plan. \
               Details are available in the app (ref {note_id}).",
    },
    MessageTemplate {
        id: PRIMARY_CARE_TEMPLATE,
        subject: "Your visit summary is ready",
        body: "Your primary care visit summary and prescriptions are available in the app \
               (ref {note_id}).",
    },
    MessageTemplate {
        id: MENTAL_HEALTH_TEMPLATE,
        subject: "Your care plan is ready",
        body: "Your provider has prepared your care plan. Open the app to review medications \
               and follow-up details (ref {note_id}).",
    },
    MessageTemplate {
        id: DEFAULT_TEMPLATE,
        subject: "Your consultation is complete",
        body: "Your consultation has been completed. Open the app to review your provider's \
               notes (ref {note_id}).",
    },
];

/// Look up a template by id, falling back to [`DEFAULT_TEMPLATE`].
pub fn find_template(id: &str) -> &'static MessageTemplate {
    TEMPLATES
        .iter()
        .find(|t| t.id == id)
        .or_else(|| TEMPLATES.iter().find(|t| t.id == DEFAULT_TEMPLATE))
        .unwrap_or(&TEMPLATES[TEMPLATES.len() - 1])
}

/// Render a template body for a given patient and note.
pub fn render_message(template_id: &str, patient_id: &str, note_id: &str) -> String {
    find_template(template_id)
        .body
        .replace("{patient_id}", patient_id)
        .replace("{note_id}", note_id)
}
