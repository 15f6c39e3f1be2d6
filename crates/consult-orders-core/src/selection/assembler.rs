//! Consultation draft assembly.

use crate::models::{ClinicalNotes, ConsultationDraft, FollowUpChoice, ServiceRef};

use super::SelectionEngine;

/// Collects the free-text and reference fields of a consultation and
/// combines them with the current selections into a [`ConsultationDraft`].
#[derive(Debug, Clone, Default)]
pub struct DraftAssembler {
    patient_id: Option<String>,
    provider_id: Option<String>,
    service: Option<ServiceRef>,
    notes: ClinicalNotes,
    follow_up: Option<FollowUpChoice>,
    resource_ids: Vec<String>,
}

impl DraftAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn patient(mut self, patient_id: impl Into<String>) -> Self {
        self.patient_id = non_blank(patient_id.into());
        self
    }

    pub fn provider(mut self, provider_id: impl Into<String>) -> Self {
        self.provider_id = non_blank(provider_id.into());
        self
    }

    pub fn service(mut self, id: impl Into<String>, name: impl Into<String>) -> Self {
        self.service = non_blank(id.into()).map(|id| ServiceRef {
            id,
            name: name.into(),
        });
        self
    }

    pub fn notes(mut self, notes: ClinicalNotes) -> Self {
        self.notes = notes;
        self
    }

    /// Follow-up period code, display text and optional template.
    pub fn follow_up(
        mut self,
        period: impl Into<String>,
        display_text: impl Into<String>,
        template_id: Option<String>,
    ) -> Self {
        self.follow_up = non_blank(period.into()).map(|period| FollowUpChoice {
            period,
            display_text: display_text.into(),
            template_id: template_id.and_then(non_blank),
        });
        self
    }

    pub fn resources<I, S>(mut self, resource_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.resource_ids = resource_ids.into_iter().map(Into::into).collect();
        self
    }

    /// Snapshot the engine's selections into a draft.
    pub fn assemble(&self, engine: &SelectionEngine) -> ConsultationDraft {
        let mut draft = ConsultationDraft::new();
        draft.patient_id = self.patient_id.clone();
        draft.provider_id = self.provider_id.clone();
        draft.service = self.service.clone();
        draft.notes = self.notes.clone();
        draft.medications = engine.formatted_selections();
        draft.follow_up = self.follow_up.clone();
        draft.resource_ids = self.resource_ids.clone();
        draft
    }
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::build_catalog;

    #[test]
    fn test_assemble_snapshots_selections() {
        let mut engine = SelectionEngine::new(build_catalog(Vec::new()));
        engine.toggle("semaglutide");

        let assembler = DraftAssembler::new()
            .patient("patient-1")
            .provider("provider-1")
            .service("weight-management", "Weight Management")
            .follow_up("4w", "Follow up in 4 weeks", Some("wm-checkin".into()))
            .resources(["res-1", "res-2"]);

        let draft = assembler.assemble(&engine);
        engine.toggle("semaglutide");

        assert_eq!(draft.patient_id.as_deref(), Some("patient-1"));
        assert_eq!(draft.service_id(), Some("weight-management"));
        assert_eq!(draft.medications.len(), 1);
        assert_eq!(draft.follow_up_template(), Some("wm-checkin"));
        assert_eq!(draft.resource_ids, vec!["res-1", "res-2"]);
        assert!(engine.is_empty());
    }

    #[test]
    fn test_blank_inputs_become_absent() {
        let engine = SelectionEngine::new(build_catalog(Vec::new()));
        let draft = DraftAssembler::new()
            .patient("  ")
            .provider("")
            .service("", "Nothing")
            .follow_up(" ", "None", Some("t".into()))
            .assemble(&engine);

        assert_eq!(draft.patient_id, None);
        assert_eq!(draft.provider_id, None);
        assert_eq!(draft.service, None);
        assert_eq!(draft.follow_up, None);
    }
}
