//! Medication selection engine and draft assembly.
//!
//! Flow: Catalog → SelectionEngine (UI edits) → DraftAssembler → ConsultationDraft

mod assembler;
mod engine;

pub use assembler::*;
pub use engine::*;
