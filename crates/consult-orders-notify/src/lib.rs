//! Patient notification contract for consultation submission.
//!
//! This crate defines the boundary between the submission pipeline and
//! whatever delivers messages to patients (SMS, email, push). It also owns
//! the message templates those deliveries are rendered from.

pub mod dispatch;
pub mod templates;

pub use dispatch::*;
pub use templates::*;
