//! Domain models for consultation orders.

mod catalog;
mod consultation;
mod selection;

pub use catalog::*;
pub use consultation::*;
pub use selection::*;
