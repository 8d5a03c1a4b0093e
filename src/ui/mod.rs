//! egui rendering of the session state.

pub mod panels;
pub mod plot;
