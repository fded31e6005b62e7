//! Controller layer: UI actions, error classification, and dispatch into the labeling session.

pub mod events;
pub mod orchestration;
