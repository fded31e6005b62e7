//! UI layer for the desktop GUI: app shell, panels and dialogs.

pub mod app;

pub use app::{GraderApp, StartupConfig};
