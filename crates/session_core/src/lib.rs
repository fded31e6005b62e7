//! Labeling session logic: the controller that hands rows to a reviewer and
//! records their labels, plus the runtime configuration both front ends read.

pub mod app_config;
mod controller;

pub use app_config::{load_config, GraderConfig};
pub use controller::{Draw, SessionController, SessionState};
pub use shared::{
    domain::{CategorySet, ColumnMapping, Progress, ResearchQuestion, RowView, MAX_CATEGORIES},
    error::{ErrorCode, ErrorReport, GraderError, GraderResult},
};
pub use storage::{Dataset, Settings, SettingsStore, TableFormat};
