//! Domain vocabulary and error model shared by the labeling core and its front ends.

pub mod domain;
pub mod error;

pub use domain::{
    CategorySet, ColumnMapping, Progress, ResearchQuestion, RowView, MAX_CATEGORIES,
};
pub use error::{ErrorCode, ErrorReport, GraderError, GraderResult};

#[cfg(test)]
#[path = "tests/domain_tests.rs"]
mod tests;
