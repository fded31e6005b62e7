use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{GraderError, GraderResult};

pub const MAX_CATEGORIES: usize = 5;

pub const DEFAULT_RESEARCH_QUESTION: &str = "No research question configured yet.";

/// Names of the three dataset columns a session works with.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnMapping {
    pub title_column: String,
    pub abstract_column: String,
    pub output_column: String,
}

impl ColumnMapping {
    pub fn new(
        title_column: impl Into<String>,
        abstract_column: impl Into<String>,
        output_column: impl Into<String>,
    ) -> Self {
        Self {
            title_column: title_column.into(),
            abstract_column: abstract_column.into(),
            output_column: output_column.into(),
        }
    }

    /// Builds a mapping from a column picker where the output column is either
    /// an existing header or a freshly typed name. A non-blank new name wins.
    pub fn from_selection(
        title_column: impl Into<String>,
        abstract_column: impl Into<String>,
        existing_output: Option<&str>,
        new_output: &str,
    ) -> Option<Self> {
        let output_column = match new_output.trim() {
            "" => existing_output?.to_string(),
            typed => typed.to_string(),
        };
        Some(Self::new(title_column, abstract_column, output_column))
    }
}

/// Ordered list of the labels a reviewer may assign. Holds at most
/// [`MAX_CATEGORIES`] trimmed, distinct, non-empty labels. The default set is
/// empty, which rejects every label until the reviewer configures one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct CategorySet(Vec<String>);

impl CategorySet {
    pub fn new<I, S>(labels: I) -> GraderResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut validated: Vec<String> = Vec::new();
        for (position, label) in labels.into_iter().enumerate() {
            let label = label.as_ref().trim();
            if label.is_empty() {
                return Err(GraderError::InvalidCategorySet(format!(
                    "label {} is empty",
                    position + 1
                )));
            }
            if validated.iter().any(|existing| existing == label) {
                return Err(GraderError::InvalidCategorySet(format!(
                    "label '{label}' appears more than once"
                )));
            }
            validated.push(label.to_string());
        }

        if validated.is_empty() {
            return Err(GraderError::InvalidCategorySet(
                "at least one category label is required".to_string(),
            ));
        }
        if validated.len() > MAX_CATEGORIES {
            return Err(GraderError::InvalidCategorySet(format!(
                "at most {MAX_CATEGORIES} category labels are supported, got {}",
                validated.len()
            )));
        }

        Ok(Self(validated))
    }

    /// Like [`CategorySet::new`] but drops blank slots first, the way an
    /// options form with five text boxes is filled in.
    pub fn from_slots<I, S>(slots: I) -> GraderResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let filled: Vec<String> = slots
            .into_iter()
            .filter(|slot| !slot.as_ref().trim().is_empty())
            .map(|slot| slot.as_ref().to_string())
            .collect();
        Self::new(filled)
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Exact, case-sensitive membership. Front ends trim typed input first.
    pub fn contains(&self, label: &str) -> bool {
        self.0.iter().any(|existing| existing == label)
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }

    pub fn labels(&self) -> &[String] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl TryFrom<Vec<String>> for CategorySet {
    type Error = GraderError;

    fn try_from(value: Vec<String>) -> Result<Self, Self::Error> {
        if value.is_empty() {
            return Ok(Self::empty());
        }
        Self::new(value)
    }
}

impl From<CategorySet> for Vec<String> {
    fn from(value: CategorySet) -> Self {
        value.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResearchQuestion(String);

impl ResearchQuestion {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ResearchQuestion {
    fn default() -> Self {
        Self(DEFAULT_RESEARCH_QUESTION.to_string())
    }
}

impl fmt::Display for ResearchQuestion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Count of labeled rows against all rows of the loaded dataset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub labeled: usize,
    pub total: usize,
}

impl Progress {
    pub fn new(labeled: usize, total: usize) -> Self {
        Self { labeled, total }
    }

    pub fn fraction(&self) -> f32 {
        if self.total == 0 {
            0.0
        } else {
            self.labeled as f32 / self.total as f32
        }
    }

    pub fn remaining(&self) -> usize {
        self.total.saturating_sub(self.labeled)
    }

    pub fn is_complete(&self) -> bool {
        self.labeled >= self.total
    }
}

impl From<Progress> for (usize, usize) {
    fn from(value: Progress) -> Self {
        (value.labeled, value.total)
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} rows completed", self.labeled, self.total)
    }
}

/// The row currently presented for judgment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowView {
    pub index: usize,
    pub title: String,
    pub abstract_text: String,
}
