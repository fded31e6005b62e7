//! Persistence of the reviewer-facing configuration: the category labels and
//! the research question. The file is TOML with two sections:
//!
//! ```toml
//! [category_labels]
//! button_1 = "Include"
//! button_2 = "Exclude"
//!
//! [research_question]
//! rq_text = "Does the study report outcomes for adults?"
//! ```
//!
//! Missing sections or keys fall back to per-key defaults. Legacy INI files
//! (`[ButtonLabels]` / `[ResearchQuestion]`) are not read; they load as
//! [`GraderError::SettingsCorrupt`] and the reviewer re-enters the options.

use std::{
    collections::BTreeMap,
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use shared::{
    domain::{CategorySet, ResearchQuestion, MAX_CATEGORIES},
    error::{GraderError, GraderResult},
};
use tracing::{info, warn};

use crate::atomic::write_atomically;

const RESEARCH_QUESTION_KEY: &str = "rq_text";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    pub categories: CategorySet,
    pub research_question: ResearchQuestion,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct SettingsFile {
    category_labels: BTreeMap<String, String>,
    research_question: BTreeMap<String, String>,
}

fn button_key(slot: usize) -> String {
    format!("button_{}", slot + 1)
}

impl SettingsFile {
    fn from_settings(categories: &CategorySet, research_question: &ResearchQuestion) -> Self {
        let category_labels = categories
            .iter()
            .enumerate()
            .map(|(slot, label)| (button_key(slot), label.to_string()))
            .collect();
        let research_question = BTreeMap::from([(
            RESEARCH_QUESTION_KEY.to_string(),
            research_question.as_str().to_string(),
        )]);
        Self {
            category_labels,
            research_question,
        }
    }

    fn into_settings(self) -> GraderResult<Settings> {
        let labels: Vec<String> = (0..MAX_CATEGORIES)
            .filter_map(|slot| self.category_labels.get(&button_key(slot)))
            .filter(|label| !label.trim().is_empty())
            .cloned()
            .collect();
        let categories = if labels.is_empty() {
            CategorySet::empty()
        } else {
            CategorySet::new(labels)?
        };
        let research_question = self
            .research_question
            .get(RESEARCH_QUESTION_KEY)
            .map(ResearchQuestion::new)
            .unwrap_or_default();
        Ok(Settings {
            categories,
            research_question,
        })
    }
}

/// Reads settings from `path`. A missing file yields the defaults; an existing
/// file that cannot be read or parsed yields [`GraderError::SettingsCorrupt`].
pub fn load_settings(path: impl AsRef<Path>) -> GraderResult<Settings> {
    let path = path.as_ref();
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            info!(path = %path.display(), "no settings file, using defaults");
            return Ok(Settings::default());
        }
        Err(err) => return Err(corrupt(path, err)),
    };

    let file: SettingsFile = toml::from_str(&raw).map_err(|err| corrupt(path, err))?;
    file.into_settings().map_err(|err| corrupt(path, err))
}

/// [`load_settings`], degrading a corrupt file to the defaults with a warning.
pub fn load_settings_or_default(path: impl AsRef<Path>) -> Settings {
    let path = path.as_ref();
    match load_settings(path) {
        Ok(settings) => settings,
        Err(err) => {
            warn!(path = %path.display(), "{err}; falling back to default settings");
            Settings::default()
        }
    }
}

/// Replaces the settings file at `path`. The category set must hold at least
/// one label. A failed write leaves the previous file untouched.
pub fn save_settings(
    path: impl AsRef<Path>,
    categories: &CategorySet,
    research_question: &ResearchQuestion,
) -> GraderResult<()> {
    let path = path.as_ref();
    if categories.is_empty() {
        return Err(GraderError::InvalidCategorySet(
            "at least one category label is required".to_string(),
        ));
    }

    let rendered = toml::to_string_pretty(&SettingsFile::from_settings(
        categories,
        research_question,
    ))
    .map_err(|err| GraderError::save_failed(path, err))?;

    write_atomically::<io::Error, _>(path, |file| file.write_all(rendered.as_bytes()))
        .map_err(|err| GraderError::save_failed(path, err))?;

    info!(
        path = %path.display(),
        categories = categories.len(),
        "settings saved"
    );
    Ok(())
}

fn corrupt(path: &Path, reason: impl ToString) -> GraderError {
    GraderError::SettingsCorrupt {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}

/// Settings bound to one explicit file location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> GraderResult<Settings> {
        load_settings(&self.path)
    }

    pub fn load_or_default(&self) -> Settings {
        load_settings_or_default(&self.path)
    }

    pub fn save(
        &self,
        categories: &CategorySet,
        research_question: &ResearchQuestion,
    ) -> GraderResult<()> {
        save_settings(&self.path, categories, research_question)
    }
}

#[cfg(test)]
#[path = "tests/settings_tests.rs"]
mod tests;
