//! Dispatch from UI actions to the labeling session and settings store.
//!
//! [`Workbench`] holds everything the window renders apart from widget-local
//! form buffers, so the whole interaction flow runs without a GUI context.

use std::path::{Path, PathBuf};

use chrono::Local;
use session_core::{
    CategorySet, ColumnMapping, Dataset, Draw, GraderError, Progress, ResearchQuestion, RowView,
    SessionController, SessionState, Settings, SettingsStore,
};

use crate::controller::events::{
    ColumnChoice, Effect, UiAction, UiError, UiErrorContext, UnsavedChoice,
};

/// A dataset that has been read but still waits for its column mapping.
#[derive(Debug, Clone)]
pub struct PendingDataset {
    pub path: PathBuf,
    pub dataset: Dataset,
}

pub struct Workbench {
    session: SessionController,
    settings: Settings,
    store: SettingsStore,
    pending: Option<PendingDataset>,
    current: Option<RowView>,
    highlighted: Option<usize>,
    close_after_save: bool,
    status: String,
    error: Option<UiError>,
}

impl Workbench {
    pub fn new(session: SessionController, store: SettingsStore) -> Self {
        let settings = store.load_or_default();
        let status = if settings.categories.is_empty() {
            "No categories configured yet; open Options to add some.".to_string()
        } else {
            "Load a dataset to begin.".to_string()
        };
        Self {
            session,
            settings,
            store,
            pending: None,
            current: None,
            highlighted: None,
            close_after_save: false,
            status,
            error: None,
        }
    }

    pub fn dispatch(&mut self, action: UiAction) -> Effect {
        let action_name = match &action {
            UiAction::DatasetChosen(_) => "dataset_chosen",
            UiAction::ColumnsConfirmed(_) => "columns_confirmed",
            UiAction::ColumnsCancelled => "columns_cancelled",
            UiAction::Highlight(_) => "highlight",
            UiAction::Commit => "commit",
            UiAction::Skip => "skip",
            UiAction::SaveRequested => "save_requested",
            UiAction::SaveTo(_) => "save_to",
            UiAction::SaveCancelled => "save_cancelled",
            UiAction::ApplyOptions { .. } => "apply_options",
            UiAction::CloseRequested => "close_requested",
            UiAction::UnsavedDecision(_) => "unsaved_decision",
        };
        tracing::debug!(action = action_name, "dispatching ui action");

        match action {
            UiAction::DatasetChosen(path) => self.open_dataset(path),
            UiAction::ColumnsConfirmed(choice) => self.confirm_columns(choice),
            UiAction::ColumnsCancelled => {
                self.pending = None;
                self.set_status("Column selection cancelled.");
                Effect::None
            }
            UiAction::Highlight(slot) => {
                if self.settings.categories.get(slot).is_some() {
                    self.highlighted = Some(slot);
                }
                Effect::None
            }
            UiAction::Commit => self.commit(),
            UiAction::Skip => {
                match self.session.skip() {
                    Ok(draw) => self.show_draw(draw),
                    Err(err) => self.fail(UiErrorContext::Label, &err),
                }
                Effect::None
            }
            UiAction::SaveRequested => {
                if self.session.dataset().is_none() {
                    self.error = Some(UiError::input(
                        UiErrorContext::Save,
                        "Load a dataset before saving.",
                    ));
                    return Effect::None;
                }
                Effect::PickSavePath {
                    suggested: self.session.source_path().map(Path::to_path_buf),
                }
            }
            UiAction::SaveTo(path) => self.save_to(&path),
            UiAction::SaveCancelled => {
                self.close_after_save = false;
                Effect::None
            }
            UiAction::ApplyOptions { slots, question } => {
                self.apply_options(&slots, question);
                Effect::None
            }
            UiAction::CloseRequested => {
                if self.session.is_dirty() {
                    Effect::ConfirmClose
                } else {
                    Effect::Close
                }
            }
            UiAction::UnsavedDecision(choice) => match choice {
                UnsavedChoice::Save => {
                    self.close_after_save = true;
                    self.dispatch(UiAction::SaveRequested)
                }
                UnsavedChoice::Discard => {
                    tracing::info!("closing with unsaved labels discarded");
                    Effect::Close
                }
                UnsavedChoice::Cancel => Effect::None,
            },
        }
    }

    fn open_dataset(&mut self, path: PathBuf) -> Effect {
        match Dataset::read_path(&path) {
            Ok(dataset) => {
                self.set_status(format!(
                    "Read {} rows from {}; choose the columns to use.",
                    dataset.row_count(),
                    path.display()
                ));
                self.pending = Some(PendingDataset { path, dataset });
                Effect::ChooseColumns
            }
            Err(err) => {
                self.fail(UiErrorContext::LoadDataset, &err);
                Effect::None
            }
        }
    }

    fn confirm_columns(&mut self, choice: ColumnChoice) -> Effect {
        let Some(pending) = &self.pending else {
            return Effect::None;
        };
        let (Some(title), Some(abstract_text)) = (choice.title, choice.abstract_text) else {
            self.error = Some(UiError::input(
                UiErrorContext::SelectColumns,
                "Choose both a title and an abstract column.",
            ));
            return Effect::ChooseColumns;
        };
        let Some(mapping) = ColumnMapping::from_selection(
            title,
            abstract_text,
            choice.existing_output.as_deref(),
            &choice.new_output,
        ) else {
            self.error = Some(UiError::input(
                UiErrorContext::SelectColumns,
                "Choose an output column or type a new column name.",
            ));
            return Effect::ChooseColumns;
        };

        let discarding = self.session.is_dirty();
        if let Err(err) = self.session.load(pending.dataset.clone(), mapping) {
            self.fail(UiErrorContext::SelectColumns, &err);
            return Effect::ChooseColumns;
        }
        if discarding {
            tracing::warn!("previous session had unsaved labels; they were discarded");
        }

        let path = pending.path.clone();
        self.pending = None;
        self.current = None;
        self.highlighted = None;
        self.error = None;
        self.set_status(format!(
            "Loaded {}. {}. Press Start to begin.",
            path.display(),
            self.session.progress()
        ));
        Effect::None
    }

    fn commit(&mut self) -> Effect {
        if self.session.state() != SessionState::Labeling {
            let draw = self.session.draw_next();
            self.show_draw(draw);
            return Effect::None;
        }

        let Some(label) = self
            .highlighted
            .and_then(|slot| self.settings.categories.get(slot))
            .map(str::to_string)
        else {
            self.error = Some(UiError::input(UiErrorContext::Label, "No score selected."));
            return Effect::None;
        };

        match self.session.submit_label(&label, &self.settings.categories) {
            Ok(draw) => {
                self.highlighted = None;
                self.show_draw(draw);
            }
            Err(err) => self.fail(UiErrorContext::Label, &err),
        }
        Effect::None
    }

    fn show_draw(&mut self, draw: Draw) {
        self.error = None;
        match draw {
            Draw::Row(row) => {
                self.current = Some(row);
            }
            Draw::Exhausted => {
                self.current = None;
                let message = match self.session.state() {
                    SessionState::Empty => "Load a dataset before starting.".to_string(),
                    _ => format!("No unlabeled rows left. {}", self.session.progress()),
                };
                self.set_status(message);
            }
        }
    }

    fn save_to(&mut self, path: &Path) -> Effect {
        let close = std::mem::take(&mut self.close_after_save);
        match self.session.save(path) {
            Ok(()) => {
                self.error = None;
                self.set_status(format!(
                    "Saved {} at {}.",
                    path.display(),
                    Local::now().format("%H:%M:%S")
                ));
                if close {
                    Effect::Close
                } else {
                    Effect::None
                }
            }
            Err(err) => {
                self.fail(UiErrorContext::Save, &err);
                Effect::None
            }
        }
    }

    fn apply_options(&mut self, slots: &[String], question: String) {
        let result = CategorySet::from_slots(slots).and_then(|categories| {
            let question = ResearchQuestion::new(question);
            self.store.save(&categories, &question)?;
            Ok(Settings {
                categories,
                research_question: question,
            })
        });

        match result {
            Ok(settings) => {
                self.settings = settings;
                self.highlighted = None;
                self.error = None;
                self.set_status(format!(
                    "Options saved to {}.",
                    self.store.path().display()
                ));
            }
            Err(err) => self.fail(UiErrorContext::Options, &err),
        }
    }

    fn fail(&mut self, context: UiErrorContext, err: &GraderError) {
        tracing::warn!(context = context.label(), code = ?err.code(), "{err}");
        self.error = Some(UiError::from_grader(context, err));
    }

    fn set_status(&mut self, message: impl Into<String>) {
        self.status = message.into();
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn pending(&self) -> Option<&PendingDataset> {
        self.pending.as_ref()
    }

    pub fn current_row(&self) -> Option<&RowView> {
        self.current.as_ref()
    }

    pub fn highlighted(&self) -> Option<usize> {
        self.highlighted
    }

    pub fn commit_label(&self) -> &'static str {
        match self.session.state() {
            SessionState::Labeling => "Submit score",
            _ => "Start",
        }
    }

    pub fn progress(&self) -> Progress {
        self.session.progress()
    }

    pub fn is_dirty(&self) -> bool {
        self.session.is_dirty()
    }

    pub fn can_skip(&self) -> bool {
        self.session.state() == SessionState::Labeling
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn error(&self) -> Option<&UiError> {
        self.error.as_ref()
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    /// Five option slots prefilled from the current category set.
    pub fn option_slots(&self) -> Vec<String> {
        (0..session_core::MAX_CATEGORIES)
            .map(|slot| {
                self.settings
                    .categories
                    .get(slot)
                    .unwrap_or_default()
                    .to_string()
            })
            .collect()
    }
}

#[cfg(test)]
#[path = "tests/orchestration_tests.rs"]
mod tests;
