//! UI actions, follow-up effects and error modeling for the desktop GUI controller.

use std::path::PathBuf;

use session_core::{ErrorCode, GraderError};

/// Column choices made in the column-selection window.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnChoice {
    pub title: Option<String>,
    pub abstract_text: Option<String>,
    pub existing_output: Option<String>,
    pub new_output: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnsavedChoice {
    Save,
    Discard,
    Cancel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiAction {
    DatasetChosen(PathBuf),
    ColumnsConfirmed(ColumnChoice),
    ColumnsCancelled,
    Highlight(usize),
    Commit,
    Skip,
    SaveRequested,
    SaveTo(PathBuf),
    SaveCancelled,
    ApplyOptions {
        slots: Vec<String>,
        question: String,
    },
    CloseRequested,
    UnsavedDecision(UnsavedChoice),
}

/// Work the UI must do after an action: open a dialog or close the window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    None,
    ChooseColumns,
    PickSavePath { suggested: Option<PathBuf> },
    ConfirmClose,
    Close,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    /// The reviewer can fix it by choosing differently.
    Input,
    /// Reading or writing a file failed.
    Storage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    LoadDataset,
    SelectColumns,
    Label,
    Save,
    Options,
}

impl UiErrorContext {
    pub fn label(self) -> &'static str {
        match self {
            Self::LoadDataset => "Load",
            Self::SelectColumns => "Columns",
            Self::Label => "Label",
            Self::Save => "Save",
            Self::Options => "Options",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    code: Option<ErrorCode>,
    message: String,
}

impl UiError {
    pub fn from_grader(context: UiErrorContext, err: &GraderError) -> Self {
        let category = if err.is_input_error() {
            UiErrorCategory::Input
        } else {
            UiErrorCategory::Storage
        };
        Self {
            category,
            context,
            code: Some(err.code()),
            message: err.to_string(),
        }
    }

    /// Validation failures raised by the GUI itself before reaching the session.
    pub fn input(context: UiErrorContext, message: impl Into<String>) -> Self {
        Self {
            category: UiErrorCategory::Input,
            context,
            code: None,
            message: message.into(),
        }
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn code(&self) -> Option<ErrorCode> {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
