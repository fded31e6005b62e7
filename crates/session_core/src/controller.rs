use std::path::Path;

use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};
use shared::{
    domain::{CategorySet, ColumnMapping, Progress, RowView},
    error::{GraderError, GraderResult},
};
use storage::Dataset;
use tracing::{debug, info};

/// Where a session currently sits in its load/draw/label cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Nothing loaded yet.
    Empty,
    /// A dataset is loaded but no row has been drawn.
    Loaded,
    /// A row is on screen waiting for a label.
    Labeling,
    /// The last draw found no unlabeled rows.
    Exhausted,
}

/// Result of asking for the next row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Draw {
    Row(RowView),
    Exhausted,
}

impl Draw {
    pub fn row(&self) -> Option<&RowView> {
        match self {
            Self::Row(row) => Some(row),
            Self::Exhausted => None,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::Exhausted)
    }
}

#[derive(Debug)]
struct LoadedTable {
    dataset: Dataset,
    title: usize,
    abstract_text: usize,
    output: usize,
}

impl LoadedTable {
    fn row_view(&self, index: usize) -> RowView {
        let text = |column| self.dataset.cell(index, column).unwrap_or_default().to_string();
        RowView {
            index,
            title: text(self.title),
            abstract_text: text(self.abstract_text),
        }
    }
}

/// Owns the loaded dataset, the resolved column positions and the row
/// currently shown to the reviewer. Rows are drawn uniformly at random among the unlabeled ones.
pub struct SessionController<R = StdRng> {
    table: Option<LoadedTable>,
    active: Option<usize>,
    exhausted: bool,
    dirty: bool,
    rng: R,
}

impl SessionController<StdRng> {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Deterministic draw order, for reproducible sessions.
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    pub fn from_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::seeded(seed),
            None => Self::new(),
        }
    }
}

impl Default for SessionController<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> SessionController<R> {
    pub fn with_rng(rng: R) -> Self {
        Self {
            table: None,
            active: None,
            exhausted: false,
            dirty: false,
            rng,
        }
    }

    /// Replaces the session's dataset. The title and abstract columns must
    /// exist; the output column is appended empty when missing. On error the
    /// previous session is left as it was.
    pub fn load(&mut self, mut dataset: Dataset, mapping: ColumnMapping) -> GraderResult<()> {
        let title = dataset
            .column_index(&mapping.title_column)
            .ok_or_else(|| GraderError::MissingColumn(mapping.title_column.clone()))?;
        let abstract_text = dataset
            .column_index(&mapping.abstract_column)
            .ok_or_else(|| GraderError::MissingColumn(mapping.abstract_column.clone()))?;
        let created = dataset.column_index(&mapping.output_column).is_none();
        let output = dataset.ensure_column(&mapping.output_column);

        info!(
            rows = dataset.row_count(),
            output_column = %mapping.output_column,
            created_output_column = created,
            "session loaded"
        );

        self.table = Some(LoadedTable {
            dataset,
            title,
            abstract_text,
            output,
        });
        self.active = None;
        self.exhausted = false;
        self.dirty = false;
        Ok(())
    }

    pub fn load_path(&mut self, path: impl AsRef<Path>, mapping: ColumnMapping) -> GraderResult<()> {
        let dataset = Dataset::read_path(path)?;
        self.load(dataset, mapping)
    }

    /// Picks a random unlabeled row and makes it active. When none is left
    /// the active selection is kept and [`Draw::Exhausted`] is returned.
    pub fn draw_next(&mut self) -> Draw {
        let Some(table) = &self.table else {
            return Draw::Exhausted;
        };

        let candidates = table.dataset.blank_rows(table.output);
        match candidates.choose(&mut self.rng) {
            Some(&index) => {
                debug!(row = index, unlabeled = candidates.len(), "row drawn");
                self.active = Some(index);
                self.exhausted = false;
                Draw::Row(table.row_view(index))
            }
            None => {
                debug!("no unlabeled rows left");
                self.exhausted = true;
                Draw::Exhausted
            }
        }
    }

    /// Draws again without labeling the active row. Another unlabeled row is
    /// preferred when one exists.
    pub fn skip(&mut self) -> GraderResult<Draw> {
        let current = self.active.ok_or(GraderError::NoActiveRow)?;
        let Some(table) = &self.table else {
            return Err(GraderError::NoActiveRow);
        };

        let others: Vec<usize> = table
            .dataset
            .blank_rows(table.output)
            .into_iter()
            .filter(|&index| index != current)
            .collect();
        let index = others.choose(&mut self.rng).copied().unwrap_or(current);
        debug!(from = current, to = index, "row skipped");
        self.active = Some(index);
        Ok(Draw::Row(table.row_view(index)))
    }

    /// Writes `label` into the active row and advances to the next draw.
    /// Fails without touching the dataset when no row is active or the label
    /// is not part of `categories`.
    pub fn submit_label(&mut self, label: &str, categories: &CategorySet) -> GraderResult<Draw> {
        let index = self.active.ok_or(GraderError::NoActiveRow)?;
        if !categories.contains(label) {
            return Err(GraderError::InvalidLabel(label.to_string()));
        }
        let table = self.table.as_mut().ok_or(GraderError::NoActiveRow)?;

        if !table.dataset.set_cell(index, table.output, label) {
            return Err(GraderError::NoActiveRow);
        }
        self.dirty = true;
        self.active = None;
        info!(row = index, label, "label recorded");

        Ok(self.draw_next())
    }

    pub fn progress(&self) -> Progress {
        self.table
            .as_ref()
            .map(|table| {
                Progress::new(
                    table.dataset.filled_count(table.output),
                    table.dataset.row_count(),
                )
            })
            .unwrap_or_default()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Writes the whole dataset to `destination` in the format it was loaded
    /// in. The dirty flag is cleared only when the write succeeded.
    pub fn save(&mut self, destination: impl AsRef<Path>) -> GraderResult<()> {
        let destination = destination.as_ref();
        let table = self.table.as_ref().ok_or_else(|| {
            GraderError::save_failed(destination, "no dataset is loaded")
        })?;

        table.dataset.write_path(destination)?;
        self.dirty = false;
        info!(
            path = %destination.display(),
            progress = %self.progress(),
            "dataset saved"
        );
        Ok(())
    }

    pub fn state(&self) -> SessionState {
        match (&self.table, self.active) {
            (None, _) => SessionState::Empty,
            (Some(_), Some(_)) => SessionState::Labeling,
            (Some(_), None) if self.exhausted => SessionState::Exhausted,
            (Some(_), None) => SessionState::Loaded,
        }
    }

    pub fn active_row(&self) -> Option<RowView> {
        let table = self.table.as_ref()?;
        self.active.map(|index| table.row_view(index))
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    pub fn dataset(&self) -> Option<&Dataset> {
        self.table.as_ref().map(|table| &table.dataset)
    }

    pub fn columns(&self) -> &[String] {
        self.table
            .as_ref()
            .map(|table| table.dataset.headers())
            .unwrap_or_default()
    }

    pub fn source_path(&self) -> Option<&Path> {
        self.table.as_ref()?.dataset.source_path()
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
