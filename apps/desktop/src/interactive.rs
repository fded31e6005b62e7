//! Line-oriented labeling loop: renders the active row and dispatches one
//! command per input line to the session controller.

use std::{
    io::{BufRead, Write},
    path::{Path, PathBuf},
};

use anyhow::Result;
use chrono::Local;
use session_core::{Draw, GraderError, RowView, SessionController, SessionState, Settings};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    /// Quit with nothing left unsaved.
    Clean,
    /// Quit after explicitly discarding unsaved labels.
    Discarded,
    /// Input ended while labels were still unsaved.
    InputClosed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Label(String),
    Skip,
    Save,
    Progress,
    Help,
    Quit,
}

fn parse_command(line: &str, settings: &Settings) -> Option<Command> {
    let line = line.trim();
    match line {
        "" => None,
        "s" => Some(Command::Skip),
        "w" => Some(Command::Save),
        "p" => Some(Command::Progress),
        "?" | "h" => Some(Command::Help),
        "q" => Some(Command::Quit),
        _ => {
            let label = line
                .parse::<usize>()
                .ok()
                .and_then(|number| number.checked_sub(1))
                .and_then(|slot| settings.categories.get(slot))
                .unwrap_or(line);
            Some(Command::Label(label.to_string()))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UnsavedChoice {
    Save,
    Discard,
    Cancel,
}

pub struct LabelingLoop<'a, R, W> {
    session: &'a mut SessionController,
    settings: &'a Settings,
    save_to: PathBuf,
    input: R,
    output: W,
}

impl<'a, R: BufRead, W: Write> LabelingLoop<'a, R, W> {
    pub fn new(
        session: &'a mut SessionController,
        settings: &'a Settings,
        save_to: impl Into<PathBuf>,
        input: R,
        output: W,
    ) -> Self {
        Self {
            session,
            settings,
            save_to: save_to.into(),
            input,
            output,
        }
    }

    pub fn run(mut self) -> Result<LoopExit> {
        if self.settings.categories.is_empty() {
            writeln!(
                self.output,
                "No categories configured; run `grader configure --category <LABEL>` first."
            )?;
        }
        self.write_help()?;

        let draw = self.session.draw_next();
        self.render_draw(&draw)?;

        loop {
            write!(self.output, "> ")?;
            self.output.flush()?;
            let Some(line) = self.read_line()? else {
                return self.input_closed();
            };
            let Some(command) = parse_command(&line, self.settings) else {
                continue;
            };

            match command {
                Command::Label(label) => {
                    match self.session.submit_label(&label, &self.settings.categories) {
                        Ok(draw) => self.render_draw(&draw)?,
                        Err(err) => self.report(&err)?,
                    }
                }
                Command::Skip => match self.session.skip() {
                    Ok(draw) => self.render_draw(&draw)?,
                    Err(err) => self.report(&err)?,
                },
                Command::Save => {
                    self.save()?;
                }
                Command::Progress => {
                    writeln!(self.output, "{}", self.session.progress())?;
                }
                Command::Help => self.write_help()?,
                Command::Quit => {
                    if !self.session.is_dirty() {
                        return Ok(LoopExit::Clean);
                    }
                    match self.ask_unsaved()? {
                        Some(UnsavedChoice::Save) => {
                            if self.save()? {
                                return Ok(LoopExit::Clean);
                            }
                        }
                        Some(UnsavedChoice::Discard) => return Ok(LoopExit::Discarded),
                        Some(UnsavedChoice::Cancel) => {
                            writeln!(self.output, "Quit cancelled.")?;
                        }
                        None => return self.input_closed(),
                    }
                }
            }
        }
    }

    fn read_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line))
    }

    fn ask_unsaved(&mut self) -> Result<Option<UnsavedChoice>> {
        loop {
            write!(
                self.output,
                "You have unsaved changes. [s]ave, [d]iscard or [c]ancel? "
            )?;
            self.output.flush()?;
            let Some(line) = self.read_line()? else {
                return Ok(None);
            };
            match line.trim().to_ascii_lowercase().as_str() {
                "s" | "save" => return Ok(Some(UnsavedChoice::Save)),
                "d" | "discard" => return Ok(Some(UnsavedChoice::Discard)),
                "c" | "cancel" => return Ok(Some(UnsavedChoice::Cancel)),
                _ => continue,
            }
        }
    }

    /// Returns whether the dataset was written.
    fn save(&mut self) -> Result<bool> {
        match self.session.save(&self.save_to) {
            Ok(()) => {
                writeln!(
                    self.output,
                    "Saved {} at {}.",
                    self.save_to.display(),
                    Local::now().format("%H:%M:%S")
                )?;
                Ok(true)
            }
            Err(err) => {
                self.report(&err)?;
                Ok(false)
            }
        }
    }

    fn input_closed(&mut self) -> Result<LoopExit> {
        if self.session.is_dirty() {
            tracing::warn!(
                save_to = %self.save_to.display(),
                "input closed with unsaved labels"
            );
            writeln!(self.output, "Input closed; unsaved labels were not written.")?;
            return Ok(LoopExit::InputClosed);
        }
        Ok(LoopExit::Clean)
    }

    fn render_draw(&mut self, draw: &Draw) -> Result<()> {
        match draw {
            Draw::Row(row) => self.render_row(row),
            Draw::Exhausted => {
                let message = match self.session.state() {
                    SessionState::Empty => "Nothing to label: no dataset is loaded.",
                    _ => "No unlabeled rows left.",
                };
                writeln!(self.output, "{message} {}", self.session.progress())?;
                Ok(())
            }
        }
    }

    fn render_row(&mut self, row: &RowView) -> Result<()> {
        writeln!(self.output)?;
        writeln!(self.output, "Title: {}", row.title)?;
        writeln!(self.output, "Abstract:\n{}", row.abstract_text)?;
        writeln!(
            self.output,
            "Research question: {}",
            self.settings.research_question
        )?;
        let choices: Vec<String> = self
            .settings
            .categories
            .iter()
            .enumerate()
            .map(|(slot, label)| format!("[{}] {label}", slot + 1))
            .collect();
        writeln!(self.output, "{}", choices.join("  "))?;
        writeln!(self.output, "{}", self.session.progress())?;
        Ok(())
    }

    fn report(&mut self, err: &GraderError) -> Result<()> {
        tracing::debug!(code = ?err.code(), "{err}");
        writeln!(self.output, "! {err}")?;
        Ok(())
    }

    fn write_help(&mut self) -> Result<()> {
        writeln!(
            self.output,
            "Commands: <number> or <label> to label, s skip, w save, p progress, ? help, q quit"
        )?;
        Ok(())
    }
}

/// Destination used when none is given: the file the dataset came from.
pub fn default_save_path(session: &SessionController, input: &Path) -> PathBuf {
    session
        .source_path()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| input.to_path_buf())
}

#[cfg(test)]
#[path = "tests/interactive_tests.rs"]
mod tests;
