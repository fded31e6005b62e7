use std::path::PathBuf;

use eframe::egui;

use crate::controller::events::{
    ColumnChoice, Effect, UiAction, UiError, UiErrorCategory, UnsavedChoice,
};
use crate::controller::orchestration::Workbench;
use session_core::{SessionController, SettingsStore};

#[derive(Debug, Clone)]
pub struct StartupConfig {
    pub settings_path: PathBuf,
    pub seed: Option<u64>,
    /// Dataset opened right away, as if chosen through Load.
    pub dataset: Option<PathBuf>,
}

#[derive(Debug, Default)]
struct ColumnForm {
    choice: ColumnChoice,
}

#[derive(Debug)]
struct OptionsForm {
    slots: Vec<String>,
    question: String,
}

fn err_label(category: UiErrorCategory) -> &'static str {
    match category {
        UiErrorCategory::Input => "Check your input",
        UiErrorCategory::Storage => "File error",
    }
}

pub struct GraderApp {
    workbench: Workbench,
    column_form: Option<ColumnForm>,
    options_form: Option<OptionsForm>,
    confirm_close_open: bool,
    allow_close: bool,
}

impl GraderApp {
    pub fn new(startup: StartupConfig) -> Self {
        let session = SessionController::from_seed(startup.seed);
        let store = SettingsStore::new(startup.settings_path);
        let mut app = Self {
            workbench: Workbench::new(session, store),
            column_form: None,
            options_form: None,
            confirm_close_open: false,
            allow_close: false,
        };
        if let Some(path) = startup.dataset {
            app.dispatch(None, UiAction::DatasetChosen(path));
        }
        app
    }

    fn dispatch(&mut self, ctx: Option<&egui::Context>, action: UiAction) {
        let effect = self.workbench.dispatch(action);
        self.apply_effect(ctx, effect);
    }

    fn apply_effect(&mut self, ctx: Option<&egui::Context>, effect: Effect) {
        match effect {
            Effect::None => {}
            Effect::ChooseColumns => {
                if self.column_form.is_none() {
                    self.column_form = Some(ColumnForm::default());
                }
            }
            Effect::PickSavePath { suggested } => {
                let mut dialog = rfd::FileDialog::new()
                    .add_filter("CSV", &["csv"])
                    .add_filter("TSV", &["tsv", "tab"]);
                if let Some(path) = &suggested {
                    if let Some(dir) = path.parent() {
                        dialog = dialog.set_directory(dir);
                    }
                    if let Some(name) = path.file_name() {
                        dialog = dialog.set_file_name(name.to_string_lossy());
                    }
                }
                let next = match dialog.save_file() {
                    Some(path) => UiAction::SaveTo(path),
                    None => UiAction::SaveCancelled,
                };
                self.dispatch(ctx, next);
            }
            Effect::ConfirmClose => self.confirm_close_open = true,
            Effect::Close => {
                self.allow_close = true;
                self.confirm_close_open = false;
                if let Some(ctx) = ctx {
                    ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                }
            }
        }
    }

    fn pick_dataset(&mut self, ctx: &egui::Context) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Tables", &["csv", "tsv", "tab"])
            .pick_file()
        {
            self.column_form = None;
            self.dispatch(Some(ctx), UiAction::DatasetChosen(path));
        }
    }

    fn show_top_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("grader_top_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.button("Load").clicked() {
                    self.pick_dataset(ctx);
                }
                if ui.button("Options").clicked() {
                    self.options_form = Some(OptionsForm {
                        slots: self.workbench.option_slots(),
                        question: self
                            .workbench
                            .settings()
                            .research_question
                            .as_str()
                            .to_string(),
                    });
                }
                if ui.button("Save").clicked() {
                    self.dispatch(Some(ctx), UiAction::SaveRequested);
                }
                if self.workbench.is_dirty() {
                    ui.label(egui::RichText::new("unsaved labels").weak());
                }
            });
        });
    }

    fn show_status_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("grader_status_bar").show(ctx, |ui| {
            let progress = self.workbench.progress();
            ui.add(
                egui::ProgressBar::new(progress.fraction())
                    .text(progress.to_string())
                    .desired_width(ui.available_width()),
            );

            let error = self.workbench.error().cloned();
            ui.horizontal(|ui| match error {
                Some(error) => {
                    show_error(ui, &error);
                    if ui.small_button("Dismiss").clicked() {
                        self.workbench.dismiss_error();
                    }
                }
                None => {
                    ui.small(egui::RichText::new(self.workbench.status()).weak());
                }
            });
        });
    }

    fn show_labeling_panel(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let row = self.workbench.current_row().cloned();

            ui.label(egui::RichText::new("Title").strong());
            ui.label(row.as_ref().map(|row| row.title.as_str()).unwrap_or(""));
            ui.separator();

            ui.label(egui::RichText::new("Abstract").strong());
            egui::ScrollArea::vertical()
                .id_salt("abstract_scroll")
                .max_height((ui.available_height() - 160.0).max(80.0))
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    ui.label(
                        row.as_ref()
                            .map(|row| row.abstract_text.as_str())
                            .unwrap_or(""),
                    );
                });
            ui.separator();

            ui.label(egui::RichText::new("Research question").strong());
            ui.label(self.workbench.settings().research_question.as_str());
            ui.separator();

            let labels: Vec<String> = self
                .workbench
                .settings()
                .categories
                .iter()
                .map(str::to_string)
                .collect();
            let highlighted = self.workbench.highlighted();
            ui.horizontal_wrapped(|ui| {
                for (slot, label) in labels.iter().enumerate() {
                    let button =
                        egui::Button::new(label.as_str()).selected(highlighted == Some(slot));
                    if ui.add(button).clicked() {
                        self.dispatch(Some(ctx), UiAction::Highlight(slot));
                    }
                }
            });

            ui.add_space(8.0);
            ui.horizontal(|ui| {
                if ui.button(self.workbench.commit_label()).clicked() {
                    self.dispatch(Some(ctx), UiAction::Commit);
                }
                if ui
                    .add_enabled(self.workbench.can_skip(), egui::Button::new("Skip"))
                    .clicked()
                {
                    self.dispatch(Some(ctx), UiAction::Skip);
                }
            });
        });
    }

    fn show_column_window(&mut self, ctx: &egui::Context) {
        let Some(columns) = self
            .workbench
            .pending()
            .map(|pending| pending.dataset.headers().to_vec())
        else {
            self.column_form = None;
            return;
        };
        let Some(form) = self.column_form.as_mut() else {
            return;
        };

        let mut confirmed = false;
        let mut cancelled = false;
        egui::Window::new("Select columns")
            .collapsible(false)
            .resizable(false)
            .show(ctx, |ui| {
                column_combo(ui, "title_column", "Title column", &columns, &mut form.choice.title);
                column_combo(
                    ui,
                    "abstract_column",
                    "Abstract column",
                    &columns,
                    &mut form.choice.abstract_text,
                );
                column_combo(
                    ui,
                    "output_column",
                    "Output column",
                    &columns,
                    &mut form.choice.existing_output,
                );
                ui.horizontal(|ui| {
                    ui.label("or new output column");
                    ui.text_edit_singleline(&mut form.choice.new_output);
                });
                ui.separator();
                ui.horizontal(|ui| {
                    confirmed = ui.button("Load").clicked();
                    cancelled = ui.button("Cancel").clicked();
                });
            });

        if confirmed {
            let choice = form.choice.clone();
            let effect = self.workbench.dispatch(UiAction::ColumnsConfirmed(choice));
            if effect != Effect::ChooseColumns {
                self.column_form = None;
            }
            self.apply_effect(Some(ctx), effect);
        } else if cancelled {
            self.column_form = None;
            self.dispatch(Some(ctx), UiAction::ColumnsCancelled);
        }
    }

    fn show_options_window(&mut self, ctx: &egui::Context) {
        let Some(form) = self.options_form.as_mut() else {
            return;
        };

        let mut applied = false;
        let mut closed = false;
        egui::Window::new("Options")
            .collapsible(false)
            .resizable(false)
            .show(ctx, |ui| {
                for (slot, text) in form.slots.iter_mut().enumerate() {
                    ui.horizontal(|ui| {
                        ui.label(format!("Button {}", slot + 1));
                        ui.text_edit_singleline(text);
                    });
                }
                ui.label("Research question");
                ui.text_edit_multiline(&mut form.question);
                ui.separator();
                ui.horizontal(|ui| {
                    applied = ui.button("Apply").clicked();
                    closed = ui.button("Close").clicked();
                });
            });

        if applied {
            let action = UiAction::ApplyOptions {
                slots: form.slots.clone(),
                question: form.question.clone(),
            };
            self.dispatch(Some(ctx), action);
            if self.workbench.error().is_none() {
                self.options_form = None;
            }
        } else if closed {
            self.options_form = None;
        }
    }

    fn show_close_prompt(&mut self, ctx: &egui::Context) {
        if !self.confirm_close_open {
            return;
        }

        let mut choice = None;
        egui::Window::new("Unsaved changes")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
            .show(ctx, |ui| {
                ui.label("You have unsaved changes. Do you want to save them before exiting?");
                ui.horizontal(|ui| {
                    if ui.button("Save").clicked() {
                        choice = Some(UnsavedChoice::Save);
                    }
                    if ui.button("Discard").clicked() {
                        choice = Some(UnsavedChoice::Discard);
                    }
                    if ui.button("Cancel").clicked() {
                        choice = Some(UnsavedChoice::Cancel);
                    }
                });
            });

        if let Some(choice) = choice {
            self.confirm_close_open = false;
            self.dispatch(Some(ctx), UiAction::UnsavedDecision(choice));
        }
    }

    fn handle_close_request(&mut self, ctx: &egui::Context) {
        if !ctx.input(|i| i.viewport().close_requested()) || self.allow_close {
            return;
        }
        let effect = self.workbench.dispatch(UiAction::CloseRequested);
        if effect != Effect::Close {
            ctx.send_viewport_cmd(egui::ViewportCommand::CancelClose);
        }
        self.apply_effect(Some(ctx), effect);
    }
}

fn column_combo(
    ui: &mut egui::Ui,
    id: &str,
    label: &str,
    columns: &[String],
    selected: &mut Option<String>,
) {
    ui.horizontal(|ui| {
        ui.label(label);
        egui::ComboBox::from_id_salt(id)
            .selected_text(selected.as_deref().unwrap_or("(choose)"))
            .show_ui(ui, |ui| {
                for column in columns {
                    ui.selectable_value(selected, Some(column.clone()), column.as_str());
                }
            });
    });
}

fn show_error(ui: &mut egui::Ui, error: &UiError) {
    ui.colored_label(
        ui.visuals().error_fg_color,
        format!(
            "{} ({}): {}",
            err_label(error.category()),
            error.context().label(),
            error.message()
        ),
    );
}

impl eframe::App for GraderApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_close_request(ctx);
        self.show_top_bar(ctx);
        self.show_status_bar(ctx);
        self.show_labeling_panel(ctx);
        self.show_column_window(ctx);
        self.show_options_window(ctx);
        self.show_close_prompt(ctx);
    }
}
