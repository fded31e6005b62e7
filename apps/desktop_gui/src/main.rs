use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use eframe::egui;
use session_core::load_config;
use tracing_subscriber::EnvFilter;

mod controller;
mod ui;

use ui::{GraderApp, StartupConfig};

#[derive(Parser, Debug)]
#[command(name = "grader-gui", version, about = "Desktop window for labeling abstracts.")]
struct Args {
    /// Runtime configuration file; `./grader.toml` is used when present
    #[arg(long)]
    config: Option<PathBuf>,
    /// Settings file holding the category labels and research question
    #[arg(long)]
    settings: Option<PathBuf>,
    /// Dataset to open on startup
    dataset: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_filter.as_str()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let startup = StartupConfig {
        settings_path: args.settings.unwrap_or(config.settings_path),
        seed: config.seed,
        dataset: args.dataset,
    };
    tracing::info!(settings = %startup.settings_path.display(), "starting grader gui");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Abstract Grader")
            .with_inner_size([900.0, 700.0])
            .with_min_inner_size([640.0, 480.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Abstract Grader",
        options,
        Box::new(|_cc| Ok(Box::new(GraderApp::new(startup)))),
    )
    .map_err(|err| anyhow::anyhow!("{err}"))
    .context("desktop window failed")
}
