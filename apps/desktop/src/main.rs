use std::{
    io::{self, BufWriter},
    path::{Path, PathBuf},
};

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use session_core::{
    load_config, CategorySet, ColumnMapping, Dataset, ErrorReport, GraderConfig, GraderResult,
    Progress, ResearchQuestion, SessionController, SettingsStore,
};
use tracing_subscriber::EnvFilter;

mod interactive;

use interactive::{default_save_path, LabelingLoop, LoopExit};

#[derive(Parser, Debug)]
#[command(
    name = "grader",
    version,
    about = "Label rows of a CSV/TSV dataset by reading their title and abstract."
)]
struct Cli {
    /// Runtime configuration file; `./grader.toml` is used when present
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Settings file holding the category labels and research question
    #[arg(long, global = true)]
    settings: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Label unlabeled rows interactively
    Label(LabelArgs),
    /// Print how many rows carry a label
    Progress {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        output_column: String,
        #[arg(long)]
        json: bool,
    },
    /// List the column headers of a dataset
    Columns {
        #[arg(long)]
        input: PathBuf,
    },
    /// Store category labels and the research question
    Configure {
        /// Category label, in display order (repeat up to five times)
        #[arg(long = "category", required = true)]
        categories: Vec<String>,
        #[arg(long)]
        question: Option<String>,
    },
    /// Print the stored settings
    ShowSettings {
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug)]
struct LabelArgs {
    #[arg(long)]
    input: PathBuf,
    #[arg(long)]
    title_column: String,
    #[arg(long)]
    abstract_column: String,
    /// Existing column that receives the labels
    #[arg(long, required_unless_present = "new_output_column")]
    output_column: Option<String>,
    /// Name of a column to create for the labels; wins over --output-column
    #[arg(long)]
    new_output_column: Option<String>,
    /// Where to write the labeled dataset; defaults to the input file
    #[arg(long)]
    save_to: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    init_tracing(&config);

    let store = SettingsStore::new(cli.settings.clone().unwrap_or(config.settings_path.clone()));

    match cli.command {
        Command::Label(args) => run_label(args, &store, &config),
        Command::Progress {
            input,
            output_column,
            json,
        } => run_progress(input, &output_column, json),
        Command::Columns { input } => {
            let dataset = Dataset::read_path(&input)?;
            for (position, header) in dataset.headers().iter().enumerate() {
                println!("{:>3}  {header}", position + 1);
            }
            Ok(())
        }
        Command::Configure {
            categories,
            question,
        } => run_configure(&store, categories, question),
        Command::ShowSettings { json } => run_show_settings(&store, json),
    }
}

fn init_tracing(config: &GraderConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_filter.as_str()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run_label(args: LabelArgs, store: &SettingsStore, config: &GraderConfig) -> Result<()> {
    let mapping = ColumnMapping::from_selection(
        args.title_column,
        args.abstract_column,
        args.output_column.as_deref(),
        args.new_output_column.as_deref().unwrap_or_default(),
    )
    .ok_or_else(|| anyhow!("an output column is required"))?;

    let settings = store.load_or_default();
    let mut session = SessionController::from_seed(config.seed);
    session
        .load_path(&args.input, mapping)
        .with_context(|| format!("cannot start a session on '{}'", args.input.display()))?;

    let save_to = args
        .save_to
        .unwrap_or_else(|| default_save_path(&session, &args.input));
    tracing::info!(save_to = %save_to.display(), "labeling session started");

    let stdin = io::stdin();
    let stdout = io::stdout();
    let exit = LabelingLoop::new(
        &mut session,
        &settings,
        &save_to,
        stdin.lock(),
        BufWriter::new(stdout.lock()),
    )
    .run()?;

    match exit {
        LoopExit::Clean => {}
        LoopExit::Discarded => tracing::info!("unsaved labels discarded"),
        LoopExit::InputClosed => {
            return Err(anyhow!(
                "input closed before unsaved labels were written to '{}'",
                save_to.display()
            ))
        }
    }
    Ok(())
}

fn dataset_progress(input: &Path, output_column: &str) -> GraderResult<Progress> {
    let dataset = Dataset::read_path(input)?;
    let labeled = dataset
        .column_index(output_column)
        .map(|column| dataset.filled_count(column))
        .unwrap_or(0);
    Ok(Progress::new(labeled, dataset.row_count()))
}

fn progress_summary(progress: Progress) -> String {
    if progress.is_complete() {
        return format!("{progress}; every row is labeled");
    }
    format!(
        "{progress} ({:.1}%, {} remaining)",
        progress.fraction() * 100.0,
        progress.remaining()
    )
}

/// JSON for a command result; failures render as an [`ErrorReport`].
fn json_output<T: Serialize>(result: &GraderResult<T>) -> serde_json::Result<String> {
    match result {
        Ok(value) => serde_json::to_string_pretty(value),
        Err(err) => serde_json::to_string_pretty(&ErrorReport::from(err)),
    }
}

fn print_json<T: Serialize>(result: GraderResult<T>) -> Result<()> {
    println!("{}", json_output(&result)?);
    result.map(|_| ()).map_err(Into::into)
}

fn run_progress(input: PathBuf, output_column: &str, json: bool) -> Result<()> {
    let progress = dataset_progress(&input, output_column);
    if json {
        return print_json(progress);
    }
    println!("{}", progress_summary(progress?));
    Ok(())
}

fn run_configure(
    store: &SettingsStore,
    categories: Vec<String>,
    question: Option<String>,
) -> Result<()> {
    let categories = CategorySet::new(&categories)?;
    let question = match question {
        Some(question) => ResearchQuestion::new(question),
        None => store.load_or_default().research_question,
    };
    store.save(&categories, &question)?;
    println!(
        "Saved {} categories to {}",
        categories.len(),
        store.path().display()
    );
    Ok(())
}

fn run_show_settings(store: &SettingsStore, json: bool) -> Result<()> {
    let settings = store.load();
    if json {
        return print_json(settings.map(|settings| {
            serde_json::json!({
                "settings_path": store.path(),
                "categories": settings.categories,
                "research_question": settings.research_question,
            })
        }));
    }

    let settings = settings?;
    println!("Settings file: {}", store.path().display());
    println!("Research question: {}", settings.research_question);
    if settings.categories.is_empty() {
        println!("Categories: (none configured)");
    }
    for (slot, label) in settings.categories.iter().enumerate() {
        println!("  button_{}: {label}", slot + 1);
    }
    Ok(())
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
