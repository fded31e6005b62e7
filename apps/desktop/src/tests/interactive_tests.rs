use std::{fs, io::Cursor};

use super::*;
use session_core::{CategorySet, ColumnMapping, Dataset, ResearchQuestion, TableFormat};

fn settings() -> Settings {
    Settings {
        categories: CategorySet::new(["Include", "Exclude"]).expect("set"),
        research_question: ResearchQuestion::new("Does it study adults?"),
    }
}

fn session_with_rows(rows: usize) -> SessionController {
    let mut raw = String::from("title,abstract\n");
    for row in 0..rows {
        raw.push_str(&format!("title {row},abstract {row}\n"));
    }
    let dataset = Dataset::from_reader(raw.as_bytes(), TableFormat::Csv).expect("csv");
    let mut session = SessionController::seeded(3);
    session
        .load(dataset, ColumnMapping::new("title", "abstract", "decision"))
        .expect("load");
    session
}

fn run(session: &mut SessionController, save_to: &Path, script: &str) -> (LoopExit, String) {
    let settings = settings();
    let mut output = Vec::new();
    let exit = LabelingLoop::new(session, &settings, save_to, Cursor::new(script), &mut output)
        .run()
        .expect("loop");
    (exit, String::from_utf8(output).expect("utf8"))
}

#[test]
fn parses_numbers_and_labels() {
    let settings = settings();
    assert_eq!(
        parse_command("1", &settings),
        Some(Command::Label("Include".to_string()))
    );
    assert_eq!(
        parse_command(" Exclude ", &settings),
        Some(Command::Label("Exclude".to_string()))
    );
    assert_eq!(
        parse_command("9", &settings),
        Some(Command::Label("9".to_string()))
    );
    assert_eq!(parse_command("q", &settings), Some(Command::Quit));
    assert_eq!(parse_command("   ", &settings), None);
}

#[test]
fn renders_row_with_question_and_choices() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut session = session_with_rows(2);
    let (exit, output) = run(&mut session, &dir.path().join("out.csv"), "q\n");

    assert_eq!(exit, LoopExit::Clean);
    assert!(output.contains("Research question: Does it study adults?"));
    assert!(output.contains("[1] Include  [2] Exclude"));
    assert!(output.contains("0/2 rows completed"));
}

#[test]
fn labels_until_exhausted_then_saves_and_quits() {
    let dir = tempfile::tempdir().expect("tempdir");
    let save_to = dir.path().join("out.csv");
    let mut session = session_with_rows(2);

    let (exit, output) = run(&mut session, &save_to, "1\n2\nw\nq\n");

    assert_eq!(exit, LoopExit::Clean);
    assert!(output.contains("No unlabeled rows left. 2/2 rows completed"));
    assert!(output.contains("Saved "));
    let saved = fs::read_to_string(&save_to).expect("saved file");
    assert!(saved.starts_with("title,abstract,decision\n"));
    assert!(saved.contains("Include"));
    assert!(saved.contains("Exclude"));
}

#[test]
fn invalid_label_is_reported_and_row_kept() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut session = session_with_rows(2);
    let (exit, output) = run(&mut session, &dir.path().join("out.csv"), "Maybe\nq\n");

    assert_eq!(exit, LoopExit::Clean);
    assert!(output.contains("! 'Maybe' is not one of the configured categories"));
    assert_eq!(session.progress().labeled, 0);
    assert!(session.active_index().is_some());
}

#[test]
fn quit_with_unsaved_changes_can_be_cancelled_then_discarded() {
    let dir = tempfile::tempdir().expect("tempdir");
    let save_to = dir.path().join("out.csv");
    let mut session = session_with_rows(3);

    let (exit, output) = run(&mut session, &save_to, "1\nq\nc\nq\nd\n");

    assert_eq!(exit, LoopExit::Discarded);
    assert!(output.contains("Quit cancelled."));
    assert!(session.is_dirty());
    assert!(!save_to.exists());
}

#[test]
fn quit_prompt_save_writes_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let save_to = dir.path().join("out.csv");
    let mut session = session_with_rows(3);

    let (exit, _) = run(&mut session, &save_to, "2\nq\ns\n");

    assert_eq!(exit, LoopExit::Clean);
    assert!(!session.is_dirty());
    assert!(fs::read_to_string(&save_to).expect("saved").contains("Exclude"));
}

#[test]
fn failed_save_on_quit_keeps_loop_running() {
    let dir = tempfile::tempdir().expect("tempdir");
    let blocker = dir.path().join("blocker");
    fs::write(&blocker, "file").expect("blocker");
    let mut session = session_with_rows(3);

    let (exit, output) = run(&mut session, &blocker.join("out.csv"), "1\nq\ns\nq\nd\n");

    assert_eq!(exit, LoopExit::Discarded);
    assert!(output.contains("! failed to save "));
}

#[test]
fn closed_input_with_unsaved_labels_is_reported() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut session = session_with_rows(3);
    let (exit, output) = run(&mut session, &dir.path().join("out.csv"), "1\n");

    assert_eq!(exit, LoopExit::InputClosed);
    assert!(output.contains("unsaved labels were not written"));
}

#[test]
fn skip_moves_to_another_row() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut session = session_with_rows(4);
    let (exit, output) = run(&mut session, &dir.path().join("out.csv"), "s\nq\n");

    assert_eq!(exit, LoopExit::Clean);
    assert_eq!(output.matches("Title: ").count(), 2);
    assert!(session.active_index().is_some());
    assert_eq!(session.progress().labeled, 0);
}

#[test]
fn default_save_path_is_the_source_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = dir.path().join("in.csv");
    fs::write(&input, "title,abstract\na,b\n").expect("write");
    let mut session = SessionController::seeded(1);
    session
        .load_path(&input, ColumnMapping::new("title", "abstract", "decision"))
        .expect("load");
    assert_eq!(default_save_path(&session, Path::new("other.csv")), input);
}
