use std::fs;

use session_core::{
    CategorySet, ColumnMapping, Dataset, Draw, ResearchQuestion, SessionController,
    SessionState, SettingsStore,
};

#[test]
fn labels_written_are_read_back_after_reload() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = dir.path().join("papers.csv");
    let output = dir.path().join("papers_labeled.csv");
    fs::write(
        &input,
        "title,abstract,label\n\
         First,abstract one,A\n\
         Second,abstract two,B\n\
         Third,abstract three,\n",
    )
    .expect("write input");

    let mapping = ColumnMapping::new("title", "abstract", "label");
    let categories = CategorySet::new(["A", "B", "C"]).expect("categories");

    let mut session = SessionController::seeded(5);
    session.load_path(&input, mapping.clone()).expect("load");
    assert_eq!(session.progress().labeled, 2);
    assert_eq!(session.source_path(), Some(input.as_path()));

    let row = session.draw_next().row().cloned().expect("one unlabeled row");
    assert_eq!(row.title, "Third");
    assert_eq!(row.abstract_text, "abstract three");

    let next = session.submit_label("C", &categories).expect("submit");
    assert_eq!(next, Draw::Exhausted);
    assert_eq!(session.state(), SessionState::Exhausted);

    session.save(&output).expect("save");
    assert!(!session.is_dirty());

    let reloaded = Dataset::read_path(&output).expect("reload");
    let label = reloaded.column_index("label").expect("label column");
    let labels: Vec<&str> = (0..reloaded.row_count())
        .map(|row| reloaded.cell(row, label).expect("cell"))
        .collect();
    assert_eq!(labels, vec!["A", "B", "C"]);
    assert_eq!(reloaded.headers(), &["title", "abstract", "label"]);
}

#[test]
fn new_output_column_is_appended_on_save() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = dir.path().join("papers.tsv");
    fs::write(&input, "title\tabstract\nOnly\tSome text, with a comma\n").expect("write input");

    let categories = CategorySet::new(["Relevant"]).expect("categories");
    let mut session = SessionController::seeded(1);
    session
        .load_path(&input, ColumnMapping::new("title", "abstract", "relevance"))
        .expect("load");
    session.draw_next();
    session.submit_label("Relevant", &categories).expect("submit");
    session.save(&input).expect("save in place");

    let raw = fs::read_to_string(&input).expect("read back");
    assert_eq!(
        raw,
        "title\tabstract\trelevance\nOnly\tSome text, with a comma\tRelevant\n"
    );
}

#[test]
fn settings_feed_the_session_category_set() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = SettingsStore::new(dir.path().join("settings.toml"));
    let categories = CategorySet::new(["Yes", "No", "Maybe"]).expect("categories");
    store
        .save(&categories, &ResearchQuestion::new("Is this relevant?"))
        .expect("save settings");

    let settings = store.load().expect("load settings");
    assert_eq!(settings.categories, categories);
    assert_eq!(settings.research_question.as_str(), "Is this relevant?");

    let mut session = SessionController::seeded(2);
    session
        .load(
            Dataset::new(
                vec!["title".into(), "abstract".into()],
                vec![vec!["t".into(), "a".into()]],
            ),
            ColumnMapping::new("title", "abstract", "answer"),
        )
        .expect("load");
    session.draw_next();
    assert!(session.submit_label("Maybe", &settings.categories).is_ok());
}
