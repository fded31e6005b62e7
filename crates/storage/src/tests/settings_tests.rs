use super::*;
use shared::error::ErrorCode;

#[test]
fn missing_file_yields_defaults() {
    let dir = tempfile::tempdir().expect("tempdir");
    let settings = load_settings(dir.path().join("settings.toml")).expect("defaults");
    assert_eq!(settings, Settings::default());
    assert!(settings.categories.is_empty());
}

#[test]
fn round_trips_categories_and_question() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("settings.toml");
    let categories = CategorySet::new(["Yes", "No", "Maybe"]).expect("set");
    let question = ResearchQuestion::new("Is this relevant?");

    save_settings(&path, &categories, &question).expect("save");
    let loaded = load_settings(&path).expect("load");

    assert_eq!(loaded.categories.labels(), &["Yes", "No", "Maybe"]);
    assert_eq!(loaded.research_question.as_str(), "Is this relevant?");
}

#[test]
fn written_file_has_two_named_sections() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("settings.toml");
    let categories = CategorySet::new(["Include", "Exclude"]).expect("set");
    save_settings(&path, &categories, &ResearchQuestion::new("Q")).expect("save");

    let raw = fs::read_to_string(&path).expect("read");
    assert!(raw.contains("[category_labels]"));
    assert!(raw.contains("button_1 = \"Include\""));
    assert!(raw.contains("button_2 = \"Exclude\""));
    assert!(raw.contains("[research_question]"));
    assert!(raw.contains("rq_text = \"Q\""));
}

#[test]
fn missing_keys_use_per_key_defaults() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("settings.toml");
    fs::write(&path, "[category_labels]\nbutton_1 = \"A\"\nbutton_3 = \"C\"\nbutton_2 = \"\"\n")
        .expect("write");

    let loaded = load_settings(&path).expect("load");
    assert_eq!(loaded.categories.labels(), &["A", "C"]);
    assert_eq!(loaded.research_question, ResearchQuestion::default());
}

#[test]
fn question_without_labels_keeps_empty_category_set() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("settings.toml");
    fs::write(&path, "[research_question]\nrq_text = \"Only a question\"\n").expect("write");

    let loaded = load_settings(&path).expect("load");
    assert!(loaded.categories.is_empty());
    assert_eq!(loaded.research_question.as_str(), "Only a question");
}

#[test]
fn malformed_file_is_settings_corrupt() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("settings.toml");
    fs::write(&path, "[category_labels\nbutton_1 = ").expect("write");

    let err = load_settings(&path).expect_err("corrupt");
    assert_eq!(err.code(), ErrorCode::SettingsCorrupt);
    assert_eq!(load_settings_or_default(&path), Settings::default());
}

#[test]
fn duplicate_labels_in_file_are_settings_corrupt() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("settings.toml");
    fs::write(&path, "[category_labels]\nbutton_1 = \"A\"\nbutton_2 = \"A\"\n").expect("write");

    let err = load_settings(&path).expect_err("duplicates");
    assert_eq!(err.code(), ErrorCode::SettingsCorrupt);
}

#[test]
fn saving_empty_category_set_is_rejected_and_file_untouched() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("settings.toml");
    let categories = CategorySet::new(["Keep"]).expect("set");
    save_settings(&path, &categories, &ResearchQuestion::new("Q")).expect("save");

    let err = save_settings(&path, &CategorySet::empty(), &ResearchQuestion::new("other"))
        .expect_err("empty set");
    assert_eq!(err.code(), ErrorCode::InvalidCategorySet);

    let loaded = load_settings(&path).expect("load");
    assert_eq!(loaded.categories.labels(), &["Keep"]);
    assert_eq!(loaded.research_question.as_str(), "Q");
}

#[test]
fn save_creates_parent_directory() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("nested").join("grader").join("settings.toml");
    let store = SettingsStore::new(&path);
    store
        .save(&CategorySet::new(["A"]).expect("set"), &ResearchQuestion::default())
        .expect("save");
    assert!(path.exists());
    assert_eq!(store.path(), path.as_path());
    assert_eq!(store.load_or_default().categories.labels(), &["A"]);
}

#[test]
fn overwrite_leaves_no_staging_files_behind() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("settings.toml");
    let question = ResearchQuestion::new("Q");
    save_settings(&path, &CategorySet::new(["A"]).expect("set"), &question).expect("first");
    save_settings(&path, &CategorySet::new(["B", "C"]).expect("set"), &question).expect("second");

    let entries: Vec<_> = fs::read_dir(dir.path())
        .expect("read dir")
        .map(|entry| entry.expect("entry").file_name())
        .collect();
    assert_eq!(entries.len(), 1);
    assert_eq!(load_settings(&path).expect("load").categories.labels(), &["B", "C"]);
}

#[cfg(unix)]
#[test]
fn settings_file_is_not_restricted_to_owner() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().expect("tempdir");
    let reference = dir.path().join("reference.toml");
    fs::write(&reference, "").expect("write reference");
    let path = dir.path().join("settings.toml");
    save_settings(&path, &CategorySet::new(["A"]).expect("set"), &ResearchQuestion::default())
        .expect("save");

    let mode = |path: &Path| fs::metadata(path).expect("metadata").permissions().mode() & 0o777;
    assert_eq!(mode(&path), mode(&reference));
}

#[test]
fn legacy_ini_file_is_settings_corrupt() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("settings.ini");
    fs::write(
        &path,
        "[ButtonLabels]\nbutton_1 = Include\n\n[ResearchQuestion]\nrq_text = Adults?\n",
    )
    .expect("write");

    let err = load_settings(&path).expect_err("ini is not toml");
    assert_eq!(err.code(), ErrorCode::SettingsCorrupt);
    assert_eq!(load_settings_or_default(&path), Settings::default());
}
