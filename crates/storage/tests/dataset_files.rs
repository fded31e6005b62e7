use std::fs;

use storage::{Dataset, TableFormat};

#[test]
fn csv_file_round_trips_with_quoted_cells() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("records.csv");
    let raw = "title,abstract,decision\n\
               \"Title, with comma\",\"Line one\nline two\",\n\
               Plain,\"He said \"\"hi\"\"\",Include\n";
    fs::write(&path, raw).expect("write");

    let dataset = Dataset::read_path(&path).expect("read");
    assert_eq!(dataset.format(), TableFormat::Csv);
    assert_eq!(dataset.source_path(), Some(path.as_path()));
    assert_eq!(dataset.cell(0, 1), Some("Line one\nline two"));
    assert_eq!(dataset.cell(1, 1), Some("He said \"hi\""));

    let copy = dir.path().join("copy.csv");
    dataset.write_path(&copy).expect("write copy");
    let reread = Dataset::read_path(&copy).expect("reread");
    assert_eq!(reread.headers(), dataset.headers());
    assert!(reread.rows().eq(dataset.rows()));
}

#[test]
fn tsv_extension_selects_tab_delimiter() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("records.tsv");
    fs::write(&path, "title\tabstract\nA\tB\n").expect("write");

    let mut dataset = Dataset::read_path(&path).expect("read");
    assert_eq!(dataset.format(), TableFormat::Tsv);
    let output = dataset.ensure_column("label");
    assert!(dataset.set_cell(0, output, "Yes"));
    dataset.write_path(&path).expect("write back");

    assert_eq!(
        fs::read_to_string(&path).expect("read back"),
        "title\tabstract\tlabel\nA\tB\tYes\n"
    );
}

#[test]
fn header_only_file_has_no_rows() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("empty.csv");
    fs::write(&path, "title,abstract\n").expect("write");

    let dataset = Dataset::read_path(&path).expect("read");
    assert!(dataset.is_empty());
    assert_eq!(dataset.headers().len(), 2);
}

#[cfg(unix)]
#[test]
fn writing_in_place_keeps_file_mode() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("papers.csv");
    fs::write(&path, "title,abstract\nA,B\n").expect("write");
    fs::set_permissions(&path, fs::Permissions::from_mode(0o640)).expect("chmod");

    let mut dataset = Dataset::read_path(&path).expect("read");
    let output = dataset.ensure_column("label");
    assert!(dataset.set_cell(0, output, "Yes"));
    dataset.write_path(&path).expect("write back");

    let mode = fs::metadata(&path).expect("metadata").permissions().mode() & 0o777;
    assert_eq!(mode, 0o640);
}

#[cfg(unix)]
#[test]
fn new_file_gets_the_same_mode_as_a_plain_create() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().expect("tempdir");
    let reference = dir.path().join("reference.csv");
    fs::write(&reference, "x\n").expect("write reference");

    let path = dir.path().join("fresh.csv");
    Dataset::new(vec!["title".into()], vec![vec!["A".into()]])
        .write_path(&path)
        .expect("write");

    let mode = |path: &std::path::Path| {
        fs::metadata(path).expect("metadata").permissions().mode() & 0o777
    };
    assert_eq!(mode(&path), mode(&reference));
}
