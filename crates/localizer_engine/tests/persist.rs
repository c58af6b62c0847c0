use std::fs;
use localizer_engine::{ensure_output_dir, AtomicFileWriter};
use tempfile::TempDir;

#[test]
fn creates_missing_output_dir() {
    let temp = TempDir::new().unwrap();
    let new_dir = temp.path().join("out").join("nested");
    assert!(!new_dir.exists());
    ensure_output_dir(&new_dir).unwrap();
    assert!(new_dir.is_dir());
}

#[test]
fn output_dir_that_is_a_file_is_rejected() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("taken");
    fs::write(&file_path, "x").unwrap();
    assert!(ensure_output_dir(&file_path).is_err());
}

#[test]
fn atomic_write_replaces_existing() {
    let temp = TempDir::new().unwrap();
    let writer = AtomicFileWriter::new(temp.path().to_path_buf());

    let first = writer.write("a.png", b"\x89PNG").unwrap();
    assert_eq!(first.file_name().unwrap(), "a.png");
    assert_eq!(fs::read(&first).unwrap(), b"\x89PNG");

    let second = writer.write("a.png", b"other").unwrap();
    assert_eq!(first, second);
    assert_eq!(fs::read(&second).unwrap(), b"other");
}

#[test]
fn no_partial_file_on_error() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("not_a_dir");
    fs::write(&file_path, "x").unwrap();

    let writer = AtomicFileWriter::new(file_path.clone());
    let result = writer.write("a.png", b"data");
    assert!(result.is_err());
    assert!(!file_path.with_file_name("a.png").exists());
}

#[test]
fn copy_new_never_overwrites() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("src.json");
    fs::write(&source, "first").unwrap();
    let writer = AtomicFileWriter::new(temp.path().to_path_buf());

    assert!(writer.copy_new(&source, "src.json.bak").unwrap());
    fs::write(&source, "second").unwrap();
    assert!(!writer.copy_new(&source, "src.json.bak").unwrap());

    assert_eq!(
        fs::read_to_string(temp.path().join("src.json.bak")).unwrap(),
        "first"
    );
}

#[test]
fn write_leaves_only_the_target_in_the_folder() {
    let temp = TempDir::new().unwrap();
    let writer = AtomicFileWriter::new(temp.path().to_path_buf());

    writer.write("a.png", b"one").unwrap();
    writer.write("b.png", b"two").unwrap();

    let mut names: Vec<_> = fs::read_dir(temp.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().into_string().unwrap())
        .collect();
    names.sort();
    assert_eq!(names, vec!["a.png".to_string(), "b.png".to_string()]);
}
