use std::fs;
use std::io::Write;
use tempfile::TempDir;

use kbase_core::chunker::split;
use kbase_core::loader::{list_documents, read_document};

fn exts() -> Vec<String> {
    vec!["txt".to_string(), "md".to_string()]
}

#[test]
fn lists_allowed_files_recursively_in_sorted_order() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    fs::create_dir_all(dir.join("nested")).unwrap();
    fs::write(dir.join("b.txt"), "bravo").unwrap();
    fs::write(dir.join("nested/a.MD"), "alpha").unwrap();
    fs::write(dir.join("skip.pdf"), "binary").unwrap();

    let files = list_documents(dir, &exts());
    let names: Vec<String> = files.iter().map(|p| p.strip_prefix(dir).unwrap().to_string_lossy().to_string()).collect();
    assert_eq!(names, vec!["b.txt".to_string(), "nested/a.MD".to_string()]);
}

#[test]
fn single_small_file_becomes_one_chunk() {
    let tmp = TempDir::new().unwrap();
    let file_path = tmp.path().join("a.txt");
    let mut f = fs::File::create(&file_path).unwrap();
    writeln!(f, "Short text").unwrap();

    let content = read_document(&file_path).expect("read");
    let chunks = split(&content, 500, 50);
    assert_eq!(chunks.len(), 1, "one small paragraph becomes one chunk");
    assert_eq!(chunks[0].content, "Short text");
}

#[test]
fn invalid_utf8_is_read_lossily() {
    let tmp = TempDir::new().unwrap();
    let file_path = tmp.path().join("latin1.txt");
    fs::write(&file_path, [b'c', b'a', b'f', 0xE9]).unwrap();
    let content = read_document(&file_path).expect("lossy read");
    assert!(content.starts_with("caf"));
}
