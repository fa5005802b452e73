use std::fs;
use std::path::Path;

use codeshelf::models::tags::classify;
use codeshelf::{Config, Error, Language, SnippetStore};

fn open_store(dir: &Path) -> SnippetStore {
    SnippetStore::open(&Config::with_base_dir(dir)).expect("open store")
}

fn files_under(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .expect("read dir")
        .map(|e| e.expect("entry").file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn create_then_list_yields_one_record_backed_by_the_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = open_store(dir.path());
    let code = "fn main() {\n    println!(\"hi\");\n}\n";

    let created = store
        .create("Hello", Language::Rust, code, vec![])
        .expect("create");
    let listed = store.list().expect("list");

    assert_eq!(listed, vec![created.clone()]);
    assert_eq!(fs::read_to_string(&created.filepath).expect("read"), code);
    assert_eq!(store.read_code(&created).expect("read_code"), code);
}

#[test]
fn bubble_sort_scenario() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = open_store(dir.path());
    let code = "def bubble_sort(arr): ...";

    let tags = classify(code, "Bubble Sort", Language::Python).expect("classify");
    let snippet = store
        .create("Bubble Sort", Language::Python, code, tags)
        .expect("create");

    let expected = dir.path().join("Python").join("Bubble_Sort.py");
    assert_eq!(snippet.filepath, expected);
    assert_eq!(fs::read_to_string(&expected).expect("read"), code);
    assert_eq!(snippet.filename, "Bubble_Sort.py");
    assert_eq!(snippet.extension, ".py");
    assert!(snippet.tags.contains(&"python".to_string()));
    assert!(snippet.tags.contains(&"function".to_string()));
    assert_eq!(snippet.code_preview, code);

    let hits = store.search("sort").expect("search");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, snippet.id);
}

#[test]
fn ids_are_unique_and_increase() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = open_store(dir.path());

    let a = store.create("one", Language::Go, "package a", vec![]).expect("a");
    let b = store.create("two", Language::Go, "package b", vec![]).expect("b");
    let c = store.create("three", Language::Java, "class C {}", vec![]).expect("c");

    assert_eq!((a.id, b.id, c.id), (1, 2, 3));
}

#[test]
fn ids_follow_the_highest_present_id() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = open_store(dir.path());

    store.create("one", Language::Go, "x", vec![]).expect("one");
    let two = store.create("two", Language::Go, "x", vec![]).expect("two");
    store.delete(two.id).expect("delete");

    let again = store.create("again", Language::Go, "x", vec![]).expect("again");
    assert_eq!(again.id, two.id);
}

#[test]
fn code_only_update_keeps_identity() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = open_store(dir.path());
    let original = store
        .create("Counter", Language::JavaScript, "let n = 0;", vec!["js".into()])
        .expect("create");

    let new_code = "let n = 1;\n".repeat(20);
    let updated = store
        .update(
            original.id,
            "Counter",
            Language::JavaScript,
            &new_code,
            original.tags.clone(),
        )
        .expect("update");

    assert_eq!(updated.id, original.id);
    assert_eq!(updated.filename, original.filename);
    assert_eq!(updated.filepath, original.filepath);
    assert_eq!(updated.created, original.created);
    assert_ne!(updated.code_preview, original.code_preview);
    assert!(updated.code_preview.ends_with("..."));
    assert_eq!(fs::read_to_string(&updated.filepath).expect("read"), new_code);
    assert_eq!(store.list().expect("list"), vec![updated]);
}

#[test]
fn rename_moves_the_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = open_store(dir.path());
    let original = store
        .create("Old Name", Language::Python, "print(1)", vec![])
        .expect("create");

    let renamed = store
        .update(original.id, "New Name", Language::Python, "print(2)", vec![])
        .expect("update");

    assert!(!original.filepath.exists());
    assert_eq!(fs::read_to_string(&renamed.filepath).expect("read"), "print(2)");
    assert_eq!(files_under(&dir.path().join("Python")), vec!["New_Name.py"]);
    assert_eq!(renamed.created, original.created);
}

#[test]
fn language_change_moves_the_file_and_keeps_old_directory() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = open_store(dir.path());
    let original = store
        .create("Query", Language::Other, "SELECT 1;", vec![])
        .expect("create");

    let moved = store
        .update(original.id, "Query", Language::Sql, "SELECT 1;", vec![])
        .expect("update");

    assert_eq!(moved.filepath, dir.path().join("SQL").join("Query.sql"));
    assert_eq!(moved.extension, ".sql");
    assert!(moved.filepath.exists());
    assert!(!original.filepath.exists());
    assert!(dir.path().join("Other").is_dir());
    assert!(files_under(&dir.path().join("Other")).is_empty());
}

#[test]
fn update_of_missing_id_is_not_found_and_writes_nothing() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = open_store(dir.path());

    let err = store
        .update(42, "Ghost", Language::Ruby, "puts 1", vec![])
        .unwrap_err();
    assert!(matches!(err, Error::NotFound(42)));
    assert!(!dir.path().join("Ruby").join("Ghost.rb").exists());
}

#[test]
fn delete_removes_file_and_record_once() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = open_store(dir.path());
    let keep = store.create("Keep", Language::C, "int a;", vec![]).expect("keep");
    let gone = store.create("Gone", Language::C, "int b;", vec![]).expect("gone");

    store.delete(gone.id).expect("delete");

    assert!(!gone.filepath.exists());
    assert!(keep.filepath.exists());
    assert_eq!(store.list().expect("list"), vec![keep]);

    let err = store.delete(gone.id).unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn delete_tolerates_a_missing_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = open_store(dir.path());
    let snippet = store.create("Temp", Language::Swift, "let x = 1", vec![]).expect("create");

    fs::remove_file(&snippet.filepath).expect("remove by hand");
    store.delete(snippet.id).expect("delete");
    assert!(store.list().expect("list").is_empty());
}

#[test]
fn failed_write_leaves_index_untouched() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = open_store(dir.path());
    let first = store.create("First", Language::Kotlin, "val a = 1", vec![]).expect("create");

    // A directory sitting where the file should go makes the write fail
    fs::create_dir_all(dir.path().join("Kotlin").join("Blocked.kt")).expect("block");
    let err = store
        .create("Blocked", Language::Kotlin, "val b = 2", vec![])
        .unwrap_err();

    assert!(matches!(err, Error::Filesystem { .. }));
    assert_eq!(store.list().expect("list"), vec![first]);
}

#[test]
fn overwrite_on_create_supersedes_the_previous_record() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = open_store(dir.path());
    let first = store.create("Same", Language::Php, "<?php echo 1;", vec![]).expect("first");

    assert!(store.would_overwrite(&store.target_path("Same", Language::Php)));
    assert!(!store.would_overwrite(&store.target_path("Other", Language::Php)));

    let second = store.create("Same", Language::Php, "<?php echo 2;", vec![]).expect("second");

    assert_ne!(first.id, second.id);
    assert_eq!(store.list().expect("list"), vec![second.clone()]);
    assert_eq!(
        fs::read_to_string(&second.filepath).expect("read"),
        "<?php echo 2;"
    );
}

#[test]
fn rename_onto_another_records_file_supersedes_it() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = open_store(dir.path());
    let alpha = store.create("Alpha", Language::Python, "a = 1", vec![]).expect("alpha");
    let beta = store.create("Beta", Language::Python, "b = 2", vec![]).expect("beta");

    let renamed = store
        .update(beta.id, "Alpha", Language::Python, "b = 3", vec![])
        .expect("update");

    assert_eq!(renamed.id, beta.id);
    assert_eq!(renamed.created, beta.created);
    assert_eq!(renamed.filepath, alpha.filepath);
    assert_eq!(store.list().expect("list"), vec![renamed.clone()]);
    assert_eq!(fs::read_to_string(&renamed.filepath).expect("read"), "b = 3");
    assert_eq!(files_under(&dir.path().join("Python")), vec!["Alpha.py"]);
}

#[test]
fn update_tolerates_an_already_missing_old_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = open_store(dir.path());
    let lost = store.create("Lost", Language::Ruby, "puts 1", vec![]).expect("create");
    fs::remove_file(&lost.filepath).expect("remove by hand");

    let found = store
        .update(lost.id, "Found", Language::Ruby, "puts 2", vec![])
        .expect("update");

    assert_eq!(fs::read_to_string(&found.filepath).expect("read"), "puts 2");
    assert_eq!(store.list().expect("list"), vec![found]);
}

#[test]
fn failed_old_file_removal_leaves_orphan_and_moves_record() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = open_store(dir.path());
    let stuck = store.create("Stuck", Language::Go, "package stuck", vec![]).expect("create");

    // A non-empty directory at the old path cannot be removed as a file
    fs::remove_file(&stuck.filepath).expect("remove by hand");
    fs::create_dir_all(stuck.filepath.join("inner")).expect("block");

    let freed = store
        .update(stuck.id, "Freed", Language::Go, "package freed", vec![])
        .expect("update");

    assert!(stuck.filepath.exists());
    assert_eq!(fs::read_to_string(&freed.filepath).expect("read"), "package freed");
    assert_eq!(store.list().expect("list"), vec![freed]);
}

#[cfg(unix)]
#[test]
fn update_through_symlinked_base_dir_keeps_the_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let real = dir.path().join("Code_Snippets");
    let store = open_store(&real);
    let snippet = store
        .create("Keep Me", Language::Python, "print(1)", vec![])
        .expect("create");

    let link = dir.path().join("link");
    std::os::unix::fs::symlink(&real, &link).expect("symlink");
    let linked = open_store(&link);

    let updated = linked
        .update(snippet.id, "Keep Me", Language::Python, "print(2)", vec![])
        .expect("update");

    assert_eq!(fs::read_to_string(&updated.filepath).expect("read"), "print(2)");
    assert_eq!(fs::read_to_string(&snippet.filepath).expect("read"), "print(2)");
    assert_eq!(files_under(&real.join("Python")), vec!["Keep_Me.py"]);
}

#[cfg(target_os = "linux")]
#[test]
fn failed_index_save_keeps_the_old_file() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let dir = tempfile::tempdir().expect("tempdir");
    let store = open_store(&dir.path().join("good"));
    let original = store
        .create("Original", Language::Python, "print(1)", vec![])
        .expect("create");

    // Same index, but new files land under a name the index cannot encode
    let config = Config {
        base_dir: dir.path().join(OsStr::from_bytes(b"bad\xff")),
        index_file: store.index_path().to_str().expect("utf-8 path").to_string(),
    };
    let broken = SnippetStore::open(&config).expect("open");

    let err = broken
        .update(original.id, "Moved", Language::Python, "print(2)", vec![])
        .unwrap_err();

    assert!(matches!(err, Error::Filesystem { .. }));
    assert_eq!(fs::read_to_string(&original.filepath).expect("read"), "print(1)");
    assert_eq!(store.list().expect("list"), vec![original]);
}

#[test]
fn index_round_trip_preserves_records_and_order() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = open_store(dir.path());
    store
        .create("b first", Language::Css, "a { color: red; }", vec!["style".into()])
        .expect("b");
    store
        .create("a second", Language::Html, "<p>hi</p>", vec![])
        .expect("a");

    let index = store.load().expect("load");
    store.save(&index).expect("save");

    let reopened = open_store(dir.path());
    assert_eq!(reopened.load().expect("reload"), index);
    let titles: Vec<_> = reopened
        .list()
        .expect("list")
        .into_iter()
        .map(|s| s.title)
        .collect();
    assert_eq!(titles, vec!["b first", "a second"]);
}

#[test]
fn external_index_edits_are_picked_up() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = open_store(dir.path());
    store.create("Visible", Language::Go, "package main", vec![]).expect("create");

    let mut index = store.load().expect("load");
    index.snippets[0].title = "Edited elsewhere".into();
    fs::write(
        store.index_path(),
        serde_json::to_string_pretty(&index).expect("serialize"),
    )
    .expect("write index");

    assert_eq!(store.list().expect("list")[0].title, "Edited elsewhere");
}

#[test]
fn legacy_array_index_loads_and_is_upgraded_on_save() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = open_store(dir.path());
    let legacy = r#"[
  {
    "id": 3,
    "title": "Hello",
    "language": "C++",
    "filename": "Hello.cpp",
    "filepath": "Code_Snippets/C++/Hello.cpp",
    "extension": ".cpp",
    "tags": ["c++", "hello"],
    "code_preview": "int main() {}",
    "created": "2024-05-01 09:30:00"
  }
]"#;
    fs::write(store.index_path(), legacy).expect("write legacy index");

    let listed = store.list().expect("list");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].language, Language::Cpp);
    assert_eq!(listed[0].created_date(), "2024-05-01");

    let next = store.create("Next", Language::Cpp, "int x;", vec![]).expect("create");
    assert_eq!(next.id, 4);

    let raw: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(store.index_path()).expect("read")).expect("json");
    assert_eq!(raw["schema_version"], 1);
    assert_eq!(raw["snippets"].as_array().expect("array").len(), 2);
}

#[test]
fn corrupt_index_blocks_mutation() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = open_store(dir.path());
    fs::write(store.index_path(), "[{\"id\": \"nope\"}]").expect("write");

    let err = store
        .create("Anything", Language::Rust, "fn f() {}", vec![])
        .unwrap_err();
    assert!(matches!(err, Error::IndexCorruption { .. }));
    assert!(!dir.path().join("Rust").join("Anything.rs").exists());
}

#[test]
fn search_is_case_insensitive_across_fields_and_keeps_order() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = open_store(dir.path());
    let a = store
        .create("Fetch users", Language::TypeScript, "await fetch(u)", vec!["network".into()])
        .expect("a");
    let b = store
        .create("Parse args", Language::Rust, "fn main() {}", vec![])
        .expect("b");
    let c = store
        .create("Retry", Language::TypeScript, "try {} catch {}", vec!["NETWORK".into()])
        .expect("c");

    let ids = |hits: Vec<codeshelf::Snippet>| hits.into_iter().map(|s| s.id).collect::<Vec<_>>();
    assert_eq!(ids(store.search("Network").expect("tag")), vec![a.id, c.id]);
    assert_eq!(ids(store.search("typescript").expect("language")), vec![a.id, c.id]);
    assert_eq!(ids(store.search(".rs").expect("filename")), vec![b.id]);
    assert_eq!(ids(store.search("PARSE").expect("title")), vec![b.id]);
    assert_eq!(ids(store.search("  ").expect("blank")), vec![a.id, b.id, c.id]);
    assert!(store.search("nothing").expect("none").is_empty());
}
