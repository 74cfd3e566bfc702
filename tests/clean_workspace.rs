// tests/clean_workspace.rs

use std::error::Error;
use std::fs;
use std::path::Path;

use assetflow::errors::AssetflowError;
use assetflow::fs::mock::MockFileSystem;
use assetflow::fs::{FileSystem, RealFileSystem};
use assetflow::pipeline::clean;
use assetflow_test_utils::init_tracing;

type TestResult = Result<(), Box<dyn Error>>;

#[test]
fn missing_path_is_a_no_op() -> TestResult {
    init_tracing();

    let dir = tempfile::tempdir()?;
    let missing = dir.path().join("temp");

    clean(&RealFileSystem, &missing)?;

    assert!(!missing.exists());
    assert!(dir.path().exists());
    Ok(())
}

#[test]
fn removes_the_whole_output_tree() -> TestResult {
    init_tracing();

    let dir = tempfile::tempdir()?;
    let temp = dir.path().join("temp");
    fs::create_dir_all(temp.join("js/app"))?;
    fs::create_dir_all(temp.join("styles"))?;
    fs::write(temp.join("js/app/main.js"), "x")?;
    fs::write(temp.join("styles/styles.css"), "body{}")?;
    fs::write(dir.path().join("keep.txt"), "keep")?;

    clean(&RealFileSystem, &temp)?;

    assert!(!temp.exists());
    assert!(dir.path().join("keep.txt").exists());
    Ok(())
}

#[test]
fn cleaning_twice_succeeds() -> TestResult {
    init_tracing();

    let fs = MockFileSystem::new();
    fs.add_file("/proj/temp/js/app.js", "x");

    clean(&fs, Path::new("/proj/temp"))?;
    clean(&fs, Path::new("/proj/temp"))?;

    assert!(!fs.exists(Path::new("/proj/temp/js/app.js")));
    assert!(fs.is_dir(Path::new("/proj")));
    Ok(())
}

#[test]
fn removal_failure_is_reported() {
    init_tracing();

    let fs = MockFileSystem::new();
    fs.add_file("/proj/temp/js/app.js", "x");
    fs.lock_path("/proj/temp");

    let err = clean(&fs, Path::new("/proj/temp")).expect_err("locked path cannot be removed");

    match err {
        AssetflowError::Clean { path, source } => {
            assert_eq!(path, Path::new("/proj/temp"));
            assert_eq!(source.kind(), std::io::ErrorKind::PermissionDenied);
        }
        other => panic!("expected Clean error, got {other:?}"),
    }
    assert!(fs.exists(Path::new("/proj/temp/js/app.js")));
}
