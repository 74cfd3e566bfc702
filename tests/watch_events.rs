// tests/watch_events.rs

use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use notify::event::{
    AccessKind, CreateKind, DataChange, MetadataKind, ModifyKind, RemoveKind, RenameMode,
};
use notify::{Event, EventKind};

use assetflow::config::WatchSection;
use assetflow::engine::{RuntimeEvent, TriggerReason};
use assetflow::fs::mock::MockFileSystem;
use assetflow::fs::FileSystem;
use assetflow::types::WatchEventKind;
use assetflow::watch::{
    classify, collect_matching_files, glob_base, ContentHashes, PatternSet, WatchFilter,
    WatchProfile,
};
use assetflow_test_utils::init_tracing;

type TestResult = Result<(), Box<dyn Error>>;

fn event(kind: EventKind, path: &str) -> Event {
    Event::new(kind).add_path(PathBuf::from(path))
}

fn modified(path: &str) -> Event {
    event(EventKind::Modify(ModifyKind::Data(DataChange::Content)), path)
}

fn profile(use_hash: bool) -> WatchProfile {
    let section = WatchSection {
        use_hash,
        exclude: vec!["public/app/**/*.spec.js".to_string()],
        ..WatchSection::default()
    };
    WatchProfile::from_config(&section).expect("default watch patterns are valid")
}

fn triggered_path(event: &RuntimeEvent) -> Option<(&str, &str, WatchEventKind)> {
    match event {
        RuntimeEvent::TaskTriggered {
            task,
            reason: TriggerReason::FileWatch { path, kind },
        } => Some((task.as_str(), path.as_str(), *kind)),
        _ => None,
    }
}

#[test]
fn only_creations_and_content_changes_qualify() {
    assert_eq!(
        classify(&EventKind::Create(CreateKind::File)),
        Some(WatchEventKind::Created)
    );
    assert_eq!(
        classify(&EventKind::Modify(ModifyKind::Data(DataChange::Content))),
        Some(WatchEventKind::Modified)
    );
    assert_eq!(
        classify(&EventKind::Modify(ModifyKind::Name(RenameMode::To))),
        Some(WatchEventKind::Created)
    );
    assert_eq!(
        classify(&EventKind::Modify(ModifyKind::Metadata(MetadataKind::WriteTime))),
        None
    );
    assert_eq!(
        classify(&EventKind::Modify(ModifyKind::Name(RenameMode::Both))),
        Some(WatchEventKind::Created)
    );
    assert_eq!(
        classify(&EventKind::Modify(ModifyKind::Name(RenameMode::From))),
        None,
        "moving a file away is a removal"
    );
    assert_eq!(classify(&EventKind::Remove(RemoveKind::File)), None);
    assert_eq!(classify(&EventKind::Access(AccessKind::Read)), None);
}

#[test]
fn matching_file_triggers_the_configured_task() -> TestResult {
    init_tracing();

    let fs = Arc::new(MockFileSystem::new());
    fs.add_file("/proj/public/app/app.js", "x");
    let mut filter = WatchFilter::new("/proj", profile(false), fs);

    let trigger = filter
        .process_event(&event(
            EventKind::Create(CreateKind::File),
            "/proj/public/app/app.js",
        ))
        .ok_or("expected a trigger")?;

    assert_eq!(
        triggered_path(&trigger),
        Some(("inject", "public/app/app.js", WatchEventKind::Created))
    );
    Ok(())
}

#[test]
fn unmatched_excluded_and_removed_paths_are_ignored() -> TestResult {
    init_tracing();

    let fs = Arc::new(MockFileSystem::new());
    fs.add_file("/proj/public/app/app.spec.js", "x");
    fs.add_file("/proj/public/content/site.css", "x");
    fs.add_file("/elsewhere/public/app/app.js", "x");
    fs.add_dir("/proj/public/app/new.js");
    let mut filter = WatchFilter::new("/proj", profile(false), fs);

    assert!(filter.process_event(&modified("/proj/public/app/app.spec.js")).is_none());
    assert!(filter.process_event(&modified("/proj/public/content/site.css")).is_none());
    assert!(filter.process_event(&modified("/elsewhere/public/app/app.js")).is_none());
    assert!(filter
        .process_event(&event(EventKind::Create(CreateKind::Folder), "/proj/public/app/new.js"))
        .is_none());
    assert!(filter
        .process_event(&event(EventKind::Remove(RemoveKind::File), "/proj/public/app/gone.js"))
        .is_none());
    Ok(())
}

#[test]
fn rename_triggers_once_for_the_destination() -> TestResult {
    init_tracing();

    let fs = Arc::new(MockFileSystem::new());
    fs.add_file("/proj/public/app/b.js", "x");
    let mut filter = WatchFilter::new("/proj", profile(false), fs);

    let rename = Event::new(EventKind::Modify(ModifyKind::Name(RenameMode::Both)))
        .add_path(PathBuf::from("/proj/public/app/a.js"))
        .add_path(PathBuf::from("/proj/public/app/b.js"));
    let trigger = filter.process_event(&rename).ok_or("expected a trigger")?;

    assert_eq!(
        triggered_path(&trigger),
        Some(("inject", "public/app/b.js", WatchEventKind::Created))
    );

    let moved_away = event(
        EventKind::Modify(ModifyKind::Name(RenameMode::From)),
        "/proj/public/app/b.js",
    );
    assert!(filter.process_event(&moved_away).is_none());
    Ok(())
}

#[test]
fn one_event_with_several_paths_triggers_once() -> TestResult {
    init_tracing();

    let fs = Arc::new(MockFileSystem::new());
    fs.add_file("/proj/public/app/a.js", "x");
    fs.add_file("/proj/public/app/b.js", "x");
    let mut filter = WatchFilter::new("/proj", profile(false), fs);

    let burst = modified("/proj/public/app/a.js").add_path(PathBuf::from("/proj/public/app/b.js"));
    let trigger = filter.process_event(&burst).ok_or("expected a trigger")?;

    assert_eq!(
        triggered_path(&trigger),
        Some(("inject", "public/app/a.js", WatchEventKind::Modified))
    );
    Ok(())
}

#[test]
fn unchanged_content_is_skipped_with_hashing() -> TestResult {
    init_tracing();

    let fs = Arc::new(MockFileSystem::new());
    let file = "/proj/public/app/main.html";
    fs.add_file(file, "<div>v1</div>");
    let mut filter = WatchFilter::new("/proj", profile(true), fs.clone());

    assert!(filter.process_event(&modified(file)).is_some());
    assert!(filter.process_event(&modified(file)).is_none());

    fs.add_file(file, "<div>v2</div>");
    assert!(filter.process_event(&modified(file)).is_some());
    Ok(())
}

#[test]
fn without_hashing_every_save_triggers() -> TestResult {
    init_tracing();

    let fs = Arc::new(MockFileSystem::new());
    let file = "/proj/public/app/main.html";
    fs.add_file(file, "<div>v1</div>");
    let mut filter = WatchFilter::new("/proj", profile(false), fs);

    assert!(filter.process_event(&modified(file)).is_some());
    assert!(filter.process_event(&modified(file)).is_some());
    Ok(())
}

#[test]
fn content_hashes_report_changes() {
    let mut hashes = ContentHashes::new();
    let path = Path::new("/proj/a.js");

    assert!(hashes.update(path, "1".into()));
    assert!(!hashes.update(path, "1".into()));
    assert!(hashes.update(path, "2".into()));
    assert_eq!(hashes.len(), 1);
}

#[test]
fn glob_base_is_the_literal_prefix() {
    assert_eq!(glob_base("public/app/**/*.js"), PathBuf::from("public/app"));
    assert_eq!(glob_base("./temp/js/*.js"), PathBuf::from("temp/js"));
    assert_eq!(
        glob_base("public/content/styles/styles.scss"),
        PathBuf::from("public/content/styles")
    );
    assert_eq!(glob_base("**/*.js"), PathBuf::new());
}

#[test]
fn matching_files_are_collected_in_path_order() -> TestResult {
    let fs = MockFileSystem::new();
    fs.add_file("/proj/public/app/zeta.js", "");
    fs.add_file("/proj/public/app/users/list.js", "");
    fs.add_file("/proj/public/app/alpha.js", "");
    fs.add_file("/proj/public/app/alpha.spec.js", "");
    fs.add_file("/proj/public/app/readme.md", "");
    fs.add_file("/proj/public/vendors/lib.js", "");

    let patterns = PatternSet::new(
        &["public/app/**/*.js".to_string()],
        &["**/*.spec.js".to_string()],
    )?;
    let files = collect_matching_files(&fs, Path::new("/proj"), &patterns)?;

    assert_eq!(
        files,
        vec![
            PathBuf::from("/proj/public/app/alpha.js"),
            PathBuf::from("/proj/public/app/users/list.js"),
            PathBuf::from("/proj/public/app/zeta.js"),
        ]
    );
    assert!(fs.is_file(Path::new("/proj/public/vendors/lib.js")));
    Ok(())
}
