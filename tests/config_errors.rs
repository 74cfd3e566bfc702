// tests/config_errors.rs

use std::error::Error;
use std::fs;
use std::path::Path;

use assetflow::config::{config_root_dir, load_and_validate, load_from_str, ConfigFile};
use assetflow::errors::AssetflowError;
use assetflow::types::TriggerWhileRunningBehaviour;
use assetflow_test_utils::ConfigFileBuilder;

type TestResult = Result<(), Box<dyn Error>>;

fn validate(toml: &str) -> assetflow::errors::Result<ConfigFile> {
    ConfigFile::try_from(load_from_str(toml)?)
}

fn config_error(toml: &str) -> String {
    match validate(toml) {
        Err(AssetflowError::ConfigError(msg)) => msg,
        other => panic!("expected ConfigError, got {other:?}"),
    }
}

#[test]
fn empty_file_gives_the_conventional_layout() -> TestResult {
    let cfg = validate("")?;

    assert_eq!(
        cfg.config.triggered_while_running_behaviour,
        TriggerWhileRunningBehaviour::Queue
    );
    assert_eq!(cfg.config.queue_length, 1);
    assert_eq!(cfg.config.temp, "temp");
    assert_eq!(cfg.scripts.src, ["public/app/**/*.js"]);
    assert_eq!(cfg.templates.filename, "templates.js");
    assert_eq!(cfg.inject.dest_path(), "public/index.html");
    assert_eq!(cfg.watch.task, "inject");
    assert!(cfg.lint.cmd.is_none());
    Ok(())
}

#[test]
fn sections_override_defaults_independently() -> TestResult {
    let cfg = validate(
        r#"
        [config]
        triggered_while_running_behaviour = "cancel"
        queue_length = 3

        [inject]
        target = "web/index.tpl.html"
        dest = "web/index.html"
        marker_start = "<!-- inject:{name} -->"
        marker_end = "<!-- endinject:{name} -->"

        [watch]
        task = "build"
        use_hash = true
        "#,
    )?;

    assert_eq!(
        cfg.config.triggered_while_running_behaviour,
        TriggerWhileRunningBehaviour::Cancel
    );
    assert_eq!(cfg.config.queue_length, 3);
    assert_eq!(cfg.config.temp, "temp");
    assert_eq!(cfg.inject.dest_path(), "web/index.html");
    assert_eq!(cfg.inject.scripts_marker, "scripts");
    assert!(cfg.watch.use_hash);
    assert_eq!(cfg.watch.task, "build");
    Ok(())
}

#[test]
fn zero_queue_length_is_rejected() {
    let msg = config_error("[config]\nqueue_length = 0\n");
    assert!(msg.contains("queue_length"), "{msg}");
}

#[test]
fn invalid_glob_names_the_field() {
    let msg = config_error("[scripts]\nsrc = [\"public/app/[*.js\"]\n");
    assert!(msg.contains("scripts.src"), "{msg}");
}

#[test]
fn marker_template_needs_a_name_placeholder() {
    let msg = config_error("[inject]\nmarker_start = \"<!--inject-->\"\n");
    assert!(msg.contains("marker_start"), "{msg}");
}

#[test]
fn shared_end_sentinel_is_accepted() -> TestResult {
    let cfg = validate(
        "[inject]\nmarker_start = \"<!-- inject:{name} -->\"\nmarker_end = \"<!-- endinject -->\"\n",
    )?;

    assert_eq!(cfg.inject.marker_end, "<!-- endinject -->");
    Ok(())
}

#[test]
fn identical_start_and_end_sentinels_are_rejected() {
    let msg = config_error("[inject]\nmarker_start = \"<!--{name}-->\"\nmarker_end = \"<!--{name}-->\"\n");
    assert!(msg.contains("different sentinels"), "{msg}");
}

#[test]
fn marker_names_must_differ() {
    let msg = config_error("[inject]\nscripts_marker = \"assets\"\nstyles_marker = \"assets\"\n");
    assert!(msg.contains("must differ"), "{msg}");
}

#[test]
fn empty_watch_task_is_rejected() {
    let msg = config_error("[watch]\ntask = \" \"\n");
    assert!(msg.contains("[watch].task"), "{msg}");
}

#[test]
fn unknown_behaviour_fails_to_parse() {
    let err = load_from_str("[config]\ntriggered_while_running_behaviour = \"restart\"\n")
        .expect_err("unknown variant");
    assert!(matches!(err, AssetflowError::TomlError(_)));
}

#[test]
fn builder_produces_a_validated_config() {
    let cfg = ConfigFileBuilder::new()
        .behaviour(TriggerWhileRunningBehaviour::Parallel)
        .queue_length(2)
        .watch_task("build")
        .build();

    assert_eq!(
        cfg.config.triggered_while_running_behaviour,
        TriggerWhileRunningBehaviour::Parallel
    );
    assert_eq!(cfg.watch.task, "build");
}

#[test]
fn explicit_missing_config_file_is_an_error() -> TestResult {
    let dir = tempfile::tempdir()?;
    let err = load_and_validate(dir.path().join("Assetflow.toml")).expect_err("file is missing");

    assert!(matches!(err, AssetflowError::IoError(_)));
    Ok(())
}

#[test]
fn config_file_on_disk_is_loaded_and_rooted() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("Assetflow.toml");
    fs::write(&path, "[config]\ntemp = \".build\"\n")?;

    let cfg = load_and_validate(&path)?;

    assert_eq!(cfg.config.temp, ".build");
    assert_eq!(config_root_dir(&path), dir.path());
    assert_eq!(
        config_root_dir(Path::new("Assetflow.toml")),
        std::env::current_dir()?
    );
    Ok(())
}

#[test]
fn behaviour_names_parse_case_insensitively() {
    assert_eq!(
        " Parallel ".parse::<TriggerWhileRunningBehaviour>(),
        Ok(TriggerWhileRunningBehaviour::Parallel)
    );
    assert_eq!("queue".parse(), Ok(TriggerWhileRunningBehaviour::Queue));

    let err = "restart"
        .parse::<TriggerWhileRunningBehaviour>()
        .expect_err("not a behaviour");
    assert!(err.contains("restart"), "{err}");
}
