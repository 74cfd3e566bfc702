// tests/pipeline_end_to_end.rs

use std::error::Error;
use std::sync::Arc;

use assetflow::errors::AssetflowError;
use assetflow::exec::Executor;
use assetflow::fs::mock::MockFileSystem;
use assetflow::pipeline::{build_task_graph, Collaborators, PipelineContext, BUILD, LINT};
use assetflow_test_utils::{init_tracing, with_timeout, ConfigFileBuilder, ProjectFixture};

type TestResult = Result<(), Box<dyn Error>>;

const INDEX: &str = "<html>\n<head>\n  <!--styles--><!--endstyles-->\n</head>\n<body>\n  <!--scripts--><!--endscripts-->\n</body>\n</html>\n";

fn angular_project() -> ProjectFixture {
    let project = ProjectFixture::new();
    project
        .file("public/index.html", INDEX)
        .file("public/app/app.js", "angular.module('app', []);\n")
        .file(
            "public/app/util.js",
            "angular.module('app.util', ['app']).factory('util', util);\n",
        )
        .file("public/app/home.html", "<div>\n  <h1>Home</h1>\n</div>\n")
        .file(
            "public/content/styles/styles.scss",
            "$accent: red;\nbody { color: $accent; }\n",
        );
    project
}

#[tokio::test]
async fn build_writes_outputs_and_injects_ordered_references() -> TestResult {
    init_tracing();

    let project = angular_project();
    let executor = Executor::new(project.graph(ConfigFileBuilder::new().build()))?;

    let report = with_timeout(executor.run_once(BUILD)).await?;

    assert_eq!(report.completed.first().map(String::as_str), Some("clean"));
    assert_eq!(report.completed.last().map(String::as_str), Some("build"));

    assert_eq!(project.read("temp/js/app.js"), "angular.module('app', []);\n");
    assert!(project.exists("temp/js/util.js"));
    assert!(project
        .read("temp/js/templates/templates.js")
        .contains("$templateCache.put('/public/app/home.html','<div><h1>Home</h1></div>');"));
    assert!(project.read("temp/styles/styles.css").contains("color: red"));

    let index = project.read("public/index.html");
    let app = index.find(r#"<script src="/temp/js/app.js"></script>"#);
    let templates = index.find(r#"<script src="/temp/js/templates/templates.js"></script>"#);
    let util = index.find(r#"<script src="/temp/js/util.js"></script>"#);
    assert!(app.is_some() && templates.is_some() && util.is_some(), "{index}");
    assert!(app < templates && templates < util, "{index}");
    assert!(index.contains(r#"<link rel="stylesheet" href="/temp/styles/styles.css">"#));
    Ok(())
}

#[tokio::test]
async fn rebuilding_gives_the_same_document() -> TestResult {
    init_tracing();

    let project = angular_project();
    let executor = Executor::new(project.graph(ConfigFileBuilder::new().build()))?;

    with_timeout(executor.run_once(BUILD)).await?;
    let first = project.read("public/index.html");
    with_timeout(executor.run_once(BUILD)).await?;

    assert_eq!(project.read("public/index.html"), first);
    Ok(())
}

#[tokio::test]
async fn clean_removes_stale_outputs_before_building() -> TestResult {
    init_tracing();

    let project = angular_project();
    project.file("temp/js/removed.js", "angular.module('gone', []);");
    let executor = Executor::new(project.graph(ConfigFileBuilder::new().build()))?;

    with_timeout(executor.run_once(BUILD)).await?;

    assert!(!project.exists("temp/js/removed.js"));
    assert!(!project.read("public/index.html").contains("removed.js"));
    Ok(())
}

#[tokio::test]
async fn stylesheet_errors_do_not_fail_the_build() -> TestResult {
    init_tracing();

    let project = angular_project();
    project.file(
        "public/content/styles/styles.scss",
        "body { color: $undefined-variable; }\n",
    );
    let executor = Executor::new(project.graph(ConfigFileBuilder::new().build()))?;

    with_timeout(executor.run_once(BUILD)).await?;

    assert!(!project.exists("temp/styles/styles.css"));
    let index = project.read("public/index.html");
    assert!(index.contains("<!--styles--><!--endstyles-->"));
    assert!(index.contains(r#"<script src="/temp/js/app.js"></script>"#));
    Ok(())
}

#[tokio::test]
async fn stylesheet_imports_resolve_through_load_paths() -> TestResult {
    init_tracing();

    let project = angular_project();
    project
        .file("public/vendors/theme/_palette.scss", "$accent: teal;\n")
        .file(
            "public/content/styles/styles.scss",
            "@import 'palette';\nbody { color: $accent; }\n",
        );
    let cfg = ConfigFileBuilder::new()
        .styles_load_path("public/vendors/theme")
        .build();
    let executor = Executor::new(project.graph(cfg))?;

    with_timeout(executor.run_once(BUILD)).await?;

    assert!(project.read("temp/styles/styles.css").contains("color: teal"));
    Ok(())
}

#[tokio::test]
async fn transpiler_output_replaces_sources() -> TestResult {
    init_tracing();

    let project = angular_project();
    let cfg = ConfigFileBuilder::new()
        .transpile_cmd("sed 's/factory/service/'")
        .build();
    let executor = Executor::new(project.graph(cfg))?;

    with_timeout(executor.run_once(BUILD)).await?;

    assert_eq!(
        project.read("temp/js/util.js"),
        "angular.module('app.util', ['app']).service('util', util);\n"
    );
    Ok(())
}

#[tokio::test]
async fn transpiler_errors_are_fatal_and_verbatim() -> TestResult {
    init_tracing();

    let project = angular_project();
    let cfg = ConfigFileBuilder::new()
        .transpile_cmd("echo 'SyntaxError: Unexpected token (1:4)' >&2; exit 3")
        .build();
    let executor = Executor::new(project.graph(cfg))?;

    let err = with_timeout(executor.run_once(BUILD))
        .await
        .expect_err("transpiler failure must fail the build");

    match &err {
        AssetflowError::TaskFailed { task, .. } => assert_eq!(task, "scripts"),
        other => panic!("expected TaskFailed, got {other:?}"),
    }
    match err.root_cause() {
        AssetflowError::Transform { path, message } => {
            assert_eq!(path, &project.path("public/app/app.js"));
            assert_eq!(message, "SyntaxError: Unexpected token (1:4)");
        }
        other => panic!("expected Transform, got {other:?}"),
    }
    assert_eq!(project.read("public/index.html"), INDEX, "inject must not run");
    Ok(())
}

#[tokio::test]
async fn silent_transpiler_failure_reports_the_exit_status() -> TestResult {
    init_tracing();

    let project = angular_project();
    let cfg = ConfigFileBuilder::new().transpile_cmd("exit 3").build();
    let executor = Executor::new(project.graph(cfg))?;

    let err = with_timeout(executor.run_once(BUILD)).await.expect_err("must fail");

    match err.root_cause() {
        AssetflowError::Transform { message, .. } => {
            assert_eq!(message, "'exit 3' exited with status 3");
        }
        other => panic!("expected Transform, got {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn missing_marker_fails_the_build() -> TestResult {
    init_tracing();

    let project = angular_project();
    let document = "<html><body><!--scripts--><!--endscripts--></body></html>";
    project.file("public/index.html", document);
    let executor = Executor::new(project.graph(ConfigFileBuilder::new().build()))?;

    let err = with_timeout(executor.run_once(BUILD)).await.expect_err("styles marker missing");

    assert!(matches!(
        err.root_cause(),
        AssetflowError::MarkerNotFound { marker } if marker == "styles"
    ));
    assert_eq!(project.read("public/index.html"), document);
    Ok(())
}

#[tokio::test]
async fn lint_failure_carries_the_report() -> TestResult {
    init_tracing();

    let project = angular_project();
    let cfg = ConfigFileBuilder::new().lint_cmd("echo found 2 problems; false").build();
    let executor = Executor::new(project.graph(cfg))?;

    let err = with_timeout(executor.run_once(LINT)).await.expect_err("lint must fail");

    match err.root_cause() {
        AssetflowError::LintFailed(report) => assert_eq!(report, "found 2 problems"),
        other => panic!("expected LintFailed, got {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn build_runs_against_an_in_memory_filesystem() -> TestResult {
    init_tracing();

    let fs = Arc::new(MockFileSystem::new());
    fs.add_file("/proj/public/index.html", INDEX);
    fs.add_file("/proj/public/app/app.js", "angular.module('app', []);");
    fs.add_file("/proj/public/app/routes.js", "angular.module('app.routes', ['app']);");

    let cfg = ConfigFileBuilder::new().build();
    let collaborators = Collaborators::from_config(&cfg, "/proj").with_fs(fs.clone());
    let ctx = Arc::new(PipelineContext::new("/proj", cfg, collaborators));
    let executor = Executor::new(build_task_graph(ctx)?)?;

    with_timeout(executor.run_once(BUILD)).await?;

    let index = String::from_utf8(fs.contents("/proj/public/index.html").unwrap_or_default())?;
    let app = index.find("/temp/js/app.js");
    let routes = index.find("/temp/js/routes.js");
    assert!(app.is_some() && app < routes, "{index}");
    assert!(index.contains("/temp/js/templates/templates.js"));
    Ok(())
}
