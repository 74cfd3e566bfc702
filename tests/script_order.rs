// tests/script_order.rs

use std::error::Error;
use std::path::{Path, PathBuf};

use assetflow::errors::AssetflowError;
use assetflow::order::{order, order_units, AngularModuleScanner, CompiledScriptUnit, ModuleScanner};
use assetflow_test_utils::init_tracing;

type TestResult = Result<(), Box<dyn Error>>;

fn unit(path: &str, module: &str, deps: &[&str]) -> CompiledScriptUnit {
    CompiledScriptUnit::new(path)
        .with_module(module)
        .with_dependencies(deps.iter().copied())
}

fn paths(list: &[&str]) -> Vec<PathBuf> {
    list.iter().map(PathBuf::from).collect()
}

#[test]
fn dependencies_load_before_dependents() -> TestResult {
    init_tracing();

    let units = vec![
        unit("a.js", "a", &["b"]),
        unit("b.js", "b", &[]),
        unit("c.js", "c", &["a"]),
    ];

    assert_eq!(order(&units)?, paths(&["b.js", "a.js", "c.js"]));
    Ok(())
}

#[test]
fn cycle_is_reported_with_both_modules() {
    init_tracing();

    let units = vec![
        unit("x.js", "standalone", &[]),
        unit("a.js", "a", &["b"]),
        unit("b.js", "b", &["a"]),
    ];

    let err = order(&units).expect_err("cycle must fail");
    match err {
        AssetflowError::CyclicScriptDependency(remaining) => {
            assert_eq!(remaining, vec!["a".to_string(), "b".to_string()]);
        }
        other => panic!("expected CyclicScriptDependency, got {other:?}"),
    }
}

#[test]
fn ordering_an_ordered_list_changes_nothing() -> TestResult {
    init_tracing();

    let units = vec![
        unit("widgets.js", "app.widgets", &["app.core", "app.util"]),
        CompiledScriptUnit::new("plain.js"),
        unit("util.js", "app.util", &["app.core"]),
        unit("main.js", "app", &["app.widgets", "ngRoute"]),
        unit("core.js", "app.core", &[]),
        CompiledScriptUnit::new("vendor-shim.js"),
    ];

    let once = order_units(&units)?;
    let twice = order_units(&once)?;

    assert_eq!(once, twice);
    assert_eq!(
        order(&once)?,
        paths(&["plain.js", "core.js", "util.js", "widgets.js", "main.js", "vendor-shim.js"])
    );
    Ok(())
}

#[test]
fn undeclared_dependencies_are_external() -> TestResult {
    init_tracing();

    let units = vec![
        unit("app.js", "app", &["ngRoute", "ngAnimate"]),
        unit("routes.js", "app.routes", &["app", "ui.router"]),
    ];

    assert_eq!(order(&units)?, paths(&["app.js", "routes.js"]));
    Ok(())
}

#[test]
fn files_without_declarations_keep_their_input_position() -> TestResult {
    init_tracing();

    let units = vec![
        CompiledScriptUnit::new("first.js"),
        unit("late.js", "late", &["early"]),
        CompiledScriptUnit::new("second.js"),
        unit("early.js", "early", &[]),
    ];

    assert_eq!(
        order(&units)?,
        paths(&["first.js", "second.js", "early.js", "late.js"])
    );
    Ok(())
}

#[test]
fn self_reference_is_not_a_dependency() {
    let unit = CompiledScriptUnit::new("a.js")
        .with_module("a")
        .with_dependencies(["a", "b", "b"]);

    assert_eq!(unit.dependencies, vec!["b".to_string()]);
}

#[test]
fn scanner_reads_declarations_and_references() {
    let scanner = AngularModuleScanner;
    let source = r#"
        (function () {
            'use strict';
            angular.module("app.util", ['app', "ngSanitize"]);
            angular
                .module('app.util')
                .factory('format', format);
            angular.module('app.shared').constant('X', 1);
        })();
    "#;

    let unit = scanner.scan(Path::new("temp/js/util.js"), source);

    assert_eq!(unit.module.as_deref(), Some("app.util"));
    assert_eq!(
        unit.dependencies,
        vec!["app".to_string(), "ngSanitize".to_string(), "app.shared".to_string()]
    );
}

#[test]
fn scanner_ignores_reference_before_own_declaration() {
    let scanner = AngularModuleScanner;
    let source = "angular.module('app').run(init);\nangular.module('app', []);\n";

    let unit = scanner.scan(Path::new("app.js"), source);

    assert_eq!(unit.module.as_deref(), Some("app"));
    assert!(unit.dependencies.is_empty());
}

#[test]
fn scanner_treats_unrecognised_files_as_anonymous() {
    let scanner = AngularModuleScanner;
    let unit = scanner.scan(Path::new("lib/polyfill.js"), "window.foo = function () {};");

    assert_eq!(unit.module, None);
    assert!(unit.dependencies.is_empty());
    assert_eq!(unit.label(), "lib/polyfill.js");
}

#[test]
fn scanned_app_loads_before_util() -> TestResult {
    init_tracing();

    let scanner = AngularModuleScanner;
    let app = scanner.scan(Path::new("temp/js/app.js"), "angular.module('app', []);");
    let util = scanner.scan(
        Path::new("temp/js/util.js"),
        "angular.module('app.util', ['app']).service('util', Util);",
    );

    // Input order puts the dependent first.
    let ordered = order(&[util, app])?;

    assert_eq!(ordered, paths(&["temp/js/app.js", "temp/js/util.js"]));
    Ok(())
}
