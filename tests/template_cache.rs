// tests/template_cache.rs

use std::error::Error;

use assetflow::pipeline::templates::{escape_js, minify_html};
use assetflow::pipeline::{AngularTemplateCache, TemplateCompiler, TemplateOptions, TemplateSource};

type TestResult = Result<(), Box<dyn Error>>;

fn options(standalone: bool, minify: bool) -> TemplateOptions {
    TemplateOptions {
        module: "app".to_string(),
        standalone,
        root: "/public/app/".to_string(),
        minify,
    }
}

fn source(rel_path: &str, content: &str) -> TemplateSource {
    TemplateSource {
        rel_path: rel_path.to_string(),
        content: content.to_string(),
    }
}

#[test]
fn cache_entries_are_sorted_and_keyed_by_root() -> TestResult {
    let templates = vec![
        source("users/list.html", "<ul></ul>"),
        source("home.html", "<h1>Home</h1>"),
    ];

    let script = AngularTemplateCache.compile(&templates, &options(false, false))?;

    assert_eq!(
        script,
        "angular.module('app').run(['$templateCache', function($templateCache) {\
         $templateCache.put('/public/app/home.html','<h1>Home</h1>');\
         $templateCache.put('/public/app/users/list.html','<ul></ul>');\
         }]);"
    );
    Ok(())
}

#[test]
fn standalone_cache_declares_its_module() -> TestResult {
    let script = AngularTemplateCache.compile(&[], &options(true, true))?;

    assert_eq!(
        script,
        "angular.module('app', []).run(['$templateCache', function($templateCache) {}]);"
    );
    Ok(())
}

#[test]
fn markup_is_escaped_for_single_quoted_strings() -> TestResult {
    let templates = vec![source("a.html", "<p class='x'>it's\nC:\\path</p>")];

    let script = AngularTemplateCache.compile(&templates, &options(false, false))?;

    assert!(script.contains(r"'<p class=\'x\'>it\'s\nC:\\path</p>'"), "{script}");
    Ok(())
}

#[test]
fn minify_drops_comments_and_whitespace_between_tags() {
    let markup = "<div>\n  <!-- note -->\n  <span>a   b</span>\n</div>\n";

    assert_eq!(minify_html(markup), "<div><span>a b</span></div>");
}

#[test]
fn minified_templates_are_used_when_enabled() -> TestResult {
    let templates = vec![source("a.html", "<div>\n    <b>x</b>\n</div>")];

    let script = AngularTemplateCache.compile(&templates, &options(false, true))?;

    assert!(script.contains("$templateCache.put('/public/app/a.html','<div><b>x</b></div>');"));
    Ok(())
}

#[test]
fn escape_handles_line_separators() {
    assert_eq!(escape_js("a\u{2028}b\r"), "a\\u2028b\\r");
}
