// src/pipeline/templates.rs

//! Markup-to-cache compilation.

use std::sync::LazyLock;

use regex::Regex;

use crate::errors::Result;

static HTML_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("comment pattern is valid"));
static BETWEEN_TAGS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r">\s+<").expect("inter-tag whitespace pattern is valid"));
static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s{2,}").expect("whitespace pattern is valid"));

/// One template to compile: cache key path (relative, forward slashes) and
/// its markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateSource {
    pub rel_path: String,
    pub content: String,
}

/// Options shared by every template in one compilation.
#[derive(Debug, Clone)]
pub struct TemplateOptions {
    pub module: String,
    pub standalone: bool,
    pub root: String,
    pub minify: bool,
}

/// `(templates, options) -> single generated script`.
pub trait TemplateCompiler: Send + Sync {
    fn compile(&self, templates: &[TemplateSource], options: &TemplateOptions) -> Result<String>;
}

/// Generates an AngularJS `$templateCache` module.
#[derive(Debug, Clone, Copy, Default)]
pub struct AngularTemplateCache;

impl TemplateCompiler for AngularTemplateCache {
    fn compile(&self, templates: &[TemplateSource], options: &TemplateOptions) -> Result<String> {
        let mut sorted: Vec<&TemplateSource> = templates.iter().collect();
        sorted.sort_by(|a, b| a.rel_path.cmp(&b.rel_path));

        let deps = if options.standalone { ", []" } else { "" };
        let mut out = format!(
            "angular.module('{}'{}).run(['$templateCache', function($templateCache) {{",
            escape_js(&options.module),
            deps
        );

        for template in sorted {
            let markup = if options.minify {
                minify_html(&template.content)
            } else {
                template.content.clone()
            };
            let key = format!("{}{}", options.root, template.rel_path);
            out.push_str(&format!(
                "$templateCache.put('{}','{}');",
                escape_js(&key),
                escape_js(&markup)
            ));
        }

        out.push_str("}]);");
        Ok(out)
    }
}

/// Strip comments and collapse insignificant whitespace.
pub fn minify_html(markup: &str) -> String {
    let without_comments = HTML_COMMENT.replace_all(markup, "");
    let tight = BETWEEN_TAGS.replace_all(&without_comments, "><");
    WHITESPACE_RUN.replace_all(&tight, " ").trim().to_string()
}

/// Escape text for a single-quoted JavaScript string literal.
pub fn escape_js(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            other => out.push(other),
        }
    }
    out
}
