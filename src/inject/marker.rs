// src/inject/marker.rs

use std::path::Path;

use crate::errors::{AssetflowError, Result};
use crate::watch::relative_str;

/// What a generated reference line points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    Script,
    Stylesheet,
}

/// A named, sentinel-delimited region of the target document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    name: String,
    kind: ReferenceKind,
    start: String,
    end: String,
}

impl Marker {
    /// Build a marker from sentinel templates, replacing `{name}`.
    pub fn new(name: &str, kind: ReferenceKind, start_template: &str, end_template: &str) -> Self {
        Self {
            name: name.to_string(),
            kind,
            start: start_template.replace("{name}", name),
            end: end_template.replace("{name}", name),
        }
    }

    /// `<!--name-->` ... `<!--endname-->`.
    pub fn html_comment(name: &str, kind: ReferenceKind) -> Self {
        Self::new(name, kind, "<!--{name}-->", "<!--end{name}-->")
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ReferenceKind {
        self.kind
    }

    pub fn start(&self) -> &str {
        &self.start
    }

    pub fn end(&self) -> &str {
        &self.end
    }

    /// Render one reference line for `href`.
    pub fn tag(&self, href: &str) -> String {
        match self.kind {
            ReferenceKind::Script => format!(r#"<script src="{href}"></script>"#),
            ReferenceKind::Stylesheet => format!(r#"<link rel="stylesheet" href="{href}">"#),
        }
    }
}

/// How file paths are turned into document references.
#[derive(Debug, Clone, Default)]
pub struct ReferenceOptions {
    /// Prefix the reference with `/`.
    pub add_root_slash: bool,
    /// Leading path stripped from references (e.g. `temp`).
    pub ignore_path: String,
}

/// Reference for `file`: its path relative to `root` with forward slashes,
/// minus `ignore_path`, optionally rooted at `/`.
pub fn reference_path(root: &Path, file: &Path, options: &ReferenceOptions) -> String {
    let rel = relative_str(root, file).unwrap_or_else(|| file.to_string_lossy().replace('\\', "/"));
    let mut rel = rel.trim_start_matches('/');

    let ignore = options.ignore_path.trim_matches('/');
    if !ignore.is_empty() {
        if let Some(rest) = rel.strip_prefix(ignore) {
            if rest.is_empty() || rest.starts_with('/') {
                rel = rest.trim_start_matches('/');
            }
        }
    }

    if options.add_root_slash {
        format!("/{rel}")
    } else {
        rel.to_string()
    }
}

/// Replace the interior of `marker` in `document` with one reference line
/// per item, in the given order.
///
/// The sentinels themselves are kept so the marker can be found again, and
/// reference lines use the indentation of the start sentinel's line. Running
/// this twice with the same items gives identical output.
pub fn inject(document: &str, marker: &Marker, items: &[String]) -> Result<String> {
    let not_found = || AssetflowError::MarkerNotFound {
        marker: marker.name.clone(),
    };

    let start_at = document.find(&marker.start).ok_or_else(not_found)?;
    let interior_start = start_at + marker.start.len();
    let interior_end = document[interior_start..]
        .find(&marker.end)
        .map(|offset| interior_start + offset)
        .ok_or_else(not_found)?;

    let line_start = document[..start_at].rfind('\n').map_or(0, |i| i + 1);
    let indent: String = document[line_start..start_at]
        .chars()
        .take_while(|c| *c == ' ' || *c == '\t')
        .collect();
    let newline = if document.contains("\r\n") { "\r\n" } else { "\n" };

    let mut interior = String::new();
    if !items.is_empty() {
        for item in items {
            interior.push_str(newline);
            interior.push_str(&indent);
            interior.push_str(&marker.tag(item));
        }
        interior.push_str(newline);
        interior.push_str(&indent);
    }

    let mut out = String::with_capacity(document.len() + interior.len());
    out.push_str(&document[..interior_start]);
    out.push_str(&interior);
    out.push_str(&document[interior_end..]);
    Ok(out)
}
