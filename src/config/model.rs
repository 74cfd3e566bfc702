// src/config/model.rs

use serde::Deserialize;

use crate::types::TriggerWhileRunningBehaviour;

/// Top-level configuration as read from `Assetflow.toml`.
///
/// ```toml
/// [config]
/// triggered_while_running_behaviour = "queue"
/// temp = "temp"
///
/// [scripts]
/// src = ["public/app/**/*.js"]
///
/// [inject]
/// target = "public/index.html"
///
/// [watch]
/// patterns = ["public/app/**/*.js", "public/app/**/*.html"]
/// ```
///
/// All sections are optional; the defaults describe the conventional
/// `public/` + `temp/` project layout. Paths are relative to the project
/// root (the directory holding the config file).
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawConfigFile {
    #[serde(default)]
    pub config: ConfigSection,
    #[serde(default)]
    pub scripts: ScriptsSection,
    #[serde(default)]
    pub templates: TemplatesSection,
    #[serde(default)]
    pub styles: StylesSection,
    #[serde(default)]
    pub inject: InjectSection,
    #[serde(default)]
    pub lint: LintSection,
    #[serde(default)]
    pub watch: WatchSection,
}

/// Validated configuration.
///
/// Only obtainable through `TryFrom<RawConfigFile>` (see `validate.rs`), or
/// `ConfigFile::default()`, which is valid by construction.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub config: ConfigSection,
    pub scripts: ScriptsSection,
    pub templates: TemplatesSection,
    pub styles: StylesSection,
    pub inject: InjectSection,
    pub lint: LintSection,
    pub watch: WatchSection,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(raw: RawConfigFile) -> Self {
        Self {
            config: raw.config,
            scripts: raw.scripts,
            templates: raw.templates,
            styles: raw.styles,
            inject: raw.inject,
            lint: raw.lint,
            watch: raw.watch,
        }
    }
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self::new_unchecked(RawConfigFile::default())
    }
}

/// `[config]` section: session behaviour and the transient output tree.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ConfigSection {
    /// What the watch dispatcher does with triggers that arrive while a
    /// session is running.
    pub triggered_while_running_behaviour: TriggerWhileRunningBehaviour,
    /// Maximum number of queued follow-up sessions.
    pub queue_length: usize,
    /// Transient output directory, removed by the `clean` task.
    pub temp: String,
}

impl Default for ConfigSection {
    fn default() -> Self {
        Self {
            triggered_while_running_behaviour: TriggerWhileRunningBehaviour::default(),
            queue_length: 1,
            temp: "temp".to_string(),
        }
    }
}

/// `[scripts]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScriptsSection {
    pub src: Vec<String>,
    pub exclude: Vec<String>,
    pub dest: String,
    /// Shell command used as script transpiler (stdin -> stdout). When absent
    /// scripts are copied unchanged.
    pub transpile_cmd: Option<String>,
}

impl Default for ScriptsSection {
    fn default() -> Self {
        Self {
            src: vec!["public/app/**/*.js".to_string()],
            exclude: Vec::new(),
            dest: "temp/js".to_string(),
            transpile_cmd: None,
        }
    }
}

/// `[templates]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TemplatesSection {
    pub src: Vec<String>,
    pub dest: String,
    pub filename: String,
    /// Module the generated `run` block is attached to.
    pub module: String,
    /// If true the generated script declares the module itself.
    pub standalone: bool,
    /// Prefix for template cache keys.
    pub root: String,
    pub minify: bool,
}

impl Default for TemplatesSection {
    fn default() -> Self {
        Self {
            src: vec!["public/app/**/*.html".to_string()],
            dest: "temp/js/templates".to_string(),
            filename: "templates.js".to_string(),
            module: "app".to_string(),
            standalone: false,
            root: "/public/app/".to_string(),
            minify: true,
        }
    }
}

/// `[styles]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StylesSection {
    pub entry: Vec<String>,
    pub dest: String,
    /// Shell command used as stylesheet compiler. When absent the built-in
    /// SCSS compiler is used.
    pub compile_cmd: Option<String>,
    /// Extra `@import` search directories for the built-in compiler,
    /// relative to the project root.
    pub load_paths: Vec<String>,
}

impl Default for StylesSection {
    fn default() -> Self {
        Self {
            entry: vec!["public/content/styles/styles.scss".to_string()],
            dest: "temp/styles".to_string(),
            compile_cmd: None,
            load_paths: Vec::new(),
        }
    }
}

/// `[inject]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InjectSection {
    pub target: String,
    /// Output document; defaults to rewriting `target` in place.
    pub dest: Option<String>,
    pub scripts: Vec<String>,
    pub styles: Vec<String>,
    pub scripts_marker: String,
    pub styles_marker: String,
    /// Start sentinel template; `{name}` is replaced by the marker name.
    pub marker_start: String,
    pub marker_end: String,
    pub add_root_slash: bool,
    /// Prefix stripped from generated reference paths.
    pub ignore_path: String,
}

impl InjectSection {
    pub fn dest_path(&self) -> &str {
        self.dest.as_deref().unwrap_or(&self.target)
    }
}

impl Default for InjectSection {
    fn default() -> Self {
        Self {
            target: "public/index.html".to_string(),
            dest: None,
            scripts: vec!["temp/js/**/*.js".to_string()],
            styles: vec!["temp/styles/**/*.css".to_string()],
            scripts_marker: "scripts".to_string(),
            styles_marker: "styles".to_string(),
            marker_start: "<!--{name}-->".to_string(),
            marker_end: "<!--end{name}-->".to_string(),
            add_root_slash: true,
            ignore_path: String::new(),
        }
    }
}

/// `[lint]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LintSection {
    pub src: Vec<String>,
    pub exclude: Vec<String>,
    /// Linter command; the matched files are appended as arguments.
    pub cmd: Option<String>,
}

impl Default for LintSection {
    fn default() -> Self {
        Self {
            src: vec!["**/*.js".to_string()],
            exclude: vec!["public/vendors/**".to_string(), "node_modules/**".to_string()],
            cmd: None,
        }
    }
}

/// `[watch]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WatchSection {
    pub patterns: Vec<String>,
    pub exclude: Vec<String>,
    /// Task triggered on each qualifying file event.
    pub task: String,
    /// Skip triggers when the file's content hash did not change.
    pub use_hash: bool,
}

impl Default for WatchSection {
    fn default() -> Self {
        Self {
            patterns: vec![
                "public/app/**/*.js".to_string(),
                "public/app/**/*.html".to_string(),
            ],
            exclude: Vec::new(),
            task: "inject".to_string(),
            use_hash: false,
        }
    }
}
