// src/config/mod.rs

//! `Assetflow.toml` configuration: model, loading and validation.

pub mod loader;
pub mod model;
mod validate;

pub use loader::{
    config_root_dir, default_config_path, load_and_validate, load_from_path, load_from_str,
    DEFAULT_CONFIG_FILE,
};
pub use model::{
    ConfigFile, ConfigSection, InjectSection, LintSection, RawConfigFile, ScriptsSection,
    StylesSection, TemplatesSection, WatchSection,
};
