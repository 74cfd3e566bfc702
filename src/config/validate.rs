// src/config/validate.rs

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{AssetflowError, Result};
use crate::watch::build_globset;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = AssetflowError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_global_config(cfg)?;
    validate_patterns(cfg)?;
    validate_inject(cfg)?;
    validate_watch(cfg)?;
    Ok(())
}

fn config_error(message: impl Into<String>) -> AssetflowError {
    AssetflowError::ConfigError(message.into())
}

fn validate_global_config(cfg: &RawConfigFile) -> Result<()> {
    if cfg.config.queue_length == 0 {
        return Err(config_error("[config].queue_length must be >= 1 (got 0)"));
    }
    if cfg.config.temp.trim().is_empty() {
        return Err(config_error("[config].temp must not be empty"));
    }
    Ok(())
}

fn validate_patterns(cfg: &RawConfigFile) -> Result<()> {
    let groups: [(&str, &[String]); 10] = [
        ("scripts.src", &cfg.scripts.src),
        ("scripts.exclude", &cfg.scripts.exclude),
        ("templates.src", &cfg.templates.src),
        ("styles.entry", &cfg.styles.entry),
        ("inject.scripts", &cfg.inject.scripts),
        ("inject.styles", &cfg.inject.styles),
        ("lint.src", &cfg.lint.src),
        ("lint.exclude", &cfg.lint.exclude),
        ("watch.patterns", &cfg.watch.patterns),
        ("watch.exclude", &cfg.watch.exclude),
    ];

    for (field, patterns) in groups {
        build_globset(patterns).map_err(|err| config_error(format!("[{field}]: {err:#}")))?;
    }
    Ok(())
}

fn validate_inject(cfg: &RawConfigFile) -> Result<()> {
    let inject = &cfg.inject;

    if inject.target.trim().is_empty() {
        return Err(config_error("[inject].target must not be empty"));
    }

    // The end sentinel may be shared between markers; the start one may not.
    if !inject.marker_start.contains("{name}") {
        return Err(config_error(format!(
            "[inject].marker_start must contain the {{name}} placeholder (got '{}')",
            inject.marker_start
        )));
    }

    if inject.marker_start == inject.marker_end {
        return Err(config_error(
            "[inject].marker_start and marker_end must produce different sentinels",
        ));
    }

    for (field, name) in [
        ("scripts_marker", &inject.scripts_marker),
        ("styles_marker", &inject.styles_marker),
    ] {
        if name.trim().is_empty() {
            return Err(config_error(format!("[inject].{field} must not be empty")));
        }
    }

    if inject.scripts_marker == inject.styles_marker {
        return Err(config_error(format!(
            "[inject].scripts_marker and styles_marker must differ (both '{}')",
            inject.scripts_marker
        )));
    }

    Ok(())
}

fn validate_watch(cfg: &RawConfigFile) -> Result<()> {
    if cfg.watch.task.trim().is_empty() {
        return Err(config_error("[watch].task must not be empty"));
    }
    Ok(())
}
