// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use recnav_tui::OutputFormat;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const APP_NAME: &str = "recnav";
const CONFIG_VERSION: i64 = 1;
const DEFAULT_ROOT_LABEL: &str = "Konnect";
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_LATENCY_MS: u64 = 350;
const DEFAULT_PROFILE: &str = "default";
const MIN_TABLE_WIDTH: usize = 20;
const MAX_LATENCY_MS: u64 = 10_000;
const LOG_LEVELS: [&str; 6] = ["trace", "debug", "info", "warn", "error", "off"];

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub output: Output,
    #[serde(default)]
    pub ui: Ui,
    #[serde(default)]
    pub log: Log,
    #[serde(default)]
    pub demo: Demo,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            output: Output::default(),
            ui: Ui::default(),
            log: Log::default(),
            demo: Demo::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Output {
    pub format: Option<String>,
    pub interactive: Option<bool>,
}

impl Default for Output {
    fn default() -> Self {
        Self {
            format: Some(OutputFormat::Text.to_string()),
            interactive: Some(true),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Ui {
    pub root_label: Option<String>,
    pub max_width: Option<usize>,
}

impl Default for Ui {
    fn default() -> Self {
        Self {
            root_label: Some(DEFAULT_ROOT_LABEL.to_owned()),
            max_width: Some(0),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Log {
    pub level: Option<String>,
    pub file: Option<String>,
}

impl Default for Log {
    fn default() -> Self {
        Self {
            level: Some(DEFAULT_LOG_LEVEL.to_owned()),
            file: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Demo {
    pub latency_ms: Option<u64>,
    pub profile: Option<String>,
}

impl Default for Demo {
    fn default() -> Self {
        Self {
            latency_ms: Some(DEFAULT_LATENCY_MS),
            profile: Some(DEFAULT_PROFILE.to_owned()),
        }
    }
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os("RECNAV_CONFIG_PATH") {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set RECNAV_CONFIG_PATH to the config file")
        })?;
        Ok(config_root.join(APP_NAME).join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let value: toml::Value = toml::from_str(&raw)
            .with_context(|| format!("parse TOML config {}", path.display()))?;

        let version = value
            .get("version")
            .and_then(toml::Value::as_integer)
            .ok_or_else(|| {
                anyhow!(
                    "config file {} is not versioned. Add `version = 1` and put values under [output], [ui], [log] and [demo]",
                    path.display()
                )
            })?;

        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 1",
                version,
                path.display()
            );
        }

        let config: Config = value
            .try_into()
            .with_context(|| format!("decode config {}", path.display()))?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        if let Some(format) = &self.output.format {
            format
                .parse::<OutputFormat>()
                .with_context(|| format!("output.format in {}", path.display()))?;
        }

        if let Some(width) = self.ui.max_width
            && width > 0
            && width < MIN_TABLE_WIDTH
        {
            bail!(
                "ui.max_width in {} must be 0 (use the terminal width) or at least {}, got {}",
                path.display(),
                MIN_TABLE_WIDTH,
                width
            );
        }

        if let Some(level) = &self.log.level
            && !LOG_LEVELS.contains(&level.trim().to_ascii_lowercase().as_str())
        {
            bail!(
                "log.level in {} must be one of {}, got {:?}",
                path.display(),
                LOG_LEVELS.join(", "),
                level
            );
        }

        if let Some(latency) = self.demo.latency_ms
            && latency > MAX_LATENCY_MS
        {
            bail!(
                "demo.latency_ms in {} must be at most {}, got {}",
                path.display(),
                MAX_LATENCY_MS,
                latency
            );
        }

        Ok(())
    }

    pub fn output_format(&self) -> Result<OutputFormat> {
        match &self.output.format {
            Some(format) => format.parse(),
            None => Ok(OutputFormat::default()),
        }
    }

    pub fn interactive(&self) -> bool {
        self.output.interactive.unwrap_or(true)
    }

    pub fn root_label(&self) -> &str {
        self.ui
            .root_label
            .as_deref()
            .map(str::trim)
            .filter(|label| !label.is_empty())
            .unwrap_or(DEFAULT_ROOT_LABEL)
    }

    pub fn max_width(&self) -> usize {
        self.ui.max_width.unwrap_or(0)
    }

    pub fn log_level(&self) -> String {
        self.log
            .level
            .as_deref()
            .unwrap_or(DEFAULT_LOG_LEVEL)
            .trim()
            .to_ascii_lowercase()
    }

    /// Where logs go while the terminal UI owns the screen.
    pub fn log_file(&self) -> Result<PathBuf> {
        if let Some(file) = &self.log.file {
            return Ok(PathBuf::from(file));
        }
        let cache_root = dirs::cache_dir().ok_or_else(|| {
            anyhow!("cannot resolve cache directory; set [log].file to a writable path")
        })?;
        Ok(cache_root.join(APP_NAME).join("recnav.log"))
    }

    pub fn latency(&self) -> Duration {
        Duration::from_millis(self.demo.latency_ms.unwrap_or(DEFAULT_LATENCY_MS))
    }

    pub fn profile(&self) -> &str {
        self.demo.profile.as_deref().unwrap_or(DEFAULT_PROFILE)
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# recnav config\n# Place this file at: {}\n\nversion = 1\n\n[output]\n# text, json or yaml; used when not interactive\nformat = \"text\"\ninteractive = true\n\n[ui]\nroot_label = \"{}\"\n# 0 uses the full terminal width\nmax_width = 0\n\n[log]\n# RECNAV_LOG overrides this\nlevel = \"{}\"\n# Optional. Default is the platform cache dir (for example ~/.cache/recnav/recnav.log)\n# file = \"/absolute/path/to/recnav.log\"\n\n[demo]\nlatency_ms = {}\nprofile = \"{}\"\n",
            path.display(),
            DEFAULT_ROOT_LABEL,
            DEFAULT_LOG_LEVEL,
            DEFAULT_LATENCY_MS,
            DEFAULT_PROFILE,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::Config;
    use anyhow::Result;
    use recnav_testkit::temp_config_path;
    use recnav_tui::OutputFormat;
    use std::path::PathBuf;
    use std::sync::{Mutex, OnceLock};
    use std::time::Duration;

    fn write_config(content: &str) -> Result<(tempfile::TempDir, PathBuf)> {
        let (temp, path) = temp_config_path()?;
        std::fs::write(&path, content)?;
        Ok((temp, path))
    }

    fn env_lock() -> std::sync::MutexGuard<'static, ()> {
        static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        match ENV_LOCK.get_or_init(|| Mutex::new(())).lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    #[test]
    fn missing_config_uses_defaults() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let config = Config::load(&temp.path().join("missing.toml"))?;
        assert_eq!(config.version, 1);
        assert_eq!(config.output_format()?, OutputFormat::Text);
        assert!(config.interactive());
        assert_eq!(config.root_label(), "Konnect");
        assert_eq!(config.latency(), Duration::from_millis(350));
        Ok(())
    }

    #[test]
    fn unversioned_config_is_rejected_with_actionable_message() -> Result<()> {
        let (_temp, path) = write_config("[output]\nformat = \"json\"\n")?;
        let error = Config::load(&path).expect_err("unversioned config should fail");
        let message = error.to_string();
        assert!(message.contains("version = 1"));
        assert!(message.contains("[output], [ui], [log] and [demo]"));
        Ok(())
    }

    #[test]
    fn v1_config_parses() -> Result<()> {
        let (_temp, path) = write_config(
            "version = 1\n[output]\nformat = \"YAML\"\ninteractive = false\n[ui]\nroot_label = \"Gateway\"\nmax_width = 100\n[log]\nlevel = \"debug\"\nfile = \"/tmp/recnav-test.log\"\n[demo]\nlatency_ms = 0\nprofile = \"staging\"\n",
        )?;

        let config = Config::load(&path)?;
        assert_eq!(config.output_format()?, OutputFormat::Yaml);
        assert!(!config.interactive());
        assert_eq!(config.root_label(), "Gateway");
        assert_eq!(config.max_width(), 100);
        assert_eq!(config.log_level(), "debug");
        assert_eq!(config.log_file()?, PathBuf::from("/tmp/recnav-test.log"));
        assert_eq!(config.latency(), Duration::ZERO);
        assert_eq!(config.profile(), "staging");
        Ok(())
    }

    #[test]
    fn malformed_config_returns_parse_error() -> Result<()> {
        let (_temp, path) = write_config("{{not toml")?;
        let error = Config::load(&path).expect_err("malformed config should fail");
        assert!(error.to_string().contains("parse TOML config"));
        Ok(())
    }

    #[test]
    fn unsupported_config_version_is_rejected() -> Result<()> {
        let (_temp, path) = write_config("version = 2\n")?;
        let error = Config::load(&path).expect_err("v2 config should fail");
        assert!(error.to_string().contains("unsupported config version 2"));
        Ok(())
    }

    #[test]
    fn invalid_values_name_the_offending_key() -> Result<()> {
        let cases = [
            ("[output]\nformat = \"xml\"\n", "output.format"),
            ("[ui]\nmax_width = 5\n", "ui.max_width"),
            ("[log]\nlevel = \"loud\"\n", "log.level"),
            ("[demo]\nlatency_ms = 60000\n", "demo.latency_ms"),
        ];
        for (body, key) in cases {
            let (_temp, path) = write_config(&format!("version = 1\n{body}"))?;
            let error = Config::load(&path).expect_err("invalid value should fail");
            assert!(
                format!("{error:#}").contains(key),
                "expected {key} in {error:#}"
            );
        }
        Ok(())
    }

    #[test]
    fn blank_root_label_falls_back_to_default() -> Result<()> {
        let (_temp, path) = write_config("version = 1\n[ui]\nroot_label = \"  \"\n")?;
        let config = Config::load(&path)?;
        assert_eq!(config.root_label(), "Konnect");
        Ok(())
    }

    #[test]
    fn default_path_honors_env_override() -> Result<()> {
        let _guard = env_lock();
        let temp = tempfile::tempdir()?;
        let override_path = temp.path().join("custom-config.toml");
        // SAFETY: test-only process-local env mutation.
        unsafe {
            std::env::set_var("RECNAV_CONFIG_PATH", &override_path);
        }
        let resolved = Config::default_path()?;
        // SAFETY: test cleanup for process-local env mutation.
        unsafe {
            std::env::remove_var("RECNAV_CONFIG_PATH");
        }
        assert_eq!(resolved, override_path);
        Ok(())
    }

    #[test]
    fn default_path_uses_config_toml_suffix_when_no_env_override() -> Result<()> {
        let _guard = env_lock();
        // SAFETY: test-only process-local env mutation.
        unsafe {
            std::env::remove_var("RECNAV_CONFIG_PATH");
        }
        let path = Config::default_path()?;
        assert!(path.ends_with("recnav/config.toml"));
        Ok(())
    }

    #[test]
    fn example_config_round_trips_through_load() -> Result<()> {
        let (_temp, path) = temp_config_path()?;
        let example = Config::example_config(&path);
        assert!(example.contains("version = 1"));
        assert!(example.contains("[demo]"));
        std::fs::write(&path, example)?;
        let config = Config::load(&path)?;
        assert_eq!(config.profile(), "default");
        Ok(())
    }
}
