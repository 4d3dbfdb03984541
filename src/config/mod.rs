//! Configuration loading and management.

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::core::{Error, Result};
use crate::output::{ColorScale, Column, DurationStyle, Theme};
use crate::stats::{GroupBy, PercentPolicy, SortBy, SortDirection};

/// Environment variable prefix for config overrides.
pub const ENV_PREFIX: &str = "LINTPROF_";

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Table and color settings.
    pub display: DisplayConfig,
    /// Defaults for `lintprof analyse`.
    pub analyse: AnalyseConfig,
    /// Settings for `lintprof measure`.
    pub measure: MeasureConfig,
}

impl Config {
    /// Load configuration from an explicit file path.
    ///
    /// Errors if the file does not exist. Use this for explicit `--config` flags.
    /// Env vars with `LINTPROF_` prefix override file values.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::config(format!(
                "config file not found: {}",
                path.display()
            )));
        }
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file_exact(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(|e| Error::config(e.to_string()))
    }

    /// Load configuration from directory, looking for lintprof.toml or
    /// .lintprof/lintprof.toml.
    ///
    /// Missing files are silently skipped (defaults are used).
    pub fn load_default(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(dir.join("lintprof.toml")))
            .merge(Toml::file(dir.join(".lintprof/lintprof.toml")))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(|e| Error::config(e.to_string()))
    }

    /// Create default config file content.
    pub fn default_toml() -> &'static str {
        include_str!("default_config.toml")
    }
}

/// Table rendering configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DisplayConfig {
    /// Use colors in interactive output.
    pub color: bool,
    /// File identifiers longer than this are shortened.
    pub max_identifier_width: usize,
    pub duration_style: DurationStyle,
    pub time_scale: ColorScale,
    pub error_scale: ColorScale,
    pub warning_scale: ColorScale,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        let theme = Theme::default();
        Self {
            color: true,
            max_identifier_width: theme.max_identifier_width,
            duration_style: theme.duration_style,
            time_scale: theme.time_scale,
            error_scale: theme.error_scale,
            warning_scale: theme.warning_scale,
        }
    }
}

/// Default view for `lintprof analyse`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnalyseConfig {
    pub group_by: GroupBy,
    pub sort_by: SortBy,
    pub direction: SortDirection,
    /// Rows per level; `[files, rules per file]` in file-rule mode.
    pub take: Vec<i64>,
    pub percent: PercentPolicy,
    pub show: Vec<Column>,
}

impl Default for AnalyseConfig {
    fn default() -> Self {
        Self {
            group_by: GroupBy::Rule,
            sort_by: SortBy::Time,
            direction: SortDirection::Desc,
            take: vec![20, 5],
            percent: PercentPolicy::Global,
            show: Column::ALL.to_vec(),
        }
    }
}

/// Linter invocation settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MeasureConfig {
    /// Linter command line, run through the platform shell.
    pub command: String,
    /// Directory that receives stats files.
    pub out_dir: String,
    /// Stats file name prefix.
    pub file_prefix: String,
}

impl Default for MeasureConfig {
    fn default() -> Self {
        Self {
            command: "npx eslint".to_string(),
            out_dir: ".".to_string(),
            file_prefix: "lint-stats".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.display.color);
        assert_eq!(config.display.max_identifier_width, 60);
        assert_eq!(config.analyse.group_by, GroupBy::Rule);
        assert_eq!(config.analyse.take, vec![20, 5]);
        assert_eq!(config.measure.command, "npx eslint");
    }

    #[test]
    fn test_config_from_file() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "lintprof.toml",
                "[analyse]\ngroup_by = \"file-rule\"\ntake = [10, 3]\n\n[display]\nduration_style = \"si\"",
            )?;
            let config = Config::from_file("lintprof.toml").unwrap();
            assert_eq!(config.analyse.group_by, GroupBy::FileRule);
            assert_eq!(config.analyse.take, vec![10, 3]);
            assert_eq!(config.display.duration_style, DurationStyle::Si);
            assert_eq!(config.analyse.sort_by, SortBy::Time);
            Ok(())
        });
    }

    #[test]
    fn test_config_load_default_dot_dir() {
        Jail::expect_with(|jail| {
            std::fs::create_dir(jail.directory().join(".lintprof")).unwrap();
            jail.create_file(".lintprof/lintprof.toml", "[measure]\nout_dir = \"stats\"")?;
            let config = Config::load_default(".").unwrap();
            assert_eq!(config.measure.out_dir, "stats");
            Ok(())
        });
    }

    #[test]
    fn test_config_load_default_no_file() {
        Jail::expect_with(|_jail| {
            let config = Config::load_default(".").unwrap();
            assert_eq!(config, Config::default());
            Ok(())
        });
    }

    #[test]
    fn test_color_scale_from_toml() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "lintprof.toml",
                "[display.time_scale]\nlow = [0, 0, 0]\nhigh = [255, 255, 255]",
            )?;
            let config = Config::load_default(".").unwrap();
            assert_eq!(config.display.time_scale, ColorScale::new([0, 0, 0], [255, 255, 255]));
            Ok(())
        });
    }

    #[test]
    fn test_from_file_errors_on_missing_file() {
        let result = Config::from_file("/nonexistent/path/lintprof.toml");
        let err = result.unwrap_err().to_string();
        assert!(err.contains("not found"), "expected 'not found' in: {err}");
    }

    #[test]
    fn test_env_var_overrides_file_value() {
        Jail::expect_with(|jail| {
            jail.create_file("lintprof.toml", "[display]\nmax_identifier_width = 40")?;
            jail.set_env("LINTPROF_DISPLAY__MAX_IDENTIFIER_WIDTH", "25");
            let config = Config::from_file("lintprof.toml").unwrap();
            assert_eq!(config.display.max_identifier_width, 25);
            Ok(())
        });
    }

    #[test]
    fn test_env_var_overrides_default_no_file() {
        Jail::expect_with(|jail| {
            jail.set_env("LINTPROF_MEASURE__COMMAND", "pnpm eslint");
            let config = Config::load_default(".").unwrap();
            assert_eq!(config.measure.command, "pnpm eslint");
            Ok(())
        });
    }

    #[test]
    fn test_invalid_enum_value_is_config_error() {
        Jail::expect_with(|jail| {
            jail.create_file("lintprof.toml", "[analyse]\ngroup_by = \"folder\"")?;
            let err = Config::load_default(".").unwrap_err();
            assert!(err.to_string().starts_with("Configuration error"));
            Ok(())
        });
    }

    #[test]
    fn test_default_toml_parses() {
        let parsed: Config = toml::from_str(Config::default_toml()).unwrap();
        assert_eq!(parsed, Config::default());
    }
}
