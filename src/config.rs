// ⚙️ Configuration - file locations + scoring thresholds
// Defaults, overridable from the environment.

use crate::student::Thresholds;
use anyhow::{Context, Result};
use std::path::PathBuf;

pub const DEFAULT_DATA_FILE: &str = "gradeforge_data.json";
pub const DEFAULT_EXPORT_FILE: &str = "gradeforge_export.csv";

pub const ENV_DATA_FILE: &str = "GRADEFORGE_DATA";
pub const ENV_EXPORT_FILE: &str = "GRADEFORGE_EXPORT";
pub const ENV_PASS_THRESHOLD: &str = "GRADEFORGE_PASS_THRESHOLD";
pub const ENV_GPA_THRESHOLD: &str = "GRADEFORGE_GPA_THRESHOLD";
pub const ENV_LOG: &str = "GRADEFORGE_LOG";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// JSON data file loaded at startup and written on save/exit
    pub data_file: PathBuf,

    /// CSV path used when the user does not name one
    pub export_file: PathBuf,

    pub thresholds: Thresholds,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            data_file: PathBuf::from(DEFAULT_DATA_FILE),
            export_file: PathBuf::from(DEFAULT_EXPORT_FILE),
            thresholds: Thresholds::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source (blank values are ignored)
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Config::default();

        if let Some(path) = get(ENV_DATA_FILE) {
            config.data_file = PathBuf::from(path.trim());
        }
        if let Some(path) = get(ENV_EXPORT_FILE) {
            config.export_file = PathBuf::from(path.trim());
        }
        if let Some(raw) = get(ENV_PASS_THRESHOLD) {
            config.thresholds.pass_mark = parse_threshold(ENV_PASS_THRESHOLD, &raw)?;
        }
        if let Some(raw) = get(ENV_GPA_THRESHOLD) {
            config.thresholds.good_standing_gpa = parse_threshold(ENV_GPA_THRESHOLD, &raw)?;
        }

        Ok(config)
    }
}

fn parse_threshold(key: &str, raw: &str) -> Result<f64> {
    let value: f64 = raw
        .trim()
        .parse()
        .with_context(|| format!("{key} must be a number, got '{raw}'"))?;
    if !value.is_finite() || value < 0.0 {
        anyhow::bail!("{key} must be a non-negative number, got '{raw}'");
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_environment() {
        let config = Config::from_lookup(|_| None).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.thresholds.pass_mark, 50.0);
        assert_eq!(config.thresholds.good_standing_gpa, 2.0);
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            (ENV_DATA_FILE, "/tmp/grades.json"),
            (ENV_PASS_THRESHOLD, "60"),
            (ENV_GPA_THRESHOLD, " 2.5 "),
            (ENV_EXPORT_FILE, "   "),
        ]))
        .unwrap();

        assert_eq!(config.data_file, PathBuf::from("/tmp/grades.json"));
        assert_eq!(config.export_file, PathBuf::from(DEFAULT_EXPORT_FILE));
        assert_eq!(config.thresholds.pass_mark, 60.0);
        assert_eq!(config.thresholds.good_standing_gpa, 2.5);
    }

    #[test]
    fn test_invalid_threshold_rejected() {
        let err = Config::from_lookup(lookup_from(&[(ENV_GPA_THRESHOLD, "high")])).unwrap_err();
        assert!(err.to_string().contains(ENV_GPA_THRESHOLD));

        assert!(Config::from_lookup(lookup_from(&[(ENV_PASS_THRESHOLD, "-1")])).is_err());
    }
}
