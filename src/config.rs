use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::hours::{HolidaySet, WorkWindow};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Top-level configuration loaded from `config.toml`.
///
/// Every table except `[options]` is required. Once loaded (and once the
/// command line overrides are applied) the value is shared read-only.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub repositories: RepositoriesConfig,

    pub period: Period,

    pub work_hours: WorkWindow,

    /// All `[[holidays]]` tables merged into one set.
    #[serde(deserialize_with = "deserialize_holidays")]
    pub holidays: HolidaySet,

    pub placeholders: PlaceholdersConfig,

    #[serde(default)]
    pub options: Options,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RepositoriesConfig {
    /// Repositories in `owner/repo` form, processed in this order.
    pub targets: Vec<String>,
}

/// Date range a pull request's local creation date must fall in, inclusive.
///
/// Compared by date, not datetime: a pull request created at any time on
/// `end_date` is in range, rather than the period stopping at `end_date 00:00`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Period {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl Period {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaceholdersConfig {
    /// Literal substrings that mark a body as still needing a duration.
    pub patterns: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct Options {
    #[serde(default)]
    pub dry_run: bool,

    #[serde(default)]
    pub verbose: bool,
}

#[derive(Deserialize)]
struct HolidayGroup {
    #[serde(default)]
    dates: Vec<NaiveDate>,
}

fn deserialize_holidays<'de, D>(deserializer: D) -> Result<HolidaySet, D::Error>
where
    D: Deserializer<'de>,
{
    let groups = Vec::<HolidayGroup>::deserialize(deserializer)?;
    Ok(groups.into_iter().flat_map(|group| group.dates).collect())
}

impl Config {
    /// Load and validate the configuration at `path`.
    pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Config, ConfigError> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `--dry-run` / `--verbose`. Flags can only switch options on.
    pub fn apply_overrides(&mut self, dry_run: bool, verbose: bool) {
        self.options.dry_run |= dry_run;
        self.options.verbose |= verbose;
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.repositories.targets.is_empty() {
            return Err(ConfigError::Invalid(
                "repositories.targets must list at least one repository".to_string(),
            ));
        }

        if self.period.start_date > self.period.end_date {
            return Err(ConfigError::Invalid(format!(
                "period.start_date {} is after period.end_date {}",
                self.period.start_date, self.period.end_date
            )));
        }

        let window = &self.work_hours;
        match (window.start_time(), window.end_time()) {
            (Some(start), Some(end)) if start < end => Ok(()),
            (Some(_), Some(_)) => Err(ConfigError::Invalid(format!(
                "work_hours must start before they end, got {window}"
            ))),
            _ => Err(ConfigError::Invalid(format!(
                "work_hours has an out-of-range clock value: {window}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"
[repositories]
targets = ["org/repo1", "org/repo2"]

[period]
start_date = "2025-10-01"
end_date = "2025-12-31"

[work_hours]
start_hour = 9
start_minute = 30
end_hour = 18
end_minute = 30

[[holidays]]
dates = ["2025-10-14", "2025-11-04"]

[placeholders]
patterns = ["xx 時間", "xx時間"]

[options]
dry_run = false
verbose = true
"#;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_config_toml() {
        let config = Config::from_toml(SAMPLE).unwrap();
        assert_eq!(config.repositories.targets, vec!["org/repo1", "org/repo2"]);
        assert_eq!(config.period.start_date, date(2025, 10, 1));
        assert_eq!(config.period.end_date, date(2025, 12, 31));
        assert_eq!(config.work_hours, WorkWindow::new(9, 30, 18, 30));
        assert_eq!(config.holidays.len(), 2);
        assert!(config.holidays.contains(date(2025, 10, 14)));
        assert_eq!(config.placeholders.patterns, vec!["xx 時間", "xx時間"]);
        assert!(!config.options.dry_run);
        assert!(config.options.verbose);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.repositories.targets.len(), 2);
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load_from(Path::new("/nonexistent/config.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_missing_required_key() {
        let err = Config::from_toml("[repositories]\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().contains("targets"));
    }

    #[test]
    fn test_multiple_holiday_tables_are_merged() {
        let toml_str = SAMPLE.replace(
            "[placeholders]",
            "[[holidays]]\ndates = [\"2025-12-29\"]\n\n[placeholders]",
        );
        let config = Config::from_toml(&toml_str).unwrap();
        assert_eq!(config.holidays.len(), 3);
        assert!(config.holidays.contains(date(2025, 12, 29)));
    }

    #[test]
    fn test_options_default_to_off() {
        let start = SAMPLE.find("[options]").unwrap();
        let config = Config::from_toml(&SAMPLE[..start]).unwrap();
        assert!(!config.options.dry_run);
        assert!(!config.options.verbose);
    }

    #[test]
    fn test_rejects_inverted_work_hours() {
        let toml_str = SAMPLE.replace("end_hour = 18", "end_hour = 8");
        let err = Config::from_toml(&toml_str).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_rejects_out_of_range_work_hours() {
        let toml_str = SAMPLE.replace("start_minute = 30", "start_minute = 75");
        assert!(matches!(
            Config::from_toml(&toml_str),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_rejects_inverted_period() {
        let toml_str = SAMPLE.replace("2025-12-31", "2025-09-01");
        assert!(matches!(
            Config::from_toml(&toml_str),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_rejects_empty_repositories() {
        let toml_str = SAMPLE.replace(r#"["org/repo1", "org/repo2"]"#, "[]");
        assert!(matches!(
            Config::from_toml(&toml_str),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_overrides_only_switch_on() {
        let mut config = Config::from_toml(SAMPLE).unwrap();
        config.apply_overrides(true, false);
        assert!(config.options.dry_run);
        assert!(config.options.verbose);
    }

    #[test]
    fn test_period_contains_is_inclusive() {
        let period = Period {
            start_date: date(2025, 10, 1),
            end_date: date(2025, 12, 31),
        };
        assert!(period.contains(date(2025, 10, 1)));
        assert!(period.contains(date(2025, 12, 31)));
        assert!(!period.contains(date(2026, 1, 1)));
        assert!(!period.contains(date(2025, 9, 30)));
    }
}
