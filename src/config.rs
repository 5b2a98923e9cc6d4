// File: ./src/config.rs
// Handles configuration loading, saving, and defaults.
use crate::category::{CategoryId, CategoryRegistry};
use crate::context::AppContext;
use crate::storage::LocalStorage;
use crate::store::DateRange;
use anyhow::{Error, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;

fn default_window_days() -> u32 {
    90
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Category ids hidden from the calendar at startup.
    #[serde(default)]
    pub hidden_categories: Vec<String>,
    /// Days loaded before and after today. `0` loads everything.
    #[serde(default = "default_window_days")]
    pub window_days: u32,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            hidden_categories: Vec::new(),
            window_days: default_window_days(),
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Load the configuration from disk using an explicit context.
    pub fn load(ctx: &dyn AppContext) -> Result<Self> {
        let path = ctx.get_config_file_path()?;

        if !path.exists() {
            return Err(anyhow::anyhow!("Config file not found"));
        }

        let contents = fs::read_to_string(&path).map_err(|e| {
            anyhow::anyhow!("Failed to read config file '{}': {}", path.display(), e)
        })?;

        let config: Config = toml::from_str(&contents).map_err(|e| {
            anyhow::anyhow!("Failed to parse config file '{}': {}", path.display(), e)
        })?;

        Ok(config)
    }

    /// Like `load`, but a missing file yields the defaults.
    pub fn load_or_default(ctx: &dyn AppContext) -> Result<Self> {
        match Self::load(ctx) {
            Ok(config) => Ok(config),
            Err(e) if Self::is_missing_config_error(&e) => Ok(Self::default()),
            Err(e) => Err(e),
        }
    }

    /// Whether an error from `load` means the config file does not exist.
    pub fn is_missing_config_error(err: &Error) -> bool {
        if err.to_string().contains("Config file not found") {
            return true;
        }

        for cause in err.chain() {
            if let Some(io_err) = cause.downcast_ref::<std::io::Error>()
                && io_err.kind() == std::io::ErrorKind::NotFound
            {
                return true;
            }
        }

        false
    }

    /// Save configuration using an explicit context.
    pub fn save(&self, ctx: &dyn AppContext) -> Result<()> {
        let path = ctx.get_config_file_path()?;
        LocalStorage::with_lock(&path, || {
            let toml_str = toml::to_string_pretty(self)?;
            LocalStorage::atomic_write(&path, toml_str)?;
            Ok(())
        })?;
        Ok(())
    }

    pub fn category_registry(&self) -> CategoryRegistry {
        CategoryRegistry::from_hidden_names(&self.hidden_categories)
    }

    /// Record a category's visibility so it survives restarts.
    pub fn set_category_hidden(&mut self, id: CategoryId, hidden: bool) {
        let name = id.to_string();
        self.hidden_categories
            .retain(|c| !c.eq_ignore_ascii_case(&name));
        if hidden {
            self.hidden_categories.push(name);
        }
    }

    pub fn date_range(&self, today: NaiveDate) -> DateRange {
        match self.window_days {
            0 => DateRange::unbounded(),
            days => {
                let range = DateRange::around(today, days);
                if !range.is_bounded() {
                    log::warn!(
                        "window_days = {} reaches past the calendar, loading without that bound",
                        days
                    );
                }
                range
            }
        }
    }

    pub fn log_level_filter(&self) -> log::LevelFilter {
        self.log_level.parse().unwrap_or(log::LevelFilter::Info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::TestContext;

    #[test]
    fn test_missing_file_is_detected() {
        let ctx = TestContext::new();
        let err = Config::load(&ctx).unwrap_err();
        assert!(Config::is_missing_config_error(&err));
        assert_eq!(Config::load_or_default(&ctx).unwrap(), Config::default());
    }

    #[test]
    fn test_save_and_reload() {
        let ctx = TestContext::new();
        let mut config = Config::default();
        config.set_category_hidden(CategoryId::Holidays, true);
        config.window_days = 0;
        config.save(&ctx).unwrap();

        let loaded = Config::load(&ctx).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.category_registry().hidden(), vec![CategoryId::Holidays]);
        assert_eq!(
            loaded.date_range(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()),
            DateRange::unbounded()
        );
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let ctx = TestContext::new();
        fs::write(
            ctx.get_config_file_path().unwrap(),
            "hidden_categories = [\"work\"]\n",
        )
        .unwrap();
        let config = Config::load(&ctx).unwrap();
        assert_eq!(config.window_days, 90);
        assert_eq!(config.log_level_filter(), log::LevelFilter::Info);
        assert_eq!(config.hidden_categories, vec!["work".to_string()]);
    }

    #[test]
    fn test_huge_window_loads_everything() {
        let ctx = TestContext::new();
        fs::write(
            ctx.get_config_file_path().unwrap(),
            "window_days = 100000000\n",
        )
        .unwrap();
        let config = Config::load(&ctx).unwrap();
        let range = config.date_range(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(range, DateRange::unbounded());
    }

    #[test]
    fn test_window_is_centred_on_today() {
        let config = Config {
            window_days: 7,
            ..Config::default()
        };
        let today = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let range = config.date_range(today);
        let midnight = |m, d| {
            NaiveDate::from_ymd_opt(2024, m, d)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
        };
        assert_eq!(range.from, Some(midnight(2, 23)));
        assert_eq!(range.to, Some(midnight(3, 9)));
    }

    #[test]
    fn test_set_category_hidden_is_idempotent() {
        let mut config = Config::default();
        config.set_category_hidden(CategoryId::Travel, true);
        config.set_category_hidden(CategoryId::Travel, true);
        assert_eq!(config.hidden_categories, vec!["travel".to_string()]);
        config.set_category_hidden(CategoryId::Travel, false);
        assert!(config.hidden_categories.is_empty());
    }

    #[test]
    fn test_invalid_toml_is_not_missing() {
        let ctx = TestContext::new();
        fs::write(ctx.get_config_file_path().unwrap(), "window_days = [").unwrap();
        let err = Config::load(&ctx).unwrap_err();
        assert!(!Config::is_missing_config_error(&err));
        assert!(Config::load_or_default(&ctx).is_err());
    }
}
