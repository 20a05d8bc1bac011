use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{DashboardError, Result};
use crate::table::SortField;

pub const DEFAULT_CONFIG_FILE: &str = "crime-dashboard.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub table: TableConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Postgres connection string.
    #[serde(default)]
    pub url: Option<String>,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: default_max_connections(),
        }
    }
}

fn default_max_connections() -> u32 {
    5
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableConfig {
    /// Rows shown per page in the record list.
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    #[serde(default)]
    pub default_sort: SortField,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            default_sort: SortField::default(),
        }
    }
}

fn default_page_size() -> usize {
    10
}

impl Config {
    /// Load from `path`, or from the default file if it exists, then apply
    /// environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };

        if let Ok(url) = std::env::var("DATABASE_URL") {
            config.database.url = Some(url);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            DashboardError::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| DashboardError::Config(e.to_string()))
    }

    fn validate(&self) -> Result<()> {
        if self.table.page_size == 0 {
            return Err(DashboardError::Config(
                "table.page_size must be at least 1".to_string(),
            ));
        }
        if self.database.max_connections == 0 {
            return Err(DashboardError::Config(
                "database.max_connections must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn database_url(&self) -> Result<&str> {
        self.database.url.as_deref().ok_or_else(|| {
            DashboardError::Config(
                "DATABASE_URL must be set to a production Postgres instance".to_string(),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.table.page_size, 10);
        assert_eq!(config.table.default_sort, SortField::Date);
        assert_eq!(config.database.max_connections, 5);
        assert!(config.database.url.is_none());
    }

    #[test]
    fn file_values_override_defaults() {
        let config = Config::from_toml(
            r#"
            [database]
            url = "postgres://localhost/crime"

            [table]
            page_size = 25
            default_sort = "victimAge"
            "#,
        )
        .unwrap();
        assert_eq!(config.database_url().unwrap(), "postgres://localhost/crime");
        assert_eq!(config.table.page_size, 25);
        assert_eq!(config.table.default_sort, SortField::VictimAge);
    }

    #[test]
    fn zero_page_size_is_rejected() {
        let config = Config::from_toml("[table]\npage_size = 0").unwrap();
        assert!(config.validate().is_err());
    }
}
