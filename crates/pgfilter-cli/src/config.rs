use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct ProjectConfig {
    pub config_path: PathBuf,
    pub file: ConfigFile,
}

impl ProjectConfig {
    pub fn load(config_path: PathBuf) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(&config_path).map_err(|e| {
            anyhow::anyhow!(
                "failed to read config file {}: {e}",
                config_path.display()
            )
        })?;

        let file = ConfigFile::parse(&raw).map_err(|e| {
            anyhow::anyhow!(
                "failed to parse config file {}: {e:#}",
                config_path.display()
            )
        })?;

        tracing::debug!(
            path = %config_path.display(),
            tables = file.tables.len(),
            "loaded config"
        );

        Ok(Self { config_path, file })
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Settings for `table`, or an error naming the config file.
    pub fn table(&self, table: &str) -> anyhow::Result<&TableConfig> {
        self.file.tables.get(table).ok_or_else(|| {
            anyhow::anyhow!(
                "table {table} is not configured in {}",
                self.config_path.display()
            )
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,

    #[serde(default)]
    pub defaults: Defaults,

    #[serde(default)]
    pub tables: BTreeMap<String, TableConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Defaults {
    /// Page size cap applied when a specification sets none.
    pub max_limit: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TableConfig {
    /// Allow-list for filter and sort names.
    pub columns: Vec<String>,
    /// Allow-list for filter sources. `""` allows unqualified fields.
    pub sources: Option<Vec<String>>,
    /// Columns of the `SELECT` fragment.
    #[serde(default)]
    pub select: Vec<String>,
}

impl ConfigFile {
    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        let file: ConfigFile = toml::from_str(raw)?;
        file.validate()?;
        Ok(file)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.version.trim() != "1" {
            anyhow::bail!("unsupported config version: {}", self.version);
        }
        if self.defaults.max_limit == Some(0) {
            anyhow::bail!("defaults.max_limit must be greater than 0");
        }

        for (name, table) in &self.tables {
            if name.trim().is_empty() {
                anyhow::bail!("table names must not be empty");
            }
            if table.columns.is_empty() {
                anyhow::bail!("tables.{name}.columns must not be empty");
            }
            if table.select.iter().any(|c| c.trim().is_empty()) {
                anyhow::bail!("tables.{name}.select must not contain empty columns");
            }
        }

        Ok(())
    }
}
