//! Configuration file support
//!
//! A config file carries the table and ignore lists a project always uses,
//! so the command line only needs the two files:
//!
//! ```json
//! { "tables": ["Events", "Run"], "ignore": ["RunHeader"], "format": "pretty" }
//! ```

use crate::diff::CompareOptions;
use crate::error::{ColdiffError, Result};
use crate::output::OutputFormat;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DiffConfig {
    #[serde(default)]
    pub tables: Vec<String>,
    #[serde(default)]
    pub ignore: Vec<String>,
    #[serde(default)]
    pub format: Option<String>,
}

impl DiffConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            ColdiffError::invalid_input(format!(
                "Cannot read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let config: Self = serde_json::from_str(&content).map_err(|e| {
            ColdiffError::invalid_input(format!(
                "Invalid config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        log::debug!("Loaded config from '{}'", path.display());
        Ok(config)
    }

    /// Combine with command-line values into comparison options.
    ///
    /// Command-line tables and ignore substrings are appended after the
    /// configured ones (duplicates dropped); a command-line format wins.
    pub fn merge(
        self,
        tables: &[String],
        ignore: &[String],
        format: Option<&str>,
    ) -> Result<CompareOptions> {
        let tables = merge_unique(self.tables, tables);
        if tables.is_empty() {
            return Err(ColdiffError::invalid_input(
                "Need to specify at least one table to compare (-t/--tree)",
            ));
        }

        let format = match format.or(self.format.as_deref()) {
            Some(f) => OutputFormat::parse(f).map_err(ColdiffError::invalid_input)?,
            None => OutputFormat::Pretty,
        };

        Ok(CompareOptions {
            tables,
            ignore: merge_unique(self.ignore, ignore),
            format,
            show_progress: false,
        })
    }
}

fn merge_unique(mut base: Vec<String>, extra: &[String]) -> Vec<String> {
    for item in extra {
        if !base.contains(item) {
            base.push(item.clone());
        }
    }
    base
}
