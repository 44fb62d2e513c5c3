//! TOML export profiles.
//!
//! ```toml
//! format = "csv"
//! columns = ["user:id", "context:timestamp", "prompt:response"]
//! campaign_urn = "urn:campaign:study:mood"
//! suppress_metadata = true
//! ```

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use survey_model::ColumnId;
use survey_report::{OutputFormat, RenderOptions, parse_columns};

/// Saved export settings. Absent keys fall back to defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportProfile {
    pub format: Option<OutputFormat>,
    pub columns: Option<Vec<String>>,
    pub campaign_urn: Option<String>,
    pub suppress_metadata: Option<bool>,
    pub pretty: Option<bool>,
    pub return_id: Option<bool>,
}

impl ExportProfile {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("read export profile {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("parse export profile {}", path.display()))
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }
}

/// Command-line values that override a profile when given.
#[derive(Debug, Clone, Default)]
pub struct ExportOverrides {
    pub format: Option<OutputFormat>,
    pub columns: Vec<String>,
    pub suppress_metadata: bool,
    pub pretty: bool,
    pub return_id: bool,
}

/// Fully resolved export settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSettings {
    pub format: OutputFormat,
    pub columns: Vec<ColumnId>,
    pub options: RenderOptions,
}

impl ExportSettings {
    /// Merge flags over the profile over defaults.
    ///
    /// Boolean flags can only switch an option on.
    pub fn resolve(profile: &ExportProfile, overrides: &ExportOverrides) -> Result<Self> {
        let format = overrides
            .format
            .or(profile.format)
            .unwrap_or_default();

        let tokens = if overrides.columns.is_empty() {
            profile.columns.as_deref().unwrap_or_default()
        } else {
            overrides.columns.as_slice()
        };
        let columns = if tokens.is_empty() {
            vec![ColumnId::AllColumns]
        } else {
            parse_columns(tokens).context("invalid column request")?
        };

        let options = RenderOptions::new(profile.campaign_urn.clone().unwrap_or_default())
            .with_suppress_metadata(
                overrides.suppress_metadata || profile.suppress_metadata.unwrap_or(false),
            )
            .with_pretty(overrides.pretty || profile.pretty.unwrap_or(false))
            .with_return_id(overrides.return_id || profile.return_id.unwrap_or(false));

        Ok(Self {
            format,
            columns,
            options,
        })
    }
}
