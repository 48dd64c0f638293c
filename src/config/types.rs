use serde::Deserialize;

use crate::linear::client::DEFAULT_ENDPOINT;
use crate::output::OutputFormat;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub defaults: Defaults,
    pub api: ApiConfig,
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

/// Values used when the matching command-line flag is absent.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Defaults {
    /// Creation-time window for `issue list` / `issue search`.
    pub issue_newer_than: String,
    /// Creation-time window for `project list`.
    pub project_newer_than: String,
    pub limit: u32,
    pub sort: String,
    pub format: OutputFormat,
    /// `strftime` pattern or `"relative"`; empty means `YYYY-MM-DD`.
    pub date_format: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            issue_newer_than: "6_months_ago".to_owned(),
            project_newer_than: "6_months_ago".to_owned(),
            limit: 50,
            sort: "linear".to_owned(),
            format: OutputFormat::Table,
            date_format: String::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// API
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub endpoint: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_owned(),
        }
    }
}
