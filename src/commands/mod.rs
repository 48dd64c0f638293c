pub mod auth;
pub mod comment;
pub mod issue;
pub mod project;
pub mod team;
pub mod user;

use anyhow::Result;

use crate::config::types::AppConfig;
use crate::filter::{ResourceDefaultPolicy, SortOrder};
use crate::linear::auth::resolve_api_key;
use crate::linear::client::LinearClient;
use crate::output::Renderer;
use crate::time_expr::DefaultWindow;

/// Per-invocation state shared by every command.
pub struct Session {
    pub config: AppConfig,
    pub renderer: Renderer,
}

impl Session {
    pub fn new(config: AppConfig, renderer: Renderer) -> Self {
        Self { config, renderer }
    }

    /// Build an authenticated client against the configured endpoint.
    pub fn client(&self) -> Result<LinearClient> {
        let api_key = resolve_api_key()?;
        let client = LinearClient::new(&self.config.api.endpoint, api_key)?;
        tracing::debug!("linear: endpoint {}", client.endpoint());
        Ok(client)
    }

    pub fn limit(&self, flag: Option<u32>) -> u32 {
        flag.unwrap_or(self.config.defaults.limit)
    }

    pub fn sort(&self, flag: Option<&str>) -> Result<SortOrder> {
        let token = flag.unwrap_or(self.config.defaults.sort.as_str());
        Ok(token.parse::<SortOrder>()?)
    }

    /// Issue policy, with the configured window when `newer_than` is blank.
    pub fn issue_policy(&self, newer_than: Option<&str>) -> Result<ResourceDefaultPolicy> {
        configured_policy(
            ResourceDefaultPolicy::for_issues(),
            &self.config.defaults.issue_newer_than,
            newer_than,
        )
    }

    /// Project policy, with the configured window when `newer_than` is blank.
    pub fn project_policy(&self, newer_than: Option<&str>) -> Result<ResourceDefaultPolicy> {
        configured_policy(
            ResourceDefaultPolicy::for_projects(),
            &self.config.defaults.project_newer_than,
            newer_than,
        )
    }
}

/// A non-blank `newer_than` never resolves to the default window, so the
/// configured value is parsed only for a blank one.
fn configured_policy(
    policy: ResourceDefaultPolicy,
    configured: &str,
    newer_than: Option<&str>,
) -> Result<ResourceDefaultPolicy> {
    if newer_than.is_some_and(|flag| !flag.trim().is_empty()) {
        return Ok(policy);
    }
    let window: DefaultWindow = configured.parse()?;
    Ok(policy.with_default_window(window))
}

/// Show the authenticated user.
pub async fn whoami(session: &Session) -> Result<String> {
    let client = session.client()?;
    let viewer = crate::linear::graphql::fetch_viewer(&client).await?;
    session.renderer.user(&viewer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FilterError;
    use crate::output::OutputFormat;

    fn session(config: AppConfig) -> Session {
        Session::new(config, Renderer::new(OutputFormat::Table, ""))
    }

    #[test]
    fn flags_override_config_defaults() {
        let mut config = AppConfig::default();
        config.defaults.limit = 20;
        config.defaults.sort = "updated".to_owned();
        let s = session(config);
        assert_eq!(s.limit(None), 20);
        assert_eq!(s.limit(Some(5)), 5);
        assert_eq!(s.sort(None).unwrap(), SortOrder::Updated);
        assert_eq!(s.sort(Some("created")).unwrap(), SortOrder::Created);
    }

    #[test]
    fn configured_window_replaces_policy_default() {
        let mut config = AppConfig::default();
        config.defaults.issue_newer_than = "all_time".to_owned();
        let policy = session(config).issue_policy(None).unwrap();
        assert_eq!(policy.default_window, DefaultWindow::Unbounded);
    }

    #[test]
    fn invalid_configured_window_is_a_core_error() {
        let mut config = AppConfig::default();
        config.defaults.project_newer_than = "yesterday".to_owned();
        let err = session(config).project_policy(Some("  ")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<FilterError>(),
            Some(FilterError::InvalidTimeExpression { .. })
        ));
    }

    #[test]
    fn explicit_window_skips_configured_window() {
        let mut config = AppConfig::default();
        config.defaults.issue_newer_than = "yesterday".to_owned();
        let s = session(config);
        assert!(s.issue_policy(Some("all_time")).is_ok());
        assert!(s.issue_policy(None).is_err());
    }

    #[test]
    fn invalid_configured_sort_is_a_core_error() {
        let mut config = AppConfig::default();
        config.defaults.sort = "priority".to_owned();
        let err = session(config).sort(None).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<FilterError>(),
            Some(FilterError::InvalidSortOption { .. })
        ));
    }
}
