use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::common::{Team, User};
use super::issue::Issue;
use super::team::Member;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Project state: `planned`, `started`, `paused`, `completed`, `canceled`...
    pub state: String,
    /// Completion ratio in `0.0..=1.0`.
    #[serde(default)]
    pub progress: f64,
    pub start_date: Option<String>,
    pub target_date: Option<String>,
    pub url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub lead: Option<User>,
    #[serde(default)]
    pub teams: Vec<Team>,
}

impl Project {
    /// Comma-separated team keys.
    pub fn team_keys(&self) -> String {
        self.teams
            .iter()
            .map(|t| t.key.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Everything `project get` shows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectDetail {
    #[serde(flatten)]
    pub project: Project,
    /// `onTrack`, `atRisk` or `offTrack`, when an update has set it.
    pub health: Option<String>,
    pub creator: Option<User>,
    #[serde(default)]
    pub members: Vec<Member>,
    /// Most recently updated issues first.
    #[serde(default)]
    pub issues: Vec<Issue>,
}
