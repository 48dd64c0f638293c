use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::common::{Label, Team, User, WorkflowState};

// ---------------------------------------------------------------------------
// Issue domain types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    pub id: String,
    /// Team-scoped key such as `ENG-123`.
    pub identifier: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub priority: i32,
    pub estimate: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub due_date: Option<String>,
    pub url: String,
    pub state: Option<WorkflowState>,
    pub assignee: Option<User>,
    pub team: Option<Team>,
    #[serde(default)]
    pub labels: Vec<Label>,
}

/// Minimal reference to another issue (parent, sub-issue).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueRef {
    pub identifier: String,
    pub title: String,
    pub state: Option<WorkflowState>,
    pub assignee: Option<User>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub author: Option<User>,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// Everything `issue get` shows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueDetail {
    #[serde(flatten)]
    pub issue: Issue,
    pub number: u64,
    #[serde(default)]
    pub branch_name: String,
    pub creator: Option<User>,
    pub project_name: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
    pub parent: Option<IssueRef>,
    #[serde(default)]
    pub children: Vec<IssueRef>,
    #[serde(default)]
    pub comments: Vec<Comment>,
}
