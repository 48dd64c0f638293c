use std::str::FromStr;

use chrono::{DateTime, Utc};

use crate::error::FilterError;
use crate::time_expr::{self, DefaultWindow, ResolvedBoundary, Span, TimeUnit};

/// Priority value meaning "do not filter on priority".
pub const PRIORITY_UNSET: i32 = -1;

// ---------------------------------------------------------------------------
// Resource default policy
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Issue,
    Project,
}

/// Workflow state categories as named by the Linear API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateCategory {
    Triage,
    Backlog,
    Unstarted,
    Started,
    Planned,
    Paused,
    Completed,
    Canceled,
}

impl StateCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Triage => "triage",
            Self::Backlog => "backlog",
            Self::Unstarted => "unstarted",
            Self::Started => "started",
            Self::Planned => "planned",
            Self::Paused => "paused",
            Self::Completed => "completed",
            Self::Canceled => "canceled",
        }
    }
}

/// Read-only defaults applied when the caller leaves a dimension open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceDefaultPolicy {
    pub resource: ResourceKind,
    /// Creation-time window used when no `--newer-than` is given.
    pub default_window: DefaultWindow,
    /// Categories hidden unless a state is named or completed items are
    /// requested.
    pub excluded_categories: Vec<StateCategory>,
}

const SIX_MONTHS: DefaultWindow = DefaultWindow::Relative(Span::new(6, TimeUnit::Month));

impl ResourceDefaultPolicy {
    pub fn for_issues() -> Self {
        Self {
            resource: ResourceKind::Issue,
            default_window: SIX_MONTHS,
            excluded_categories: vec![StateCategory::Completed, StateCategory::Canceled],
        }
    }

    pub fn for_projects() -> Self {
        Self {
            resource: ResourceKind::Project,
            default_window: SIX_MONTHS,
            excluded_categories: vec![StateCategory::Completed, StateCategory::Canceled],
        }
    }

    pub fn with_default_window(mut self, window: DefaultWindow) -> Self {
        self.default_window = window;
        self
    }
}

// ---------------------------------------------------------------------------
// Inputs and composed criteria
// ---------------------------------------------------------------------------

/// Flag values as collected by the CLI, before any interpretation.
#[derive(Debug, Clone)]
pub struct RawFilterInputs {
    pub assignee: Option<String>,
    pub state: Option<String>,
    pub team: Option<String>,
    /// `PRIORITY_UNSET` disables the priority filter.
    pub priority: i32,
    pub newer_than: String,
    pub include_completed: bool,
    pub include_archived: bool,
}

impl Default for RawFilterInputs {
    fn default() -> Self {
        Self {
            assignee: None,
            state: None,
            team: None,
            priority: PRIORITY_UNSET,
            newer_than: String::new(),
            include_completed: false,
            include_archived: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssigneePredicate {
    /// The authenticated user; the API resolves the identity.
    CurrentViewer,
    /// No assignee set.
    Unassigned,
    /// Exact match on the assignee's email address.
    Email(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatePredicate {
    /// Exact match on the state name.
    Named(String),
    /// Any state whose category is not listed.
    ExcludeCategories(Vec<StateCategory>),
}

/// A resource-agnostic filter, one optional predicate per dimension.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub assignee: Option<AssigneePredicate>,
    pub state: Option<StatePredicate>,
    pub team: Option<String>,
    pub priority: Option<i32>,
    pub created_at_or_after: Option<DateTime<Utc>>,
    pub include_archived: bool,
}

impl FilterCriteria {
    /// True when no predicate is set on any dimension.
    pub fn is_empty(&self) -> bool {
        self.assignee.is_none()
            && self.state.is_none()
            && self.team.is_none()
            && self.priority.is_none()
            && self.created_at_or_after.is_none()
    }
}

// ---------------------------------------------------------------------------
// Composition
// ---------------------------------------------------------------------------

/// Compose `inputs` into a filter, reading the clock once.
pub fn compose(
    inputs: &RawFilterInputs,
    policy: &ResourceDefaultPolicy,
) -> Result<FilterCriteria, FilterError> {
    compose_at(inputs, policy, Utc::now())
}

/// Compose `inputs` into a filter with an explicit `now`.
pub fn compose_at(
    inputs: &RawFilterInputs,
    policy: &ResourceDefaultPolicy,
    now: DateTime<Utc>,
) -> Result<FilterCriteria, FilterError> {
    let created_at_or_after = match time_expr::resolve_at(&inputs.newer_than, now)? {
        ResolvedBoundary::UseDefault => policy.default_window.boundary_at(now)?,
        ResolvedBoundary::Unbounded => None,
        ResolvedBoundary::At(at) => Some(at),
    };

    Ok(FilterCriteria {
        assignee: non_empty(inputs.assignee.as_deref()).map(assignee_predicate),
        state: state_predicate(inputs, policy),
        team: non_empty(inputs.team.as_deref()).map(str::to_owned),
        priority: (inputs.priority != PRIORITY_UNSET).then_some(inputs.priority),
        created_at_or_after,
        include_archived: inputs.include_archived,
    })
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn assignee_predicate(value: &str) -> AssigneePredicate {
    if value.eq_ignore_ascii_case("me") {
        AssigneePredicate::CurrentViewer
    } else if value.eq_ignore_ascii_case("unassigned") {
        AssigneePredicate::Unassigned
    } else {
        AssigneePredicate::Email(value.to_owned())
    }
}

/// An explicit state always wins over the policy's default exclusion.
fn state_predicate(
    inputs: &RawFilterInputs,
    policy: &ResourceDefaultPolicy,
) -> Option<StatePredicate> {
    if let Some(state) = non_empty(inputs.state.as_deref()) {
        return Some(StatePredicate::Named(state.to_owned()));
    }
    if inputs.include_completed || policy.excluded_categories.is_empty() {
        return None;
    }
    Some(StatePredicate::ExcludeCategories(
        policy.excluded_categories.clone(),
    ))
}

// ---------------------------------------------------------------------------
// Sort order
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Keep the API's own ordering.
    #[default]
    Linear,
    Created,
    Updated,
}

impl SortOrder {
    /// The `orderBy` argument for the query, if any.
    pub fn order_by(self) -> Option<&'static str> {
        match self {
            Self::Linear => None,
            Self::Created => Some("createdAt"),
            Self::Updated => Some("updatedAt"),
        }
    }
}

impl FromStr for SortOrder {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" | "linear" => Ok(Self::Linear),
            "created" | "createdAt" => Ok(Self::Created),
            "updated" | "updatedAt" => Ok(Self::Updated),
            other => Err(FilterError::InvalidSortOption {
                option: other.to_owned(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    fn inputs() -> RawFilterInputs {
        RawFilterInputs::default()
    }

    fn default_exclusion() -> Option<StatePredicate> {
        Some(StatePredicate::ExcludeCategories(vec![
            StateCategory::Completed,
            StateCategory::Canceled,
        ]))
    }

    // --- assignee ---

    #[test]
    fn assignee_me_is_current_viewer() {
        let raw = RawFilterInputs {
            assignee: Some("me".to_owned()),
            ..inputs()
        };
        let c = compose_at(&raw, &ResourceDefaultPolicy::for_issues(), now()).unwrap();
        assert_eq!(c.assignee, Some(AssigneePredicate::CurrentViewer));
    }

    #[test]
    fn assignee_unassigned_token() {
        let raw = RawFilterInputs {
            assignee: Some("Unassigned".to_owned()),
            ..inputs()
        };
        let c = compose_at(&raw, &ResourceDefaultPolicy::for_issues(), now()).unwrap();
        assert_eq!(c.assignee, Some(AssigneePredicate::Unassigned));
    }

    #[test]
    fn assignee_email_is_exact_match() {
        let raw = RawFilterInputs {
            assignee: Some("jane@example.com".to_owned()),
            ..inputs()
        };
        let c = compose_at(&raw, &ResourceDefaultPolicy::for_issues(), now()).unwrap();
        assert_eq!(
            c.assignee,
            Some(AssigneePredicate::Email("jane@example.com".to_owned()))
        );
    }

    #[test]
    fn blank_assignee_is_ignored() {
        let raw = RawFilterInputs {
            assignee: Some("  ".to_owned()),
            ..inputs()
        };
        let c = compose_at(&raw, &ResourceDefaultPolicy::for_issues(), now()).unwrap();
        assert_eq!(c.assignee, None);
    }

    // --- state ---

    #[test]
    fn default_excludes_completed_and_canceled() {
        let c = compose_at(&inputs(), &ResourceDefaultPolicy::for_issues(), now()).unwrap();
        assert_eq!(c.state, default_exclusion());
    }

    #[test]
    fn explicit_state_overrides_default_exclusion() {
        let raw = RawFilterInputs {
            state: Some("Done".to_owned()),
            include_completed: false,
            ..inputs()
        };
        let c = compose_at(&raw, &ResourceDefaultPolicy::for_issues(), now()).unwrap();
        assert_eq!(c.state, Some(StatePredicate::Named("Done".to_owned())));
    }

    #[test]
    fn include_completed_drops_state_predicate() {
        let raw = RawFilterInputs {
            include_completed: true,
            ..inputs()
        };
        let c = compose_at(&raw, &ResourceDefaultPolicy::for_projects(), now()).unwrap();
        assert_eq!(c.state, None);
    }

    #[test]
    fn policy_without_exclusions_emits_nothing() {
        let policy = ResourceDefaultPolicy {
            excluded_categories: Vec::new(),
            ..ResourceDefaultPolicy::for_issues()
        };
        let c = compose_at(&inputs(), &policy, now()).unwrap();
        assert_eq!(c.state, None);
    }

    // --- team / priority ---

    #[test]
    fn team_and_priority() {
        let raw = RawFilterInputs {
            team: Some("ENG".to_owned()),
            priority: 2,
            ..inputs()
        };
        let c = compose_at(&raw, &ResourceDefaultPolicy::for_issues(), now()).unwrap();
        assert_eq!(c.team.as_deref(), Some("ENG"));
        assert_eq!(c.priority, Some(2));
    }

    #[test]
    fn priority_zero_is_a_real_filter() {
        let raw = RawFilterInputs {
            priority: 0,
            ..inputs()
        };
        let c = compose_at(&raw, &ResourceDefaultPolicy::for_issues(), now()).unwrap();
        assert_eq!(c.priority, Some(0));
    }

    #[test]
    fn unset_priority_is_not_filtered() {
        let c = compose_at(&inputs(), &ResourceDefaultPolicy::for_issues(), now()).unwrap();
        assert_eq!(c.priority, None);
    }

    // --- creation time ---

    #[test]
    fn empty_time_uses_policy_window() {
        let c = compose_at(&inputs(), &ResourceDefaultPolicy::for_issues(), now()).unwrap();
        assert_eq!(
            c.created_at_or_after,
            Some(Utc.with_ymd_and_hms(2023, 12, 15, 12, 0, 0).unwrap())
        );
    }

    #[test]
    fn configured_window_replaces_six_months() {
        let policy = ResourceDefaultPolicy::for_projects()
            .with_default_window(DefaultWindow::Relative(Span::new(1, TimeUnit::Week)));
        let c = compose_at(&inputs(), &policy, now()).unwrap();
        assert_eq!(c.created_at_or_after, Some(now() - TimeDelta::days(7)));
    }

    #[test]
    fn unbounded_window_policy_emits_no_time_predicate() {
        let policy =
            ResourceDefaultPolicy::for_issues().with_default_window(DefaultWindow::Unbounded);
        let c = compose_at(&inputs(), &policy, now()).unwrap();
        assert_eq!(c.created_at_or_after, None);
    }

    #[test]
    fn me_and_two_weeks() {
        let raw = RawFilterInputs {
            assignee: Some("me".to_owned()),
            newer_than: "2_weeks_ago".to_owned(),
            ..inputs()
        };
        let c = compose_at(&raw, &ResourceDefaultPolicy::for_issues(), now()).unwrap();
        assert_eq!(c.assignee, Some(AssigneePredicate::CurrentViewer));
        assert_eq!(c.created_at_or_after, Some(now() - TimeDelta::days(14)));
        assert_eq!(c.state, default_exclusion());
    }

    #[test]
    fn all_time_drops_creation_predicate() {
        let raw = RawFilterInputs {
            newer_than: "all_time".to_owned(),
            ..inputs()
        };
        let c = compose_at(&raw, &ResourceDefaultPolicy::for_issues(), now()).unwrap();
        assert_eq!(c.created_at_or_after, None);
    }

    #[test]
    fn invalid_time_fails_without_partial_filter() {
        let raw = RawFilterInputs {
            assignee: Some("me".to_owned()),
            newer_than: "not_a_time".to_owned(),
            ..inputs()
        };
        let err = compose_at(&raw, &ResourceDefaultPolicy::for_issues(), now()).unwrap_err();
        assert!(matches!(err, FilterError::InvalidTimeExpression { .. }));
    }

    #[test]
    fn include_archived_is_carried_through() {
        let raw = RawFilterInputs {
            include_archived: true,
            ..inputs()
        };
        let c = compose_at(&raw, &ResourceDefaultPolicy::for_issues(), now()).unwrap();
        assert!(c.include_archived);
    }

    #[test]
    fn is_empty_ignores_include_archived() {
        let c = FilterCriteria {
            include_archived: true,
            ..FilterCriteria::default()
        };
        assert!(c.is_empty());
    }

    // --- sort ---

    #[test]
    fn sort_tokens() {
        assert_eq!("linear".parse::<SortOrder>().unwrap(), SortOrder::Linear);
        assert_eq!("".parse::<SortOrder>().unwrap(), SortOrder::Linear);
        assert_eq!("created".parse::<SortOrder>().unwrap(), SortOrder::Created);
        assert_eq!("updatedAt".parse::<SortOrder>().unwrap(), SortOrder::Updated);
    }

    #[test]
    fn sort_order_by_field() {
        assert_eq!(SortOrder::Linear.order_by(), None);
        assert_eq!(SortOrder::Created.order_by(), Some("createdAt"));
        assert_eq!(SortOrder::Updated.order_by(), Some("updatedAt"));
    }

    #[test]
    fn unknown_sort_token_fails() {
        assert_eq!(
            "priority".parse::<SortOrder>().unwrap_err(),
            FilterError::InvalidSortOption {
                option: "priority".to_owned()
            }
        );
    }
}
