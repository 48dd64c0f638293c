use anyhow::{Context, Result, bail};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::filter::{AssigneePredicate, FilterCriteria, SortOrder, StateCategory, StatePredicate};
use crate::linear::client::LinearClient;
use crate::types::{
    Comment, Issue, IssueDetail, IssueRef, Label, Member, Project, ProjectDetail, Team,
    TeamDetail, User, WorkflowState,
};

/// Linear caps connection pages at 250 nodes; stay well below.
const MAX_PAGE_SIZE: u32 = 100;

// ---------------------------------------------------------------------------
// GraphQL query strings
// ---------------------------------------------------------------------------

const VIEWER_QUERY: &str = r"
query Viewer {
  viewer { id name email displayName }
}
";

const ISSUES_QUERY: &str = r"
query Issues($filter: IssueFilter, $first: Int, $after: String, $orderBy: PaginationOrderBy) {
  issues(filter: $filter, first: $first, after: $after, orderBy: $orderBy) {
    nodes {
      id identifier title description priority estimate
      createdAt updatedAt dueDate url
      state { id name type color }
      assignee { id name email displayName }
      team { id key name }
      labels { nodes { name color } }
    }
    pageInfo { hasNextPage endCursor }
  }
}
";

const SEARCH_ISSUES_QUERY: &str = r"
query IssueSearch($term: String!, $filter: IssueFilter, $first: Int, $after: String,
                  $orderBy: PaginationOrderBy, $includeArchived: Boolean) {
  searchIssues(term: $term, filter: $filter, first: $first, after: $after,
               orderBy: $orderBy, includeArchived: $includeArchived) {
    nodes {
      id identifier title description priority estimate
      createdAt updatedAt dueDate url
      state { id name type color }
      assignee { id name email displayName }
      team { id key name }
      labels { nodes { name color } }
    }
    pageInfo { hasNextPage endCursor }
  }
}
";

const ISSUE_DETAIL_QUERY: &str = r"
query Issue($id: String!) {
  issue(id: $id) {
    id identifier number title description priority estimate
    createdAt updatedAt completedAt dueDate url branchName
    state { id name type color }
    assignee { id name email displayName }
    creator { id name email displayName }
    team { id key name }
    project { name }
    labels { nodes { name color } }
    parent { identifier title state { id name type color } }
    children {
      nodes {
        identifier title
        state { id name type color }
        assignee { id name email displayName }
      }
    }
    comments(first: 5) {
      nodes { body createdAt user { id name email displayName } }
    }
  }
}
";

const PROJECTS_QUERY: &str = r"
query Projects($filter: ProjectFilter, $first: Int, $after: String, $orderBy: PaginationOrderBy) {
  projects(filter: $filter, first: $first, after: $after, orderBy: $orderBy) {
    nodes {
      id name description state progress startDate targetDate url
      createdAt updatedAt
      lead { id name email displayName }
      teams { nodes { id key name } }
    }
    pageInfo { hasNextPage endCursor }
  }
}
";

const PROJECT_DETAIL_QUERY: &str = r"
query Project($id: String!) {
  project(id: $id) {
    id name description state progress health startDate targetDate url
    createdAt updatedAt
    lead { id name email displayName }
    creator { id name email displayName }
    teams { nodes { id key name } }
    members { nodes { id name email displayName active admin } }
    issues(first: 50, orderBy: updatedAt) {
      nodes {
        id identifier title description priority estimate
        createdAt updatedAt dueDate url
        state { id name type color }
        assignee { id name email displayName }
        team { id key name }
        labels { nodes { name color } }
      }
    }
  }
}
";

const TEAMS_QUERY: &str = r"
query Teams($first: Int, $after: String, $orderBy: PaginationOrderBy) {
  teams(first: $first, after: $after, orderBy: $orderBy) {
    nodes { id key name description private issueCount }
    pageInfo { hasNextPage endCursor }
  }
}
";

const TEAM_QUERY: &str = r"
query Team($id: String!) {
  team(id: $id) { id key name description private issueCount }
}
";

const TEAM_MEMBERS_QUERY: &str = r"
query TeamMembers($id: String!, $first: Int, $after: String) {
  team(id: $id) {
    members(first: $first, after: $after) {
      nodes { id name email displayName isMe active admin }
      pageInfo { hasNextPage endCursor }
    }
  }
}
";

const USERS_QUERY: &str = r"
query Users($filter: UserFilter, $first: Int, $after: String, $orderBy: PaginationOrderBy) {
  users(filter: $filter, first: $first, after: $after, orderBy: $orderBy) {
    nodes { id name email displayName isMe active admin }
    pageInfo { hasNextPage endCursor }
  }
}
";

const COMMENTS_QUERY: &str = r"
query IssueComments($id: String!, $first: Int, $after: String, $orderBy: PaginationOrderBy) {
  issue(id: $id) {
    comments(first: $first, after: $after, orderBy: $orderBy) {
      nodes { body createdAt user { id name email displayName } }
      pageInfo { hasNextPage endCursor }
    }
  }
}
";

// ---------------------------------------------------------------------------
// Filter arguments
// ---------------------------------------------------------------------------

fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn category_names(categories: &[StateCategory]) -> Vec<&'static str> {
    categories.iter().map(|c| c.as_str()).collect()
}

/// Build the `IssueFilter` argument, or `None` when nothing is filtered.
pub fn issue_filter(criteria: &FilterCriteria) -> Option<Value> {
    let mut filter = Map::new();

    if let Some(assignee) = &criteria.assignee {
        let predicate = match assignee {
            AssigneePredicate::CurrentViewer => json!({ "isMe": { "eq": true } }),
            AssigneePredicate::Unassigned => json!({ "null": true }),
            AssigneePredicate::Email(email) => json!({ "email": { "eq": email } }),
        };
        filter.insert("assignee".to_owned(), predicate);
    }

    if let Some(state) = &criteria.state {
        let predicate = match state {
            StatePredicate::Named(name) => json!({ "name": { "eq": name } }),
            StatePredicate::ExcludeCategories(categories) => {
                json!({ "type": { "nin": category_names(categories) } })
            }
        };
        filter.insert("state".to_owned(), predicate);
    }

    if let Some(team) = &criteria.team {
        filter.insert("team".to_owned(), json!({ "key": { "eq": team } }));
    }

    if let Some(priority) = criteria.priority {
        filter.insert("priority".to_owned(), json!({ "eq": priority }));
    }

    if let Some(at) = criteria.created_at_or_after {
        filter.insert("createdAt".to_owned(), json!({ "gte": timestamp(at) }));
    }

    (!filter.is_empty()).then_some(Value::Object(filter))
}

/// Build the `ProjectFilter` argument, or `None` when nothing is filtered.
///
/// Projects carry their state as a plain string and have no assignee or
/// priority, so those predicates are not mapped.
pub fn project_filter(criteria: &FilterCriteria) -> Option<Value> {
    let mut filter = Map::new();

    if let Some(state) = &criteria.state {
        let predicate = match state {
            StatePredicate::Named(name) => json!({ "eq": name }),
            StatePredicate::ExcludeCategories(categories) => {
                json!({ "nin": category_names(categories) })
            }
        };
        filter.insert("state".to_owned(), predicate);
    }

    if let Some(team) = &criteria.team {
        filter.insert(
            "accessibleTeams".to_owned(),
            json!({ "some": { "key": { "eq": team } } }),
        );
    }

    if let Some(at) = criteria.created_at_or_after {
        filter.insert("createdAt".to_owned(), json!({ "gte": timestamp(at) }));
    }

    (!filter.is_empty()).then_some(Value::Object(filter))
}

// ---------------------------------------------------------------------------
// Request payload
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct GraphQLPayload<'a, V: Serialize> {
    query: &'static str,
    variables: &'a V,
}

#[derive(Serialize)]
struct ListVariables {
    #[serde(skip_serializing_if = "Option::is_none")]
    filter: Option<Value>,
    first: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    after: Option<String>,
    #[serde(rename = "orderBy", skip_serializing_if = "Option::is_none")]
    order_by: Option<&'static str>,
}

#[derive(Serialize)]
struct SearchVariables {
    term: String,
    #[serde(flatten)]
    list: ListVariables,
    #[serde(rename = "includeArchived")]
    include_archived: bool,
}

/// List arguments for a connection nested under one entity.
#[derive(Serialize)]
struct ScopedListVariables<'a> {
    id: &'a str,
    #[serde(flatten)]
    list: ListVariables,
}

#[derive(Serialize)]
struct IdVariables<'a> {
    id: &'a str,
}

#[derive(Serialize)]
struct NoVariables {}

// ---------------------------------------------------------------------------
// Response types (mirror the GraphQL response shape)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct GraphQLResponse<D> {
    data: Option<D>,
    errors: Option<Vec<GraphQLError>>,
}

#[derive(Debug, Deserialize)]
struct GraphQLError {
    message: String,
    #[serde(default)]
    extensions: Option<GraphQLErrorExtensions>,
}

#[derive(Debug, Deserialize)]
struct GraphQLErrorExtensions {
    code: Option<String>,
}

impl GraphQLError {
    fn is_rate_limited(&self) -> bool {
        self.extensions
            .as_ref()
            .and_then(|e| e.code.as_deref())
            .is_some_and(|code| code == "RATELIMITED")
    }
}

/// Pagination info from GraphQL.
#[derive(Debug, Clone, Deserialize)]
pub struct PageInfo {
    #[serde(rename = "hasNextPage")]
    pub has_next_page: bool,
    #[serde(rename = "endCursor")]
    pub end_cursor: Option<String>,
}

/// A top-level paginated connection.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: DeserializeOwned"))]
struct Page<T> {
    #[serde(default)]
    nodes: Vec<T>,
    #[serde(rename = "pageInfo")]
    page_info: PageInfo,
}

/// A nested connection where only the nodes are selected.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: DeserializeOwned"))]
struct Connection<T> {
    #[serde(default)]
    nodes: Vec<T>,
}

impl<T> Connection<T> {
    fn into_vec<U>(conn: Option<Self>, f: impl FnMut(T) -> U) -> Vec<U> {
        conn.map(|c| c.nodes.into_iter().map(f).collect())
            .unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawUser {
    id: String,
    name: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    display_name: String,
}

impl From<RawUser> for User {
    fn from(u: RawUser) -> Self {
        Self {
            id: u.id,
            name: u.name,
            email: u.email,
            display_name: u.display_name,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawState {
    id: String,
    name: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    color: String,
}

impl From<RawState> for WorkflowState {
    fn from(s: RawState) -> Self {
        Self {
            id: s.id,
            name: s.name,
            kind: s.kind,
            color: s.color,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ViewerData {
    viewer: RawUser,
}

/// Raw issue as returned by list and search queries.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawIssue {
    id: String,
    identifier: String,
    title: String,
    description: Option<String>,
    #[serde(default)]
    priority: i32,
    estimate: Option<f64>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    due_date: Option<String>,
    url: String,
    state: Option<RawState>,
    assignee: Option<RawUser>,
    team: Option<Team>,
    labels: Option<Connection<Label>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawIssueDetail {
    #[serde(flatten)]
    issue: RawIssue,
    #[serde(default)]
    number: u64,
    branch_name: Option<String>,
    completed_at: Option<DateTime<Utc>>,
    creator: Option<RawUser>,
    project: Option<RawProjectName>,
    parent: Option<RawIssueRef>,
    children: Option<Connection<RawIssueRef>>,
    comments: Option<Connection<RawComment>>,
}

#[derive(Debug, Deserialize)]
struct IssueDetailData {
    issue: Option<RawIssueDetail>,
}

#[derive(Debug, Deserialize)]
struct RawProjectName {
    name: String,
}

#[derive(Debug, Deserialize)]
struct RawIssueRef {
    identifier: String,
    title: String,
    state: Option<RawState>,
    assignee: Option<RawUser>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawComment {
    #[serde(default)]
    body: String,
    created_at: DateTime<Utc>,
    user: Option<RawUser>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMember {
    #[serde(flatten)]
    user: RawUser,
    #[serde(default)]
    active: bool,
    #[serde(default)]
    admin: bool,
    #[serde(default)]
    is_me: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTeamDetail {
    #[serde(flatten)]
    team: Team,
    description: Option<String>,
    #[serde(default)]
    private: bool,
    #[serde(default)]
    issue_count: u32,
}

#[derive(Debug, Deserialize)]
struct TeamData {
    team: Option<RawTeamDetail>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawProject {
    id: String,
    name: String,
    description: Option<String>,
    state: String,
    #[serde(default)]
    progress: f64,
    start_date: Option<String>,
    target_date: Option<String>,
    url: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    lead: Option<RawUser>,
    teams: Option<Connection<Team>>,
}

#[derive(Debug, Deserialize)]
struct RawProjectDetail {
    #[serde(flatten)]
    project: RawProject,
    health: Option<String>,
    creator: Option<RawUser>,
    members: Option<Connection<RawMember>>,
    issues: Option<Connection<RawIssue>>,
}

#[derive(Debug, Deserialize)]
struct ProjectDetailData {
    project: Option<RawProjectDetail>,
}

// ---------------------------------------------------------------------------
// Conversion: Raw → Domain
// ---------------------------------------------------------------------------

impl RawIssue {
    fn into_domain(self) -> Issue {
        Issue {
            id: self.id,
            identifier: self.identifier,
            title: self.title,
            description: self.description.unwrap_or_default(),
            priority: self.priority,
            estimate: self.estimate,
            created_at: self.created_at,
            updated_at: self.updated_at,
            due_date: self.due_date,
            url: self.url,
            state: self.state.map(WorkflowState::from),
            assignee: self.assignee.map(User::from),
            team: self.team,
            labels: Connection::into_vec(self.labels, |l| l),
        }
    }
}

impl RawIssueRef {
    fn into_domain(self) -> IssueRef {
        IssueRef {
            identifier: self.identifier,
            title: self.title,
            state: self.state.map(WorkflowState::from),
            assignee: self.assignee.map(User::from),
        }
    }
}

impl RawIssueDetail {
    fn into_domain(self) -> IssueDetail {
        IssueDetail {
            issue: self.issue.into_domain(),
            number: self.number,
            branch_name: self.branch_name.unwrap_or_default(),
            creator: self.creator.map(User::from),
            project_name: self.project.map(|p| p.name),
            completed_at: self.completed_at,
            parent: self.parent.map(RawIssueRef::into_domain),
            children: Connection::into_vec(self.children, RawIssueRef::into_domain),
            comments: Connection::into_vec(self.comments, RawComment::into_domain),
        }
    }
}

impl RawComment {
    fn into_domain(self) -> Comment {
        Comment {
            author: self.user.map(User::from),
            body: self.body,
            created_at: self.created_at,
        }
    }
}

impl RawMember {
    fn into_domain(self) -> Member {
        Member {
            user: self.user.into(),
            active: self.active,
            admin: self.admin,
            is_me: self.is_me,
        }
    }
}

impl RawTeamDetail {
    fn into_domain(self) -> TeamDetail {
        TeamDetail {
            team: self.team,
            description: self.description.unwrap_or_default(),
            private: self.private,
            issue_count: self.issue_count,
        }
    }
}

impl RawProject {
    fn into_domain(self) -> Project {
        Project {
            id: self.id,
            name: self.name,
            description: self.description.unwrap_or_default(),
            state: self.state,
            progress: self.progress,
            start_date: self.start_date,
            target_date: self.target_date,
            url: self.url,
            created_at: self.created_at,
            updated_at: self.updated_at,
            lead: self.lead.map(User::from),
            teams: Connection::into_vec(self.teams, |t| t),
        }
    }
}

impl RawProjectDetail {
    fn into_domain(self) -> ProjectDetail {
        ProjectDetail {
            project: self.project.into_domain(),
            health: self.health,
            creator: self.creator.map(User::from),
            members: Connection::into_vec(self.members, RawMember::into_domain),
            issues: Connection::into_vec(self.issues, RawIssue::into_domain),
        }
    }
}

// ---------------------------------------------------------------------------
// Execution helpers
// ---------------------------------------------------------------------------

/// Run one query and return its `data`, failing on any GraphQL error.
async fn run<V, D>(client: &LinearClient, query: &'static str, variables: &V) -> Result<D>
where
    V: Serialize,
    D: DeserializeOwned,
{
    let payload = GraphQLPayload { query, variables };
    let response: GraphQLResponse<D> = client.graphql(&payload).await?;

    if let Some(errors) = response.errors
        && !errors.is_empty()
    {
        let messages: Vec<_> = errors.iter().map(|e| e.message.as_str()).collect();
        if errors.iter().any(GraphQLError::is_rate_limited) {
            bail!("Linear API rate limit exceeded: {}", messages.join("; "));
        }
        bail!("GraphQL errors: {}", messages.join("; "));
    }

    response
        .data
        .context("GraphQL response missing data field")
}

/// Items gathered across pages, plus whether the API has more.
#[derive(Debug)]
pub struct Listing<T> {
    pub items: Vec<T>,
    pub has_more: bool,
}

/// Walk `path` down from `data` to a connection object. A missing key or a
/// null entity anywhere on the path yields `None`.
fn take_connection(data: Map<String, Value>, path: &[&str]) -> Option<Value> {
    let mut value = Value::Object(data);
    for key in path {
        value = match value {
            Value::Object(mut map) => map.remove(*key).filter(|v| !v.is_null())?,
            _ => return None,
        };
    }
    Some(value)
}

/// Follow cursors on the connection at `path` until `limit` items are
/// collected or the API reports no further page.
async fn collect_pages<T, V>(
    client: &LinearClient,
    query: &'static str,
    path: &[&str],
    limit: u32,
    mut variables: impl FnMut(u32, Option<String>) -> V,
) -> Result<Listing<T>>
where
    T: DeserializeOwned,
    V: Serialize,
{
    let root = path.join(".");
    let page_size = limit.min(MAX_PAGE_SIZE);
    let mut items = Vec::new();
    let mut cursor: Option<String> = None;
    let mut has_more = false;

    loop {
        let remaining = limit.saturating_sub(u32::try_from(items.len()).unwrap_or(u32::MAX));
        if remaining == 0 {
            break;
        }
        let fetch_count = remaining.min(page_size);

        let data: Map<String, Value> =
            run(client, query, &variables(fetch_count, cursor.take())).await?;
        let connection = take_connection(data, path)
            .with_context(|| format!("GraphQL response missing `{root}`"))?;
        let page: Page<T> = serde_json::from_value(connection)
            .with_context(|| format!("decoding `{root}` page"))?;

        tracing::debug!(
            "graphql: {root} page of {} (has_next_page={})",
            page.nodes.len(),
            page.page_info.has_next_page
        );
        items.extend(page.nodes);
        has_more = page.page_info.has_next_page;

        match page.page_info.end_cursor {
            Some(end) if has_more => cursor = Some(end),
            _ => break,
        }
    }

    Ok(Listing { items, has_more })
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Fetch the authenticated user.
pub async fn fetch_viewer(client: &LinearClient) -> Result<User> {
    let data: ViewerData = run(client, VIEWER_QUERY, &NoVariables {})
        .await
        .context("fetching current user")?;
    Ok(data.viewer.into())
}

/// List issues matching `criteria`, up to `limit`.
pub async fn list_issues(
    client: &LinearClient,
    criteria: &FilterCriteria,
    sort: SortOrder,
    limit: u32,
) -> Result<Listing<Issue>> {
    let filter = issue_filter(criteria);
    let raw: Listing<RawIssue> = collect_pages(client, ISSUES_QUERY, &["issues"], limit, |first, after| {
        ListVariables {
            filter: filter.clone(),
            first,
            after,
            order_by: sort.order_by(),
        }
    })
    .await
    .context("listing issues")?;

    Ok(Listing {
        items: raw.items.into_iter().map(RawIssue::into_domain).collect(),
        has_more: raw.has_more,
    })
}

/// Full-text search over issues, narrowed by `criteria`.
pub async fn search_issues(
    client: &LinearClient,
    term: &str,
    criteria: &FilterCriteria,
    sort: SortOrder,
    limit: u32,
) -> Result<Listing<Issue>> {
    let filter = issue_filter(criteria);
    let raw: Listing<RawIssue> = collect_pages(
        client,
        SEARCH_ISSUES_QUERY,
        &["searchIssues"],
        limit,
        |first, after| SearchVariables {
            term: term.to_owned(),
            list: ListVariables {
                filter: filter.clone(),
                first,
                after,
                order_by: sort.order_by(),
            },
            include_archived: criteria.include_archived,
        },
    )
    .await
    .with_context(|| format!("searching issues for {term:?}"))?;

    Ok(Listing {
        items: raw.items.into_iter().map(RawIssue::into_domain).collect(),
        has_more: raw.has_more,
    })
}

/// Fetch one issue by UUID or identifier (`ENG-123`).
pub async fn fetch_issue_detail(client: &LinearClient, id: &str) -> Result<IssueDetail> {
    let data: IssueDetailData = run(client, ISSUE_DETAIL_QUERY, &IdVariables { id })
        .await
        .with_context(|| format!("fetching issue {id}"))?;
    let issue = data.issue.with_context(|| format!("issue {id} not found"))?;
    Ok(issue.into_domain())
}

/// List projects matching `criteria`, up to `limit`.
pub async fn list_projects(
    client: &LinearClient,
    criteria: &FilterCriteria,
    sort: SortOrder,
    limit: u32,
) -> Result<Listing<Project>> {
    let filter = project_filter(criteria);
    let raw: Listing<RawProject> =
        collect_pages(client, PROJECTS_QUERY, &["projects"], limit, |first, after| {
            ListVariables {
                filter: filter.clone(),
                first,
                after,
                order_by: sort.order_by(),
            }
        })
        .await
        .context("listing projects")?;

    Ok(Listing {
        items: raw.items.into_iter().map(RawProject::into_domain).collect(),
        has_more: raw.has_more,
    })
}

/// Fetch one project by ID, with its members and latest issues.
pub async fn fetch_project_detail(client: &LinearClient, id: &str) -> Result<ProjectDetail> {
    let data: ProjectDetailData = run(client, PROJECT_DETAIL_QUERY, &IdVariables { id })
        .await
        .with_context(|| format!("fetching project {id}"))?;
    let project = data
        .project
        .with_context(|| format!("project {id} not found"))?;
    Ok(project.into_domain())
}

/// List the workspace's teams, up to `limit`.
pub async fn list_teams(
    client: &LinearClient,
    sort: SortOrder,
    limit: u32,
) -> Result<Listing<TeamDetail>> {
    let raw: Listing<RawTeamDetail> =
        collect_pages(client, TEAMS_QUERY, &["teams"], limit, |first, after| {
            ListVariables {
                filter: None,
                first,
                after,
                order_by: sort.order_by(),
            }
        })
        .await
        .context("listing teams")?;

    Ok(Listing {
        items: raw.items.into_iter().map(RawTeamDetail::into_domain).collect(),
        has_more: raw.has_more,
    })
}

/// Fetch one team by key (`ENG`) or UUID.
pub async fn fetch_team(client: &LinearClient, key: &str) -> Result<TeamDetail> {
    let data: TeamData = run(client, TEAM_QUERY, &IdVariables { id: key })
        .await
        .with_context(|| format!("fetching team {key}"))?;
    let team = data.team.with_context(|| format!("team {key} not found"))?;
    Ok(team.into_domain())
}

/// List the members of one team, up to `limit`.
pub async fn list_team_members(
    client: &LinearClient,
    key: &str,
    limit: u32,
) -> Result<Listing<Member>> {
    let raw: Listing<RawMember> = collect_pages(
        client,
        TEAM_MEMBERS_QUERY,
        &["team", "members"],
        limit,
        |first, after| ScopedListVariables {
            id: key,
            list: ListVariables {
                filter: None,
                first,
                after,
                order_by: None,
            },
        },
    )
    .await
    .with_context(|| format!("listing members of team {key}"))?;

    Ok(Listing {
        items: raw.items.into_iter().map(RawMember::into_domain).collect(),
        has_more: raw.has_more,
    })
}

/// List workspace users, up to `limit`. `active_only` filters server-side.
pub async fn list_users(
    client: &LinearClient,
    active_only: bool,
    sort: SortOrder,
    limit: u32,
) -> Result<Listing<Member>> {
    let filter = active_only.then(|| json!({ "active": { "eq": true } }));
    let raw: Listing<RawMember> =
        collect_pages(client, USERS_QUERY, &["users"], limit, |first, after| {
            ListVariables {
                filter: filter.clone(),
                first,
                after,
                order_by: sort.order_by(),
            }
        })
        .await
        .context("listing users")?;

    Ok(Listing {
        items: raw.items.into_iter().map(RawMember::into_domain).collect(),
        has_more: raw.has_more,
    })
}

/// Look a user up by exact email address.
pub async fn fetch_user_by_email(client: &LinearClient, email: &str) -> Result<Member> {
    let filter = json!({ "email": { "eq": email } });
    let raw: Listing<RawMember> =
        collect_pages(client, USERS_QUERY, &["users"], 1, |first, after| {
            ListVariables {
                filter: Some(filter.clone()),
                first,
                after,
                order_by: None,
            }
        })
        .await
        .with_context(|| format!("fetching user {email}"))?;

    let user = raw
        .items
        .into_iter()
        .next()
        .with_context(|| format!("user {email} not found"))?;
    Ok(user.into_domain())
}

/// List the comments on one issue, up to `limit`.
pub async fn list_comments(
    client: &LinearClient,
    issue_id: &str,
    sort: SortOrder,
    limit: u32,
) -> Result<Listing<Comment>> {
    let raw: Listing<RawComment> = collect_pages(
        client,
        COMMENTS_QUERY,
        &["issue", "comments"],
        limit,
        |first, after| ScopedListVariables {
            id: issue_id,
            list: ListVariables {
                filter: None,
                first,
                after,
                order_by: sort.order_by(),
            },
        },
    )
    .await
    .with_context(|| format!("listing comments on {issue_id}"))?;

    Ok(Listing {
        items: raw.items.into_iter().map(RawComment::into_domain).collect(),
        has_more: raw.has_more,
    })
}
