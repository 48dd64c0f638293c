use anyhow::Result;
use clap::{Args, Subcommand};

use crate::commands::Session;
use crate::filter::{PRIORITY_UNSET, RawFilterInputs, compose};
use crate::linear::graphql;
use crate::output::CollectionText;

#[derive(Debug, Subcommand)]
pub enum IssueCommand {
    /// List issues (active, last six months, by default).
    #[command(visible_alias = "ls")]
    List(IssueFilterArgs),
    /// Full-text search over issues.
    Search(SearchArgs),
    /// Show one issue with its sub-issues and recent comments.
    Get {
        /// Issue identifier (`ENG-123`) or UUID.
        id: String,
    },
}

/// Filter flags shared by `issue list` and `issue search`.
#[derive(Debug, Clone, Args)]
pub struct IssueFilterArgs {
    /// Filter by assignee (email, `me`, or `unassigned`).
    #[arg(short, long)]
    pub assignee: Option<String>,

    /// Filter by state name (disables the completed/canceled exclusion).
    #[arg(short, long)]
    pub state: Option<String>,

    /// Filter by team key.
    #[arg(short, long)]
    pub team: Option<String>,

    /// Filter by priority (0 none, 1 urgent, 2 high, 3 normal, 4 low).
    #[arg(short = 'r', long, default_value_t = PRIORITY_UNSET, allow_negative_numbers = true)]
    pub priority: i32,

    /// Maximum number of issues to fetch.
    #[arg(short, long)]
    pub limit: Option<u32>,

    /// Include completed and canceled issues.
    #[arg(short = 'c', long)]
    pub include_completed: bool,

    /// Sort order: linear, created, updated.
    #[arg(short = 'o', long)]
    pub sort: Option<String>,

    /// Creation window, e.g. `3_weeks_ago`, `2024-01-01`, `all_time`.
    #[arg(short = 'n', long)]
    pub newer_than: Option<String>,
}

impl IssueFilterArgs {
    fn raw_inputs(&self, include_archived: bool) -> RawFilterInputs {
        RawFilterInputs {
            assignee: self.assignee.clone(),
            state: self.state.clone(),
            team: self.team.clone(),
            priority: self.priority,
            newer_than: self.newer_than.clone().unwrap_or_default(),
            include_completed: self.include_completed,
            include_archived,
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct SearchArgs {
    /// Text to search for.
    pub query: String,

    #[command(flatten)]
    pub filter: IssueFilterArgs,

    /// Include archived issues.
    #[arg(long)]
    pub include_archived: bool,
}

pub async fn run(session: &Session, command: &IssueCommand) -> Result<String> {
    match command {
        IssueCommand::List(args) => list(session, args).await,
        IssueCommand::Search(args) => search(session, args).await,
        IssueCommand::Get { id } => get(session, id).await,
    }
}

async fn list(session: &Session, args: &IssueFilterArgs) -> Result<String> {
    let policy = session.issue_policy(args.newer_than.as_deref())?;
    let criteria = compose(&args.raw_inputs(false), &policy)?;
    let sort = session.sort(args.sort.as_deref())?;
    let limit = session.limit(args.limit);
    tracing::debug!("issue list: {criteria:?} sort={sort:?} limit={limit}");

    let client = session.client()?;
    let listing = graphql::list_issues(&client, &criteria, sort, limit).await?;
    session.renderer.issues(
        &listing,
        &CollectionText {
            empty: "No issues found",
            summary: "issues",
            heading: "# Issues",
        },
    )
}

async fn search(session: &Session, args: &SearchArgs) -> Result<String> {
    let inputs = args.filter.raw_inputs(args.include_archived);
    let policy = session.issue_policy(args.filter.newer_than.as_deref())?;
    let criteria = compose(&inputs, &policy)?;
    let sort = session.sort(args.filter.sort.as_deref())?;
    let limit = session.limit(args.filter.limit);
    tracing::debug!(
        "issue search {:?}: {criteria:?} sort={sort:?} limit={limit}",
        args.query
    );

    let client = session.client()?;
    let listing = graphql::search_issues(&client, &args.query, &criteria, sort, limit).await?;
    let empty = format!("No issues found matching \"{}\"", args.query);
    let heading = format!("# Search Results for \"{}\"", args.query);
    session.renderer.issues(
        &listing,
        &CollectionText {
            empty: &empty,
            summary: "matching issues",
            heading: &heading,
        },
    )
}

async fn get(session: &Session, id: &str) -> Result<String> {
    let client = session.client()?;
    let detail = graphql::fetch_issue_detail(&client, id).await?;
    session.renderer.issue_detail(&detail)
}
