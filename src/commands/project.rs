use anyhow::Result;
use clap::{Args, Subcommand};

use crate::commands::Session;
use crate::filter::{RawFilterInputs, compose};
use crate::linear::graphql;

#[derive(Debug, Subcommand)]
pub enum ProjectCommand {
    /// List projects (active, last six months, by default).
    #[command(visible_alias = "ls")]
    List(ProjectListArgs),
    /// Show one project with its members and latest issues.
    Get {
        /// Project UUID.
        id: String,
    },
}

#[derive(Debug, Clone, Args)]
pub struct ProjectListArgs {
    /// Filter by project state (`planned`, `started`, `paused`...).
    #[arg(short, long)]
    pub state: Option<String>,

    /// Filter by team key.
    #[arg(short, long)]
    pub team: Option<String>,

    /// Maximum number of projects to fetch.
    #[arg(short, long)]
    pub limit: Option<u32>,

    /// Include completed and canceled projects.
    #[arg(short = 'c', long)]
    pub include_completed: bool,

    /// Sort order: linear, created, updated.
    #[arg(short = 'o', long)]
    pub sort: Option<String>,

    /// Creation window, e.g. `1_year_ago`, `2024-01-01`, `all_time`.
    #[arg(short = 'n', long)]
    pub newer_than: Option<String>,
}

impl ProjectListArgs {
    fn raw_inputs(&self) -> RawFilterInputs {
        RawFilterInputs {
            state: self.state.clone(),
            team: self.team.clone(),
            newer_than: self.newer_than.clone().unwrap_or_default(),
            include_completed: self.include_completed,
            ..RawFilterInputs::default()
        }
    }
}

pub async fn run(session: &Session, command: &ProjectCommand) -> Result<String> {
    match command {
        ProjectCommand::List(args) => list(session, args).await,
        ProjectCommand::Get { id } => get(session, id).await,
    }
}

async fn list(session: &Session, args: &ProjectListArgs) -> Result<String> {
    let policy = session.project_policy(args.newer_than.as_deref())?;
    let criteria = compose(&args.raw_inputs(), &policy)?;
    let sort = session.sort(args.sort.as_deref())?;
    let limit = session.limit(args.limit);
    tracing::debug!("project list: {criteria:?} sort={sort:?} limit={limit}");

    let client = session.client()?;
    let listing = graphql::list_projects(&client, &criteria, sort, limit).await?;
    session.renderer.projects(&listing)
}

async fn get(session: &Session, id: &str) -> Result<String> {
    let client = session.client()?;
    let detail = graphql::fetch_project_detail(&client, id).await?;
    session.renderer.project_detail(&detail)
}
