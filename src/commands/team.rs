use anyhow::Result;
use clap::{Args, Subcommand};

use crate::commands::Session;
use crate::linear::graphql;
use crate::output::CollectionText;

#[derive(Debug, Subcommand)]
pub enum TeamCommand {
    /// List teams.
    #[command(visible_alias = "ls")]
    List(TeamListArgs),
    /// Show one team.
    Get {
        /// Team key (`ENG`) or UUID.
        key: String,
    },
    /// List the members of a team.
    Members {
        /// Team key (`ENG`) or UUID.
        key: String,

        /// Maximum number of members to fetch.
        #[arg(short, long)]
        limit: Option<u32>,
    },
}

#[derive(Debug, Clone, Args)]
pub struct TeamListArgs {
    /// Maximum number of teams to fetch.
    #[arg(short, long)]
    pub limit: Option<u32>,

    /// Sort order: linear, created, updated.
    #[arg(short = 'o', long)]
    pub sort: Option<String>,
}

pub async fn run(session: &Session, command: &TeamCommand) -> Result<String> {
    match command {
        TeamCommand::List(args) => list(session, args).await,
        TeamCommand::Get { key } => get(session, key).await,
        TeamCommand::Members { key, limit } => members(session, key, *limit).await,
    }
}

async fn list(session: &Session, args: &TeamListArgs) -> Result<String> {
    let sort = session.sort(args.sort.as_deref())?;
    let limit = session.limit(args.limit);
    tracing::debug!("team list: sort={sort:?} limit={limit}");

    let client = session.client()?;
    let listing = graphql::list_teams(&client, sort, limit).await?;
    session.renderer.teams(&listing)
}

async fn get(session: &Session, key: &str) -> Result<String> {
    let client = session.client()?;
    let team = graphql::fetch_team(&client, key).await?;
    session.renderer.team(&team)
}

async fn members(session: &Session, key: &str, limit: Option<u32>) -> Result<String> {
    let limit = session.limit(limit);
    let client = session.client()?;
    let listing = graphql::list_team_members(&client, key, limit).await?;
    let empty = format!("No members in team {key}");
    let summary = format!("members in team {key}");
    let heading = format!("# Members of {key}");
    session.renderer.members(
        &listing,
        &CollectionText {
            empty: &empty,
            summary: &summary,
            heading: &heading,
        },
    )
}
