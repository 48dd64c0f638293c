use anyhow::Result;
use clap::{Args, Subcommand};

use crate::commands::Session;
use crate::linear::graphql;

#[derive(Debug, Subcommand)]
pub enum CommentCommand {
    /// List the comments on an issue.
    #[command(visible_alias = "ls")]
    List(CommentListArgs),
}

#[derive(Debug, Clone, Args)]
pub struct CommentListArgs {
    /// Issue identifier (`ENG-123`) or UUID.
    pub issue: String,

    /// Maximum number of comments to fetch.
    #[arg(short, long)]
    pub limit: Option<u32>,

    /// Sort order: linear, created, updated.
    #[arg(short = 'o', long)]
    pub sort: Option<String>,
}

pub async fn run(session: &Session, command: &CommentCommand) -> Result<String> {
    match command {
        CommentCommand::List(args) => list(session, args).await,
    }
}

async fn list(session: &Session, args: &CommentListArgs) -> Result<String> {
    let sort = session.sort(args.sort.as_deref())?;
    let limit = session.limit(args.limit);
    tracing::debug!("comment list {}: sort={sort:?} limit={limit}", args.issue);

    let client = session.client()?;
    let listing = graphql::list_comments(&client, &args.issue, sort, limit).await?;
    session.renderer.comments(&listing, &args.issue)
}
