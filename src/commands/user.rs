use anyhow::Result;
use clap::{Args, Subcommand};

use crate::commands::Session;
use crate::linear::graphql;
use crate::output::CollectionText;

#[derive(Debug, Subcommand)]
pub enum UserCommand {
    /// List workspace users.
    #[command(visible_alias = "ls")]
    List(UserListArgs),
    /// Show one user by email address.
    Get {
        email: String,
    },
}

#[derive(Debug, Clone, Args)]
pub struct UserListArgs {
    /// Maximum number of users to fetch.
    #[arg(short, long)]
    pub limit: Option<u32>,

    /// Only active users.
    #[arg(short, long)]
    pub active: bool,

    /// Sort order: linear, created, updated.
    #[arg(short = 'o', long)]
    pub sort: Option<String>,
}

pub async fn run(session: &Session, command: &UserCommand) -> Result<String> {
    match command {
        UserCommand::List(args) => list(session, args).await,
        UserCommand::Get { email } => get(session, email).await,
    }
}

async fn list(session: &Session, args: &UserListArgs) -> Result<String> {
    let sort = session.sort(args.sort.as_deref())?;
    let limit = session.limit(args.limit);
    tracing::debug!(
        "user list: active={} sort={sort:?} limit={limit}",
        args.active
    );

    let client = session.client()?;
    let listing = graphql::list_users(&client, args.active, sort, limit).await?;
    session.renderer.members(
        &listing,
        &CollectionText {
            empty: "No users found",
            summary: "users",
            heading: "# Users",
        },
    )
}

async fn get(session: &Session, email: &str) -> Result<String> {
    let client = session.client()?;
    let user = graphql::fetch_user_by_email(&client, email).await?;
    session.renderer.member(&user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Harness {
        #[command(subcommand)]
        command: UserCommand,
    }

    #[test]
    fn list_short_flags() {
        let cli = Harness::try_parse_from(["user", "list", "-a", "-l", "3"]).unwrap();
        let UserCommand::List(args) = cli.command else {
            panic!("expected list");
        };
        assert!(args.active);
        assert_eq!(args.limit, Some(3));
    }
}
