use std::io::{BufRead, Write};
use std::path::Path;

use anyhow::{Context, Result, bail};
use clap::Subcommand;

use crate::commands::Session;
use crate::linear::auth::{auth_file_path, find_api_key, remove_api_key, save_api_key};
use crate::linear::client::LinearClient;
use crate::linear::graphql::fetch_viewer;

#[derive(Debug, Subcommand)]
pub enum AuthCommand {
    /// Store a personal API key after checking it against the API.
    Login,
    /// Show who the current credentials belong to.
    Status,
    /// Delete stored credentials.
    Logout,
}

pub async fn run(session: &Session, command: &AuthCommand) -> Result<String> {
    match command {
        AuthCommand::Login => {
            eprint!("Enter your Linear API key: ");
            std::io::stderr().flush()?;
            let stdin = std::io::stdin();
            login(session, &mut stdin.lock(), &auth_file_path()?).await
        }
        AuthCommand::Status => status(session, find_api_key()?).await,
        AuthCommand::Logout => logout(&auth_file_path()?),
    }
}

/// Read a key from `input`, validate it and store it at `path`.
pub async fn login(session: &Session, input: &mut impl BufRead, path: &Path) -> Result<String> {
    let mut line = String::new();
    input.read_line(&mut line).context("reading API key")?;
    let api_key = line.trim();
    if api_key.is_empty() {
        bail!("API key cannot be empty");
    }

    let client = LinearClient::new(&session.config.api.endpoint, api_key)?;
    let viewer = fetch_viewer(&client).await.context("API key was rejected")?;
    save_api_key(path, api_key)?;
    tracing::debug!("auth: stored credentials at {}", path.display());

    Ok(format!("Logged in as {} <{}>\n", viewer.name, viewer.email))
}

/// Report who `api_key` belongs to, or that no key is configured.
pub async fn status(session: &Session, api_key: Option<String>) -> Result<String> {
    let Some(api_key) = api_key else {
        return Ok("Not logged in. Run `linctl auth login`.\n".to_owned());
    };
    let client = LinearClient::new(&session.config.api.endpoint, api_key)?;
    let viewer = fetch_viewer(&client).await?;
    Ok(format!("Logged in as {} <{}>\n", viewer.name, viewer.email))
}

/// Remove stored credentials; a missing file is not an error.
pub fn logout(path: &Path) -> Result<String> {
    if remove_api_key(path)? {
        Ok("Logged out\n".to_owned())
    } else {
        Ok("No stored credentials\n".to_owned())
    }
}
