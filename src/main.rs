use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use linctl::commands::auth::AuthCommand;
use linctl::commands::comment::CommentCommand;
use linctl::commands::issue::IssueCommand;
use linctl::commands::project::ProjectCommand;
use linctl::commands::team::TeamCommand;
use linctl::commands::user::UserCommand;
use linctl::commands::{self, Session};
use linctl::config::loader;
use linctl::linear::rate_limit::{format_rate_limit_message, is_rate_limited};
use linctl::output::{OutputFormat, Renderer};

#[derive(Parser)]
#[command(name = "linctl", version, about = "Command-line client for Linear")]
struct Cli {
    /// Path to config file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging to linctl-debug.log.
    #[arg(long, global = true)]
    debug: bool,

    /// Print JSON.
    #[arg(long, global = true)]
    json: bool,

    /// Print Markdown instead of a table.
    #[arg(long, global = true)]
    plaintext: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Work with issues.
    #[command(subcommand)]
    Issue(IssueCommand),
    /// Work with projects.
    #[command(subcommand)]
    Project(ProjectCommand),
    /// Browse teams and their members.
    #[command(subcommand)]
    Team(TeamCommand),
    /// Browse workspace users.
    #[command(subcommand)]
    User(UserCommand),
    /// Read issue comments.
    #[command(subcommand)]
    Comment(CommentCommand),
    /// Show the authenticated user.
    Whoami,
    /// Manage stored credentials.
    #[command(subcommand)]
    Auth(AuthCommand),
}

async fn dispatch(session: &Session, command: &Commands) -> Result<String> {
    match command {
        Commands::Issue(cmd) => commands::issue::run(session, cmd).await,
        Commands::Project(cmd) => commands::project::run(session, cmd).await,
        Commands::Team(cmd) => commands::team::run(session, cmd).await,
        Commands::User(cmd) => commands::user::run(session, cmd).await,
        Commands::Comment(cmd) => commands::comment::run(session, cmd).await,
        Commands::Whoami => commands::whoami(session).await,
        Commands::Auth(cmd) => commands::auth::run(session, cmd).await,
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up tracing.
    if cli.debug {
        let file = std::fs::File::create("linctl-debug.log")?;
        tracing_subscriber::fmt()
            .with_writer(file)
            .with_ansi(false)
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_env("RUST_LOG")
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
            )
            .init();
    }

    // Load config.
    let config = loader::load_config(cli.config.as_deref())?;
    let format = OutputFormat::from_flags(cli.json, cli.plaintext, config.defaults.format);
    let renderer = Renderer::new(format, config.defaults.date_format.clone());
    let session = Session::new(config, renderer);

    tracing::info!("linctl starting");

    let runtime = tokio::runtime::Runtime::new()?;
    match runtime.block_on(dispatch(&session, &cli.command)) {
        Ok(output) => {
            print!("{output}");
            Ok(())
        }
        Err(e) => {
            if is_rate_limited(&e) {
                eprintln!("hint: {}", format_rate_limit_message(&e));
            }
            Err(e)
        }
    }
}
