use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use aisadsa_application::build_app;
use aisadsa_infrastructure::{AisadsaPaths, AppConfig};

mod commands;
mod logging;
mod render;
mod shell;

#[derive(Parser)]
#[command(name = "aisadsa")]
#[command(about = "AISADSA - guided data architecture assessment", long_about = None)]
struct Cli {
    /// Path to config.toml (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Tab session to act on; each tab keeps its own flow and chat
    #[arg(long, global = true, default_value = "default")]
    tab: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and store the credential
    Login {
        username: String,
        /// Prompted for when omitted
        #[arg(long)]
        password: Option<String>,
    },
    /// Create an account and sign in
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: Option<String>,
    },
    /// Sign out and clear this tab's flow and chat
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Start a new assessment from the first question
    Start,
    /// Show the current question
    Show,
    /// Answer the current question with option N (1-based) and advance
    Answer { option: usize },
    /// Submit the completed assessment and show the results
    Submit,
    /// Discard this tab's assessment progress
    Reset,
    /// Ask the assistant a question
    Chat { message: Vec<String> },
    /// Print the chat transcript
    Transcript,
    /// Manage tab sessions
    Tab {
        #[command(subcommand)]
        action: TabAction,
    },
    /// Interactive session
    Shell,
}

#[derive(Subcommand)]
enum TabAction {
    /// Print a fresh tab id
    New,
    /// List tabs with stored state
    List,
    /// Delete a tab's stored state
    Remove { tab: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = match cli.config {
        Some(path) => path,
        None => AisadsaPaths::resolve()?.config_file(),
    };
    let config = AppConfig::load_with_env(&config_path)
        .with_context(|| format!("Failed to load {}", config_path.display()))?;
    let paths = config.apply_to_paths(AisadsaPaths::resolve()?);

    let _guard = logging::init(&paths.logs_dir())?;
    tracing::debug!("Using config {}", config_path.display());

    if let Commands::Tab { action } = &cli.command {
        return match action {
            TabAction::New => commands::tab::new(),
            TabAction::List => commands::tab::list(&paths),
            TabAction::Remove { tab } => commands::tab::remove(&paths, tab),
        };
    }

    let app = build_app(&config, &paths, &cli.tab)?;

    match cli.command {
        Commands::Login { username, password } => {
            commands::auth::login(&app, &username, password).await?
        }
        Commands::Register {
            name,
            email,
            username,
            password,
        } => commands::auth::register(&app, &name, &email, &username, password).await?,
        Commands::Logout => commands::auth::logout(&app).await?,
        Commands::Whoami => commands::auth::whoami(&app),
        Commands::Start => commands::flow::start(&app).await?,
        Commands::Show => commands::flow::show(&app).await?,
        Commands::Answer { option } => commands::flow::answer(&app, option).await?,
        Commands::Submit => commands::flow::submit(&app).await?,
        Commands::Reset => commands::flow::reset(&app).await?,
        Commands::Chat { message } => commands::chat::send(&app, &message.join(" ")).await?,
        Commands::Transcript => commands::chat::transcript(&app).await?,
        Commands::Shell => shell::run(&app, &cli.tab).await?,
        Commands::Tab { .. } => {}
    }

    Ok(())
}
