//! Shopkit CLI (`shk`)
//!
//! 웹 콘솔 없이 관리자 패널의 모든 운영을 수행하는 도구입니다.

use clap::{Parser, Subcommand};
use shk_core::session::{FileVault, SessionStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;
mod draft;

use config::CliConfig;

#[derive(Parser)]
#[command(name = "shk")]
#[command(author, version, about = "Shopkit CLI - Admin tool for Shopkit", long_about = None)]
struct Cli {
    /// Hub URL (overrides config)
    #[arg(long, global = true)]
    hub: Option<String>,

    /// Output format
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    // ─────────────────────────────────────────────────────────────────────────
    // Auth
    // ─────────────────────────────────────────────────────────────────────────
    /// Login to Hub
    Login {
        /// Use the admin login endpoint
        #[arg(long)]
        admin: bool,

        /// Email (prompted if omitted)
        #[arg(long)]
        email: Option<String>,

        /// Password (prompted if omitted)
        #[arg(long)]
        password: Option<String>,
    },

    /// Logout and clear the saved session
    Logout,

    /// Show current user
    Whoami,

    /// Check whether the session satisfies the given permissions
    Can {
        /// Required permissions (any match allows)
        permissions: Vec<String>,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Users
    // ─────────────────────────────────────────────────────────────────────────
    /// Manage users
    Users {
        #[command(subcommand)]
        action: UsersAction,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Permission grid
    // ─────────────────────────────────────────────────────────────────────────
    /// Edit and apply the permission grid
    Grid {
        #[command(subcommand)]
        action: GridAction,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Config
    // ─────────────────────────────────────────────────────────────────────────
    /// Manage CLI config
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

// ─────────────────────────────────────────────────────────────────────────────
// Subcommand enums
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Subcommand)]
enum UsersAction {
    /// List users
    List,
}

#[derive(Subcommand)]
enum GridAction {
    /// Show the draft grid
    Show,

    /// Toggle one cell
    Toggle { module: String, action: String },

    /// Toggle a whole module row
    ToggleAll { module: String },

    /// Clear the draft
    Clear,

    /// Apply the draft to a user
    Apply {
        /// Target user id
        #[arg(long)]
        user: String,

        /// Dry run (plan only, no changes)
        #[arg(long)]
        dry_run: bool,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Set default hub URL
    Set {
        #[arg(long)]
        hub: Option<String>,
    },
    /// Show CLI config
    Show,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // 로깅 초기화
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shk=warn,shk_core=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    // 설정 로드
    let config = CliConfig::load()?;
    tracing::debug!("shk start hub={}", config.hub_url(cli.hub.as_deref()));

    // 세션 로드
    let mut store = SessionStore::open(Box::new(FileVault::new(CliConfig::session_path()?)))?;

    // 명령 실행
    match cli.command {
        Commands::Login {
            admin,
            email,
            password,
        } => {
            commands::auth::login(&config, &mut store, cli.hub.as_deref(), admin, email, password)
                .await
        }
        Commands::Logout => commands::auth::logout(&mut store),
        Commands::Whoami => commands::auth::whoami(&store, cli.format),
        Commands::Can { permissions } => commands::auth::can(&store, &permissions, cli.format),

        Commands::Users { action } => match action {
            UsersAction::List => {
                commands::users::list(&config, &store, cli.hub.as_deref(), cli.format).await
            }
        },

        Commands::Grid { action } => match action {
            GridAction::Show => commands::grid::show(cli.format),
            GridAction::Toggle { module, action } => commands::grid::toggle(&module, &action),
            GridAction::ToggleAll { module } => commands::grid::toggle_all(&module),
            GridAction::Clear => commands::grid::clear(),
            GridAction::Apply { user, dry_run } => {
                commands::grid::apply(
                    &config,
                    &store,
                    cli.hub.as_deref(),
                    &user,
                    dry_run,
                    cli.format,
                )
                .await
            }
        },

        Commands::Config { action } => match action {
            ConfigAction::Set { hub } => commands::config::set(hub),
            ConfigAction::Show => commands::config::show(&config),
        },
    }
}
