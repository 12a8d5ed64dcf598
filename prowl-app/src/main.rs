use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use prowl_common::observability::{init_logging, LogConfig, LogFormat};
use prowl_common::{Credentials, Identity};
use prowl_config::{ProwlConfig, ProwlConfigLoader, default_config_path};
use prowl_drivers::session::{SessionFactory, SessionStore, WebDriverLauncher};
use prowl_site::{DateFilter, JobBoard, SearchQuery};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "prowl")]
#[command(about = "Browser-driven job board extraction")]
struct Cli {
    /// Config file (YAML); defaults to the user config dir
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Account whose stored session is used
    #[arg(short, long, global = true, env = "PROWL_USERNAME")]
    user: Option<String>,

    /// Mirror logs to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log encoding: text or json
    #[arg(long, global = true, default_value = "text", env = "PROWL_LOG_FORMAT")]
    log_format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and store the session (no-op while a stored session is valid)
    Login {
        #[arg(long, env = "PROWL_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Search job postings
    Search {
        /// Keywords
        query: String,

        /// City, region or postal code
        #[arg(short, long, default_value = "")]
        location: String,

        /// Date posted: day, week or month (or 1, 2, 3)
        #[arg(short, long)]
        posted: Option<DateFilter>,

        /// Only read the first result page
        #[arg(long)]
        first_page: bool,
    },

    /// Show a job posting
    Job {
        id: u64,
    },

    /// Show a company
    Company {
        slug: String,
    },

    /// Show a recruiter profile
    Recruiter {
        slug: String,
    },
}

fn load_config(path: Option<&PathBuf>) -> Result<ProwlConfig> {
    let loader = match (path, default_config_path()) {
        (Some(explicit), _) => ProwlConfigLoader::new().with_file(explicit),
        (None, Some(default)) => ProwlConfigLoader::new().with_optional_file(default),
        (None, None) => ProwlConfigLoader::new(),
    };
    loader.load().context("loading configuration")
}

fn build_board(cfg: &ProwlConfig) -> JobBoard {
    let store = SessionStore::new(cfg.session_dir());
    let launcher = WebDriverLauncher::new(cfg.browser.clone(), cfg.site.base_url.clone());
    let sessions = SessionFactory::new(store, Arc::new(launcher));
    JobBoard::new(cfg.site.clone(), sessions)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1) Load config (env wins)
    let cfg = load_config(cli.config.as_ref())?;

    let log_path = init_logging(LogConfig {
        emit_stderr: cli.verbose,
        format: LogFormat::from_name(&cli.log_format),
        ..LogConfig::default()
    })?;
    info!(log = %log_path.display(), session_dir = %cfg.session_dir().display(), "prowl starting");

    let board = build_board(&cfg);
    let username = cli
        .user
        .context("no account given; pass --user or set PROWL_USERNAME")?;
    let identity = Identity::new(username.clone());

    match cli.command {
        Commands::Login { password } => {
            board.login(&Credentials::new(username, password)).await?;
            eprintln!("session stored for {identity}");
        }
        Commands::Search {
            query,
            location,
            posted,
            first_page,
        } => {
            let mut search = SearchQuery::new(query, location);
            search.date_filter = posted;
            search.limit_to_first_page = first_page;
            print_json(&board.search_jobs(&identity, &search).await?)?;
        }
        Commands::Job { id } => print_json(&board.get_job_posting(&identity, id).await?)?,
        Commands::Company { slug } => print_json(&board.get_company(&identity, &slug).await?)?,
        Commands::Recruiter { slug } => print_json(&board.get_recruiter(&identity, &slug).await?)?,
    }
    Ok(())
}
