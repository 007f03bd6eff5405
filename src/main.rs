use anyhow::Result;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use braindump::auth::{self, NewUser};
use braindump::cli::{history, profile, signup, themes, write};
use braindump::completion::TogetherClient;
use braindump::config::Config;
use braindump::history::Horizon;
use braindump::journal::RequestContext;
use braindump::scoring::Analyzer;
use braindump::store::JournalStore;

#[derive(Parser)]
#[command(name = "braindump")]
#[command(about = "Personal journal with AI mood, stress and anxiety scoring")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "braindump.yaml")]
    config: String,
}

#[derive(Args)]
struct Login {
    /// Account username
    #[arg(short, long, env = "BRAINDUMP_USERNAME")]
    username: String,

    /// Account password
    #[arg(short, long, env = "BRAINDUMP_PASSWORD", hide_env_values = true)]
    password: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new account
    Signup {
        #[command(flatten)]
        login: Login,

        /// Display name
        #[arg(long)]
        name: String,

        /// Date of birth (YYYY-MM-DD)
        #[arg(long)]
        dob: NaiveDate,

        /// Height in cm
        #[arg(long)]
        height: u32,

        /// Weight in kg
        #[arg(long)]
        weight: u32,
    },

    /// Show profile info
    Profile {
        #[command(flatten)]
        login: Login,
    },

    /// Write a journal entry and get it analyzed
    Write {
        #[command(flatten)]
        login: Login,

        /// Entry text (reads --file or stdin when omitted)
        text: Option<String>,

        /// Read the entry from a file
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Show score history
    History {
        #[command(flatten)]
        login: Login,

        /// Horizon: 1d, 1w, 1m, 6m, 1y, 5y
        #[arg(long, default_value = "1w")]
        horizon: Horizon,
    },

    /// Render recurring themes as a word cloud
    Themes {
        #[command(flatten)]
        login: Login,

        /// Horizon: 1d, 1w, 1m, 6m, 1y, 5y
        #[arg(long, default_value = "1m")]
        horizon: Horizon,

        /// Output SVG path
        #[arg(short, long, default_value = "themes.svg")]
        out: PathBuf,
    },
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    // Load config
    let config = Config::load(&cli.config).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "could not load config, using defaults");
        Config::default()
    });
    config.validate()?;

    // Initialize store
    let store = JournalStore::open(&config.database_path())?;

    match cli.command {
        Commands::Signup {
            login,
            name,
            dob,
            height,
            weight,
        } => {
            signup::run(
                &store,
                NewUser {
                    username: login.username,
                    password: login.password,
                    name,
                    dob,
                    height_cm: height,
                    weight_kg: weight,
                },
            )?;
        }
        Commands::Profile { login } => {
            let user = auth::sign_in(&store, &login.username, &login.password)?;
            profile::run(&RequestContext::new(&store, user))?;
        }
        Commands::Write { login, text, file } => {
            let user = auth::sign_in(&store, &login.username, &login.password)?;
            let text = write::read_text(text, file.as_deref())?;

            let credentials = config.credentials()?;
            let client = TogetherClient::new(&config.completion.base_url, &credentials, config.timeout());
            let analyzer = Analyzer::new(Box::new(client), config.completion.model.clone())
                .with_clarify_retries(config.completion.clarify_retries);

            let ctx = RequestContext::new(&store, user).with_analyzer(&analyzer);
            write::run(&ctx, &text, Duration::from_millis(config.ui.stream_delay_ms))?;
        }
        Commands::History { login, horizon } => {
            let user = auth::sign_in(&store, &login.username, &login.password)?;
            history::run(&RequestContext::new(&store, user), horizon)?;
        }
        Commands::Themes {
            login,
            horizon,
            out,
        } => {
            let user = auth::sign_in(&store, &login.username, &login.password)?;
            themes::run(&RequestContext::new(&store, user), horizon, &config.themes, &out)?;
        }
    }

    Ok(())
}
