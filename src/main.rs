mod app;
mod commands;
mod prompt;
mod render;
mod utils;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::app::App;

#[derive(Parser)]
#[command(name = "levocal")]
#[command(about = "Your levo-calendar events and public holidays in the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in with your email (the account is created on first login)
    Login { email: String },
    /// Forget the stored identity
    Logout,
    /// Show who is logged in
    Whoami,
    /// Show a month with your events and public holidays
    Show {
        /// Month to show (YYYY-MM, defaults to the current month)
        #[arg(short, long)]
        month: Option<String>,

        /// Holiday country (ISO 3166 code, e.g. "FI")
        #[arg(short, long)]
        country: Option<String>,
    },
    /// List your events grouped by day
    Events {
        /// Include events that already ended
        #[arg(short, long)]
        all: bool,

        /// Print the events as JSON
        #[arg(long)]
        json: bool,
    },
    /// Create an event (prompts for anything not given)
    New {
        /// Event title
        title: Option<String>,

        /// Start date/time (e.g. "2025-03-20 15:00", "tomorrow 3pm")
        #[arg(short, long)]
        start: Option<String>,

        /// End date/time
        #[arg(short, long, conflicts_with = "duration")]
        end: Option<String>,

        /// Duration (e.g. "30m", "2h")
        #[arg(short, long)]
        duration: Option<String>,

        #[arg(long)]
        description: Option<String>,

        /// Create the event in this time zone instead of the local one
        #[arg(short, long)]
        timezone: Option<String>,
    },
    /// Change an event
    Edit {
        id: i64,

        #[arg(short, long)]
        title: Option<String>,

        #[arg(short, long)]
        start: Option<String>,

        #[arg(short, long)]
        end: Option<String>,

        #[arg(long)]
        description: Option<String>,
    },
    /// Delete an event
    Delete {
        id: i64,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// List countries with holiday data
    Countries,
    /// List everyone registered on the backend
    Users,
    /// Open a page by path ("/", "/login")
    Open { path: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let cli = Cli::parse();
    let app = App::load()?;

    match cli.command {
        Commands::Login { email } => commands::login::run(&app, &email).await,
        Commands::Logout => commands::logout::run(&app),
        Commands::Whoami => commands::whoami::run(&app),
        Commands::Show { month, country } => {
            commands::show::run(&app, month.as_deref(), country.as_deref()).await
        }
        Commands::Events { all, json } => commands::events::run(&app, all, json).await,
        Commands::New {
            title,
            start,
            end,
            duration,
            description,
            timezone,
        } => {
            commands::new::run(
                &app,
                commands::new::NewArgs {
                    title,
                    start,
                    end,
                    duration,
                    description,
                    timezone,
                },
            )
            .await
        }
        Commands::Edit {
            id,
            title,
            start,
            end,
            description,
        } => {
            commands::edit::run(
                &app,
                id,
                commands::edit::EditArgs {
                    title,
                    start,
                    end,
                    description,
                },
            )
            .await
        }
        Commands::Delete { id, yes } => commands::delete::run(&app, id, yes).await,
        Commands::Countries => commands::countries::run(&app).await,
        Commands::Users => commands::users::run(&app).await,
        Commands::Open { path } => commands::open::run(&app, &path).await,
    }
}

/// Log to stderr so command output stays clean. Filter with `LEVOCAL_LOG`.
fn init_logging() {
    let filter = EnvFilter::try_from_env("LEVOCAL_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}
