mod commands;
mod render;
mod utils;

use anyhow::Result;
use chaincal_core::Readiness;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "chaincal")]
#[command(about = "Manage calendars, events and shares stored on a Move ledger")]
struct Cli {
    /// Log ledger and wallet traffic to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the connected account, its user and ledger totals
    Status,
    /// Show the config file location and the effective settings
    Config,
    #[command(subcommand)]
    User(UserCommand),
    #[command(subcommand)]
    Calendar(CalendarCommand),
    #[command(subcommand)]
    Event(EventCommand),
    /// Show global ledger statistics
    Stats,
    /// List calendars shared with you that are waiting to be accepted
    Invites,
    /// Send a message to the ledger's debug entry point
    Debug { message: String },
}

#[derive(Subcommand)]
enum UserCommand {
    /// Create the user for the connected account
    Create { name: String },
    Show,
}

#[derive(Subcommand)]
enum CalendarCommand {
    List,
    Create {
        name: String,
    },
    Delete {
        /// Calendar object id
        id: String,
    },
    /// Offer a calendar to another address
    Share {
        id: String,
        address: String,
    },
    /// Accept a calendar shared with you
    Accept {
        id: String,
    },
}

#[derive(Subcommand)]
enum EventCommand {
    Create {
        /// Calendar object id
        calendar: String,
        title: String,

        /// Start date/time (e.g., "2025-03-20T15:00" or "2025-03-20")
        #[arg(short, long)]
        start: String,

        /// End date/time
        #[arg(short, long)]
        end: String,
    },
    Delete {
        calendar: String,
        /// Event id as shown by `event list`
        event: String,
    },
    List {
        /// Only show events on this date (YYYY-MM-DD)
        #[arg(long)]
        on: Option<String>,

        /// Hide events of these calendars
        #[arg(long)]
        hide: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Commands::Config = cli.command {
        return commands::config::run();
    }

    let view = commands::connect().await?;

    if let Commands::Status = cli.command {
        return commands::status::run(&view).await;
    }

    if view.snapshot().await.readiness == Readiness::NotReady {
        anyhow::bail!(
            "No wallet account connected.\n\n\
            Make sure your signer is installed and has an active account:\n  \
            chaincal config"
        );
    }

    match cli.command {
        Commands::Status | Commands::Config => Ok(()),
        Commands::User(UserCommand::Create { name }) => commands::user::create(&view, &name).await,
        Commands::User(UserCommand::Show) => commands::user::show(&view).await,
        Commands::Calendar(command) => match command {
            CalendarCommand::List => commands::calendar::list(&view).await,
            CalendarCommand::Create { name } => commands::calendar::create(&view, &name).await,
            CalendarCommand::Delete { id } => commands::calendar::delete(&view, &id).await,
            CalendarCommand::Share { id, address } => {
                commands::calendar::share(&view, &id, &address).await
            }
            CalendarCommand::Accept { id } => commands::calendar::accept(&view, &id).await,
        },
        Commands::Event(command) => match command {
            EventCommand::Create {
                calendar,
                title,
                start,
                end,
            } => commands::event::create(&view, &calendar, &title, &start, &end).await,
            EventCommand::Delete { calendar, event } => {
                commands::event::delete(&view, &calendar, &event).await
            }
            EventCommand::List { on, hide } => {
                commands::event::list(&view, on.as_deref(), &hide).await
            }
        },
        Commands::Stats => commands::stats::run(&view).await,
        Commands::Invites => commands::stats::invites(&view).await,
        Commands::Debug { message } => commands::debug::run(&view, &message).await,
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
