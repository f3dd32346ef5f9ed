mod app;
mod commands;
mod render;
mod utils;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use regalista_core::config::RegalistaConfig;
use regalista_core::sync::Resolution;
use tracing_subscriber::EnvFilter;

use app::App;

#[derive(Parser)]
#[command(name = "regalista")]
#[command(about = "Keep track of birthdays and gift ideas, synced to a Google Sheet")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List people by upcoming birthday, favorites first
    List,
    /// Add a person
    Add {
        name: String,

        /// Day of the month
        #[arg(short, long)]
        day: u32,

        /// Month, by number or name (e.g. 5 or "mayo")
        #[arg(short, long)]
        month: String,

        /// Year of birth
        #[arg(short, long)]
        year: Option<i32>,

        /// One of: slate, rose, orange, emerald, blue, violet
        #[arg(short, long, default_value = "slate")]
        color: String,
    },
    /// Edit a person (by name or id prefix)
    Edit {
        person: String,

        #[arg(long)]
        name: Option<String>,

        /// New day; the month is kept unless given too
        #[arg(short, long)]
        day: Option<u32>,

        /// New month; the day is kept unless given too
        #[arg(short, long)]
        month: Option<String>,

        #[arg(short, long)]
        year: Option<i32>,

        #[arg(short, long)]
        color: Option<String>,
    },
    /// Remove a person and all of their gifts
    Rm {
        person: String,

        /// Skip confirmation
        #[arg(short, long)]
        force: bool,
    },
    /// Toggle favorite
    Fav { person: String },
    /// Add a yearly birthday reminder to Google Calendar
    Remind { person: String },
    /// Manage a person's gift ideas
    Gift {
        #[command(subcommand)]
        command: GiftCommands,
    },
    /// Link to the remote spreadsheet (sign in), or sign in again
    Link {
        /// Simulate sync without any remote
        #[arg(long)]
        demo: bool,
    },
    /// Settle a pending link conflict (inside the shell)
    Resolve {
        #[arg(value_enum)]
        choice: Choice,
    },
    /// Stop syncing and forget the linked spreadsheet
    Unlink,
    /// Show sync status
    Status,
    /// Diagnose provider and OAuth setup
    Doctor {
        /// Wipe all local data on this device
        #[arg(long)]
        reset: bool,
    },
    /// Interactive session; changes are pushed in the background
    Shell,
}

#[derive(Subcommand)]
pub enum GiftCommands {
    /// Add a gift idea
    Add {
        person: String,
        name: String,

        #[arg(short, long)]
        price: Option<f64>,

        #[arg(short, long)]
        description: Option<String>,

        #[arg(short, long)]
        link: Option<String>,

        /// high, medium or low
        #[arg(long, default_value = "medium")]
        priority: String,
    },
    /// Edit a gift (by name or id prefix)
    Edit {
        person: String,
        gift: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(short, long)]
        price: Option<f64>,

        #[arg(short, long)]
        description: Option<String>,

        #[arg(short, long)]
        link: Option<String>,

        #[arg(long)]
        priority: Option<String>,
    },
    /// Remove a gift
    Rm { person: String, gift: String },
    /// Mark a gift purchased, or pending again
    Toggle { person: String, gift: String },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum Choice {
    /// Replace local data with the spreadsheet's
    Adopt,
    /// Overwrite the spreadsheet with local data
    Keep,
}

impl From<Choice> for Resolution {
    fn from(choice: Choice) -> Self {
        match choice {
            Choice::Adopt => Resolution::AdoptRemote,
            Choice::Keep => Resolution::KeepLocal,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = RegalistaConfig::load()?;
    let demo = matches!(cli.command, Commands::Link { demo: true });
    let mut app = App::open(config, demo).await?;

    match cli.command {
        Commands::Shell => commands::shell::run(&mut app).await,
        command => run_command(&mut app, command).await,
    }
}

pub async fn run_command(app: &mut App, command: Commands) -> Result<()> {
    match command {
        Commands::List => commands::list::run(app),
        Commands::Add {
            name,
            day,
            month,
            year,
            color,
        } => commands::person::add(app, name, day, &month, year, &color).await,
        Commands::Edit {
            person,
            name,
            day,
            month,
            year,
            color,
        } => {
            let args = commands::person::EditArgs {
                name,
                day,
                month,
                year,
                color,
            };
            commands::person::edit(app, &person, args).await
        }
        Commands::Rm { person, force } => commands::person::remove(app, &person, force).await,
        Commands::Fav { person } => commands::person::toggle_favorite(app, &person).await,
        Commands::Remind { person } => commands::person::remind(app, &person).await,
        Commands::Gift { command } => commands::gift::run(app, command).await,
        Commands::Link { demo } => commands::link::run(app, demo).await,
        Commands::Resolve { choice } => commands::link::resolve(app, choice.into()).await,
        Commands::Unlink => commands::link::unlink(app),
        Commands::Status => commands::status::run(app),
        Commands::Doctor { reset } => commands::doctor::run(app, reset).await,
        Commands::Shell => anyhow::bail!("Already in the shell"),
    }
}
