//! SIGEA agenda service entry point.

use clap::{Parser, Subcommand, ValueEnum};
use sigea::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod cli;

/// SIGEA: agenda service for appointments and case records
#[derive(Parser, Debug)]
#[command(name = "sigea")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server
    Serve {
        /// Bind address. If not specified, uses the config file value.
        #[arg(short, long)]
        bind: Option<String>,
        /// HTTP port. If not specified, uses the config file value.
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Add an appointment
    Add {
        /// Appointment title
        titulo: String,
        /// Date (YYYY-MM-DD)
        #[arg(short, long)]
        date: String,
        /// Time (HH:MM)
        #[arg(short, long)]
        time: String,
        /// Location
        #[arg(short, long)]
        local: Option<String>,
        /// Description
        #[arg(long)]
        descricao: Option<String>,
        /// Write even if the slot is occupied, without prompting
        #[arg(short = 'y', long)]
        yes: bool,
    },
    /// List appointments and processes for a date
    List {
        /// Date (YYYY-MM-DD, default: today)
        date: Option<String>,
    },
    /// Update an appointment (unset fields keep their current values)
    Update {
        /// Appointment id
        id: String,
        /// New title
        #[arg(long)]
        titulo: Option<String>,
        /// New date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,
        /// New time (HH:MM)
        #[arg(long)]
        time: Option<String>,
        /// New location
        #[arg(long)]
        local: Option<String>,
        /// New description
        #[arg(long)]
        descricao: Option<String>,
        /// Write even if the slot is occupied, without prompting
        #[arg(short = 'y', long)]
        yes: bool,
    },
    /// Delete an appointment
    Delete {
        /// Appointment id
        id: String,
    },
    /// Render the month grid
    Grid {
        /// Year
        year: i32,
        /// Month (1-12)
        month: u32,
        /// Selected date to highlight (YYYY-MM-DD)
        #[arg(short, long)]
        selected: Option<String>,
    },
    /// Probe a slot for a conflict
    Conflicts {
        /// Date (YYYY-MM-DD)
        date: String,
        /// Time (HH:MM)
        time: String,
        /// Appointment id to exclude from the check
        #[arg(long)]
        exclude: Option<String>,
    },
    /// Follow live store changes
    Watch {
        /// Collection to follow
        #[arg(value_enum, default_value = "appointments")]
        collection: WatchTarget,
    },
    /// Show collection counts
    Stats,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum WatchTarget {
    Appointments,
    Processes,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let is_serve = matches!(args.command, Command::Serve { .. });

    if is_serve {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    } else {
        // Minimal logging for one-shot commands
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_writer(std::io::stderr)
            .init();
    }

    let config = if let Some(path) = &args.config {
        Config::from_file(path)?
    } else {
        Config::load()?
    };

    cli::run(config, args.command, args.json).await
}
