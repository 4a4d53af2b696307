use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing::warn;

use autoserv::cli::{self, OutputFormat};
use autoserv::{config, logging, store, web};

#[derive(Debug, Parser)]
#[command(name = "autoserv")]
#[command(about = "Service records and revenue reports for an auto workshop")]
struct App {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Show a vehicle's service history, newest first
    History {
        /// Vehicle number (case-insensitive)
        vehicle: String,
        /// Output format: table (default), json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Record a new service visit
    Add {
        /// Vehicle number (case-insensitive)
        vehicle: String,
        /// Service date (YYYY-MM-DD)
        #[arg(long)]
        date: String,
        /// Odometer reading in kilometers
        #[arg(long)]
        km: Option<f64>,
        /// Replaced spare part as NAME=COST (repeatable)
        #[arg(long = "part")]
        parts: Vec<String>,
        /// Labour item as DESCRIPTION=COST (repeatable)
        #[arg(long = "service")]
        services: Vec<String>,
    },
    /// Show overall totals and the most replaced parts
    Stats {
        /// Output format: table (default), json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Show revenue by month, or the twelve months of one year
    Monthly {
        /// Calendar year to lay out month by month
        #[arg(long)]
        year: Option<i32>,
        /// Output format: table (default), json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Show the services performed on one day
    Daily {
        /// Day to show (YYYY-MM-DD, default: today)
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Output format: table (default), json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Rewrite legacy serviceCharge records into the itemized schema
    Migrate {
        /// Only report what would change
        #[arg(long)]
        dry_run: bool,
    },
    /// Start the web dashboard
    Web {
        /// Listen address (default: web.addr from config)
        #[arg(long)]
        addr: Option<String>,
    },
    /// Check config files and database reachability
    Health,
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    /// Show the effective configuration
    Show,
    /// Write the default config to ~/.autoserv/config.toml
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Set a dotted key, e.g. `database.url`
    Set { key: String, value: String },
    /// Reset the global config to defaults
    Reset,
}

fn main() -> Result<()> {
    let app = App::parse();
    let (cfg, warnings) = config::load_reporting();
    logging::init(&cfg.logging);
    for w in &warnings {
        warn!(path = %w.path.display(), error = %w.message, "ignoring malformed config file");
    }

    match app.command {
        Commands::History { vehicle, format } => {
            let store = store::from_config(&cfg.database)?;
            let fmt = OutputFormat::from_str_opt(Some(&format));
            cli::run_history(&store, &cfg.display, &vehicle, fmt)
        }
        Commands::Add {
            vehicle,
            date,
            km,
            parts,
            services,
        } => {
            let store = store::from_config(&cfg.database)?;
            let entry = cli::build_entry(&date, km, &parts, &services)?;
            cli::run_add(&store, &cfg.display, &vehicle, entry)
        }
        Commands::Stats { format } => {
            let store = store::from_config(&cfg.database)?;
            let fmt = OutputFormat::from_str_opt(Some(&format));
            cli::run_stats(&store, &cfg.display, fmt)
        }
        Commands::Monthly { year, format } => {
            let store = store::from_config(&cfg.database)?;
            let fmt = OutputFormat::from_str_opt(Some(&format));
            cli::run_monthly(&store, &cfg.display, year, fmt)
        }
        Commands::Daily { date, format } => {
            let store = store::from_config(&cfg.database)?;
            let fmt = OutputFormat::from_str_opt(Some(&format));
            cli::run_daily(&store, &cfg.display, date, fmt)
        }
        Commands::Migrate { dry_run } => {
            let store = store::from_config(&cfg.database)?;
            cli::run_migrate(&store, dry_run)
        }
        Commands::Web { addr } => {
            let store = store::from_config(&cfg.database)?;
            let addr = addr.unwrap_or_else(|| cfg.web.addr.clone());
            web::serve(web::AppState::new(Box::new(store), cfg), &addr)
        }
        Commands::Health => cli::run_health(&cfg),
        Commands::Config { action } => match action {
            ConfigAction::Show => cli::run_config_show(),
            ConfigAction::Init { force } => cli::run_config_init(force),
            ConfigAction::Set { key, value } => cli::run_config_set(&key, &value),
            ConfigAction::Reset => cli::run_config_reset(),
        },
    }
}
