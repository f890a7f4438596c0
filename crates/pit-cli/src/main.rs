use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};

mod commands;

use commands::{connect, day, floor, load_service_config};

#[derive(Parser)]
#[command(name = "pit")]
#[command(about = "Pit ledger operator CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Database commands
    Db {
        #[command(subcommand)]
        cmd: DbCmd,
    },

    /// Compute layered config hash + print canonical JSON
    ConfigHash {
        /// Paths in merge order (base -> site -> local)
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Game day lifecycle
    Day {
        #[command(subcommand)]
        cmd: DayCmd,
    },

    /// Halls
    Hall {
        #[command(subcommand)]
        cmd: HallCmd,
    },

    /// Gaming tables
    Table {
        #[command(subcommand)]
        cmd: TableCmd,
    },
}

#[derive(Subcommand)]
enum DbCmd {
    Status,
    /// Apply embedded SQL migrations.
    Migrate,
}

#[derive(Subcommand)]
enum DayCmd {
    /// Open the game day for a date and seed its per-table rows
    Open {
        /// YYYY-MM-DD
        #[arg(long)]
        date: NaiveDate,

        /// Seed only this hall's tables and slot machines
        #[arg(long)]
        hall: Option<i64>,
    },

    /// Open the day after the latest game day
    Roll {
        #[arg(long)]
        hall: Option<i64>,
    },

    List,

    /// Recompute every running result of a day and report drift
    Audit {
        #[arg(long)]
        game_day: i64,

        /// Exit non-zero when any table drifts
        #[arg(long, default_value_t = false)]
        strict: bool,
    },
}

#[derive(Subcommand)]
enum HallCmd {
    Create {
        #[arg(long)]
        name: String,
    },
    List,
}

#[derive(Subcommand)]
enum TableCmd {
    Create {
        #[arg(long)]
        name: String,

        /// Opening float, e.g. "5=10,25=4"
        #[arg(long = "float", default_value = "")]
        open_flot: String,

        #[arg(long)]
        hall: Option<i64>,
    },
    List {
        #[arg(long)]
        hall: Option<i64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    init_tracing();

    let cli = Cli::parse();

    match cli.cmd {
        Commands::ConfigHash { paths } => {
            let path_refs: Vec<&str> = paths.iter().map(|s| s.as_str()).collect();
            let loaded = pit_config::load_layered_yaml(&path_refs)?;
            println!("config_hash={}", loaded.config_hash);
            println!("{}", loaded.canonical_json);
        }

        Commands::Db { cmd } => {
            let cfg = load_service_config()?;
            let pool = connect(&cfg).await?;
            match cmd {
                DbCmd::Status => {
                    let s = pit_db::status(&pool).await?;
                    println!("db_ok={} has_ledger_tables={}", s.ok, s.has_ledger_tables);
                }
                DbCmd::Migrate => {
                    pit_db::migrate(&pool).await?;
                    println!("migrations_applied=true");
                }
            }
        }

        Commands::Day { cmd } => {
            let cfg = load_service_config()?;
            let pool = connect(&cfg).await?;
            match cmd {
                DayCmd::Open { date, hall } => day::open(&pool, date, hall).await?,
                DayCmd::Roll { hall } => day::roll(&pool, hall).await?,
                DayCmd::List => day::list(&pool).await?,
                DayCmd::Audit { game_day, strict } => day::audit(&pool, game_day, strict).await?,
            }
        }

        Commands::Hall { cmd } => {
            let cfg = load_service_config()?;
            let pool = connect(&cfg).await?;
            match cmd {
                HallCmd::Create { name } => floor::hall_create(&pool, &name).await?,
                HallCmd::List => floor::hall_list(&pool).await?,
            }
        }

        Commands::Table { cmd } => {
            let cfg = load_service_config()?;
            let pool = connect(&cfg).await?;
            match cmd {
                TableCmd::Create {
                    name,
                    open_flot,
                    hall,
                } => floor::table_create(&pool, name, &open_flot, hall).await?,
                TableCmd::List { hall } => floor::table_list(&pool, hall).await?,
            }
        }
    }

    Ok(())
}

/// Logs go to stderr; stdout carries command output only.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()),
        )
        .init();
}
