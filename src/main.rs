//! Kepegawaian CLI - employee records service and admin commands

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use kepegawaian::config::{self, KepegawaianConfig, ServeSettings};
use kepegawaian::employee::division_breakdown;
use kepegawaian::storage::EmployeeStore;
use kepegawaian::ui::{self, Icons};
use kepegawaian::{Category, EmployeeFilter};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "kepegawaian")]
#[command(version)]
#[command(about = "Employee records service - personnel data, PDF documents and dashboard statistics")]
#[command(long_about = r#"
Kepegawaian stores employee records in SQLite and serves them over HTTP:
  • CRUD API for employees under /api/employees
  • PDF uploads for KTP, SK Pangkat, SK Berkala and SK Jabatan
  • Dashboard statistics per category and per division

Example usage:
  kepegawaian init
  kepegawaian serve --port 3000
  kepegawaian list --search budi --category ASN
  kepegawaian stats
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP service
    Serve {
        /// Path to the database file
        #[arg(short, long)]
        database: Option<PathBuf>,

        /// Directory for uploaded documents
        #[arg(short, long)]
        uploads: Option<PathBuf>,

        /// Address to bind
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Built UI directory to serve as fallback
        #[arg(long)]
        dist: Option<PathBuf>,
    },

    /// List employees, newest first
    List {
        /// Path to the database file
        #[arg(short, long)]
        database: Option<PathBuf>,

        /// Match against name, NIP or position
        #[arg(short, long)]
        search: Option<String>,

        /// Only show one category (ASN or P3K)
        #[arg(short = 'k', long)]
        category: Option<String>,
    },

    /// Show totals per category and per division
    Stats {
        /// Path to the database file
        #[arg(short, long)]
        database: Option<PathBuf>,
    },

    /// Write a config file with the default settings
    Init {
        /// Overwrite an existing config file
        #[arg(short, long)]
        force: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    let file_config = config::load_config(cli.config.as_deref())?.unwrap_or_default();
    let settings = ServeSettings::from_config(&file_config);

    match cli.command {
        Commands::Serve { database, uploads, host, port, dist } => {
            let settings = ServeSettings {
                database: database.unwrap_or(settings.database),
                upload_dir: uploads.unwrap_or(settings.upload_dir),
                host: host.unwrap_or(settings.host),
                port: port.unwrap_or(settings.port),
                dist_dir: dist.or(settings.dist_dir),
            };

            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(kepegawaian::server::start_server(settings))?;
        }

        Commands::List { database, search, category } => {
            let database = database.unwrap_or(settings.database);
            let store = open_existing(&database)?;

            let category = category
                .filter(|c| !c.eq_ignore_ascii_case("ALL"))
                .map(|c| c.parse::<Category>())
                .transpose()?;
            let filter = EmployeeFilter { search, category };
            let employees = store.list(&filter)?;

            if employees.is_empty() {
                ui::warn("Tidak ada pegawai yang cocok.");
            } else {
                println!("{} {} pegawai", Icons::PEOPLE, employees.len());
                println!("{}", ui::employee_table(&employees));
            }
        }

        Commands::Stats { database } => {
            let database = database.unwrap_or(settings.database);
            let store = open_existing(&database)?;

            let stats = store.stats()?;
            let divisions = division_breakdown(&store.division_counts()?, stats.total);

            ui::header(&format!("Statistik Pegawai ({})", database.display()));
            println!("{}", ui::stats_table(&stats, &divisions));

            ui::section("Distribusi Pegawai per Bidang");
            for share in &divisions {
                ui::summary_row(
                    &format!("{} {:<45}", Icons::BUILDING, share.division),
                    &format!("{} {} Pegawai", ui::bar(share.percentage), share.count),
                );
            }
        }

        Commands::Init { force } => {
            let path = cli.config.unwrap_or_else(config::default_config_path);
            config::write_config(&path, &KepegawaianConfig::with_defaults(), force)?;
            ui::success(&format!("Config written to {}", path.display()));
            ui::info("Database", config::DEFAULT_DATABASE);
            ui::info("Uploads", config::DEFAULT_UPLOAD_DIR);
        }
    }

    Ok(())
}

/// Admin commands read an existing database rather than creating a new one
fn open_existing(database: &std::path::Path) -> anyhow::Result<EmployeeStore> {
    if !database.exists() {
        ui::error(&format!("Database not found: {}", database.display()));
        anyhow::bail!("run `kepegawaian serve` first or pass --database");
    }
    tracing::debug!("{} Opening {}", Icons::DATABASE, database.display());
    Ok(EmployeeStore::open(database)?)
}
