//! Konband binary entry point: argument parsing and command dispatch.

use clap::{Parser, Subcommand};
use konband::api::{self, ApiContext};
use konband::cli::{self, Backend, CliError};
use std::path::PathBuf;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "konband", version, about = "Band assignment with conflict analysis")]
struct Cli {
    /// Database path.
    #[arg(long, global = true, default_value = "konband.db")]
    db: PathBuf,

    /// Persistence backend.
    #[arg(long, global = true, value_enum, default_value_t = Backend::File)]
    backend: Backend,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create a new empty database.
    Init {
        /// Overwrite an existing database.
        #[arg(long)]
        force: bool,
    },
    /// Show a summary of the current state.
    Status,
    /// Add one member.
    MemberAdd {
        /// Display name.
        name: String,
        /// Skill specs, e.g. `Vo=5` (repeatable).
        #[arg(long = "skill")]
        skills: Vec<String>,
        /// Main role label.
        #[arg(long)]
        main: Option<String>,
    },
    /// Remove a member, clearing its slots everywhere first.
    MemberRemove {
        /// Member id (the numeric part of `m3`).
        member: u64,
    },
    /// Bulk-import tab-separated roster rows from a file.
    RosterImport {
        /// Input file with one member per row.
        input: PathBuf,
    },
    /// Add an empty historical band.
    BandAdd,
    /// Set the number of proposed bands (clamped 1-10).
    BandCount {
        /// Target count.
        count: usize,
    },
    /// Assign a member to a band slot.
    Assign {
        /// Band id (the numeric part of `b2`).
        band: u64,
        /// Role label, e.g. `Vo`.
        role: String,
        /// Member id.
        member: u64,
    },
    /// Empty a band slot.
    Clear {
        /// Band id.
        band: u64,
        /// Role label.
        role: String,
    },
    /// Move or exchange between two slots.
    Swap {
        from_band: u64,
        from_role: String,
        to_band: u64,
        to_role: String,
    },
    /// Run the engine and print the full report.
    Analyze,
    /// Export the full state bundle as JSON.
    Export {
        /// Output file.
        output: PathBuf,
    },
    /// Import a JSON state bundle, replacing the current state.
    Import {
        /// Input file.
        input: PathBuf,
    },
    /// Update policy settings (out-of-range values are clamped).
    Settings {
        #[arg(long)]
        allow_concurrent: Option<bool>,
        #[arg(long)]
        min_level: Option<u8>,
        #[arg(long)]
        max_assignments: Option<u8>,
        #[arg(long)]
        collision_threshold: Option<u8>,
    },
    /// Serve the state-sync HTTP API.
    Serve {
        /// Listen address.
        #[arg(long, default_value = "127.0.0.1:7500")]
        addr: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    if let Err(err) = run(cli).await {
        error!("{err}");
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let db = cli.db.as_path();
    let backend = cli.backend;

    match cli.command {
        Command::Init { force } => cli::cmd_init(db, backend, force),
        Command::Status => cli::cmd_status(db, backend),
        Command::MemberAdd { name, skills, main } => {
            cli::cmd_member_add(db, backend, &name, &skills, main.as_deref())
        }
        Command::MemberRemove { member } => cli::cmd_member_remove(db, backend, member),
        Command::RosterImport { input } => cli::cmd_roster_import(db, backend, &input),
        Command::BandAdd => cli::cmd_band_add(db, backend),
        Command::BandCount { count } => cli::cmd_band_count(db, backend, count),
        Command::Assign { band, role, member } => {
            cli::cmd_assign(db, backend, band, &role, member)
        }
        Command::Clear { band, role } => cli::cmd_clear(db, backend, band, &role),
        Command::Swap {
            from_band,
            from_role,
            to_band,
            to_role,
        } => cli::cmd_swap(db, backend, from_band, &from_role, to_band, &to_role),
        Command::Analyze => cli::cmd_analyze(db, backend),
        Command::Export { output } => cli::cmd_export(db, backend, &output),
        Command::Import { input } => cli::cmd_import(db, backend, &input),
        Command::Settings {
            allow_concurrent,
            min_level,
            max_assignments,
            collision_threshold,
        } => cli::cmd_settings(
            db,
            backend,
            allow_concurrent,
            min_level,
            max_assignments,
            collision_threshold,
        ),
        Command::Serve { addr } => {
            let session = cli::load_or_create_session(db, backend)?;
            let ctx = ApiContext::new(session, db.to_path_buf(), backend);
            api::serve(&addr, ctx).await
        }
    }
}
