//! # CLI Commands
//!
//! Command implementations for the konband binary.
//!
//! Every command follows the same shape: load the session from disk,
//! apply one mutation (or none, for read-only commands), save, and
//! print a short human-readable result. The analysis engine is re-run
//! from the full current state whenever a report is needed.

use clap::ValueEnum;
use konband_core::formats::{PersistedSession, decode_session, encode_session};
use konband_core::session::CommandError;
use konband_core::storage::RedbStore;
use konband_core::{
    BandId, MemberId, Policy, Report, Role, Session, Snapshot, StoreError,
};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;
use tracing::info;

/// Which persistence backend a database path uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    /// Single binary file (header + postcard payload).
    File,
    /// redb embedded key-value database.
    Redb,
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Backend::File => f.write_str("file"),
            Backend::Redb => f.write_str("redb"),
        }
    }
}

/// CLI-level failures.
#[derive(Debug, Error)]
pub enum CliError {
    /// Persistence failure.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// File I/O failure.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Export/import JSON failure.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// A mutation command was rejected.
    #[error("command failed: {0}")]
    Command(#[from] CommandError),

    /// Bad command-line argument.
    #[error("{0}")]
    Invalid(String),

    /// `init` refused to overwrite an existing database.
    #[error("database already exists (use --force to overwrite)")]
    AlreadyExists,
}

// =============================================================================
// SESSION LOAD/SAVE
// =============================================================================

/// Load a session from disk, or create a fresh one if nothing is there.
pub fn load_or_create_session(path: &Path, backend: Backend) -> Result<Session, CliError> {
    match backend {
        Backend::File => {
            if !path.exists() {
                return Ok(Session::new());
            }
            let bytes = std::fs::read(path)?;
            let persisted = decode_session(&bytes)?;
            Ok(Session::from_parts(persisted.state, persisted.policy))
        }
        Backend::Redb => {
            if !path.exists() {
                return Ok(Session::new());
            }
            Ok(RedbStore::open(path)?.load()?)
        }
    }
}

/// Persist a session to disk.
pub fn save_session(session: &Session, path: &Path, backend: Backend) -> Result<(), CliError> {
    match backend {
        Backend::File => {
            let persisted = PersistedSession {
                state: session.state().clone(),
                policy: session.policy(),
            };
            let bytes = encode_session(&persisted)?;
            std::fs::write(path, bytes)?;
            Ok(())
        }
        Backend::Redb => {
            let store = if path.exists() {
                RedbStore::open(path)?
            } else {
                RedbStore::create(path)?
            };
            store.save(session)?;
            Ok(())
        }
    }
}

// =============================================================================
// COMMANDS
// =============================================================================

/// Create a new empty database.
pub fn cmd_init(path: &Path, backend: Backend, force: bool) -> Result<(), CliError> {
    if path.exists() {
        if !force {
            return Err(CliError::AlreadyExists);
        }
        std::fs::remove_file(path)?;
    }
    save_session(&Session::new(), path, backend)?;
    info!(path = %path.display(), ?backend, "initialized database");
    println!("Initialized {}", path.display());
    Ok(())
}

/// Print a summary of the current state and analysis.
pub fn cmd_status(path: &Path, backend: Backend) -> Result<(), CliError> {
    let session = load_or_create_session(path, backend)?;
    let state = session.state();
    let report = session.analyze();

    println!("Members:          {}", state.members.len());
    println!("Proposed bands:   {}", state.new_bands.len());
    println!("Historical bands: {}", state.historical_bands.len());
    println!("Policy:           {:?}", session.policy());
    println!("Conflicted members: {}", report.conflicts.len());
    println!("Colliding bands:    {}", report.collisions.len());
    Ok(())
}

/// Add one member with `Role=level` skill specs.
pub fn cmd_member_add(
    path: &Path,
    backend: Backend,
    name: &str,
    skill_specs: &[String],
    main_role: Option<&str>,
) -> Result<(), CliError> {
    let mut skills = BTreeMap::new();
    for spec in skill_specs {
        let (role, level) = parse_skill_spec(spec)?;
        skills.insert(role, level);
    }
    let main_role = main_role.map(parse_role).transpose()?;

    let mut session = load_or_create_session(path, backend)?;
    let id = session.add_member(name, skills, main_role);
    save_session(&session, path, backend)?;
    println!("Added member {id}: {name}");
    Ok(())
}

/// Delete a member, clearing its slots everywhere first.
pub fn cmd_member_remove(path: &Path, backend: Backend, member: u64) -> Result<(), CliError> {
    let mut session = load_or_create_session(path, backend)?;
    session.delete_member(MemberId(member))?;
    save_session(&session, path, backend)?;
    println!("Removed member m{member}");
    Ok(())
}

/// Bulk-import tab-separated roster rows from a file.
pub fn cmd_roster_import(path: &Path, backend: Backend, input: &Path) -> Result<(), CliError> {
    let rows = std::fs::read_to_string(input)?;
    let mut session = load_or_create_session(path, backend)?;
    let outcome = session.import_roster(&rows);
    save_session(&session, path, backend)?;
    info!(
        added = outcome.added_count(),
        skipped = outcome.skipped_rows,
        "roster import finished"
    );
    println!(
        "Imported {} members ({} rows skipped)",
        outcome.added_count(),
        outcome.skipped_rows
    );
    Ok(())
}

/// Add an empty historical band.
pub fn cmd_band_add(path: &Path, backend: Backend) -> Result<(), CliError> {
    let mut session = load_or_create_session(path, backend)?;
    let id = session.add_historical_band();
    save_session(&session, path, backend)?;
    println!("Added historical band {id}");
    Ok(())
}

/// Set the proposed-band count (clamped 1-10).
pub fn cmd_band_count(path: &Path, backend: Backend, count: usize) -> Result<(), CliError> {
    let mut session = load_or_create_session(path, backend)?;
    session.set_band_count(count);
    save_session(&session, path, backend)?;
    println!("Proposed bands: {}", session.state().band_count);
    Ok(())
}

/// Assign a member to a band slot.
pub fn cmd_assign(
    path: &Path,
    backend: Backend,
    band: u64,
    role: &str,
    member: u64,
) -> Result<(), CliError> {
    let role = parse_role(role)?;
    let mut session = load_or_create_session(path, backend)?;
    session.fill_slot(BandId(band), role, MemberId(member))?;
    save_session(&session, path, backend)?;
    println!("Assigned m{member} to {role} of b{band}");
    Ok(())
}

/// Empty a band slot.
pub fn cmd_clear(path: &Path, backend: Backend, band: u64, role: &str) -> Result<(), CliError> {
    let role = parse_role(role)?;
    let mut session = load_or_create_session(path, backend)?;
    let removed = session.clear_slot(BandId(band), role)?;
    save_session(&session, path, backend)?;
    match removed {
        Some(member) => println!("Cleared {member} from {role} of b{band}"),
        None => println!("Slot {role} of b{band} was already empty"),
    }
    Ok(())
}

/// Move/exchange between two slots.
pub fn cmd_swap(
    path: &Path,
    backend: Backend,
    from_band: u64,
    from_role: &str,
    to_band: u64,
    to_role: &str,
) -> Result<(), CliError> {
    let from = (BandId(from_band), parse_role(from_role)?);
    let to = (BandId(to_band), parse_role(to_role)?);
    let mut session = load_or_create_session(path, backend)?;
    let outcome = session.swap_slots(from, to)?;
    save_session(&session, path, backend)?;
    println!("Swap result: {outcome:?}");
    Ok(())
}

/// Run the engine and print the full report.
pub fn cmd_analyze(path: &Path, backend: Backend) -> Result<(), CliError> {
    let session = load_or_create_session(path, backend)?;
    let report = session.analyze();
    print!("{}", render_report(&session, &report));
    Ok(())
}

/// Export the full state bundle as JSON.
pub fn cmd_export(path: &Path, backend: Backend, output: &Path) -> Result<(), CliError> {
    let session = load_or_create_session(path, backend)?;
    let json = serde_json::to_string_pretty(&session.snapshot())?;
    std::fs::write(output, json)?;
    println!("Exported to {}", output.display());
    Ok(())
}

/// Import a JSON state bundle, replacing the current state wholesale.
///
/// A malformed document fails before anything is touched: the existing
/// database stays as it was.
pub fn cmd_import(path: &Path, backend: Backend, input: &Path) -> Result<(), CliError> {
    let json = std::fs::read_to_string(input)?;
    let snapshot: Snapshot = serde_json::from_str(&json)?;

    let mut session = load_or_create_session(path, backend)?;
    session.replace_state(snapshot);
    save_session(&session, path, backend)?;
    println!(
        "Imported {} members, {} bands",
        session.state().members.len(),
        session.state().new_bands.len()
    );
    Ok(())
}

/// Update policy settings. Out-of-range values are clamped, not rejected.
pub fn cmd_settings(
    path: &Path,
    backend: Backend,
    allow_concurrent: Option<bool>,
    min_level: Option<u8>,
    max_assignments: Option<u8>,
    collision_threshold: Option<u8>,
) -> Result<(), CliError> {
    let mut session = load_or_create_session(path, backend)?;
    let current = session.policy();
    let policy = Policy::new(
        allow_concurrent.unwrap_or(current.allow_concurrent),
        min_level.unwrap_or(current.concurrent_min_level),
        max_assignments.unwrap_or(current.max_assignments),
        collision_threshold.unwrap_or(current.min_collision_threshold),
    );
    session.set_policy(policy);
    save_session(&session, path, backend)?;
    println!("Policy: {:?}", session.policy());
    Ok(())
}

// =============================================================================
// HELPERS
// =============================================================================

fn parse_role(label: &str) -> Result<Role, CliError> {
    Role::parse_label(label)
        .ok_or_else(|| CliError::Invalid(format!("unknown role label: {label}")))
}

fn parse_skill_spec(spec: &str) -> Result<(Role, u8), CliError> {
    let Some((label, level)) = spec.split_once('=') else {
        return Err(CliError::Invalid(format!(
            "bad skill spec '{spec}' (expected Role=level)"
        )));
    };
    let role = parse_role(label)?;
    let level: u8 = level
        .trim()
        .parse()
        .map_err(|_| CliError::Invalid(format!("bad skill level in '{spec}'")))?;
    Ok((role, level))
}

/// Render the analysis report as plain text.
#[must_use]
pub fn render_report(session: &Session, report: &Report) -> String {
    let state = session.state();
    let member_name = |id: MemberId| {
        state
            .member(id)
            .map_or_else(|| id.to_string(), |member| member.name.clone())
    };
    let band_label = |id: BandId| {
        state
            .band(id)
            .and_then(|band| band.meta.as_ref())
            .map_or_else(|| id.to_string(), |meta| meta.name.clone())
    };

    let mut out = String::new();

    out.push_str("CONFLICTS\n");
    if report.conflicts.is_empty() {
        out.push_str("  (none)\n");
    } else {
        for (member, records) in &report.conflicts {
            out.push_str(&format!("  {}:\n", member_name(*member)));
            for conflict in records {
                out.push_str(&format!(
                    "    {} in {}: {} (with {})\n",
                    conflict.role,
                    band_label(conflict.band),
                    conflict.reason.describe(),
                    band_label(conflict.other_band),
                ));
            }
        }
    }

    out.push_str("COLLISIONS\n");
    if report.collisions.is_empty() {
        out.push_str("  (none)\n");
    } else {
        for (band, records) in &report.collisions {
            for collision in records {
                let names: Vec<String> = collision
                    .members
                    .iter()
                    .map(|member| member_name(*member))
                    .collect();
                out.push_str(&format!(
                    "  {} repeats {}: {}\n",
                    band_label(*band),
                    band_label(collision.historical_band),
                    names.join(", "),
                ));
            }
        }
    }

    out.push_str("BANDS\n");
    for band in &state.new_bands {
        let metrics = report.metrics_for(band.id);
        out.push_str(&format!(
            "  {}: {} filled, {} duplicated, skill gap {}\n",
            band.id,
            band.filled_slots(),
            metrics.duplicate_count,
            metrics.skill_gap,
        ));
    }

    out
}
