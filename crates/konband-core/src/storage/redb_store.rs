//! redb-backed session store.
//!
//! A single key-value table holds the session under fixed string keys,
//! one postcard-encoded blob per part. The policy settings live under
//! one key as a single opaque blob. Writes happen in one transaction,
//! so a crash never leaves a half-saved session.

use crate::error::{StoreError, StoreResult};
use crate::model::{AppState, Band, Member};
use crate::policy::Policy;
use crate::session::Session;
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition, TableError};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;

const STATE_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("state");

const KEY_MEMBERS: &str = "members";
const KEY_BANDS: &str = "bands";
const KEY_CURRENT_BANDS: &str = "current_bands";
const KEY_BAND_COUNT: &str = "band_count";
const KEY_SETTINGS: &str = "settings";

/// Session store backed by a redb database file.
pub struct RedbStore {
    db: Database,
}

impl RedbStore {
    /// Create a new database file, replacing nothing that exists.
    pub fn create(path: impl AsRef<Path>) -> StoreResult<Self> {
        let db = Database::create(path).map_err(redb::Error::from)?;
        Ok(Self { db })
    }

    /// Open an existing database file.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let db = Database::open(path).map_err(redb::Error::from)?;
        Ok(Self { db })
    }

    /// Persist the full session in one transaction.
    pub fn save(&self, session: &Session) -> StoreResult<()> {
        let state = session.state();
        let tx = self.db.begin_write().map_err(redb::Error::from)?;
        {
            let mut table = tx.open_table(STATE_TABLE).map_err(redb::Error::from)?;
            let members: Vec<&Member> = state.members.values().collect();
            put(&mut table, KEY_MEMBERS, &members)?;
            put(&mut table, KEY_BANDS, &state.new_bands)?;
            put(&mut table, KEY_CURRENT_BANDS, &state.historical_bands)?;
            put(&mut table, KEY_BAND_COUNT, &state.band_count)?;
            put(&mut table, KEY_SETTINGS, &session.policy())?;
        }
        tx.commit().map_err(redb::Error::from)?;
        Ok(())
    }

    /// Load the session, or a fresh one when nothing was saved yet.
    pub fn load(&self) -> StoreResult<Session> {
        let tx = self.db.begin_read().map_err(redb::Error::from)?;
        let table = match tx.open_table(STATE_TABLE) {
            Ok(table) => table,
            Err(TableError::TableDoesNotExist(_)) => return Ok(Session::new()),
            Err(err) => return Err(StoreError::Database(redb::Error::from(err))),
        };

        let members: Vec<Member> = get(&table, KEY_MEMBERS)?.unwrap_or_default();
        let bands: Vec<Band> = get(&table, KEY_BANDS)?.unwrap_or_default();
        let historical: Vec<Band> = get(&table, KEY_CURRENT_BANDS)?.unwrap_or_default();
        let band_count: usize =
            get(&table, KEY_BAND_COUNT)?.unwrap_or(crate::model::DEFAULT_BAND_COUNT);
        let policy: Policy = get(&table, KEY_SETTINGS)?.unwrap_or_default();

        let state = AppState::from_parts(members, bands, historical, band_count);
        Ok(Session::from_parts(state, policy))
    }
}

fn put<T: Serialize>(
    table: &mut redb::Table<'_, &str, &[u8]>,
    key: &str,
    value: &T,
) -> StoreResult<()> {
    let blob = postcard::to_allocvec(value)?;
    table
        .insert(key, blob.as_slice())
        .map_err(redb::Error::from)?;
    Ok(())
}

fn get<T: DeserializeOwned>(
    table: &impl ReadableTable<&'static str, &'static [u8]>,
    key: &str,
) -> StoreResult<Option<T>> {
    let Some(guard) = table.get(key).map_err(redb::Error::from)? else {
        return Ok(None);
    };
    Ok(Some(postcard::from_bytes(guard.value())?))
}

// =============================================================================
// TESTS
// =============================================================================
