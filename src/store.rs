use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::record::{RawRecord, RecordKind};

pub const DEFAULT_DB_PATH: &str = "data/crm.sqlite";

/// Well-known key of the single root entry in the kv area.
const ROOT_KEY: &str = "crm_data";

/// The sole persisted artifact: one collection per record kind plus
/// per-kind last-sync timestamps. Serialized as a whole under
/// `ROOT_KEY`; every mutation is a full-root read-modify-write.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageRoot {
    pub leads: Vec<RawRecord>,
    pub contacts: Vec<RawRecord>,
    pub accounts: Vec<RawRecord>,
    pub opportunities: Vec<RawRecord>,
    pub tasks: Vec<RawRecord>,
    #[serde(rename = "lastSync")]
    pub last_sync: BTreeMap<RecordKind, DateTime<Utc>>,
}

impl StorageRoot {
    pub fn collection(&self, kind: RecordKind) -> &Vec<RawRecord> {
        match kind {
            RecordKind::Leads => &self.leads,
            RecordKind::Contacts => &self.contacts,
            RecordKind::Accounts => &self.accounts,
            RecordKind::Opportunities => &self.opportunities,
            RecordKind::Tasks => &self.tasks,
        }
    }

    pub fn collection_mut(&mut self, kind: RecordKind) -> &mut Vec<RawRecord> {
        match kind {
            RecordKind::Leads => &mut self.leads,
            RecordKind::Contacts => &mut self.contacts,
            RecordKind::Accounts => &mut self.accounts,
            RecordKind::Opportunities => &mut self.opportunities,
            RecordKind::Tasks => &mut self.tasks,
        }
    }

    pub fn is_empty(&self) -> bool {
        RecordKind::ALL.iter().all(|k| self.collection(*k).is_empty())
    }
}

pub fn connect(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
    }
    let conn = Connection::open(path)
        .with_context(|| format!("failed to open store at {}", path.display()))?;
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS kv (
            key   TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );",
    )?;
    Ok(())
}

pub fn load(conn: &Connection) -> Result<StorageRoot> {
    let json: Option<String> = conn
        .query_row("SELECT value FROM kv WHERE key = ?1", [ROOT_KEY], |row| {
            row.get(0)
        })
        .optional()?;
    match json {
        Some(json) => serde_json::from_str(&json).context("corrupt storage root"),
        None => Ok(StorageRoot::default()),
    }
}

fn save(conn: &Connection, root: &StorageRoot) -> Result<()> {
    let json = serde_json::to_string(root)?;
    conn.execute(
        "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
        rusqlite::params![ROOT_KEY, json],
    )?;
    Ok(())
}

/// Merge a batch into one kind's collection. Near-empty records (one
/// or fewer populated fields besides `id`) are filtered out first;
/// survivors upsert by id — existing records are shallow-merged in
/// place, new ones appended. Returns the number of records that
/// passed the filter, inserts and updates alike.
pub fn merge(conn: &Connection, kind: RecordKind, batch: Vec<RawRecord>) -> Result<usize> {
    let accepted: Vec<RawRecord> = batch
        .into_iter()
        .filter(|r| r.data_field_count() > 1)
        .collect();
    if accepted.is_empty() {
        return Ok(0);
    }

    let tx = conn.unchecked_transaction()?;
    let mut root = load(&tx)?;
    {
        let collection = root.collection_mut(kind);
        for incoming in &accepted {
            match collection.iter_mut().find(|r| r.id() == incoming.id()) {
                Some(existing) => existing.merge_from(incoming),
                None => collection.push(incoming.clone()),
            }
        }
    }
    root.last_sync.insert(kind, Utc::now());
    save(&tx, &root)?;
    tx.commit()?;

    info!(kind = %kind, accepted = accepted.len(), "merged batch");
    Ok(accepted.len())
}

/// Remove one record by id. Missing ids are a no-op, not an error.
pub fn delete_record(conn: &Connection, kind: RecordKind, id: &str) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    let mut root = load(&tx)?;
    root.collection_mut(kind).retain(|r| r.id() != id);
    save(&tx, &root)?;
    tx.commit()?;
    Ok(())
}

/// Reset every collection and the sync state in one atomic write.
pub fn clear_all(conn: &Connection) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    save(&tx, &StorageRoot::default())?;
    tx.commit()?;
    info!("store cleared");
    Ok(())
}

// ── Tests ──
