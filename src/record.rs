use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The five record kinds the source CRM exposes. Order is the fixed
/// detection priority and the section order of exports.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Leads,
    Contacts,
    Accounts,
    Opportunities,
    Tasks,
}

impl RecordKind {
    pub const ALL: [RecordKind; 5] = [
        RecordKind::Leads,
        RecordKind::Contacts,
        RecordKind::Accounts,
        RecordKind::Opportunities,
        RecordKind::Tasks,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Leads => "leads",
            RecordKind::Contacts => "contacts",
            RecordKind::Accounts => "accounts",
            RecordKind::Opportunities => "opportunities",
            RecordKind::Tasks => "tasks",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// One extracted record: an insertion-ordered map from field name to
/// scalar value, carrying at least an `id` field. Extractors insert
/// only non-empty values, so an absent field means "unknown" and is
/// preserved by the merge store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRecord(Map<String, Value>);

impl RawRecord {
    pub fn new() -> Self {
        RawRecord(Map::new())
    }

    pub fn with_id(id: &str) -> Self {
        let mut rec = RawRecord::new();
        rec.0.insert("id".to_string(), Value::String(id.to_string()));
        rec
    }

    pub fn id(&self) -> &str {
        self.0.get("id").and_then(Value::as_str).unwrap_or("")
    }

    /// Insert a string field, skipping empty values.
    pub fn set(&mut self, field: &str, value: &str) {
        let value = value.trim();
        if !value.is_empty() {
            self.0
                .insert(field.to_string(), Value::String(value.to_string()));
        }
    }

    /// Insert a string field only when not already populated.
    pub fn set_if_absent(&mut self, field: &str, value: &str) {
        if !self.0.contains_key(field) {
            self.set(field, value);
        }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).and_then(Value::as_str)
    }

    pub fn value(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Non-empty fields besides `id`. The merge store only accepts
    /// records where this is strictly greater than one.
    pub fn data_field_count(&self) -> usize {
        self.0
            .iter()
            .filter(|(k, _)| k.as_str() != "id")
            .filter(|(_, v)| match v {
                Value::String(s) => !s.trim().is_empty(),
                Value::Null => false,
                _ => true,
            })
            .count()
    }

    /// Shallow merge: incoming fields win, fields absent from the
    /// incoming record keep their stored value.
    pub fn merge_from(&mut self, incoming: &RawRecord) {
        for (field, value) in &incoming.0 {
            self.0.insert(field.clone(), value.clone());
        }
    }

    /// Best name-equivalent field for display purposes.
    pub fn display_name(&self) -> &str {
        ["name", "opportunityName", "accountName", "subject"]
            .iter()
            .find_map(|f| self.get(f))
            .unwrap_or("")
    }
}

static NEXT_PLACEHOLDER: AtomicU64 = AtomicU64::new(0);

/// Placeholder id for records whose markup carries no identifier
/// (kanban cards, detail views). Process-unique via the counter.
pub fn generated_id() -> String {
    let n = NEXT_PLACEHOLDER.fetch_add(1, Ordering::Relaxed);
    format!("extracted_{}_{}", Utc::now().timestamp_millis(), n)
}

// ── Tests ──
