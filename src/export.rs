use anyhow::Result;
use serde_json::Value;

use crate::record::{RawRecord, RecordKind};
use crate::store::StorageRoot;

/// The StorageRoot serialized verbatim, indented — the JSON export is
/// the persisted shape, nothing reformatted.
pub fn to_json(root: &StorageRoot) -> Result<String> {
    Ok(serde_json::to_string_pretty(root)?)
}

/// One section per non-empty kind: uppercased banner, header row from
/// the first record's field names, then one quoted row per record.
/// Sync state is view metadata, not record data, and is excluded.
pub fn to_csv(root: &StorageRoot) -> String {
    let mut out = String::new();

    for kind in RecordKind::ALL {
        let records = root.collection(kind);
        if records.is_empty() {
            continue;
        }

        out.push('\n');
        out.push_str(&kind.as_str().to_uppercase());
        out.push('\n');

        let headers: Vec<&str> = records[0].field_names().collect();
        out.push_str(&headers.join(","));
        out.push('\n');

        for record in records {
            let row: Vec<String> = headers.iter().map(|h| csv_cell(record, h)).collect();
            out.push_str(&row.join(","));
            out.push('\n');
        }
    }

    out
}

fn csv_cell(record: &RawRecord, field: &str) -> String {
    match record.value(field) {
        Some(Value::String(s)) => format!("\"{}\"", s.replace('"', "\"\"")),
        Some(Value::Number(n)) => n.to_string(),
        Some(other) => format!("\"{}\"", other.to_string().replace('"', "\"\"")),
        None => String::new(),
    }
}

// ── Tests ──
