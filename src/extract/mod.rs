pub mod accounts;
pub mod contacts;
pub mod detail;
pub mod fallback;
pub mod grid;
pub mod leads;
pub mod opportunities;
pub mod tasks;

use crate::page::Page;
use crate::record::{RawRecord, RecordKind};

/// Dispatch to the list extractor for the detected kind. Each
/// extractor applies its tiers in strict order and stops at the first
/// tier that yields any record — tiers are never mixed.
pub fn extract(kind: RecordKind, page: &Page) -> Vec<RawRecord> {
    match kind {
        RecordKind::Leads => leads::extract(page),
        RecordKind::Contacts => contacts::extract(page),
        RecordKind::Accounts => accounts::extract(page),
        RecordKind::Opportunities => opportunities::extract(page),
        RecordKind::Tasks => tasks::extract(page),
    }
}
