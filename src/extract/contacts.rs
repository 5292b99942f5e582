use super::fallback::{self, FallbackSpec};
use super::grid::{self, GridSpec};
use crate::page::Page;
use crate::record::{RawRecord, RecordKind};

const GRID: GridSpec = GridSpec {
    header_text: "Name",
    min_cells: 5,
    columns: &[
        (0, "name"),
        (1, "email"),
        (2, "phone"),
        (3, "accountName"),
        (4, "title"),
        (5, "contactOwner"),
        (6, "mailingAddress"),
    ],
    skip_first_cell: &[],
};

const FALLBACK: FallbackSpec = FallbackSpec {
    kind: RecordKind::Contacts,
    name_field: "name",
    context_fields: &[
        ("email", "email"),
        ("phone", "phone"),
        ("accountName", "company"),
        ("title", "title"),
        ("contactOwner", "owner"),
    ],
    reject_prefixes: &["Mr."],
};

pub fn extract(page: &Page) -> Vec<RawRecord> {
    let rows = grid::extract(page, &GRID);
    if !rows.is_empty() {
        return rows;
    }
    fallback::extract(page, &FALLBACK)
}

// ── Tests ──
