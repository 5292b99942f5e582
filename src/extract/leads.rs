use super::fallback::{self, FallbackSpec};
use super::grid::{self, GridSpec};
use crate::page::Page;
use crate::record::{RawRecord, RecordKind};

const GRID: GridSpec = GridSpec {
    header_text: "Name",
    min_cells: 5,
    columns: &[
        (0, "name"),
        (1, "company"),
        (2, "email"),
        (3, "phone"),
        (4, "status"),
        (5, "leadSource"),
        (6, "owner"),
    ],
    // Org-name banner rows surface in the grid of developer sandboxes.
    skip_first_cell: &["Developer Edition"],
};

const FALLBACK: FallbackSpec = FallbackSpec {
    kind: RecordKind::Leads,
    name_field: "name",
    context_fields: &[
        ("company", "company"),
        ("email", "email"),
        ("phone", "phone"),
        ("status", "status"),
        ("leadSource", "source"),
        ("owner", "owner"),
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
