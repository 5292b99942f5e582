use super::fallback::{self, FallbackSpec};
use super::grid::{self, GridSpec};
use crate::page::Page;
use crate::record::{RawRecord, RecordKind};

const GRID: GridSpec = GridSpec {
    header_text: "Subject",
    min_cells: 5,
    columns: &[
        (0, "subject"),
        (1, "dueDate"),
        (2, "status"),
        (3, "priority"),
        (4, "assignedTo"),
        (5, "relatedTo"),
    ],
    skip_first_cell: &[],
};

const FALLBACK: FallbackSpec = FallbackSpec {
    kind: RecordKind::Tasks,
    name_field: "subject",
    context_fields: &[
        ("dueDate", "dueDate"),
        ("status", "status"),
        ("priority", "priority"),
        ("relatedTo", "relatedTo"),
        ("assignedTo", "owner"),
    ],
    reject_prefixes: &[],
};

pub fn extract(page: &Page) -> Vec<RawRecord> {
    let rows = grid::extract(page, &GRID);
    if !rows.is_empty() {
        return rows;
    }
    fallback::extract(page, &FALLBACK)
}

// ── Tests ──
