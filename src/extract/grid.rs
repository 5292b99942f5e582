use std::sync::LazyLock;

use scraper::Selector;

use crate::page::{self, Page};
use crate::record::RawRecord;

static ROW_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("[role='row']").unwrap());
static CELL_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("[role='gridcell']").unwrap());

/// Fixed positional layout of one kind's list grid.
pub struct GridSpec {
    /// First-cell text of the column header row, skipped as data.
    pub header_text: &'static str,
    /// Rows with fewer cells than this are ignored.
    pub min_cells: usize,
    /// Cell slot → record field. Slots at or beyond `min_cells` are
    /// optional and silently absent on narrower rows.
    pub columns: &'static [(usize, &'static str)],
    /// Extra first-cell guards beyond the header text.
    pub skip_first_cell: &'static [&'static str],
}

/// Tier 1: structured rows tagged with a record identifier. Rows
/// without the identifier attribute are chrome, not data.
pub fn extract(page: &Page, spec: &GridSpec) -> Vec<RawRecord> {
    let mut records = Vec::new();

    for row in page.select(&ROW_SEL) {
        let Some(record_id) = row.value().attr("data-record-id") else {
            continue;
        };

        let cells: Vec<String> = row.select(&CELL_SEL).map(page::text_of).collect();
        if cells.len() < spec.min_cells {
            continue;
        }

        let first = cells[0].trim();
        if first.is_empty()
            || first == spec.header_text
            || spec.skip_first_cell.contains(&first)
        {
            continue;
        }

        let mut record = RawRecord::with_id(record_id);
        for &(slot, field) in spec.columns {
            if let Some(value) = cells.get(slot) {
                record.set(field, value);
            }
        }
        records.push(record);
    }

    records
}

// ── Tests ──
