use std::sync::LazyLock;

use scraper::Selector;

use super::fallback::{self, FallbackSpec};
use super::grid::{self, GridSpec};
use crate::page::{self, Page};
use crate::record::{self, RawRecord, RecordKind};

const GRID: GridSpec = GridSpec {
    header_text: "Opportunity Name",
    min_cells: 6,
    columns: &[
        (0, "opportunityName"),
        (1, "stage"),
        (2, "amount"),
        (3, "probability"),
        (4, "closeDate"),
        (5, "associatedAccount"),
        (6, "forecastCategory"),
        (7, "opportunityOwner"),
    ],
    skip_first_cell: &[],
};

const FALLBACK: FallbackSpec = FallbackSpec {
    kind: RecordKind::Opportunities,
    name_field: "opportunityName",
    context_fields: &[
        ("stage", "stage"),
        ("amount", "amount"),
        ("probability", "probability"),
        ("closeDate", "closeDate"),
        ("opportunityOwner", "owner"),
        ("associatedAccount", "account"),
    ],
    reject_prefixes: &[],
};

static CARD_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("[data-qa='kanban-card']").unwrap());

/// Card sub-element → record field, by the board's data-qa scheme.
static CARD_FIELDS: LazyLock<Vec<(&'static str, Selector)>> = LazyLock::new(|| {
    [
        ("opportunityName", "[data-qa='card-title']"),
        ("stage", "[data-qa='card-stage']"),
        ("amount", "[data-qa='card-amount']"),
        ("probability", "[data-qa='card-probability']"),
        ("closeDate", "[data-qa='card-close-date']"),
        ("forecastCategory", "[data-qa='card-forecast']"),
        ("opportunityOwner", "[data-qa='card-owner']"),
    ]
    .into_iter()
    .map(|(field, sel)| (field, Selector::parse(sel).unwrap()))
    .collect()
});

/// Opportunities carry an extra middle tier: the pipeline kanban
/// board, which has no grid rows at all.
pub fn extract(page: &Page) -> Vec<RawRecord> {
    let rows = grid::extract(page, &GRID);
    if !rows.is_empty() {
        return rows;
    }
    let cards = extract_cards(page);
    if !cards.is_empty() {
        return cards;
    }
    fallback::extract(page, &FALLBACK)
}

fn extract_cards(page: &Page) -> Vec<RawRecord> {
    let mut records = Vec::new();
    for card in page.select(&CARD_SEL) {
        let id = match card.value().attr("data-record-id") {
            Some(id) => id.to_string(),
            None => record::generated_id(),
        };
        let mut rec = RawRecord::with_id(&id);
        for (field, selector) in CARD_FIELDS.iter() {
            rec.set(field, &page::first_text(card, selector));
        }
        records.push(rec);
    }
    records
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn board() -> Page {
        let html = std::fs::read_to_string("tests/fixtures/opportunity_board.html").unwrap();
        Page::parse(
            &html,
            "https://example.my.salesforce.com/lightning/o/Opportunity/list?filterName=Pipeline",
        )
    }

    #[test]
    fn kanban_cards_extracted() {
        let opps = extract(&board());
        assert_eq!(opps.len(), 2);
        let first = &opps[0];
        assert_eq!(first.id(), "0065f000003AbCdEFG");
        assert_eq!(first.get("opportunityName"), Some("Acme - 200 Widgets"));
        assert_eq!(first.get("stage"), Some("Prospecting"));
        assert_eq!(first.get("amount"), Some("$120,000"));
        assert_eq!(first.get("probability"), Some("20%"));
        assert_eq!(first.get("closeDate"), Some("2026-09-30"));
        assert_eq!(first.get("forecastCategory"), Some("Pipeline"));
        assert_eq!(first.get("opportunityOwner"), Some("Dana Field"));
    }

    #[test]
    fn each_card_reads_its_own_stage() {
        let opps = extract(&board());
        assert_eq!(opps[0].get("stage"), Some("Prospecting"));
        assert_eq!(opps[1].get("stage"), Some("Negotiation"));
    }

    #[test]
    fn card_without_record_id_gets_placeholder() {
        let opps = extract(&board());
        assert!(opps[1].id().starts_with("extracted_"));
    }

    #[test]
    fn grid_rows_win_over_cards() {
        let html = "<div role=\"row\" data-record-id=\"0065f000003HiJkLMN\">\
            <span role=\"gridcell\">Initech Expansion</span>\
            <span role=\"gridcell\">Proposal</span>\
            <span role=\"gridcell\">$80,000</span>\
            <span role=\"gridcell\">60%</span>\
            <span role=\"gridcell\">2026-10-15</span>\
            <span role=\"gridcell\">Initech</span>\
            </div>\
            <div data-qa=\"kanban-card\" data-record-id=\"0065f000003AbCdEFG\">\
            <span data-qa=\"card-title\">Acme - 200 Widgets</span>\
            </div>";
        let page = Page::parse(html, "");
        let opps = extract(&page);
        assert_eq!(opps.len(), 1);
        assert_eq!(opps[0].get("opportunityName"), Some("Initech Expansion"));
        assert_eq!(opps[0].get("associatedAccount"), Some("Initech"));
    }

    #[test]
    fn link_scan_when_no_rows_or_cards() {
        let html = "<div>\
            <a href=\"/lightning/r/Opportunity/0065f000003OpQrSTU/view\">Globex Renewal</a>\
            <span>Stage: Negotiation</span>\
            <span>Owner: Dana Field</span>\
            </div>";
        let page = Page::parse(html, "");
        let opps = extract(&page);
        assert_eq!(opps.len(), 1);
        assert_eq!(opps[0].get("stage"), Some("Negotiation"));
        assert_eq!(opps[0].get("opportunityOwner"), Some("Dana Field"));
    }
}
