use super::fallback::{self, FallbackSpec};
use super::grid::{self, GridSpec};
use crate::page::Page;
use crate::record::{RawRecord, RecordKind};

const GRID: GridSpec = GridSpec {
    header_text: "Account Name",
    min_cells: 4,
    columns: &[
        (0, "accountName"),
        (1, "industry"),
        (2, "phone"),
        (3, "website"),
        (4, "type"),
        (5, "accountOwner"),
        (6, "annualRevenue"),
    ],
    skip_first_cell: &[],
};

const FALLBACK: FallbackSpec = FallbackSpec {
    kind: RecordKind::Accounts,
    name_field: "accountName",
    context_fields: &[
        ("website", "website"),
        ("phone", "phone"),
        ("industry", "industry"),
        ("accountOwner", "owner"),
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_slot_mapping() {
        let html = "<div role=\"row\" data-record-id=\"0015f000003AbCdEFG\">\
            <span role=\"gridcell\">Acme Corp</span>\
            <span role=\"gridcell\">Manufacturing</span>\
            <span role=\"gridcell\">555-000-1000</span>\
            <span role=\"gridcell\">acme.example</span>\
            <span role=\"gridcell\">Customer</span>\
            <span role=\"gridcell\">Dana Field</span>\
            <span role=\"gridcell\">$12,000,000</span>\
            </div>";
        let page = Page::parse(html, "");
        let accounts = extract(&page);
        assert_eq!(accounts.len(), 1);
        let rec = &accounts[0];
        assert_eq!(rec.get("accountName"), Some("Acme Corp"));
        assert_eq!(rec.get("industry"), Some("Manufacturing"));
        assert_eq!(rec.get("type"), Some("Customer"));
        assert_eq!(rec.get("annualRevenue"), Some("$12,000,000"));
    }

    #[test]
    fn header_row_guard_uses_account_name() {
        let html = "<div role=\"row\" data-record-id=\"0015f000003AbCdEFG\">\
            <span role=\"gridcell\">Account Name</span>\
            <span role=\"gridcell\">Industry</span>\
            <span role=\"gridcell\">Phone</span>\
            <span role=\"gridcell\">Website</span>\
            </div>";
        let page = Page::parse(html, "");
        assert!(extract(&page).is_empty());
    }

    #[test]
    fn fallback_owner_from_context() {
        let html = "<div>\
            <a href=\"/lightning/r/Account/0015f000003AbCdEFG/view\">Globex</a>\
            <span>Owner: Sarah Lee</span>\
            <span>555-444-9000</span>\
            </div>";
        let page = Page::parse(html, "");
        let accounts = extract(&page);
        assert_eq!(accounts.len(), 1);
        assert_eq!(accounts[0].get("accountOwner"), Some("Sarah Lee"));
        assert_eq!(accounts[0].get("phone"), Some("555-444-9000"));
    }
}
