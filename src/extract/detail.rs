use std::sync::LazyLock;

use scraper::Selector;

use crate::page::{self, Page};
use crate::record::{self, RawRecord};

static FIELD_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("[data-qa*='field']").unwrap());
static LABEL_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("label").unwrap());
static VALUE_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("[class*='value']").unwrap());
static SPAN_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("span").unwrap());
static HEADING_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h1, [class*='title']").unwrap());

/// Label phrase → output field, ordered most-specific first. For each
/// field container the first matching entry claims the value, and a
/// field that is already populated is never overwritten — so a
/// generic phrase ("owner", "name") only applies when no more
/// specific phrase matched anywhere on the page.
const LABEL_TABLE: &[(&str, &str)] = &[
    ("opportunity name", "opportunityName"),
    ("account name", "accountName"),
    ("opportunity owner", "opportunityOwner"),
    ("account owner", "accountOwner"),
    ("contact owner", "contactOwner"),
    ("associated account", "associatedAccount"),
    ("forecast category", "forecastCategory"),
    ("annual revenue", "annualRevenue"),
    ("close date", "closeDate"),
    ("due date", "dueDate"),
    ("lead source", "leadSource"),
    ("mailing address", "mailingAddress"),
    ("related to", "relatedTo"),
    ("probability", "probability"),
    ("stage", "stage"),
    ("amount", "amount"),
    ("email", "email"),
    ("phone", "phone"),
    ("industry", "industry"),
    ("website", "website"),
    ("company", "company"),
    ("subject", "subject"),
    ("priority", "priority"),
    ("assigned", "assignedTo"),
    ("status", "status"),
    ("title", "title"),
    ("type", "type"),
    ("owner", "owner"),
    ("name", "name"),
];

/// Extract a single record from a non-list detail page by scanning
/// labeled field containers. Returns `None` when no name-equivalent
/// field can be determined — the page is not a recognizable detail
/// view.
pub fn extract_detail(page: &Page) -> Option<RawRecord> {
    let mut rec = RawRecord::new();

    for container in page.select(&FIELD_SEL) {
        let label = page::first_text(container, &LABEL_SEL).to_lowercase();
        if label.is_empty() {
            continue;
        }

        let mut value = page::first_text(container, &VALUE_SEL);
        if value.is_empty() {
            value = page::first_text(container, &SPAN_SEL);
        }
        if value.is_empty() {
            continue;
        }

        if label == "id" || label.contains("record id") {
            rec.set_if_absent("id", &value);
            continue;
        }

        if let Some((_, field)) = LABEL_TABLE.iter().find(|(phrase, _)| label.contains(phrase)) {
            rec.set_if_absent(field, &value);
        }
    }

    if !rec.contains("name")
        && !rec.contains("opportunityName")
        && !rec.contains("accountName")
    {
        let heading = page
            .select(&HEADING_SEL)
            .next()
            .map(page::text_of)
            .unwrap_or_default();
        rec.set("name", &heading);
    }

    if rec.display_name().is_empty() {
        return None;
    }
    if !rec.contains("id") {
        rec.set("id", &record::generated_id());
    }
    Some(rec)
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn field(label: &str, value: &str) -> String {
        format!(
            "<div data-qa=\"record-field\"><label>{label}</label>\
             <span class=\"field-value\">{value}</span></div>"
        )
    }

    #[test]
    fn specific_label_outranks_generic() {
        let html = format!(
            "{}{}{}",
            field("Account Name", "Acme Corp"),
            field("Account Owner", "Sarah Lee"),
            field("Owner", "Dana Field"),
        );
        let page = Page::parse(&html, "");
        let rec = extract_detail(&page).unwrap();
        // "Account Owner" populates only the specific field; the
        // generic container still lands in the generic field.
        assert_eq!(rec.get("accountOwner"), Some("Sarah Lee"));
        assert_eq!(rec.get("owner"), Some("Dana Field"));
        assert_eq!(rec.get("accountName"), Some("Acme Corp"));
        assert!(!rec.contains("name"));
    }

    #[test]
    fn opportunity_fields() {
        let html = format!(
            "{}{}{}{}",
            field("Opportunity Name", "Acme - 200 Widgets"),
            field("Stage", "Proposal"),
            field("Close Date", "2026-09-30"),
            field("Probability", "60%"),
        );
        let page = Page::parse(&html, "");
        let rec = extract_detail(&page).unwrap();
        assert_eq!(rec.get("opportunityName"), Some("Acme - 200 Widgets"));
        assert_eq!(rec.get("stage"), Some("Proposal"));
        assert_eq!(rec.get("closeDate"), Some("2026-09-30"));
        assert_eq!(rec.get("probability"), Some("60%"));
        assert!(rec.id().starts_with("extracted_"));
    }

    #[test]
    fn id_label_claims_record_id() {
        let html = format!(
            "{}{}",
            field("ID", "00Q5f000003AbCdEFG"),
            field("Name", "Amy Daniels"),
        );
        let page = Page::parse(&html, "");
        let rec = extract_detail(&page).unwrap();
        assert_eq!(rec.id(), "00Q5f000003AbCdEFG");
    }

    #[test]
    fn heading_fallback_supplies_name() {
        let html = format!(
            "<h1>Globex Renewal</h1>{}",
            field("Stage", "Negotiation"),
        );
        let page = Page::parse(&html, "");
        let rec = extract_detail(&page).unwrap();
        assert_eq!(rec.get("name"), Some("Globex Renewal"));
    }

    #[test]
    fn unrecognizable_page_is_none() {
        let page = Page::parse("<div><p>nothing labeled here</p></div>", "");
        assert!(extract_detail(&page).is_none());
    }
}
