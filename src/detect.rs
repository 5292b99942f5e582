use crate::page::Page;
use crate::record::RecordKind;

/// Kind → object name as it appears in Lightning URL path segments
/// (`/lightning/o/<Object>/` for lists, `/lightning/r/<Object>/` for
/// record pages). Adding a kind is a one-line edit here.
const OBJECT_NAMES: &[(RecordKind, &str)] = &[
    (RecordKind::Leads, "Lead"),
    (RecordKind::Contacts, "Contact"),
    (RecordKind::Accounts, "Account"),
    (RecordKind::Opportunities, "Opportunity"),
    (RecordKind::Tasks, "Task"),
];

/// Classify the page, path markers first, title substrings second,
/// both probed in fixed priority order. Path always wins over title.
pub fn detect(page: &Page) -> Option<RecordKind> {
    let url = page.url();
    for (kind, object) in OBJECT_NAMES {
        if url.contains(&format!("/lightning/o/{object}/"))
            || url.contains(&format!("/lightning/r/{object}/"))
        {
            return Some(*kind);
        }
    }

    let title = page.title().to_lowercase();
    for (kind, object) in OBJECT_NAMES {
        if title.contains(&object.to_lowercase()) {
            return Some(*kind);
        }
    }

    None
}

/// Record pages live under `/lightning/r/`; these route to the
/// detail-view extractor instead of the list extractors.
pub fn is_detail_page(url: &str) -> bool {
    url.contains("/lightning/r/")
}

// ── Tests ──
