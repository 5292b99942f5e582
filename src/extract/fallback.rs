use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use scraper::Selector;
use tracing::debug;

use crate::heuristics;
use crate::page::{self, Page};
use crate::record::{RawRecord, RecordKind};

static LINK_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").unwrap());

/// The source system's 18-character identifiers, embedded in link
/// paths, terminated by a separator or the end of the URL.
static RECORD_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/([A-Za-z0-9]{18})(?:[/?]|$)").unwrap());

/// Kind → three-character identifier prefix. The source system
/// encodes the object kind in the first three characters of its ids;
/// adding a kind is a one-line edit here.
pub const ID_PREFIXES: &[(RecordKind, &str)] = &[
    (RecordKind::Leads, "00Q"),
    (RecordKind::Contacts, "003"),
    (RecordKind::Accounts, "001"),
    (RecordKind::Opportunities, "006"),
    (RecordKind::Tasks, "00T"),
];

pub fn id_prefix(kind: RecordKind) -> &'static str {
    ID_PREFIXES
        .iter()
        .find(|(k, _)| *k == kind)
        .map(|(_, prefix)| *prefix)
        .expect("every kind has an id prefix")
}

/// How to populate one kind's records from noisy link surroundings.
pub struct FallbackSpec {
    pub kind: RecordKind,
    /// Field receiving the link's visible text.
    pub name_field: &'static str,
    /// Record field → heuristic field kind, run against the text of
    /// the link's nearest enclosing container.
    pub context_fields: &'static [(&'static str, &'static str)],
    /// Link texts starting with any of these are navigation, not
    /// record names.
    pub reject_prefixes: &'static [&'static str],
}

/// Tier 3: scan every hyperlink for ids carrying the kind's prefix.
/// Candidates are deduplicated by id within the pass; ids that fail
/// to parse are skipped per candidate, never an error — this tier
/// runs over heterogeneous markup by design.
pub fn extract(page: &Page, spec: &FallbackSpec) -> Vec<RawRecord> {
    let prefix = id_prefix(spec.kind);
    let mut seen: HashSet<String> = HashSet::new();
    let mut records = Vec::new();

    for link in page.select(&LINK_SEL) {
        let Some(href) = link.value().attr("href") else {
            continue;
        };
        if !href.contains(prefix) {
            continue;
        }

        let Some(caps) = RECORD_ID_RE.captures(href) else {
            debug!(href, "candidate link without a parseable record id");
            continue;
        };
        let record_id = caps[1].to_string();
        if !seen.insert(record_id.clone()) {
            continue;
        }

        let name = page::text_of(link);
        if name.len() < 2
            || name.contains("My")
            || spec.reject_prefixes.iter().any(|p| name.starts_with(p))
        {
            continue;
        }

        let context = page::closest_container(link)
            .map(page::text_of)
            .unwrap_or_default();

        let mut record = RawRecord::with_id(&record_id);
        record.set(spec.name_field, &name);
        for &(field, heuristic_kind) in spec.context_fields {
            record.set(field, &heuristics::extract_field(&context, heuristic_kind));
        }
        records.push(record);
    }

    records
}

// ── Tests ──
