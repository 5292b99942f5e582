use serde::Serialize;
use thiserror::Error;
use tracing::{error, info};

use crate::detect;
use crate::extract;
use crate::page::Page;
use crate::record::{RawRecord, RecordKind};
use crate::service::StoreHandle;

/// Every failure mode is a structured, user-facing result; none is
/// fatal and none touches previously persisted state.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractError {
    #[error("unknown object type")]
    UnknownObjectType,
    #[error("no data found")]
    NoDataFound,
    #[error("storage failed: {0}")]
    StorageFailed(String),
    #[error("channel unavailable")]
    ChannelUnavailable,
}

#[derive(Debug, Serialize)]
pub struct ExtractOutcome {
    pub success: bool,
    pub count: usize,
    #[serde(rename = "objectType")]
    pub object_type: RecordKind,
}

/// Classify the page and run the matching extractor, without touching
/// the store. Detail pages route to the detail-view extractor, list
/// pages to the kind's tiered extractor.
pub fn extract_page(page: &Page) -> Result<(RecordKind, Vec<RawRecord>), ExtractError> {
    let kind = detect::detect(page).ok_or(ExtractError::UnknownObjectType)?;

    let records = if detect::is_detail_page(page.url()) {
        extract::detail::extract_detail(page).into_iter().collect()
    } else {
        extract::extract(kind, page)
    };

    if records.is_empty() {
        return Err(ExtractError::NoDataFound);
    }
    Ok((kind, records))
}

/// Full extraction pass: classify, extract, ship the batch over the
/// channel to the merge store, report the stored count.
pub async fn run(page: &Page, store: &StoreHandle) -> Result<ExtractOutcome, ExtractError> {
    let (kind, records) = match extract_page(page) {
        Ok(found) => found,
        Err(e) => {
            error!(url = page.url(), "extraction failed: {e}");
            return Err(e);
        }
    };
    info!(kind = %kind, found = records.len(), "extracting");
    deliver(kind, records, store).await
}

/// Ship an extracted batch to the store and translate the reply.
pub async fn deliver(
    kind: RecordKind,
    records: Vec<RawRecord>,
    store: &StoreHandle,
) -> Result<ExtractOutcome, ExtractError> {
    let reply = store
        .extract_data(kind, records)
        .await
        .map_err(|_| ExtractError::ChannelUnavailable)?;

    if !reply.success {
        error!(kind = %kind, "store rejected batch: {}", reply.message);
        return Err(ExtractError::StorageFailed(reply.message));
    }

    info!(kind = %kind, stored = reply.count, "extraction complete");
    Ok(ExtractOutcome {
        success: true,
        count: reply.count,
        object_type: kind,
    })
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service;
    use crate::store;
    use rusqlite::Connection;

    fn store_handle() -> StoreHandle {
        let conn = Connection::open_in_memory().unwrap();
        store::init_schema(&conn).unwrap();
        service::spawn(conn)
    }

    #[test]
    fn unclassifiable_page_fails() {
        let page = Page::parse(
            "<html><head><title>Home | Dashboard</title></head><body></body></html>",
            "https://example.com/lightning/page/home",
        );
        assert_eq!(
            extract_page(&page).unwrap_err(),
            ExtractError::UnknownObjectType
        );
    }

    #[test]
    fn empty_page_of_known_kind_fails() {
        let page = Page::parse(
            "<html><head><title>Leads | Salesforce</title></head><body></body></html>",
            "https://example.my.salesforce.com/lightning/o/Lead/list",
        );
        assert_eq!(extract_page(&page).unwrap_err(), ExtractError::NoDataFound);
    }

    #[test]
    fn detail_url_routes_to_detail_extractor() {
        let html = "<html><body>\
            <div data-qa=\"record-field\"><label>Account Name</label>\
            <span class=\"field-value\">Acme Corp</span></div>\
            <div data-qa=\"record-field\"><label>Industry</label>\
            <span class=\"field-value\">Manufacturing</span></div>\
            </body></html>";
        let page = Page::parse(
            html,
            "https://example.my.salesforce.com/lightning/r/Account/0015f000003AbCdEFG/view",
        );
        let (kind, records) = extract_page(&page).unwrap();
        assert_eq!(kind, RecordKind::Accounts);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("accountName"), Some("Acme Corp"));
    }

    #[tokio::test]
    async fn end_to_end_list_extraction() {
        let html = std::fs::read_to_string("tests/fixtures/leads_list.html").unwrap();
        let page = Page::parse(
            &html,
            "https://example.my.salesforce.com/lightning/o/Lead/list",
        );
        let handle = store_handle();

        let outcome = run(&page, &handle).await.unwrap();
        assert!(outcome.success);
        assert_eq!(outcome.object_type, RecordKind::Leads);
        assert_eq!(outcome.count, 2);

        let root = handle.get_data().await.unwrap();
        assert_eq!(root.leads.len(), 2);
        assert!(root.last_sync.contains_key(&RecordKind::Leads));
    }
}
