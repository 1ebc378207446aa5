//! Page walking over Mayan's paginated collection endpoints.
//!
//! Collections answer with `{"count", "next", "previous", "results"}` where
//! `next` is an absolute URL or `null` on the last page.

use std::future::Future;

use serde::Deserialize;

use super::error::ClientError;

/// One page of a collection response.
#[derive(Debug, Clone, Deserialize)]
pub struct Page<T> {
    /// Total number of records across every page, when reported.
    #[serde(default)]
    pub count: Option<u64>,
    /// Absolute URL of the following page.
    #[serde(default)]
    pub next: Option<String>,
    /// Records on this page.
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
}

/// Location of a page to fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageLink {
    /// Path relative to the API base, e.g. `metadata_types/`.
    Path(String),
    /// Absolute URL taken from a previous page's `next` field.
    Url(String),
}

/// Walk pages until `predicate` matches a record.
///
/// Returns `Ok(None)` when every page was visited without a match. Pages
/// after the one holding the match are never requested.
pub async fn find_in_pages<T, F, Fut, P>(
    first: PageLink,
    mut fetch: F,
    mut predicate: P,
) -> Result<Option<T>, ClientError>
where
    F: FnMut(PageLink) -> Fut,
    Fut: Future<Output = Result<Page<T>, ClientError>>,
    P: FnMut(&T) -> bool,
{
    let mut link = Some(first);
    while let Some(current) = link.take() {
        let page = fetch(current).await?;
        if let Some(found) = page.results.into_iter().find(|item| predicate(item)) {
            return Ok(Some(found));
        }
        link = page.next.map(PageLink::Url);
    }
    Ok(None)
}

/// Walk every page and gather all records in server order.
pub async fn collect_pages<T, F, Fut>(first: PageLink, mut fetch: F) -> Result<Vec<T>, ClientError>
where
    F: FnMut(PageLink) -> Fut,
    Fut: Future<Output = Result<Page<T>, ClientError>>,
{
    let mut records = Vec::new();
    let mut link = Some(first);
    while let Some(current) = link.take() {
        let page = fetch(current).await?;
        records.extend(page.results);
        link = page.next.map(PageLink::Url);
    }
    Ok(records)
}
