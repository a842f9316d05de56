use tracing::{debug, info, warn};

use crate::config::DEFAULT_PAGE_SIZE;
use crate::fetcher::{Fetcher, RetryPolicy, Sleeper};
use crate::http_client::HttpTransport;

/// Upper bound on pages walked in one run, in case the upstream never
/// returns an empty page.
const MAX_PAGES: usize = 10_000;

#[derive(Debug, Clone)]
pub struct PaginationOptions {
    pub page_size: u32,
    /// Stop once this many ids are collected.
    pub max_matches: Option<usize>,
    pub policy: RetryPolicy,
}

impl Default for PaginationOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            max_matches: None,
            policy: RetryPolicy::pagination(),
        }
    }
}

/// Walks `start`/`count` pages of match ids at `url` until an empty page.
///
/// A terminal fetch failure or an undecodable page ends the walk and the ids
/// gathered so far are returned. Upstream order is preserved and nothing is
/// deduplicated.
pub fn collect_match_ids<T: HttpTransport, S: Sleeper>(
    fetcher: &Fetcher<T, S>,
    url: &str,
    api_key: &str,
    opts: &PaginationOptions,
) -> Vec<String> {
    let page_size = opts.page_size.max(1);
    let mut ids: Vec<String> = Vec::new();
    let mut offset: u64 = 0;

    info!("collecting match ids");
    for page_no in 1..=MAX_PAGES {
        let query = [
            ("start", offset.to_string()),
            ("count", page_size.to_string()),
            ("api_key", api_key.to_string()),
        ];
        let resp = match fetcher.fetch(url, &query, &opts.policy) {
            Ok(resp) => resp,
            Err(err) => {
                warn!(offset, error = %err, "match id pagination stopped early");
                return ids;
            }
        };
        fetcher.pace();

        let page: Vec<String> = match serde_json::from_slice(&resp.body) {
            Ok(page) => page,
            Err(err) => {
                warn!(offset, error = %err, "match id page is not a list of ids");
                return ids;
            }
        };
        if page.is_empty() {
            info!(total = ids.len(), "no more match ids");
            return ids;
        }

        let received = page.len();
        ids.extend(page);
        if let Some(limit) = opts.max_matches
            && ids.len() >= limit
        {
            ids.truncate(limit);
            info!(total = ids.len(), "match id limit reached");
            return ids;
        }
        debug!(page_no, received, total = ids.len(), "match id page");
        info!("{} new match ids (total = {})", received, ids.len());
        offset += u64::from(page_size);
    }

    warn!(pages = MAX_PAGES, total = ids.len(), "page limit reached, stopping");
    ids
}
