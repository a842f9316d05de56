use anyhow::{Context, Result};
use tracing::debug;

use crate::fetcher::{Fetcher, RetryPolicy, Sleeper};
use crate::http_client::HttpTransport;
use crate::match_model::MatchDocument;

const MATCH_V5_PATH: &str = "/lol/match/v5/matches";

pub fn match_ids_url(api_base: &str, puuid: &str) -> String {
    format!(
        "{}{MATCH_V5_PATH}/by-puuid/{puuid}/ids",
        api_base.trim_end_matches('/')
    )
}

pub fn match_url(api_base: &str, match_id: &str) -> String {
    format!("{}{MATCH_V5_PATH}/{match_id}", api_base.trim_end_matches('/'))
}

/// Fetches and decodes one match document under the match retry policy.
/// Callers skip the match on error.
pub fn fetch_match<T: HttpTransport, S: Sleeper>(
    fetcher: &Fetcher<T, S>,
    api_base: &str,
    api_key: &str,
    match_id: &str,
) -> Result<MatchDocument> {
    let url = match_url(api_base, match_id);
    let query = [("api_key", api_key.to_string())];
    let resp = fetcher.fetch(&url, &query, &RetryPolicy::match_detail())?;
    debug!(match_id, bytes = resp.body.len(), "match document received");
    MatchDocument::from_json(&resp.body).with_context(|| format!("decode match {match_id}"))
}
