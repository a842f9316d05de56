use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::asset_cache::AssetCache;
use crate::config::RunConfig;
use crate::export::{Record, export_csv};
use crate::extract::extract_player_row;
use crate::fetcher::{Fetcher, RetryPolicy, Sleeper};
use crate::http_client::HttpTransport;
use crate::match_api::{fetch_match, match_ids_url};
use crate::paginator::{PaginationOptions, collect_match_ids};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub ids_found: usize,
    pub fetched: usize,
    pub extracted: usize,
    pub skipped_fetch: usize,
    pub skipped_missing_player: usize,
    /// Set when a CSV file was written.
    pub output: Option<PathBuf>,
}

/// Runs one export: discover ids, fetch and flatten each match, write the
/// CSV once. Only a failure to write the output is returned as an error.
pub fn run<T: HttpTransport, S: Sleeper>(
    config: &RunConfig,
    transport: T,
    sleeper: S,
) -> Result<RunSummary> {
    let fetcher = Fetcher::new(&transport, sleeper, config.request_delay);
    let mut assets = AssetCache::new(
        &transport,
        &config.ddragon_base,
        &config.locale,
        &config.data_dir,
    );

    let opts = PaginationOptions {
        page_size: config.page_size,
        max_matches: config.max_matches,
        policy: RetryPolicy::pagination().with_max_attempts(config.pagination_max_attempts),
    };
    let ids_url = match_ids_url(&config.match_api_base, &config.puuid);
    let match_ids = collect_match_ids(&fetcher, &ids_url, &config.api_key, &opts);

    let mut summary = RunSummary {
        ids_found: match_ids.len(),
        ..RunSummary::default()
    };
    let mut rows: Vec<Record> = Vec::with_capacity(match_ids.len());
    let total = match_ids.len();

    for (idx, match_id) in match_ids.iter().enumerate() {
        info!("({}/{}) match {}", idx + 1, total, match_id);
        let doc = match fetch_match(&fetcher, &config.match_api_base, &config.api_key, match_id) {
            Ok(doc) => doc,
            Err(err) => {
                warn!(match_id = %match_id, error = %format!("{err:#}"), "match skipped");
                summary.skipped_fetch += 1;
                continue;
            }
        };
        summary.fetched += 1;

        match extract_player_row(&doc, &config.puuid, &mut assets) {
            Some(row) => {
                rows.push(row.to_record());
                summary.extracted += 1;
            }
            None => {
                warn!(match_id = %match_id, "player not found in match");
                summary.skipped_missing_player += 1;
            }
        }
        fetcher.pace();
    }

    let report = export_csv(&rows, &config.output)
        .with_context(|| format!("export {}", config.output.display()))?;
    if report.written {
        summary.output = Some(config.output.clone());
    }
    info!(
        ids = summary.ids_found,
        extracted = summary.extracted,
        skipped = summary.skipped_fetch + summary.skipped_missing_player,
        "run complete"
    );
    Ok(summary)
}
