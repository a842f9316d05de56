mod common;

use std::time::Duration;

use serde_json::json;

use rift_history::fetcher::Fetcher;
use rift_history::paginator::{PaginationOptions, collect_match_ids};

use common::{RecordingSleeper, Reply, ScriptedTransport};

const IDS_URL: &str = "https://riot.test/lol/match/v5/matches/by-puuid/A/ids";

fn opts(page_size: u32) -> PaginationOptions {
    PaginationOptions {
        page_size,
        ..PaginationOptions::default()
    }
}

#[test]
fn full_pages_then_empty_page_are_concatenated_in_order() {
    let transport = ScriptedTransport::new().on(
        "/ids",
        vec![
            Reply::json(json!(["KR_1", "KR_2"])),
            Reply::json(json!(["KR_3", "KR_4"])),
            Reply::json(json!([])),
        ],
    );
    let sleeper = RecordingSleeper::default();
    let fetcher = Fetcher::new(&transport, &sleeper, Duration::from_millis(1200));

    let ids = collect_match_ids(&fetcher, IDS_URL, "RGAPI-test", &opts(2));

    assert_eq!(ids, vec!["KR_1", "KR_2", "KR_3", "KR_4"]);
    let calls = transport.calls();
    assert_eq!(calls.len(), 3);
    let starts: Vec<_> = calls.iter().map(|c| c.param("start").unwrap()).collect();
    assert_eq!(starts, vec!["0", "2", "4"]);
    assert!(calls.iter().all(|c| c.param("count") == Some("2")));
    assert!(calls.iter().all(|c| c.param("api_key") == Some("RGAPI-test")));
    assert_eq!(sleeper.count(Duration::from_millis(1200)), 3);
}

#[test]
fn terminal_error_returns_ids_collected_so_far() {
    let transport = ScriptedTransport::new().on(
        "/ids",
        vec![
            Reply::json(json!(["KR_1", "KR_2"])),
            Reply::Status(500, b"oops".to_vec()),
        ],
    );
    let sleeper = RecordingSleeper::default();
    let fetcher = Fetcher::new(&transport, &sleeper, Duration::ZERO);

    let ids = collect_match_ids(&fetcher, IDS_URL, "k", &opts(2));

    assert_eq!(ids, vec!["KR_1", "KR_2"]);
    assert_eq!(transport.calls().len(), 2);
}

#[test]
fn rate_limit_mid_walk_retries_same_offset() {
    let transport = ScriptedTransport::new().on(
        "/ids",
        vec![
            Reply::json(json!(["KR_1", "KR_2"])),
            Reply::Status(429, Vec::new()),
            Reply::json(json!(["KR_3"])),
            Reply::json(json!([])),
        ],
    );
    let sleeper = RecordingSleeper::default();
    let fetcher = Fetcher::new(&transport, &sleeper, Duration::ZERO);

    let ids = collect_match_ids(&fetcher, IDS_URL, "k", &opts(2));

    assert_eq!(ids, vec!["KR_1", "KR_2", "KR_3"]);
    let starts: Vec<_> = transport
        .calls()
        .iter()
        .map(|c| c.param("start").unwrap().to_string())
        .collect();
    assert_eq!(starts, vec!["0", "2", "2", "4"]);
    assert_eq!(sleeper.count(Duration::from_secs(10)), 1);
}

#[test]
fn upstream_duplicates_are_kept() {
    let transport = ScriptedTransport::new().on(
        "/ids",
        vec![
            Reply::json(json!(["KR_1", "KR_2"])),
            Reply::json(json!(["KR_2", "KR_3"])),
            Reply::json(json!([])),
        ],
    );
    let sleeper = RecordingSleeper::default();
    let fetcher = Fetcher::new(&transport, &sleeper, Duration::ZERO);

    let ids = collect_match_ids(&fetcher, IDS_URL, "k", &opts(2));

    assert_eq!(ids, vec!["KR_1", "KR_2", "KR_2", "KR_3"]);
}

#[test]
fn max_matches_truncates_and_stops_early() {
    let transport = ScriptedTransport::new().on(
        "/ids",
        vec![
            Reply::json(json!(["KR_1", "KR_2"])),
            Reply::json(json!(["KR_3", "KR_4"])),
            Reply::json(json!(["KR_5", "KR_6"])),
        ],
    );
    let sleeper = RecordingSleeper::default();
    let fetcher = Fetcher::new(&transport, &sleeper, Duration::ZERO);
    let opts = PaginationOptions {
        max_matches: Some(3),
        ..opts(2)
    };

    let ids = collect_match_ids(&fetcher, IDS_URL, "k", &opts);

    assert_eq!(ids, vec!["KR_1", "KR_2", "KR_3"]);
    assert_eq!(transport.calls().len(), 2);
}

#[test]
fn undecodable_page_ends_the_walk() {
    let transport = ScriptedTransport::new().on(
        "/ids",
        vec![
            Reply::json(json!(["KR_1"])),
            Reply::json(json!({"status": {"message": "odd"}})),
        ],
    );
    let sleeper = RecordingSleeper::default();
    let fetcher = Fetcher::new(&transport, &sleeper, Duration::ZERO);

    let ids = collect_match_ids(&fetcher, IDS_URL, "k", &opts(1));

    assert_eq!(ids, vec!["KR_1"]);
}
