use std::fs;
use std::hint::black_box;
use std::path::Path;

use anyhow::{Result, anyhow};
use criterion::{Criterion, criterion_group, criterion_main};

use rift_history::asset_cache::AssetCache;
use rift_history::extract::extract_player_row;
use rift_history::http_client::{HttpResponse, HttpTransport};
use rift_history::match_model::MatchDocument;

const MATCH_JSON: &str = include_str!("../tests/fixtures/match_full.json");
const CATALOG_JSON: &str = include_str!("../tests/fixtures/item_catalog.json");

struct Offline;

impl HttpTransport for Offline {
    fn get(&self, url: &str, _query: &[(&str, String)]) -> Result<HttpResponse> {
        Err(anyhow!("offline: {url}"))
    }
}

fn warm_data_dir(root: &Path) {
    let items = root.join("items");
    fs::create_dir_all(&items).unwrap();
    fs::write(items.join("items_14.22.json"), CATALOG_JSON).unwrap();
    let icons = root.join("icons").join("14.22");
    fs::create_dir_all(&icons).unwrap();
    for id in ["1055", "3006", "3031", "3340"] {
        fs::write(icons.join(format!("{id}.png")), b"png").unwrap();
    }
}

fn bench_match_parse(c: &mut Criterion) {
    c.bench_function("match_document_parse", |b| {
        b.iter(|| {
            let doc = MatchDocument::from_json(black_box(MATCH_JSON.as_bytes())).unwrap();
            black_box(doc.info.participants.len());
        })
    });
}

fn bench_row_extract(c: &mut Criterion) {
    let dir = tempfile::tempdir().unwrap();
    warm_data_dir(dir.path());
    let doc = MatchDocument::from_json(MATCH_JSON.as_bytes()).unwrap();
    let mut assets = AssetCache::new(Offline, "https://ddragon.test", "fr_FR", dir.path());

    c.bench_function("player_row_extract_warm_cache", |b| {
        b.iter(|| {
            let row = extract_player_row(black_box(&doc), "player-a", &mut assets).unwrap();
            black_box(row.to_record());
        })
    });
}

criterion_group!(benches, bench_match_parse, bench_row_extract);
criterion_main!(benches);
