use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Result, anyhow};
use clap::Parser;

use crate::fetcher::DEFAULT_REQUEST_DELAY;
use crate::http_client::DEFAULT_TIMEOUT_SECS;

pub const DEFAULT_PAGE_SIZE: u32 = 100;
/// Largest `count` the match-list endpoint accepts.
const MAX_PAGE_SIZE: u32 = 100;
const DEFAULT_LOCALE: &str = "fr_FR";

pub const RIOT_API_HOST_SUFFIX: &str = "api.riotgames.com";
pub const DDRAGON_BASE_URL: &str = "https://ddragon.leagueoflegends.com";

/// Regional routing host for match-v5.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    Americas,
    Asia,
    Europe,
    Sea,
}

impl Region {
    pub fn as_str(self) -> &'static str {
        match self {
            Region::Americas => "americas",
            Region::Asia => "asia",
            Region::Europe => "europe",
            Region::Sea => "sea",
        }
    }
}

impl FromStr for Region {
    type Err = anyhow::Error;

    fn from_str(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "americas" => Ok(Region::Americas),
            "asia" => Ok(Region::Asia),
            "europe" => Ok(Region::Europe),
            "sea" => Ok(Region::Sea),
            other => Err(anyhow!(
                "unknown routing region {other:?} (expected americas, asia, europe or sea)"
            )),
        }
    }
}

/// Everything one export run needs, built once at startup.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub api_key: String,
    pub puuid: String,
    pub match_api_base: String,
    pub ddragon_base: String,
    pub data_dir: PathBuf,
    pub output: PathBuf,
    pub locale: String,
    pub page_size: u32,
    pub max_matches: Option<usize>,
    pub request_delay: Duration,
    pub http_timeout: Duration,
    pub pagination_max_attempts: Option<u32>,
}

impl RunConfig {
    pub fn new(api_key: impl Into<String>, puuid: impl Into<String>, region: Region) -> Self {
        Self {
            api_key: api_key.into(),
            puuid: puuid.into(),
            match_api_base: format!("https://{}.{RIOT_API_HOST_SUFFIX}", region.as_str()),
            ddragon_base: DDRAGON_BASE_URL.to_string(),
            data_dir: PathBuf::from("data"),
            output: PathBuf::from("matches.csv"),
            locale: DEFAULT_LOCALE.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            max_matches: None,
            request_delay: DEFAULT_REQUEST_DELAY,
            http_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            pagination_max_attempts: None,
        }
    }
}

/// Export one player's match history to CSV.
#[derive(Debug, Parser)]
#[command(version, about)]
pub struct Cli {
    /// Riot developer API key.
    #[arg(long, env = "RIOT_API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// PUUID of the player whose matches are exported.
    #[arg(long, env = "RIOT_PUUID")]
    pub puuid: String,

    /// Match-v5 routing region: americas, asia, europe or sea.
    #[arg(long, env = "RIOT_REGION", default_value = "asia")]
    pub region: Region,

    /// Root directory for cached item catalogs and icons.
    #[arg(long, env = "RIFT_DATA_DIR", default_value = "data")]
    pub data_dir: PathBuf,

    /// Destination CSV file.
    #[arg(long, env = "RIFT_OUTPUT", default_value = "matches.csv")]
    pub out: PathBuf,

    /// Data Dragon locale for item names.
    #[arg(long, env = "DDRAGON_LOCALE", default_value = DEFAULT_LOCALE)]
    pub locale: String,

    #[arg(long, env = "RIOT_PAGE_SIZE", default_value_t = DEFAULT_PAGE_SIZE)]
    pub page_size: u32,

    /// Stop after this many match ids.
    #[arg(long, env = "RIOT_MAX_MATCHES")]
    pub max_matches: Option<usize>,

    /// Delay after every successful request, in milliseconds.
    #[arg(long, env = "RIOT_REQUEST_DELAY_MS", default_value_t = 1200)]
    pub request_delay_ms: u64,

    #[arg(long, env = "HTTP_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub http_timeout_secs: u64,

    /// Give up on a match-id page after this many attempts (unbounded when unset).
    #[arg(long, env = "RIOT_PAGINATION_MAX_ATTEMPTS")]
    pub pagination_max_attempts: Option<u32>,
}

impl Cli {
    pub fn into_config(self) -> Result<RunConfig> {
        let api_key = self.api_key.trim().to_string();
        if api_key.is_empty() {
            return Err(anyhow!("api key is empty"));
        }
        let puuid = self.puuid.trim().to_string();
        if puuid.is_empty() {
            return Err(anyhow!("puuid is empty"));
        }

        let mut config = RunConfig::new(api_key, puuid, self.region);
        config.data_dir = self.data_dir;
        config.output = self.out;
        config.locale = self.locale.trim().to_string();
        config.page_size = self.page_size.clamp(1, MAX_PAGE_SIZE);
        config.max_matches = self.max_matches.filter(|n| *n > 0);
        config.request_delay = Duration::from_millis(self.request_delay_ms);
        config.http_timeout = Duration::from_secs(self.http_timeout_secs.max(1));
        config.pagination_max_attempts = self.pagination_max_attempts.filter(|n| *n > 0);
        Ok(config)
    }
}
