use std::thread;
use std::time::Duration;

use tracing::{debug, warn};

use crate::http_client::{HttpResponse, HttpTransport};

const PAGINATION_RATE_LIMIT_COOLDOWN: Duration = Duration::from_secs(10);
const MATCH_RATE_LIMIT_COOLDOWN: Duration = Duration::from_secs(5);
const TRANSIENT_RETRY_DELAY: Duration = Duration::from_secs(2);
const MATCH_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_REQUEST_DELAY: Duration = Duration::from_millis(1200);

/// Query parameters never echoed into logs.
const SECRET_PARAMS: &[&str] = &["api_key"];

/// Blocking wait used for every cooldown and pacing delay.
pub trait Sleeper {
    fn sleep(&self, duration: Duration);
}

impl<S: Sleeper + ?Sized> Sleeper for &S {
    fn sleep(&self, duration: Duration) {
        (**self).sleep(duration)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            thread::sleep(duration);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// `None` retries forever.
    pub max_attempts: Option<u32>,
    pub rate_limit_cooldown: Duration,
    pub transient_delay: Duration,
    /// Whether a non-2xx, non-429 status is retried or returned at once.
    pub retry_error_status: bool,
}

impl RetryPolicy {
    /// Match-id pages: 429 and transport errors retry without limit, any
    /// other error status ends the walk.
    pub fn pagination() -> Self {
        Self {
            max_attempts: None,
            rate_limit_cooldown: PAGINATION_RATE_LIMIT_COOLDOWN,
            transient_delay: TRANSIENT_RETRY_DELAY,
            retry_error_status: false,
        }
    }

    /// Single match documents: everything retries, three attempts total.
    pub fn match_detail() -> Self {
        Self {
            max_attempts: Some(MATCH_MAX_ATTEMPTS),
            rate_limit_cooldown: MATCH_RATE_LIMIT_COOLDOWN,
            transient_delay: TRANSIENT_RETRY_DELAY,
            retry_error_status: true,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: Option<u32>) -> Self {
        self.max_attempts = max_attempts.filter(|n| *n > 0);
        self
    }

    fn allows(&self, attempt: u32) -> bool {
        self.max_attempts.is_none_or(|max| attempt < max)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("http {status} from {url}")]
    Status { url: String, status: u16 },
    #[error("gave up on {url} after {attempts} attempts: {last}")]
    Exhausted {
        url: String,
        attempts: u32,
        last: String,
    },
}

pub struct Fetcher<T, S> {
    transport: T,
    sleeper: S,
    request_delay: Duration,
}

impl<T: HttpTransport, S: Sleeper> Fetcher<T, S> {
    pub fn new(transport: T, sleeper: S, request_delay: Duration) -> Self {
        Self {
            transport,
            sleeper,
            request_delay,
        }
    }

    /// Issues one GET under `policy`, sleeping between attempts as the
    /// policy dictates. Returns only 2xx responses.
    pub fn fetch(
        &self,
        url: &str,
        query: &[(&str, String)],
        policy: &RetryPolicy,
    ) -> Result<HttpResponse, FetchError> {
        let shown_query = redacted_query(query);
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            debug!(url, query = %shown_query, attempt, "GET");

            let (delay, last) = match self.transport.get(url, query) {
                Ok(resp) if resp.is_success() => return Ok(resp),
                Ok(resp) if resp.is_rate_limited() => {
                    warn!(
                        url,
                        attempt,
                        cooldown_secs = policy.rate_limit_cooldown.as_secs_f64(),
                        "rate limited, cooling down"
                    );
                    (policy.rate_limit_cooldown, "http 429".to_string())
                }
                Ok(resp) => {
                    if !policy.retry_error_status {
                        warn!(url, query = %shown_query, status = resp.status, "http error");
                        return Err(FetchError::Status {
                            url: url.to_string(),
                            status: resp.status,
                        });
                    }
                    warn!(url, attempt, status = resp.status, "http error, retrying");
                    (policy.transient_delay, format!("http {}", resp.status))
                }
                Err(err) => {
                    warn!(url, attempt, error = %err, "transport error, retrying");
                    (policy.transient_delay, format!("{err:#}"))
                }
            };

            if !policy.allows(attempt) {
                return Err(FetchError::Exhausted {
                    url: url.to_string(),
                    attempts: attempt,
                    last,
                });
            }
            self.sleeper.sleep(delay);
        }
    }

    /// Steady-state spacing applied after each successful page or match.
    pub fn pace(&self) {
        self.sleeper.sleep(self.request_delay);
    }
}

pub fn redacted_query(query: &[(&str, String)]) -> String {
    query
        .iter()
        .map(|(key, value)| {
            if SECRET_PARAMS.contains(key) {
                format!("{key}=***")
            } else {
                format!("{key}={value}")
            }
        })
        .collect::<Vec<_>>()
        .join("&")
}
