use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use reqwest::header::USER_AGENT;

pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Raw result of one GET: status code and undecoded body bytes.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_rate_limited(&self) -> bool {
        self.status == 429
    }
}

/// The only network capability the pipeline needs.
///
/// An `Err` means the request never produced a status (connect error,
/// timeout, body read failure). Any status, including 4xx/5xx, is `Ok`.
pub trait HttpTransport {
    fn get(&self, url: &str, query: &[(&str, String)]) -> Result<HttpResponse>;
}

impl<T: HttpTransport + ?Sized> HttpTransport for &T {
    fn get(&self, url: &str, query: &[(&str, String)]) -> Result<HttpResponse> {
        (**self).get(url, query)
    }
}

pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: http_client(timeout)?,
        })
    }
}

impl HttpTransport for ReqwestTransport {
    fn get(&self, url: &str, query: &[(&str, String)]) -> Result<HttpResponse> {
        let resp = self
            .client
            .get(url)
            .header(USER_AGENT, concat!("rift_history/", env!("CARGO_PKG_VERSION")))
            .query(query)
            .send()
            .context("request failed")?;
        let status = resp.status().as_u16();
        let body = resp.bytes().context("failed reading body")?.to_vec();
        Ok(HttpResponse { status, body })
    }
}

pub fn http_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .build()
        .context("failed to build http client")
}
