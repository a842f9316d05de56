#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Result, anyhow};

use rift_history::fetcher::Sleeper;
use rift_history::http_client::{HttpResponse, HttpTransport};

pub fn read_fixture(name: &str) -> Vec<u8> {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read(path).expect("fixture file should be readable")
}

#[derive(Debug, Clone)]
pub enum Reply {
    Status(u16, Vec<u8>),
    Fail(&'static str),
}

impl Reply {
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Reply::Status(200, body.into())
    }

    pub fn json(value: serde_json::Value) -> Self {
        Reply::Status(200, serde_json::to_vec(&value).expect("serializable"))
    }
}

#[derive(Debug, Clone)]
pub struct Call {
    pub url: String,
    pub query: Vec<(String, String)>,
}

impl Call {
    pub fn param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

struct Route {
    pattern: String,
    replies: VecDeque<Reply>,
    last: Option<Reply>,
}

/// Transport answering from per-URL scripts. A route whose script is used up
/// keeps repeating its final reply; unmatched URLs get a 404.
#[derive(Default)]
pub struct ScriptedTransport {
    routes: RefCell<Vec<Route>>,
    calls: RefCell<Vec<Call>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replies for URLs containing `pattern`; earlier routes win.
    pub fn on(self, pattern: &str, replies: Vec<Reply>) -> Self {
        self.routes.borrow_mut().push(Route {
            pattern: pattern.to_string(),
            replies: replies.into(),
            last: None,
        });
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn calls_to(&self, pattern: &str) -> Vec<Call> {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.url.contains(pattern))
            .cloned()
            .collect()
    }
}

impl HttpTransport for ScriptedTransport {
    fn get(&self, url: &str, query: &[(&str, String)]) -> Result<HttpResponse> {
        self.calls.borrow_mut().push(Call {
            url: url.to_string(),
            query: query
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        });

        let mut routes = self.routes.borrow_mut();
        let Some(route) = routes.iter_mut().find(|r| url.contains(&r.pattern)) else {
            return Ok(HttpResponse {
                status: 404,
                body: Vec::new(),
            });
        };
        let reply = match route.replies.pop_front() {
            Some(reply) => {
                route.last = Some(reply.clone());
                reply
            }
            None => route
                .last
                .clone()
                .unwrap_or(Reply::Status(404, Vec::new())),
        };
        match reply {
            Reply::Status(status, body) => Ok(HttpResponse { status, body }),
            Reply::Fail(msg) => Err(anyhow!("{msg}")),
        }
    }
}

/// Records requested waits instead of blocking.
#[derive(Default)]
pub struct RecordingSleeper {
    waits: RefCell<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn waits(&self) -> Vec<Duration> {
        self.waits.borrow().clone()
    }

    pub fn count(&self, duration: Duration) -> usize {
        self.waits.borrow().iter().filter(|d| **d == duration).count()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, duration: Duration) {
        self.waits.borrow_mut().push(duration);
    }
}
