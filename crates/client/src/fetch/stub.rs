//! Recording in-memory `HttpFetch` for tests.

use std::collections::HashMap;
use std::sync::Mutex;

use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use roster_core::Error;

use super::{FetchResponse, HttpFetch};

enum Route {
    Respond(StatusCode, String),
    Fail(String),
}

/// Serves canned responses by exact url and records every request.
#[derive(Default)]
pub(crate) struct StubFetch {
    routes: HashMap<String, Route>,
    pub(crate) requests: Mutex<Vec<(String, HeaderMap)>>,
}

impl StubFetch {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn respond(mut self, url: &str, status: u16, body: &str) -> Self {
        let status = StatusCode::from_u16(status).expect("valid status");
        self.routes.insert(url.to_string(), Route::Respond(status, body.to_string()));
        self
    }

    pub(crate) fn fail(mut self, url: &str, message: &str) -> Self {
        self.routes.insert(url.to_string(), Route::Fail(message.to_string()));
        self
    }

    pub(crate) fn requested_urls(&self) -> Vec<String> {
        self.requests.lock().unwrap().iter().map(|(url, _)| url.clone()).collect()
    }
}

#[async_trait::async_trait]
impl HttpFetch for StubFetch {
    async fn get(&self, url: &str, headers: HeaderMap) -> Result<FetchResponse, Error> {
        self.requests.lock().unwrap().push((url.to_string(), headers));

        match self.routes.get(url) {
            Some(Route::Respond(status, body)) => {
                Ok(FetchResponse { url: url.to_string(), status: *status, body: body.clone(), fetch_ms: 0 })
            }
            Some(Route::Fail(message)) => Err(Error::HttpError(message.clone())),
            None => Ok(FetchResponse { url: url.to_string(), status: StatusCode::NOT_FOUND, body: String::new(), fetch_ms: 0 }),
        }
    }
}
