//! Blocking HTTP client for video identifier lookups.

use std::time::Duration;

use tagsoup_markup::error::ServiceError;
use tagsoup_markup::{Fetch, FetchResponse};
use tracing::debug;
use ureq::Agent;

use crate::error::FetchError;

/// Default HTTP timeout in seconds.
pub const DEFAULT_TIMEOUT: u64 = 10;

/// Create an HTTP agent with the given timeout.
///
/// Error statuses are returned as responses rather than errors; callers
/// decide what a non-200 answer means.
pub fn create_agent(timeout: Duration) -> Agent {
    Agent::config_builder()
        .timeout_global(Some(timeout))
        .http_status_as_error(false)
        .build()
        .into()
}

/// [`Fetch`] implementation backed by a shared `ureq` agent.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    agent: Agent,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Self {
        Self {
            agent: create_agent(timeout),
        }
    }

    fn finish(
        url: &str,
        response: Result<ureq::http::Response<ureq::Body>, ureq::Error>,
    ) -> Result<FetchResponse, FetchError> {
        let response = response.map_err(|e| FetchError::http(url, &e))?;
        let status = response.status().as_u16();
        let body = response
            .into_body()
            .read_to_string()
            .map_err(|e| FetchError::body(url, &e))?;
        debug!(url, status, bytes = body.len(), "Lookup response");
        Ok(FetchResponse { status, body })
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_TIMEOUT))
    }
}

impl Fetch for HttpFetcher {
    fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<FetchResponse, ServiceError> {
        let request = query
            .iter()
            .fold(self.agent.get(url), |request, (key, value)| {
                request.query(*key, *value)
            });
        Ok(Self::finish(url, request.call())?)
    }

    fn post_form(&self, url: &str, form: &[(&str, &str)]) -> Result<FetchResponse, ServiceError> {
        let response = self.agent.post(url).send_form(form.iter().copied());
        Ok(Self::finish(url, response)?)
    }
}
