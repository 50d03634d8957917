//! Formula rendering service client.

use std::time::Duration;

use tagsoup_markup::error::ServiceError;
use tagsoup_markup::{FormulaService, FormulaUrls, MathFormat};
use tracing::debug;
use ureq::Agent;

use crate::error::FetchError;
use crate::http::create_agent;

/// Asks a remote service to render formulas before they are first shown.
///
/// New formulas are posted as a `code` form field to the service URL. Image
/// URLs come from a `{hash}`/`{format}` template and never touch the network.
#[derive(Debug, Clone)]
pub struct FormulaClient {
    agent: Agent,
    service_url: String,
    urls: FormulaUrls,
}

impl FormulaClient {
    pub fn new(service_url: &str, image_url: &str, timeout: Duration) -> Self {
        Self {
            agent: create_agent(timeout),
            service_url: service_url.trim_end_matches('/').to_owned(),
            urls: FormulaUrls::new(image_url),
        }
    }

    pub fn service_url(&self) -> &str {
        &self.service_url
    }

    fn post(&self, tex: &str) -> Result<(), FetchError> {
        let url = self.service_url.as_str();
        let response = self
            .agent
            .post(url)
            .send_form([("code", tex)])
            .map_err(|e| FetchError::http(url, &e))?;

        let status = response.status().as_u16();
        if status >= 400 {
            let body = response
                .into_body()
                .read_to_string()
                .unwrap_or_else(|_| String::from("(unable to read error body)"));
            return Err(FetchError::Status {
                url: url.to_owned(),
                status,
                body,
            });
        }
        debug!(url, status, "Formula created");
        Ok(())
    }
}

impl FormulaService for FormulaClient {
    fn image_url(&self, hash: &str, format: MathFormat) -> String {
        self.urls.image_url(hash, format)
    }

    fn create(&self, tex: &str) -> Result<(), ServiceError> {
        Ok(self.post(tex)?)
    }
}
