//! Outgoing HTTP for font and emoji assets.
//!
//! [`Fetcher`] is the seam between the pipeline and the network: the font
//! resolver and the emoji provider only ever talk to this trait, so tests
//! substitute an in-memory implementation and never touch the network.
//!
//! [`HttpFetcher`] is the production implementation. It shares one
//! `ureq::Agent` (connection pooling) across every request of a build.
//! Status codes are not turned into transport errors by ureq; anything
//! outside `2xx` is reported as [`FetchError::Status`].

use std::time::Duration;
use thiserror::Error;
use ureq::Agent;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },
    #[error("failed to read response body: {0}")]
    Body(String),
}

/// Minimal GET interface used by the pipeline.
pub trait Fetcher: Sync {
    /// GET a text resource (stylesheets).
    fn fetch_text(&self, url: &str) -> Result<String, FetchError>;

    /// GET a binary resource (font files, emoji SVGs).
    fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// Create an HTTP agent with an optional global timeout.
pub fn create_agent(timeout: Option<Duration>) -> Agent {
    Agent::config_builder()
        .timeout_global(timeout)
        .http_status_as_error(false)
        .build()
        .into()
}

/// Blocking HTTP fetcher backed by a pooled `ureq` agent.
pub struct HttpFetcher {
    agent: Agent,
}

impl HttpFetcher {
    pub fn new(timeout: Option<Duration>) -> Self {
        Self {
            agent: create_agent(timeout),
        }
    }

    fn get(&self, url: &str) -> Result<ureq::Body, FetchError> {
        let response = self
            .agent
            .get(url)
            .call()
            .map_err(|e| FetchError::Http(e.to_string()))?;

        let status = response.status().as_u16();
        if !(200..300).contains(&status) {
            return Err(FetchError::Status {
                status,
                url: url.to_string(),
            });
        }
        Ok(response.into_body())
    }
}

impl Fetcher for HttpFetcher {
    fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        let mut body = self.get(url)?;
        body.read_to_string()
            .map_err(|e| FetchError::Body(e.to_string()))
    }

    fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let mut body = self.get(url)?;
        body.read_to_vec()
            .map_err(|e| FetchError::Body(e.to_string()))
    }
}
