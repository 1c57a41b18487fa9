// src/checker/fetch.rs
// =============================================================================
// This module downloads one page so the detector can inspect it.
//
// Key functionality:
// - One GET request per URL (no retries)
// - A fixed user-agent so site owners can see who is asking
// - Redirects are followed with reqwest's default policy
// - Two timeouts:
//     * the client timeout (shorter) bounds socket activity: connecting, and
//       each wait for more bytes. A slow but steady server never trips it.
//     * the job deadline (longer) bounds the whole call, body included
//
// The reqwest Client is built ONCE and shared by every worker. It is never
// reconfigured per request.
//
// Rust concepts:
// - Traits: PageFetcher lets tests swap in a fake network
// - async_trait: async fn inside a trait
// - tokio::time::timeout_at: put a deadline on any future
// =============================================================================

use super::error::CheckError;
use crate::config::FetchConfig;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::time::Duration;
use tokio::time::{timeout_at, Instant};
use url::Url;

// Response header that carries crawler directives
pub const X_ROBOTS_TAG: &str = "x-robots-tag";

// Everything we keep from one response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    /// URL after redirects
    pub final_url: String,
    /// HTTP status code of the final response
    pub status: u16,
    /// Every X-Robots-Tag value, in the order received
    pub robots_headers: Vec<String>,
    /// The charset parameter of Content-Type, if any
    pub charset: Option<String>,
    /// Body bytes, or why we couldn't read them all
    pub body: Result<Vec<u8>, CheckError>,
}

// Anything that can turn a URL into a FetchedPage
//
// The real implementation is HttpFetcher. Tests use a fake one so the pool
// can be exercised without a network.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    // Returns Err only when we never got a response (bad URL, DNS, TLS,
    // connection refused, deadline before headers). A failure while reading
    // the body is reported inside FetchedPage::body instead, so the header
    // evidence isn't thrown away.
    async fn fetch(&self, url: &str) -> Result<FetchedPage, CheckError>;
}

pub struct HttpFetcher {
    client: Client,
    transport_timeout: Duration,
    deadline: Duration,
}

impl HttpFetcher {
    // Builds the shared client
    //
    // Fails only if reqwest can't set up TLS, which is fatal for the whole run.
    pub fn new(config: &FetchConfig) -> Result<Self, reqwest::Error> {
        // No overall .timeout(): that would always fire before the deadline.
        // The deadline is applied per call in fetch().
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .connect_timeout(config.transport_timeout)
            .read_timeout(config.transport_timeout)
            .build()?;

        Ok(Self {
            client,
            transport_timeout: config.transport_timeout,
            deadline: config.deadline,
        })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, CheckError> {
        let target = parse_target(url)?;

        // One deadline for the whole call: request, redirects and body
        let deadline = Instant::now() + self.deadline;

        let response = match timeout_at(deadline, self.client.get(target).send()).await {
            Ok(result) => result.map_err(|e| CheckError::from_reqwest(e, self.transport_timeout))?,
            Err(_) => return Err(CheckError::Timeout(self.deadline)),
        };

        let status = response.status().as_u16();
        let final_url = response.url().to_string();

        // get_all() yields every instance of the header, not just the first
        let robots_headers = response
            .headers()
            .get_all(X_ROBOTS_TAG)
            .iter()
            .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
            .collect();

        let charset = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .and_then(charset_param);

        let body = match timeout_at(deadline, response.bytes()).await {
            Ok(Ok(bytes)) => Ok(bytes.to_vec()),
            Ok(Err(e)) => Err(CheckError::from_reqwest(e, self.transport_timeout)),
            Err(_) => Err(CheckError::Timeout(self.deadline)),
        };

        Ok(FetchedPage {
            final_url,
            status,
            robots_headers,
            charset,
            body,
        })
    }
}

// Validates a URL before we touch the network
//
// Only http:// and https:// can be checked. Everything else (relative paths,
// mailto:, ftp:, typos) is a request construction error.
fn parse_target(url: &str) -> Result<Url, CheckError> {
    let parsed = Url::parse(url).map_err(|e| CheckError::RequestConstruction(format!("{}: {}", url, e)))?;

    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(CheckError::RequestConstruction(format!(
            "{}: unsupported scheme '{}'",
            url, other
        ))),
    }
}

// Pulls the charset out of a Content-Type value
//
//   "text/html; charset=\"Shift_JIS\"" -> Some("Shift_JIS")
fn charset_param(content_type: &str) -> Option<String> {
    content_type.split(';').skip(1).find_map(|param| {
        let (name, value) = param.split_once('=')?;
        if !name.trim().eq_ignore_ascii_case("charset") {
            return None;
        }
        let value = value.trim().trim_matches('"');
        (!value.is_empty()).then(|| value.to_string())
    })
}
