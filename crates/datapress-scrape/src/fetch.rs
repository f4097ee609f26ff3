//! HTTP plumbing for the FAQ scraper.

use crate::error::{Result, ScrapeError};
use reqwest::blocking::Client;
use std::time::Duration;
use tracing::debug;

/// Landing page of the FAQ section; later pages hang off the
/// `wpfaqpage` query parameter.
pub const BASE_URL: &str = "https://www.atk-ks.org/pyetje-te-shpeshta/";

const USER_AGENT: &str = "Mozilla/5.0 (compatible; datapress-faq-scraper/1.0)";

/// HTTP client for the FAQ pages. Certificate verification is disabled;
/// the site serves an incomplete TLS chain.
pub fn build_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .danger_accept_invalid_certs(true)
        .timeout(timeout)
        .build()
        .map_err(ScrapeError::ClientBuild)
}

/// Page 1 is the bare landing URL; later pages use the query parameter.
pub fn page_url(base_url: &str, page: usize) -> String {
    if page <= 1 {
        base_url.to_string()
    } else {
        format!("{base_url}?wpfaqpage={page}")
    }
}

/// Fetches one FAQ page and returns its HTML body.
pub fn fetch_page(client: &Client, base_url: &str, page: usize) -> Result<String> {
    let url = page_url(base_url, page);
    debug!(%url, page, "fetching FAQ page");
    let response = client
        .get(&url)
        .send()
        .map_err(|source| ScrapeError::Request {
            url: url.clone(),
            source,
        })?;
    let status = response.status();
    if !status.is_success() {
        return Err(ScrapeError::Status { url, status });
    }
    response
        .text()
        .map_err(|source| ScrapeError::Request { url, source })
}
