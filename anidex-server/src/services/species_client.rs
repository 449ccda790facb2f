//! Species metadata client
//!
//! Queries an API Ninjas-compatible `/animals` endpoint by name:
//! `GET {api_url}?name=<lowercased name>` with an `X-Api-Key` header.
//!
//! Every failure mode (non-200, transport error, malformed body) is folded
//! into [`LookupOutcome::Unavailable`] with a log line; nothing is raised.
//! One request per lookup: no retries, no caching.

use anidex_common::SpeciesRecord;
use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use tracing::{debug, info, warn};

const USER_AGENT: &str = concat!("anidex/", env!("CARGO_PKG_VERSION"));

/// Header carrying the API credential (`X-Api-Key`)
pub const API_KEY_HEADER: &str = "x-api-key";

/// Result of a species lookup
#[derive(Debug, Clone, PartialEq)]
pub enum LookupOutcome {
    /// First matching record
    Found(SpeciesRecord),
    /// Service answered, but knows no such species
    NotFound,
    /// Service could not be queried or answered with an error
    Unavailable(String),
}

impl LookupOutcome {
    /// Collapse to the record, treating every failure as "no info"
    pub fn into_record(self) -> Option<SpeciesRecord> {
        match self {
            LookupOutcome::Found(record) => Some(record),
            LookupOutcome::NotFound | LookupOutcome::Unavailable(_) => None,
        }
    }
}

/// Species metadata lookup by common name
#[async_trait]
pub trait SpeciesLookup: Send + Sync {
    async fn lookup(&self, name: &str) -> LookupOutcome;
}

/// Connection settings for [`SpeciesClient`]
#[derive(Debug, Clone)]
pub struct SpeciesClientConfig {
    /// Endpoint URL, e.g. `https://api.api-ninjas.com/v1/animals`
    pub api_url: String,
    /// API credential sent in `X-Api-Key`
    pub api_key: String,
}

/// HTTP species metadata client
pub struct SpeciesClient {
    http_client: Client,
    api_url: String,
}

impl SpeciesClient {
    /// Create a client; the API key is baked into the default headers
    pub fn new(config: SpeciesClientConfig) -> anyhow::Result<Self> {
        let mut api_key = header::HeaderValue::from_str(&config.api_key)
            .map_err(|_| anyhow::anyhow!("Species API key contains invalid header characters"))?;
        api_key.set_sensitive(true);

        let mut headers = header::HeaderMap::new();
        headers.insert(header::HeaderName::from_static(API_KEY_HEADER), api_key);

        let http_client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http_client,
            api_url: config.api_url,
        })
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    async fn fetch(&self, name: &str) -> Result<LookupOutcome, reqwest::Error> {
        let response = self
            .http_client
            .get(&self.api_url)
            .query(&[("name", name)])
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            warn!(name = %name, status = status.as_u16(), "Species API request failed");
            return Ok(LookupOutcome::Unavailable(format!(
                "HTTP {}",
                status.as_u16()
            )));
        }

        let records: Vec<SpeciesRecord> = response.json().await?;
        debug!(name = %name, matches = records.len(), "Species API responded");

        // An entry carrying none of the known fields counts as no match
        Ok(match records.into_iter().next() {
            Some(record) if !record.is_empty() => LookupOutcome::Found(record),
            _ => LookupOutcome::NotFound,
        })
    }
}

#[async_trait]
impl SpeciesLookup for SpeciesClient {
    async fn lookup(&self, name: &str) -> LookupOutcome {
        let query = name.to_lowercase();

        match self.fetch(&query).await {
            Ok(outcome) => {
                if matches!(outcome, LookupOutcome::NotFound) {
                    info!(name = %query, "No species info found");
                }
                outcome
            }
            Err(e) => {
                warn!(name = %query, error = %e, "Error getting animal info");
                LookupOutcome::Unavailable(e.to_string())
            }
        }
    }
}
