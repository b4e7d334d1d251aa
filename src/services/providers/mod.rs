mod apollo;
mod google_places;
mod yelp;

pub use apollo::*;
pub use google_places::*;
pub use yelp::*;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::{
    configuration::ApiKeySettings,
    domain::{
        company::{CompanyRecord, ContactDetails},
        relevance::Candidate,
        search::{Region, SearchIntent},
    },
};

use super::ContactPageScraper;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request timed out")]
    Timeout,
    #[error("request failed: {0}")]
    Http(reqwest::Error),
    #[error("provider answered with HTTP {0}")]
    Status(u16),
    #[error("API quota exceeded")]
    QuotaExceeded,
    #[error("request denied: {0}")]
    RequestDenied(String),
    #[error("unexpected provider status: {0}")]
    UnexpectedStatus(String),
    #[error("could not decode provider response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ProviderError::Timeout
        } else if e.is_decode() {
            ProviderError::Decode(e.to_string())
        } else if let Some(status) = e.status() {
            ProviderError::Status(status.as_u16())
        } else {
            ProviderError::Http(e)
        }
    }
}

/// One external call the orchestrator may issue.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub query: String,
    pub region: Region,
    pub industry_label: String,
    pub limit: usize,
}

/// A provider result before the relevance check.
#[derive(Debug, Clone, PartialEq)]
pub struct Listing {
    pub candidate: Candidate,
    pub company: CompanyRecord,
    pub detail_id: Option<String>,
}

/// A business directory the orchestrator can query.
#[async_trait]
pub trait CompanyProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// Pause after every call, to stay within the provider's rate limit.
    fn call_delay(&self) -> Duration;

    /// The calls to issue for `intent`, in order.
    fn plan(&self, intent: &SearchIntent, limit: usize) -> Vec<SearchRequest>;

    async fn fetch(&self, request: &SearchRequest) -> Result<Vec<Listing>, ProviderError>;

    /// Secondary lookup for contact fields. `budget` is the time left for the search.
    async fn enrich(
        &self,
        _listing: &Listing,
        _budget: Duration,
    ) -> Result<ContactDetails, ProviderError> {
        Ok(ContactDetails::default())
    }
}

/// Providers with a configured key, in query order.
pub fn providers_from_keys(
    client: &reqwest::Client,
    keys: &ApiKeySettings,
) -> Vec<Box<dyn CompanyProvider>> {
    let mut providers: Vec<Box<dyn CompanyProvider>> = vec![];

    if let Some(key) = keys.google_places() {
        providers.push(Box::new(GooglePlaces::new(
            client.clone(),
            key,
            ContactPageScraper::new(client.clone()),
        )));
    }
    if let Some(key) = keys.yelp() {
        providers.push(Box::new(Yelp::new(client.clone(), key)));
    }
    if let Some(key) = keys.apollo() {
        providers.push(Box::new(Apollo::new(client.clone(), key)));
    }

    providers
}

/// Clamps a fixed per-call timeout to what is left of the search budget.
pub(crate) fn bounded_timeout(per_call: Duration, budget: Duration) -> Duration {
    per_call.min(budget).max(Duration::from_millis(100))
}
