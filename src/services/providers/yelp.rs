use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::domain::{
    company::{CompanyRecord, ContactDetails, Source},
    history::SearchKind,
    relevance::{looks_transportation_related, Candidate},
    search::{Region, SearchIntent},
};

use super::{bounded_timeout, CompanyProvider, Listing, ProviderError, SearchRequest};

const SEARCH_URL: &str = "https://api.yelp.com/v3/businesses/search";
const BUSINESS_URL: &str = "https://api.yelp.com/v3/businesses";
const SEARCH_TIMEOUT: Duration = Duration::from_secs(10);
const DETAILS_TIMEOUT: Duration = Duration::from_secs(5);
const MAX_LIMIT: usize = 50;

pub struct Yelp {
    client: reqwest::Client,
    api_key: String,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    businesses: Vec<Business>,
}

#[derive(Deserialize)]
struct Business {
    #[serde(default)]
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    is_closed: bool,
    #[serde(default)]
    categories: Vec<Category>,
    location: Option<Location>,
    #[serde(default)]
    phone: String,
    #[serde(default)]
    url: String,
    rating: Option<f64>,
}

#[derive(Deserialize)]
struct Category {
    alias: String,
    title: String,
}

#[derive(Deserialize)]
struct Location {
    #[serde(default)]
    display_address: Vec<String>,
}

#[derive(Deserialize)]
struct BusinessDetails {
    #[serde(default)]
    phone: String,
    #[serde(default)]
    url: String,
}

impl Yelp {
    pub fn new(client: reqwest::Client, api_key: String) -> Self {
        Yelp { client, api_key }
    }
}

#[async_trait]
impl CompanyProvider for Yelp {
    fn name(&self) -> &'static str {
        "Yelp"
    }

    fn call_delay(&self) -> Duration {
        Duration::from_millis(200)
    }

    fn plan(&self, intent: &SearchIntent, limit: usize) -> Vec<SearchRequest> {
        let Some(term) = intent.terms().into_iter().next() else {
            return vec![];
        };
        let term = match intent.kind {
            SearchKind::Industry if !looks_transportation_related(&term) => {
                format!("{} manufacturing", term)
            }
            _ => term,
        };

        [Region::Canada, Region::UnitedStates]
            .into_iter()
            .map(|region| SearchRequest {
                query: term.clone(),
                region,
                industry_label: intent.industry_label(),
                limit: limit.min(MAX_LIMIT),
            })
            .collect()
    }

    async fn fetch(&self, request: &SearchRequest) -> Result<Vec<Listing>, ProviderError> {
        let limit = request.limit.to_string();
        let response = self
            .client
            .get(SEARCH_URL)
            .bearer_auth(&self.api_key)
            .query(&[
                ("term", request.query.as_str()),
                ("location", request.region.country_code()),
                ("limit", limit.as_str()),
                ("sort_by", "rating"),
            ])
            .timeout(SEARCH_TIMEOUT)
            .send()
            .await?
            .error_for_status()?
            .json::<SearchResponse>()
            .await?;

        Ok(into_listings(response, request))
    }

    async fn enrich(
        &self,
        listing: &Listing,
        budget: Duration,
    ) -> Result<ContactDetails, ProviderError> {
        let Some(id) = listing.detail_id.as_deref() else {
            return Ok(ContactDetails::default());
        };

        let details = self
            .client
            .get(format!("{}/{}", BUSINESS_URL, id))
            .bearer_auth(&self.api_key)
            .timeout(bounded_timeout(DETAILS_TIMEOUT, budget))
            .send()
            .await?
            .error_for_status()?
            .json::<BusinessDetails>()
            .await?;

        Ok(ContactDetails {
            phone: Some(details.phone),
            email: None,
            website: Some(details.url),
        })
    }
}

fn into_listings(response: SearchResponse, request: &SearchRequest) -> Vec<Listing> {
    response
        .businesses
        .into_iter()
        .take(request.limit)
        .map(|business| {
            let address = business
                .location
                .map(|l| l.display_address.join(", "))
                .unwrap_or_default();

            let mut company = CompanyRecord::new(&business.name, &address, Source::Yelp);
            company.phone = business.phone;
            company.website = business.url;
            company.rating = business.rating;
            company.country = request.region.display_name().to_string();
            company.industry = request.industry_label.clone();
            company.place_id = business.id.clone();
            company.business_type = business
                .categories
                .iter()
                .take(3)
                .map(|c| c.title.as_str())
                .collect::<Vec<&str>>()
                .join(", ");

            // Every directory entry is a business in its own right.
            let mut tags: Vec<String> = business.categories.into_iter().map(|c| c.alias).collect();
            tags.push("establishment".to_string());

            let status = match business.is_closed {
                true => "CLOSED",
                false => "OPERATIONAL",
            };

            Listing {
                candidate: Candidate {
                    tags,
                    name: business.name,
                    address,
                    status: Some(status.to_string()),
                },
                company,
                detail_id: Some(business.id).filter(|id| !id.is_empty()),
            }
        })
        .collect()
}
