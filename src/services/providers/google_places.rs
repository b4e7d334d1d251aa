use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::time::Instant;

use crate::{
    domain::{
        company::{CompanyRecord, ContactDetails, Source},
        history::SearchKind,
        relevance::{looks_transportation_related, Candidate},
        search::{Region, SearchIntent},
    },
    services::ContactPageScraper,
};

use super::{bounded_timeout, CompanyProvider, Listing, ProviderError, SearchRequest};

const TEXT_SEARCH_URL: &str = "https://maps.googleapis.com/maps/api/place/textsearch/json";
const DETAILS_URL: &str = "https://maps.googleapis.com/maps/api/place/details/json";
const DETAIL_FIELDS: &str = "formatted_phone_number,international_phone_number,website";
const SEARCH_TIMEOUT: Duration = Duration::from_secs(10);
const DETAILS_TIMEOUT: Duration = Duration::from_secs(2);
const GENERIC_TYPES: [&str; 2] = ["point_of_interest", "establishment"];

pub struct GooglePlaces {
    client: reqwest::Client,
    api_key: String,
    scraper: ContactPageScraper,
}

#[derive(Deserialize)]
struct TextSearchResponse {
    status: String,
    #[serde(default)]
    results: Vec<Place>,
    error_message: Option<String>,
}

#[derive(Deserialize)]
struct Place {
    #[serde(default)]
    place_id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    formatted_address: String,
    #[serde(default)]
    types: Vec<String>,
    business_status: Option<String>,
    rating: Option<f64>,
    formatted_phone_number: Option<String>,
    website: Option<String>,
}

#[derive(Deserialize)]
struct DetailsResponse {
    status: String,
    result: Option<PlaceDetails>,
}

#[derive(Deserialize)]
struct PlaceDetails {
    formatted_phone_number: Option<String>,
    international_phone_number: Option<String>,
    website: Option<String>,
}

impl GooglePlaces {
    pub fn new(client: reqwest::Client, api_key: String, scraper: ContactPageScraper) -> Self {
        GooglePlaces {
            client,
            api_key,
            scraper,
        }
    }
}

#[async_trait]
impl CompanyProvider for GooglePlaces {
    fn name(&self) -> &'static str {
        "Google Places"
    }

    fn call_delay(&self) -> Duration {
        Duration::from_millis(200)
    }

    fn plan(&self, intent: &SearchIntent, limit: usize) -> Vec<SearchRequest> {
        let industry_label = intent.industry_label();

        intent
            .terms()
            .iter()
            .flat_map(|term| {
                [Region::Canada, Region::UnitedStates].map(|region| SearchRequest {
                    query: text_query(intent.kind, term, region),
                    region,
                    industry_label: industry_label.clone(),
                    limit,
                })
            })
            .collect()
    }

    async fn fetch(&self, request: &SearchRequest) -> Result<Vec<Listing>, ProviderError> {
        let response = self
            .client
            .get(TEXT_SEARCH_URL)
            .query(&[
                ("query", request.query.as_str()),
                ("key", self.api_key.as_str()),
                ("type", "establishment"),
            ])
            .timeout(SEARCH_TIMEOUT)
            .send()
            .await?
            .error_for_status()?
            .json::<TextSearchResponse>()
            .await?;

        into_listings(response, request)
    }

    async fn enrich(
        &self,
        listing: &Listing,
        budget: Duration,
    ) -> Result<ContactDetails, ProviderError> {
        let Some(place_id) = listing.detail_id.as_deref().filter(|id| !id.is_empty()) else {
            return Ok(ContactDetails::default());
        };
        let started = Instant::now();

        let response = self
            .client
            .get(DETAILS_URL)
            .query(&[
                ("place_id", place_id),
                ("key", self.api_key.as_str()),
                ("fields", DETAIL_FIELDS),
            ])
            .timeout(bounded_timeout(DETAILS_TIMEOUT, budget))
            .send()
            .await?
            .error_for_status()?
            .json::<DetailsResponse>()
            .await?;

        let mut details = match (response.status.as_str(), response.result) {
            ("OK", Some(result)) => ContactDetails {
                phone: result
                    .formatted_phone_number
                    .or(result.international_phone_number),
                email: None,
                website: result.website,
            },
            (status, _) => {
                log::warn!("Place details for {} returned {}", place_id, status);
                return Ok(ContactDetails::default());
            }
        };

        let website = details
            .website
            .clone()
            .filter(|w| !w.is_empty())
            .or_else(|| Some(listing.company.website.clone()).filter(|w| !w.is_empty()));
        if let Some(website) = website {
            let remaining = budget.saturating_sub(started.elapsed());
            details.email = self.scraper.find_email(&website, remaining).await;
        }

        Ok(details)
    }
}

fn text_query(kind: SearchKind, term: &str, region: Region) -> String {
    match kind {
        SearchKind::Industry if looks_transportation_related(term) => {
            format!("{} companies in {}", term, region.display_name())
        }
        SearchKind::Industry => {
            format!("{} manufacturing companies in {}", term, region.display_name())
        }
        SearchKind::Product => format!("{} in {}", term, region.display_name()),
    }
}

fn into_listings(
    response: TextSearchResponse,
    request: &SearchRequest,
) -> Result<Vec<Listing>, ProviderError> {
    match response.status.as_str() {
        "OK" => {}
        "ZERO_RESULTS" => return Ok(vec![]),
        "OVER_QUERY_LIMIT" => return Err(ProviderError::QuotaExceeded),
        "REQUEST_DENIED" => {
            return Err(ProviderError::RequestDenied(
                response.error_message.unwrap_or_default(),
            ))
        }
        other => return Err(ProviderError::UnexpectedStatus(other.to_string())),
    }

    let listings = response
        .results
        .into_iter()
        .take(request.limit)
        .map(|place| {
            let mut company =
                CompanyRecord::new(&place.name, &place.formatted_address, Source::GooglePlaces);
            company.phone = place.formatted_phone_number.unwrap_or_default();
            company.website = place.website.unwrap_or_default();
            company.rating = place.rating;
            company.country = request.region.display_name().to_string();
            company.industry = request.industry_label.clone();
            company.place_id = place.place_id.clone();
            company.business_type = place
                .types
                .iter()
                .filter(|t| !GENERIC_TYPES.contains(&t.as_str()))
                .take(3)
                .cloned()
                .collect::<Vec<String>>()
                .join(", ");

            let candidate = Candidate {
                tags: place.types,
                name: place.name,
                address: place.formatted_address,
                status: place.business_status,
            };

            Listing {
                candidate,
                company,
                detail_id: Some(place.place_id).filter(|id| !id.is_empty()),
            }
        })
        .collect();

    Ok(listings)
}
