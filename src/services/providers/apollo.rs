use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::domain::{
    company::{CompanyRecord, Source},
    history::SearchKind,
    relevance::{looks_transportation_related, Candidate},
    search::{Region, SearchIntent},
};

use super::{CompanyProvider, Listing, ProviderError, SearchRequest};

const SEARCH_URL: &str = "https://api.apollo.io/v1/organizations/search";
const SEARCH_TIMEOUT: Duration = Duration::from_secs(15);
const MAX_PER_PAGE: usize = 25;
const ORGANIZATION_KEYWORDS: [&str; 7] = [
    "manufacturing",
    "warehouse",
    "distribution",
    "logistics",
    "freight",
    "wholesale",
    "industrial",
];
const EXCLUDED_KEYWORDS: [&str; 7] = [
    "restaurant",
    "cafe",
    "retail store",
    "shop",
    "salon",
    "spa",
    "gym",
];
const EMPLOYEE_RANGES: [&str; 8] = [
    "1,10",
    "11,50",
    "51,200",
    "201,500",
    "501,1000",
    "1001,5000",
    "5001,10000",
    "10001,",
];
const RETAIL_NAME_WORDS: [&str; 5] = ["restaurant", "cafe", "retail", "shop", "store"];
const DEFAULT_COUNTRY: &str = "United States";

pub struct Apollo {
    client: reqwest::Client,
    api_key: String,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    organizations: Vec<Organization>,
}

#[derive(Deserialize)]
struct Organization {
    #[serde(default)]
    id: String,
    #[serde(default)]
    name: String,
    website_url: Option<String>,
    email: Option<String>,
    #[serde(default)]
    phone_numbers: Vec<PhoneNumber>,
    #[serde(default)]
    organization_raw_addresses: Vec<RawAddress>,
    #[serde(default)]
    industry: Value,
    estimated_num_employees: Option<u64>,
    #[serde(default)]
    estimated_annual_revenue: Value,
}

#[derive(Deserialize)]
struct PhoneNumber {
    raw_number: Option<String>,
}

#[derive(Deserialize)]
struct RawAddress {
    street_address: Option<String>,
    city: Option<String>,
    state: Option<String>,
    postal_code: Option<String>,
    country: Option<String>,
}

impl Apollo {
    pub fn new(client: reqwest::Client, api_key: String) -> Self {
        Apollo { client, api_key }
    }
}

#[async_trait]
impl CompanyProvider for Apollo {
    fn name(&self) -> &'static str {
        "Apollo"
    }

    fn call_delay(&self) -> Duration {
        Duration::from_millis(500)
    }

    fn plan(&self, intent: &SearchIntent, limit: usize) -> Vec<SearchRequest> {
        vec![SearchRequest {
            query: keyword_query(intent),
            region: Region::NorthAmerica,
            industry_label: intent.industry_label(),
            limit: limit.min(MAX_PER_PAGE),
        }]
    }

    async fn fetch(&self, request: &SearchRequest) -> Result<Vec<Listing>, ProviderError> {
        let payload = json!({
            "api_key": self.api_key,
            "q_keywords": request.query,
            "page": 1,
            "per_page": request.limit,
            "organization_locations": request.region.countries(),
            "organization_keywords": ORGANIZATION_KEYWORDS,
            "organization_num_employees_ranges": EMPLOYEE_RANGES,
            "exclude_organization_keywords": EXCLUDED_KEYWORDS,
        });

        let response = self
            .client
            .post(SEARCH_URL)
            .basic_auth(&self.api_key, Some("X"))
            .header("Cache-Control", "no-cache")
            .json(&payload)
            .timeout(SEARCH_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            match status.as_u16() {
                401 => log::error!("Apollo authentication failed, check the API key"),
                429 => log::error!("Apollo rate limit exceeded"),
                code => log::error!("Apollo returned HTTP {}", code),
            }
            return Err(ProviderError::Status(status.as_u16()));
        }

        let response = response.json::<SearchResponse>().await?;

        Ok(into_listings(response, request))
    }
}

fn keyword_query(intent: &SearchIntent) -> String {
    let q = &intent.query;
    match intent.kind {
        SearchKind::Product => {
            format!("{q} manufacturer OR {q} manufacturing OR {q} factory")
        }
        SearchKind::Industry if looks_transportation_related(q) => q.clone(),
        SearchKind::Industry => format!(
            "{q} manufacturing OR {q} distribution OR {q} warehouse OR {q} logistics"
        ),
    }
}

fn looks_like_retail(name: &str) -> bool {
    let name = name.to_lowercase();
    RETAIL_NAME_WORDS.iter().any(|&word| name.contains(word))
        && !name.contains("wholesale")
        && !name.contains("distribution")
}

/// Industry values, as a list of labels. Apollo sends either a string or a list.
fn industry_labels(industry: &Value) -> Vec<String> {
    match industry {
        Value::String(s) if !s.trim().is_empty() => vec![s.trim().to_string()],
        Value::Array(items) => items
            .iter()
            .filter_map(|i| i.as_str())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        _ => vec![],
    }
}

fn industry_tags(labels: &[String]) -> Vec<String> {
    labels
        .iter()
        .flat_map(|label| {
            label
                .split(|c: char| !c.is_alphanumeric() && c != '_')
                .filter(|word| !word.is_empty())
                .map(str::to_lowercase)
                .collect::<Vec<String>>()
        })
        .collect()
}

fn value_to_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn into_listings(response: SearchResponse, request: &SearchRequest) -> Vec<Listing> {
    response
        .organizations
        .into_iter()
        .filter(|org| {
            let retail = looks_like_retail(&org.name);
            if retail {
                log::info!("Skipping retail organization {}", org.name);
            }
            !retail
        })
        .map(|org| {
            let primary = org.organization_raw_addresses.first();
            let address = primary
                .map(|a| {
                    [&a.street_address, &a.city, &a.state, &a.postal_code]
                        .into_iter()
                        .flatten()
                        .filter(|part| !part.trim().is_empty())
                        .cloned()
                        .collect::<Vec<String>>()
                        .join(", ")
                })
                .unwrap_or_default();
            let country = primary
                .and_then(|a| a.country.clone())
                .filter(|c| !c.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_COUNTRY.to_string());

            let labels = industry_labels(&org.industry);
            let business_type = match labels.is_empty() {
                true => "B2B Company".to_string(),
                false => labels.iter().take(3).cloned().collect::<Vec<_>>().join(", "),
            };

            let mut company = CompanyRecord::new(&org.name, &address, Source::Apollo);
            company.phone = org
                .phone_numbers
                .first()
                .and_then(|p| p.raw_number.clone())
                .unwrap_or_default();
            company.email = org.email.unwrap_or_default();
            company.website = org.website_url.unwrap_or_default();
            company.country = country;
            company.industry = request.industry_label.clone();
            company.place_id = org.id;
            company.business_type = business_type;
            company.employee_count = org.estimated_num_employees;
            company.revenue = value_to_text(&org.estimated_annual_revenue);

            Listing {
                candidate: Candidate {
                    tags: industry_tags(&labels),
                    name: org.name,
                    address,
                    status: None,
                },
                company,
                detail_id: None,
            }
        })
        .collect()
}
