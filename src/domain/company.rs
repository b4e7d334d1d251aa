use itertools::Itertools;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    GooglePlaces,
    Yelp,
    Apollo,
}

/// An accepted company, as returned to the client and written to exports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyRecord {
    pub name: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub website: String,
    pub rating: Option<f64>,
    pub country: String,
    pub industry: String,
    pub business_type: String,
    pub source: Source,
    pub place_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revenue: Option<String>,
}

/// Contact fields found by a secondary lookup. Empty values never overwrite.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContactDetails {
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
}

impl CompanyRecord {
    pub fn new(name: &str, address: &str, source: Source) -> Self {
        CompanyRecord {
            name: name.to_string(),
            address: address.to_string(),
            phone: String::new(),
            email: String::new(),
            website: String::new(),
            rating: None,
            country: String::new(),
            industry: String::new(),
            business_type: String::new(),
            source,
            place_id: String::new(),
            employee_count: None,
            revenue: None,
        }
    }

    /// Lowercased, trimmed (name, address); unique within one result set.
    pub fn dedup_key(&self) -> (String, String) {
        (
            self.name.trim().to_lowercase(),
            self.address.trim().to_lowercase(),
        )
    }

    pub fn apply_details(&mut self, details: ContactDetails) {
        let fill = |field: &mut String, value: Option<String>| {
            if let Some(value) = value.filter(|v| !v.trim().is_empty()) {
                *field = value;
            }
        };
        fill(&mut self.phone, details.phone);
        fill(&mut self.email, details.email);
        fill(&mut self.website, details.website);
    }
}

/// Drops nameless records and later duplicates, keeping first-seen order.
pub fn dedup_companies(companies: Vec<CompanyRecord>) -> Vec<CompanyRecord> {
    companies
        .into_iter()
        .filter(|company| !company.name.trim().is_empty())
        .unique_by(CompanyRecord::dedup_key)
        .collect()
}
