/// Business types that never need freight services (retail, food, personal care, finance...).
pub const EXCLUDED_TYPES: [&str; 28] = [
    "restaurant",
    "cafe",
    "coffee_shop",
    "bakery",
    "food",
    "clothing_store",
    "shoe_store",
    "jewelry_store",
    "book_store",
    "convenience_store",
    "supermarket",
    "grocery_or_supermarket",
    "hair_care",
    "beauty_salon",
    "spa",
    "gym",
    "fitness_center",
    "gas_station",
    "pharmacy",
    "drugstore",
    "bank",
    "atm",
    "real_estate_agency",
    "travel_agency",
    "tourist_attraction",
    "store",
    "shopping_mall",
    "department_store",
];

/// Business types that almost always move goods.
pub const PRIORITY_TYPES: [&str; 16] = [
    "manufacturing",
    "factory",
    "warehouse",
    "distribution",
    "logistics",
    "freight",
    "shipping",
    "transportation",
    "wholesale",
    "industrial",
    "construction",
    "mining",
    "agriculture",
    "farm",
    "processing",
    "assembly",
];

pub const TRANSPORTATION_KEYWORDS: [&str; 24] = [
    "manufacturing",
    "factory",
    "warehouse",
    "distribution",
    "logistics",
    "freight",
    "shipping",
    "transport",
    "wholesale",
    "industrial",
    "construction",
    "mining",
    "agriculture",
    "farm",
    "processing",
    "assembly",
    "supply chain",
    "fulfillment",
    "storage",
    "cargo",
    "import",
    "export",
    "trucking",
    "delivery",
];

const RETAIL_INDICATORS: [&str; 5] = ["store", "shop", "retail", "outlet", "mall"];
const RETAIL_OVERRIDES: [&str; 2] = ["wholesale", "distribution"];
const BUSINESS_MARKERS: [&str; 2] = ["establishment", "point_of_interest"];
const OPERATIONAL: &str = "OPERATIONAL";

/// A raw provider listing, reduced to the fields the relevance rules look at.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Candidate {
    pub tags: Vec<String>,
    pub name: String,
    pub address: String,
    pub status: Option<String>,
}

impl Candidate {
    pub fn new(name: &str, address: &str) -> Self {
        Candidate {
            name: name.to_string(),
            address: address.to_string(),
            ..Default::default()
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_status(mut self, status: &str) -> Self {
        self.status = Some(status.to_string());
        self
    }

    fn has_tag_in(&self, set: &[&str]) -> bool {
        self.tags.iter().any(|tag| set.contains(&tag.as_str()))
    }
}

/// Decides whether a candidate looks like a company that ships goods.
///
/// Rules are checked in order and the first one that matches decides:
/// excluded tag, priority tag, transportation keyword in name or address,
/// retail-looking name, non-operational status, generic business marker.
pub fn is_relevant(candidate: &Candidate) -> bool {
    if candidate.has_tag_in(&EXCLUDED_TYPES) {
        return false;
    }

    if candidate.has_tag_in(&PRIORITY_TYPES) {
        return true;
    }

    let name = candidate.name.to_lowercase();
    let combined = format!("{} {}", name, candidate.address.to_lowercase());
    if TRANSPORTATION_KEYWORDS
        .iter()
        .any(|&keyword| combined.contains(keyword))
    {
        return true;
    }

    if RETAIL_INDICATORS.iter().any(|&word| name.contains(word))
        && !RETAIL_OVERRIDES.iter().any(|&word| name.contains(word))
    {
        return false;
    }

    match candidate.status.as_deref() {
        Some(status) if !status.is_empty() && status != OPERATIONAL => {
            return false
        }
        _ => {}
    }

    candidate.has_tag_in(&BUSINESS_MARKERS)
}

/// True when a free-text query already names a transportation-heavy activity.
pub fn looks_transportation_related(query: &str) -> bool {
    let query = query.trim().to_lowercase();
    TRANSPORTATION_KEYWORDS
        .iter()
        .any(|&keyword| query.contains(keyword))
}

#[cfg(test)]
mod tests {
    use super::{is_relevant, looks_transportation_related, Candidate, EXCLUDED_TYPES};

    #[test]
    fn excluded_tag_rejects_everything_else() {
        let candidate = Candidate::new("Joe's Cafe", "12 Logistics Park, Freight Rd")
            .with_tags(["cafe", "warehouse", "establishment"])
            .with_status("OPERATIONAL");

        assert!(!is_relevant(&candidate));
    }

    #[test]
    fn every_excluded_tag_rejects() {
        for tag in EXCLUDED_TYPES {
            let candidate = Candidate::new("Acme Freight", "").with_tags([tag, "logistics"]);
            assert!(!is_relevant(&candidate), "tag {} should reject", tag);
        }
    }

    #[test]
    fn department_store_is_excluded() {
        let candidate = Candidate::new("Hudson's Bay", "176 Yonge St")
            .with_tags(["department_store", "establishment"])
            .with_status("OPERATIONAL");

        assert_eq!(EXCLUDED_TYPES.len(), 28);
        assert!(!is_relevant(&candidate));
    }

    #[test]
    fn priority_tag_accepts() {
        let candidate = Candidate::new("Acme Storage", "").with_tags(["warehouse"]);

        assert!(is_relevant(&candidate));
    }

    #[test]
    fn priority_tag_beats_retail_name_and_closed_status() {
        let candidate = Candidate::new("Gift Shop Outlet", "")
            .with_tags(["factory"])
            .with_status("CLOSED_PERMANENTLY");

        assert!(is_relevant(&candidate));
    }

    #[test]
    fn keyword_in_address_accepts() {
        let candidate = Candidate::new("Northwind", "400 Industrial Pkwy, Toronto");

        assert!(is_relevant(&candidate));
    }

    #[test]
    fn keyword_match_is_case_insensitive_and_substring() {
        let candidate = Candidate::new("TRANSPORTES DEL NORTE", "");

        assert!(is_relevant(&candidate));
    }

    #[test]
    fn keyword_beats_retail_name() {
        let candidate = Candidate::new("Cargo Shop", "5 Elm St");

        assert!(is_relevant(&candidate));
    }

    #[test]
    fn wholesale_overrides_retail_indicator() {
        let candidate = Candidate::new("City Wholesale Shop", "123 Main St");

        assert!(is_relevant(&candidate));
    }

    #[test]
    fn retail_name_rejects_even_when_operational_business() {
        let candidate = Candidate::new("Downtown Gift Shop", "5 Elm St")
            .with_tags(["establishment"])
            .with_status("OPERATIONAL");

        assert!(!is_relevant(&candidate));
    }

    #[test]
    fn non_operational_status_rejects() {
        let candidate = Candidate::new("Maple Holdings", "1 King St")
            .with_tags(["establishment"])
            .with_status("CLOSED_TEMPORARILY");

        assert!(!is_relevant(&candidate));
    }

    #[test]
    fn status_must_match_exactly() {
        let candidate = Candidate::new("Maple Holdings", "1 King St")
            .with_tags(["establishment"])
            .with_status("operational");

        assert!(!is_relevant(&candidate));
    }

    #[test]
    fn empty_status_is_treated_as_missing() {
        let candidate = Candidate::new("Maple Holdings", "1 King St")
            .with_tags(["point_of_interest"])
            .with_status("");

        assert!(is_relevant(&candidate));
    }

    #[test]
    fn operational_business_marker_accepts() {
        let candidate = Candidate::new("Maple Holdings", "1 King St")
            .with_tags(["establishment"])
            .with_status("OPERATIONAL");

        assert!(is_relevant(&candidate));
    }

    #[test]
    fn no_marker_rejects() {
        let candidate = Candidate::new("Maple Holdings", "1 King St").with_tags(["lawyer"]);

        assert!(!is_relevant(&candidate));
    }

    #[test]
    fn transportation_query_detection() {
        assert!(looks_transportation_related("Freight forwarding"));
        assert!(looks_transportation_related("  cold storage "));
        assert!(!looks_transportation_related("furniture"));
    }
}
