use super::history::SearchKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    Canada,
    UnitedStates,
    NorthAmerica,
}

impl Region {
    pub fn display_name(&self) -> &'static str {
        match self {
            Region::Canada => "Canada",
            Region::UnitedStates => "United States",
            Region::NorthAmerica => "North America",
        }
    }

    pub fn country_code(&self) -> &'static str {
        match self {
            Region::Canada => "CA",
            Region::UnitedStates => "US",
            Region::NorthAmerica => "CA,US",
        }
    }

    pub fn countries(&self) -> Vec<&'static str> {
        match self {
            Region::Canada => vec!["Canada"],
            Region::UnitedStates => vec!["United States"],
            Region::NorthAmerica => vec!["Canada", "United States"],
        }
    }
}

/// What the user asked for: an industry, or the makers of a product.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchIntent {
    pub kind: SearchKind,
    pub query: String,
    pub filter: Option<String>,
}

impl SearchIntent {
    pub fn industry(industry: &str) -> Self {
        SearchIntent {
            kind: SearchKind::Industry,
            query: industry.trim().to_string(),
            filter: None,
        }
    }

    pub fn product(product: &str, filter: Option<&str>) -> Self {
        SearchIntent {
            kind: SearchKind::Product,
            query: product.trim().to_string(),
            filter: filter
                .map(str::trim)
                .filter(|f| !f.is_empty())
                .map(str::to_string),
        }
    }

    /// Label written into each record's `industry` column.
    pub fn industry_label(&self) -> String {
        match self.kind {
            SearchKind::Industry => self.query.clone(),
            SearchKind::Product => format!("{} manufacturer", self.query),
        }
    }

    /// Search terms for providers that run one call per term.
    pub fn terms(&self) -> Vec<String> {
        match self.kind {
            SearchKind::Industry => vec![self.query.clone()],
            SearchKind::Product => {
                let product = &self.query;
                let suffix = self
                    .filter
                    .as_ref()
                    .map(|f| format!(" {}", f))
                    .unwrap_or_default();
                let mut terms: Vec<String> = ["manufacturer", "manufacturing", "factory"]
                    .iter()
                    .map(|word| format!("{} {}{}", product, word, suffix))
                    .collect();
                if let Some(filter) = &self.filter {
                    terms.push(format!("{} {} manufacturer", product, filter));
                }
                terms
            }
        }
    }
}
