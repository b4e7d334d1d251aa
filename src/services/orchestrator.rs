use std::{collections::HashSet, time::Duration};

use tokio::time::Instant;

use crate::{
    configuration::SearchSettings,
    domain::{
        company::{dedup_companies, CompanyRecord, ContactDetails},
        progress::ProgressStatus,
        relevance::is_relevant,
        search::SearchIntent,
    },
    services::{
        providers::{CompanyProvider, Listing, ProviderError, SearchRequest},
        ProgressTracker,
    },
};

const SLOW_DETAIL_LOOKUP: Duration = Duration::from_millis(4500);
const STEP_NAME_CHARS: usize = 40;

#[derive(Debug, Clone, PartialEq)]
pub struct SearchLimits {
    pub result_cap: usize,
    pub time_budget: Duration,
    pub per_call_limit: usize,
    pub detail_margin: Duration,
}

impl From<&SearchSettings> for SearchLimits {
    fn from(settings: &SearchSettings) -> Self {
        SearchLimits {
            result_cap: settings.result_cap,
            time_budget: Duration::from_secs(settings.time_budget_secs),
            per_call_limit: settings.per_call_limit,
            detail_margin: Duration::from_secs(settings.detail_margin_secs),
        }
    }
}

struct Deadline {
    started: Instant,
    budget: Duration,
}

impl Deadline {
    fn start(budget: Duration) -> Self {
        Deadline {
            started: Instant::now(),
            budget,
        }
    }

    fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    fn remaining(&self) -> Duration {
        self.budget.saturating_sub(self.elapsed())
    }

    fn is_expired(&self) -> bool {
        self.elapsed() > self.budget
    }
}

/// Accepted companies in first-seen order, unique by name and address.
#[derive(Default)]
struct Collector {
    companies: Vec<CompanyRecord>,
    seen: HashSet<(String, String)>,
}

impl Collector {
    fn len(&self) -> usize {
        self.companies.len()
    }

    fn push(&mut self, company: CompanyRecord) -> bool {
        if company.name.trim().is_empty() || !self.seen.insert(company.dedup_key()) {
            return false;
        }
        self.companies.push(company);
        true
    }
}

/// Queries providers one call at a time until the cap or the time budget is hit.
pub struct SearchOrchestrator {
    providers: Vec<Box<dyn CompanyProvider>>,
    limits: SearchLimits,
}

impl SearchOrchestrator {
    pub fn new(providers: Vec<Box<dyn CompanyProvider>>, limits: SearchLimits) -> Self {
        SearchOrchestrator { providers, limits }
    }

    /// Never fails: provider errors are reported and the search moves on.
    pub async fn find_companies(
        &self,
        intent: &SearchIntent,
        progress: &ProgressTracker,
    ) -> Vec<CompanyRecord> {
        let deadline = Deadline::start(self.limits.time_budget);
        let mut found = Collector::default();

        let calls: Vec<(&dyn CompanyProvider, SearchRequest)> = self
            .providers
            .iter()
            .flat_map(|provider| {
                provider
                    .plan(intent, self.limits.per_call_limit)
                    .into_iter()
                    .map(move |request| (provider.as_ref(), request))
            })
            .collect();
        let total_calls = calls.len();

        log::info!(
            "Searching {} provider calls for {:?} query: {}",
            total_calls,
            intent.kind,
            intent.query
        );

        for (index, (provider, request)) in calls.into_iter().enumerate() {
            if found.len() >= self.limits.result_cap {
                log::info!("Found enough companies ({}), stopping early", found.len());
                break;
            }
            if deadline.is_expired() {
                let elapsed = deadline.elapsed().as_secs_f32();
                log::warn!("Search budget spent after {:.1}s, stopping", elapsed);
                progress.update(
                    ProgressStatus::Warning,
                    "timeout",
                    found.len(),
                    Some(&format!("Stopping search to avoid timeout ({:.1}s)", elapsed)),
                );
                break;
            }

            progress.update(
                ProgressStatus::Searching,
                &format!(
                    "Searching {} in {}... ({}/{})",
                    provider.name(),
                    request.region.display_name(),
                    index + 1,
                    total_calls
                ),
                found.len(),
                Some(&format!("Query: {}", request.query)),
            );

            match provider.fetch(&request).await {
                Ok(listings) => {
                    self.accept_listings(
                        provider,
                        &request,
                        listings,
                        &deadline,
                        &mut found,
                        progress,
                    )
                    .await
                }
                Err(e) => report_provider_failure(provider, &request, &e, found.len(), progress),
            }

            if index + 1 < total_calls {
                tokio::time::sleep(provider.call_delay()).await;
            }
        }

        let mut companies = dedup_companies(found.companies);
        companies.truncate(self.limits.result_cap);

        log::info!(
            "Search for {} finished with {} companies in {:.1}s",
            intent.query,
            companies.len(),
            deadline.elapsed().as_secs_f32()
        );
        progress.update(
            ProgressStatus::Processing,
            "Merging results",
            companies.len(),
            Some(&format!("Found {} companies", companies.len())),
        );

        companies
    }

    async fn accept_listings(
        &self,
        provider: &dyn CompanyProvider,
        request: &SearchRequest,
        listings: Vec<Listing>,
        deadline: &Deadline,
        found: &mut Collector,
        progress: &ProgressTracker,
    ) {
        progress.update(
            ProgressStatus::Processing,
            &format!(
                "Processing {} results from {}...",
                listings.len(),
                request.region.display_name()
            ),
            found.len(),
            None,
        );

        for listing in listings {
            if found.len() >= self.limits.result_cap {
                break;
            }
            if deadline.is_expired() {
                log::warn!(
                    "Out of time while processing {} results, stopping",
                    provider.name()
                );
                break;
            }
            if !is_relevant(&listing.candidate) {
                log::debug!("Skipping irrelevant listing {}", listing.candidate.name);
                continue;
            }

            let label = short_name(&listing.company.name);
            progress.update(
                ProgressStatus::Processing,
                &format!("Processing: {}...", label),
                found.len(),
                None,
            );

            let remaining = deadline.remaining();
            let details = match remaining > self.limits.detail_margin {
                true => {
                    self.lookup_details(provider, &listing, remaining, found.len(), progress)
                        .await
                }
                false => None,
            };

            let mut company = listing.company;
            if let Some(details) = details {
                company.apply_details(details);
            }

            if found.push(company) {
                progress.update(
                    ProgressStatus::Found,
                    &format!("Found: {}...", label),
                    found.len(),
                    None,
                );
            }
        }
    }

    async fn lookup_details(
        &self,
        provider: &dyn CompanyProvider,
        listing: &Listing,
        budget: Duration,
        count: usize,
        progress: &ProgressTracker,
    ) -> Option<ContactDetails> {
        let started = Instant::now();
        let result = provider.enrich(listing, budget).await;
        let elapsed = started.elapsed();

        if elapsed > SLOW_DETAIL_LOOKUP {
            progress.update(
                ProgressStatus::Warning,
                "slow",
                count,
                Some(&format!("Slow API response ({:.1}s)", elapsed.as_secs_f32())),
            );
        }

        match result {
            Ok(details) => Some(details),
            Err(ProviderError::Timeout) => {
                progress.update(
                    ProgressStatus::Warning,
                    "timeout",
                    count,
                    Some("Timeout getting details, skipping..."),
                );
                None
            }
            Err(e) => {
                log::warn!("Detail lookup for {} failed: {}", listing.company.name, e);
                progress.update(
                    ProgressStatus::Warning,
                    "error",
                    count,
                    Some(&format!("Error getting details: {}", e)),
                );
                None
            }
        }
    }
}

fn short_name(name: &str) -> String {
    name.chars().take(STEP_NAME_CHARS).collect()
}

fn report_provider_failure(
    provider: &dyn CompanyProvider,
    request: &SearchRequest,
    error: &ProviderError,
    count: usize,
    progress: &ProgressTracker,
) {
    let region = request.region.display_name();
    log::error!("{} search in {} failed: {:?}", provider.name(), region, error);

    let (status, step, detail) = match error {
        ProviderError::Timeout => (
            ProgressStatus::Warning,
            "timeout",
            format!("Timeout searching {} in {}, skipping...", provider.name(), region),
        ),
        ProviderError::QuotaExceeded => (
            ProgressStatus::Error,
            "quota",
            format!("API quota exceeded for {} in {}", provider.name(), region),
        ),
        ProviderError::RequestDenied(message) => (
            ProgressStatus::Error,
            "denied",
            format!("Request denied for {}: {}", region, message),
        ),
        other => (
            ProgressStatus::Warning,
            "provider_error",
            format!("{} failed in {}: {}", provider.name(), region, other),
        ),
    };

    progress.update(status, step, count, Some(&detail));
}
