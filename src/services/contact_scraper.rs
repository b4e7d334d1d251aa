use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::header::USER_AGENT;
use scraper::{Html, Selector};
use tokio::time::Instant;
use url::Url;

const CONTACT_PATHS: [&str; 2] = ["/contact", "/contact-us"];
const PAGE_TIMEOUT: Duration = Duration::from_secs(5);
const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko)";
const IGNORED_EMAIL_PARTS: [&str; 5] = [
    "example.com",
    "test.com",
    "placeholder",
    "noreply",
    "no-reply",
];

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").unwrap()
});

/// Looks for a public email address on a company's contact page.
pub struct ContactPageScraper {
    client: reqwest::Client,
}

impl ContactPageScraper {
    pub fn new(client: reqwest::Client) -> Self {
        ContactPageScraper { client }
    }

    pub async fn find_email(&self, website: &str, budget: Duration) -> Option<String> {
        let started = Instant::now();

        for url in contact_urls(website) {
            let remaining = budget.saturating_sub(started.elapsed());
            if remaining.is_zero() {
                log::info!("No time left to scrape contact pages of {}", website);
                break;
            }

            let response = self
                .client
                .get(url.clone())
                .header(USER_AGENT, BROWSER_USER_AGENT)
                .timeout(PAGE_TIMEOUT.min(remaining))
                .send()
                .await;

            let html = match response {
                Ok(res) if res.status().is_success() => match res.text().await {
                    Ok(html) => html,
                    Err(e) => {
                        log::warn!("Failed to read contact page {}: {:?}", url, e);
                        continue;
                    }
                },
                Ok(res) => {
                    log::info!("Contact page {} answered {}", url, res.status());
                    continue;
                }
                Err(e) => {
                    log::warn!("Failed to fetch contact page {}: {:?}", url, e);
                    continue;
                }
            };

            if let Some(email) = extract_email(&html) {
                return Some(email);
            }
        }

        None
    }
}

fn contact_urls(website: &str) -> Vec<Url> {
    if !website.starts_with("http") {
        return vec![];
    }
    let Ok(base) = Url::parse(website) else {
        return vec![];
    };

    CONTACT_PATHS
        .iter()
        .filter_map(|path| base.join(path).ok())
        .collect()
}

fn is_business_email(email: &str) -> bool {
    let email = email.to_lowercase();
    !IGNORED_EMAIL_PARTS.iter().any(|part| email.contains(part))
}

/// First usable address on the page, preferring `mailto:` links over plain text.
pub fn extract_email(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let mailto_selector = Selector::parse(r#"a[href^="mailto:"]"#).ok()?;

    let from_links = document
        .select(&mailto_selector)
        .filter_map(|tag| tag.value().attr("href"))
        .filter_map(|href| href.strip_prefix("mailto:"))
        .map(|address| address.split('?').next().unwrap_or_default().trim())
        .filter(|address| EMAIL_PATTERN.is_match(address))
        .find(|address| is_business_email(address))
        .map(str::to_string);

    from_links.or_else(|| {
        EMAIL_PATTERN
            .find_iter(html)
            .map(|m| m.as_str())
            .find(|address| is_business_email(address))
            .map(str::to_string)
    })
}
