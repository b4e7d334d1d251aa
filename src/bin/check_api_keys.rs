use std::{process::ExitCode, time::Duration};

use env_logger::Env;
use haulscout::{
    configuration::get_configuration,
    domain::search::Region,
    services::providers::{providers_from_keys, SearchRequest},
};

const PRIMARY_PROVIDERS: [&str; 2] = ["Google Places", "Yelp"];

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    let configuration = get_configuration()?;
    let client = reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(5))
        .build()?;

    if !configuration.api_keys.has_primary() {
        println!("No primary API key found. Set GOOGLE_PLACES_API_KEY or YELP_API_KEY.");
        return Ok(ExitCode::FAILURE);
    }

    let probe = SearchRequest {
        query: "technology companies".to_string(),
        region: Region::Canada,
        industry_label: "technology".to_string(),
        limit: 5,
    };

    let mut primary_failed = false;
    for provider in providers_from_keys(&client, &configuration.api_keys) {
        match provider.fetch(&probe).await {
            Ok(listings) => {
                println!("{:<14} OK ({} results)", provider.name(), listings.len())
            }
            Err(e) => {
                println!("{:<14} FAILED: {}", provider.name(), e);
                primary_failed |= PRIMARY_PROVIDERS.contains(&provider.name());
            }
        }
    }

    match primary_failed {
        true => Ok(ExitCode::FAILURE),
        false => Ok(ExitCode::SUCCESS),
    }
}
