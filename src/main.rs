use std::{net::TcpListener, sync::Arc, time::Duration};

use env_logger::Env;
use haulscout::{
    configuration::get_configuration,
    dal::{HistoryStore, JsonFileHistoryStore},
    services::{providers::providers_from_keys, SearchLimits, SearchOrchestrator},
    startup::run,
};

#[tokio::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let configuration = get_configuration().expect("Failed to read configuration.");

    let client = reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(5))
        .build()
        .expect("Failed to build HTTP client.");

    let providers = providers_from_keys(&client, &configuration.api_keys);
    if !configuration.api_keys.has_primary() {
        log::warn!("Neither GOOGLE_PLACES_API_KEY nor YELP_API_KEY is set, searches will be rejected");
    }
    log::info!(
        "Configured providers: {:?}",
        providers.iter().map(|p| p.name()).collect::<Vec<_>>()
    );
    let orchestrator = SearchOrchestrator::new(
        providers,
        SearchLimits::from(&configuration.search),
    );

    let history: Arc<dyn HistoryStore> = Arc::new(JsonFileHistoryStore::new(
        &configuration.history.file_path,
        configuration.history.max_items,
    ));

    let address = format!(
        "{}:{}",
        configuration.application.host, configuration.application.port
    );
    log::info!("Listening on http://{}", address);
    let listener = TcpListener::bind(address)?;

    run(listener, configuration, orchestrator, history)?.await
}
