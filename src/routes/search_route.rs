use actix_web::{post, web, HttpResponse};
use serde::Deserialize;
use serde_json::json;

use crate::{
    configuration::{ApiKeySettings, SearchSettings},
    dal::HistoryStore,
    domain::{
        history::{HistoryEntry, SearchKind},
        progress::ProgressStatus,
        search::SearchIntent,
    },
    services::{ProgressTracker, SearchOrchestrator},
};

use super::ApiError;

const NO_KEYS_MESSAGE: &str = "No API keys configured. Please set GOOGLE_PLACES_API_KEY or YELP_API_KEY environment variables.";

#[derive(Deserialize)]
struct SearchBody {
    search_type: Option<String>,
    industry: Option<String>,
    product: Option<String>,
    industry_filter: Option<String>,
}

fn trimmed(value: &Option<String>) -> &str {
    value.as_deref().map(str::trim).unwrap_or_default()
}

fn intent_from(body: &SearchBody) -> Result<SearchIntent, ApiError> {
    match SearchKind::parse(body.search_type.as_deref()) {
        SearchKind::Product => {
            let product = trimmed(&body.product);
            if product.is_empty() {
                return Err(ApiError::Validation("Product name is required".to_string()));
            }
            Ok(SearchIntent::product(
                product,
                Some(trimmed(&body.industry_filter)),
            ))
        }
        SearchKind::Industry => {
            let industry = trimmed(&body.industry);
            if industry.is_empty() {
                return Err(ApiError::Validation("Industry is required".to_string()));
            }
            Ok(SearchIntent::industry(industry))
        }
    }
}

#[post("/search")]
async fn search(
    body: web::Json<SearchBody>,
    orchestrator: web::Data<SearchOrchestrator>,
    progress: web::Data<ProgressTracker>,
    history: web::Data<dyn HistoryStore>,
    api_keys: web::Data<ApiKeySettings>,
    search_settings: web::Data<SearchSettings>,
) -> Result<HttpResponse, ApiError> {
    progress.reset();

    let intent = intent_from(&body).inspect_err(|e| {
        progress.update(ProgressStatus::Error, "validation", 0, Some(&e.to_string()));
    })?;

    if !api_keys.has_primary() {
        log::error!("Search rejected, no API keys configured");
        progress.update(
            ProgressStatus::Error,
            "config",
            0,
            Some("No API keys configured"),
        );
        return Err(ApiError::Configuration(NO_KEYS_MESSAGE.to_string()));
    }

    match intent.kind {
        SearchKind::Product => progress.update(
            ProgressStatus::Searching,
            &format!("Searching for manufacturers of: {}", intent.query),
            0,
            Some(&format!(
                "Looking for companies that manufacture {}...",
                intent.query
            )),
        ),
        SearchKind::Industry => progress.update(
            ProgressStatus::Searching,
            &format!("Searching for: {}", intent.query),
            0,
            Some("Starting company search..."),
        ),
    }

    let search_task = {
        let orchestrator = orchestrator.clone();
        let progress = progress.clone();
        let intent = intent.clone();
        tokio::spawn(async move { orchestrator.find_companies(&intent, &progress).await })
    };

    let companies = match search_task.await {
        Ok(companies) => companies,
        Err(e) => {
            log::error!("Search task for {} failed: {:?}", intent.query, e);
            progress.update(
                ProgressStatus::Error,
                "exception",
                0,
                Some(&format!("Error: {}", e)),
            );
            return Err(e.into());
        }
    };
    let count = companies.len();

    if count < search_settings.min_results {
        log::warn!("Only found {} companies for {}", count, intent.query);
        progress.update(
            ProgressStatus::Warning,
            "low_results",
            count,
            Some(&format!("Only found {} companies", count)),
        );
        return Ok(HttpResponse::Ok().json(json!({
            "error": format!(
                "Only found {} companies. Please try a different industry or check your API keys.",
                count
            ),
            "companies": companies,
            "count": count,
        })));
    }

    progress.update(
        ProgressStatus::Completed,
        "Search completed successfully",
        count,
        Some(&format!("Found {} companies", count)),
    );

    let entry = HistoryEntry::new(
        intent.kind,
        &intent.query,
        intent.filter.as_deref().unwrap_or_default(),
    );
    if let Err(e) = history.append(entry) {
        log::error!("Failed to save search history: {:?}", e);
    }

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "count": count,
        "companies": companies,
    })))
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use actix_web::{
        dev::{Service, ServiceResponse},
        http::StatusCode,
        test, web, App,
    };
    use async_trait::async_trait;
    use serde_json::json;

    use crate::{
        configuration::{ApiKeySettings, SearchSettings},
        dal::{HistoryStore, InMemoryHistoryStore},
        domain::{
            company::{CompanyRecord, Source},
            progress::ProgressStatus,
            relevance::Candidate,
            search::{Region, SearchIntent},
        },
        routes::json_error_handler,
        services::{
            providers::{CompanyProvider, Listing, ProviderError, SearchRequest},
            ProgressTracker, SearchLimits, SearchOrchestrator,
        },
    };

    struct WarehouseDirectory {
        listings: usize,
        panics: bool,
    }

    #[async_trait]
    impl CompanyProvider for WarehouseDirectory {
        fn name(&self) -> &'static str {
            "Warehouse Directory"
        }

        fn call_delay(&self) -> Duration {
            Duration::ZERO
        }

        fn plan(&self, intent: &SearchIntent, limit: usize) -> Vec<SearchRequest> {
            vec![SearchRequest {
                query: intent.query.clone(),
                region: Region::Canada,
                industry_label: intent.industry_label(),
                limit,
            }]
        }

        async fn fetch(&self, _request: &SearchRequest) -> Result<Vec<Listing>, ProviderError> {
            if self.panics {
                panic!("directory exploded");
            }
            Ok((0..self.listings)
                .map(|i| {
                    let name = format!("Depot {}", i);
                    let address = format!("{} Dock St", i);
                    Listing {
                        candidate: Candidate::new(&name, &address).with_tags(["warehouse"]),
                        company: CompanyRecord::new(&name, &address, Source::Yelp),
                        detail_id: None,
                    }
                })
                .collect())
        }
    }

    struct Harness {
        progress: web::Data<ProgressTracker>,
        history: Arc<InMemoryHistoryStore>,
    }

    fn keys(yelp: Option<&str>) -> ApiKeySettings {
        ApiKeySettings {
            yelp: yelp.map(str::to_string),
            ..Default::default()
        }
    }

    async fn call(
        provider: WarehouseDirectory,
        keys: ApiKeySettings,
        req: test::TestRequest,
    ) -> (ServiceResponse, Harness) {
        let limits = SearchLimits {
            result_cap: 20,
            time_budget: Duration::from_secs(20),
            per_call_limit: 15,
            detail_margin: Duration::from_secs(3),
        };
        let settings = SearchSettings {
            result_cap: 20,
            time_budget_secs: 20,
            min_results: 5,
            per_call_limit: 15,
            detail_margin_secs: 3,
        };
        let orchestrator = SearchOrchestrator::new(vec![Box::new(provider)], limits);
        let progress = web::Data::new(ProgressTracker::new());
        let history = Arc::new(InMemoryHistoryStore::new(10));
        let history_data: web::Data<dyn HistoryStore> =
            web::Data::from(history.clone() as Arc<dyn HistoryStore>);

        let app = test::init_service(
            App::new()
                .app_data(web::JsonConfig::default().error_handler(json_error_handler))
                .app_data(web::Data::new(orchestrator))
                .app_data(progress.clone())
                .app_data(history_data)
                .app_data(web::Data::new(keys))
                .app_data(web::Data::new(settings))
                .service(web::scope("/api").service(super::search)),
        )
        .await;
        let response = app.call(req.to_request()).await.unwrap();

        (response, Harness { progress, history })
    }

    fn search_request(body: serde_json::Value) -> test::TestRequest {
        test::TestRequest::post().uri("/api/search").set_json(body)
    }

    async fn json_body(response: ServiceResponse) -> serde_json::Value {
        test::read_body_json(response).await
    }

    #[actix_web::test]
    async fn successful_search_is_saved() {
        let provider = WarehouseDirectory {
            listings: 6,
            panics: false,
        };
        let (response, harness) = call(
            provider,
            keys(Some("yelp")),
            search_request(json!({ "search_type": "industry", "industry": "  cold storage " })),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["count"], 6);
        assert_eq!(body["companies"][0]["name"], "Depot 0");

        let snapshot = harness.progress.snapshot();
        assert_eq!(snapshot.status, ProgressStatus::Completed);
        assert_eq!(snapshot.companies_found, 6);
        let history = harness.history.list().unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].query, "cold storage");
    }

    #[actix_web::test]
    async fn few_results_is_a_soft_warning() {
        let provider = WarehouseDirectory {
            listings: 2,
            panics: false,
        };
        let (response, harness) = call(
            provider,
            keys(Some("yelp")),
            search_request(json!({
                "search_type": "product",
                "product": "pallets",
                "industry_filter": "wood"
            })),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["count"], 2);
        assert_eq!(body["companies"].as_array().unwrap().len(), 2);
        assert!(body["error"].as_str().unwrap().starts_with("Only found 2 companies"));

        let snapshot = harness.progress.snapshot();
        assert_eq!(snapshot.status, ProgressStatus::Warning);
        assert_eq!(snapshot.current_step, "low_results");
        assert!(harness.history.list().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn missing_field_is_rejected() {
        let provider = WarehouseDirectory {
            listings: 6,
            panics: false,
        };
        let (response, harness) = call(
            provider,
            keys(Some("yelp")),
            search_request(json!({ "search_type": "product", "industry": "steel" })),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["error"], "Product name is required");
        assert_eq!(harness.progress.snapshot().status, ProgressStatus::Error);
    }

    #[actix_web::test]
    async fn missing_keys_is_a_configuration_error() {
        let provider = WarehouseDirectory {
            listings: 6,
            panics: false,
        };
        let (response, _) = call(
            provider,
            keys(Some(" ")),
            search_request(json!({ "industry": "steel" })),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert!(body["error"].as_str().unwrap().starts_with("No API keys configured"));
        assert_eq!(body["count"], 0);
    }

    #[actix_web::test]
    async fn malformed_body_still_gets_json() {
        let provider = WarehouseDirectory {
            listings: 6,
            panics: false,
        };
        let req = test::TestRequest::post()
            .uri("/api/search")
            .insert_header(("content-type", "application/json"))
            .set_payload("{ not json");
        let (response, _) = call(provider, keys(Some("yelp")), req).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert!(body["error"].as_str().unwrap().starts_with("Invalid request body"));
    }

    #[actix_web::test]
    async fn panicking_search_is_a_json_500() {
        let provider = WarehouseDirectory {
            listings: 0,
            panics: true,
        };
        let (response, harness) = call(
            provider,
            keys(Some("yelp")),
            search_request(json!({ "industry": "steel" })),
        )
        .await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(response).await;
        assert_eq!(body["error_type"], "Panic");
        assert_eq!(body["count"], 0);
        assert_eq!(harness.progress.snapshot().status, ProgressStatus::Error);
    }
}
