use actix_web::{get, post, web, HttpResponse};
use serde::Deserialize;
use serde_json::json;

use crate::{
    dal::HistoryStore,
    domain::history::{HistoryEntry, SearchKind},
};

use super::ApiError;

#[derive(Deserialize)]
struct HistoryQuery {
    #[serde(rename = "type")]
    kind: Option<String>,
}

#[get("/history")]
async fn get_history(
    history: web::Data<dyn HistoryStore>,
    query: web::Query<HistoryQuery>,
) -> Result<HttpResponse, ApiError> {
    let kind = query
        .kind
        .as_deref()
        .filter(|k| !k.trim().is_empty())
        .map(|k| SearchKind::parse(Some(k)));
    let entries = history.list_kind(kind)?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "count": entries.len(),
        "history": entries,
    })))
}

#[derive(Deserialize)]
struct SaveHistoryBody {
    #[serde(rename = "type")]
    kind: Option<String>,
    query: Option<String>,
    industry_filter: Option<String>,
}

#[post("/history")]
async fn save_history(
    history: web::Data<dyn HistoryStore>,
    body: web::Json<SaveHistoryBody>,
) -> Result<HttpResponse, ApiError> {
    let query = body.query.as_deref().map(str::trim).unwrap_or_default();
    if query.is_empty() {
        return Err(ApiError::Validation("Query is required".to_string()));
    }

    let entry = HistoryEntry::new(
        SearchKind::parse(body.kind.as_deref()),
        query,
        body.industry_filter.as_deref().unwrap_or_default(),
    );
    history.append(entry)?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Search saved to history",
    })))
}
