use actix_files::NamedFile;
use actix_web::{
    http::header::{ContentDisposition, DispositionParam, DispositionType},
    post, web,
};
use serde::Deserialize;

use crate::services::{Row, SpreadsheetExporter};

use super::ApiError;

#[derive(Deserialize)]
struct ExportBody {
    #[serde(default)]
    companies: Vec<Row>,
    search_query: Option<String>,
}

#[post("/export")]
async fn export(
    exporter: web::Data<SpreadsheetExporter>,
    body: web::Json<ExportBody>,
) -> Result<NamedFile, ApiError> {
    let ExportBody {
        companies,
        search_query,
    } = body.into_inner();
    if companies.is_empty() {
        return Err(ApiError::Validation("No companies to export".to_string()));
    }
    let search_query = search_query.unwrap_or_else(|| "companies".to_string());

    let (path, filename) = web::block(move || exporter.export(&search_query, &companies))
        .await
        .map_err(|e| ApiError::unhandled("BlockingError", e))??;

    let file = NamedFile::open_async(&path)
        .await
        .map_err(|e| ApiError::unhandled("IoError", e))?;

    Ok(file.set_content_disposition(ContentDisposition {
        disposition: DispositionType::Attachment,
        parameters: vec![DispositionParam::Filename(filename)],
    }))
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test, web, App};
    use serde_json::json;

    use crate::services::SpreadsheetExporter;

    #[actix_web::test]
    async fn export_downloads_workbook() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = web::Data::new(SpreadsheetExporter::new(dir.path()));
        let app = test::init_service(
            App::new()
                .app_data(exporter)
                .service(web::scope("/api").service(super::export)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/export")
            .set_json(json!({
                "search_query": "cold storage",
                "companies": [{ "name": "Polar Depot", "country": "Canada", "rating": 4.2 }]
            }))
            .to_request();
        let response = test::call_service(&app, req).await;

        assert_eq!(response.status(), StatusCode::OK);
        let disposition = response
            .headers()
            .get("content-disposition")
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(disposition.starts_with("attachment"));
        assert!(disposition.contains("cold_storage_"));
        assert!(disposition.contains(".xlsx"));

        let body = test::read_body(response).await;
        assert!(body.starts_with(b"PK"));
    }

    #[actix_web::test]
    async fn nothing_to_export() {
        let dir = tempfile::tempdir().unwrap();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(SpreadsheetExporter::new(dir.path())))
                .service(web::scope("/api").service(super::export)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/export")
            .set_json(json!({ "search_query": "steel", "companies": [] }))
            .to_request();
        let response = test::call_service(&app, req).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = test::read_body_json(response).await;
        assert_eq!(body["error"], "No companies to export");
    }
}
