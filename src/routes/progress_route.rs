use actix_web::{get, web, HttpResponse};

use crate::services::ProgressTracker;

#[get("/progress")]
async fn progress(tracker: web::Data<ProgressTracker>) -> HttpResponse {
    HttpResponse::Ok().json(tracker.snapshot())
}
