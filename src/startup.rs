use std::{net::TcpListener, sync::Arc};

use actix_files::Files;
use actix_web::{dev::Server, middleware::Logger, web, App, HttpServer};

use crate::{
    configuration::Settings,
    dal::HistoryStore,
    routes::{
        default_route, export_route, history_route, json_error_handler, progress_route,
        search_route,
    },
    services::{ProgressTracker, SearchOrchestrator, SpreadsheetExporter},
};

pub fn run(
    listener: TcpListener,
    settings: Settings,
    orchestrator: SearchOrchestrator,
    history: Arc<dyn HistoryStore>,
) -> Result<Server, std::io::Error> {
    let static_dir = settings.application.static_dir.clone();
    let application = web::Data::new(settings.application);
    let api_keys = web::Data::new(settings.api_keys);
    let search_settings = web::Data::new(settings.search);
    let exporter = web::Data::new(SpreadsheetExporter::new(settings.export.directory));
    let orchestrator = web::Data::new(orchestrator);
    let progress = web::Data::new(ProgressTracker::new());
    let history: web::Data<dyn HistoryStore> = web::Data::from(history);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(web::JsonConfig::default().error_handler(json_error_handler))
            .service(Files::new("/static", &static_dir).prefer_utf8(true))
            .service(default_route::default)
            .service(
                web::scope("/api")
                    .service(progress_route::progress)
                    .service(search_route::search)
                    .service(history_route::get_history)
                    .service(history_route::save_history)
                    .service(export_route::export),
            )
            .app_data(application.clone())
            .app_data(api_keys.clone())
            .app_data(search_settings.clone())
            .app_data(exporter.clone())
            .app_data(orchestrator.clone())
            .app_data(progress.clone())
            .app_data(history.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}
