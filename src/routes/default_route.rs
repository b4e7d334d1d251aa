use std::path::Path;

use actix_files::NamedFile;
use actix_web::{get, web};

use crate::configuration::ApplicationSettings;

#[get("/")]
async fn default(settings: web::Data<ApplicationSettings>) -> actix_web::Result<NamedFile> {
    let index = Path::new(&settings.static_dir).join("index.html");
    Ok(NamedFile::open_async(index).await?)
}
