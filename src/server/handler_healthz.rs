use actix_web::{Error, HttpResponse};

pub async fn handle() -> Result<HttpResponse, Error> {
    Ok(HttpResponse::Ok()
        .content_type("text/plain")
        .body("OK\n"))
}
