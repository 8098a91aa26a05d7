use std::time::Duration;

use actix_web::web::{Bytes, BytesMut};
use actix_web::{web, Error};
use futures::StreamExt;

pub mod options;
pub mod handler_control;
pub mod handler_healthz;
pub mod handler_mock;

pub const APPLICATION: &str = env!("CARGO_PKG_NAME");
pub const SERVER_HEADER: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

pub const MSG_NOT_FOUND: &str = "Not Found\n";
pub const MSG_METHOD_NOT_ALLOWED: &str = "Method Not Allowed\n";
pub const MSG_NOT_IMPLEMENTED: &str = "Not Implemented\n";
pub const MSG_SOMETHING_WRONG: &str = "Oops";

/// How long in-flight exchanges get to finish once a shutdown signal arrives
pub const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(60);

pub fn print_banner(mode: &str) {
    // We don't need this as a constant because it will be shown only once.
    let banner: &str = "\n\n\
\x20   _ __ ___   ___   ___| | ____ _| |__ | | ___\n\
\x20  | '_ ` _ \\ / _ \\ / __| |/ / _` | '_ \\| |/ _ \\\n\
\x20  | | | | | | (_) | (__|   < (_| | |_) | |  __/\n\
\x20  |_| |_| |_|\\___/ \\___|_|\\_\\__,_|_.__/|_|\\___|\n\
\x20  ==============================================\n";
    println!("{}\x20  {} ({})\n\x20  Mode: {}\n\n", banner, APPLICATION, env!("CARGO_PKG_VERSION"), mode);
}

/// Routes of the control server. The app's default service should be
/// `handler_control::not_found`.
pub fn configure_control(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/healthz")
            .route(web::get().to(handler_healthz::handle))
            .default_service(web::to(handler_control::not_found)),
    )
    .service(
        web::resource("/rpc/1")
            .route(web::post().to(handler_control::handle))
            .default_service(web::to(handler_control::method_not_allowed)),
    );
}

/// Buffers a whole request body. Transport errors are passed on as is.
pub async fn read_body(mut payload: web::Payload) -> Result<Bytes, Error> {
    let mut body = BytesMut::new();
    while let Some(chunk) = payload.next().await {
        body.extend_from_slice(&chunk?);
    }
    Ok(body.freeze())
}
