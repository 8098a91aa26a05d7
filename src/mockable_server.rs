#[macro_use]
extern crate log;

use actix_web::http::header;
use actix_web::{middleware, web, App, HttpServer};

use crate::server::{handler_control, handler_mock, options, SERVER_HEADER, SHUTDOWN_TIMEOUT};
use crate::storage::Queues;

mod control;
mod server;
mod storage;


#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let options: options::ServerOptions = options::parse_options();

    server::print_banner("Mock + Control");

    let queues = web::Data::new(Queues::default());

    let mock_queues = queues.clone();
    let mut mock_server = HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::new("[mock] %a \"%r\" %s %b %T"))
            .wrap(middleware::DefaultHeaders::new().add((header::SERVER, SERVER_HEADER)))
            .app_data(mock_queues.clone())
            // every method and path is mocked
            .default_service(web::to(handler_mock::handle))
    })
        .shutdown_timeout(SHUTDOWN_TIMEOUT.as_secs());

    let control_queues = queues.clone();
    let mut control_server = HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::new("[control] %a \"%r\" %s %b %T"))
            .wrap(middleware::DefaultHeaders::new().add((header::SERVER, SERVER_HEADER)))
            .app_data(control_queues.clone())
            .configure(server::configure_control)
            .default_service(web::to(handler_control::not_found))
    })
        .shutdown_timeout(SHUTDOWN_TIMEOUT.as_secs());

    if let Some(workers) = options.workers {
        mock_server = mock_server.workers(workers);
        control_server = control_server.workers(workers);
    }

    let mock_server = mock_server.bind(&options.mock_addr)?.run();
    info!("Mock server listening on {}", options.mock_addr);
    let control_server = control_server.bind(&options.control_addr)?.run();
    info!("Control server listening on {}", options.control_addr);

    futures::future::try_join(mock_server, control_server).await?;
    info!("Both servers stopped");
    Ok(())
}
