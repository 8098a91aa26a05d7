use actix_web::http::header;
use actix_web::{web, Error, HttpResponse};

use crate::control::rpc;
use crate::server::{self, MSG_METHOD_NOT_ALLOWED, MSG_NOT_FOUND};
use crate::storage::Queues;

pub async fn handle(queues: web::Data<Queues>, payload: web::Payload) -> Result<HttpResponse, Error> {
    let body = server::read_body(payload).await?;
    let reply = rpc::serve(&queues, &body);
    Ok(HttpResponse::Ok().json(reply))
}

pub async fn method_not_allowed() -> HttpResponse {
    HttpResponse::MethodNotAllowed()
        .insert_header((header::ALLOW, "POST"))
        .content_type("text/plain; charset=utf-8")
        .body(MSG_METHOD_NOT_ALLOWED)
}

pub async fn not_found() -> HttpResponse {
    HttpResponse::NotFound()
        .content_type("text/plain; charset=utf-8")
        .body(MSG_NOT_FOUND)
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use serde_json::{json, Value};

    use super::*;

    macro_rules! control_app {
        ($queues:expr) => {
            test::init_service(
                App::new()
                    .app_data($queues.clone())
                    .configure(server::configure_control)
                    .default_service(web::to(not_found)),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn healthz_is_ok() {
        let queues = web::Data::new(Queues::default());
        let app = control_app!(queues);
        let response = test::call_service(&app, test::TestRequest::get().uri("/healthz").to_request()).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().get(header::CONTENT_TYPE).unwrap(), "text/plain");
        assert_eq!(test::read_body(response).await, "OK\n");
    }

    #[actix_web::test]
    async fn unknown_path_is_not_found() {
        let queues = web::Data::new(Queues::default());
        let app = control_app!(queues);
        let response = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(test::read_body(response).await, "Not Found\n");
    }

    #[actix_web::test]
    async fn rpc_requires_post() {
        let queues = web::Data::new(Queues::default());
        let app = control_app!(queues);
        let response = test::call_service(&app, test::TestRequest::get().uri("/rpc/1").to_request()).await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers().get(header::ALLOW).unwrap(), "POST");
        assert_eq!(test::read_body(response).await, "Method Not Allowed\n");
    }

    #[actix_web::test]
    async fn rpc_push_reaches_the_response_queue() {
        let queues = web::Data::new(Queues::default());
        let app = control_app!(queues);
        let request = test::TestRequest::post()
            .uri("/rpc/1")
            .set_payload(
                json!({
                    "method": "Responses.Push",
                    "params": [{ "status": 201, "headers": { "Content-Type": "text/plain" }, "body": "Hello" }]
                })
                .to_string(),
            )
            .to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().get(header::CONTENT_TYPE).unwrap(), "application/json");
        let reply: Value = test::read_body_json(response).await;
        assert_eq!(reply, json!({ "id": null, "result": true, "error": null }));
        assert_eq!(queues.responses.len(), 1);
    }

    #[actix_web::test]
    async fn rpc_validation_error_leaves_queue_empty() {
        let queues = web::Data::new(Queues::default());
        let app = control_app!(queues);
        let request = test::TestRequest::post()
            .uri("/rpc/1")
            .set_payload(r#"{"method": "Responses.Push", "params": []}"#)
            .to_request();
        let reply: Value = test::call_and_read_body_json(&app, request).await;
        assert_eq!(reply["error"], json!("validation: status 0 must be in [100; 600)"));
        assert_eq!(queues.responses.len(), 0);
    }
}
