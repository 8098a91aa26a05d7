use std::convert::Infallible;

use actix_web::http::header::HeaderMap;
use actix_web::http::StatusCode;
use actix_web::{error, web, Error, HttpRequest, HttpResponse};
use futures::stream;
use uuid::Uuid;

use crate::server::{self, MSG_NOT_IMPLEMENTED, MSG_SOMETHING_WRONG};
use crate::storage::{Headers, Message, Payload, Queues};

/// Records the inbound request, then answers it with the oldest queued response.
///
/// Requests and responses are paired strictly in arrival order. When the
/// response queue runs dry the client gets a 501, but its request stays recorded.
pub async fn handle(queues: web::Data<Queues>,
                    request: HttpRequest,
                    payload: web::Payload) -> Result<HttpResponse, Error> {
    let exchange_id = Uuid::new_v4();
    let body = server::read_body(payload).await.map_err(|e| {
        error!("[req:{}] Failed to read the request body due to {}", exchange_id, e);
        e
    })?;

    let target = request.uri().path_and_query().map(|pq| pq.as_str()).unwrap_or("/");
    let recorded = Message::request(request.method().as_str(), target, collect_headers(request.headers()), body);
    debug!("[req:{}] {}", exchange_id, recorded);

    queues.requests.push_last(recorded).map_err(|e| {
        error!("[req:{}] Request queue refused a recorded request: {}", exchange_id, e);
        error::ErrorInternalServerError(MSG_SOMETHING_WRONG)
    })?;

    match queues.responses.pop_first() {
        Some(canned) => {
            debug!("[req:{}] {}", exchange_id, canned);
            debug!("[req:{}] {} response(s) left in the queue", exchange_id, queues.responses.len());
            respond(canned).map_err(|e| {
                error!("[req:{}] Cannot serve the queued response: {}", exchange_id, e);
                e
            })
        }
        None => {
            info!("[req:{}] No response queued, answering 501", exchange_id);
            Ok(HttpResponse::NotImplemented()
                .content_type("text/plain; charset=utf-8")
                .body(MSG_NOT_IMPLEMENTED))
        }
    }
}

fn collect_headers(header_map: &HeaderMap) -> Headers {
    let mut headers = Headers::new();
    for (name, value) in header_map.iter() {
        headers
            .entry(canonical_header_name(name.as_str()))
            .or_default()
            .push(String::from_utf8_lossy(value.as_bytes()).into_owned());
    }
    headers
}

/// `content-type` becomes `Content-Type`: the first letter and every letter
/// after a hyphen upper-cased, the rest lower-cased. Names holding anything
/// other than token characters are kept verbatim.
fn canonical_header_name(name: &str) -> String {
    let is_token = |c: char| c.is_ascii_alphanumeric() || "!#$%&'*+-.^_`|~".contains(c);
    if name.is_empty() || !name.chars().all(is_token) {
        return name.to_string();
    }
    let mut upper = true;
    name.chars()
        .map(|c| {
            let mapped = if upper { c.to_ascii_uppercase() } else { c.to_ascii_lowercase() };
            upper = c == '-';
            mapped
        })
        .collect()
}

fn respond(canned: Message) -> Result<HttpResponse, Error> {
    let status = match canned.payload {
        Payload::Response(ref info) => info.status,
        Payload::Request(_) => return Err(error::ErrorInternalServerError(MSG_SOMETHING_WRONG)),
    };
    let status = StatusCode::from_u16(status).map_err(|_| error::ErrorInternalServerError(MSG_SOMETHING_WRONG))?;

    let mut builder = HttpResponse::build(status);
    for (name, values) in &canned.headers {
        for value in values {
            builder.append_header((name.as_str(), value.as_str()));
        }
    }

    if canned.delay.is_zero() {
        return Ok(builder.body(canned.body));
    }
    // Status and headers go out first; the body chunk is held back for the delay.
    let (delay, body) = (canned.delay, canned.body);
    Ok(builder.streaming(stream::once(async move {
        tokio::time::sleep(delay).await;
        Ok::<_, Infallible>(body)
    })))
}
