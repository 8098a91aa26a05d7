use std::collections::BTreeMap;

use actix_web::http::header::{HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::control::delay::{Delay, DurationError};
use crate::storage::{Headers, Kind, Message, Payload, StorageError};

pub mod delay;
pub mod requests;
pub mod responses;
pub mod rpc;

pub use requests::Requests;
pub use responses::Responses;

/// Wire form of headers: one string per name.
pub type HeadersView = BTreeMap<String, String>;

#[derive(Debug, Error)]
pub enum ControlError {
    #[error("validation: {0}")]
    Validation(String),
    #[error("failed to decode body from base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error(transparent)]
    Duration(#[from] DurationError),
    #[error(transparent)]
    Params(#[from] serde_json::Error),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("rpc: {0}")]
    Rpc(String),
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResponseView {
    pub delay: Delay,
    // Wide enough that out-of-range numbers reach the range check.
    pub status: i64,
    pub headers: HeadersView,
    pub body: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_body_base64: bool,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestView {
    pub method: String,
    pub url: String,
    pub headers: HeadersView,
    pub body: String,
}

impl TryFrom<Message> for ResponseView {
    type Error = ControlError;

    fn try_from(message: Message) -> Result<Self, Self::Error> {
        let status = match &message.payload {
            Payload::Response(info) => info.status,
            Payload::Request(_) => return Err(not_a(&message, Kind::Response)),
        };
        Ok(Self {
            delay: Delay(message.delay),
            status: i64::from(status),
            headers: join_headers(&message.headers),
            body: String::from_utf8_lossy(&message.body).into_owned(),
            is_body_base64: false,
        })
    }
}

impl TryFrom<Message> for RequestView {
    type Error = ControlError;

    fn try_from(message: Message) -> Result<Self, Self::Error> {
        let info = match &message.payload {
            Payload::Request(info) => info.clone(),
            Payload::Response(_) => return Err(not_a(&message, Kind::Request)),
        };
        Ok(Self {
            method: info.method,
            url: info.url,
            headers: join_headers(&message.headers),
            body: String::from_utf8_lossy(&message.body).into_owned(),
        })
    }
}

fn not_a(message: &Message, expected: Kind) -> ControlError {
    ControlError::Storage(StorageError::Rejected { message: format!("{:?}", message), expected })
}

/// Collapses repeated values into one `"; "` separated string per name.
pub fn join_headers(headers: &Headers) -> HeadersView {
    headers
        .iter()
        .map(|(name, values)| (name.clone(), values.join("; ")))
        .collect()
}

/// Expands the wire form, refusing names and values that cannot go out on an HTTP response.
pub fn split_headers(view: HeadersView) -> Result<Headers, ControlError> {
    let mut headers = Headers::new();
    for (name, value) in view {
        if HeaderName::from_bytes(name.as_bytes()).is_err() {
            return Err(ControlError::Validation(format!("invalid header name {:?}", name)));
        }
        if HeaderValue::from_str(&value).is_err() {
            return Err(ControlError::Validation(format!("invalid header value {:?} for {}", value, name)));
        }
        headers.insert(name, vec![value]);
    }
    Ok(headers)
}
