use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use actix_web::web::Bytes;
use thiserror::Error;

pub mod queue;
pub mod queues;

pub use queue::Queue;
pub use queues::Queues;

/// Header multimap. A name may repeat, so every name maps to its values in arrival order.
pub type Headers = BTreeMap<String, Vec<String>>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("{message} is not {expected}")]
    Rejected { message: String, expected: Kind },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Request,
    Response,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Kind::Request => write!(f, "Request"),
            Kind::Response => write!(f, "Response"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestInfo {
    pub method: String,
    /// Request target exactly as received, query string included.
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseInfo {
    pub status: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Request(RequestInfo),
    Response(ResponseInfo),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub headers: Headers,
    pub body: Bytes,
    /// Only honoured for responses.
    pub delay: Duration,
    pub payload: Payload,
}

impl Message {
    pub fn request(method: impl Into<String>, url: impl Into<String>, headers: Headers, body: Bytes) -> Self {
        Self {
            headers,
            body,
            delay: Duration::ZERO,
            payload: Payload::Request(RequestInfo { method: method.into(), url: url.into() }),
        }
    }

    pub fn response(status: u16, headers: Headers, body: Bytes, delay: Duration) -> Self {
        Self {
            headers,
            body,
            delay,
            payload: Payload::Response(ResponseInfo { status }),
        }
    }

    pub fn kind(&self) -> Kind {
        match self.payload {
            Payload::Request(_) => Kind::Request,
            Payload::Response(_) => Kind::Response,
        }
    }
}

impl fmt::Display for Message {

    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.payload {
            Payload::Request(info) => {
                writeln!(f, "==================== REQUEST ====================")?;
                writeln!(f, "Received at {}", chrono::offset::Local::now())?;
                writeln!(f, "URI: {}", info.url)?;
                writeln!(f, "Method: {}", info.method)?;
            }
            Payload::Response(info) => {
                writeln!(f, "==================== RESPONSE ====================")?;
                writeln!(f, "Responded at {}", chrono::offset::Local::now())?;
                writeln!(f, "Status: {}", info.status)?;
                if !self.delay.is_zero() {
                    writeln!(f, "Delay: {:?}", self.delay)?;
                }
            }
        }
        writeln!(f, "Headers:")?;
        for (k, values) in self.headers.iter() {
            for v in values {
                writeln!(f, " - {} = {}", k, v)?;
            }
        }
        if !self.body.is_empty() {
            writeln!(f, "Body: \n{:?}", String::from_utf8_lossy(&self.body))?
        }
        write!(f, "")
    }
}
