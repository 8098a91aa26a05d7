//! JSON-RPC 1.0 style envelope for the control plane.
//!
//! Requests look like `{"method": "Responses.Push", "params": [...], "id": 1}`
//! and every answer is `{"id": ..., "result": ..., "error": ...}`.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::control::{ControlError, Requests, ResponseView, Responses};
use crate::storage::Queues;

#[derive(Debug, Deserialize)]
pub struct RpcRequest {
    pub method: String,
    #[serde(default)]
    pub params: Vec<Value>,
    #[serde(default)]
    pub id: Value,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct RpcResponse {
    pub id: Value,
    pub result: Value,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    ResponsesPush,
    ResponsesList,
    ResponsesClear,
    RequestsList,
    RequestsPop,
    RequestsClear,
}

impl FromStr for Method {
    type Err = ControlError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "Responses.Push" => Ok(Method::ResponsesPush),
            "Responses.List" => Ok(Method::ResponsesList),
            "Responses.Clear" => Ok(Method::ResponsesClear),
            "Requests.List" => Ok(Method::RequestsList),
            "Requests.Pop" => Ok(Method::RequestsPop),
            "Requests.Clear" => Ok(Method::RequestsClear),
            _ => Err(ControlError::Rpc(format!("can't find method {}", name))),
        }
    }
}

pub fn dispatch(queues: &Queues, method: Method, params: Vec<Value>) -> Result<Value, ControlError> {
    let responses = Responses::new(&queues.responses);
    let requests = Requests::new(&queues.requests);
    let result = match method {
        Method::ResponsesPush => {
            // A missing argument is an all-default view, which fails the status check.
            let view = match params.into_iter().next() {
                Some(param) => serde_json::from_value::<ResponseView>(param)?,
                None => ResponseView::default(),
            };
            Value::from(responses.push(view)?)
        }
        Method::ResponsesList => serde_json::to_value(responses.list()?)?,
        Method::ResponsesClear => Value::from(responses.clear()),
        Method::RequestsList => serde_json::to_value(requests.list()?)?,
        Method::RequestsPop => serde_json::to_value(requests.pop()?)?,
        Method::RequestsClear => Value::from(requests.clear()),
    };
    Ok(result)
}

/// Decodes one envelope, runs it and packs the outcome. Never fails: every
/// problem ends up in the `error` field.
pub fn serve(queues: &Queues, body: &[u8]) -> RpcResponse {
    let request: RpcRequest = match serde_json::from_slice(body) {
        Ok(request) => request,
        Err(e) => return failure(Value::Null, ControlError::Rpc(e.to_string())),
    };
    let outcome = request
        .method
        .parse::<Method>()
        .and_then(|method| dispatch(queues, method, request.params));
    match outcome {
        Ok(result) => RpcResponse { id: request.id, result, error: None },
        Err(e) => {
            warn!("{} failed: {}", request.method, e);
            failure(request.id, e)
        }
    }
}

fn failure(id: Value, error: ControlError) -> RpcResponse {
    RpcResponse { id, result: Value::Null, error: Some(error.to_string()) }
}
