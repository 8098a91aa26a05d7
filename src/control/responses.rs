use actix_web::web::Bytes;

use crate::control::{split_headers, ControlError, ResponseView};
use crate::storage::{Message, Queue};

/// Control operations over the canned response queue.
pub struct Responses<'a> {
    queue: &'a Queue,
}

impl<'a> Responses<'a> {

    pub fn new(queue: &'a Queue) -> Self {
        Self { queue }
    }

    pub fn push(&self, view: ResponseView) -> Result<bool, ControlError> {
        if view.status < 100 || view.status >= 600 {
            return Err(ControlError::Validation(format!("status {} must be in [100; 600)", view.status)));
        }
        let body = if view.is_body_base64 {
            Bytes::from(base64::decode(&view.body)?)
        } else {
            Bytes::from(view.body)
        };
        let headers = split_headers(view.headers)?;
        // The range check above keeps the status within u16.
        let status = view.status as u16;

        self.queue.push_last(Message::response(status, headers, body, view.delay.0))?;
        Ok(true)
    }

    pub fn list(&self) -> Result<Vec<ResponseView>, ControlError> {
        self.queue.list().into_iter().map(ResponseView::try_from).collect()
    }

    pub fn clear(&self) -> bool {
        self.queue.clear();
        true
    }
}
