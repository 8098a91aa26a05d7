use crate::storage::{Kind, Message, Queue, StorageError};

/// The only state shared by both servers.
pub struct Queues {
    /// Canned responses, fed by the control plane and drained by the mock plane.
    pub responses: Queue,
    /// Requests recorded by the mock plane.
    pub requests: Queue,
}

impl Default for Queues {
    fn default() -> Self {
        Self {
            responses: Queue::with_validator(response_validator),
            requests: Queue::with_validator(request_validator),
        }
    }
}

fn response_validator(message: &Message) -> Result<(), StorageError> {
    expect_kind(message, Kind::Response)
}

fn request_validator(message: &Message) -> Result<(), StorageError> {
    expect_kind(message, Kind::Request)
}

fn expect_kind(message: &Message, expected: Kind) -> Result<(), StorageError> {
    if message.kind() != expected {
        return Err(StorageError::Rejected { message: format!("{:?}", message), expected });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use actix_web::web::Bytes;

    use super::*;
    use crate::storage::Headers;

    #[test]
    fn queues_only_accept_their_own_kind() {
        let queues = Queues::default();
        let request = Message::request("GET", "/", Headers::new(), Bytes::new());
        let response = Message::response(200, Headers::new(), Bytes::new(), Duration::ZERO);

        assert!(queues.responses.push_last(request.clone()).is_err());
        assert!(queues.requests.push_last(response.clone()).is_err());
        assert_eq!(queues.responses.len(), 0);
        assert_eq!(queues.requests.len(), 0);

        queues.responses.push_last(response).unwrap();
        queues.requests.push_last(request).unwrap();
        assert_eq!(queues.responses.len(), 1);
        assert_eq!(queues.requests.len(), 1);
    }

    #[test]
    fn rejection_names_expected_kind() {
        let queues = Queues::default();
        let request = Message::request("GET", "/", Headers::new(), Bytes::new());
        let err = queues.responses.push_last(request).unwrap_err();
        assert!(err.to_string().ends_with("is not Response"));
    }
}
