use crate::control::{ControlError, RequestView};
use crate::storage::Queue;

/// Control operations over the recorded request queue.
pub struct Requests<'a> {
    queue: &'a Queue,
}

impl<'a> Requests<'a> {

    pub fn new(queue: &'a Queue) -> Self {
        Self { queue }
    }

    pub fn list(&self) -> Result<Vec<RequestView>, ControlError> {
        self.queue.list().into_iter().map(RequestView::try_from).collect()
    }

    /// `None` when nothing has been recorded; that is not an error.
    pub fn pop(&self) -> Result<Option<RequestView>, ControlError> {
        self.queue.pop_first().map(RequestView::try_from).transpose()
    }

    pub fn clear(&self) -> bool {
        self.queue.clear();
        true
    }
}
