use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::storage::{Message, StorageError};

pub type Validator = fn(&Message) -> Result<(), StorageError>;

/// FIFO of messages shared between the mock and the control planes.
///
/// Every operation holds the queue's lock for its whole duration, so a
/// concurrent reader never sees a half-applied push or clear.
/// Messages handed out by `list` and `pop_first` are owned copies.
pub struct Queue {
    items: Mutex<VecDeque<Message>>,
    validator: Option<Validator>,
}

impl Default for Queue {
    fn default() -> Self {
        Self { items: Mutex::new(VecDeque::new()), validator: None }
    }
}

impl Queue {

    pub fn with_validator(validator: Validator) -> Self {
        Self { validator: Some(validator), ..Self::default() }
    }

    pub fn push_last(&self, message: Message) -> Result<(), StorageError> {
        if let Some(validator) = self.validator {
            validator(&message)?;
        }
        self.lock().push_back(message);
        Ok(())
    }

    pub fn pop_first(&self) -> Option<Message> {
        self.lock().pop_front()
    }

    pub fn list(&self) -> Vec<Message> {
        self.lock().iter().cloned().collect()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    // No operation can panic half way through a mutation, so a poisoned
    // lock still guards a consistent deque.
    fn lock(&self) -> MutexGuard<'_, VecDeque<Message>> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
