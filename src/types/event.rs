use serde::{Deserialize, Serialize};

/// Event emitted by a contract call.
///
/// Size limits are enforced by the reader and writer, not here, so an
/// oversized event can be built but never encoded.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NetEvent {
    pub event_type: String,
    pub selector: u64,
    pub data: Vec<u8>,
}

impl NetEvent {
    pub fn new(event_type: impl Into<String>, selector: u64, data: Vec<u8>) -> Self {
        NetEvent {
            event_type: event_type.into(),
            selector,
            data,
        }
    }

    pub fn data_len(&self) -> usize {
        self.data.len()
    }
}
