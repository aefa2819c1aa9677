//! Response Models
//!
//! Defines the payloads delivered back to the host. A single request can
//! produce two of them: an immediate `Streaming` payload carrying cached rows,
//! and a terminal `Done` payload once the backend round trip has been folded
//! into the cache.

use serde::{Deserialize, Serialize};

use crate::table::RowTable;

// == Loading State ==
/// Delivery state of a response payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadingState {
    /// Partial rows; more will follow for the same request key
    Streaming,
    /// Terminal payload; the only state that may update the cache
    Done,
}

// == Query Response ==
/// One payload for one request key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResponse {
    /// The request id this payload answers
    pub key: String,
    /// Delivery state
    pub state: LoadingState,
    /// Row tables, one or more per target
    pub data: Vec<RowTable>,
}

impl QueryResponse {
    /// Creates a partial payload carrying cached rows.
    pub fn streaming(key: impl Into<String>, data: Vec<RowTable>) -> Self {
        Self {
            key: key.into(),
            state: LoadingState::Streaming,
            data,
        }
    }

    /// Creates a terminal payload.
    pub fn done(key: impl Into<String>, data: Vec<RowTable>) -> Self {
        Self {
            key: key.into(),
            state: LoadingState::Done,
            data,
        }
    }

    /// True for payloads allowed to mutate the cache.
    pub fn is_terminal(&self) -> bool {
        self.state == LoadingState::Done
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_streaming_is_not_terminal() {
        let response = QueryResponse::streaming("r1", vec![]);
        assert_eq!(response.state, LoadingState::Streaming);
        assert!(!response.is_terminal());
    }

    #[test]
    fn test_done_is_terminal() {
        let response = QueryResponse::done("r1", vec![]);
        assert!(response.is_terminal());
    }

    #[test]
    fn test_state_serde() {
        let response = QueryResponse::done("r1", vec![]);
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"state\":\"done\""));
        assert!(json.contains("\"key\":\"r1\""));
    }
}
