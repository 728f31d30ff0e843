//! API request and response types

use crate::trend::ReadingStats;
use serde::{Deserialize, Serialize};

/// Inbound chat message
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Request to clear a conversation
#[derive(Debug, Default, Deserialize)]
pub struct ResetRequest {
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Acknowledgment of a reset
#[derive(Debug, Serialize)]
pub struct ResetResponse {
    pub status: &'static str,
    pub message: &'static str,
}

impl ResetResponse {
    pub fn done() -> Self {
        Self {
            status: "reset",
            message: "Conversation reset successfully",
        }
    }
}

/// Reading statistics, or a marker that none exist
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum StatsResponse {
    Stats(ReadingStats),
    NoData {
        status: &'static str,
        message: &'static str,
    },
}

impl StatsResponse {
    pub fn no_data() -> Self {
        StatsResponse::NoData {
            status: "no_data",
            message: "No readings have been logged for this session yet.",
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub sessions: usize,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
