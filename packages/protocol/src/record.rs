use serde::{Deserialize, Serialize};

/// Metadata persisted next to each recording when it starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordingInfo {
    pub room_name: String,
    pub filename: String,
    pub filepath: String,
    pub start_time: String,
    pub status: RecordingState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordingState {
    Recording,
}
