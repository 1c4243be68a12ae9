//! JSON bodies exchanged between the conferencing client and the HTTP server.

use serde::{Deserialize, Serialize};

pub const GENERATE_TOKEN_PATH: &str = "/api/generate-token";
pub const RECORD_START_PATH: &str = "/api/record/start";
pub const RECORD_STOP_PATH: &str = "/api/record/stop";
pub const RECORDING_TOKEN_PATH: &str = "/api/recording/start";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateTokenReq {
    pub password: Option<String>,
    pub participant_name: Option<String>,
    pub room_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateTokenRes {
    pub token: String,
    pub participant_name: String,
    pub room_name: String,
    pub expires_in: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordStartReq {
    pub room_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordStartRes {
    pub message: String,
    pub filename: String,
    pub filepath: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordStopRes {
    pub message: String,
    pub room_name: String,
    pub stopped_count: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordingTokenReq {
    pub password: Option<String>,
    pub room_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordingTokenRes {
    pub token: String,
    pub room_name: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorRes {
    pub error: String,
}
