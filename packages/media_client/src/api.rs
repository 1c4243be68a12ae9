use meet_protocol::{
    api::{
        ErrorRes, GenerateTokenReq, GenerateTokenRes, RecordStartReq, RecordStartRes, RecordStopRes, RecordingTokenReq, RecordingTokenRes, GENERATE_TOKEN_PATH, RECORDING_TOKEN_PATH, RECORD_START_PATH,
        RECORD_STOP_PATH,
    },
    room::RoomName,
};
use serde::de::DeserializeOwned;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("{0}")]
    Http(#[from] reqwest::Error),
    /// The server refused the request; `message` is the text it sent back.
    #[error("{message}")]
    Rejected { status: u16, message: String },
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Http(err) => err.status().map(|s| s.as_u16()),
            ClientError::Rejected { status, .. } => Some(*status),
        }
    }
}

/// Calls the conferencing HTTP endpoints.
#[derive(Clone)]
pub struct MeetApiClient {
    base: String,
    client: reqwest::Client,
}

impl MeetApiClient {
    pub fn new(base: &str) -> Self {
        Self {
            base: base.trim_end_matches('/').to_owned(),
            client: reqwest::Client::new(),
        }
    }

    pub async fn generate_token(&self, req: &GenerateTokenReq) -> Result<GenerateTokenRes, ClientError> {
        let res = self.client.post(self.url(GENERATE_TOKEN_PATH)).json(req).send().await?;
        parse_response(res).await
    }

    pub async fn start_recording(&self, room: &RoomName) -> Result<RecordStartRes, ClientError> {
        let req = RecordStartReq { room_name: Some(room.to_string()) };
        let res = self.client.post(self.url(RECORD_START_PATH)).json(&req).send().await?;
        parse_response(res).await
    }

    pub async fn stop_recording(&self, room: &RoomName) -> Result<RecordStopRes, ClientError> {
        let res = self.client.get(self.url(RECORD_STOP_PATH)).query(&[("roomName", room.as_str())]).send().await?;
        parse_response(res).await
    }

    pub async fn recording_token(&self, password: &str, room: &RoomName) -> Result<RecordingTokenRes, ClientError> {
        let req = RecordingTokenReq {
            password: Some(password.to_owned()),
            room_name: Some(room.to_string()),
        };
        let res = self.client.post(self.url(RECORDING_TOKEN_PATH)).json(&req).send().await?;
        parse_response(res).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }
}

async fn parse_response<T: DeserializeOwned>(res: reqwest::Response) -> Result<T, ClientError> {
    let status = res.status();
    if status.is_success() {
        return Ok(res.json().await?);
    }
    let body = res.text().await.unwrap_or_default();
    let message = match serde_json::from_str::<ErrorRes>(&body) {
        Ok(err) => err.error,
        Err(_) if !body.is_empty() => body,
        Err(_) => status.to_string(),
    };
    log::warn!("[MeetApiClient] request rejected {status} {message}");
    Err(ClientError::Rejected { status: status.as_u16(), message })
}
