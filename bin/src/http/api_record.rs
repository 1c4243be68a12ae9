use std::sync::Arc;

use meet_protocol::room::RoomName;
use meet_record::{EgressService, RecordingController, StartRecordingError, StopRecordingError};
use poem::{http::StatusCode, Result};
use poem_openapi::{param::Query, payload::Json, Object, OpenApi};

const MISSING_ROOM: &str = "Missing roomName parameter";
const LOCAL_FILE_INSTRUCTIONS: &str = "Recording will be saved directly to the recordings folder";

#[derive(Object)]
#[oai(rename_all = "camelCase")]
struct RecordStartBody {
    room_name: Option<String>,
}

#[derive(Object)]
#[oai(rename_all = "camelCase")]
struct RecordStarted {
    message: String,
    filename: String,
    filepath: String,
    #[oai(skip_serializing_if_is_none)]
    local_path: Option<String>,
    #[oai(skip_serializing_if_is_none)]
    instructions: Option<String>,
}

#[derive(Object)]
#[oai(rename_all = "camelCase")]
struct RecordStopped {
    message: String,
    room_name: String,
    stopped_count: u32,
}

fn room_param(room: Option<String>) -> Result<RoomName> {
    match room {
        Some(room) if !room.is_empty() => Ok(RoomName::from(room)),
        _ => Err(poem::Error::from_string(MISSING_ROOM, StatusCode::BAD_REQUEST)),
    }
}

pub struct RecordApis<E> {
    recorder: Arc<RecordingController<E>>,
}

#[OpenApi]
impl<E: 'static + EgressService> RecordApis<E> {
    pub fn new(recorder: Arc<RecordingController<E>>) -> Self {
        Self { recorder }
    }

    /// start a composite recording of the room
    #[oai(path = "/start", method = "post")]
    async fn record_start(&self, body: Json<RecordStartBody>) -> Result<Json<RecordStarted>> {
        let room = room_param(body.0.room_name)?;
        log::info!("[RecordApis] start recording room {room}");
        match self.recorder.start(&room).await {
            Ok(started) => Ok(Json(RecordStarted {
                message: "Recording started successfully".to_string(),
                filename: started.files.filename,
                filepath: started.files.filepath.to_string_lossy().to_string(),
                instructions: started.local_path.as_ref().map(|_| LOCAL_FILE_INSTRUCTIONS.to_string()),
                local_path: started.local_path,
            })),
            Err(StartRecordingError::AlreadyRecording) => {
                log::warn!("[RecordApis] room {room} is already being recorded");
                Err(poem::Error::from_string(StartRecordingError::AlreadyRecording.to_string(), StatusCode::CONFLICT))
            }
            Err(e) => {
                log::error!("[RecordApis] start recording room {room} error {e}");
                Err(poem::Error::from_string(e.to_string(), StatusCode::INTERNAL_SERVER_ERROR))
            }
        }
    }

    /// stop every active recording of the room
    #[oai(path = "/stop", method = "get")]
    async fn record_stop(&self, #[oai(name = "roomName")] room_name: Query<Option<String>>) -> Result<Json<RecordStopped>> {
        let room = room_param(room_name.0)?;
        log::info!("[RecordApis] stop recording room {room}");
        match self.recorder.stop(&room).await {
            Ok(count) => Ok(Json(RecordStopped {
                message: "Recording stopped successfully".to_string(),
                room_name: room.to_string(),
                stopped_count: count as u32,
            })),
            Err(e @ (StopRecordingError::NoRecordings | StopRecordingError::NothingActive)) => {
                log::warn!("[RecordApis] stop recording room {room}: {e}");
                Err(poem::Error::from_string(e.to_string(), StatusCode::NOT_FOUND))
            }
            Err(e) => {
                log::error!("[RecordApis] stop recording room {room} error {e}");
                Err(poem::Error::from_string(e.to_string(), StatusCode::INTERNAL_SERVER_ERROR))
            }
        }
    }
}
