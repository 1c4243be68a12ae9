use std::path::PathBuf;

use chrono::{DateTime, SecondsFormat, Utc};
use meet_protocol::{
    record::{RecordingInfo, RecordingState},
    room::RoomName,
};

/// Names derived for one recording at the moment it starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordingFiles {
    pub filename: String,
    pub filepath: PathBuf,
    pub info_path: PathBuf,
    pub started_at: DateTime<Utc>,
}

/// Local directory holding the `-info.json` metadata written for each recording.
#[derive(Debug, Clone)]
pub struct RecordingStorage {
    dir: PathBuf,
}

impl RecordingStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn files_for(&self, room: &RoomName, started_at: DateTime<Utc>) -> RecordingFiles {
        let timestamp = file_timestamp(started_at);
        let room = room.replace(['/', '\\'], "_");
        let filename = format!("{timestamp}-{room}.mp4");
        RecordingFiles {
            filepath: self.dir.join(&filename),
            info_path: self.dir.join(format!("{timestamp}-{room}-info.json")),
            filename,
            started_at,
        }
    }

    /// Writes the metadata file, creating the directory when missing.
    pub async fn write_info(&self, room: &RoomName, files: &RecordingFiles) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let info = RecordingInfo {
            room_name: room.to_string(),
            filename: files.filename.clone(),
            filepath: files.filepath.to_string_lossy().to_string(),
            start_time: files.started_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            status: RecordingState::Recording,
        };
        let json = serde_json::to_string_pretty(&info).map_err(std::io::Error::other)?;
        tokio::fs::write(&files.info_path, json).await?;
        log::info!("[RecordingStorage] saved recording info {:?}", files.info_path);
        Ok(())
    }
}

/// ISO-8601 UTC with `:` and `.` replaced so it is usable in file names.
pub fn file_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true).replace([':', '.'], "-")
}
