use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use meet_protocol::{
    api::{RecordStartRes, RecordStopRes},
    room::RoomName,
};

use crate::{
    api::{ClientError, MeetApiClient},
    notify::UserNotifier,
};

pub const TOGGLE_FAILED_ALERT: &str = "Failed to toggle recording. Please try again.";
pub const PASSWORD_PROMPT: &str = "Enter the recording password";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordingMode {
    /// Start and stop without any extra check.
    Direct,
    /// Asks for the recorder password and validates it against the recording-token endpoint before starting.
    PasswordGated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleOutcome {
    Started(RecordStartRes),
    Stopped(RecordStopRes),
    /// Another toggle is still in flight.
    Busy,
    /// The password prompt was dismissed.
    Cancelled,
    Failed(String),
}

/// Start/stop control bound to one room.
pub struct RecordingToggle<N> {
    api: MeetApiClient,
    room: RoomName,
    mode: RecordingMode,
    notifier: Arc<N>,
    processing: AtomicBool,
}

struct ProcessingGuard<'a>(&'a AtomicBool);

impl Drop for ProcessingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<N: UserNotifier> RecordingToggle<N> {
    pub fn new(api: MeetApiClient, room: RoomName, mode: RecordingMode, notifier: Arc<N>) -> Self {
        Self {
            api,
            room,
            mode,
            notifier,
            processing: AtomicBool::new(false),
        }
    }

    pub fn is_processing(&self) -> bool {
        self.processing.load(Ordering::Acquire)
    }

    /// Flips the room recording state. `is_recording` is the state the room currently reports.
    pub async fn toggle(&self, is_recording: bool) -> ToggleOutcome {
        if self.processing.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire).is_err() {
            log::warn!("[RecordingToggle] room {} toggle already in progress", self.room);
            return ToggleOutcome::Busy;
        }
        let _guard = ProcessingGuard(&self.processing);

        let res = if is_recording { self.stop().await } else { self.start().await };
        match res {
            Ok(outcome) => outcome,
            Err(e) => {
                log::error!("[RecordingToggle] room {} toggle error {e}", self.room);
                self.notifier.alert(TOGGLE_FAILED_ALERT);
                ToggleOutcome::Failed(e.to_string())
            }
        }
    }

    async fn start(&self) -> Result<ToggleOutcome, ClientError> {
        if self.mode == RecordingMode::PasswordGated {
            let password = match self.notifier.prompt(PASSWORD_PROMPT) {
                Some(password) => password,
                None => return Ok(ToggleOutcome::Cancelled),
            };
            match self.api.recording_token(&password, &self.room).await {
                Ok(res) => log::info!("[RecordingToggle] room {} {}", res.room_name, res.message),
                Err(ClientError::Rejected { status: 401, message }) => {
                    self.notifier.alert(&message);
                    return Ok(ToggleOutcome::Failed(message));
                }
                Err(e) => return Err(e),
            }
        }

        let res = self.api.start_recording(&self.room).await?;
        log::info!("[RecordingToggle] room {} recording started {}", self.room, res.filename);
        if let Some(local_path) = &res.local_path {
            self.notifier.alert(&format!("Recording started! File will be saved to: {local_path}"));
        }
        Ok(ToggleOutcome::Started(res))
    }

    async fn stop(&self) -> Result<ToggleOutcome, ClientError> {
        let res = self.api.stop_recording(&self.room).await?;
        log::info!("[RecordingToggle] room {} stopped {} recordings", self.room, res.stopped_count);
        Ok(ToggleOutcome::Stopped(res))
    }
}
