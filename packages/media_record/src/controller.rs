use std::sync::Arc;

use chrono::Utc;
use meet_protocol::{
    egress::{EgressId, EgressInfo},
    room::RoomName,
};

use crate::{
    egress::{EgressError, EgressService, SPEAKER_LAYOUT},
    output::RecordOutput,
    registry::{RecordingClaim, RecordingRegistry, RoomSlot},
    storage::{RecordingFiles, RecordingStorage},
};

#[derive(Debug, thiserror::Error)]
pub enum StartRecordingError {
    #[error("Meeting is already being recorded")]
    AlreadyRecording,
    #[error("{0}")]
    Egress(#[from] EgressError),
    #[error("{0}")]
    Storage(#[from] std::io::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum StopRecordingError {
    #[error("No active recordings found for this room")]
    NoRecordings,
    #[error("No active recordings to stop")]
    NothingActive,
    #[error("{0}")]
    Egress(#[from] EgressError),
}

#[derive(Debug, Clone)]
pub struct StartedRecording {
    pub egress_id: EgressId,
    pub files: RecordingFiles,
    pub local_path: Option<String>,
}

/// Starts and stops composite room recordings, one active job per room.
pub struct RecordingController<E> {
    egress: Arc<E>,
    registry: RecordingRegistry,
    storage: RecordingStorage,
    output: RecordOutput,
}

impl<E: EgressService> RecordingController<E> {
    pub fn new(egress: Arc<E>, storage: RecordingStorage, output: RecordOutput) -> Self {
        Self {
            egress,
            registry: RecordingRegistry::default(),
            storage,
            output,
        }
    }

    pub fn registry(&self) -> &RecordingRegistry {
        &self.registry
    }

    pub async fn start(&self, room: &RoomName) -> Result<StartedRecording, StartRecordingError> {
        let claim = self.claim_room(room).await?;

        let files = self.storage.files_for(room, Utc::now());
        let info = self.egress.start_room_composite(room, SPEAKER_LAYOUT, self.output.file_output(&files.filename)).await?;
        log::info!("[RecordingController] room {room} recording started with egress {} => {}", info.egress_id, files.filename);
        claim.activate(info.egress_id.clone());

        self.storage.write_info(room, &files).await?;
        Ok(StartedRecording {
            egress_id: info.egress_id,
            local_path: self.output.local_path(&files.filename),
            files,
        })
    }

    /// Stops every job of the room still running and returns how many were stopped.
    pub async fn stop(&self, room: &RoomName) -> Result<usize, StopRecordingError> {
        let jobs = self.egress.list_egress(room).await?;
        if jobs.is_empty() {
            return Err(StopRecordingError::NoRecordings);
        }

        let active = jobs.iter().filter(|job| job.is_active()).collect::<Vec<_>>();
        if active.is_empty() {
            self.registry.clear(room);
            return Err(StopRecordingError::NothingActive);
        }

        // every stop runs to completion, a failed one must not cancel the others
        let results = futures::future::join_all(active.iter().map(|job| self.egress.stop_egress(&job.egress_id))).await;
        let mut stopped = 0;
        let mut first_err = None;
        for (job, res) in active.iter().zip(results) {
            match res {
                Ok(_) => stopped += 1,
                Err(e) => {
                    log::error!("[RecordingController] room {room} stop egress {} error {e}", job.egress_id);
                    if first_err.is_none() {
                        first_err = Some(e);
                    }
                }
            }
        }
        if let Some(e) = first_err {
            return Err(e.into());
        }
        self.registry.clear(room);
        log::info!("[RecordingController] room {room} stopped {stopped} recordings");
        Ok(stopped)
    }

    async fn claim_room(&self, room: &RoomName) -> Result<RecordingClaim, StartRecordingError> {
        match self.registry.try_claim(room) {
            Ok(claim) => {
                // jobs started by other processes or before a restart are only visible upstream
                let jobs = self.egress.list_egress(room).await?;
                if has_active(&jobs) {
                    log::warn!("[RecordingController] room {room} already has an active egress");
                    return Err(StartRecordingError::AlreadyRecording);
                }
                Ok(claim)
            }
            Err(RoomSlot::Starting) => Err(StartRecordingError::AlreadyRecording),
            Err(RoomSlot::Active(egress_id)) => {
                let jobs = self.egress.list_egress(room).await?;
                if has_active(&jobs) {
                    return Err(StartRecordingError::AlreadyRecording);
                }
                self.registry.reclaim_stale(room, &egress_id).ok_or(StartRecordingError::AlreadyRecording)
            }
        }
    }
}

fn has_active(jobs: &[EgressInfo]) -> bool {
    jobs.iter().any(|job| job.is_active())
}

#[cfg(test)]
mod tests {
    use std::{
        collections::HashMap,
        sync::{
            atomic::{AtomicUsize, Ordering},
            Arc,
        },
    };

    use meet_protocol::egress::{EgressStatus, EncodedFileOutput};
    use spin::Mutex;

    use super::*;

    #[derive(Default)]
    struct FakeEgress {
        jobs: Mutex<HashMap<String, Vec<EgressInfo>>>,
        started: AtomicUsize,
        stopped: Mutex<Vec<EgressId>>,
        fail_start: Option<String>,
        fail_stop: Option<EgressId>,
    }

    impl FakeEgress {
        fn with_jobs(room: &str, statuses: &[EgressStatus]) -> Self {
            let jobs = statuses
                .iter()
                .enumerate()
                .map(|(i, status)| EgressInfo {
                    egress_id: EgressId::from(format!("EG_{i}")),
                    room_name: room.to_string(),
                    status: *status,
                    error: None,
                })
                .collect();
            Self {
                jobs: Mutex::new(HashMap::from([(room.to_string(), jobs)])),
                ..Default::default()
            }
        }
    }

    #[async_trait::async_trait]
    impl EgressService for FakeEgress {
        async fn list_egress(&self, room: &RoomName) -> Result<Vec<EgressInfo>, EgressError> {
            Ok(self.jobs.lock().get(room.as_str()).cloned().unwrap_or_default())
        }

        async fn start_room_composite(&self, room: &RoomName, layout: &str, _output: EncodedFileOutput) -> Result<EgressInfo, EgressError> {
            assert_eq!(layout, "speaker");
            if let Some(message) = &self.fail_start {
                return Err(EgressError::Upstream { status: 500, message: message.clone() });
            }
            let idx = self.started.fetch_add(1, Ordering::SeqCst);
            let info = EgressInfo {
                egress_id: EgressId::from(format!("EG_NEW_{idx}")),
                room_name: room.to_string(),
                status: EgressStatus::Starting,
                error: None,
            };
            self.jobs.lock().entry(room.to_string()).or_default().push(info.clone());
            Ok(info)
        }

        async fn stop_egress(&self, egress_id: &EgressId) -> Result<EgressInfo, EgressError> {
            if self.fail_stop.as_ref() == Some(egress_id) {
                return Err(EgressError::Upstream {
                    status: 412,
                    message: "egress already ending".to_string(),
                });
            }
            self.stopped.lock().push(egress_id.clone());
            let mut jobs = self.jobs.lock();
            let job = jobs.values_mut().flatten().find(|job| &job.egress_id == egress_id).expect("Should have job");
            job.status = EgressStatus::Ending;
            Ok(job.clone())
        }
    }

    fn controller(egress: FakeEgress, dir: &std::path::Path) -> RecordingController<FakeEgress> {
        RecordingController::new(Arc::new(egress), RecordingStorage::new(dir), RecordOutput::File { dir: "/out".to_string() })
    }

    #[tokio::test]
    async fn start_writes_info_and_marks_room() {
        let tmp = tempfile::tempdir().expect("Should create temp dir");
        let controller = controller(FakeEgress::default(), tmp.path());
        let room = RoomName::from("room1");

        let started = controller.start(&room).await.expect("Should start");
        assert_eq!(started.egress_id, EgressId::from("EG_NEW_0"));
        assert!(started.files.filename.ends_with("-room1.mp4"));
        assert_eq!(started.local_path, Some(format!("/out/{}", started.files.filename)));
        assert!(started.files.info_path.exists());
        assert_eq!(controller.registry().slot(&room), Some(RoomSlot::Active(EgressId::from("EG_NEW_0"))));
    }

    #[tokio::test]
    async fn start_rejects_when_upstream_active() {
        let tmp = tempfile::tempdir().expect("Should create temp dir");
        let controller = controller(FakeEgress::with_jobs("room1", &[EgressStatus::Complete, EgressStatus::Active]), tmp.path());

        let err = controller.start(&RoomName::from("room1")).await.expect_err("Should reject");
        assert!(matches!(err, StartRecordingError::AlreadyRecording));
        assert_eq!(controller.egress.started.load(Ordering::SeqCst), 0, "Should not create a job");
        assert!(controller.registry().is_empty(), "Claim should be released");
    }

    #[tokio::test]
    async fn start_allowed_when_only_finished_jobs() {
        let tmp = tempfile::tempdir().expect("Should create temp dir");
        let controller = controller(FakeEgress::with_jobs("room1", &[EgressStatus::Complete, EgressStatus::Failed]), tmp.path());
        controller.start(&RoomName::from("room1")).await.expect("Should start");
    }

    #[tokio::test]
    async fn second_start_conflicts() {
        let tmp = tempfile::tempdir().expect("Should create temp dir");
        let controller = controller(FakeEgress::default(), tmp.path());
        let room = RoomName::from("room1");

        controller.start(&room).await.expect("Should start");
        let err = controller.start(&room).await.expect_err("Should reject");
        assert!(matches!(err, StartRecordingError::AlreadyRecording));
        assert_eq!(controller.egress.started.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn concurrent_starts_create_one_job() {
        let tmp = tempfile::tempdir().expect("Should create temp dir");
        let controller = controller(FakeEgress::default(), tmp.path());
        let room = RoomName::from("room1");

        let (first, second) = tokio::join!(controller.start(&room), controller.start(&room));
        assert_eq!([first.is_ok(), second.is_ok()].iter().filter(|ok| **ok).count(), 1);
        assert_eq!(controller.egress.started.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn stale_slot_is_reclaimed() {
        let tmp = tempfile::tempdir().expect("Should create temp dir");
        let controller = controller(FakeEgress::default(), tmp.path());
        let room = RoomName::from("room1");

        controller.start(&room).await.expect("Should start");
        // the job ended on the platform side without a stop request
        for job in controller.egress.jobs.lock().values_mut().flatten() {
            job.status = EgressStatus::Complete;
        }
        let started = controller.start(&room).await.expect("Should start again");
        assert_eq!(started.egress_id, EgressId::from("EG_NEW_1"));
    }

    #[tokio::test]
    async fn start_error_releases_claim() {
        let tmp = tempfile::tempdir().expect("Should create temp dir");
        let egress = FakeEgress {
            fail_start: Some("no egress workers available".to_string()),
            ..Default::default()
        };
        let controller = controller(egress, tmp.path());

        let err = controller.start(&RoomName::from("room1")).await.expect_err("Should fail");
        assert_eq!(err.to_string(), "no egress workers available");
        assert!(controller.registry().is_empty());
    }

    #[tokio::test]
    async fn stop_without_jobs_is_not_found() {
        let tmp = tempfile::tempdir().expect("Should create temp dir");
        let controller = controller(FakeEgress::default(), tmp.path());

        let err = controller.stop(&RoomName::from("room1")).await.expect_err("Should fail");
        assert!(matches!(err, StopRecordingError::NoRecordings));
    }

    #[tokio::test]
    async fn stop_without_active_jobs_is_not_found() {
        let tmp = tempfile::tempdir().expect("Should create temp dir");
        let controller = controller(FakeEgress::with_jobs("room1", &[EgressStatus::Complete, EgressStatus::Aborted]), tmp.path());

        let err = controller.stop(&RoomName::from("room1")).await.expect_err("Should fail");
        assert!(matches!(err, StopRecordingError::NothingActive));
        assert!(controller.egress.stopped.lock().is_empty());
    }

    #[tokio::test]
    async fn stop_every_active_job() {
        let tmp = tempfile::tempdir().expect("Should create temp dir");
        let statuses = [EgressStatus::Starting, EgressStatus::Active, EgressStatus::Complete, EgressStatus::Active];
        let controller = controller(FakeEgress::with_jobs("room1", &statuses), tmp.path());

        let stopped = controller.stop(&RoomName::from("room1")).await.expect("Should stop");
        assert_eq!(stopped, 3);
        let mut ids = controller.egress.stopped.lock().clone();
        ids.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        assert_eq!(ids, vec![EgressId::from("EG_0"), EgressId::from("EG_1"), EgressId::from("EG_3")]);
    }

    #[tokio::test]
    async fn stop_failure_does_not_cancel_other_jobs() {
        let tmp = tempfile::tempdir().expect("Should create temp dir");
        let statuses = [EgressStatus::Active, EgressStatus::Active, EgressStatus::Active];
        let egress = FakeEgress {
            fail_stop: Some(EgressId::from("EG_0")),
            ..FakeEgress::with_jobs("room1", &statuses)
        };
        let controller = controller(egress, tmp.path());

        let err = controller.stop(&RoomName::from("room1")).await.expect_err("Should fail");
        assert!(matches!(err, StopRecordingError::Egress(EgressError::Upstream { status: 412, .. })));
        let mut ids = controller.egress.stopped.lock().clone();
        ids.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        assert_eq!(ids, vec![EgressId::from("EG_1"), EgressId::from("EG_2")]);
    }

    #[tokio::test]
    async fn stop_then_start_again() {
        let tmp = tempfile::tempdir().expect("Should create temp dir");
        let controller = controller(FakeEgress::default(), tmp.path());
        let room = RoomName::from("room1");

        controller.start(&room).await.expect("Should start");
        assert_eq!(controller.stop(&room).await.expect("Should stop"), 1);
        assert!(controller.registry().is_empty());
        controller.start(&room).await.expect("Should start again");
    }
}
