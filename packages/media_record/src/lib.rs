mod controller;
pub mod egress;
mod output;
pub mod registry;
pub mod storage;

pub use controller::{RecordingController, StartRecordingError, StartedRecording, StopRecordingError};
pub use egress::{management_origin, EgressError, EgressService, TwirpEgressClient};
pub use output::RecordOutput;
