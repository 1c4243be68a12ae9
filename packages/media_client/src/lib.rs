//! Client side flows of the conferencing app: the join form, the room bootstrap and the recording button.

pub mod api;
pub mod conference;
pub mod join;
pub mod notify;
pub mod recording;

pub use api::{ClientError, MeetApiClient};
pub use conference::{ConferenceView, RoomSession};
pub use join::{ConnectionForm, JoinLink};
pub use notify::{LogNotifier, UserNotifier};
pub use recording::{RecordingMode, RecordingToggle, ToggleOutcome};
