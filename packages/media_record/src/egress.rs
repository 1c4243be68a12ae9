use meet_protocol::{
    egress::{EgressId, EgressInfo, EncodedFileOutput},
    room::RoomName,
};
use meet_secure::TokenError;

mod twirp;

pub use twirp::{management_origin, TwirpEgressClient};

/// Layout used for every composite room recording.
pub const SPEAKER_LAYOUT: &str = "speaker";

#[derive(Debug, thiserror::Error)]
pub enum EgressError {
    /// The request never produced an answer from the platform.
    #[error("{0}")]
    Http(#[from] reqwest::Error),
    /// The platform answered with an error; `message` is its own text.
    #[error("{message}")]
    Upstream { status: u16, message: String },
    #[error("{0}")]
    Token(#[from] TokenError),
}

/// Egress jobs as seen through the platform's management API.
#[async_trait::async_trait]
pub trait EgressService: Send + Sync {
    async fn list_egress(&self, room: &RoomName) -> Result<Vec<EgressInfo>, EgressError>;
    async fn start_room_composite(&self, room: &RoomName, layout: &str, output: EncodedFileOutput) -> Result<EgressInfo, EgressError>;
    async fn stop_egress(&self, egress_id: &EgressId) -> Result<EgressInfo, EgressError>;
}
