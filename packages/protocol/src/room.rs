use derive_more::derive::{AsRef, Deref, Display, From, Into};
use serde::{Deserialize, Serialize};

#[derive(From, Into, AsRef, Deref, Debug, Display, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RoomName(String);

impl From<&str> for RoomName {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

#[derive(From, Into, AsRef, Deref, Debug, Display, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParticipantIdentity(String);

impl From<&str> for ParticipantIdentity {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl ParticipantIdentity {
    /// Identity used by the recorder token flow.
    pub fn recorder() -> Self {
        Self("recorder".to_string())
    }
}
