use derive_more::derive::{AsRef, Deref, Display, From, Into};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Jobs with a status code below this value are still running.
pub const EGRESS_ACTIVE_THRESHOLD: i32 = 2;

#[derive(From, Into, AsRef, Deref, Debug, Display, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EgressId(String);

impl From<&str> for EgressId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

/// Lifecycle of an egress job, owned by the media platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, num_enum::FromPrimitive, num_enum::IntoPrimitive)]
#[repr(i32)]
pub enum EgressStatus {
    Starting = 0,
    Active = 1,
    Ending = 2,
    Complete = 3,
    Failed = 4,
    Aborted = 5,
    LimitReached = 6,
    #[num_enum(catch_all)]
    Unknown(i32),
}

impl EgressStatus {
    pub fn code(&self) -> i32 {
        i32::from(*self)
    }

    pub fn is_active(&self) -> bool {
        self.code() < EGRESS_ACTIVE_THRESHOLD
    }

    fn name(&self) -> Option<&'static str> {
        match self {
            Self::Starting => Some("EGRESS_STARTING"),
            Self::Active => Some("EGRESS_ACTIVE"),
            Self::Ending => Some("EGRESS_ENDING"),
            Self::Complete => Some("EGRESS_COMPLETE"),
            Self::Failed => Some("EGRESS_FAILED"),
            Self::Aborted => Some("EGRESS_ABORTED"),
            Self::LimitReached => Some("EGRESS_LIMIT_REACHED"),
            Self::Unknown(_) => None,
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "EGRESS_STARTING" => Some(Self::Starting),
            "EGRESS_ACTIVE" => Some(Self::Active),
            "EGRESS_ENDING" => Some(Self::Ending),
            "EGRESS_COMPLETE" => Some(Self::Complete),
            "EGRESS_FAILED" => Some(Self::Failed),
            "EGRESS_ABORTED" => Some(Self::Aborted),
            "EGRESS_LIMIT_REACHED" => Some(Self::LimitReached),
            _ => None,
        }
    }
}

impl Default for EgressStatus {
    fn default() -> Self {
        Self::Starting
    }
}

impl Serialize for EgressStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.name() {
            Some(name) => serializer.serialize_str(name),
            None => serializer.serialize_i32(self.code()),
        }
    }
}

impl<'de> Deserialize<'de> for EgressStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // protojson emits enum names, other encoders emit the numeric code
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Code(i32),
            Name(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Code(code) => Ok(Self::from(code)),
            Raw::Name(name) => Self::from_name(&name).ok_or_else(|| serde::de::Error::custom(format!("unknown egress status {name}"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EgressInfo {
    #[serde(alias = "egressId")]
    pub egress_id: EgressId,
    #[serde(alias = "roomName", default)]
    pub room_name: String,
    #[serde(default)]
    pub status: EgressStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl EgressInfo {
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListEgressRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub egress_id: Option<String>,
    #[serde(default)]
    pub active: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListEgressResponse {
    #[serde(default)]
    pub items: Vec<EgressInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct S3Upload {
    pub access_key: String,
    pub secret: String,
    pub region: String,
    pub endpoint: String,
    pub bucket: String,
    #[serde(default)]
    pub force_path_style: bool,
}

/// Destination of a composite recording. Without an `s3` upload the platform keeps the file on its own disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedFileOutput {
    pub filepath: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub s3: Option<S3Upload>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomCompositeEgressRequest {
    pub room_name: String,
    pub layout: String,
    #[serde(default)]
    pub audio_only: bool,
    #[serde(default)]
    pub video_only: bool,
    pub file_outputs: Vec<EncodedFileOutput>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StopEgressRequest {
    pub egress_id: EgressId,
}
