use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::room::RoomName;

/// Lifetime of every access token issued by the token endpoints.
pub const ACCESS_TOKEN_TTL: Duration = Duration::from_secs(24 * 3600);
/// Human readable label echoed back with issued tokens.
pub const ACCESS_TOKEN_TTL_LABEL: &str = "24h";
/// Lifetime of the short tokens used to call the management API.
pub const MANAGEMENT_TOKEN_TTL: Duration = Duration::from_secs(600);

/// Permission bits embedded under the `video` claim of an access token.
///
/// Field names follow the platform's camelCase claim layout so tokens can be verified by it.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct VideoGrants {
    pub room_join: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
    pub can_publish: bool,
    pub can_publish_data: bool,
    pub can_subscribe: bool,
    pub room_record: bool,
    pub room_admin: bool,
}

impl VideoGrants {
    /// Grants for a regular conference participant.
    pub fn participant(room: &RoomName) -> Self {
        Self {
            room_join: true,
            room: Some(room.to_string()),
            can_publish: true,
            can_publish_data: true,
            can_subscribe: true,
            room_record: true,
            room_admin: false,
        }
    }

    /// Grants for the recorder identity: subscribe only, with record and admin rights.
    pub fn recorder(room: &RoomName) -> Self {
        Self {
            room_join: true,
            room: Some(room.to_string()),
            can_publish: false,
            can_publish_data: false,
            can_subscribe: true,
            room_record: true,
            room_admin: true,
        }
    }

    /// Grants required to call the egress management API.
    pub fn egress_control() -> Self {
        Self {
            room_record: true,
            ..Default::default()
        }
    }
}

/// Custom claims carried by an access token, next to the registered JWT claims.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessTokenClaims {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub video: VideoGrants,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grants_use_camel_case_claims() {
        let grants = VideoGrants::participant(&RoomName::from("geome-hackathon"));
        let json = serde_json::to_value(&grants).expect("Should serialize");
        assert_eq!(json["roomJoin"], true);
        assert_eq!(json["room"], "geome-hackathon");
        assert_eq!(json["canPublishData"], true);
        assert_eq!(json["roomAdmin"], false);
    }

    #[test]
    fn recorder_cannot_publish() {
        let grants = VideoGrants::recorder(&RoomName::from("room1"));
        assert!(grants.room_join && grants.can_subscribe && grants.room_record && grants.room_admin);
        assert!(!grants.can_publish && !grants.can_publish_data);
    }

    #[test]
    fn egress_control_has_no_room() {
        let json = serde_json::to_value(VideoGrants::egress_control()).expect("Should serialize");
        assert!(json.get("room").is_none());
        assert_eq!(json["roomRecord"], true);
    }
}
