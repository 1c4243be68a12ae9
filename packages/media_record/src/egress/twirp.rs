use std::sync::Arc;

use meet_protocol::{
    egress::{EgressId, EgressInfo, EncodedFileOutput, ListEgressRequest, ListEgressResponse, RoomCompositeEgressRequest, StopEgressRequest},
    room::{ParticipantIdentity, RoomName},
    tokens::{AccessTokenClaims, VideoGrants, MANAGEMENT_TOKEN_TTL},
};
use meet_secure::AccessTokenIssuer;
use reqwest::Url;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use super::{EgressError, EgressService};

const EGRESS_SERVICE_PREFIX: &str = "/twirp/livekit.Egress";

/// Converts the platform signaling url (`wss://...`) into the origin serving its management API.
pub fn management_origin(url: &str) -> Result<String, &'static str> {
    let url = Url::parse(url).map_err(|_| "WRONG_URL")?;
    let scheme = match url.scheme() {
        "wss" | "https" => "https",
        "ws" | "http" => "http",
        _ => return Err("WRONG_SCHEME"),
    };
    let host = url.host_str().ok_or("MISSING_HOST")?;
    Ok(match url.port() {
        Some(port) => format!("{scheme}://{host}:{port}"),
        None => format!("{scheme}://{host}"),
    })
}

#[derive(Deserialize)]
struct TwirpErrorBody {
    #[serde(default)]
    msg: String,
}

/// Egress management client speaking the platform's Twirp JSON protocol.
pub struct TwirpEgressClient<S> {
    origin: String,
    client: reqwest::Client,
    signer: Arc<S>,
}

impl<S: AccessTokenIssuer> TwirpEgressClient<S> {
    pub fn new(origin: &str, signer: Arc<S>) -> Self {
        log::info!("[TwirpEgressClient] new origin: {}", origin);
        Self {
            origin: origin.trim_end_matches('/').to_owned(),
            client: reqwest::Client::new(),
            signer,
        }
    }

    async fn call<Req: Serialize, Res: DeserializeOwned>(&self, method: &str, req: &Req) -> Result<Res, EgressError> {
        let claims = AccessTokenClaims {
            name: None,
            video: VideoGrants::egress_control(),
        };
        let token = self.signer.issue_token(&ParticipantIdentity::from(""), claims, MANAGEMENT_TOKEN_TTL)?;
        let url = format!("{}{}/{}", self.origin, EGRESS_SERVICE_PREFIX, method);
        let res = self.client.post(&url).bearer_auth(token).json(req).send().await?;
        let status = res.status();
        if status.is_success() {
            log::debug!("[TwirpEgressClient] {method} response {status}");
            Ok(res.json().await?)
        } else {
            let body = res.text().await.unwrap_or_default();
            let message = match serde_json::from_str::<TwirpErrorBody>(&body) {
                Ok(err) if !err.msg.is_empty() => err.msg,
                _ if !body.is_empty() => body,
                _ => format!("request error with status: {status}"),
            };
            log::warn!("[TwirpEgressClient] {method} error {status} {message}");
            Err(EgressError::Upstream { status: status.as_u16(), message })
        }
    }
}

#[async_trait::async_trait]
impl<S: AccessTokenIssuer + Send + Sync> EgressService for TwirpEgressClient<S> {
    async fn list_egress(&self, room: &RoomName) -> Result<Vec<EgressInfo>, EgressError> {
        let req = ListEgressRequest {
            room_name: Some(room.to_string()),
            ..Default::default()
        };
        let res: ListEgressResponse = self.call("ListEgress", &req).await?;
        Ok(res.items)
    }

    async fn start_room_composite(&self, room: &RoomName, layout: &str, output: EncodedFileOutput) -> Result<EgressInfo, EgressError> {
        let req = RoomCompositeEgressRequest {
            room_name: room.to_string(),
            layout: layout.to_owned(),
            audio_only: false,
            video_only: false,
            file_outputs: vec![output],
        };
        self.call("StartRoomCompositeEgress", &req).await
    }

    async fn stop_egress(&self, egress_id: &EgressId) -> Result<EgressInfo, EgressError> {
        self.call("StopEgress", &StopEgressRequest { egress_id: egress_id.clone() }).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use httpmock::{Method::POST, MockServer};
    use meet_protocol::egress::{EgressStatus, EncodedFileOutput};
    use meet_secure::{jwt::AccessTokenJwt, AccessTokenVerifier};
    use serde_json::json;

    use super::*;

    fn test_jwt() -> AccessTokenJwt {
        AccessTokenJwt::new("APIkey", "twirp-test-secret-key").expect("Should build signer")
    }

    fn client(server: &MockServer) -> TwirpEgressClient<AccessTokenJwt> {
        TwirpEgressClient::new(&server.base_url(), Arc::new(test_jwt()))
    }

    #[test]
    fn origin_from_signal_url() {
        assert_eq!(management_origin("wss://demo.livekit.cloud"), Ok("https://demo.livekit.cloud".to_string()));
        assert_eq!(management_origin("ws://localhost:7880/rtc"), Ok("http://localhost:7880".to_string()));
        assert_eq!(management_origin("https://demo.livekit.cloud/"), Ok("https://demo.livekit.cloud".to_string()));
        assert_eq!(management_origin("ftp://demo.livekit.cloud"), Err("WRONG_SCHEME"));
        assert_eq!(management_origin("not a url"), Err("WRONG_URL"));
    }

    #[tokio::test]
    async fn list_egress_ok() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/twirp/livekit.Egress/ListEgress").header_exists("authorization").json_body_partial(r#"{"room_name":"room1"}"#);
            then.status(200).header("content-type", "application/json").json_body(json!({
                "items": [
                    {"egress_id": "EG_1", "room_name": "room1", "status": "EGRESS_ACTIVE"},
                    {"egress_id": "EG_2", "room_name": "room1", "status": "EGRESS_COMPLETE"},
                ]
            }));
        });

        let items = client(&server).list_egress(&RoomName::from("room1")).await.expect("Should list ok");
        mock.assert();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].egress_id, EgressId::from("EG_1"));
        assert_eq!(items[0].status, EgressStatus::Active);
        assert_eq!(items[1].status, EgressStatus::Complete);
    }

    #[tokio::test]
    async fn list_egress_empty_response() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/twirp/livekit.Egress/ListEgress");
            then.status(200).header("content-type", "application/json").json_body(json!({}));
        });

        let items = client(&server).list_egress(&RoomName::from("room1")).await.expect("Should list ok");
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn management_token_is_verifiable() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/twirp/livekit.Egress/ListEgress");
            then.status(200).header("content-type", "application/json").json_body(json!({"items": []}));
        });

        let jwt = test_jwt();
        let claims = AccessTokenClaims {
            name: None,
            video: VideoGrants::egress_control(),
        };
        let token = jwt.issue_token(&ParticipantIdentity::from(""), claims, MANAGEMENT_TOKEN_TTL).expect("Should sign");
        let verified = jwt.verify_token(&token).expect("Should verify");
        assert!(verified.claims.video.room_record);
        assert!(!verified.claims.video.room_join);

        client(&server).list_egress(&RoomName::from("room1")).await.expect("Should list ok");
    }

    #[tokio::test]
    async fn start_room_composite_sends_layout_and_output() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/twirp/livekit.Egress/StartRoomCompositeEgress")
                .json_body_partial(r#"{"room_name":"room1","layout":"speaker","file_outputs":[{"filepath":"a.mp4"}]}"#);
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({"egress_id": "EG_9", "room_name": "room1", "status": "EGRESS_STARTING"}));
        });

        let output = EncodedFileOutput { filepath: "a.mp4".to_string(), s3: None };
        let info = client(&server).start_room_composite(&RoomName::from("room1"), "speaker", output).await.expect("Should start ok");
        mock.assert();
        assert_eq!(info.egress_id, EgressId::from("EG_9"));
        assert!(info.is_active());
    }

    #[tokio::test]
    async fn upstream_message_passthrough() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/twirp/livekit.Egress/StopEgress");
            then.status(412).header("content-type", "application/json").json_body(json!({"code": "failed_precondition", "msg": "egress with status EGRESS_COMPLETE cannot be stopped"}));
        });

        let err = client(&server).stop_egress(&EgressId::from("EG_1")).await.expect_err("Should error");
        match err {
            EgressError::Upstream { status, message } => {
                assert_eq!(status, 412);
                assert_eq!(message, "egress with status EGRESS_COMPLETE cannot be stopped");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[tokio::test]
    async fn upstream_plain_body_passthrough() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/twirp/livekit.Egress/ListEgress");
            then.status(502).body("FAKE_ERROR");
        });

        let err = client(&server).list_egress(&RoomName::from("room1")).await.expect_err("Should error");
        assert_eq!(err.to_string(), "FAKE_ERROR");
    }
}
