use std::{marker::PhantomData, sync::Arc};

use meet_protocol::{
    room::{ParticipantIdentity, RoomName},
    tokens::{AccessTokenClaims, VideoGrants, ACCESS_TOKEN_TTL, ACCESS_TOKEN_TTL_LABEL},
};
use meet_secure::{AccessTokenIssuer, SharedPassword};
use poem::web::Data;
use poem_openapi::{payload::Json, ApiResponse, Object, OpenApi};

pub struct TokenServerCtx<S>
where
    S: AccessTokenIssuer + Send + Sync,
{
    pub(crate) secure: Arc<S>,
    pub(crate) join_password: SharedPassword,
    pub(crate) recorder_password: SharedPassword,
}

impl<S: AccessTokenIssuer + Send + Sync> TokenServerCtx<S> {
    pub fn new(secure: Arc<S>, join_password: &str, recorder_password: &str) -> Self {
        Self {
            secure,
            join_password: SharedPassword::new(join_password),
            recorder_password: SharedPassword::new(recorder_password),
        }
    }
}

impl<S: AccessTokenIssuer + Send + Sync> Clone for TokenServerCtx<S> {
    fn clone(&self) -> Self {
        Self {
            secure: self.secure.clone(),
            join_password: self.join_password.clone(),
            recorder_password: self.recorder_password.clone(),
        }
    }
}

#[derive(Object)]
#[oai(rename_all = "camelCase")]
struct GenerateTokenBody {
    password: Option<String>,
    participant_name: Option<String>,
    room_name: Option<String>,
}

#[derive(Object)]
#[oai(rename_all = "camelCase")]
struct ParticipantToken {
    token: String,
    participant_name: String,
    room_name: String,
    expires_in: String,
}

#[derive(Object)]
#[oai(rename_all = "camelCase")]
struct RecordingTokenBody {
    password: Option<String>,
    room_name: Option<String>,
}

#[derive(Object)]
#[oai(rename_all = "camelCase")]
struct RecorderToken {
    token: String,
    room_name: String,
    message: String,
}

#[derive(Object)]
struct ErrorBody {
    error: String,
}

impl ErrorBody {
    fn json(error: &str) -> Json<ErrorBody> {
        Json(ErrorBody { error: error.to_string() })
    }
}

#[derive(ApiResponse)]
enum ParticipantTokenResponse {
    #[oai(status = 200)]
    Ok(Json<ParticipantToken>),
    #[oai(status = 400)]
    BadRequest(Json<ErrorBody>),
    #[oai(status = 401)]
    Unauthorized(Json<ErrorBody>),
    #[oai(status = 500)]
    InternalError(Json<ErrorBody>),
}

#[derive(ApiResponse)]
enum RecorderTokenResponse {
    #[oai(status = 200)]
    Ok(Json<RecorderToken>),
    #[oai(status = 400)]
    BadRequest(Json<ErrorBody>),
    #[oai(status = 401)]
    Unauthorized(Json<ErrorBody>),
    #[oai(status = 500)]
    InternalError(Json<ErrorBody>),
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

pub struct TokenApis<S: AccessTokenIssuer + Send + Sync>(PhantomData<S>);

impl<S: AccessTokenIssuer + Send + Sync> TokenApis<S> {
    pub fn new() -> Self {
        Self(Default::default())
    }
}

#[OpenApi]
impl<S: 'static + AccessTokenIssuer + Send + Sync> TokenApis<S> {
    /// create a 24h access token for a conference participant
    #[oai(path = "/generate-token", method = "post")]
    async fn generate_token(&self, Data(ctx): Data<&TokenServerCtx<S>>, body: Json<GenerateTokenBody>) -> ParticipantTokenResponse {
        let body = body.0;
        if !ctx.join_password.validate(body.password.as_deref().unwrap_or_default()) {
            log::warn!("[TokenApis] generate token rejected: invalid password");
            return ParticipantTokenResponse::Unauthorized(ErrorBody::json("Invalid password"));
        }
        let (participant_name, room_name) = match (non_empty(body.participant_name), non_empty(body.room_name)) {
            (Some(participant), Some(room)) => (participant, room),
            _ => return ParticipantTokenResponse::BadRequest(ErrorBody::json("Participant name and room name are required")),
        };

        let room = RoomName::from(room_name.as_str());
        let claims = AccessTokenClaims {
            name: None,
            video: VideoGrants::participant(&room),
        };
        match ctx.secure.issue_token(&ParticipantIdentity::from(participant_name.as_str()), claims, ACCESS_TOKEN_TTL) {
            Ok(token) => {
                log::info!("[TokenApis] issued token for {participant_name} in room {room}");
                ParticipantTokenResponse::Ok(Json(ParticipantToken {
                    token,
                    participant_name,
                    room_name,
                    expires_in: ACCESS_TOKEN_TTL_LABEL.to_string(),
                }))
            }
            Err(e) => {
                log::error!("[TokenApis] generate token error {e}");
                ParticipantTokenResponse::InternalError(ErrorBody::json("Failed to generate token"))
            }
        }
    }

    /// create a recorder token, guarded by the recording password
    #[oai(path = "/recording/start", method = "post")]
    async fn recording_token(&self, Data(ctx): Data<&TokenServerCtx<S>>, body: Json<RecordingTokenBody>) -> RecorderTokenResponse {
        let body = body.0;
        if !ctx.recorder_password.validate(body.password.as_deref().unwrap_or_default()) {
            log::warn!("[TokenApis] recording token rejected: invalid password");
            return RecorderTokenResponse::Unauthorized(ErrorBody::json("Invalid recording password"));
        }
        let Some(room_name) = non_empty(body.room_name) else {
            return RecorderTokenResponse::BadRequest(ErrorBody::json("Room name is required"));
        };

        let room = RoomName::from(room_name.as_str());
        let claims = AccessTokenClaims {
            name: None,
            video: VideoGrants::recorder(&room),
        };
        match ctx.secure.issue_token(&ParticipantIdentity::recorder(), claims, ACCESS_TOKEN_TTL) {
            Ok(token) => {
                log::info!("[TokenApis] issued recorder token for room {room}");
                RecorderTokenResponse::Ok(Json(RecorderToken {
                    token,
                    room_name,
                    message: "Recording token generated successfully".to_string(),
                }))
            }
            Err(e) => {
                log::error!("[TokenApis] recording token error {e}");
                RecorderTokenResponse::InternalError(ErrorBody::json("Failed to generate recording token"))
            }
        }
    }
}
