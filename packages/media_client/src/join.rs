use meet_protocol::api::GenerateTokenReq;
use rand::{distributions::Alphanumeric, Rng};
use reqwest::Url;

use crate::api::{ClientError, MeetApiClient};

/// Path of the conferencing view inside the web app.
pub const CONFERENCE_PATH: &str = "/custom/";
/// Length of the generated default E2EE passphrase.
pub const PASSPHRASE_LEN: usize = 64;

pub fn random_passphrase(len: usize) -> String {
    rand::thread_rng().sample_iter(&Alphanumeric).take(len).map(char::from).collect()
}

/// Everything the conferencing view needs, carried in its url. The passphrase lives in the
/// fragment so it never reaches a server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinLink {
    pub livekit_url: String,
    pub token: String,
    pub passphrase: Option<String>,
}

impl JoinLink {
    pub fn to_path(&self) -> String {
        let mut path = format!("{CONFERENCE_PATH}?liveKitUrl={}&token={}", urlencoding::encode(&self.livekit_url), urlencoding::encode(&self.token));
        if let Some(passphrase) = &self.passphrase {
            path.push('#');
            path.push_str(&urlencoding::encode(passphrase));
        }
        path
    }

    pub fn parse(link: &str) -> Result<Self, &'static str> {
        let base = Url::parse("http://localhost").map_err(|_| "WRONG_BASE")?;
        let url = base.join(link).map_err(|_| "WRONG_URL")?;
        let mut livekit_url = None;
        let mut token = None;
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "liveKitUrl" => livekit_url = Some(value.to_string()),
                "token" => token = Some(value.to_string()),
                _ => {}
            }
        }
        let passphrase = match url.fragment() {
            Some(fragment) if !fragment.is_empty() => Some(urlencoding::decode(fragment).map_err(|_| "WRONG_PASSPHRASE")?.to_string()),
            _ => None,
        };
        Ok(Self {
            livekit_url: livekit_url.ok_or("MISSING_LIVEKIT_URL")?,
            token: token.ok_or("MISSING_TOKEN")?,
            passphrase,
        })
    }
}

/// The join form: name and password in, conferencing link out.
#[derive(Debug, Clone)]
pub struct ConnectionForm {
    pub participant_name: String,
    pub password: String,
    pub room_name: String,
    pub e2ee: bool,
    pub passphrase: String,
}

impl ConnectionForm {
    pub fn new(room_name: &str) -> Self {
        Self {
            participant_name: String::new(),
            password: String::new(),
            room_name: room_name.to_owned(),
            e2ee: false,
            passphrase: random_passphrase(PASSPHRASE_LEN),
        }
    }

    /// Requests a token and builds the link to navigate to. Errors carry the text to show inline.
    pub async fn submit(&self, api: &MeetApiClient, livekit_url: &str) -> Result<JoinLink, ClientError> {
        let req = GenerateTokenReq {
            password: Some(self.password.clone()),
            participant_name: Some(self.participant_name.clone()),
            room_name: Some(self.room_name.clone()),
        };
        let res = api.generate_token(&req).await?;
        log::info!("[ConnectionForm] {} got token for room {}", res.participant_name, res.room_name);
        Ok(JoinLink {
            livekit_url: livekit_url.to_owned(),
            token: res.token,
            passphrase: self.e2ee.then(|| self.passphrase.clone()),
        })
    }
}
