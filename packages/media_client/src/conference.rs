//! Room bootstrap for the conferencing view.
//!
//! The platform client SDK owns transport, simulcast and encryption. This module only decides
//! which options it gets and in which order the session is brought up.

use std::{str::FromStr, sync::Arc, time::Duration};

use crate::{join::JoinLink, notify::UserNotifier};

/// Delay between joining and the automatic screen share.
pub const SCREEN_SHARE_DELAY: Duration = Duration::from_secs(2);
pub const SCREEN_SHARE_REQUIRED_ALERT: &str = "Screen sharing is required to join this meeting. Please allow screen sharing when prompted.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoPreset {
    pub width: u32,
    pub height: u32,
    pub max_bitrate: u32,
    pub max_framerate: u32,
}

impl VideoPreset {
    pub const H216: VideoPreset = VideoPreset::new(384, 216, 180_000, 15);
    pub const H540: VideoPreset = VideoPreset::new(960, 540, 800_000, 25);
    pub const H1080: VideoPreset = VideoPreset::new(1920, 1080, 3_000_000, 30);

    const fn new(width: u32, height: u32, max_bitrate: u32, max_framerate: u32) -> Self {
        Self {
            width,
            height,
            max_bitrate,
            max_framerate,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoCodec {
    Vp8,
    H264,
    Vp9,
    Av1,
}

impl FromStr for VideoCodec {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "vp8" => Ok(Self::Vp8),
            "h264" => Ok(Self::H264),
            "vp9" => Ok(Self::Vp9),
            "av1" => Ok(Self::Av1),
            _ => Err("UNKNOWN_CODEC"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelDensity {
    Screen,
    Standard,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishDefaults {
    pub video_simulcast_layers: Vec<VideoPreset>,
    /// Redundant audio encoding; it cannot be combined with E2EE.
    pub red: bool,
    pub video_codec: Option<VideoCodec>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct E2eeOptions {
    pub passphrase: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomOptions {
    pub publish_defaults: PublishDefaults,
    pub adaptive_stream: PixelDensity,
    pub dynacast: bool,
    pub e2ee: Option<E2eeOptions>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomConnectOptions {
    pub auto_subscribe: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplaySurface {
    Monitor,
    Window,
    Browser,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenCaptureOptions {
    pub display_surface: DisplaySurface,
    pub audio: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackPublishOptions {
    pub video_simulcast_layers: Vec<VideoPreset>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackKind {
    Audio,
    Video,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalTrack {
    pub sid: String,
    pub kind: TrackKind,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct SessionError {
    pub message: String,
}

impl From<&str> for SessionError {
    fn from(value: &str) -> Self {
        Self { message: value.to_owned() }
    }
}

/// Room session of the platform client SDK, owned by a single conferencing view.
#[async_trait::async_trait]
pub trait RoomSession: Send + Sync {
    async fn set_e2ee_key(&self, passphrase: &str) -> Result<(), SessionError>;
    async fn set_e2ee_enabled(&self, enabled: bool) -> Result<(), SessionError>;
    async fn connect(&self, url: &str, token: &str, options: &RoomConnectOptions) -> Result<(), SessionError>;
    async fn enable_camera_and_microphone(&self) -> Result<(), SessionError>;
    async fn create_screen_tracks(&self, options: &ScreenCaptureOptions) -> Result<Vec<LocalTrack>, SessionError>;
    async fn publish_track(&self, track: LocalTrack, options: &TrackPublishOptions) -> Result<(), SessionError>;
}

#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    #[error("e2ee setup failed: {0}")]
    E2ee(SessionError),
    #[error("connect failed: {0}")]
    Connect(SessionError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinOutcome {
    pub e2ee: bool,
    pub camera_and_microphone: bool,
    pub screen_tracks: usize,
}

/// Configuration of one conferencing view.
#[derive(Debug, Clone)]
pub struct ConferenceView {
    pub livekit_url: String,
    pub token: String,
    pub codec: Option<VideoCodec>,
    pub e2ee_passphrase: Option<String>,
    pub screen_share_delay: Duration,
}

impl ConferenceView {
    pub fn from_link(link: JoinLink, codec: Option<VideoCodec>) -> Self {
        Self {
            livekit_url: link.livekit_url,
            token: link.token,
            codec,
            e2ee_passphrase: link.passphrase.filter(|p| !p.is_empty()),
            screen_share_delay: SCREEN_SHARE_DELAY,
        }
    }

    pub fn e2ee_enabled(&self) -> bool {
        self.e2ee_passphrase.is_some()
    }

    pub fn room_options(&self) -> RoomOptions {
        RoomOptions {
            publish_defaults: PublishDefaults {
                video_simulcast_layers: vec![VideoPreset::H540, VideoPreset::H216],
                red: !self.e2ee_enabled(),
                video_codec: self.codec,
            },
            adaptive_stream: PixelDensity::Screen,
            dynacast: true,
            e2ee: self.e2ee_passphrase.as_ref().map(|passphrase| E2eeOptions { passphrase: passphrase.clone() }),
        }
    }

    pub fn connect_options(&self) -> RoomConnectOptions {
        RoomConnectOptions { auto_subscribe: true }
    }

    /// Brings the session up: encryption, connect, camera and microphone, then the mandatory screen share.
    pub async fn join<S: RoomSession, N: UserNotifier>(&self, session: Arc<S>, notifier: Arc<N>) -> Result<JoinOutcome, BootstrapError> {
        if let Some(passphrase) = &self.e2ee_passphrase {
            session.set_e2ee_key(passphrase).await.map_err(BootstrapError::E2ee)?;
            session.set_e2ee_enabled(true).await.map_err(BootstrapError::E2ee)?;
            log::info!("[ConferenceView] e2ee enabled");
        }

        session.connect(&self.livekit_url, &self.token, &self.connect_options()).await.map_err(|e| {
            log::error!("[ConferenceView] connect {} error {e}", self.livekit_url);
            BootstrapError::Connect(e)
        })?;

        let camera_and_microphone = match session.enable_camera_and_microphone().await {
            Ok(()) => true,
            Err(e) => {
                log::error!("[ConferenceView] enable camera and microphone error {e}");
                false
            }
        };

        tokio::time::sleep(self.screen_share_delay).await;
        let screen_tracks = match publish_screen_share(session.as_ref()).await {
            Ok(count) => {
                log::info!("[ConferenceView] screen sharing started automatically with {count} tracks");
                count
            }
            Err(e) => {
                log::error!("[ConferenceView] failed to start screen sharing {e}");
                notifier.alert(SCREEN_SHARE_REQUIRED_ALERT);
                0
            }
        };

        Ok(JoinOutcome {
            e2ee: self.e2ee_enabled(),
            camera_and_microphone,
            screen_tracks,
        })
    }
}

async fn publish_screen_share<S: RoomSession>(session: &S) -> Result<usize, SessionError> {
    let capture = ScreenCaptureOptions {
        display_surface: DisplaySurface::Monitor,
        audio: true,
    };
    let publish = TrackPublishOptions {
        video_simulcast_layers: vec![VideoPreset::H540, VideoPreset::H1080],
    };
    let tracks = session.create_screen_tracks(&capture).await?;
    let count = tracks.len();
    for track in tracks {
        session.publish_track(track, &publish).await?;
    }
    Ok(count)
}
