use std::sync::Arc;

use clap::{Parser, ValueEnum};
use geome_meet::{run_http_server, TokenServerCtx};
use meet_protocol::egress::S3Upload;
use meet_record::{management_origin, storage::RecordingStorage, RecordOutput, RecordingController, TwirpEgressClient};
use meet_secure::jwt::AccessTokenJwt;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum RecordOutputKind {
    /// Upload recordings to an S3 compatible bucket.
    S3,
    /// Keep recordings on the egress host disk.
    File,
}

/// Geome Meet: access tokens and room recording control for the media platform.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// HTTP port for incoming requests.
    #[arg(env, long, default_value_t = 3000)]
    http_port: u16,

    /// Media platform url, as given to clients (wss://...).
    #[arg(env, long)]
    livekit_url: String,

    /// Media platform API key.
    #[arg(env, long)]
    livekit_api_key: String,

    /// Media platform API secret.
    #[arg(env, long)]
    livekit_api_secret: String,

    /// Shared password required to get a participant token.
    #[arg(env, long, default_value = "goodvibesonly")]
    join_password: String,

    /// Shared password required to get a recorder token.
    #[arg(env, long, default_value = "johnjohn")]
    recorder_password: String,

    /// Local folder for recording metadata files.
    #[arg(env, long, default_value = "recordings")]
    recordings_dir: String,

    /// Where the platform writes recordings.
    #[arg(env, long, value_enum, default_value_t = RecordOutputKind::S3)]
    record_output: RecordOutputKind,

    /// S3 endpoint for recording uploads.
    #[arg(env, long, default_value = "http://localhost:9000")]
    s3_endpoint: String,

    /// S3 access key.
    #[arg(env, long, default_value = "minioadmin")]
    s3_access_key: String,

    /// S3 secret key.
    #[arg(env, long, default_value = "minioadmin")]
    s3_secret: String,

    /// S3 region.
    #[arg(env, long, default_value = "us-east-1")]
    s3_region: String,

    /// S3 bucket.
    #[arg(env, long, default_value = "recordings")]
    s3_bucket: String,

    /// Disable Sentry error reporting.
    #[arg(env, long)]
    sentry_disable: bool,

    /// Sentry error reporting endpoint.
    #[arg(env, long)]
    sentry_endpoint: Option<String>,
}

impl Args {
    fn record_output(&self) -> RecordOutput {
        match self.record_output {
            RecordOutputKind::S3 => RecordOutput::S3(S3Upload {
                access_key: self.s3_access_key.clone(),
                secret: self.s3_secret.clone(),
                region: self.s3_region.clone(),
                endpoint: self.s3_endpoint.clone(),
                bucket: self.s3_bucket.clone(),
                force_path_style: true,
            }),
            RecordOutputKind::File => RecordOutput::File { dir: self.recordings_dir.clone() },
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    if std::env::var_os("RUST_LOG").is_none() {
        std::env::set_var("RUST_LOG", "info");
    }
    if std::env::var_os("RUST_BACKTRACE").is_none() {
        std::env::set_var("RUST_BACKTRACE", "1");
    }
    let args: Args = Args::parse();
    tracing_subscriber::registry().with(fmt::layer()).with(EnvFilter::from_default_env()).init();

    let _sentry_guard = match (&args.sentry_endpoint, args.sentry_disable) {
        (Some(endpoint), false) => Some(sentry::init((
            endpoint.as_str(),
            sentry::ClientOptions {
                release: sentry::release_name!(),
                ..Default::default()
            },
        ))),
        _ => None,
    };

    let origin = management_origin(&args.livekit_url).map_err(|e| format!("invalid livekit url {}: {e}", args.livekit_url))?;
    log::info!("Media platform {}, management origin {origin}, record output {:?}", args.livekit_url, args.record_output);

    let secure = Arc::new(AccessTokenJwt::new(&args.livekit_api_key, &args.livekit_api_secret).map_err(|e| format!("invalid livekit api secret: {e}"))?);
    let egress = Arc::new(TwirpEgressClient::new(&origin, secure.clone()));
    let recorder = Arc::new(RecordingController::new(egress, RecordingStorage::new(&args.recordings_dir), args.record_output()));
    let token_ctx = TokenServerCtx::new(secure, &args.join_password, &args.recorder_password);

    run_http_server(args.http_port, token_ctx, recorder).await
}
