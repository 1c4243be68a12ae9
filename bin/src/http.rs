use std::net::SocketAddr;
use std::sync::Arc;

use meet_record::{EgressService, RecordingController};
use meet_secure::AccessTokenIssuer;
use poem::{listener::TcpListener, middleware::Cors, EndpointExt, Route, Server};
use poem_openapi::OpenApiService;

mod api_record;
mod api_token;

pub use api_record::RecordApis;
pub use api_token::{TokenApis, TokenServerCtx};

pub fn build_route<S, E>(token_ctx: TokenServerCtx<S>, recorder: Arc<RecordingController<E>>) -> Route
where
    S: 'static + AccessTokenIssuer + Send + Sync,
    E: 'static + EgressService,
{
    let token_service: OpenApiService<_, ()> = OpenApiService::new(api_token::TokenApis::<S>::new(), "Meet Token APIs", env!("CARGO_PKG_VERSION")).server("/api/");
    let token_ui = token_service.swagger_ui();
    let token_spec = token_service.spec();

    let record_service: OpenApiService<_, ()> = OpenApiService::new(api_record::RecordApis::new(recorder), "Meet Record APIs", env!("CARGO_PKG_VERSION")).server("/api/record/");
    let record_ui = record_service.swagger_ui();
    let record_spec = record_service.spec();

    Route::new()
        //token
        .nest("/api/", token_service.data(token_ctx))
        .nest("/api/ui", token_ui)
        .at("/api/spec", poem::endpoint::make_sync(move |_| token_spec.clone()))
        //record
        .nest("/api/record/", record_service)
        .nest("/api/record/ui", record_ui)
        .at("/api/record/spec", poem::endpoint::make_sync(move |_| record_spec.clone()))
}

pub async fn run_http_server<S, E>(port: u16, token_ctx: TokenServerCtx<S>, recorder: Arc<RecordingController<E>>) -> Result<(), Box<dyn std::error::Error>>
where
    S: 'static + AccessTokenIssuer + Send + Sync,
    E: 'static + EgressService,
{
    let route = build_route(token_ctx, recorder).with(Cors::new());
    log::info!("[HttpServer] listening on port {port}");
    Server::new(TcpListener::bind(SocketAddr::new([0, 0, 0, 0].into(), port))).run(route).await?;
    Ok(())
}
