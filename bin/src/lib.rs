mod http;

pub use http::{build_route, run_http_server, RecordApis, TokenApis, TokenServerCtx};
