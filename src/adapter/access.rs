//! HTTP access-log capture for axum services.
//!
//! Renders one Combined-Log-Format line per request and feeds it to the
//! router's `access` path, which passes pre-formatted lines through
//! verbatim. Wire it as a layer:
//!
//! ```ignore
//! let app = axum::Router::new()
//!     .route("/", get(handler))
//!     .layer(axum::middleware::from_fn_with_state(logger, access_log));
//! ```

use crate::logger::Logger;
use axum::extract::{Request, State};
use axum::http::header::{CONTENT_LENGTH, REFERER, USER_AGENT};
use axum::middleware::Next;
use axum::response::Response;
use chrono::Utc;
use std::sync::Arc;

pub async fn access_log(
    State(logger): State<Arc<Logger>>,
    request: Request,
    next: Next,
) -> Response {
    let remote = header_or_dash(request.headers().get("x-forwarded-for"));
    let referer = header_or_dash(request.headers().get(REFERER));
    let user_agent = header_or_dash(request.headers().get(USER_AGENT));
    let method = request.method().clone();
    let uri = request.uri().clone();
    let version = format!("{:?}", request.version());

    let response = next.run(request).await;

    let bytes = header_or_dash(response.headers().get(CONTENT_LENGTH));
    let line = format!(
        "{remote} - - [{}] \"{method} {uri} {version}\" {} {bytes} \"{referer}\" \"{user_agent}\"",
        Utc::now().format("%d/%b/%Y:%H:%M:%S %z"),
        response.status().as_u16(),
    );
    logger.access(&line);

    response
}

fn header_or_dash(value: Option<&axum::http::HeaderValue>) -> String {
    value
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.is_empty())
        .unwrap_or("-")
        .to_owned()
}
