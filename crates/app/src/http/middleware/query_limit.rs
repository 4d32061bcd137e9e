use axum::extract::Request;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::http::ErrorBody;

const MAX_QUERY_LEN: usize = 1024;

pub async fn enforce_query_length(req: Request, next: Next) -> Response {
    if is_query_too_long(req.uri().query()) {
        let body = ErrorBody {
            error: format!("query string too long (max {MAX_QUERY_LEN} bytes)"),
        };
        return (StatusCode::URI_TOO_LONG, Json(body)).into_response();
    }
    next.run(req).await
}

fn is_query_too_long(query: Option<&str>) -> bool {
    query.is_some_and(|value| value.len() > MAX_QUERY_LEN)
}
