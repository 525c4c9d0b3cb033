pub mod pages;

use axum::{
    Router,
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::views::render_not_found;

/// Attachments are posted inline with the form.
const MAX_SUBMISSION_BYTES: usize = 25 * 1024 * 1024;

pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(pages::router())
        .fallback(not_found)
        .with_state(state)
        .layer(DefaultBodyLimit::max(MAX_SUBMISSION_BYTES))
        .layer(TraceLayer::new_for_http())
}

/// Catch-all 404 page
async fn not_found(State(state): State<AppState>) -> Result<Response, AppError> {
    let html = render_not_found(&state.templates)?;
    Ok((StatusCode::NOT_FOUND, Html(html)).into_response())
}

/// Convert anyhow errors to HTTP responses
pub struct AppError {
    status: StatusCode,
    error: anyhow::Error,
}

impl AppError {
    pub fn bad_request(error: impl Into<anyhow::Error>) -> Self {
        AppError {
            status: StatusCode::BAD_REQUEST,
            error: error.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(error = %self.error, "request failed");
        }
        (self.status, format!("{:#}", self.error)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        AppError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            error: err.into(),
        }
    }
}
