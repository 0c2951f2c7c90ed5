use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use tracing::{error, warn};

use crate::views;

/// Failures a handler cannot resolve inline. Form validation is not here:
/// actions answer those with a 400 and the re-rendered form.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Missing or invalid session. Resolved by sending the visitor to `location`.
    #[error("redirect to {0}")]
    Redirect(String),

    /// The session names a user that no longer exists. Carries the removal
    /// cookie so the stale session is cleared on the way to the login screen.
    #[error("session user no longer exists")]
    LoggedOut(Cookie<'static>),

    #[error("not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Redirect(location) => Redirect::to(&location).into_response(),
            AppError::LoggedOut(removal) => {
                warn!("Session refers to a deleted user, logging out");
                (CookieJar::new().add(removal), Redirect::to("/login")).into_response()
            }
            AppError::NotFound(message) => (
                StatusCode::NOT_FOUND,
                Html(views::error_page("Not found", &message)),
            )
                .into_response(),
            AppError::Internal(err) => {
                error!("Unhandled error: {:#}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Html(views::error_page(
                        "Something went wrong",
                        "Sorry, something unexpected happened. Please try again later.",
                    )),
                )
                    .into_response()
            }
        }
    }
}
