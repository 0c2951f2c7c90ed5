use axum::{Router, routing::get};

use crate::auth::{self, AppState};
use crate::jokes;

/// All page routes. Static assets and tracing are layered on by the binary.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(jokes::index))
        .route("/jokes", get(jokes::random))
        .route("/jokes/new", get(jokes::new_form).post(jokes::create))
        .route("/jokes/{joke_id}", get(jokes::detail))
        .route("/login", get(auth::login_page).post(auth::login_action))
        .route("/logout", get(auth::logout_page).post(auth::logout_action))
        .with_state(state)
}
