use std::sync::Arc;

use axum::{
    Form,
    extract::{Query, State, rejection::FormRejection},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use tracing::{debug, error, info};
use uuid::Uuid;

use jokes_crypto::password::{hash_password, verify_password};
use jokes_db::Database;
use jokes_types::api::{
    LoginActionData, LoginFieldErrors, LoginFields, LoginForm, LoginType, RedirectQuery,
};

use crate::error::AppError;
use crate::session::SessionStore;
use crate::views;

pub const DEFAULT_REDIRECT: &str = "/jokes";

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Arc<Database>,
    pub sessions: SessionStore,
}

/// Run a blocking store call off the async runtime.
pub async fn with_db<F, T>(db: &Arc<Database>, f: F) -> Result<T, AppError>
where
    F: FnOnce(&Database) -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let db = db.clone();
    tokio::task::spawn_blocking(move || f(&db))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            anyhow::anyhow!("blocking task failed: {}", e)
        })?
        .map_err(AppError::Internal)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggedInUser {
    pub id: String,
    pub username: String,
}

/// Check a username/password pair. Unknown users and wrong passwords both
/// come back as `None`.
pub async fn login(
    db: &Arc<Database>,
    username: &str,
    password: &str,
) -> Result<Option<LoggedInUser>, AppError> {
    let username = username.to_string();
    let password = password.to_string();

    with_db(db, move |db| {
        let Some(user) = db.get_user_by_username(&username)? else {
            return Ok(None);
        };

        if !verify_password(&password, &user.password_hash) {
            return Ok(None);
        }

        Ok(Some(LoggedInUser {
            id: user.id,
            username: user.username,
        }))
    })
    .await
}

/// Create a user. Returns `None` when the username is already taken.
pub async fn register(
    db: &Arc<Database>,
    username: &str,
    password: &str,
) -> Result<Option<LoggedInUser>, AppError> {
    let username = username.to_string();
    let password = password.to_string();

    with_db(db, move |db| {
        if db.get_user_by_username(&username)?.is_some() {
            return Ok(None);
        }

        let password_hash = hash_password(&password)?;
        let id = Uuid::new_v4().to_string();
        // A concurrent registration can still take the name after the check above.
        if !db.create_user(&id, &username, &password_hash)? {
            return Ok(None);
        }

        info!("Registered user '{}'", username);
        Ok(Some(LoggedInUser { id, username }))
    })
    .await
}

pub fn validate_username(username: &str) -> Option<String> {
    (username.chars().count() < 3).then(|| "Usernames must be at least 3 characters long".to_string())
}

pub fn validate_password(password: &str) -> Option<String> {
    (password.chars().count() < 6).then(|| "Passwords must be at least 6 characters long".to_string())
}

/// Only same-site absolute paths are followed after login.
pub fn validate_redirect(redirect_to: Option<&str>) -> &str {
    match redirect_to {
        Some(url)
            if url.starts_with('/')
                && !url.starts_with("//")
                && !url.contains('\\')
                && !url.chars().any(char::is_control) =>
        {
            url
        }
        _ => DEFAULT_REDIRECT,
    }
}

pub async fn login_page(Query(query): Query<RedirectQuery>) -> Html<String> {
    let redirect_to = validate_redirect(query.redirect_to.as_deref());
    Html(views::login_page(&LoginActionData::default(), redirect_to))
}

pub async fn login_action(
    State(state): State<AppState>,
    jar: CookieJar,
    form: Result<Form<LoginForm>, FormRejection>,
) -> Result<Response, AppError> {
    let form = match form {
        Ok(Form(form)) => form,
        Err(rejection) => {
            debug!("Malformed login form: {}", rejection);
            return Ok(bad_request(
                LoginActionData {
                    form_error: Some("Form not submitted correctly.".to_string()),
                    ..Default::default()
                },
                DEFAULT_REDIRECT,
            ));
        }
    };

    let redirect_to = validate_redirect(form.redirect_to.as_deref()).to_string();

    let (Some(login_type), Some(username), Some(password)) =
        (form.login_type, form.username, form.password)
    else {
        return Ok(bad_request(
            LoginActionData {
                form_error: Some("Form not submitted correctly.".to_string()),
                ..Default::default()
            },
            &redirect_to,
        ));
    };

    let fields = LoginFields {
        login_type: login_type.clone(),
        username: username.clone(),
    };
    let field_errors = LoginFieldErrors {
        username: validate_username(&username),
        password: validate_password(&password),
    };
    if field_errors.any() {
        return Ok(bad_request(
            LoginActionData {
                fields: Some(fields),
                field_errors: Some(field_errors),
                form_error: None,
            },
            &redirect_to,
        ));
    }

    let form_error = |message: String| LoginActionData {
        fields: Some(fields.clone()),
        field_errors: None,
        form_error: Some(message),
    };

    let user = match LoginType::parse(&login_type) {
        Some(LoginType::Login) => match login(&state.db, &username, &password).await? {
            Some(user) => user,
            None => {
                return Ok(bad_request(
                    form_error("Username/Password combination is incorrect".to_string()),
                    &redirect_to,
                ));
            }
        },
        Some(LoginType::Register) => match register(&state.db, &username, &password).await? {
            Some(user) => user,
            None => {
                return Ok(bad_request(
                    form_error(format!("User with username {} already exists", username)),
                    &redirect_to,
                ));
            }
        },
        None => {
            return Ok(bad_request(
                form_error("Login type invalid".to_string()),
                &redirect_to,
            ));
        }
    };

    info!("User '{}' logged in", user.username);
    let (jar, redirect) = state.sessions.create_session(jar, &user.id, &redirect_to)?;
    Ok((jar, redirect).into_response())
}

pub async fn logout_action(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    state.sessions.logout(jar)
}

pub async fn logout_page() -> Redirect {
    Redirect::to("/")
}

fn bad_request(data: LoginActionData, redirect_to: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Html(views::login_page(&data, redirect_to)),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redirect_targets_must_be_local_paths() {
        assert_eq!(validate_redirect(Some("/jokes/new")), "/jokes/new");
        assert_eq!(validate_redirect(Some("/")), "/");
        assert_eq!(validate_redirect(None), DEFAULT_REDIRECT);
        assert_eq!(validate_redirect(Some("https://evil.example")), DEFAULT_REDIRECT);
        assert_eq!(validate_redirect(Some("//evil.example")), DEFAULT_REDIRECT);
        assert_eq!(validate_redirect(Some("/\\evil.example")), DEFAULT_REDIRECT);
        assert_eq!(validate_redirect(Some("/jokes\r\nSet-Cookie:x")), DEFAULT_REDIRECT);
        assert_eq!(validate_redirect(Some("/jokes\tnew")), DEFAULT_REDIRECT);
        assert_eq!(validate_redirect(Some("/jokes\u{7f}")), DEFAULT_REDIRECT);
    }

    #[test]
    fn credential_lengths() {
        assert!(validate_username("ab").is_some());
        assert!(validate_username("abc").is_none());
        assert!(validate_password("12345").is_some());
        assert!(validate_password("123456").is_none());
    }

    #[tokio::test]
    async fn login_checks_username_and_password() {
        let db = Arc::new(Database::open_in_memory().unwrap());
        let created = register(&db, "kody", "twixrox").await.unwrap().unwrap();

        let user = login(&db, "kody", "twixrox").await.unwrap().unwrap();
        assert_eq!(user, created);

        assert!(login(&db, "kody", "wrong-password").await.unwrap().is_none());
        assert!(login(&db, "nobody", "twixrox").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn register_refuses_taken_usernames() {
        let db = Arc::new(Database::open_in_memory().unwrap());
        assert!(register(&db, "kody", "twixrox").await.unwrap().is_some());
        assert!(register(&db, "kody", "another").await.unwrap().is_none());
        assert_eq!(db.count_users().unwrap(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn simultaneous_registrations_refuse_all_but_one() {
        let db = Arc::new(Database::open_in_memory().unwrap());

        let attempts: Vec<_> = (0..6)
            .map(|_| {
                let db = db.clone();
                tokio::spawn(async move { register(&db, "kody", "twixrox").await })
            })
            .collect();

        let mut created = 0;
        for attempt in attempts {
            if attempt.await.unwrap().unwrap().is_some() {
                created += 1;
            }
        }
        assert_eq!(created, 1);
        assert_eq!(db.count_users().unwrap(), 1);
    }
}
