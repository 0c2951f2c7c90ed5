//! Cookie sessions.
//!
//! The cookie is the only session state. Its value is an HS256 JWT holding
//! [`SessionClaims`], sealed with AES-256-GCM and base64url encoded. Anything
//! that fails to open, verify or is past `exp` reads as "no session".

use std::sync::Arc;

use axum::response::Redirect;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD as B64};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use tracing::debug;

use jokes_crypto::{keys::derive_key, seal};
use jokes_db::Database;
use jokes_types::{api::SessionClaims, models::User};

use crate::auth::with_db;
use crate::error::AppError;

pub const SESSION_COOKIE_NAME: &str = "jokes_session";
pub const SESSION_TTL_DAYS: i64 = 30;
pub const LOGIN_PATH: &str = "/login";

const SIGN_LABEL: &str = "jokes-session-sign";
const SEAL_LABEL: &str = "jokes-session-seal";

#[derive(Clone)]
pub struct SessionCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    seal_key: [u8; 32],
}

impl SessionCodec {
    pub fn new(secret: &str) -> Self {
        let sign_key = derive_key(secret, SIGN_LABEL);
        Self {
            encoding: EncodingKey::from_secret(&sign_key),
            decoding: DecodingKey::from_secret(&sign_key),
            validation: Validation::new(Algorithm::HS256),
            seal_key: derive_key(secret, SEAL_LABEL),
        }
    }

    pub fn encode(&self, user_id: &str) -> anyhow::Result<String> {
        self.encode_at(user_id, Utc::now())
    }

    pub(crate) fn encode_at(&self, user_id: &str, issued_at: DateTime<Utc>) -> anyhow::Result<String> {
        let claims = SessionClaims {
            user_id: user_id.to_string(),
            iat: issued_at.timestamp(),
            exp: (issued_at + Duration::days(SESSION_TTL_DAYS)).timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?;
        let sealed = seal::seal(&self.seal_key, token.as_bytes())?;
        Ok(B64.encode(sealed))
    }

    pub fn decode(&self, value: &str) -> Option<SessionClaims> {
        let sealed = B64.decode(value).ok()?;
        let token = seal::open(&self.seal_key, &sealed).ok()?;
        let token = String::from_utf8(token).ok()?;

        match decode::<SessionClaims>(&token, &self.decoding, &self.validation) {
            Ok(data) => Some(data.claims),
            Err(e) => {
                debug!("Rejected session token: {}", e);
                None
            }
        }
    }
}

/// Login, logout and current-user resolution on top of the session cookie.
#[derive(Clone)]
pub struct SessionStore {
    codec: SessionCodec,
    secure: bool,
}

impl SessionStore {
    pub fn new(secret: &str, secure: bool) -> Self {
        Self {
            codec: SessionCodec::new(secret),
            secure,
        }
    }

    pub fn codec(&self) -> &SessionCodec {
        &self.codec
    }

    fn cookie(&self, value: String) -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE_NAME, value))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure)
            .max_age(time::Duration::days(SESSION_TTL_DAYS))
            .build()
    }

    pub fn removal_cookie(&self) -> Cookie<'static> {
        let mut cookie = self.cookie(String::new());
        cookie.make_removal();
        cookie
    }

    /// Anonymous -> Authenticated: sets the session cookie and redirects.
    pub fn create_session(
        &self,
        jar: CookieJar,
        user_id: &str,
        redirect_to: &str,
    ) -> Result<(CookieJar, Redirect), AppError> {
        let value = self.codec.encode(user_id)?;
        Ok((jar.add(self.cookie(value)), Redirect::to(redirect_to)))
    }

    /// Any state -> Anonymous. The removal cookie goes out even when the
    /// request carried no session.
    pub fn logout(&self, jar: CookieJar) -> (CookieJar, Redirect) {
        (jar.add(self.removal_cookie()), Redirect::to(LOGIN_PATH))
    }

    pub fn user_id(&self, jar: &CookieJar) -> Option<String> {
        let cookie = jar.get(SESSION_COOKIE_NAME)?;
        self.codec.decode(cookie.value()).map(|claims| claims.user_id)
    }

    pub fn require_user_id(&self, jar: &CookieJar, redirect_to: &str) -> Result<String, AppError> {
        self.user_id(jar)
            .ok_or_else(|| AppError::Redirect(login_redirect(redirect_to)))
    }

    /// Loads the session's user. A session whose user row is gone is a
    /// logout: the caller gets `AppError::LoggedOut` and the cookie is cleared.
    pub async fn current_user(
        &self,
        db: &Arc<Database>,
        jar: &CookieJar,
    ) -> Result<Option<User>, AppError> {
        let Some(user_id) = self.user_id(jar) else {
            return Ok(None);
        };

        let row = with_db(db, move |db| db.get_user_by_id(&user_id)).await?;
        match row {
            Some(row) => Ok(Some(row.into())),
            None => Err(AppError::LoggedOut(self.removal_cookie())),
        }
    }
}

/// `/login?redirectTo=<path>`, keeping `/` readable in the query.
pub fn login_redirect(redirect_to: &str) -> String {
    let encoded = urlencoding::encode(redirect_to).replace("%2F", "/");
    format!("{}?redirectTo={}", LOGIN_PATH, encoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderMap, HeaderValue, header};

    fn jar_with(value: &str) -> CookieJar {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(&format!("{}={}", SESSION_COOKIE_NAME, value)).unwrap(),
        );
        CookieJar::from_headers(&headers)
    }

    #[test]
    fn codec_round_trips_user_id() {
        let codec = SessionCodec::new("secret");
        let value = codec.encode("user-1").unwrap();

        let claims = codec.decode(&value).unwrap();
        assert_eq!(claims.user_id, "user-1");
        assert_eq!(claims.exp - claims.iat, SESSION_TTL_DAYS * 24 * 60 * 60);
        assert!(!value.contains("user-1"));
    }

    #[test]
    fn codec_rejects_garbage_and_foreign_secrets() {
        let codec = SessionCodec::new("secret");
        assert!(codec.decode("").is_none());
        assert!(codec.decode("bogus").is_none());
        assert!(codec.decode("!!not base64!!").is_none());

        let foreign = SessionCodec::new("other-secret").encode("user-1").unwrap();
        assert!(codec.decode(&foreign).is_none());
    }

    #[test]
    fn codec_rejects_expired_sessions() {
        let codec = SessionCodec::new("secret");
        let issued = Utc::now() - Duration::days(SESSION_TTL_DAYS + 1);
        let value = codec.encode_at("user-1", issued).unwrap();
        assert!(codec.decode(&value).is_none());
    }

    #[test]
    fn missing_and_invalid_cookies_are_anonymous() {
        let store = SessionStore::new("secret", true);
        assert!(store.user_id(&CookieJar::new()).is_none());
        assert!(store.user_id(&jar_with("tampered")).is_none());

        let value = store.codec().encode("user-1").unwrap();
        assert_eq!(store.user_id(&jar_with(&value)).as_deref(), Some("user-1"));
    }

    #[test]
    fn require_user_id_redirects_to_login() {
        let store = SessionStore::new("secret", true);
        match store.require_user_id(&CookieJar::new(), "/jokes/new") {
            Err(AppError::Redirect(location)) => {
                assert_eq!(location, "/login?redirectTo=/jokes/new")
            }
            other => panic!("expected redirect, got {:?}", other),
        }
    }

    #[test]
    fn session_cookie_attributes() {
        let store = SessionStore::new("secret", true);
        let (jar, _) = store.create_session(CookieJar::new(), "user-1", "/jokes").unwrap();

        let cookie = jar.get(SESSION_COOKIE_NAME).unwrap();
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.max_age(), Some(time::Duration::days(30)));
    }

    #[test]
    fn logout_always_emits_removal_cookie() {
        let store = SessionStore::new("secret", true);
        let (jar, _) = store.logout(CookieJar::new());

        let cookie = jar.get(SESSION_COOKIE_NAME).unwrap();
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(time::Duration::ZERO));
    }

    #[test]
    fn login_redirect_encodes_query_characters() {
        assert_eq!(login_redirect("/jokes/new"), "/login?redirectTo=/jokes/new");
        assert_eq!(login_redirect("/a?b=c&d"), "/login?redirectTo=/a%3Fb%3Dc%26d");
    }

    #[tokio::test]
    async fn stale_session_becomes_logout() {
        let db = Arc::new(Database::open_in_memory().unwrap());
        let store = SessionStore::new("secret", true);
        let value = store.codec().encode(&uuid::Uuid::new_v4().to_string()).unwrap();

        let result = store.current_user(&db, &jar_with(&value)).await;
        assert!(matches!(result, Err(AppError::LoggedOut(_))));
    }
}
