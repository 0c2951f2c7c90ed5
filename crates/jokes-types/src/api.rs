use serde::{Deserialize, Serialize};

// -- Session --

/// Claims carried inside the session cookie. `userId` is trusted only
/// after the cookie has been opened and its signature verified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub iat: i64,
    pub exp: i64,
}

// -- Jokes --

/// Raw new-joke form. Fields are optional so a structurally broken
/// submission can be told apart from a short one.
#[derive(Debug, Default, Deserialize)]
pub struct NewJokeForm {
    pub name: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JokeFields {
    pub name: String,
    pub content: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JokeFieldErrors {
    pub name: Option<String>,
    pub content: Option<String>,
}

impl JokeFieldErrors {
    pub fn any(&self) -> bool {
        self.name.is_some() || self.content.is_some()
    }
}

/// What a failed new-joke action hands back to the form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JokeActionData {
    pub fields: Option<JokeFields>,
    pub field_errors: Option<JokeFieldErrors>,
    pub form_error: Option<String>,
}

// -- Auth --

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(rename = "loginType")]
    pub login_type: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    #[serde(rename = "redirectTo")]
    pub redirect_to: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RedirectQuery {
    #[serde(rename = "redirectTo")]
    pub redirect_to: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginType {
    Login,
    Register,
}

impl LoginType {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "login" => Some(Self::Login),
            "register" => Some(Self::Register),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::Register => "register",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginFields {
    pub login_type: String,
    pub username: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginFieldErrors {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl LoginFieldErrors {
    pub fn any(&self) -> bool {
        self.username.is_some() || self.password.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginActionData {
    pub fields: Option<LoginFields>,
    pub field_errors: Option<LoginFieldErrors>,
    pub form_error: Option<String>,
}
