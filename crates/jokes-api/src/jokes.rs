use axum::{
    Form,
    extract::{Path, State, rejection::FormRejection},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use rand::Rng;
use tracing::{debug, info};
use uuid::Uuid;

use jokes_types::api::{JokeActionData, JokeFieldErrors, JokeFields, NewJokeForm};
use jokes_types::models::{Joke, JokeListItem};

use crate::auth::{AppState, with_db};
use crate::error::AppError;
use crate::views::{self, Layout};

pub const RECENT_JOKES_LIMIT: u32 = 5;
pub const NEW_JOKE_PATH: &str = "/jokes/new";

pub fn validate_joke_name(name: &str) -> Option<String> {
    (name.chars().count() < 3).then(|| "That joke's name is too short".to_string())
}

pub fn validate_joke_content(content: &str) -> Option<String> {
    (content.chars().count() < 10).then(|| "That joke is too short".to_string())
}

/// Validate a submitted joke. On failure the returned data carries either
/// a form-level error (fields missing) or the original values plus
/// per-field errors.
pub fn validate_new_joke(form: NewJokeForm) -> Result<JokeFields, JokeActionData> {
    let (Some(name), Some(content)) = (form.name, form.content) else {
        return Err(JokeActionData {
            form_error: Some("Form not submitted correctly.".to_string()),
            ..Default::default()
        });
    };

    let field_errors = JokeFieldErrors {
        name: validate_joke_name(&name),
        content: validate_joke_content(&content),
    };
    let fields = JokeFields { name, content };

    if field_errors.any() {
        return Err(JokeActionData {
            fields: Some(fields),
            field_errors: Some(field_errors),
            form_error: None,
        });
    }

    Ok(fields)
}

/// Current user plus the recent-jokes sidebar shared by every /jokes page.
async fn load_layout(state: &AppState, jar: &CookieJar) -> Result<Layout, AppError> {
    let user = state.sessions.current_user(&state.db, jar).await?;

    let rows = with_db(&state.db, |db| db.get_recent_jokes(RECENT_JOKES_LIMIT)).await?;
    let jokes: Vec<JokeListItem> = rows.into_iter().map(Into::into).collect();

    Ok(Layout { user, jokes })
}

pub async fn index() -> Html<String> {
    Html(views::index_page())
}

pub async fn random(State(state): State<AppState>, jar: CookieJar) -> Result<Response, AppError> {
    let layout = load_layout(&state, &jar).await?;

    let joke: Option<Joke> = with_db(&state.db, |db| {
        let count = db.count_jokes()?;
        if count == 0 {
            return Ok(None);
        }
        let offset = rand::rng().random_range(0..count);
        Ok(db.get_joke_at(offset)?.map(Into::into))
    })
    .await?;

    let outlet = match &joke {
        Some(joke) => views::joke_outlet(joke, true),
        None => views::empty_jokes_outlet(),
    };
    Ok(Html(views::jokes_layout(&layout, &outlet)).into_response())
}

pub async fn detail(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(joke_id): Path<String>,
) -> Result<Response, AppError> {
    let layout = load_layout(&state, &jar).await?;

    let id = joke_id.clone();
    let joke: Joke = with_db(&state.db, move |db| db.get_joke(&id))
        .await?
        .map(Into::into)
        .ok_or_else(|| AppError::NotFound(format!("No joke found with id {}", joke_id)))?;

    let outlet = views::joke_outlet(&joke, false);
    Ok(Html(views::jokes_layout(&layout, &outlet)).into_response())
}

pub async fn new_form(State(state): State<AppState>, jar: CookieJar) -> Result<Response, AppError> {
    state.sessions.require_user_id(&jar, NEW_JOKE_PATH)?;
    let layout = load_layout(&state, &jar).await?;

    let outlet = views::new_joke_outlet(&JokeActionData::default());
    Ok(Html(views::jokes_layout(&layout, &outlet)).into_response())
}

pub async fn create(
    State(state): State<AppState>,
    jar: CookieJar,
    form: Result<Form<NewJokeForm>, FormRejection>,
) -> Result<Response, AppError> {
    // Auth gate runs before the form is looked at.
    let user_id = state.sessions.require_user_id(&jar, NEW_JOKE_PATH)?;
    let layout = load_layout(&state, &jar).await?;

    let form = match form {
        Ok(Form(form)) => form,
        Err(rejection) => {
            debug!("Malformed joke form: {}", rejection);
            NewJokeForm::default()
        }
    };

    let fields = match validate_new_joke(form) {
        Ok(fields) => fields,
        Err(data) => {
            let outlet = views::new_joke_outlet(&data);
            return Ok((
                StatusCode::BAD_REQUEST,
                Html(views::jokes_layout(&layout, &outlet)),
            )
                .into_response());
        }
    };

    let joke_id = Uuid::new_v4();
    let id = joke_id.to_string();
    let jokester = user_id.clone();
    with_db(&state.db, move |db| {
        db.insert_joke(&id, &jokester, &fields.name, &fields.content)
    })
    .await?;

    info!("User {} created joke {}", user_id, joke_id);
    Ok(Redirect::to(&format!("/jokes/{}", joke_id)).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(name: Option<&str>, content: Option<&str>) -> NewJokeForm {
        NewJokeForm {
            name: name.map(str::to_string),
            content: content.map(str::to_string),
        }
    }

    #[test]
    fn valid_joke_passes() {
        let fields = validate_new_joke(form(Some("Hip"), Some("0123456789"))).unwrap();
        assert_eq!(fields.name, "Hip");
        assert_eq!(fields.content, "0123456789");
    }

    #[test]
    fn short_name_and_content_fail_together() {
        let data = validate_new_joke(form(Some("Hi"), Some("too short"))).unwrap_err();
        let errors = data.field_errors.unwrap();
        assert_eq!(errors.name.as_deref(), Some("That joke's name is too short"));
        assert_eq!(errors.content.as_deref(), Some("That joke is too short"));
        assert_eq!(
            data.fields,
            Some(JokeFields {
                name: "Hi".to_string(),
                content: "too short".to_string()
            })
        );
        assert!(data.form_error.is_none());
    }

    #[test]
    fn each_field_fails_independently() {
        let data = validate_new_joke(form(Some("ab"), Some("long enough content"))).unwrap_err();
        let errors = data.field_errors.unwrap();
        assert!(errors.name.is_some());
        assert!(errors.content.is_none());

        let data = validate_new_joke(form(Some("Good name"), Some("short"))).unwrap_err();
        let errors = data.field_errors.unwrap();
        assert!(errors.name.is_none());
        assert!(errors.content.is_some());
    }

    #[test]
    fn lengths_count_characters_not_bytes() {
        assert!(validate_joke_name("ééé").is_none());
        assert!(validate_joke_name("éé").is_some());
    }

    #[test]
    fn missing_fields_are_a_form_error() {
        for f in [form(None, Some("content here!")), form(Some("name"), None), form(None, None)] {
            let data = validate_new_joke(f).unwrap_err();
            assert_eq!(data.form_error.as_deref(), Some("Form not submitted correctly."));
            assert!(data.fields.is_none());
            assert!(data.field_errors.is_none());
        }
    }
}
