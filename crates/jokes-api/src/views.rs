//! Server-rendered HTML. Every piece of user-supplied text goes through
//! `html_escape` before it lands in a page.

use html_escape::{encode_double_quoted_attribute as attr, encode_text as text};

use jokes_types::api::{JokeActionData, LoginActionData, LoginType};
use jokes_types::models::{Joke, JokeListItem, User};

pub struct Layout {
    pub user: Option<User>,
    pub jokes: Vec<JokeListItem>,
}

fn document(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width,initial-scale=1">
<title>{title}</title>
<link rel="stylesheet" href="/static/styles/global.css">
</head>
<body>
{body}
</body>
</html>"#,
        title = text(title),
        body = body,
    )
}

pub fn index_page() -> String {
    document(
        "Jokes",
        r#"<div class="container">
<div class="content">
<h1>Jokes <span>App!</span></h1>
<nav><ul><li><a href="/jokes">Read Jokes</a></li></ul></nav>
</div>
</div>"#,
    )
}

pub fn error_page(title: &str, message: &str) -> String {
    document(
        title,
        &format!(
            r#"<div class="error-container"><h1>{}</h1><p>{}</p><a href="/jokes">Back to jokes</a></div>"#,
            text(title),
            text(message)
        ),
    )
}

pub fn jokes_layout(layout: &Layout, outlet: &str) -> String {
    let account = match &layout.user {
        Some(user) => format!(
            r#"<div class="user-info"><span>Hi {}</span><form action="/logout" method="post"><button type="submit" class="button">Logout</button></form></div>"#,
            text(&user.username)
        ),
        None => r#"<a href="/login">Login</a>"#.to_string(),
    };

    let items: String = layout
        .jokes
        .iter()
        .map(|joke| {
            format!(
                r#"<li><a href="/jokes/{}">{}</a></li>"#,
                joke.id,
                text(&joke.name)
            )
        })
        .collect();

    let body = format!(
        r#"<div class="jokes-layout">
<header class="jokes-header">
<div class="container">
<h1 class="home-link"><a href="/" title="Jokes" aria-label="Jokes">JOKES</a></h1>
{account}
</div>
</header>
<main class="jokes-main">
<div class="container">
<div class="jokes-list">
<a href="/jokes">Get a random joke</a>
<p>Here are some of the most recent jokes to check out:</p>
<ul>{items}</ul>
<a href="/jokes/new" class="button">Add your own</a>
</div>
<div class="jokes-outlet">
{outlet}
</div>
</div>
</main>
</div>"#
    );

    document("Jokes", &body)
}

pub fn joke_outlet(joke: &Joke, with_permalink: bool) -> String {
    let permalink = if with_permalink {
        format!(r#"<a href="/jokes/{}">"{}" Permalink</a>"#, joke.id, text(&joke.name))
    } else {
        String::new()
    };

    format!(
        r#"<div><p>Here's a hilarious joke:</p><p>{}</p>{}</div>"#,
        text(&joke.content),
        permalink
    )
}

pub fn empty_jokes_outlet() -> String {
    r#"<div class="error-container"><p>There are no jokes to display.</p><a href="/jokes/new">Add your own</a></div>"#
        .to_string()
}

fn field_error(id: &str, error: Option<&str>) -> String {
    match error {
        Some(message) => format!(
            r#"<p class="form-validation-error" id="{}" role="alert">{}</p>"#,
            id,
            text(message)
        ),
        None => String::new(),
    }
}

fn invalid_attrs(id: &str, error: Option<&str>) -> String {
    match error {
        Some(_) => format!(r#"aria-invalid="true" aria-errormessage="{}""#, id),
        None => r#"aria-invalid="false""#.to_string(),
    }
}

fn form_error(error: Option<&str>) -> String {
    match error {
        Some(message) => format!(
            r#"<p class="form-validation-error" role="alert">{}</p>"#,
            text(message)
        ),
        None => String::new(),
    }
}

pub fn new_joke_outlet(data: &JokeActionData) -> String {
    let name = data.fields.as_ref().map(|f| f.name.as_str()).unwrap_or_default();
    let content = data.fields.as_ref().map(|f| f.content.as_str()).unwrap_or_default();
    let name_error = data.field_errors.as_ref().and_then(|e| e.name.as_deref());
    let content_error = data.field_errors.as_ref().and_then(|e| e.content.as_deref());

    format!(
        r#"<div>
<p>Add your own hilarious joke</p>
<form method="post" action="/jokes/new">
<div>
<label>Name: <input type="text" name="name" value="{name_value}" {name_attrs}></label>
{name_error}
</div>
<div>
<label>Content: <textarea name="content" {content_attrs}>{content_value}</textarea></label>
{content_error}
</div>
<div>
{form_error}
<button type="submit" class="button">Add</button>
</div>
</form>
</div>"#,
        name_value = attr(name),
        name_attrs = invalid_attrs("name-error", name_error),
        name_error = field_error("name-error", name_error),
        content_value = text(content),
        content_attrs = invalid_attrs("content-error", content_error),
        content_error = field_error("content-error", content_error),
        form_error = form_error(data.form_error.as_deref()),
    )
}

pub fn login_page(data: &LoginActionData, redirect_to: &str) -> String {
    let fields = data.fields.as_ref();
    let login_type = fields
        .and_then(|f| LoginType::parse(&f.login_type))
        .unwrap_or(LoginType::Login);
    let username = fields.map(|f| f.username.as_str()).unwrap_or_default();
    let username_error = data.field_errors.as_ref().and_then(|e| e.username.as_deref());
    let password_error = data.field_errors.as_ref().and_then(|e| e.password.as_deref());

    let checked = |t: LoginType| if t == login_type { " checked" } else { "" };

    let body = format!(
        r#"<div class="container">
<div class="content" data-light="">
<h1>Login</h1>
<form method="post" action="/login">
<input type="hidden" name="redirectTo" value="{redirect_to}">
<fieldset>
<legend class="sr-only">Login or Register?</legend>
<label><input type="radio" name="loginType" value="{login}"{login_checked}> Login</label>
<label><input type="radio" name="loginType" value="{register}"{register_checked}> Register</label>
</fieldset>
<div>
<label for="username-input">Username</label>
<input type="text" id="username-input" name="username" value="{username}" {username_attrs}>
{username_error}
</div>
<div>
<label for="password-input">Password</label>
<input id="password-input" name="password" type="password" {password_attrs}>
{password_error}
</div>
<div id="form-error-message">{form_error}</div>
<button type="submit" class="button">Submit</button>
</form>
</div>
<div class="links"><ul><li><a href="/">Home</a></li><li><a href="/jokes">Jokes</a></li></ul></div>
</div>"#,
        redirect_to = attr(redirect_to),
        login = LoginType::Login.as_str(),
        register = LoginType::Register.as_str(),
        login_checked = checked(LoginType::Login),
        register_checked = checked(LoginType::Register),
        username = attr(username),
        username_attrs = invalid_attrs("username-error", username_error),
        username_error = field_error("username-error", username_error),
        password_attrs = invalid_attrs("password-error", password_error),
        password_error = field_error("password-error", password_error),
        form_error = form_error(data.form_error.as_deref()),
    );

    document("Login | Jokes", &body)
}
