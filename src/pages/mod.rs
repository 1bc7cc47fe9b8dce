//! HTML ページの描画
//!
//! 各ページの `<body>` に `data-template` を付けて、どのビューが描画したか判別できるようにする。

pub mod registration;

use std::fmt::Write as _;

use axum::response::Html;

use crate::forms::FormErrors;
use crate::session::FlashMessage;
use crate::urls::{HOME_URL, LOGIN_URL, LOGOUT_URL, SIGNUP_URL};

/// HTML エスケープ
pub fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// 共通レイアウト
fn layout(template: &str, title: &str, messages: &[FlashMessage], content: &str) -> Html<String> {
    let mut alerts = String::new();
    for message in messages {
        let _ = write!(
            alerts,
            r#"<div class="alert {}" role="alert">{}</div>"#,
            message.tags(),
            escape(&message.text)
        );
    }

    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title}</title>
</head>
<body data-template="{template}">
<nav><a href="{home}">Home</a> <a href="{login}">Log in</a> <a href="{signup}">Sign up</a> <a href="{logout}">Log out</a></nav>
<main>
<h1>{title}</h1>
{alerts}
{content}
</main>
</body>
</html>
"#,
        title = escape(title),
        template = escape(template),
        home = HOME_URL,
        login = LOGIN_URL,
        signup = SIGNUP_URL,
        logout = LOGOUT_URL,
    ))
}

fn error_list(field: &str, messages: &[String]) -> String {
    if messages.is_empty() {
        return String::new();
    }
    let mut out = format!(r#"<ul class="errorlist" id="errors-{}">"#, escape(field));
    for message in messages {
        let _ = write!(out, "<li>{}</li>", escape(message));
    }
    out.push_str("</ul>");
    out
}

fn non_field_errors(errors: &FormErrors) -> String {
    if errors.non_field().is_empty() {
        return String::new();
    }
    let mut out = String::from(r#"<ul class="errorlist nonfield">"#);
    for message in errors.non_field() {
        let _ = write!(out, "<li>{}</li>", escape(message));
    }
    out.push_str("</ul>");
    out
}

/// ラベル・入力欄・エラー一覧
///
/// パスワード欄は値を再表示しない。
fn field(name: &str, label: &str, input_type: &str, value: &str, errors: &FormErrors) -> String {
    let value = if input_type == "password" { "" } else { value };
    format!(
        r#"<p><label for="id_{name}">{label}</label>{errors}<input type="{input_type}" name="{name}" id="id_{name}" value="{value}"></p>"#,
        name = escape(name),
        label = escape(label),
        errors = error_list(name, errors.field(name)),
        input_type = input_type,
        value = escape(value),
    )
}

fn form(action: &str, fields: &[String], errors: &FormErrors, submit: &str) -> String {
    format!(
        r#"<form method="post" action="{action}">{non_field}{fields}<button type="submit">{submit}</button></form>"#,
        action = escape(action),
        non_field = non_field_errors(errors),
        fields = fields.concat(),
        submit = escape(submit),
    )
}

/// 500 エラーページ
pub fn server_error() -> Html<String> {
    layout(
        "500.html",
        "Server Error",
        &[],
        "<p>There's been an error. Please try again later.</p>",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Level;

    #[test]
    fn test_escape() {
        assert_eq!(
            escape(r#"<a href="x">'&'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&#x27;&amp;&#x27;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_layout_renders_template_marker_and_messages() {
        let messages = vec![FlashMessage {
            level: Level::Success,
            text: "Saved <ok>".to_string(),
        }];
        let Html(body) = layout("home.html", "Home", &messages, "<p>hi</p>");

        assert!(body.contains(r#"data-template="home.html""#));
        assert!(body.contains(r#"<div class="alert alert-success" role="alert">Saved &lt;ok&gt;</div>"#));
        assert!(body.contains("<p>hi</p>"));
    }

    #[test]
    fn test_field_hides_password_value() {
        let errors = FormErrors::new();
        let html = field("password1", "Password", "password", "secret", &errors);
        assert!(!html.contains("secret"));

        let html = field("email", "Email", "email", "a@b.com", &errors);
        assert!(html.contains(r#"value="a@b.com""#));
    }

    #[test]
    fn test_field_errors() {
        let mut errors = FormErrors::new();
        errors.add("email", "This field is required.");
        let html = field("email", "Email", "email", "", &errors);
        assert!(html.contains(
            r#"<ul class="errorlist" id="errors-email"><li>This field is required.</li></ul>"#
        ));
    }
}
