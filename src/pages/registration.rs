use axum::response::Html;

use super::{escape, field, form, layout};
use crate::forms::FormErrors;
use crate::session::FlashMessage;
use crate::urls::{
    CHANGE_PASSWORD_URL, LOGIN_URL, RESET_PASSWORD_URL, SIGNUP_URL,
};

pub const SIGNUP_TEMPLATE: &str = "registration/signup.html";
pub const LOGIN_TEMPLATE: &str = "registration/login.html";
pub const LOGGED_OUT_TEMPLATE: &str = "registration/logged_out.html";
pub const HOME_TEMPLATE: &str = "home.html";
pub const PASSWORD_CHANGE_TEMPLATE: &str = "registration/password_change_form.html";
pub const PASSWORD_RESET_TEMPLATE: &str = "registration/password_reset_form.html";
pub const PASSWORD_RESET_CONFIRM_TEMPLATE: &str = "registration/password_reset_confirm.html";

pub const INVALID_RESET_LINK: &str = "The password reset link was invalid, possibly because it has already been used. Please request a new password reset.";

pub fn signup(email: &str, errors: &FormErrors, messages: &[FlashMessage]) -> Html<String> {
    let fields = [
        field("email", "Email", "email", email, errors),
        field("password1", "Password", "password", "", errors),
        field("password2", "Password confirmation", "password", "", errors),
    ];
    let content = format!(
        r#"{}<p>Already have an account? <a href="{}">Log in</a></p>"#,
        form(SIGNUP_URL, &fields, errors, "Sign up"),
        LOGIN_URL
    );
    layout(SIGNUP_TEMPLATE, "Sign up", messages, &content)
}

pub fn login(
    username: &str,
    next: Option<&str>,
    errors: &FormErrors,
    messages: &[FlashMessage],
) -> Html<String> {
    let mut fields = vec![
        field("username", "Email", "email", username, errors),
        field("password", "Password", "password", "", errors),
    ];
    if let Some(next) = next {
        fields.push(format!(
            r#"<input type="hidden" name="next" value="{}">"#,
            escape(next)
        ));
    }
    let content = format!(
        r#"{}<p><a href="{}">Forgot your password?</a></p><p>No account yet? <a href="{}">Sign up</a></p>"#,
        form(LOGIN_URL, &fields, errors, "Log in"),
        RESET_PASSWORD_URL,
        SIGNUP_URL
    );
    layout(LOGIN_TEMPLATE, "Log in", messages, &content)
}

pub fn logged_out(messages: &[FlashMessage]) -> Html<String> {
    let content = format!(
        r#"<p>Thanks for spending some quality time with the web site today.</p><p><a href="{}">Log in again</a></p>"#,
        LOGIN_URL
    );
    layout(LOGGED_OUT_TEMPLATE, "Logged out", messages, &content)
}

pub fn home(email: &str, messages: &[FlashMessage]) -> Html<String> {
    let content = format!(
        r#"<p>Logged in as <strong id="user-email">{}</strong>.</p><p><a href="{}">Change password</a></p>"#,
        escape(email),
        CHANGE_PASSWORD_URL
    );
    layout(HOME_TEMPLATE, "Home", messages, &content)
}

pub fn password_change(errors: &FormErrors, messages: &[FlashMessage]) -> Html<String> {
    let fields = [
        field("old_password", "Old password", "password", "", errors),
        field("new_password1", "New password", "password", "", errors),
        field("new_password2", "New password confirmation", "password", "", errors),
    ];
    let content = form(CHANGE_PASSWORD_URL, &fields, errors, "Change my password");
    layout(PASSWORD_CHANGE_TEMPLATE, "Password change", messages, &content)
}

pub fn password_reset(email: &str, errors: &FormErrors, messages: &[FlashMessage]) -> Html<String> {
    let fields = [field("email", "Email", "email", email, errors)];
    let content = format!(
        "<p>Forgotten your password? Enter your email address below, and we’ll email instructions for setting a new one.</p>{}",
        form(RESET_PASSWORD_URL, &fields, errors, "Reset my password")
    );
    layout(PASSWORD_RESET_TEMPLATE, "Password reset", messages, &content)
}

/// リセット確認ページ
///
/// `action` が `None` の場合はリンク無効のページ
pub fn password_reset_confirm(
    action: Option<&str>,
    errors: &FormErrors,
    messages: &[FlashMessage],
) -> Html<String> {
    let content = match action {
        Some(action) => {
            let fields = [
                field("new_password1", "New password", "password", "", errors),
                field("new_password2", "Confirm password", "password", "", errors),
            ];
            format!(
                r#"<div data-validlink="true"><p>Please enter your new password twice so we can verify you typed it in correctly.</p>{}</div>"#,
                form(action, &fields, errors, "Change my password")
            )
        }
        None => format!(
            r#"<div data-validlink="false"><p id="invalid-link">{}</p><p><a href="{}">Request a new password reset</a></p></div>"#,
            escape(INVALID_RESET_LINK),
            RESET_PASSWORD_URL
        ),
    };
    layout(
        PASSWORD_RESET_CONFIRM_TEMPLATE,
        "Enter new password",
        messages,
        &content,
    )
}
