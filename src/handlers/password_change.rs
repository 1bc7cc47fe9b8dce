use axum::{
    Form,
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::error::AppError;
use crate::forms::{FormErrors, PASSWORD_INCORRECT, PasswordChangeForm};
use crate::pages;
use crate::services::auth::{hash_password, verify_password};
use crate::session::{CurrentUser, FlashMessage, Level, SessionAuth};
use crate::state::AppState;
use crate::urls::HOME_URL;

pub const PASSWORD_CHANGED: &str = "Your password was changed.";

/// GET /registration/change_password/
pub async fn password_change_page(
    CurrentUser(_user): CurrentUser,
    session: Session,
) -> Result<Html<String>, AppError> {
    let messages = FlashMessage::drain(&session).await?;
    Ok(pages::registration::password_change(
        &FormErrors::new(),
        &messages,
    ))
}

/// パスワード変更ハンドラー
///
/// POST /registration/change_password/
///
/// 変更後も現在のセッションは維持する（認証ハッシュを再発行）。
/// 他のセッションは認証ハッシュ不一致で無効になる。
///
/// # Security
/// - パスワードはログに出力しない
pub async fn password_change(
    State(state): State<AppState>,
    CurrentUser(mut user): CurrentUser,
    session: Session,
    Form(form): Form<PasswordChangeForm>,
) -> Result<Response, AppError> {
    let mut errors = form.validate(&user.email);

    // 現在のパスワード照合
    if !form.old_password.is_empty() && !verify_password(&form.old_password, &user.password_hash)?
    {
        errors.add("old_password", PASSWORD_INCORRECT);
    }

    if !errors.is_empty() {
        let messages = FlashMessage::drain(&session).await?;
        return Ok(pages::registration::password_change(&errors, &messages).into_response());
    }

    let password_hash = hash_password(&form.new_password1)?;
    state
        .user_repo
        .update_password(user.id, &password_hash)
        .await?;
    user.password_hash = password_hash;

    // 現在のセッションを維持
    SessionAuth::insert(&session, &state, &user).await?;

    tracing::info!(user_id = %user.id, "パスワード変更完了");

    FlashMessage::push(&session, Level::Success, PASSWORD_CHANGED).await?;
    Ok(Redirect::to(HOME_URL).into_response())
}
