use axum::{
    Form,
    extract::{Path, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::error::AppError;
use crate::forms::{FormErrors, PasswordResetForm, SetPasswordForm};
use crate::models::User;
use crate::pages;
use crate::services::auth::hash_password;
use crate::services::token::{decode_uid, encode_uid};
use crate::session::{FlashMessage, Level, SessionResetToken};
use crate::state::AppState;
use crate::urls::{LOGIN_URL, RESET_URL_TOKEN, password_reset_confirm_url};

pub const RESET_EMAIL_SENT: &str = "We’ve emailed you instructions for setting your password, if an account exists with the email you entered. You should receive them shortly.";
pub const RESET_COMPLETE: &str = "Your password has been set. You may go ahead and log in now.";

// === リセットリクエスト ===

/// GET /registration/reset_password/
pub async fn password_reset_page(session: Session) -> Result<Html<String>, AppError> {
    let messages = FlashMessage::drain(&session).await?;
    Ok(pages::registration::password_reset(
        "",
        &FormErrors::new(),
        &messages,
    ))
}

/// パスワードリセット申請
///
/// POST /registration/reset_password/
///
/// # Security
/// アカウントの有無にかかわらず同じレスポンスを返す（ユーザー存在有無を漏洩しない）
pub async fn password_reset(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<PasswordResetForm>,
) -> Result<Response, AppError> {
    // バリデーション
    let errors = form.validate();
    if !errors.is_empty() {
        let messages = FlashMessage::drain(&session).await?;
        return Ok(
            pages::registration::password_reset(form.email(), &errors, &messages).into_response(),
        );
    }

    tracing::info!(email = %form.email(), "パスワードリセットリクエスト");

    let users = state
        .user_repo
        .find_all_by_email_ignore_case(form.email())
        .await?;
    if users.is_empty() {
        tracing::info!(email = %form.email(), "パスワードリセット: ユーザー不在（成功レスポンス返却）");
    }

    let generator = state.token_generator();
    for user in &users {
        let token = generator.make_token(user)?;
        let reset_url = format!(
            "{}{}",
            state.config.site_url.trim_end_matches('/'),
            password_reset_confirm_url(&encode_uid(user.id), &token)
        );

        // 送信失敗はレスポンスに反映しない
        if let Err(e) = state
            .email_service
            .send_password_reset_email(&user.email, &reset_url)
            .await
        {
            tracing::warn!(error = %e, user_id = %user.id, "パスワードリセットメール送信失敗");
        }
    }

    FlashMessage::push(&session, Level::Info, RESET_EMAIL_SENT).await?;
    Ok(Redirect::to(LOGIN_URL).into_response())
}

// === リセット確認 ===

/// GET /registration/reset/{uidb64}/{token}/
///
/// 有効なトークンはセッションへ移し、トークンを含まない URL へリダイレクトする。
/// `token` が `set-password` の場合はセッションのトークンを検証してフォームを表示する。
pub async fn password_reset_confirm_page(
    State(state): State<AppState>,
    session: Session,
    Path((uidb64, token)): Path<(String, String)>,
) -> Result<Response, AppError> {
    let Some(user) = find_user(&state, &uidb64).await? else {
        return render_invalid_link(&session).await;
    };

    if token == RESET_URL_TOKEN {
        if !session_token_valid(&state, &session, &user).await? {
            return render_invalid_link(&session).await;
        }
        let messages = FlashMessage::drain(&session).await?;
        let action = password_reset_confirm_url(&uidb64, RESET_URL_TOKEN);
        return Ok(pages::registration::password_reset_confirm(
            Some(&action),
            &FormErrors::new(),
            &messages,
        )
        .into_response());
    }

    if !state.token_generator().check_token(&user, &token) {
        tracing::warn!(user_id = %user.id, "無効または期限切れのリセットリンク");
        return render_invalid_link(&session).await;
    }

    SessionResetToken::insert(&session, &token).await?;
    Ok(Redirect::to(&password_reset_confirm_url(&uidb64, RESET_URL_TOKEN)).into_response())
}

/// 新しいパスワードの設定
///
/// POST /registration/reset/{uidb64}/{token}/
///
/// # Security
/// - token, new_password はログに出力しない
pub async fn password_reset_confirm(
    State(state): State<AppState>,
    session: Session,
    Path((uidb64, token)): Path<(String, String)>,
    Form(form): Form<SetPasswordForm>,
) -> Result<Response, AppError> {
    let Some(user) = find_user(&state, &uidb64).await? else {
        return render_invalid_link(&session).await;
    };

    let valid = if token == RESET_URL_TOKEN {
        session_token_valid(&state, &session, &user).await?
    } else {
        state.token_generator().check_token(&user, &token)
    };
    if !valid {
        return render_invalid_link(&session).await;
    }

    let errors = form.validate(&user.email);
    if !errors.is_empty() {
        let messages = FlashMessage::drain(&session).await?;
        let action = password_reset_confirm_url(&uidb64, &token);
        return Ok(
            pages::registration::password_reset_confirm(Some(&action), &errors, &messages)
                .into_response(),
        );
    }

    let password_hash = hash_password(&form.new_password1)?;
    state
        .user_repo
        .update_password(user.id, &password_hash)
        .await?;
    SessionResetToken::remove(&session).await?;

    tracing::info!(user_id = %user.id, "パスワードリセット完了");

    FlashMessage::push(&session, Level::Success, RESET_COMPLETE).await?;
    Ok(Redirect::to(LOGIN_URL).into_response())
}

async fn find_user(state: &AppState, uidb64: &str) -> Result<Option<User>, AppError> {
    let Some(user_id) = decode_uid(uidb64) else {
        return Ok(None);
    };
    Ok(state.user_repo.find_by_id(user_id).await?)
}

async fn session_token_valid(
    state: &AppState,
    session: &Session,
    user: &User,
) -> Result<bool, AppError> {
    let token = SessionResetToken::get(session).await?;
    Ok(token.is_some_and(|token| state.token_generator().check_token(user, &token)))
}

async fn render_invalid_link(session: &Session) -> Result<Response, AppError> {
    let messages = FlashMessage::drain(session).await?;
    Ok(
        pages::registration::password_reset_confirm(None, &FormErrors::new(), &messages)
            .into_response(),
    )
}
