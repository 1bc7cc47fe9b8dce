use axum::{
    Form,
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::error::AppError;
use crate::forms::{EMAIL_EXISTS, FormErrors, SignupForm};
use crate::pages;
use crate::repositories::RepositoryError;
use crate::services::auth::hash_password;
use crate::session::{FlashMessage, Level};
use crate::state::AppState;
use crate::urls::LOGIN_URL;

pub const SIGNUP_SUCCESS: &str = "Account created successfully. You can now login";

/// GET /registration/signup/
pub async fn signup_page(session: Session) -> Result<Html<String>, AppError> {
    let messages = FlashMessage::drain(&session).await?;
    Ok(pages::registration::signup("", &FormErrors::new(), &messages))
}

/// ユーザー登録ハンドラー
///
/// POST /registration/signup/
///
/// 処理フロー:
/// 1. フォームバリデーション（必須・email形式・パスワード一致・強度）
/// 2. email 重複チェック
/// 3. パスワードハッシュ化・ユーザー作成
/// 4. 成功メッセージを積んでログインページへリダイレクト
///
/// # Security
/// - パスワードはログに出力しない
pub async fn signup(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<SignupForm>,
) -> Result<Response, AppError> {
    // 1. フォームバリデーション
    let mut errors = form.validate();
    let email = form.email();

    // 2. email 重複チェック
    if !errors.has_field("email") && state.user_repo.find_by_email(&email).await?.is_some() {
        errors.add("email", EMAIL_EXISTS);
    }

    if !errors.is_empty() {
        return render_invalid(&session, &email, &errors).await;
    }

    // 3. ユーザー作成
    let password_hash = hash_password(&form.password1)?;
    let user = match state.user_repo.create_user(&email, &password_hash).await {
        Ok(user) => user,
        // チェック後に同じ email が登録された場合
        Err(RepositoryError::EmailAlreadyExists) => {
            errors.add("email", EMAIL_EXISTS);
            return render_invalid(&session, &email, &errors).await;
        }
        Err(e) => return Err(e.into()),
    };

    tracing::info!(user_id = %user.id, email = %user.email, "ユーザー登録成功");

    // 4. ログインページへ
    FlashMessage::push(&session, Level::Success, SIGNUP_SUCCESS).await?;
    Ok(Redirect::to(LOGIN_URL).into_response())
}

async fn render_invalid(
    session: &Session,
    email: &str,
    errors: &FormErrors,
) -> Result<Response, AppError> {
    tracing::debug!(fields = ?errors.fields().collect::<Vec<_>>(), "サインアップ入力エラー");
    let messages = FlashMessage::drain(session).await?;
    Ok(pages::registration::signup(email, errors, &messages).into_response())
}
