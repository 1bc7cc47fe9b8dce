use axum::{
    Form,
    extract::{Query, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;

use crate::error::AppError;
use crate::forms::{FormErrors, INVALID_LOGIN, SigninForm};
use crate::pages;
use crate::session::{FlashMessage, SessionAuth};
use crate::state::AppState;
use crate::urls::{HOME_URL, is_safe_redirect};

#[derive(Debug, Default, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

/// GET /registration/login/
pub async fn signin_page(
    session: Session,
    Query(query): Query<NextQuery>,
) -> Result<Html<String>, AppError> {
    let messages = FlashMessage::drain(&session).await?;
    Ok(pages::registration::login(
        "",
        query.next.as_deref(),
        &FormErrors::new(),
        &messages,
    ))
}

/// ログインハンドラー
///
/// POST /registration/login/
///
/// 処理フロー:
/// 1. 必須チェック
/// 2. ユーザー認証（email・パスワード照合）
/// 3. セッション確立
/// 4. `next`（安全な場合）またはホームへリダイレクト
///
/// # Security
/// - email 不在とパスワード不一致は同じエラーを返す（どちらが誤りか漏らさない）
pub async fn signin(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<SigninForm>,
) -> Result<Response, AppError> {
    // 1. 必須チェック
    let mut errors = form.validate();
    if !errors.is_empty() {
        return render_invalid(&session, &form, &errors).await;
    }

    // 2. ユーザー認証
    let user = state
        .auth_service()
        .authenticate(form.username(), &form.password)
        .await?;
    let Some(user) = user else {
        errors.add_non_field(INVALID_LOGIN);
        return render_invalid(&session, &form, &errors).await;
    };

    // 3. セッション確立
    SessionAuth::login(&session, &state, &user).await?;

    // 4. リダイレクト
    let redirect_to = form
        .next
        .as_deref()
        .filter(|next| is_safe_redirect(next))
        .unwrap_or(HOME_URL);

    Ok(Redirect::to(redirect_to).into_response())
}

async fn render_invalid(
    session: &Session,
    form: &SigninForm,
    errors: &FormErrors,
) -> Result<Response, AppError> {
    let messages = FlashMessage::drain(session).await?;
    Ok(pages::registration::login(
        form.username(),
        form.next.as_deref(),
        errors,
        &messages,
    )
    .into_response())
}
