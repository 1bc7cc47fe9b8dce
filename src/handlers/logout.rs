use axum::response::Html;
use tower_sessions::Session;

use crate::error::AppError;
use crate::pages;
use crate::session::SessionAuth;

/// ログアウトハンドラー
///
/// GET/POST /registration/logout/
///
/// セッションを破棄してログアウト完了ページを返す。
pub async fn logout(session: Session) -> Result<Html<String>, AppError> {
    SessionAuth::logout(&session).await?;

    tracing::info!("ログアウト完了");

    Ok(pages::registration::logged_out(&[]))
}
