use axum::response::Html;
use tower_sessions::Session;

use crate::error::AppError;
use crate::pages;
use crate::session::{CurrentUser, FlashMessage};

/// ホーム
///
/// GET/POST /
///
/// ログイン必須。未ログインは `CurrentUser` がログインページへリダイレクトする。
pub async fn home(
    CurrentUser(user): CurrentUser,
    session: Session,
) -> Result<Html<String>, AppError> {
    let messages = FlashMessage::drain(&session).await?;
    Ok(pages::registration::home(&user.email, &messages))
}
