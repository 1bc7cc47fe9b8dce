use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use crate::error::AppError;

/// リセット確認中のトークン
///
/// リンクのトークンを検証後セッションへ移し、URL からはトークンを外す。
pub const SESSION_RESET_TOKEN_KEY: &str = "oxaccount:password_reset:token";

#[derive(Default, Deserialize, Serialize, Debug)]
pub struct SessionResetToken(pub String);

impl SessionResetToken {
    pub async fn insert(session: &Session, token: &str) -> Result<(), AppError> {
        session
            .insert(SESSION_RESET_TOKEN_KEY, SessionResetToken(token.to_string()))
            .await?;

        Ok(())
    }

    pub async fn get(session: &Session) -> Result<Option<String>, AppError> {
        Ok(session
            .get::<SessionResetToken>(SESSION_RESET_TOKEN_KEY)
            .await?
            .map(|SessionResetToken(token)| token))
    }

    pub async fn remove(session: &Session) -> Result<(), AppError> {
        session
            .remove::<SessionResetToken>(SESSION_RESET_TOKEN_KEY)
            .await?;

        Ok(())
    }
}
