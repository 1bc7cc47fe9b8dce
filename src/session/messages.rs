//! フラッシュメッセージ
//!
//! リダイレクト前にセッションへ積み、次にページを描画したときに取り出して消す。

use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use crate::error::AppError;

pub const SESSION_MESSAGES_KEY: &str = "oxaccount:messages";

/// メッセージレベル
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Level {
    Debug,
    Info,
    Success,
    Warning,
    Error,
}

impl Level {
    /// 表示用の CSS クラス
    pub fn tag(self) -> &'static str {
        match self {
            Self::Debug => "alert-secondary",
            Self::Info => "alert-info",
            Self::Success => "alert-success",
            Self::Warning => "alert-warning",
            Self::Error => "alert-danger",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashMessage {
    pub level: Level,
    pub text: String,
}

impl FlashMessage {
    pub fn tags(&self) -> &'static str {
        self.level.tag()
    }

    /// メッセージをセッションに追加
    pub async fn push(
        session: &Session,
        level: Level,
        text: impl Into<String>,
    ) -> Result<(), AppError> {
        let mut messages: Vec<FlashMessage> = session
            .get(SESSION_MESSAGES_KEY)
            .await?
            .unwrap_or_default();
        messages.push(FlashMessage {
            level,
            text: text.into(),
        });
        session.insert(SESSION_MESSAGES_KEY, messages).await?;

        Ok(())
    }

    /// 溜まっているメッセージを取り出して削除
    pub async fn drain(session: &Session) -> Result<Vec<FlashMessage>, AppError> {
        let messages = session
            .remove::<Vec<FlashMessage>>(SESSION_MESSAGES_KEY)
            .await?
            .unwrap_or_default();

        Ok(messages)
    }
}
