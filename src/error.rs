use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::pages;
use crate::repositories::RepositoryError;

/// インフラ層のエラー
///
/// 入力値の不備はエラーではなく `FormErrors` としてフォームに再表示する。
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("リポジトリエラー")]
    Repository(#[from] RepositoryError),

    #[error("セッションエラー")]
    Session(#[from] tower_sessions::session::Error),

    #[error("メール送信エラー: {0}")]
    Email(String),

    #[error("内部エラー")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            Self::Repository(e) => {
                tracing::error!(error = ?e, "リポジトリエラー");
            }
            Self::Session(e) => {
                tracing::error!(error = ?e, "セッションエラー");
            }
            Self::Email(e) => {
                tracing::error!(error = %e, "メール送信エラー");
            }
            Self::Internal(e) => {
                tracing::error!(error = ?e, "内部エラー");
            }
        }

        (StatusCode::INTERNAL_SERVER_ERROR, pages::server_error()).into_response()
    }
}
