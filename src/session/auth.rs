//! ログインセッション
//!
//! セッションにはユーザーIDとパスワードハッシュ由来の認証ハッシュを保存する。
//! パスワードが別経路で変更されると認証ハッシュが一致しなくなり、セッションは破棄される。

use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tower_sessions::Session;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::User;
use crate::services::auth::{session_auth_hash, verify_session_auth_hash};
use crate::state::AppState;
use crate::urls::login_redirect_for;

pub const SESSION_AUTH_KEY: &str = "oxaccount:auth";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionAuth {
    pub user_id: Uuid,
    pub auth_hash: String,
}

impl SessionAuth {
    /// ログイン状態にする
    ///
    /// セッション固定攻撃対策としてセッションIDを更新し、最終ログイン日時を記録する。
    pub async fn login(session: &Session, state: &AppState, user: &User) -> Result<(), AppError> {
        session.cycle_id().await?;
        Self::insert(session, state, user).await?;

        state
            .user_repo
            .update_last_login(user.id, OffsetDateTime::now_utc())
            .await?;

        tracing::info!(user_id = %user.id, "ログイン完了");

        Ok(())
    }

    /// 認証ハッシュを保存（パスワード変更後の再発行にも使用）
    pub async fn insert(session: &Session, state: &AppState, user: &User) -> Result<(), AppError> {
        let auth = SessionAuth {
            user_id: user.id,
            auth_hash: session_auth_hash(state.secret_key(), &user.password_hash)?,
        };
        session.insert(SESSION_AUTH_KEY, auth).await?;

        Ok(())
    }

    /// セッションを破棄
    pub async fn logout(session: &Session) -> Result<(), AppError> {
        session.flush().await?;
        Ok(())
    }

    /// ログイン中のユーザーを取得
    ///
    /// ユーザーが消えている、または認証ハッシュが一致しない場合はセッションを破棄して `None`
    pub async fn current_user(
        session: &Session,
        state: &AppState,
    ) -> Result<Option<User>, AppError> {
        let Some(auth) = session.get::<SessionAuth>(SESSION_AUTH_KEY).await? else {
            return Ok(None);
        };

        let user = state.user_repo.find_by_id(auth.user_id).await?;
        let Some(user) = user else {
            tracing::warn!(user_id = %auth.user_id, "セッションのユーザーが存在しない");
            session.flush().await?;
            return Ok(None);
        };

        if !verify_session_auth_hash(state.secret_key(), &user.password_hash, &auth.auth_hash) {
            tracing::info!(user_id = %user.id, "パスワード変更によりセッション無効");
            session.flush().await?;
            return Ok(None);
        }

        Ok(Some(user))
    }
}

/// ログイン必須のハンドラーで使う extractor
///
/// 未ログインの場合はログインページへリダイレクトする（ホーム以外は `next` 付き）。
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(IntoResponse::into_response)?;

        match SessionAuth::current_user(&session, state).await {
            Ok(Some(user)) => Ok(CurrentUser(user)),
            Ok(None) => {
                let next = parts
                    .uri
                    .path_and_query()
                    .map(|p| p.as_str())
                    .unwrap_or("/");
                Err(Redirect::to(&login_redirect_for(next)).into_response())
            }
            Err(e) => Err(e.into_response()),
        }
    }
}
