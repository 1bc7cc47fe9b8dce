use std::sync::{Arc, OnceLock};

use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use hmac::Mac;

use crate::error::AppError;
use crate::models::User;
use crate::repositories::UserRepository;
use crate::services::token::salted_hmac;

const SESSION_AUTH_HASH_SALT: &str = "oxaccount.session.auth_hash";

/// パスワードをargon2idでハッシュ化
pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| {
            tracing::error!(error = ?e, "パスワードハッシュ生成エラー");
            AppError::Internal(anyhow::anyhow!("password hash error"))
        })?;
    Ok(hash.to_string())
}

/// パスワードを検証
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|e| {
        tracing::error!(error = ?e, "パスワードハッシュのパースエラー");
        AppError::Internal(anyhow::anyhow!("password hash parse error"))
    })?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// セッションに保存する認証ハッシュ
///
/// パスワードハッシュが変わると一致しなくなり、既存セッションが無効になる。
pub fn session_auth_hash(secret_key: &str, password_hash: &str) -> Result<String, AppError> {
    let mac = salted_hmac(SESSION_AUTH_HASH_SALT, password_hash.as_bytes(), secret_key)?;
    Ok(URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes()))
}

/// セッションの認証ハッシュを定数時間で検証
pub fn verify_session_auth_hash(secret_key: &str, password_hash: &str, stored: &str) -> bool {
    let Ok(stored) = URL_SAFE_NO_PAD.decode(stored) else {
        return false;
    };
    match salted_hmac(SESSION_AUTH_HASH_SALT, password_hash.as_bytes(), secret_key) {
        Ok(mac) => mac.verify_slice(&stored).is_ok(),
        Err(_) => false,
    }
}

/// ユーザー不在時に検証するダミーハッシュ（初回使用時に生成）
fn dummy_hash() -> Option<&'static str> {
    static DUMMY_HASH: OnceLock<Option<String>> = OnceLock::new();
    DUMMY_HASH
        .get_or_init(|| hash_password("oxaccount-dummy-password").ok())
        .as_deref()
}

/// 認証サービス
#[derive(Clone)]
pub struct AuthService {
    user_repo: Arc<dyn UserRepository>,
}

impl AuthService {
    /// 新しい AuthService を作成
    pub fn new(user_repo: Arc<dyn UserRepository>) -> Self {
        Self { user_repo }
    }

    /// ユーザー認証を実行
    ///
    /// 認証情報が一致しない場合は `Ok(None)`。
    /// タイミング攻撃対策: ユーザーが存在しない場合もダミーのパスワード検証を実行
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<Option<User>, AppError> {
        let user = self.user_repo.find_by_email(email).await?;

        match user {
            Some(user) => {
                if verify_password(password, &user.password_hash)? {
                    tracing::info!(email = %email, "認証成功");
                    Ok(Some(user))
                } else {
                    tracing::warn!(email = %email, "認証失敗: パスワード不一致");
                    Ok(None)
                }
            }
            None => {
                if let Some(hash) = dummy_hash() {
                    let _ = verify_password(password, hash);
                }
                tracing::warn!(email = %email, "認証失敗: ユーザー不在");
                Ok(None)
            }
        }
    }
}
