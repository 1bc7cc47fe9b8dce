use std::sync::Arc;

use secrecy::ExposeSecret;

use crate::config::Config;
use crate::repositories::UserRepository;
use crate::services::{AuthService, EmailService, PasswordResetTokenGenerator};

/// アプリケーション共有状態
///
/// axum の State として全ハンドラーで共有される。
/// Clone は必須（axum が内部で clone するため）。
#[derive(Clone)]
pub struct AppState {
    /// アプリケーション設定（Arc で共有）
    pub config: Arc<Config>,
    /// ユーザーリポジトリ（PostgreSQL またはインメモリ）
    pub user_repo: Arc<dyn UserRepository>,
    /// メールサービス
    pub email_service: EmailService,
}

impl AppState {
    /// 新しい AppState を作成
    pub fn new(user_repo: Arc<dyn UserRepository>, config: Config) -> Self {
        let config = Arc::new(config);
        let email_service = EmailService::new(config.clone());

        Self {
            config,
            user_repo,
            email_service,
        }
    }

    pub fn secret_key(&self) -> &str {
        self.config.secret_key.expose_secret()
    }

    pub fn auth_service(&self) -> AuthService {
        AuthService::new(self.user_repo.clone())
    }

    pub fn token_generator(&self) -> PasswordResetTokenGenerator {
        PasswordResetTokenGenerator::new(self.secret_key(), self.config.password_reset_timeout_secs)
    }
}
