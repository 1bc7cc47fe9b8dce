pub mod memory;
pub mod user;

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::models::User;

pub use memory::MemoryUserRepository;
pub use user::PgUserRepository;

/// リポジトリ層のエラー
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// email の UNIQUE 制約違反
    #[error("email already exists")]
    EmailAlreadyExists,

    #[error("database error")]
    Database(#[from] sqlx::Error),
}

/// ユーザーアカウントの永続化
///
/// 本番は PostgreSQL（`PgUserRepository`）、テストとDB未設定時はインメモリ（`MemoryUserRepository`）。
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// ストレージ種別（ヘルスチェック表示用）
    fn backend(&self) -> &'static str;

    /// ストレージへの疎通確認
    async fn ping(&self) -> Result<(), RepositoryError>;

    /// メールアドレス（完全一致）でユーザーを検索
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError>;

    /// メールアドレス（大文字小文字を区別しない）でユーザーを検索
    ///
    /// パスワードリセットで使用する。
    async fn find_all_by_email_ignore_case(&self, email: &str)
    -> Result<Vec<User>, RepositoryError>;

    /// ユーザーIDでユーザーを検索
    async fn find_by_id(&self, user_id: Uuid) -> Result<Option<User>, RepositoryError>;

    /// 新しいユーザーを作成
    ///
    /// # Errors
    /// - email 重複時: `RepositoryError::EmailAlreadyExists`
    async fn create_user(&self, email: &str, password_hash: &str)
    -> Result<User, RepositoryError>;

    /// パスワードハッシュを更新
    async fn update_password(
        &self,
        user_id: Uuid,
        new_password_hash: &str,
    ) -> Result<(), RepositoryError>;

    /// 最終ログイン日時を更新
    async fn update_last_login(
        &self,
        user_id: Uuid,
        at: OffsetDateTime,
    ) -> Result<(), RepositoryError>;
}
