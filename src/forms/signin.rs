use serde::Deserialize;

use super::{FormErrors, REQUIRED};

/// ログインフォーム
///
/// email をユーザー名として扱うため、フィールド名は `username`
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SigninForm {
    pub username: String,
    pub password: String,
    /// ログイン後のリダイレクト先
    pub next: Option<String>,
}

impl SigninForm {
    pub fn username(&self) -> &str {
        self.username.trim()
    }

    /// 必須チェックのみ（認証情報の照合はハンドラー側）
    pub fn validate(&self) -> FormErrors {
        let mut errors = FormErrors::new();

        if self.username().is_empty() {
            errors.add("username", REQUIRED);
        }
        if self.password.is_empty() {
            errors.add("password", REQUIRED);
        }

        errors
    }
}
