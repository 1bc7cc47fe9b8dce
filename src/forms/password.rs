use serde::Deserialize;

use super::{FormErrors, REQUIRED, clean_email, clean_new_passwords};

/// パスワード変更フォーム（ログイン必須）
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PasswordChangeForm {
    pub old_password: String,
    pub new_password1: String,
    pub new_password2: String,
}

impl PasswordChangeForm {
    /// 現在のパスワードの照合はハンドラー側
    pub fn validate(&self, email: &str) -> FormErrors {
        let mut errors = FormErrors::new();

        if self.old_password.is_empty() {
            errors.add("old_password", REQUIRED);
        }
        clean_new_passwords(
            &mut errors,
            ("new_password1", self.new_password1.as_str()),
            ("new_password2", self.new_password2.as_str()),
            Some(email),
        );

        errors
    }
}

/// パスワードリセット申請フォーム
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PasswordResetForm {
    pub email: String,
}

impl PasswordResetForm {
    pub fn email(&self) -> &str {
        self.email.trim()
    }

    pub fn validate(&self) -> FormErrors {
        let mut errors = FormErrors::new();
        clean_email(&mut errors, "email", self.email());
        errors
    }
}

/// 新しいパスワード設定フォーム（リセット確認）
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SetPasswordForm {
    pub new_password1: String,
    pub new_password2: String,
}

impl SetPasswordForm {
    pub fn validate(&self, email: &str) -> FormErrors {
        let mut errors = FormErrors::new();
        clean_new_passwords(
            &mut errors,
            ("new_password1", self.new_password1.as_str()),
            ("new_password2", self.new_password2.as_str()),
            Some(email),
        );
        errors
    }
}
