use serde::Deserialize;

use super::{FormErrors, clean_email, clean_new_passwords, normalize_email};

/// サインアップフォーム
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SignupForm {
    pub email: String,
    pub password1: String,
    pub password2: String,
}

impl SignupForm {
    /// 正規化済みの email
    pub fn email(&self) -> String {
        normalize_email(self.email.trim())
    }

    /// DB を参照しない検証（email 重複はハンドラー側で確認）
    pub fn validate(&self) -> FormErrors {
        let mut errors = FormErrors::new();
        let email = self.email();

        clean_email(&mut errors, "email", &email);
        let email = (!errors.has_field("email")).then_some(email.as_str());
        clean_new_passwords(
            &mut errors,
            ("password1", self.password1.as_str()),
            ("password2", self.password2.as_str()),
            email,
        );

        errors
    }
}
