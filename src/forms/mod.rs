//! フォームの入力検証
//!
//! 入力の不備はエラーではなく `FormErrors` として返し、ハンドラーがフォームを再表示する。

pub mod password;
pub mod signin;
pub mod signup;
pub mod validators;

use std::collections::BTreeMap;

use garde::Validate;

pub use password::{PasswordChangeForm, PasswordResetForm, SetPasswordForm};
pub use signin::SigninForm;
pub use signup::SignupForm;

pub const REQUIRED: &str = "This field is required.";
pub const INVALID_EMAIL: &str = "Enter a valid email address.";
pub const PASSWORD_MISMATCH: &str = "The two password fields didn’t match.";
pub const EMAIL_EXISTS: &str = "User with this Email already exists.";
pub const INVALID_LOGIN: &str =
    "Please enter a correct email and password. Note that both fields may be case-sensitive.";
pub const PASSWORD_INCORRECT: &str =
    "Your old password was entered incorrectly. Please enter it again.";

/// email フィールドの最大長
pub const EMAIL_MAX_LENGTH: usize = 254;

/// フィールドごとのエラーとフォーム全体のエラー
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FormErrors {
    fields: BTreeMap<String, Vec<String>>,
    non_field: Vec<String>,
}

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.fields
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn add_non_field(&mut self, message: impl Into<String>) {
        self.non_field.push(message.into());
    }

    pub fn field(&self, field: &str) -> &[String] {
        self.fields.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has_field(&self, field: &str) -> bool {
        !self.field(field).is_empty()
    }

    pub fn non_field(&self) -> &[String] {
        &self.non_field
    }

    /// エラーのあるフィールド名
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.non_field.is_empty()
    }
}

#[derive(Validate)]
struct EmailAddress {
    #[garde(email)]
    value: String,
}

/// email フィールドの検証（空白除去済みの値を渡す）
pub(crate) fn clean_email(errors: &mut FormErrors, field: &str, email: &str) {
    if email.is_empty() {
        errors.add(field, REQUIRED);
        return;
    }

    let length = email.chars().count();
    if length > EMAIL_MAX_LENGTH {
        errors.add(
            field,
            format!(
                "Ensure this value has at most {} characters (it has {}).",
                EMAIL_MAX_LENGTH, length
            ),
        );
    }

    let address = EmailAddress {
        value: email.to_string(),
    };
    let domain_ok = email
        .rsplit_once('@')
        .is_some_and(|(_, domain)| is_valid_domain(domain));
    if address.validate().is_err() || !domain_ok {
        errors.add(field, INVALID_EMAIL);
    }
}

/// ドットなしで許可するドメイン
const DOMAIN_ALLOWLIST: &[&str] = &["localhost"];

/// email のドメイン部分の検証
///
/// ラベルは英数字とハイフン（先頭・末尾のハイフン不可、63文字以内）、
/// トップレベルは2文字以上の英字または `xn--` 形式。ドットのないドメインは許可リストのみ。
fn is_valid_domain(domain: &str) -> bool {
    if DOMAIN_ALLOWLIST.contains(&domain.to_ascii_lowercase().as_str()) {
        return true;
    }
    // IP リテラル（`[127.0.0.1]`）は garde の検証に任せる
    if domain.starts_with('[') && domain.ends_with(']') {
        return true;
    }

    let domain = domain.strip_suffix('.').unwrap_or(domain);
    let labels: Vec<&str> = domain.split('.').collect();
    let [hosts @ .., tld] = labels.as_slice() else {
        return false;
    };
    if hosts.is_empty() {
        return false;
    }

    let tld_ok = is_valid_label(tld)
        && ((tld.len() >= 2 && tld.bytes().all(|b| b.is_ascii_alphabetic()))
            || tld.to_ascii_lowercase().starts_with("xn--"));

    tld_ok && hosts.iter().all(|label| is_valid_label(label))
}

fn is_valid_label(label: &str) -> bool {
    (1..=63).contains(&label.len())
        && !label.starts_with('-')
        && !label.ends_with('-')
        && label.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-')
}

/// 新しいパスワードと確認用パスワードの検証
///
/// 不一致・パスワード強度のエラーは確認用フィールドに付ける。
pub(crate) fn clean_new_passwords(
    errors: &mut FormErrors,
    (field1, password1): (&str, &str),
    (field2, password2): (&str, &str),
    email: Option<&str>,
) {
    if password1.is_empty() {
        errors.add(field1, REQUIRED);
    }
    if password2.is_empty() {
        errors.add(field2, REQUIRED);
    }
    if password1.is_empty() || password2.is_empty() {
        return;
    }

    if password1 != password2 {
        errors.add(field2, PASSWORD_MISMATCH);
        return;
    }

    for message in validators::validate_password(password2, email) {
        errors.add(field2, message);
    }
}

/// email のドメイン部分を小文字化
pub fn normalize_email(email: &str) -> String {
    match email.rsplit_once('@') {
        Some((local, domain)) => format!("{}@{}", local, domain.to_lowercase()),
        None => email.to_string(),
    }
}
