//! パスワード強度の検証

pub const MIN_LENGTH: usize = 8;

pub const TOO_SHORT: &str =
    "This password is too short. It must contain at least 8 characters.";
pub const TOO_COMMON: &str = "This password is too common.";
pub const ENTIRELY_NUMERIC: &str = "This password is entirely numeric.";
pub const TOO_SIMILAR: &str = "The password is too similar to the email.";

/// 類似判定に使う email 断片の最小長
const MIN_FRAGMENT_LENGTH: usize = 3;

const COMMON_PASSWORDS: &[&str] = &[
    "password",
    "password1",
    "password12",
    "password123",
    "passw0rd",
    "12345678",
    "123456789",
    "1234567890",
    "87654321",
    "11111111",
    "00000000",
    "qwertyui",
    "qwerty123",
    "qwertyuiop",
    "1q2w3e4r",
    "1qaz2wsx",
    "zaq12wsx",
    "asdfghjkl",
    "iloveyou",
    "sunshine",
    "princess",
    "football",
    "baseball",
    "superman",
    "starwars",
    "whatever",
    "trustno1",
    "letmein1",
    "welcome1",
    "computer",
    "michelle",
    "jennifer",
    "liverpool",
    "abc12345",
    "abcd1234",
    "changeme",
    "administrator",
];

/// パスワードを検証し、違反したルールのメッセージをすべて返す
pub fn validate_password(password: &str, email: Option<&str>) -> Vec<String> {
    let mut errors = Vec::new();

    if let Some(email) = email
        && is_too_similar(password, email)
    {
        errors.push(TOO_SIMILAR.to_string());
    }

    if password.chars().count() < MIN_LENGTH {
        errors.push(TOO_SHORT.to_string());
    }

    if COMMON_PASSWORDS.contains(&password.trim().to_lowercase().as_str()) {
        errors.push(TOO_COMMON.to_string());
    }

    if password.chars().all(|c| c.is_ascii_digit()) {
        errors.push(ENTIRELY_NUMERIC.to_string());
    }

    errors
}

/// email のローカル部分との類似判定
fn is_too_similar(password: &str, email: &str) -> bool {
    let password = password.to_lowercase();
    let local = email
        .rsplit_once('@')
        .map(|(local, _)| local)
        .unwrap_or(email)
        .to_lowercase();

    if password.chars().count() >= MIN_FRAGMENT_LENGTH && local.contains(&password) {
        return true;
    }

    std::iter::once(local.as_str())
        .chain(local.split(|c: char| !c.is_alphanumeric()))
        .filter(|fragment| fragment.chars().count() >= MIN_FRAGMENT_LENGTH)
        .any(|fragment| password.contains(fragment))
}
