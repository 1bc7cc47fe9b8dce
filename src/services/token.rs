//! パスワードリセットトークン
//!
//! トークンは DB に保存しない。ユーザーの状態（パスワードハッシュ・最終ログイン日時・email）と
//! 発行時刻から HMAC で導出するため、パスワード変更・ログイン・期限切れで自動的に無効になる。
//!
//! 形式: `<発行時刻(2001-01-01からの秒数, base36)>-<HMAC-SHA256(base64url)>`

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha256};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::User;

pub(crate) type HmacSha256 = Hmac<Sha256>;

const RESET_TOKEN_SALT: &str = "oxaccount.password_reset.token";

/// 2001-01-01T00:00:00Z の UNIX 時刻
const TOKEN_EPOCH: i64 = 978_307_200;

/// base36 で i64 を超えない桁数
const MAX_TIMESTAMP_DIGITS: usize = 12;

/// ソルト付き HMAC-SHA256
///
/// 鍵は SHA256(key_salt || secret)。用途ごとにソルトを変えて鍵を分離する。
pub(crate) fn salted_hmac(
    key_salt: &str,
    value: &[u8],
    secret: &str,
) -> Result<HmacSha256, AppError> {
    let key = Sha256::new()
        .chain_update(key_salt.as_bytes())
        .chain_update(secret.as_bytes())
        .finalize();
    let mut mac = HmacSha256::new_from_slice(&key).map_err(|e| {
        tracing::error!(error = %e, "HMAC 鍵の初期化エラー");
        AppError::Internal(anyhow::anyhow!("hmac key error"))
    })?;
    mac.update(value);
    Ok(mac)
}

/// ユーザーIDを URL 埋め込み用にエンコード
pub fn encode_uid(user_id: Uuid) -> String {
    URL_SAFE_NO_PAD.encode(user_id.to_string())
}

/// `encode_uid` の逆変換。不正な値は `None`
pub fn decode_uid(uidb64: &str) -> Option<Uuid> {
    let bytes = URL_SAFE_NO_PAD.decode(uidb64).ok()?;
    let text = String::from_utf8(bytes).ok()?;
    Uuid::parse_str(&text).ok()
}

fn int_to_base36(mut value: i64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value <= 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

/// `int_to_base36` の出力形式のみ受け付ける（符号・大文字・先頭ゼロは拒否）
fn base36_to_int(value: &str) -> Option<i64> {
    if value.is_empty() || value.len() > MAX_TIMESTAMP_DIGITS {
        return None;
    }
    if !value
        .bytes()
        .all(|b| b.is_ascii_digit() || b.is_ascii_lowercase())
    {
        return None;
    }
    if value.len() > 1 && value.starts_with('0') {
        return None;
    }
    i64::from_str_radix(value, 36).ok()
}

/// パスワードリセットトークン生成器
pub struct PasswordResetTokenGenerator {
    secret_key: SecretString,
    timeout_secs: i64,
}

impl PasswordResetTokenGenerator {
    pub fn new(secret_key: &str, timeout_secs: i64) -> Self {
        Self {
            secret_key: SecretString::from(secret_key.to_string()),
            timeout_secs,
        }
    }

    /// 現在時刻でトークンを発行
    pub fn make_token(&self, user: &User) -> Result<String, AppError> {
        self.make_token_at(user, OffsetDateTime::now_utc())
    }

    /// 指定時刻でトークンを発行
    pub fn make_token_at(&self, user: &User, now: OffsetDateTime) -> Result<String, AppError> {
        let timestamp = now.unix_timestamp() - TOKEN_EPOCH;
        let mac = self.token_mac(user, timestamp)?;
        Ok(format!(
            "{}-{}",
            int_to_base36(timestamp),
            URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes())
        ))
    }

    /// トークンを検証（現在時刻）
    pub fn check_token(&self, user: &User, token: &str) -> bool {
        self.check_token_at(user, token, OffsetDateTime::now_utc())
    }

    /// トークンを検証
    ///
    /// 署名不一致・期限切れ・形式不正はすべて `false`
    pub fn check_token_at(&self, user: &User, token: &str, now: OffsetDateTime) -> bool {
        let Some((ts_b36, signature)) = token.split_once('-') else {
            return false;
        };
        let Some(timestamp) = base36_to_int(ts_b36) else {
            return false;
        };
        let Ok(signature) = URL_SAFE_NO_PAD.decode(signature) else {
            return false;
        };
        let Ok(mac) = self.token_mac(user, timestamp) else {
            return false;
        };

        // 定数時間比較
        if mac.verify_slice(&signature).is_err() {
            return false;
        }

        let elapsed = now.unix_timestamp() - TOKEN_EPOCH - timestamp;
        elapsed <= self.timeout_secs
    }

    /// パスワードハッシュ・最終ログイン日時・email を含めた HMAC
    fn token_mac(&self, user: &User, timestamp: i64) -> Result<HmacSha256, AppError> {
        let login_timestamp = user
            .last_login
            .map(|t| t.unix_timestamp().to_string())
            .unwrap_or_default();
        let value = format!(
            "{}{}{}{}{}",
            user.id, user.password_hash, login_timestamp, timestamp, user.email
        );
        salted_hmac(
            RESET_TOKEN_SALT,
            value.as_bytes(),
            self.secret_key.expose_secret(),
        )
    }
}
