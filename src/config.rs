use secrecy::SecretBox;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
    /// 未設定の場合はインメモリストアで起動する
    #[serde(default)]
    pub database_url: Option<SecretBox<String>>,
    /// リセットトークンとセッション認証ハッシュの HMAC キー
    pub secret_key: SecretBox<String>,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,

    // サイト設定（リセットメールのリンク生成に使用）
    #[serde(default = "default_site_url")]
    pub site_url: String,
    #[serde(default = "default_site_name")]
    pub site_name: String,

    // パスワードリセット設定
    #[serde(default = "default_password_reset_timeout_secs")]
    pub password_reset_timeout_secs: i64,

    // セッション設定
    #[serde(default = "default_session_expiry_secs")]
    pub session_expiry_secs: i64,
    #[serde(default)]
    pub secure_cookies: bool,

    // SMTP設定（オプション - email機能有効時のみ使用）
    #[serde(default)]
    pub smtp_host: Option<String>,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    pub smtp_username: Option<SecretBox<String>>,
    pub smtp_password: Option<SecretBox<String>>,
    #[serde(default)]
    pub smtp_from_address: Option<String>,
}

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_SITE_URL: &str = "http://localhost:3000";
const DEFAULT_SITE_NAME: &str = "oxaccount";
const DEFAULT_SMTP_PORT: u16 = 587;
/// 3日間
const DEFAULT_PASSWORD_RESET_TIMEOUT_SECS: i64 = 259_200;
/// 2週間
const DEFAULT_SESSION_EXPIRY_SECS: i64 = 1_209_600;

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_site_url() -> String {
    DEFAULT_SITE_URL.to_string()
}

fn default_site_name() -> String {
    DEFAULT_SITE_NAME.to_string()
}

fn default_smtp_port() -> u16 {
    DEFAULT_SMTP_PORT
}

fn default_password_reset_timeout_secs() -> i64 {
    DEFAULT_PASSWORD_RESET_TIMEOUT_SECS
}

fn default_session_expiry_secs() -> i64 {
    DEFAULT_SESSION_EXPIRY_SECS
}

impl Config {
    pub fn load() -> Result<Self, envy::Error> {
        envy::from_env()
    }

    /// テスト・ローカル実行用の設定（DBなし、SMTPなし）
    pub fn for_secret_key(secret_key: &str) -> Self {
        Self {
            database_url: None,
            secret_key: SecretBox::new(Box::new(secret_key.to_string())),
            host: default_host(),
            port: default_port(),
            site_url: default_site_url(),
            site_name: default_site_name(),
            password_reset_timeout_secs: default_password_reset_timeout_secs(),
            session_expiry_secs: default_session_expiry_secs(),
            secure_cookies: false,
            smtp_host: None,
            smtp_port: default_smtp_port(),
            smtp_username: None,
            smtp_password: None,
            smtp_from_address: None,
        }
    }
}
