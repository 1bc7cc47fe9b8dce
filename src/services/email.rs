use std::sync::Arc;

use tokio::sync::Mutex;

use crate::config::Config;
use crate::error::AppError;

/// 送信したメール
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// メール送信サービス
///
/// `email` feature 有効かつ SMTP 設定済みの場合のみ実際に送信する。
/// それ以外はログ出力のみ（開発モード）。
/// outbox 付きで作成した場合は送信せず outbox に記録する。
#[derive(Clone)]
pub struct EmailService {
    config: Arc<Config>,
    outbox: Option<Arc<Mutex<Vec<OutgoingEmail>>>>,
}

impl EmailService {
    /// 新しい EmailService を作成
    pub fn new(config: Arc<Config>) -> Self {
        Self {
            config,
            outbox: None,
        }
    }

    /// 送信内容を outbox に記録する EmailService を作成
    pub fn with_outbox(config: Arc<Config>) -> Self {
        Self {
            config,
            outbox: Some(Arc::new(Mutex::new(Vec::new()))),
        }
    }

    /// outbox に記録されたメール（outbox なしの場合は空）
    pub async fn outbox(&self) -> Vec<OutgoingEmail> {
        match &self.outbox {
            Some(outbox) => outbox.lock().await.clone(),
            None => Vec::new(),
        }
    }

    /// パスワードリセットメールを送信
    pub async fn send_password_reset_email(
        &self,
        to: &str,
        reset_url: &str,
    ) -> Result<(), AppError> {
        let subject = format!("Password reset on {}", self.config.site_name);
        let body = format!(
            "You're receiving this email because you requested a password reset \
             for your user account at {site}.\n\n\
             Please go to the following page and choose a new password:\n\n\
             {url}\n\n\
             Your username, in case you've forgotten: {to}\n\n\
             Thanks for using our site!\n\n\
             The {site} team\n",
            site = self.config.site_name,
            url = reset_url,
            to = to,
        );

        if let Some(outbox) = &self.outbox {
            outbox.lock().await.push(OutgoingEmail {
                to: to.to_string(),
                subject,
                body,
            });
            return Ok(());
        }

        if self.smtp_configured() {
            return self.send(to, &subject, body).await;
        }

        // 開発モード: メール送信せずログ出力のみ（リンクはトークンを含むため出力しない）
        tracing::info!(to = %to, subject = %subject, "パスワードリセットメール送信（開発モード）");

        Ok(())
    }

    fn smtp_configured(&self) -> bool {
        cfg!(feature = "email")
            && self.config.smtp_host.is_some()
            && self.config.smtp_from_address.is_some()
    }

    #[cfg(feature = "email")]
    async fn send(&self, to: &str, subject: &str, body: String) -> Result<(), AppError> {
        use lettre::message::header::ContentType;
        use lettre::transport::smtp::authentication::Credentials;
        use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
        use secrecy::ExposeSecret;

        let (Some(host), Some(from)) = (&self.config.smtp_host, &self.config.smtp_from_address)
        else {
            return Err(AppError::Email("SMTP is not configured".to_string()));
        };

        let message = Message::builder()
            .from(from.parse().map_err(|e| AppError::Email(format!("{e}")))?)
            .to(to.parse().map_err(|e| AppError::Email(format!("{e}")))?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body)
            .map_err(|e| AppError::Email(e.to_string()))?;

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
            .map_err(|e| AppError::Email(e.to_string()))?
            .port(self.config.smtp_port);

        if let (Some(username), Some(password)) =
            (&self.config.smtp_username, &self.config.smtp_password)
        {
            builder = builder.credentials(Credentials::new(
                username.expose_secret().clone(),
                password.expose_secret().clone(),
            ));
        }

        builder
            .build()
            .send(message)
            .await
            .map_err(|e| AppError::Email(e.to_string()))?;

        tracing::info!(to = %to, "パスワードリセットメール送信完了");

        Ok(())
    }

    #[cfg(not(feature = "email"))]
    async fn send(&self, to: &str, subject: &str, _body: String) -> Result<(), AppError> {
        tracing::info!(to = %to, subject = %subject, "email feature 無効のため送信をスキップ");
        Ok(())
    }
}
