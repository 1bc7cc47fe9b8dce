#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use tower::ServiceExt;

use oxaccount::{
    config::Config,
    models::User,
    pages::escape,
    repositories::{MemoryUserRepository, UserRepository},
    router::create_router,
    services::auth::hash_password,
    services::{EmailService, OutgoingEmail},
    services::token::encode_uid,
    state::AppState,
    urls::password_reset_confirm_url,
};

pub const TEST_SECRET_KEY: &str = "test-secret-key";

/// インメモリリポジトリとメモリセッションで組んだアプリ
///
/// ブラウザと同様にセッション Cookie をリクエスト間で引き継ぐ。
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub repo: Arc<MemoryUserRepository>,
    cookie: Option<String>,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub location: Option<String>,
    pub body: String,
}

impl TestApp {
    pub fn new() -> Self {
        let repo = Arc::new(MemoryUserRepository::new());
        let mut state = AppState::new(repo.clone(), Config::for_secret_key(TEST_SECRET_KEY));
        state.email_service = EmailService::with_outbox(state.config.clone());
        let router = create_router(state.clone());

        Self {
            router,
            state,
            repo,
            cookie: None,
        }
    }

    /// 同じアプリに別ブラウザ（Cookie なし）として接続
    pub fn new_client(&self) -> Self {
        Self {
            router: self.router.clone(),
            state: self.state.clone(),
            repo: self.repo.clone(),
            cookie: None,
        }
    }

    /// パスワードをハッシュ化してユーザーを直接作成
    pub async fn create_user(&self, email: &str, password: &str) -> User {
        let hash = hash_password(password).unwrap();
        self.repo.create_user(email, &hash).await.unwrap()
    }

    pub async fn find_user(&self, email: &str) -> Option<User> {
        self.repo.find_by_email(email).await.unwrap()
    }

    /// 送信されたメール
    pub async fn sent_emails(&self) -> Vec<OutgoingEmail> {
        self.state.email_service.outbox().await
    }

    /// リセットメールに載るものと同じ確認 URL（パスのみ）
    pub async fn reset_link(&self, email: &str) -> String {
        let user = self.find_user(email).await.unwrap();
        let token = self.state.token_generator().make_token(&user).unwrap();
        password_reset_confirm_url(&encode_uid(user.id), &token)
    }

    pub fn has_session_cookie(&self) -> bool {
        self.cookie.is_some()
    }

    pub async fn get(&mut self, uri: &str) -> TestResponse {
        let request = self.request("GET", uri).body(Body::empty()).unwrap();
        self.send(request).await
    }

    pub async fn post(&mut self, uri: &str, fields: &[(&str, &str)]) -> TestResponse {
        let body = fields
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");
        let request = self
            .request("POST", uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }

    /// POST してリダイレクトを1回たどる
    pub async fn post_follow(&mut self, uri: &str, fields: &[(&str, &str)]) -> TestResponse {
        let response = self.post(uri, fields).await;
        match response.location.clone() {
            Some(location) => self.get(&location).await,
            None => response,
        }
    }

    /// ログインしてセッションを確立
    pub async fn login(&mut self, email: &str, password: &str) -> TestResponse {
        self.post(
            "/registration/login/",
            &[("username", email), ("password", password)],
        )
        .await
    }

    fn request(&self, method: &str, uri: &str) -> axum::http::request::Builder {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = &self.cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder
    }

    async fn send(&mut self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();

        if let Some(set_cookie) = response.headers().get(header::SET_COOKIE) {
            let pair = set_cookie
                .to_str()
                .unwrap()
                .split(';')
                .next()
                .unwrap()
                .trim()
                .to_string();
            let cleared = pair.ends_with('=') || set_cookie.to_str().unwrap().contains("Max-Age=0");
            self.cookie = if cleared { None } else { Some(pair) };
        }

        let status = response.status();
        let location = response
            .headers()
            .get(header::LOCATION)
            .map(|v| v.to_str().unwrap().to_string());
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();

        TestResponse {
            status,
            location,
            body: String::from_utf8(bytes.to_vec()).unwrap(),
        }
    }
}

impl TestResponse {
    pub fn assert_template(&self, template: &str) {
        let marker = format!(r#"data-template="{}""#, template);
        assert!(
            self.body.contains(&marker),
            "expected template {template}, body: {}",
            self.body
        );
    }

    pub fn assert_redirect(&self, location: &str) {
        assert_eq!(self.status, StatusCode::SEE_OTHER, "body: {}", self.body);
        assert_eq!(self.location.as_deref(), Some(location));
    }

    /// フィールドのエラー一覧
    pub fn field_errors(&self, field: &str) -> Option<&str> {
        let open = format!(r#"<ul class="errorlist" id="errors-{}">"#, field);
        let start = self.body.find(&open)? + open.len();
        let end = self.body[start..].find("</ul>")? + start;
        Some(&self.body[start..end])
    }

    pub fn assert_field_error(&self, field: &str, message: &str) {
        assert_eq!(self.status, StatusCode::OK);
        let errors = self
            .field_errors(field)
            .unwrap_or_else(|| panic!("no errors for {field}, body: {}", self.body));
        assert!(
            errors.contains(&format!("<li>{}</li>", escape(message))),
            "{field} errors: {errors}"
        );
    }

    pub fn assert_no_field_error(&self, field: &str) {
        assert!(
            self.field_errors(field).is_none(),
            "unexpected errors for {field}: {:?}",
            self.field_errors(field)
        );
    }

    pub fn assert_non_field_error(&self, message: &str) {
        assert_eq!(self.status, StatusCode::OK);
        let expected = format!(
            r#"<ul class="errorlist nonfield"><li>{}</li></ul>"#,
            escape(message)
        );
        assert!(self.body.contains(&expected), "body: {}", self.body);
    }

    pub fn assert_message(&self, tags: &str, text: &str) {
        let expected = format!(
            r#"<div class="alert {}" role="alert">{}</div>"#,
            tags,
            escape(text)
        );
        assert!(self.body.contains(&expected), "body: {}", self.body);
    }
}
