mod common;

use axum::http::StatusCode;
use common::TestApp;
use oxaccount::forms::{INVALID_LOGIN, PASSWORD_INCORRECT, PASSWORD_MISMATCH, REQUIRED};
use oxaccount::handlers::password_change::PASSWORD_CHANGED;
use oxaccount::handlers::password_reset::{RESET_COMPLETE, RESET_EMAIL_SENT};
use oxaccount::services::token::{decode_uid, encode_uid};

const CHANGE: &str = "/registration/change_password/";
const RESET: &str = "/registration/reset_password/";
const EMAIL: &str = "test_user@test.com";
const PASSWORD: &str = "abcd12efgh";
const NEW_PASSWORD: &str = "zxcv98mnbv";

// === パスワード変更 ===

#[tokio::test]
async fn test_change_password_requires_login() {
    let mut app = TestApp::new();

    let response = app.get(CHANGE).await;

    response.assert_redirect("/registration/login/?next=%2Fregistration%2Fchange_password%2F");
}

#[tokio::test]
async fn test_change_password_page_renders() {
    let mut app = TestApp::new();
    app.create_user(EMAIL, PASSWORD).await;
    app.login(EMAIL, PASSWORD).await;

    let response = app.get(CHANGE).await;

    assert_eq!(response.status, StatusCode::OK);
    response.assert_template("registration/password_change_form.html");
}

#[tokio::test]
async fn test_change_password_rejects_wrong_old_password() {
    let mut app = TestApp::new();
    app.create_user(EMAIL, PASSWORD).await;
    app.login(EMAIL, PASSWORD).await;

    let response = app
        .post(
            CHANGE,
            &[
                ("old_password", "wrong-password"),
                ("new_password1", NEW_PASSWORD),
                ("new_password2", NEW_PASSWORD),
            ],
        )
        .await;

    response.assert_template("registration/password_change_form.html");
    response.assert_field_error("old_password", PASSWORD_INCORRECT);

    let user = app.find_user(EMAIL).await.unwrap();
    assert!(oxaccount::services::auth::verify_password(PASSWORD, &user.password_hash).unwrap());
}

#[tokio::test]
async fn test_change_password_validates_new_passwords() {
    let mut app = TestApp::new();
    app.create_user(EMAIL, PASSWORD).await;
    app.login(EMAIL, PASSWORD).await;

    let response = app
        .post(
            CHANGE,
            &[
                ("old_password", PASSWORD),
                ("new_password1", NEW_PASSWORD),
                ("new_password2", "something-else"),
            ],
        )
        .await;

    response.assert_field_error("new_password2", PASSWORD_MISMATCH);
    response.assert_no_field_error("old_password");

    let response = app
        .post(
            CHANGE,
            &[
                ("old_password", ""),
                ("new_password1", NEW_PASSWORD),
                ("new_password2", NEW_PASSWORD),
            ],
        )
        .await;

    response.assert_field_error("old_password", REQUIRED);
}

#[tokio::test]
async fn test_change_password_keeps_session() {
    let mut app = TestApp::new();
    app.create_user(EMAIL, PASSWORD).await;
    app.login(EMAIL, PASSWORD).await;

    let response = app
        .post(
            CHANGE,
            &[
                ("old_password", PASSWORD),
                ("new_password1", NEW_PASSWORD),
                ("new_password2", NEW_PASSWORD),
            ],
        )
        .await;

    response.assert_redirect("/");

    let home = app.get("/").await;
    assert_eq!(home.status, StatusCode::OK);
    home.assert_message("alert-success", PASSWORD_CHANGED);

    // 新しいパスワードでのみログインできる
    let mut other = app.new_client();
    other.login(EMAIL, PASSWORD).await.assert_non_field_error(INVALID_LOGIN);
    other.login(EMAIL, NEW_PASSWORD).await.assert_redirect("/");
}

#[tokio::test]
async fn test_change_password_logs_out_other_sessions() {
    let mut first = TestApp::new();
    first.create_user(EMAIL, PASSWORD).await;
    first.login(EMAIL, PASSWORD).await;

    let mut second = first.new_client();
    second.login(EMAIL, PASSWORD).await;
    assert_eq!(second.get("/").await.status, StatusCode::OK);

    first
        .post(
            CHANGE,
            &[
                ("old_password", PASSWORD),
                ("new_password1", NEW_PASSWORD),
                ("new_password2", NEW_PASSWORD),
            ],
        )
        .await
        .assert_redirect("/");

    assert_eq!(first.get("/").await.status, StatusCode::OK);
    second.get("/").await.assert_redirect("/registration/login/");
}

// === パスワードリセット申請 ===

#[tokio::test]
async fn test_reset_page_renders() {
    let mut app = TestApp::new();

    let response = app.get(RESET).await;

    assert_eq!(response.status, StatusCode::OK);
    response.assert_template("registration/password_reset_form.html");
}

#[tokio::test]
async fn test_reset_requires_email() {
    let mut app = TestApp::new();

    let response = app.post(RESET, &[("email", "")]).await;

    response.assert_template("registration/password_reset_form.html");
    response.assert_field_error("email", REQUIRED);
}

/// メール本文から確認 URL のパス部分を取り出す
fn reset_path_in(body: &str) -> &str {
    let start = body.find("/registration/reset/").unwrap();
    let end = body[start..].find(char::is_whitespace).unwrap() + start;
    &body[start..end]
}

#[tokio::test]
async fn test_reset_response_does_not_reveal_account() {
    let mut app = TestApp::new();
    app.create_user(EMAIL, PASSWORD).await;

    let existing = app.post(RESET, &[("email", EMAIL)]).await;
    let missing = app.post(RESET, &[("email", "nobody@test.com")]).await;

    existing.assert_redirect("/registration/login/");
    missing.assert_redirect("/registration/login/");

    let login = app.get("/registration/login/").await;
    login.assert_message("alert-info", RESET_EMAIL_SENT);

    // 存在するアカウントにだけ 1 通送られる
    let sent = app.sent_emails().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, EMAIL);
}

#[tokio::test]
async fn test_reset_email_contains_valid_link() {
    let mut app = TestApp::new();
    let user = app.create_user(EMAIL, PASSWORD).await;

    app.post(RESET, &[("email", "TEST_USER@TEST.COM")])
        .await
        .assert_redirect("/registration/login/");

    let sent = app.sent_emails().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, EMAIL);
    assert!(sent[0].body.contains("http://localhost:3000/registration/reset/"));

    let path = reset_path_in(&sent[0].body).to_string();
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    assert_eq!(segments.len(), 4, "{path}");
    assert_eq!(segments[..2], ["registration", "reset"]);
    assert_eq!(decode_uid(segments[2]), Some(user.id));
    assert!(app.state.token_generator().check_token(&user, segments[3]));

    // メールのリンクからパスワードを設定できる
    let set_password_url = app.get(&path).await.location.unwrap();
    app.post(
        &set_password_url,
        &[("new_password1", NEW_PASSWORD), ("new_password2", NEW_PASSWORD)],
    )
    .await
    .assert_redirect("/registration/login/");
    app.login(EMAIL, NEW_PASSWORD).await.assert_redirect("/");
}

#[tokio::test]
async fn test_reset_unknown_email_sends_nothing() {
    let mut app = TestApp::new();

    app.post(RESET, &[("email", "nobody@test.com")])
        .await
        .assert_redirect("/registration/login/");

    assert!(app.sent_emails().await.is_empty());
}

// === パスワードリセット確認 ===

#[tokio::test]
async fn test_reset_confirm_sets_new_password() {
    let mut app = TestApp::new();
    let user = app.create_user(EMAIL, PASSWORD).await;
    let link = app.reset_link(EMAIL).await;

    // トークンはセッションへ移され、URL から消える
    let set_password_url = format!("/registration/reset/{}/set-password/", encode_uid(user.id));
    app.get(&link).await.assert_redirect(&set_password_url);

    let form = app.get(&set_password_url).await;
    assert_eq!(form.status, StatusCode::OK);
    form.assert_template("registration/password_reset_confirm.html");
    assert!(form.body.contains(r#"data-validlink="true""#));

    let response = app
        .post(
            &set_password_url,
            &[("new_password1", NEW_PASSWORD), ("new_password2", NEW_PASSWORD)],
        )
        .await;
    response.assert_redirect("/registration/login/");

    let login = app.get("/registration/login/").await;
    login.assert_message("alert-success", RESET_COMPLETE);

    app.login(EMAIL, PASSWORD).await.assert_non_field_error(INVALID_LOGIN);
    app.login(EMAIL, NEW_PASSWORD).await.assert_redirect("/");
}

#[tokio::test]
async fn test_reset_confirm_validates_passwords() {
    let mut app = TestApp::new();
    app.create_user(EMAIL, PASSWORD).await;
    let link = app.reset_link(EMAIL).await;

    let set_password_url = app.get(&link).await.location.unwrap();
    let response = app
        .post(
            &set_password_url,
            &[("new_password1", NEW_PASSWORD), ("new_password2", "")],
        )
        .await;

    response.assert_template("registration/password_reset_confirm.html");
    response.assert_field_error("new_password2", REQUIRED);

    let user = app.find_user(EMAIL).await.unwrap();
    assert!(oxaccount::services::auth::verify_password(PASSWORD, &user.password_hash).unwrap());
}

#[tokio::test]
async fn test_reset_link_is_single_use() {
    let mut app = TestApp::new();
    app.create_user(EMAIL, PASSWORD).await;
    let link = app.reset_link(EMAIL).await;

    let set_password_url = app.get(&link).await.location.unwrap();
    app.post(
        &set_password_url,
        &[("new_password1", NEW_PASSWORD), ("new_password2", NEW_PASSWORD)],
    )
    .await
    .assert_redirect("/registration/login/");

    // パスワード変更後は同じリンクが無効
    let response = app.get(&link).await;
    assert_eq!(response.status, StatusCode::OK);
    response.assert_template("registration/password_reset_confirm.html");
    assert!(response.body.contains(r#"data-validlink="false""#));
}

#[tokio::test]
async fn test_reset_confirm_invalid_link() {
    let mut app = TestApp::new();
    let user = app.create_user(EMAIL, PASSWORD).await;
    let uid = encode_uid(user.id);

    let cases = [
        format!("/registration/reset/{}/bogus-token/", uid),
        "/registration/reset/not-a-uid/bogus-token/".to_string(),
        // セッションにトークンがない
        format!("/registration/reset/{}/set-password/", uid),
    ];

    for url in cases {
        let response = app.get(&url).await;
        assert_eq!(response.status, StatusCode::OK, "{url}");
        response.assert_template("registration/password_reset_confirm.html");
        assert!(response.body.contains(r#"data-validlink="false""#), "{url}");
        assert!(!response.body.contains("new_password1"), "{url}");

        let response = app
            .post(
                &url,
                &[("new_password1", NEW_PASSWORD), ("new_password2", NEW_PASSWORD)],
            )
            .await;
        assert!(response.body.contains(r#"data-validlink="false""#), "{url}");
    }

    let user = app.find_user(EMAIL).await.unwrap();
    assert!(oxaccount::services::auth::verify_password(PASSWORD, &user.password_hash).unwrap());
}

#[tokio::test]
async fn test_reset_confirm_accepts_post_to_token_url() {
    let mut app = TestApp::new();
    app.create_user(EMAIL, PASSWORD).await;
    let link = app.reset_link(EMAIL).await;

    app.post(
        &link,
        &[("new_password1", NEW_PASSWORD), ("new_password2", NEW_PASSWORD)],
    )
    .await
    .assert_redirect("/registration/login/");

    app.login(EMAIL, NEW_PASSWORD).await.assert_redirect("/");
}
