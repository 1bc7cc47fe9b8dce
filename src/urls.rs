//! URL 定義とリダイレクト先の組み立て

pub const HOME_URL: &str = "/";
pub const HEALTH_URL: &str = "/health";
pub const LOGIN_URL: &str = "/registration/login/";
pub const LOGOUT_URL: &str = "/registration/logout/";
pub const SIGNUP_URL: &str = "/registration/signup/";
pub const CHANGE_PASSWORD_URL: &str = "/registration/change_password/";
pub const RESET_PASSWORD_URL: &str = "/registration/reset_password/";
pub const RESET_CONFIRM_ROUTE: &str = "/registration/reset/{uidb64}/{token}/";

/// リセット確認でトークンの代わりに URL に置く値
pub const RESET_URL_TOKEN: &str = "set-password";

/// `next` 付きのログイン URL
pub fn login_url_with_next(next: &str) -> String {
    format!("{}?next={}", LOGIN_URL, urlencoding::encode(next))
}

/// 未ログイン時のリダイレクト先
///
/// ホームからはログインページそのものへ、それ以外は元の URL を `next` に付ける。
pub fn login_redirect_for(path_and_query: &str) -> String {
    if path_and_query == HOME_URL {
        LOGIN_URL.to_string()
    } else {
        login_url_with_next(path_and_query)
    }
}

/// リセット確認 URL（パスのみ）
pub fn password_reset_confirm_url(uidb64: &str, token: &str) -> String {
    format!("/registration/reset/{}/{}/", uidb64, token)
}

/// ログイン後のリダイレクト先として安全か
///
/// 同一サイト内の絶対パスのみ許可（`//host` や `/\host` は外部扱い）
pub fn is_safe_redirect(next: &str) -> bool {
    next.starts_with('/')
        && !next.starts_with("//")
        && !next.starts_with("/\\")
        && !next.chars().any(|c| c.is_control())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_url_with_next() {
        assert_eq!(login_url_with_next("/"), "/registration/login/?next=%2F");
        assert_eq!(
            login_url_with_next("/registration/change_password/"),
            "/registration/login/?next=%2Fregistration%2Fchange_password%2F"
        );
    }

    #[test]
    fn test_login_redirect_for() {
        assert_eq!(login_redirect_for("/"), "/registration/login/");
        assert_eq!(
            login_redirect_for("/registration/change_password/"),
            "/registration/login/?next=%2Fregistration%2Fchange_password%2F"
        );
        assert_eq!(login_redirect_for("/?a=b"), "/registration/login/?next=%2F%3Fa%3Db");
    }

    #[test]
    fn test_password_reset_confirm_url() {
        assert_eq!(
            password_reset_confirm_url("abc", "set-password"),
            "/registration/reset/abc/set-password/"
        );
    }

    #[test]
    fn test_is_safe_redirect() {
        assert!(is_safe_redirect("/"));
        assert!(is_safe_redirect("/registration/change_password/?a=b"));
        assert!(!is_safe_redirect(""));
        assert!(!is_safe_redirect("https://evil.example.com/"));
        assert!(!is_safe_redirect("//evil.example.com/"));
        assert!(!is_safe_redirect("/\\evil.example.com/"));
        assert!(!is_safe_redirect("/foo\nbar"));
    }
}
