use axum::{Router, routing::get};
use time::Duration;
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer, cookie::SameSite};

use crate::handlers;
use crate::state::AppState;
use crate::urls::{
    CHANGE_PASSWORD_URL, HEALTH_URL, HOME_URL, LOGIN_URL, LOGOUT_URL, RESET_CONFIRM_ROUTE,
    RESET_PASSWORD_URL, SIGNUP_URL,
};

/// Router の構築
///
/// セッションはサーバー側のメモリストアに保存し、Cookie にはセッションIDのみを載せる。
pub fn create_router(state: AppState) -> Router {
    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_secure(state.config.secure_cookies)
        .with_same_site(SameSite::Lax)
        .with_http_only(true)
        .with_expiry(Expiry::OnInactivity(Duration::seconds(
            state.config.session_expiry_secs,
        )));

    Router::new()
        .route(HOME_URL, get(handlers::home).post(handlers::home))
        .route(HEALTH_URL, get(handlers::health_check))
        .route(LOGIN_URL, get(handlers::signin_page).post(handlers::signin))
        .route(LOGOUT_URL, get(handlers::logout).post(handlers::logout))
        .route(SIGNUP_URL, get(handlers::signup_page).post(handlers::signup))
        .route(
            CHANGE_PASSWORD_URL,
            get(handlers::password_change_page).post(handlers::password_change),
        )
        .route(
            RESET_PASSWORD_URL,
            get(handlers::password_reset_page).post(handlers::password_reset),
        )
        .route(
            RESET_CONFIRM_ROUTE,
            get(handlers::password_reset_confirm_page).post(handlers::password_reset_confirm),
        )
        .layer(session_layer)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
