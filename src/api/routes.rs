/*
 * Responsibility
 * - /api 配下の URL 構造を定義
 * - 公開ルート (authenticate, public/ 配下) と保護ルートを分ける
 * - 保護ルートの authority は route_layer で登録時に宣言する
 */
use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::api::handlers::{
    account::{dashboard, me, profile},
    auth::{authenticate, validate},
    public::{health, whoami},
};
use crate::middleware::auth::{require_authenticated, require_authority};
use crate::state::AppState;

pub const ROLE_ADMIN: &str = "ROLE_ADMIN";
pub const ROLE_USER: &str = "ROLE_USER";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/authenticate", post(authenticate))
        .nest("/public", public_routes())
        .merge(protected_routes())
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/whoami", get(whoami))
}

fn protected_routes() -> Router<AppState> {
    let admin = Router::new()
        .route("/dashboard", get(dashboard))
        .route_layer(middleware::from_fn(require_authority(ROLE_ADMIN)));

    let user = Router::new()
        .route("/profile", get(profile))
        .route_layer(middleware::from_fn(require_authority(ROLE_USER)));

    Router::new()
        .route("/validate", get(validate))
        .route("/me", get(me))
        .merge(admin)
        .merge(user)
        // Outermost: anonymous callers stop here with 401 before any authority check.
        .route_layer(middleware::from_fn(require_authenticated))
}
