/*
 * Responsibility
 * - /api/public/ 配下 (トークン不要)
 * - 有効なトークンが付いていれば SecurityContext は載っている (whoami で確認できる)
 */
use axum::{Json, http::StatusCode, response::IntoResponse};
use serde_json::json;

use crate::api::dto::account::WhoAmI;
use crate::api::extractors::CurrentUser;

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({"status": "ok"})))
}

pub async fn whoami(user: Option<CurrentUser>) -> Json<WhoAmI> {
    Json(user.map(|CurrentUser(ctx)| ctx).into())
}
