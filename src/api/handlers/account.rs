/*
 * Responsibility
 * - 認証済みユーザー向けの handler (/me, /dashboard, /profile)
 * - authority チェックは routes 側の gate で済んでいる前提。ここでは再チェックしない
 */
use axum::Json;

use crate::api::dto::account::UserInfo;
use crate::api::extractors::CurrentUser;

pub async fn me(CurrentUser(ctx): CurrentUser) -> Json<UserInfo> {
    Json(ctx.into())
}

pub async fn dashboard() -> &'static str {
    "Welcome to the admin dashboard!"
}

pub async fn profile() -> &'static str {
    "Here is your user profile."
}
