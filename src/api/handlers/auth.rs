/*
 * Responsibility
 * - POST /api/authenticate (ログイン → トークン発行)
 * - GET /api/validate (トークンがいま有効か)
 * - 失敗時の 401 は理由を区別しない (ユーザー名の存在を漏らさない)
 */
use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
};

use crate::api::dto::auth::{JwtToken, LoginRequest};
use crate::error::AppError;
use crate::middleware::auth::bearer::bearer_token;
use crate::state::AppState;

pub async fn authenticate(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<JwtToken>, AppError> {
    req.validate()
        .map_err(|msg| AppError::InvalidRequest(msg.to_string()))?;

    let token = state
        .auth
        .authenticate(&req.username, &req.password)
        .await?
        .ok_or(AppError::Unauthorized)?;

    Ok(Json(JwtToken { id_token: token }))
}

pub async fn validate(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<StatusCode, AppError> {
    let token = bearer_token(&headers).ok_or(AppError::Unauthorized)?;

    if state.auth.validate_token_string(token) {
        Ok(StatusCode::OK)
    } else {
        Err(AppError::Unauthorized)
    }
}
