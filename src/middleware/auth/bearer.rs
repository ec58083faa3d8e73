//! Bearer token 検証 → SecurityContext を extensions に入れる
//!
//! 1 リクエストにつき 1 回、ルーティングより前に走る。
//! - Authorization ヘッダ無し / `Bearer ` で始まらない → 匿名のまま通す (401 にはしない)
//! - `Bearer <token>` で検証成功 → SecurityContext を載せて通す
//! - `Bearer <token>` で検証失敗 → その場で 401 (ボディ無し)。後段は呼ばない
//!
//! 認可 (authority チェック) は `gate` の責務。

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{HeaderMap, HeaderValue, Request, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
};
use tracing::{debug, warn};

use crate::api::extractors::SecurityContext;
use crate::error::AppError;
use crate::services::auth::TokenCodec;
use crate::state::AppState;

/// Case-sensitive, exactly one space.
pub const BEARER_PREFIX: &str = "Bearer ";

/// `/api/*` 全体に掛ける。
///
/// 例：
/// ```ignore
/// let api = Router::new().nest("/api", api::routes());
/// let api = middleware::auth::bearer::apply(api, state.clone());
/// ```
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    router.layer(middleware::from_fn_with_state(state, bearer_middleware))
}

/// What the interceptor decided for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BearerOutcome {
    Passthrough,
    Authenticated(SecurityContext),
    Rejected,
}

/// The token part of `Authorization: Bearer <token>`, if the header has that shape.
///
/// A header that is not visible ASCII counts as absent.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers.get(header::AUTHORIZATION).and_then(strip_bearer)
}

fn strip_bearer(value: &HeaderValue) -> Option<&str> {
    value.to_str().ok()?.strip_prefix(BEARER_PREFIX)
}

/// Pure decision: depends only on the header value and the codec's clock.
pub fn authenticate_header(tokens: &TokenCodec, value: Option<&HeaderValue>) -> BearerOutcome {
    let Some(token) = value.and_then(strip_bearer) else {
        return BearerOutcome::Passthrough;
    };

    match tokens.verify(token) {
        Ok(verified) => BearerOutcome::Authenticated(verified.into()),
        Err(err) => {
            // Only the kind of failure; never the token itself.
            warn!(error = %err, "bearer token rejected");
            BearerOutcome::Rejected
        }
    }
}

async fn bearer_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    match authenticate_header(&state.tokens, req.headers().get(header::AUTHORIZATION)) {
        BearerOutcome::Passthrough => {
            debug!(path = %req.uri().path(), "no bearer token; continuing anonymously");
            next.run(req).await
        }
        BearerOutcome::Authenticated(ctx) => {
            debug!(principal = %ctx.principal, "bearer token accepted");
            // middleware → extractor / gate への受け渡し
            req.extensions_mut().insert(ctx);
            next.run(req).await
        }
        BearerOutcome::Rejected => AppError::Unauthorized.into_response(),
    }
}
