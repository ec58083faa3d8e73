/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - tokens: TokenCodec (interceptor が検証に使う)
 *   - auth: Authenticator (ログイン処理)
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 * - リクエストごとの認証情報 (SecurityContext) はここには置かない。request extensions に載せる
 */
use std::sync::Arc;

use crate::services::auth::{Authenticator, TokenCodec};

#[derive(Clone, Debug)]
pub struct AppState {
    pub auth: Arc<Authenticator>,
    pub tokens: Arc<TokenCodec>,
}

impl AppState {
    pub fn new(auth: Arc<Authenticator>, tokens: Arc<TokenCodec>) -> Self {
        Self { auth, tokens }
    }
}
