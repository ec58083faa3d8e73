/*
 * Responsibility
 * - middleware の公開インターフェース
 * - 適用順 (外側 → 内側):
 *   cors → security_headers → http (request-id / timeout / limit / trace) → auth::bearer → router
 * - auth::gate は各ルート登録時に route_layer で掛ける
 */
pub mod auth;
pub mod cors;
pub mod http;
pub mod security_headers;
