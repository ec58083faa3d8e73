/*!
 * Security context extractor
 *
 * Responsibility:
 * - 認証済みリクエストのコンテキスト（SecurityContext）を handler に提供する
 * - HTTP / axum 依存は core に閉じ込め、型定義は types に分離する
 *
 * Public API:
 * - SecurityContext
 * - CurrentUser
 */

mod core;
mod types;

pub use core::CurrentUser;
pub use types::SecurityContext;
