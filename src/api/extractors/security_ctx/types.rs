/*
 * Responsibility
 * - Handler / gate から見える「認証済みコンテキスト」の型
 * - bearer middleware が検証して request extensions に格納する。リクエストを跨いで共有しない
 *
 * Notes
 * - トークン検証ロジックは services 側の責務
 * - ここは「型（契約）」として固定化する
 */

use crate::services::auth::VerifiedToken;

/// Who is making this call and what they may do.
///
/// - `principal` is the login carried in the token subject
/// - `authorities` keeps the order the token listed them in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityContext {
    pub principal: String,
    pub authorities: Vec<String>,
}

impl SecurityContext {
    pub fn new(principal: impl Into<String>, authorities: Vec<String>) -> Self {
        Self {
            principal: principal.into(),
            authorities,
        }
    }

    pub fn has_authority(&self, authority: &str) -> bool {
        self.authorities.iter().any(|a| a == authority)
    }
}

impl From<VerifiedToken> for SecurityContext {
    fn from(token: VerifiedToken) -> Self {
        Self::new(token.subject, token.authorities)
    }
}
