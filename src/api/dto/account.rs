use serde::Serialize;

use crate::api::extractors::SecurityContext;

/// `GET /api/me`
#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub username: String,
    pub authorities: Vec<String>,
}

impl From<SecurityContext> for UserInfo {
    fn from(ctx: SecurityContext) -> Self {
        Self {
            username: ctx.principal,
            authorities: ctx.authorities,
        }
    }
}

/// `GET /api/public/whoami`: same as `UserInfo`, but anonymous callers get an answer too.
#[derive(Debug, Serialize)]
pub struct WhoAmI {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub authorities: Vec<String>,
}

impl From<Option<SecurityContext>> for WhoAmI {
    fn from(ctx: Option<SecurityContext>) -> Self {
        match ctx {
            Some(ctx) => Self {
                authenticated: true,
                username: Some(ctx.principal),
                authorities: ctx.authorities,
            },
            None => Self {
                authenticated: false,
                username: None,
                authorities: Vec::new(),
            },
        }
    }
}
