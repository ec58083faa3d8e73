//! Route-level authorization gate.
//!
//! Attached with `route_layer` at route registration, so the check runs before
//! the handler body and unmatched paths still 404.
//!
//! | Situation                         | Outcome |
//! |-----------------------------------|---------|
//! | no SecurityContext (anonymous)    | 401     |
//! | authenticated, authority missing  | 403     |
//! | authenticated, authority present  | handler |

use std::future::Future;
use std::pin::Pin;

use axum::{extract::Request, middleware::Next, response::Response};
use tracing::{debug, warn};

use crate::api::extractors::SecurityContext;
use crate::error::AppError;

/// What a protected operation demands of the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    Authenticated,
    Authority(&'static str),
}

impl Requirement {
    pub fn check(self, ctx: Option<&SecurityContext>) -> Result<(), AppError> {
        let Some(ctx) = ctx else {
            debug!(requirement = ?self, "anonymous request to a protected operation");
            return Err(AppError::Unauthorized);
        };

        match self {
            Requirement::Authenticated => Ok(()),
            Requirement::Authority(required) if ctx.has_authority(required) => Ok(()),
            Requirement::Authority(required) => {
                warn!(
                    principal = %ctx.principal,
                    required_authority = required,
                    "permission denied"
                );
                Err(AppError::Forbidden)
            }
        }
    }
}

/// Any authenticated caller.
pub async fn require_authenticated(req: Request, next: Next) -> Result<Response, AppError> {
    Requirement::Authenticated.check(req.extensions().get::<SecurityContext>())?;
    Ok(next.run(req).await)
}

/// Callers holding `authority`.
///
/// ```ignore
/// Router::new()
///     .route("/dashboard", get(dashboard))
///     .route_layer(middleware::from_fn(require_authority("ROLE_ADMIN")));
/// ```
pub fn require_authority(
    authority: &'static str,
) -> impl Fn(Request, Next) -> Pin<Box<dyn Future<Output = Result<Response, AppError>> + Send>>
+ Clone {
    move |req: Request, next: Next| {
        Box::pin(async move {
            Requirement::Authority(authority).check(req.extensions().get::<SecurityContext>())?;
            Ok(next.run(req).await)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(authorities: &[&str]) -> SecurityContext {
        SecurityContext::new(
            "alice",
            authorities.iter().map(|a| a.to_string()).collect(),
        )
    }

    #[test]
    fn anonymous_is_unauthorized() {
        assert!(matches!(
            Requirement::Authenticated.check(None),
            Err(AppError::Unauthorized)
        ));
        assert!(matches!(
            Requirement::Authority("ROLE_ADMIN").check(None),
            Err(AppError::Unauthorized)
        ));
    }

    #[test]
    fn authenticated_without_authorities_is_enough_for_authenticated() {
        assert!(Requirement::Authenticated.check(Some(&ctx(&[]))).is_ok());
    }

    #[test]
    fn missing_authority_is_forbidden() {
        assert!(matches!(
            Requirement::Authority("ROLE_ADMIN").check(Some(&ctx(&["ROLE_USER"]))),
            Err(AppError::Forbidden)
        ));
    }

    #[test]
    fn authority_match_is_exact() {
        let c = ctx(&["ROLE_ADMIN"]);
        assert!(Requirement::Authority("ROLE_ADMIN").check(Some(&c)).is_ok());
        assert!(Requirement::Authority("role_admin").check(Some(&c)).is_err());
        assert!(Requirement::Authority("ROLE_ADM").check(Some(&c)).is_err());
    }
}
