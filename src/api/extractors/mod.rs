pub mod security_ctx;

pub use security_ctx::{CurrentUser, SecurityContext};
