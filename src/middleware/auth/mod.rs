pub mod bearer;
pub mod gate;

pub use gate::{Requirement, require_authenticated, require_authority};
