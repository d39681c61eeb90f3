pub mod common;
pub mod optional_user;
pub mod require_role;
pub mod user;
