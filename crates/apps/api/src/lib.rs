//! The `EventVault` HTTP API: album management, guest uploads, interactions and
//! notifications on top of `common_services`.
#![deny(clippy::unwrap_used)]
#![allow(
    clippy::needless_for_each,
    clippy::missing_errors_doc,
    clippy::cast_possible_truncation
)]

pub mod api_state;
mod routes;
mod server;

pub use routes::*;
pub use server::*;
