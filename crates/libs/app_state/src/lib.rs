//! Settings for the `EventVault` services: the yaml file, `APP__*` overrides and
//! the resolved [`AppSettings`] handed to every component.
#![allow(clippy::missing_errors_doc)]

mod load_settings;
mod raw_settings;
mod settings;
mod utils;

pub use load_settings::*;
pub use raw_settings::*;
pub use settings::*;
pub use utils::*;
