pub mod error;
pub mod interfaces;
pub mod policy;
pub mod service;
