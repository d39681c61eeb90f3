pub mod album;
pub mod auth;
pub mod interaction;
pub mod notification;
pub mod upload;
