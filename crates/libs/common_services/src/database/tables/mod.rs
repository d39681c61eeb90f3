pub mod album;
pub mod app_user;
pub mod event_type;
pub mod interaction;
pub mod notification;
pub mod notification_template;
pub mod upload;
