pub mod album_store;
pub mod event_type_store;
pub mod interaction_store;
pub mod notification_store;
pub mod template_store;
pub mod upload_store;
pub mod user_store;
