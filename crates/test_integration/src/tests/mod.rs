pub mod test_auth;
pub mod test_interaction;
pub mod test_root;
pub mod test_upload;
