pub const OWNER_ID: i64 = 1001;
pub const OWNER_EMAIL: &str = "owner@eventvault.test";
pub const OWNER_NAME: &str = "Olivia Owner";

pub const GUEST_ID: i64 = 1002;
pub const GUEST_EMAIL: &str = "guest@eventvault.test";
pub const GUEST_NAME: &str = "Gus Guest";

pub const ADMIN_ID: i64 = 1003;
pub const ADMIN_EMAIL: &str = "admin@eventvault.test";
pub const ADMIN_NAME: &str = "Ada Admin";
