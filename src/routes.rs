// Route path constants - single source of truth for all view paths

pub const LOGIN: &str = "/login";
pub const STREAM: &str = "/";
pub const PROFILE: &str = "/profile/:id";
pub const SEARCH: &str = "/search";

// Route names, used for navigation by name
pub const LOGIN_NAME: &str = "Login";
pub const PROFILE_NAME: &str = "Profile";
pub const SEARCH_NAME: &str = "Search";
