pub mod attendance;
pub mod summary;
pub mod user;
