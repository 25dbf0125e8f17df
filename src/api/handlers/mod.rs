pub mod admin;
pub mod announcements;
pub mod auth;
pub mod root;
pub mod student;
pub mod teacher;
