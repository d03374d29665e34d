pub mod paste;
pub mod user;
