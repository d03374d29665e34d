pub mod health;
pub mod paste;
pub mod user;
