pub mod auth;
pub mod health;
pub mod internal;
pub mod permissions;
