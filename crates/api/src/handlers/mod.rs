pub mod auth;
pub mod brands;
pub mod health;
pub mod projects;
pub mod subscription;
