pub mod admin;
pub mod auth;
pub mod checkins;
pub mod health;
pub mod profile;
pub mod resources;
pub mod roadmap;
