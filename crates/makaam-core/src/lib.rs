pub mod checkin;
pub mod config;
pub mod error;
pub mod io;
pub mod paths;
pub mod resource;
pub mod roadmap;
pub mod store;
pub mod types;
pub mod user;

pub use error::{MakaamError, Result};
