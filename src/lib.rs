pub mod app;
pub mod auth;
pub mod config;
pub mod ctx;
pub mod db;
pub mod errors;
pub mod extract;
pub mod notes;
pub mod state;

pub use config::config;
pub use db::{init_db, DB};
pub use errors::{Error, Result};
