pub mod model;
mod password;
mod routes;
pub mod store;
pub mod tokens;

pub use routes::router;
