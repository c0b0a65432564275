pub mod model;
mod routes;
pub mod store;

pub use routes::router;
