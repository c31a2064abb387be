pub mod error;
pub mod routes;
pub mod ws;

pub use error::*;
pub use routes::*;
