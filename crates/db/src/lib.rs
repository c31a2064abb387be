pub mod connection;
pub mod repository;

pub use connection::*;
pub use repository::*;
