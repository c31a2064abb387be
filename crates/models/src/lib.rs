pub mod order;
pub mod catalog;
pub mod error;

pub use order::*;
pub use catalog::*;
pub use error::*;
