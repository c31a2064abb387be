pub mod message;
pub mod registry;

pub use message::*;
pub use registry::*;
