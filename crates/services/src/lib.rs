pub mod notifier;
pub mod orders;

pub use notifier::*;
pub use orders::*;
