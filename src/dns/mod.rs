pub mod error;
pub mod protocol;
pub mod resolver;
pub mod reverse;
pub mod zone;
