pub mod error;
pub mod models;

pub use error::GraphError;
pub use models::*;
