// Utility functions
pub mod error;
pub mod password;
pub mod validation;

pub use error::*;
