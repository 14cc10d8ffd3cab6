pub mod error;
pub mod http;
pub mod model;
pub mod recovery;
pub mod sim;

pub use error::{SimError, ValidationError};

#[cfg(test)]
mod test;
