pub mod backend;
pub mod config;
pub mod configmap;
pub mod error;
pub mod namespace;
pub mod notify;
pub mod settings;
pub mod state;

#[cfg(test)]
mod testing;

pub use error::{BackendError, Error, Result, ServiceError};
