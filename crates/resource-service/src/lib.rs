//! Uniform CRUD contract over backend resource types.
//!
//! Every resource type is exposed through a [`ResourceService`], which pairs a
//! [`Backend`] (transport) with a [`Converter`] (wire shape to display shape).

mod draft;
pub use draft::Draft;
mod error;
pub use error::*;
mod id;
pub use id::ResourceId;
mod service;
pub use service::{Backend, Converter, Fetched, Messages, ResourceService};
pub mod settle;
