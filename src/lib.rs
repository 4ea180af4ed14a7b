pub mod baseline;
pub mod cli;
pub mod commits;
pub mod config;
pub mod diff;
pub mod error;
pub mod forge;
pub mod message;
pub mod model;
pub mod revision;

mod api;

pub use api::{BumpMessage, BumpMessageBuilder};
pub use error::BumpError;
