//! Shared building blocks: configuration, error taxonomy, domain types, the
//! collaborator traits, and the chunker.

#![deny(warnings)]
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

pub mod chunker;
pub mod config;
pub mod error;
pub mod loader;
pub mod logging;
pub mod settings;
pub mod traits;
pub mod types;

pub use chunker::Chunker;
pub use error::{Error, Result, Service};
