//! Data models.

pub mod config;
pub mod movie;
pub mod notification;
pub mod secret;
pub mod server;
pub mod snapshot;

pub use movie::{Collection, Movie, MovieKey};
pub use secret::{ApiKey, Secret};
pub use server::{Library, LibraryKind, Server, ServerRegistry};
